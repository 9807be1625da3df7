use anyhow::{Context, Result};
use std::{fs, path::Path};
use tactica_world::GenerationConfig;
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/mapgen.toml";

/// Load generation settings from the default path.
pub fn load() -> GenerationConfig {
    load_from_path(Path::new(DEFAULT_CONFIG_PATH))
}

/// Load generation settings from an explicit path, falling back to defaults on errors.
pub fn load_from_path(path: &Path) -> GenerationConfig {
    match fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<GenerationConfig>(&contents) {
            Ok(cfg) => match cfg.validate() {
                Ok(()) => cfg,
                Err(err) => {
                    warn!("Rejected {}: {err}. Using defaults", path.display());
                    GenerationConfig::default()
                }
            },
            Err(err) => {
                warn!("Failed to parse {}: {err}. Using defaults", path.display());
                GenerationConfig::default()
            }
        },
        Err(err) => {
            if path != Path::new(DEFAULT_CONFIG_PATH) || err.kind() != std::io::ErrorKind::NotFound
            {
                warn!("Failed to read {}: {err}. Using defaults", path.display());
            }
            GenerationConfig::default()
        }
    }
}

/// Write settings as TOML, creating parent directories.
pub fn save_to_path(config: &GenerationConfig, path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(config).context("Failed to encode config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(path, toml).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "tactica-{name}-{}.toml",
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    #[test]
    fn missing_file_uses_defaults() {
        let cfg = load_from_path(&temp_path("missing"));
        assert_eq!(cfg, GenerationConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_keys() {
        let path = temp_path("partial");
        fs::write(&path, "bumpiness_sd = 0.0\nmax_climb = 5\n").unwrap();
        let cfg = load_from_path(&path);
        assert_eq!(cfg.bumpiness_sd, 0.0);
        assert_eq!(cfg.max_climb, 5);
        assert_eq!(cfg.feature_add_timeout, 3);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn invalid_file_uses_defaults() {
        let path = temp_path("invalid");
        fs::write(&path, "max_climb = \"steep\"").unwrap();
        assert_eq!(load_from_path(&path), GenerationConfig::default());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn out_of_range_file_uses_defaults() {
        let path = temp_path("reversed");
        fs::write(
            &path,
            "island_fraction_min = 0.3\nisland_fraction_max = 0.1\n",
        )
        .unwrap();
        assert_eq!(load_from_path(&path), GenerationConfig::default());
        fs::remove_file(&path).ok();
    }

    #[test]
    fn saved_config_loads_back() {
        let path = temp_path("saved");
        let cfg = GenerationConfig {
            placement_attempts: 4,
            ..GenerationConfig::default()
        };
        save_to_path(&cfg, &path).unwrap();
        assert_eq!(load_from_path(&path), cfg);
        fs::remove_file(&path).ok();
    }
}
