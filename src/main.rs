mod ascii;
mod config;

use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{Context, Result};
use clap::Parser;
use tactica_world::{GeographyArchetype, MapRequest, TacticalMap};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Procedural tactical map generator", long_about = None)]
struct Args {
    /// Seed for the map's RNG stream; derived from the clock if omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Map extent along x; sampled around the configured mean if omitted
    #[arg(long)]
    size_x: Option<usize>,

    /// Map extent along z; sampled around the configured mean if omitted
    #[arg(long)]
    size_z: Option<usize>,

    /// Terrain archetype (plain, slope, valley, ridge, islands, cliff, canyon)
    #[arg(short, long)]
    archetype: Option<GeographyArchetype>,

    /// Generation settings TOML
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the generated map as JSON to this path
    #[arg(long)]
    json: Option<PathBuf>,

    /// Skip feature placement
    #[arg(long)]
    no_features: bool,

    /// Print the height map
    #[arg(long)]
    ascii: bool,

    /// Print the texture classes
    #[arg(long)]
    textures: bool,

    /// Write the effective settings as TOML to this path and exit
    #[arg(long)]
    write_config: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let settings = match &args.config {
        Some(path) => config::load_from_path(path),
        None => config::load(),
    };

    if let Some(path) = &args.write_config {
        config::save_to_path(&settings, path)?;
        println!("wrote {}", path.display());
        return Ok(());
    }

    let seed = match args.seed {
        Some(seed) => seed,
        None => SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?
            .as_nanos() as u64,
    };
    info!(seed, "starting tactica v{}", env!("CARGO_PKG_VERSION"));

    let request = MapRequest {
        seed,
        size_x: args.size_x,
        size_z: args.size_z,
        archetype: args.archetype,
        features: !args.no_features,
    };
    let map = TacticalMap::generate(&request, &settings)
        .with_context(|| format!("Failed to generate map for seed {seed}"))?;

    let relief = map.relief();
    println!(
        "seed {} | {} | {}x{} | heights {}..{} (mean {:.2}) | water {} | features {}/{}",
        map.seed,
        map.archetype,
        map.grid.size_x(),
        map.grid.size_z(),
        relief.min,
        relief.max,
        relief.mean,
        map.water_height,
        map.feature_report.placed,
        map.feature_report.requested,
    );
    if map.validation.cells_adjusted > 0 {
        println!(
            "joined {} dry regions by moving {} cells",
            map.validation.initial_components, map.validation.cells_adjusted
        );
    }

    if args.ascii {
        print!("{}", ascii::render_heights(&map));
    }
    if args.textures {
        print!("{}", ascii::render_textures(&map));
    }
    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&map).context("Failed to encode map")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
        info!(path = %path.display(), "wrote map json");
    }

    Ok(())
}
