//! Golden-file and in-memory JSON comparison for generated maps.
//!
//! Values are compared as pretty JSON. `serde_json` stores objects in a
//! `BTreeMap`, so keys come out sorted and the text is stable across runs.
//!
//! Golden files are rewritten instead of compared when
//! `TACTICA_UPDATE_SNAPSHOTS` is `1` or `true`.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Environment variable that enables snapshot updates.
pub const UPDATE_SNAPSHOTS_ENV: &str = "TACTICA_UPDATE_SNAPSHOTS";

/// Pretty JSON with sorted object keys, ending in a newline.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let value = serde_json::to_value(value).context("Failed to serialize value")?;
    let mut json = serde_json::to_string_pretty(&value).context("Failed to format JSON")?;
    json.push('\n');
    Ok(json)
}

/// First line at which two JSON texts differ, as `(line, expected, actual)`.
fn first_difference<'a>(expected: &'a str, actual: &'a str) -> Option<(usize, &'a str, &'a str)> {
    let mut expected_lines = expected.lines();
    let mut actual_lines = actual.lines();
    let mut line = 1;
    loop {
        match (expected_lines.next(), actual_lines.next()) {
            (None, None) => return None,
            (e, a) if e != a => {
                return Some((line, e.unwrap_or("<end>").trim(), a.unwrap_or("<end>").trim()))
            }
            _ => line += 1,
        }
    }
}

/// Assert that `value` matches the golden file at `path`.
pub fn assert_json_snapshot<P: AsRef<Path>, T: Serialize>(path: P, value: &T) -> Result<()> {
    let path = path.as_ref();
    let actual = canonical_json(value)?;

    if update_requested() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        return fs::write(path, &actual)
            .with_context(|| format!("Failed to write snapshot {}", path.display()));
    }

    let expected = fs::read_to_string(path).with_context(|| {
        format!(
            "Snapshot missing at {} (run with {UPDATE_SNAPSHOTS_ENV}=1 to create it)",
            path.display()
        )
    })?;
    if let Some((line, e, a)) = first_difference(&expected, &actual) {
        bail!(
            "Snapshot {} differs at line {line}: expected `{e}`, got `{a}` \
             (run with {UPDATE_SNAPSHOTS_ENV}=1 to update)",
            path.display()
        );
    }
    Ok(())
}

/// Assert that two values serialize to the same JSON.
///
/// On mismatch the error names the first differing line.
pub fn assert_json_eq<A: Serialize, B: Serialize>(left: &A, right: &B) -> Result<()> {
    let left = canonical_json(left)?;
    let right = canonical_json(right)?;
    match first_difference(&left, &right) {
        None => Ok(()),
        Some((line, l, r)) => bail!("JSON mismatch at line {line}: `{l}` != `{r}`"),
    }
}

fn update_requested() -> bool {
    std::env::var(UPDATE_SNAPSHOTS_ENV)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
