//! Text views of a generated map for terminal debugging.
//!
//! Rows run along `z`, columns along `x`, so north is at the top.

use tactica_core::Direction;
use tactica_world::{TacticalMap, TerrainFeatureKind};

const HEIGHT_DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// One character per height step above the lowest point, `+` past `z`.
fn height_symbol(height: i32, lowest: i32, water: i32) -> char {
    if height <= water {
        return '~';
    }
    let level = (height - lowest).max(0) as usize;
    HEIGHT_DIGITS.get(level).map_or('+', |&b| b as char)
}

fn facing_symbol(facing: Direction) -> char {
    match facing {
        Direction::North => '^',
        Direction::East => '>',
        Direction::South => 'v',
        Direction::West => '<',
    }
}

/// Height map with feature footprints drawn over it.
///
/// Buildings show their facing as an arrow, columns as `o`.
pub fn render_heights(map: &TacticalMap) -> String {
    let (size_x, size_z) = (map.grid.size_x(), map.grid.size_z());
    let mut rows: Vec<Vec<char>> = (0..size_z)
        .map(|z| {
            (0..size_x)
                .map(|x| {
                    let h = map.grid.get(x, z).unwrap_or(map.lowest_point);
                    height_symbol(h, map.lowest_point, map.water_height)
                })
                .collect()
        })
        .collect();

    for feature in &map.features {
        let symbol = match feature.kind.tag() {
            TerrainFeatureKind::Building => facing_symbol(feature.facing),
            TerrainFeatureKind::Column => 'o',
        };
        for (x, z) in feature.occupied_cells() {
            if x >= 0 && z >= 0 && (x as usize) < size_x && (z as usize) < size_z {
                rows[z as usize][x as usize] = symbol;
            }
        }
    }

    join_rows(rows)
}

/// Texture class of every cell.
pub fn render_textures(map: &TacticalMap) -> String {
    let rows = (0..map.grid.size_z())
        .map(|z| {
            (0..map.grid.size_x())
                .map(|x| map.textures.get(x, z).map_or(' ', |t| t.symbol()))
                .collect()
        })
        .collect();
    join_rows(rows)
}

fn join_rows(rows: Vec<Vec<char>>) -> String {
    let mut out = String::new();
    for row in rows {
        out.extend(row);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactica_world::{GenerationConfig, GeographyArchetype, MapRequest};

    #[test]
    fn symbols_track_height_and_water() {
        assert_eq!(height_symbol(-3, -3, -3), '~');
        assert_eq!(height_symbol(-2, -3, -3), '1');
        assert_eq!(height_symbol(8, -3, -5), 'b');
        assert_eq!(height_symbol(100, 0, -1), '+');
    }

    #[test]
    fn render_has_one_line_per_row() {
        let request = MapRequest {
            seed: 3,
            size_x: Some(9),
            size_z: Some(5),
            archetype: Some(GeographyArchetype::Plain),
            features: true,
        };
        let map = TacticalMap::generate(&request, &GenerationConfig::default()).unwrap();
        let heights = render_heights(&map);
        assert_eq!(heights.lines().count(), 5);
        assert!(heights.lines().all(|l| l.chars().count() == 9));
        let textures = render_textures(&map);
        assert_eq!(textures.lines().count(), 5);
    }
}
