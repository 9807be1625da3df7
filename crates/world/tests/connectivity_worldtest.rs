//! Connectivity Worldtest
//!
//! Every finished map must let a unit walk between any two dry cells while
//! climbing at most `max_climb` per step:
//! - all archetypes, many seeds, with and without features
//! - the texture map covers every cell exactly once
//! - terrain classes are taken from the grounded heights

use tactica_world::{
    GenerationConfig, GeographyArchetype, MapRequest, TacticalMap, TerrainValidator, TextureClass,
};

const SEEDS_PER_ARCHETYPE: u64 = 25;

#[test]
fn generated_maps_are_connected() {
    let config = GenerationConfig::default();
    for archetype in GeographyArchetype::ALL {
        for i in 0..SEEDS_PER_ARCHETYPE {
            let request = MapRequest {
                seed: 40_000 + i * 97,
                size_x: None,
                size_z: None,
                archetype: Some(archetype),
                features: false,
            };
            let map = TacticalMap::generate(&request, &config).expect("generate");
            let validator = TerrainValidator::new(map.water_height, config.max_climb);
            assert!(
                validator.is_connected(&map.grid),
                "seed {} {archetype}: dry cells split after repair",
                request.seed
            );

            let cells = map.grid.size_x() * map.grid.size_z();
            let classified: usize = [
                TextureClass::Submerged,
                TextureClass::Waterside,
                TextureClass::Standard,
                TextureClass::SolidNatural,
            ]
            .into_iter()
            .map(|class| map.textures.count(class))
            .sum();
            assert_eq!(classified, cells);
        }
    }
}

#[test]
fn steep_climb_limit_still_connects() {
    let config = GenerationConfig {
        max_climb: 1,
        ..GenerationConfig::default()
    };
    for archetype in [GeographyArchetype::Cliff, GeographyArchetype::Canyon] {
        let request = MapRequest {
            seed: 8_128,
            size_x: Some(20),
            size_z: Some(20),
            archetype: Some(archetype),
            features: false,
        };
        let map = TacticalMap::generate(&request, &config).expect("generate");
        assert!(TerrainValidator::new(map.water_height, 1).is_connected(&map.grid));
    }
}

#[test]
fn maps_with_features_stay_connected() {
    let config = GenerationConfig::default();
    let mut split_rejections = 0;
    for archetype in GeographyArchetype::ALL {
        for i in 0..40 {
            let request = MapRequest {
                seed: 40_000 + i * 97,
                size_x: None,
                size_z: None,
                archetype: Some(archetype),
                features: true,
            };
            let map = TacticalMap::generate(&request, &config).expect("generate");
            let validator = TerrainValidator::new(map.water_height, config.max_climb);
            assert!(
                validator.is_connected(&map.grid),
                "seed {} {archetype}: features split the dry cells",
                request.seed
            );
            split_rejections += map.feature_report.split_rejections;

            // Outside footprints, every class matches a fresh classification.
            let fresh = validator.classify(&map.grid);
            let mut covered = vec![false; map.grid.size_x() * map.grid.size_z()];
            for feature in &map.features {
                for (x, z) in feature.occupied_cells() {
                    if map.grid.contains(x, z) {
                        covered[x as usize * map.grid.size_z() + z as usize] = true;
                    }
                }
            }
            for (x, z, _) in map.grid.iter() {
                let class = map.textures.get(x, z);
                if covered[x * map.grid.size_z() + z] {
                    assert!(matches!(
                        class,
                        Some(TextureClass::Building | TextureClass::Column)
                    ));
                } else {
                    assert_eq!(class, fresh.get(x, z), "seed {} ({x}, {z})", request.seed);
                }
            }

            let stamped = map.textures.count(TextureClass::Building)
                + map.textures.count(TextureClass::Column);
            assert_eq!(stamped > 0, covered.contains(&true));
        }
    }
    println!("placements undone to keep maps connected: {split_rejections}");
}
