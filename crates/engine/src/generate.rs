//! World synthesis from a city dataset or from nothing.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use std::collections::{BTreeMap, HashMap};
use worldforge_kernel::{City, Region, World};

use crate::dataset::CityRecord;

/// Resource vocabulary sampled for each generated region.
pub(crate) const RESOURCE_POOL: [&str; 7] =
    ["iron", "timber", "gold", "grain", "fish", "coal", "spice"];

const RESOURCES_PER_REGION: usize = 2;

/// Build the regions and cities of a new world.
///
/// With dataset rows, up to `regions_count` distinct dataset regions are
/// chosen in random order and each keeps up to `cities_per_region` of its
/// cities. Without rows, `Region_{i}` / `City_{i}_{j}` are synthesized.
pub(crate) fn populate(
    world: &mut World,
    dataset: &[CityRecord],
    regions_count: usize,
    cities_per_region: usize,
    rng: &mut impl Rng,
) {
    if dataset.is_empty() {
        synthesize(world, regions_count, cities_per_region, rng);
    } else {
        from_dataset(world, dataset, regions_count, cities_per_region, rng);
    }
}

fn synthesize(
    world: &mut World,
    regions_count: usize,
    cities_per_region: usize,
    rng: &mut impl Rng,
) {
    for i in 1..=regions_count {
        let mut region = Region::new(format!("Region_{i}"));
        region.resources = sample_resources(rng);
        for j in 1..=cities_per_region {
            let name = format!("City_{i}_{j}");
            let population = rng.random_range(500..=50_000);
            world.cities.insert(name.clone(), City::new(name.clone(), population));
            region.cities.push(name);
        }
        world.regions.push(region);
    }
}

fn from_dataset(
    world: &mut World,
    dataset: &[CityRecord],
    regions_count: usize,
    cities_per_region: usize,
    rng: &mut impl Rng,
) {
    // Group rows by region, keeping first-seen region order.
    let mut order: Vec<&str> = Vec::new();
    let mut by_region: HashMap<&str, Vec<&CityRecord>> = HashMap::new();
    for row in dataset {
        by_region
            .entry(row.region.as_str())
            .or_insert_with(|| {
                order.push(row.region.as_str());
                Vec::new()
            })
            .push(row);
    }

    order.shuffle(rng);
    for region_name in order.into_iter().take(regions_count) {
        let mut region = Region::new(region_name);
        region.resources = sample_resources(rng);
        let rows = by_region.get(region_name).map(Vec::as_slice).unwrap_or_default();
        for row in rows.iter().take(cities_per_region) {
            let name = unique_name(&world.cities, &row.name);
            let population = if row.population == 0 {
                rng.random_range(1_000..=20_000)
            } else {
                row.population
            };
            world.cities.insert(name.clone(), City::new(name.clone(), population));
            region.cities.push(name);
        }
        world.regions.push(region);
    }
}

/// `name`, or `name_1`, `name_2`, ... for the first one not yet taken.
fn unique_name(cities: &BTreeMap<String, City>, name: &str) -> String {
    if !cities.contains_key(name) {
        return name.to_owned();
    }
    (1usize..)
        .map(|idx| format!("{name}_{idx}"))
        .find(|candidate| !cities.contains_key(candidate))
        .unwrap_or_else(|| name.to_owned())
}

fn sample_resources(rng: &mut impl Rng) -> Vec<String> {
    RESOURCE_POOL
        .choose_multiple(rng, RESOURCES_PER_REGION)
        .map(|r| (*r).to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn synthesize_names_and_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut world = World::new("W");
        populate(&mut world, &[], 3, 2, &mut rng);

        let names: Vec<_> = world.regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Region_1", "Region_2", "Region_3"]);
        assert_eq!(world.regions[1].cities, ["City_2_1", "City_2_2"]);
        assert_eq!(world.cities.len(), 6);
        assert!(world
            .cities
            .values()
            .all(|c| (500..=50_000).contains(&c.population)));
    }

    #[test]
    fn resources_are_two_distinct_from_pool() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let res = sample_resources(&mut rng);
            assert_eq!(res.len(), 2);
            assert_ne!(res[0], res[1]);
            assert!(res.iter().all(|r| RESOURCE_POOL.contains(&r.as_str())));
        }
    }

    #[test]
    fn dataset_limits_regions_and_cities() {
        let rows = vec![
            CityRecord::new("A1", "A", 10),
            CityRecord::new("A2", "A", 20),
            CityRecord::new("A3", "A", 30),
            CityRecord::new("B1", "B", 40),
            CityRecord::new("C1", "C", 50),
        ];
        let mut rng = StdRng::seed_from_u64(3);
        let mut world = World::new("W");
        populate(&mut world, &rows, 2, 2, &mut rng);

        assert_eq!(world.regions.len(), 2);
        for region in &world.regions {
            assert!(region.cities.len() <= 2);
            for city in &region.cities {
                assert!(world.cities.contains_key(city));
            }
        }
        if let Some(a) = world.region("A") {
            assert_eq!(a.cities, ["A1", "A2"]);
        }
    }

    #[test]
    fn dataset_regions_beyond_available_are_skipped() {
        let rows = vec![CityRecord::new("Solo", "Only", 5)];
        let mut rng = StdRng::seed_from_u64(3);
        let mut world = World::new("W");
        populate(&mut world, &rows, 4, 3, &mut rng);
        assert_eq!(world.regions.len(), 1);
        assert_eq!(world.city("Solo").unwrap().population, 5);
    }

    #[test]
    fn duplicate_dataset_names_get_suffixes() {
        let rows = vec![
            CityRecord::new("Springfield", "East", 100),
            CityRecord::new("Springfield", "East", 200),
            CityRecord::new("Springfield", "East", 300),
        ];
        let mut rng = StdRng::seed_from_u64(0);
        let mut world = World::new("W");
        populate(&mut world, &rows, 1, 3, &mut rng);

        assert_eq!(
            world.regions[0].cities,
            ["Springfield", "Springfield_1", "Springfield_2"]
        );
        assert_eq!(world.city("Springfield_2").unwrap().population, 300);
    }

    #[test]
    fn zero_population_rows_get_random_population() {
        let rows = vec![CityRecord::new("Ghost", "Void", 0)];
        let mut rng = StdRng::seed_from_u64(11);
        let mut world = World::new("W");
        populate(&mut world, &rows, 1, 1, &mut rng);
        let pop = world.city("Ghost").unwrap().population;
        assert!((1_000..=20_000).contains(&pop));
    }
}
