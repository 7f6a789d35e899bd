use serde_json::Value;
use worldforge_kernel::{Region, World};

use crate::error::ValidationError;
use crate::update::Update;

/// Check a raw update against a raw world.
///
/// Steps, in order: parse the world through the document model, decode the
/// update payload, then run the operation-specific checks.
pub fn validate_raw(world: &Value, update: &Value) -> Result<(), ValidationError> {
    let world = World::parse(world)?;
    check_payload(&world, update).map(drop)
}

/// Decode a raw update payload and check it against `world`.
///
/// Failures come in this order: the world itself, the payload shape, the
/// op's checks against the world, then the op's population rule.
pub fn check_payload(world: &World, payload: &Value) -> Result<Update, ValidationError> {
    check_world(world)?;
    let decoded = Update::decode(payload)?;
    validate(world, &decoded.update)?;
    decoded.into_update()
}

/// Decide whether `update` may legally be applied to `world`.
///
/// Pure predicate: nothing is mutated or persisted.
pub fn validate(world: &World, update: &Update) -> Result<(), ValidationError> {
    check_world(world)?;

    match update {
        Update::AddCity { region, city } => {
            require_region(world, region)?;
            if world.cities.contains_key(&city.name) {
                return reject(format!("City '{}' already exists", city.name));
            }
        }
        Update::AddResource { region, resource } => {
            if require_region(world, region)?.has_resource(resource) {
                return reject(format!("Resource '{resource}' already present in region"));
            }
        }
        Update::TransferCity { city, from, to } => {
            let (Some(source), Some(_)) = (world.region(from), world.region(to)) else {
                return reject("Invalid 'from' or 'to' region");
            };
            if !world.cities.contains_key(city) {
                return reject("City does not exist");
            }
            if !source.has_city(city) {
                return reject(format!("City not found in region '{from}'"));
            }
        }
        Update::SetPopulation { city, .. } => {
            if !world.cities.contains_key(city) {
                return reject("City does not exist");
            }
        }
    }

    tracing::debug!(op = update.op(), world = %world.name, "update validated");
    Ok(())
}

/// The world must satisfy the document model, including the key rules that
/// in-memory edits can break, and every region's city names must resolve.
fn check_world(world: &World) -> Result<(), ValidationError> {
    world.check()?;
    check_integrity(world)
}

fn check_integrity(world: &World) -> Result<(), ValidationError> {
    for region in &world.regions {
        if let Some(missing) = region
            .cities
            .iter()
            .find(|c| !world.cities.contains_key(c.as_str()))
        {
            return Err(ValidationError::invalid_world(format!(
                "region '{}' references unknown city '{missing}'",
                region.name
            )));
        }
    }
    Ok(())
}

fn require_region<'w>(world: &'w World, name: &str) -> Result<&'w Region, ValidationError> {
    world
        .region(name)
        .ok_or_else(|| ValidationError::new(format!("Region '{name}' does not exist")))
}

fn reject(message: impl Into<String>) -> Result<(), ValidationError> {
    Err(ValidationError::new(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use worldforge_kernel::City;

    fn world() -> World {
        World::parse(&json!({
            "name": "Testworld",
            "regions": [
                {"name": "Northland", "cities": ["Frostgate", "Whitehill"], "resources": ["iron", "timber"]},
                {"name": "Southreach", "cities": ["Sunport"], "resources": ["fish"]}
            ],
            "cities": {
                "Frostgate": {"name": "Frostgate", "population": 12000},
                "Whitehill": {"name": "Whitehill", "population": 8000},
                "Sunport": {"name": "Sunport", "population": 42000}
            }
        }))
        .unwrap()
    }

    fn message(world: &World, update: Update) -> String {
        validate(world, &update).unwrap_err().message
    }

    #[test]
    fn add_city_valid() {
        let w = world();
        let update = Update::AddCity {
            region: "Northland".into(),
            city: City::new("Icewater", 100),
        };
        assert!(validate(&w, &update).is_ok());
    }

    #[test]
    fn add_city_unknown_region() {
        let w = world();
        let update = Update::AddCity {
            region: "Atlantis".into(),
            city: City::new("Icewater", 100),
        };
        assert_eq!(message(&w, update), "Region 'Atlantis' does not exist");
    }

    #[test]
    fn add_city_duplicate_name() {
        let w = world();
        let update = Update::AddCity {
            region: "Southreach".into(),
            city: City::new("Frostgate", 1),
        };
        assert_eq!(message(&w, update), "City 'Frostgate' already exists");
    }

    #[test]
    fn add_resource_duplicate() {
        let w = world();
        let update = Update::AddResource {
            region: "Northland".into(),
            resource: "iron".into(),
        };
        assert_eq!(message(&w, update), "Resource 'iron' already present in region");
    }

    #[test]
    fn transfer_checks_regions_then_city() {
        let w = world();
        let bad_region = Update::TransferCity {
            city: "Frostgate".into(),
            from: "Northland".into(),
            to: "Atlantis".into(),
        };
        assert_eq!(message(&w, bad_region), "Invalid 'from' or 'to' region");

        let no_city = Update::TransferCity {
            city: "Ghost".into(),
            from: "Northland".into(),
            to: "Southreach".into(),
        };
        assert_eq!(message(&w, no_city), "City does not exist");

        let wrong_source = Update::TransferCity {
            city: "Sunport".into(),
            from: "Northland".into(),
            to: "Southreach".into(),
        };
        assert_eq!(message(&w, wrong_source), "City not found in region 'Northland'");
    }

    #[test]
    fn set_population_unknown_city() {
        let w = world();
        let update = Update::SetPopulation {
            city: "Ghost".into(),
            population: 1,
        };
        assert_eq!(message(&w, update), "City does not exist");
    }

    #[test]
    fn dangling_region_reference_rejected() {
        let mut w = world();
        w.regions[1].cities.push("Nowhere".into());
        let update = Update::SetPopulation {
            city: "Sunport".into(),
            population: 1,
        };
        let err = validate(&w, &update).unwrap_err();
        assert_eq!(err.message, "Current world data is invalid");
        assert!(err.details.unwrap().contains("Nowhere"));
    }

    #[test]
    fn validate_raw_reports_schema_details() {
        let raw_world = json!({"name": "Broken", "cities": {"X": {"name": "X", "population": -1}}});
        let err = validate_raw(&raw_world, &json!({"op": "set_population"})).unwrap_err();
        assert_eq!(err.message, "Current world data is invalid");
        assert!(err.details.is_some());
    }

    #[test]
    fn validate_raw_checks_world_before_op() {
        let err = validate_raw(&json!({"regions": []}), &json!({})).unwrap_err();
        assert_eq!(err.message, "Current world data is invalid");

        let err = validate_raw(&world().to_value(), &json!({})).unwrap_err();
        assert_eq!(err.message, "Missing 'op' field in update");
    }

    #[test]
    fn duplicate_region_in_memory_rejected() {
        let mut w = world();
        w.regions.push(Region::new("Northland"));
        let update = Update::AddResource {
            region: "Northland".into(),
            resource: "gold".into(),
        };
        let err = validate(&w, &update).unwrap_err();
        assert_eq!(err.message, "Current world data is invalid");
        assert!(err.details.unwrap().contains("Northland"));
    }

    #[test]
    fn mismatched_city_key_in_memory_rejected() {
        let mut w = world();
        w.cities.insert("A".into(), City::new("B", 1));
        let update = Update::AddCity {
            region: "Northland".into(),
            city: City::new("B", 5),
        };
        assert_eq!(message(&w, update), "Current world data is invalid");
    }

    #[test]
    fn world_checks_precede_population_rules() {
        let raw = world().to_value();
        let cases = [
            (
                json!({"op": "add_city", "region": "Atlantis", "city": {"name": "X", "population": -1}}),
                "Region 'Atlantis' does not exist",
            ),
            (
                json!({"op": "add_city", "region": "Northland", "city": {"name": "Frostgate", "population": -1}}),
                "City 'Frostgate' already exists",
            ),
            (
                json!({"op": "set_population", "city": "Ghost", "population": -1}),
                "City does not exist",
            ),
            (
                json!({"op": "add_city", "region": "Northland", "city": {"name": "X", "population": -1}}),
                "Population must be >= 0",
            ),
            (
                json!({"op": "set_population", "city": "Sunport", "population": -1}),
                "Population must be a non-negative integer",
            ),
        ];
        for (payload, expected) in cases {
            let err = validate_raw(&raw, &payload).unwrap_err();
            assert_eq!(err.message, expected, "{payload}");
        }
    }

    #[test]
    fn check_payload_returns_decoded_update() {
        let update = check_payload(
            &world(),
            &json!({"op": "set_population", "city": "Sunport", "population": 7}),
        )
        .unwrap();
        assert_eq!(
            update,
            Update::SetPopulation {
                city: "Sunport".into(),
                population: 7
            }
        );
    }

    #[test]
    fn validate_raw_accepts_legal_update() {
        let update = json!({"op": "add_resource", "region": "Northland", "resource": "gold"});
        assert!(validate_raw(&world().to_value(), &update).is_ok());
    }

    #[test]
    fn validation_does_not_mutate() {
        let w = world();
        let before = w.clone();
        let update = Update::AddResource {
            region: "Northland".into(),
            resource: "gold".into(),
        };
        validate(&w, &update).unwrap();
        assert_eq!(w, before);
    }
}
