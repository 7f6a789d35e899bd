use serde::{Deserialize, Serialize};
use serde_json::Value;
use worldforge_kernel::City;

use crate::error::ValidationError;

/// A request to mutate the current world in one of a fixed set of ways.
///
/// Serialized with an `op` tag, e.g.
/// `{"op":"add_resource","region":"Northland","resource":"gold"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Update {
    /// Insert a new city and list it under an existing region.
    AddCity { region: String, city: City },
    /// Append a resource to a region's resource list.
    AddResource { region: String, resource: String },
    /// Move a city name from one region's list to another's.
    TransferCity {
        city: String,
        from: String,
        to: String,
    },
    /// Overwrite a city's population.
    SetPopulation { city: String, population: u64 },
}

/// An update decoded from a payload, with its population rule still pending.
///
/// Population rules are checked after the world-side checks of the same op
/// (region and name for `add_city`, city existence for `set_population`), so
/// decoding records the violation here and substitutes a population of 0.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded {
    pub update: Update,
    pub population_error: Option<ValidationError>,
}

impl Decoded {
    fn ready(update: Update) -> Self {
        Self {
            update,
            population_error: None,
        }
    }

    /// The update, or the pending population error.
    pub fn into_update(self) -> Result<Update, ValidationError> {
        match self.population_error {
            Some(err) => Err(err),
            None => Ok(self.update),
        }
    }
}

impl Update {
    /// Decode a free-form update payload, failing on any population error.
    ///
    /// Use [`crate::check_payload`] when a world is at hand so failures are
    /// reported in validation order.
    pub fn from_value(payload: &Value) -> Result<Self, ValidationError> {
        Self::decode(payload)?.into_update()
    }

    /// Decode a free-form update payload.
    ///
    /// This is the only place an operation is chosen by its string tag; the
    /// messages match what callers of the validator expect to see.
    pub fn decode(payload: &Value) -> Result<Decoded, ValidationError> {
        let Some(op) = non_empty_str(payload, "op") else {
            return Err(ValidationError::new("Missing 'op' field in update"));
        };

        match op {
            "add_city" => {
                let region = non_empty_str(payload, "region");
                let city = payload.get("city").filter(|c| is_truthy(c));
                let (Some(region), Some(city)) = (region, city) else {
                    return Err(ValidationError::new(
                        "add_city requires 'region' and 'city' fields",
                    ));
                };
                let mut city = city.clone();
                let mut population_error = None;
                if city
                    .get("population")
                    .and_then(Value::as_i64)
                    .is_some_and(|p| p < 0)
                {
                    city["population"] = Value::from(0u64);
                    population_error = Some(ValidationError::new("Population must be >= 0"));
                }
                let city = City::deserialize(&city).map_err(|e| {
                    ValidationError::new("Invalid city payload").with_details(e.to_string())
                })?;
                Ok(Decoded {
                    update: Self::AddCity {
                        region: region.to_owned(),
                        city,
                    },
                    population_error,
                })
            }
            "add_resource" => {
                let region = non_empty_str(payload, "region");
                let resource = non_empty_str(payload, "resource");
                let (Some(region), Some(resource)) = (region, resource) else {
                    return Err(ValidationError::new(
                        "add_resource requires 'region' and 'resource'",
                    ));
                };
                Ok(Decoded::ready(Self::AddResource {
                    region: region.to_owned(),
                    resource: resource.to_owned(),
                }))
            }
            "transfer_city" => {
                let city = non_empty_str(payload, "city");
                let from = non_empty_str(payload, "from");
                let to = non_empty_str(payload, "to");
                let (Some(city), Some(from), Some(to)) = (city, from, to) else {
                    return Err(ValidationError::new(
                        "transfer_city requires 'city', 'from', 'to'",
                    ));
                };
                Ok(Decoded::ready(Self::TransferCity {
                    city: city.to_owned(),
                    from: from.to_owned(),
                    to: to.to_owned(),
                }))
            }
            "set_population" => {
                let Some(city) = non_empty_str(payload, "city") else {
                    return Err(ValidationError::new("City does not exist"));
                };
                let (population, population_error) =
                    match payload.get("population").and_then(Value::as_u64) {
                        Some(population) => (population, None),
                        None => (
                            0,
                            Some(ValidationError::new(
                                "Population must be a non-negative integer",
                            )),
                        ),
                    };
                Ok(Decoded {
                    update: Self::SetPopulation {
                        city: city.to_owned(),
                        population,
                    },
                    population_error,
                })
            }
            other => Err(ValidationError::new(format!("Unknown operation: {other}"))),
        }
    }

    /// The operation tag.
    pub fn op(&self) -> &'static str {
        match self {
            Self::AddCity { .. } => "add_city",
            Self::AddResource { .. } => "add_resource",
            Self::TransferCity { .. } => "transfer_city",
            Self::SetPopulation { .. } => "set_population",
        }
    }

    /// Descriptive tag recorded on the snapshot taken after this update.
    pub fn describe(&self) -> String {
        match self {
            Self::AddCity { city, .. } => format!("add_city:{}", city.name),
            Self::AddResource { region, resource } => format!("add_resource:{resource}@{region}"),
            Self::TransferCity { city, from, to } => format!("transfer_city:{city}:{from}->{to}"),
            Self::SetPopulation { city, population } => format!("set_pop:{city}:{population}"),
        }
    }
}

fn non_empty_str<'a>(payload: &'a Value, key: &str) -> Option<&'a str> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

/// Presence in the loose sense payload authors expect: null, false, zero,
/// and empty strings, arrays, or objects all count as absent.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(payload: Value) -> String {
        Update::from_value(&payload).unwrap_err().message
    }

    #[test]
    fn decode_add_resource() {
        let update =
            Update::from_value(&json!({"op": "add_resource", "region": "Northland", "resource": "gold"}))
                .unwrap();
        assert_eq!(
            update,
            Update::AddResource {
                region: "Northland".into(),
                resource: "gold".into()
            }
        );
    }

    #[test]
    fn decode_add_city_fills_attributes() {
        let update = Update::from_value(&json!({
            "op": "add_city",
            "region": "Northland",
            "city": {"name": "Icewater", "population": 300}
        }))
        .unwrap();
        let Update::AddCity { city, .. } = update else {
            panic!("expected add_city");
        };
        assert_eq!(city, City::new("Icewater", 300));
    }

    #[test]
    fn missing_or_empty_op() {
        assert_eq!(message(json!({"region": "x"})), "Missing 'op' field in update");
        assert_eq!(message(json!({"op": ""})), "Missing 'op' field in update");
    }

    #[test]
    fn unknown_op() {
        assert_eq!(message(json!({"op": "raze_city"})), "Unknown operation: raze_city");
    }

    #[test]
    fn add_city_requires_fields() {
        assert_eq!(
            message(json!({"op": "add_city", "region": "Northland"})),
            "add_city requires 'region' and 'city' fields"
        );
        assert_eq!(
            message(json!({"op": "add_city", "region": "Northland", "city": {}})),
            "add_city requires 'region' and 'city' fields"
        );
    }

    #[test]
    fn add_city_negative_population() {
        assert_eq!(
            message(json!({"op": "add_city", "region": "N", "city": {"name": "X", "population": -1}})),
            "Population must be >= 0"
        );
    }

    #[test]
    fn add_city_malformed_city_carries_details() {
        let err = Update::from_value(&json!({
            "op": "add_city", "region": "N", "city": {"name": "X"}
        }))
        .unwrap_err();
        assert_eq!(err.message, "Invalid city payload");
        assert!(err.details.unwrap().contains("population"));
    }

    #[test]
    fn add_city_falsy_city_counts_as_missing() {
        for city in [json!([]), json!(""), json!(0), json!(false), Value::Null] {
            assert_eq!(
                message(json!({"op": "add_city", "region": "Northland", "city": city})),
                "add_city requires 'region' and 'city' fields"
            );
        }
    }

    #[test]
    fn decode_defers_population_errors() {
        let decoded = Update::decode(&json!({
            "op": "add_city", "region": "Atlantis", "city": {"name": "X", "population": -1}
        }))
        .unwrap();
        assert_eq!(
            decoded.update,
            Update::AddCity {
                region: "Atlantis".into(),
                city: City::new("X", 0)
            }
        );
        assert_eq!(
            decoded.population_error.unwrap().message,
            "Population must be >= 0"
        );

        let decoded =
            Update::decode(&json!({"op": "set_population", "city": "Ghost", "population": 2.5}))
                .unwrap();
        assert!(decoded.population_error.is_some());
        assert!(decoded.clone().into_update().is_err());
    }

    #[test]
    fn transfer_requires_all_fields() {
        assert_eq!(
            message(json!({"op": "transfer_city", "city": "X", "from": "A"})),
            "transfer_city requires 'city', 'from', 'to'"
        );
    }

    #[test]
    fn set_population_rejects_non_integers() {
        for bad in [json!(-3), json!(2.5), json!("100"), Value::Null] {
            assert_eq!(
                message(json!({"op": "set_population", "city": "X", "population": bad})),
                "Population must be a non-negative integer"
            );
        }
    }

    #[test]
    fn describe_tags() {
        let update = Update::TransferCity {
            city: "Frostgate".into(),
            from: "Northland".into(),
            to: "Southreach".into(),
        };
        assert_eq!(update.describe(), "transfer_city:Frostgate:Northland->Southreach");
        let update = Update::SetPopulation {
            city: "Sunport".into(),
            population: 5,
        };
        assert_eq!(update.describe(), "set_pop:Sunport:5");
    }

    #[test]
    fn serialized_form_uses_op_tag() {
        let update = Update::AddResource {
            region: "Northland".into(),
            resource: "gold".into(),
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value["op"], "add_resource");
        assert_eq!(Update::from_value(&value).unwrap(), update);
    }
}
