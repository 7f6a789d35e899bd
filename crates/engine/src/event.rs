use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use worldforge_common::{Timestamp, utc_now};
use worldforge_kernel::World;

const DEPOSITS: [&str; 4] = ["coal", "gold", "salt", "spice"];

/// Kind of a suggested event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    DiscoverResource,
    Drought,
    TradeRoute,
    PopulationBoost,
    /// Sentinel returned for a world without regions.
    NoRegions,
}

impl EventKind {
    const CITY_TEMPLATES: [Self; 2] = [Self::DiscoverResource, Self::PopulationBoost];
    const REGION_TEMPLATES: [Self; 2] = [Self::Drought, Self::TradeRoute];
}

/// A suggested (not applied) happening in a world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub text: String,
    pub timestamp: Timestamp,
}

/// Pick a random event template and fill it from the world's names.
///
/// City templates are only eligible when the world has cities.
pub(crate) fn suggest(world: &World, rng: &mut impl Rng) -> Event {
    let regions: Vec<&str> = world.regions.iter().map(|r| r.name.as_str()).collect();
    let cities: Vec<&str> = world.cities.keys().map(String::as_str).collect();

    let (kind, text) = match (regions.choose(rng), cities.is_empty()) {
        (None, _) => (
            EventKind::NoRegions,
            "No regions to generate events for.".to_owned(),
        ),
        (Some(&region), no_cities) => {
            let mut templates = EventKind::REGION_TEMPLATES.to_vec();
            if !no_cities {
                templates.extend(EventKind::CITY_TEMPLATES);
            }
            let kind = templates
                .choose(rng)
                .copied()
                .unwrap_or(EventKind::Drought);
            let city = cities.choose(rng).copied().unwrap_or_default();
            let text = match kind {
                EventKind::DiscoverResource => {
                    let deposit = DEPOSITS.choose(rng).copied().unwrap_or("coal");
                    format!("City {city} discovers a deposit of {deposit}.")
                }
                EventKind::Drought => format!("Region {region} suffers a drought."),
                EventKind::TradeRoute => {
                    let other = regions.choose(rng).copied().unwrap_or(region);
                    format!("Trade route opens between {region} and {other}.")
                }
                EventKind::PopulationBoost => {
                    format!("City {city} experiences an unexpected population growth.")
                }
                EventKind::NoRegions => "No regions to generate events for.".to_owned(),
            };
            (kind, text)
        }
    };

    Event {
        kind,
        text,
        timestamp: utc_now(),
    }
}
