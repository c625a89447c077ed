use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::city::UNKNOWN_CITY;
use crate::CoreError;

/// Service class of an award seat. Serialized by name, parsed from the
/// name or the single-letter fare code used by the availability feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cabin {
    #[serde(alias = "Y", alias = "y")]
    Economy,
    #[serde(alias = "W", alias = "w")]
    Premium,
    #[serde(alias = "J", alias = "j")]
    Business,
    #[serde(alias = "F", alias = "f")]
    First,
}

impl Cabin {
    pub const ALL: [Cabin; 4] = [Cabin::Economy, Cabin::Premium, Cabin::Business, Cabin::First];

    /// Prefix of the per-cabin columns in a bulk availability row.
    pub fn code(&self) -> &'static str {
        match self {
            Cabin::Economy => "Y",
            Cabin::Premium => "W",
            Cabin::Business => "J",
            Cabin::First => "F",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Cabin::Economy => "economy",
            Cabin::Premium => "premium",
            Cabin::Business => "business",
            Cabin::First => "first",
        }
    }
}

impl fmt::Display for Cabin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cabin {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Cabin::ALL
            .into_iter()
            .find(|c| c.code().eq_ignore_ascii_case(needle) || c.name().eq_ignore_ascii_case(needle))
            .ok_or_else(|| CoreError::validation(format!("unknown cabin '{}'", s)))
    }
}

/// Loyalty program / availability source a payload was fetched from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Source {
    Azul,
    Smiles,
    Qantas,
    Other(String),
}

impl Source {
    /// Mileage program used when the configuration names none.
    pub fn default_program(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Azul => f.write_str("azul"),
            Source::Smiles => f.write_str("smiles"),
            Source::Qantas => f.write_str("qantas"),
            Source::Other(name) => f.write_str(name),
        }
    }
}

impl From<&str> for Source {
    fn from(value: &str) -> Self {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "azul" => Source::Azul,
            "smiles" => Source::Smiles,
            "qantas" => Source::Qantas,
            _ => Source::Other(normalized),
        }
    }
}

impl From<String> for Source {
    fn from(value: String) -> Self {
        Source::from(value.as_str())
    }
}

impl From<Source> for String {
    fn from(value: Source) -> Self {
        value.to_string()
    }
}

/// A single directional award offer, immutable once normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leg {
    pub id: String,
    pub source: Source,
    pub origin_airport: String,
    pub destination_airport: String,
    pub origin_city: String,
    pub destination_city: String,
    pub origin_country: String,
    pub destination_country: String,
    /// Route length as reported by the feed, when present.
    pub distance: Option<u64>,
    pub date: NaiveDate,
    pub cabin: Cabin,
    pub mileage_cost: u64,
    /// Minor units of `taxes_currency`.
    pub taxes: u64,
    pub taxes_currency: String,
}

impl Leg {
    pub fn city_pair(&self) -> CityPair {
        CityPair::new(self.origin_city.clone(), self.destination_city.clone())
    }

    /// Whole days from this leg's departure to `later`'s departure.
    pub fn days_until(&self, later: &Leg) -> i64 {
        (later.date - self.date).num_days()
    }
}

impl AsRef<Leg> for Leg {
    fn as_ref(&self) -> &Leg {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CityPair {
    pub origin: String,
    pub destination: String,
}

impl CityPair {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    /// False when either side could not be resolved to a city.
    pub fn is_known(&self) -> bool {
        self.origin != UNKNOWN_CITY && self.destination != UNKNOWN_CITY
    }
}

impl fmt::Display for CityPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.origin, self.destination)
    }
}

/// Display-relevant reduction of a costed leg.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripSummary {
    pub id: String,
    pub origin_city: String,
    pub destination_city: String,
    pub date: NaiveDate,
    /// Base-currency cents.
    pub total_cost: u64,
}

impl TripSummary {
    pub fn from_leg(leg: &Leg, total_cost: u64) -> Self {
        Self {
            id: leg.id.clone(),
            origin_city: leg.origin_city.clone(),
            destination_city: leg.destination_city.clone(),
            date: leg.date,
            total_cost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoundTripSummary {
    pub cabin: Cabin,
    pub outbound: TripSummary,
    #[serde(rename = "return")]
    pub return_trip: TripSummary,
}

impl RoundTripSummary {
    pub fn new(cabin: Cabin, outbound: TripSummary, return_trip: TripSummary) -> Self {
        Self {
            cabin,
            outbound,
            return_trip,
        }
    }

    pub fn combined_cost(&self) -> u64 {
        self.outbound.total_cost.saturating_add(self.return_trip.total_cost)
    }

    /// Grouping key: the outbound leg's origin and destination cities.
    pub fn city_pair(&self) -> CityPair {
        CityPair::new(
            self.outbound.origin_city.clone(),
            self.outbound.destination_city.clone(),
        )
    }

    pub fn stay_days(&self) -> i64 {
        (self.return_trip.date - self.outbound.date).num_days()
    }
}
