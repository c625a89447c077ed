use std::collections::HashMap;

/// City name given to airports the directory does not know.
pub const UNKNOWN_CITY: &str = "Unknown";
/// Country code given to airports whose country is not known.
pub const UNKNOWN_COUNTRY: &str = "Unknown";

/// Maps an airport code to the city it serves. Total: never fails.
pub trait CityResolver: Send + Sync {
    fn resolve_city(&self, airport_code: &str) -> String;

    /// Country of the airport, [`UNKNOWN_COUNTRY`] when not known.
    fn resolve_country(&self, _airport_code: &str) -> String {
        UNKNOWN_COUNTRY.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AirportEntry {
    city: String,
    country: Option<String>,
}

/// In-memory airport directory keyed by upper-case IATA code.
#[derive(Debug, Clone, Default)]
pub struct CityDirectory {
    airports: HashMap<String, AirportEntry>,
}

impl CityDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an airport, keeping any country already set.
    pub fn insert(&mut self, airport_code: &str, city: impl Into<String>) {
        let city = city.into();
        self.airports
            .entry(airport_key(airport_code))
            .and_modify(|entry| entry.city = city.clone())
            .or_insert(AirportEntry { city, country: None });
    }

    /// Sets the country of an airport, e.g. `BR`. Airports without a city
    /// still resolve to [`UNKNOWN_CITY`].
    pub fn set_country(&mut self, airport_code: &str, country: &str) {
        let country = country.trim().to_ascii_uppercase();
        self.airports
            .entry(airport_key(airport_code))
            .and_modify(|entry| entry.country = Some(country.clone()))
            .or_insert(AirportEntry {
                city: UNKNOWN_CITY.to_string(),
                country: Some(country),
            });
    }

    pub fn with_country(mut self, airport_code: &str, country: &str) -> Self {
        self.set_country(airport_code, country);
        self
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

fn airport_key(airport_code: &str) -> String {
    airport_code.trim().to_ascii_uppercase()
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for CityDirectory {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut directory = CityDirectory::new();
        for (code, city) in iter {
            directory.insert(code.as_ref(), city);
        }
        directory
    }
}

impl CityResolver for CityDirectory {
    fn resolve_city(&self, airport_code: &str) -> String {
        self.airports
            .get(&airport_key(airport_code))
            .map(|entry| entry.city.clone())
            .unwrap_or_else(|| UNKNOWN_CITY.to_string())
    }

    fn resolve_country(&self, airport_code: &str) -> String {
        self.airports
            .get(&airport_key(airport_code))
            .and_then(|entry| entry.country.clone())
            .unwrap_or_else(|| UNKNOWN_COUNTRY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmapped_airport_is_unknown() {
        let directory: CityDirectory = [("GRU", "São Paulo"), ("mia", "Miami")]
            .into_iter()
            .collect();

        assert_eq!(directory.resolve_city("gru"), "São Paulo");
        assert_eq!(directory.resolve_city("MIA"), "Miami");
        assert_eq!(directory.resolve_city("XXX"), UNKNOWN_CITY);
        assert_eq!(directory.len(), 2);
    }

    #[test]
    fn test_countries_resolve_independently_of_cities() {
        let mut directory: CityDirectory = [("GRU", "São Paulo")].into_iter().collect();
        directory.set_country("gru", "br");
        let directory = directory.with_country("JFK", "US");

        assert_eq!(directory.resolve_country("GRU"), "BR");
        assert_eq!(directory.resolve_city("GRU"), "São Paulo");
        assert_eq!(directory.resolve_country("JFK"), "US");
        assert_eq!(directory.resolve_city("JFK"), UNKNOWN_CITY);
        assert_eq!(directory.resolve_country("MIA"), UNKNOWN_COUNTRY);

        let mut renamed = directory;
        renamed.insert("JFK", "New York");
        assert_eq!(renamed.resolve_country("JFK"), "US");
    }
}
