use award_core::feed::rows_of;
use award_core::{AvailabilityRow, Cabin, CityResolver, CoreError, CoreResult, Leg, Source};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Turns one source's bulk availability payload into flat legs.
pub struct Normalizer<'a> {
    cities: &'a dyn CityResolver,
    base_currency: String,
}

impl<'a> Normalizer<'a> {
    pub fn new(cities: &'a dyn CityResolver, base_currency: &str) -> Self {
        Self {
            cities,
            base_currency: base_currency.trim().to_ascii_uppercase(),
        }
    }

    /// Extracts one leg per bookable cabin of every usable row. Bad rows
    /// are logged and skipped; only an empty or unrecognized payload is
    /// an error.
    pub fn normalize(&self, payload: &Value, source: &Source, cabins: &[Cabin]) -> CoreResult<Vec<Leg>> {
        let rows = rows_of(payload)?;
        if rows.is_empty() {
            return Err(CoreError::validation(format!(
                "bulk availability payload for '{}' has no rows",
                source
            )));
        }

        let mut legs = Vec::new();
        let mut seen: HashSet<(String, Cabin)> = HashSet::new();
        let mut skipped_rows = 0usize;

        for (index, raw) in rows.iter().enumerate() {
            let row = match AvailabilityRow::deserialize(raw) {
                Ok(row) => row,
                Err(e) => {
                    warn!(%source, index, error = %e, "Skipping malformed availability row");
                    skipped_rows += 1;
                    continue;
                }
            };

            let Some(row_legs) = self.legs_of(&row, source, cabins, index) else {
                skipped_rows += 1;
                continue;
            };

            for leg in row_legs {
                if seen.insert((leg.id.clone(), leg.cabin)) {
                    legs.push(leg);
                } else {
                    debug!(%source, leg_id = %leg.id, cabin = %leg.cabin, "Dropping duplicate leg");
                }
            }
        }

        info!(
            %source,
            rows = rows.len(),
            skipped_rows,
            legs = legs.len(),
            "Normalized availability"
        );
        Ok(legs)
    }

    /// `None` when the row as a whole is unusable.
    fn legs_of(&self, row: &AvailabilityRow, source: &Source, cabins: &[Cabin], index: usize) -> Option<Vec<Leg>> {
        let Some(id) = row.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) else {
            warn!(%source, index, "Skipping row without ID");
            return None;
        };
        let Some(date) = row.parsed_date() else {
            warn!(%source, row_id = id, date = ?row.date, "Skipping row without parsable date");
            return None;
        };
        let (Some(origin_airport), Some(destination_airport)) = (row.origin_airport(), row.destination_airport()) else {
            warn!(%source, row_id = id, "Skipping row without route");
            return None;
        };

        let origin_city = self.cities.resolve_city(origin_airport);
        let destination_city = self.cities.resolve_city(destination_airport);
        // Rows with both airports unmapped are kept: their city pair is
        // Unknown -> Unknown, which ranking never emits and pairing never
        // matches with itself.
        if origin_city == destination_city && origin_city != award_core::UNKNOWN_CITY {
            warn!(%source, row_id = id, city = %origin_city, "Skipping row within a single city");
            return None;
        }

        let taxes_currency = row
            .taxes_currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_uppercase)
            .unwrap_or_else(|| self.base_currency.clone());

        let mut legs = Vec::with_capacity(cabins.len());
        for &cabin in cabins {
            let columns = row.cabin(cabin);
            if !columns.is_bookable() {
                continue;
            }
            let (Some(mileage), Some(taxes)) = (columns.mileage_cost, columns.total_taxes) else {
                warn!(%source, leg_id = id, %cabin, "Skipping cabin without mileage or taxes");
                continue;
            };
            let (Ok(mileage_cost), Ok(taxes)) = (u64::try_from(mileage), u64::try_from(taxes)) else {
                warn!(%source, leg_id = id, %cabin, mileage, taxes, "Skipping cabin with negative cost");
                continue;
            };

            legs.push(Leg {
                id: id.to_string(),
                source: source.clone(),
                origin_airport: origin_airport.to_ascii_uppercase(),
                destination_airport: destination_airport.to_ascii_uppercase(),
                origin_city: origin_city.clone(),
                destination_city: destination_city.clone(),
                origin_country: self.cities.resolve_country(origin_airport),
                destination_country: self.cities.resolve_country(destination_airport),
                distance: row.distance(),
                date,
                cabin,
                mileage_cost,
                taxes,
                taxes_currency: taxes_currency.clone(),
            });
        }
        Some(legs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use award_core::{CityDirectory, UNKNOWN_CITY, UNKNOWN_COUNTRY};
    use chrono::NaiveDate;
    use serde_json::json;

    fn directory() -> CityDirectory {
        let cities: CityDirectory = [("GRU", "São Paulo"), ("CGH", "São Paulo"), ("MIA", "Miami")]
            .into_iter()
            .collect();
        cities.with_country("GRU", "BR").with_country("MIA", "US")
    }

    fn row(id: &str, from: &str, to: &str, date: &str) -> Value {
        json!({
            "ID": id,
            "Date": date,
            "Route": {"OriginAirport": from, "DestinationAirport": to, "Source": "smiles", "Distance": 4100},
            "YAvailable": true,
            "YMileageCostRaw": 25000,
            "YTotalTaxes": 3000,
            "JAvailable": true,
            "JMileageCostRaw": 80000,
            "JTotalTaxes": 3000,
            "JRemainingSeats": 0,
            "TaxesCurrency": "usd"
        })
    }

    #[test]
    fn test_extracts_bookable_cabins() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "USD");
        let payload = json!({"data": [row("r1", "GRU", "MIA", "2025-05-01")], "hasMore": false});

        let legs = normalizer.normalize(&payload, &Source::Smiles, &Cabin::ALL).unwrap();
        assert_eq!(legs.len(), 1);

        let leg = &legs[0];
        assert_eq!(leg.cabin, Cabin::Economy);
        assert_eq!(leg.origin_city, "São Paulo");
        assert_eq!(leg.destination_city, "Miami");
        assert_eq!(leg.date, NaiveDate::from_ymd_opt(2025, 5, 1).unwrap());
        assert_eq!(leg.mileage_cost, 25000);
        assert_eq!(leg.taxes_currency, "USD");
        assert_eq!((leg.origin_country.as_str(), leg.destination_country.as_str()), ("BR", "US"));
        assert_eq!(leg.distance, Some(4100));
    }

    #[test]
    fn test_respects_allowed_cabins() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "USD");
        let payload = json!([row("r1", "GRU", "MIA", "2025-05-01")]);

        let legs = normalizer
            .normalize(&payload, &Source::Smiles, &[Cabin::Business, Cabin::First])
            .unwrap();
        assert!(legs.is_empty());
    }

    #[test]
    fn test_unmapped_airport_becomes_unknown() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "USD");
        let payload = json!([row("r1", "GRU", "XYZ", "2025-05-01")]);

        let legs = normalizer.normalize(&payload, &Source::Smiles, &Cabin::ALL).unwrap();
        assert_eq!(legs.len(), 1);
        assert_eq!(legs[0].destination_city, UNKNOWN_CITY);
        assert_eq!(legs[0].destination_country, UNKNOWN_COUNTRY);
    }

    #[test]
    fn test_rows_between_unmapped_airports_are_kept() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "USD");
        let payload = json!([row("r1", "XXX", "YYY", "2025-05-01")]);

        let legs = normalizer.normalize(&payload, &Source::Smiles, &Cabin::ALL).unwrap();
        assert_eq!(legs.len(), 1);
        assert!(!legs[0].city_pair().is_known());
    }

    #[test]
    fn test_skips_bad_records() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "USD");

        let mut negative = row("neg", "GRU", "MIA", "2025-05-02");
        negative["YTotalTaxes"] = json!(-5);
        let mut no_miles = row("nomiles", "GRU", "MIA", "2025-05-02");
        no_miles.as_object_mut().unwrap().remove("YMileageCostRaw");

        let payload = json!([
            row("ok", "GRU", "MIA", "2025-05-01"),
            row("baddate", "GRU", "MIA", "someday"),
            row("", "GRU", "MIA", "2025-05-01"),
            row("samecity", "GRU", "CGH", "2025-05-01"),
            {"ID": "noroute", "Date": "2025-05-01", "YAvailable": true},
            {"ID": 42, "Date": []},
            negative,
            no_miles,
            "garbage"
        ]);

        let legs = normalizer.normalize(&payload, &Source::Smiles, &Cabin::ALL).unwrap();
        let ids: Vec<&str> = legs.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
    }

    #[test]
    fn test_duplicate_rows_are_dropped() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "USD");
        let payload = json!([row("r1", "GRU", "MIA", "2025-05-01"), row("r1", "GRU", "MIA", "2025-05-01")]);

        let legs = normalizer.normalize(&payload, &Source::Smiles, &Cabin::ALL).unwrap();
        assert_eq!(legs.len(), 1);
    }

    #[test]
    fn test_missing_currency_defaults_to_base() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "usd");
        let mut raw = row("r1", "GRU", "MIA", "2025-05-01");
        raw.as_object_mut().unwrap().remove("TaxesCurrency");

        let legs = normalizer.normalize(&json!([raw]), &Source::Azul, &Cabin::ALL).unwrap();
        assert_eq!(legs[0].taxes_currency, "USD");
        assert_eq!(legs[0].source, Source::Azul);
    }

    #[test]
    fn test_empty_or_unrecognized_payload_is_validation_error() {
        let cities = directory();
        let normalizer = Normalizer::new(&cities, "USD");

        for payload in [json!({"data": []}), json!([]), json!({"rows": []}), json!(null)] {
            assert!(matches!(
                normalizer.normalize(&payload, &Source::Smiles, &Cabin::ALL),
                Err(CoreError::ValidationError(_))
            ));
        }
    }
}
