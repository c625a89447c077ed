use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::Cabin;
use crate::{CoreError, CoreResult};

// ============================================================================
// Bulk availability page, as returned by the award search provider
// ============================================================================

/// Locates the row list in a raw payload: either `{"data": [...]}` or a
/// bare array of rows.
pub fn rows_of(payload: &Value) -> CoreResult<&[Value]> {
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(page) => match page.get("data") {
            Some(Value::Array(rows)) => rows,
            Some(_) => {
                return Err(CoreError::validation(
                    "bulk availability 'data' is not an array",
                ))
            }
            None => {
                return Err(CoreError::validation(
                    "bulk availability payload has no 'data' rows",
                ))
            }
        },
        _ => {
            return Err(CoreError::validation(
                "bulk availability payload is not an object or array",
            ))
        }
    };
    Ok(rows.as_slice())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteInfo {
    #[serde(rename = "OriginAirport")]
    pub origin_airport: Option<String>,
    #[serde(rename = "DestinationAirport")]
    pub destination_airport: Option<String>,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    /// Route length as reported by the provider.
    #[serde(rename = "Distance")]
    pub distance: Option<i64>,
}

/// A single availability record: one route on one date, all cabins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AvailabilityRow {
    #[serde(rename = "ID")]
    pub id: Option<String>,
    #[serde(rename = "Date")]
    pub date: Option<String>,
    #[serde(rename = "Route")]
    pub route: Option<RouteInfo>,
    #[serde(rename = "Source")]
    pub source: Option<String>,
    #[serde(rename = "TaxesCurrency")]
    pub taxes_currency: Option<String>,

    #[serde(rename = "YAvailable")]
    pub y_available: Option<bool>,
    #[serde(rename = "YMileageCostRaw")]
    pub y_mileage_cost: Option<i64>,
    #[serde(rename = "YTotalTaxes")]
    pub y_total_taxes: Option<i64>,
    #[serde(rename = "YRemainingSeats")]
    pub y_remaining_seats: Option<i64>,

    #[serde(rename = "WAvailable")]
    pub w_available: Option<bool>,
    #[serde(rename = "WMileageCostRaw")]
    pub w_mileage_cost: Option<i64>,
    #[serde(rename = "WTotalTaxes")]
    pub w_total_taxes: Option<i64>,
    #[serde(rename = "WRemainingSeats")]
    pub w_remaining_seats: Option<i64>,

    #[serde(rename = "JAvailable")]
    pub j_available: Option<bool>,
    #[serde(rename = "JMileageCostRaw")]
    pub j_mileage_cost: Option<i64>,
    #[serde(rename = "JTotalTaxes")]
    pub j_total_taxes: Option<i64>,
    #[serde(rename = "JRemainingSeats")]
    pub j_remaining_seats: Option<i64>,

    #[serde(rename = "FAvailable")]
    pub f_available: Option<bool>,
    #[serde(rename = "FMileageCostRaw")]
    pub f_mileage_cost: Option<i64>,
    #[serde(rename = "FTotalTaxes")]
    pub f_total_taxes: Option<i64>,
    #[serde(rename = "FRemainingSeats")]
    pub f_remaining_seats: Option<i64>,
}

/// The per-cabin columns of a row, gathered under one name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CabinColumns {
    pub available: Option<bool>,
    pub mileage_cost: Option<i64>,
    pub total_taxes: Option<i64>,
    pub remaining_seats: Option<i64>,
}

impl AvailabilityRow {
    pub fn cabin(&self, cabin: Cabin) -> CabinColumns {
        match cabin {
            Cabin::Economy => CabinColumns {
                available: self.y_available,
                mileage_cost: self.y_mileage_cost,
                total_taxes: self.y_total_taxes,
                remaining_seats: self.y_remaining_seats,
            },
            Cabin::Premium => CabinColumns {
                available: self.w_available,
                mileage_cost: self.w_mileage_cost,
                total_taxes: self.w_total_taxes,
                remaining_seats: self.w_remaining_seats,
            },
            Cabin::Business => CabinColumns {
                available: self.j_available,
                mileage_cost: self.j_mileage_cost,
                total_taxes: self.j_total_taxes,
                remaining_seats: self.j_remaining_seats,
            },
            Cabin::First => CabinColumns {
                available: self.f_available,
                mileage_cost: self.f_mileage_cost,
                total_taxes: self.f_total_taxes,
                remaining_seats: self.f_remaining_seats,
            },
        }
    }

    pub fn origin_airport(&self) -> Option<&str> {
        self.route
            .as_ref()
            .and_then(|r| r.origin_airport.as_deref())
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn destination_airport(&self) -> Option<&str> {
        self.route
            .as_ref()
            .and_then(|r| r.destination_airport.as_deref())
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    pub fn distance(&self) -> Option<u64> {
        self.route
            .as_ref()
            .and_then(|r| r.distance)
            .and_then(|d| u64::try_from(d).ok())
    }

    /// Departure date; RFC 3339 timestamps are truncated to their date.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }
}

impl CabinColumns {
    /// Seats count only when the feed reports it.
    pub fn is_bookable(&self) -> bool {
        self.available == Some(true) && self.remaining_seats.map_or(true, |seats| seats > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rows_of_accepts_page_and_bare_array() {
        let page = json!({"data": [{"ID": "1"}], "hasMore": false});
        assert_eq!(rows_of(&page).unwrap().len(), 1);

        let bare = json!([{"ID": "1"}, {"ID": "2"}]);
        assert_eq!(rows_of(&bare).unwrap().len(), 2);
    }

    #[test]
    fn test_rows_of_rejects_unrecognized_payloads() {
        assert!(matches!(rows_of(&json!({"rows": []})), Err(CoreError::ValidationError(_))));
        assert!(matches!(rows_of(&json!({"data": 3})), Err(CoreError::ValidationError(_))));
        assert!(matches!(rows_of(&json!("nope")), Err(CoreError::ValidationError(_))));
    }

    #[test]
    fn test_row_deserialization() {
        let raw = json!({
            "ID": "abc",
            "Date": "2025-08-01",
            "Route": {"OriginAirport": "GRU", "DestinationAirport": "MIA", "Source": "smiles", "Distance": 4100},
            "JAvailable": true,
            "JMileageCostRaw": 90000,
            "JTotalTaxes": 12000,
            "JRemainingSeats": 2,
            "TaxesCurrency": "BRL"
        });
        let row = AvailabilityRow::deserialize(&raw).unwrap();

        assert_eq!(row.id.as_deref(), Some("abc"));
        assert_eq!(row.origin_airport(), Some("GRU"));
        assert_eq!(row.distance(), Some(4100));
        assert_eq!(row.parsed_date(), NaiveDate::from_ymd_opt(2025, 8, 1));

        let business = row.cabin(Cabin::Business);
        assert!(business.is_bookable());
        assert_eq!(business.mileage_cost, Some(90000));
        assert!(!row.cabin(Cabin::First).is_bookable());
    }

    #[test]
    fn test_date_parsing_variants() {
        let mut row = AvailabilityRow::default();
        row.date = Some("2025-08-01T00:00:00Z".to_string());
        assert_eq!(row.parsed_date(), NaiveDate::from_ymd_opt(2025, 8, 1));

        row.date = Some("not a date".to_string());
        assert_eq!(row.parsed_date(), None);
    }

    #[test]
    fn test_sold_out_cabin_is_not_bookable() {
        let columns = CabinColumns {
            available: Some(true),
            mileage_cost: Some(1000),
            total_taxes: Some(10),
            remaining_seats: Some(0),
        };
        assert!(!columns.is_bookable());
    }
}
