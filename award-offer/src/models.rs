use award_core::{Cabin, CityPair, RoundTripSummary};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

pub(crate) type PairingGroups = BTreeMap<CityPair, Vec<RoundTripSummary>>;
pub(crate) type CabinGroups = BTreeMap<Cabin, PairingGroups>;

/// Cheapest round trips per cabin and city pairing, each group ordered
/// cost-ascending. Never holds empty cabins or empty groups.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedResult {
    cabins: CabinGroups,
}

impl RankedResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_groups(mut cabins: CabinGroups) -> Self {
        for pairings in cabins.values_mut() {
            pairings.retain(|_, trips| !trips.is_empty());
        }
        cabins.retain(|_, pairings| !pairings.is_empty());
        Self { cabins }
    }

    pub(crate) fn into_groups(self) -> CabinGroups {
        self.cabins
    }

    pub fn is_empty(&self) -> bool {
        self.cabins.is_empty()
    }

    pub fn cabins(&self) -> impl Iterator<Item = Cabin> + '_ {
        self.cabins.keys().copied()
    }

    pub fn pairings(&self, cabin: Cabin) -> Option<&BTreeMap<CityPair, Vec<RoundTripSummary>>> {
        self.cabins.get(&cabin)
    }

    pub fn group(&self, cabin: Cabin, pair: &CityPair) -> Option<&[RoundTripSummary]> {
        self.cabins
            .get(&cabin)
            .and_then(|pairings| pairings.get(pair))
            .map(Vec::as_slice)
    }

    /// Every group as `(cabin, pairing, round trips)`.
    pub fn iter(&self) -> impl Iterator<Item = (Cabin, &CityPair, &[RoundTripSummary])> {
        self.cabins.iter().flat_map(|(cabin, pairings)| {
            pairings
                .iter()
                .map(move |(pair, trips)| (*cabin, pair, trips.as_slice()))
        })
    }

    pub fn round_trips(&self) -> impl Iterator<Item = &RoundTripSummary> {
        self.cabins
            .values()
            .flat_map(|pairings| pairings.values().flatten())
    }

    pub fn round_trip_count(&self) -> usize {
        self.round_trips().count()
    }
}

#[derive(serde::Serialize)]
struct PairingView<'a> {
    origin: &'a str,
    destination: &'a str,
    round_trips: &'a [RoundTripSummary],
}

/// Serialized as `{cabin: [{origin, destination, round_trips}]}` so the
/// city pair does not have to be a JSON object key.
impl Serialize for RankedResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cabins.len()))?;
        for (cabin, pairings) in &self.cabins {
            let views: Vec<PairingView<'_>> = pairings
                .iter()
                .map(|(pair, trips)| PairingView {
                    origin: &pair.origin,
                    destination: &pair.destination,
                    round_trips: trips,
                })
                .collect();
            map.serialize_entry(cabin, &views)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use award_core::TripSummary;
    use chrono::NaiveDate;

    fn round_trip(cost: u64) -> RoundTripSummary {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        let leg = |id: &str, from: &str, to: &str| TripSummary {
            id: id.to_string(),
            origin_city: from.to_string(),
            destination_city: to.to_string(),
            date,
            total_cost: cost,
        };
        RoundTripSummary::new(Cabin::First, leg("o", "London", "New York"), leg("r", "New York", "London"))
    }

    #[test]
    fn test_from_groups_drops_empty_entries() {
        let mut groups = CabinGroups::new();
        groups.entry(Cabin::Economy).or_default();
        groups
            .entry(Cabin::First)
            .or_default()
            .insert(CityPair::new("London", "New York"), vec![round_trip(10)]);
        groups
            .entry(Cabin::First)
            .or_default()
            .insert(CityPair::new("Paris", "Rome"), Vec::new());

        let result = RankedResult::from_groups(groups);
        assert_eq!(result.cabins().collect::<Vec<_>>(), vec![Cabin::First]);
        assert_eq!(result.round_trip_count(), 1);
        assert!(result.group(Cabin::First, &CityPair::new("Paris", "Rome")).is_none());
        assert!(RankedResult::from_groups(CabinGroups::new()).is_empty());
    }

    #[test]
    fn test_serializes_pairings_as_list() {
        let mut groups = CabinGroups::new();
        groups
            .entry(Cabin::First)
            .or_default()
            .insert(CityPair::new("London", "New York"), vec![round_trip(10)]);
        let json = serde_json::to_value(RankedResult::from_groups(groups)).unwrap();

        assert_eq!(json["first"][0]["origin"], "London");
        assert_eq!(json["first"][0]["round_trips"][0]["outbound"]["total_cost"], 10);
    }
}
