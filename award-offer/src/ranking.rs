use award_core::{CityPair, RoundTripSummary};
use std::cmp::Ordering;
use std::num::NonZeroUsize;
use tracing::{debug, info};

use crate::models::{CabinGroups, RankedResult};

/// Total order used for every ranking: combined cost, then earlier
/// outbound departure, then identifiers.
pub fn rank_order(a: &RoundTripSummary, b: &RoundTripSummary) -> Ordering {
    a.combined_cost()
        .cmp(&b.combined_cost())
        .then_with(|| a.outbound.date.cmp(&b.outbound.date))
        .then_with(|| a.outbound.id.cmp(&b.outbound.id))
        .then_with(|| a.return_trip.id.cmp(&b.return_trip.id))
        .then_with(|| a.return_trip.date.cmp(&b.return_trip.date))
        .then_with(|| a.outbound.total_cost.cmp(&b.outbound.total_cost))
}

/// Groups round trips by cabin and city pairing and keeps the `n`
/// cheapest trips of the `n` cheapest pairings per cabin. Pairings with
/// an unresolved city are dropped.
pub fn select_top_n<I>(round_trips: I, n: NonZeroUsize) -> RankedResult
where
    I: IntoIterator<Item = RoundTripSummary>,
{
    let mut groups = CabinGroups::new();
    let mut candidates = 0usize;
    for trip in round_trips {
        candidates += 1;
        groups
            .entry(trip.cabin)
            .or_default()
            .entry(trip.city_pair())
            .or_default()
            .push(trip);
    }

    let result = cap_groups(groups, n);
    info!(
        candidates,
        kept = result.round_trip_count(),
        n = n.get(),
        "Selected cheapest round trips"
    );
    result
}

/// Sorts, de-duplicates and truncates every group, then keeps the `n`
/// pairings per cabin whose cheapest trip is cheapest.
pub(crate) fn cap_groups(groups: CabinGroups, n: NonZeroUsize) -> RankedResult {
    let n = n.get();
    let mut capped = CabinGroups::new();

    for (cabin, pairings) in groups {
        let mut ranked: Vec<(CityPair, Vec<RoundTripSummary>)> = Vec::with_capacity(pairings.len());
        for (pair, mut trips) in pairings {
            if !pair.is_known() {
                debug!(%cabin, pairing = %pair, dropped = trips.len(), "Excluding pairing with unknown city");
                continue;
            }
            trips.sort_by(rank_order);
            trips.dedup();
            trips.truncate(n);
            if !trips.is_empty() {
                ranked.push((pair, trips));
            }
        }

        ranked.sort_by(|(pair_a, trips_a), (pair_b, trips_b)| {
            cheapest_cost(trips_a)
                .cmp(&cheapest_cost(trips_b))
                .then_with(|| pair_a.cmp(pair_b))
        });
        if ranked.len() > n {
            debug!(%cabin, pairings = ranked.len(), kept = n, "Dropping costlier pairings");
        }
        ranked.truncate(n);

        if !ranked.is_empty() {
            capped.insert(cabin, ranked.into_iter().collect());
        }
    }

    RankedResult::from_groups(capped)
}

fn cheapest_cost(trips: &[RoundTripSummary]) -> u64 {
    trips.first().map_or(u64::MAX, RoundTripSummary::combined_cost)
}
