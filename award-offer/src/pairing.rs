use award_core::{Cabin, Leg, ReturnWindow};
use std::collections::HashMap;
use tracing::debug;

type DirectionKey<'k> = (Cabin, &'k str, &'k str);

/// Pairs every outbound leg with every return leg flying the mirrored
/// city pair in the same cabin whose departure falls inside `window`.
///
/// Legs are indexed by `(cabin, origin city, destination city)` so each
/// outbound only visits its mirrored bucket instead of every leg.
pub fn pair<'a, L: AsRef<Leg>>(legs: &'a [L], window: &ReturnWindow) -> Vec<(&'a L, &'a L)> {
    let mut index: HashMap<DirectionKey<'a>, Vec<&'a L>> = HashMap::new();
    for item in legs {
        let leg = item.as_ref();
        index
            .entry((leg.cabin, leg.origin_city.as_str(), leg.destination_city.as_str()))
            .or_default()
            .push(item);
    }

    let mut pairs = Vec::new();
    for outbound in legs {
        let out = outbound.as_ref();
        let mirrored = (out.cabin, out.destination_city.as_str(), out.origin_city.as_str());
        let Some(returns) = index.get(&mirrored) else {
            continue;
        };

        for &candidate in returns {
            // Unknown -> Unknown legs land in their own mirrored bucket.
            if std::ptr::eq(outbound, candidate) {
                continue;
            }
            let back = candidate.as_ref();
            if window.contains(out.days_until(back)) {
                pairs.push((outbound, candidate));
            }
        }
    }

    debug!(
        legs = legs.len(),
        directions = index.len(),
        pairs = pairs.len(),
        min_days = window.min_days,
        max_days = window.max_days,
        "Paired legs into round trips"
    );
    pairs
}
