use award_core::{CoreError, CoreResult};
use std::num::NonZeroUsize;
use tracing::info;

use crate::models::RankedResult;
use crate::ranking::cap_groups;

/// Combines two independently ranked results into one. Groups present in
/// both are re-ranked over their union and capped at `n` again; groups
/// present in one side only are carried over.
pub fn merge(a: RankedResult, b: RankedResult, n: NonZeroUsize) -> CoreResult<RankedResult> {
    match (a.is_empty(), b.is_empty()) {
        (true, true) => Err(CoreError::validation("nothing to merge: both results are empty")),
        (false, true) => Ok(a),
        (true, false) => Ok(b),
        (false, false) => {
            let before = a.round_trip_count() + b.round_trip_count();
            let mut groups = a.into_groups();
            for (cabin, pairings) in b.into_groups() {
                let target = groups.entry(cabin).or_default();
                for (pair, trips) in pairings {
                    target.entry(pair).or_default().extend(trips);
                }
            }

            let merged = cap_groups(groups, n);
            info!(before, after = merged.round_trip_count(), n = n.get(), "Merged ranked results");
            Ok(merged)
        }
    }
}
