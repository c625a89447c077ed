use award_catalog::PricedLeg;
use award_core::{Cabin, CityPair, TripSummary};
use std::collections::{BTreeMap, HashMap};
use std::num::NonZeroUsize;
use tracing::info;

/// Cheapest single legs per cabin: one leg per city pair, the `n`
/// cheapest pairs kept. Legs touching an unknown city are ignored.
pub fn select_top_one_way(legs: &[PricedLeg], n: NonZeroUsize) -> BTreeMap<Cabin, Vec<TripSummary>> {
    let mut cheapest: HashMap<(Cabin, CityPair), &PricedLeg> = HashMap::new();
    for priced in legs {
        let pair = priced.leg.city_pair();
        if !pair.is_known() {
            continue;
        }
        cheapest
            .entry((priced.leg.cabin, pair))
            .and_modify(|best| {
                if one_way_key(priced) < one_way_key(best) {
                    *best = priced;
                }
            })
            .or_insert(priced);
    }

    let mut by_cabin: BTreeMap<Cabin, Vec<&PricedLeg>> = BTreeMap::new();
    for ((cabin, _), priced) in cheapest {
        by_cabin.entry(cabin).or_default().push(priced);
    }

    let result: BTreeMap<Cabin, Vec<TripSummary>> = by_cabin
        .into_iter()
        .map(|(cabin, mut ranked)| {
            ranked.sort_by(|a, b| one_way_key(a).cmp(&one_way_key(b)));
            let trips = ranked
                .into_iter()
                .take(n.get())
                .map(|p| TripSummary::from_leg(&p.leg, p.total_cost))
                .collect();
            (cabin, trips)
        })
        .collect();

    info!(
        legs = legs.len(),
        cabins = result.len(),
        n = n.get(),
        "Selected cheapest one-way legs"
    );
    result
}

fn one_way_key(priced: &PricedLeg) -> (u64, chrono::NaiveDate, &str, &str, &str) {
    (
        priced.total_cost,
        priced.leg.date,
        priced.leg.id.as_str(),
        priced.leg.origin_city.as_str(),
        priced.leg.destination_city.as_str(),
    )
}
