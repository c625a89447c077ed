use award_catalog::{CostCalculator, PricedLeg};
use award_core::{
    Cabin, CashRateProvider, CityResolver, CoreError, CoreResult, EngineConfig, MileageRateProvider,
    RoundTripSummary, Source, TripSummary,
};
use award_core::feed::rows_of;
use serde_json::Value;
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

use crate::merge::merge;
use crate::models::RankedResult;
use crate::normalizer::Normalizer;
use crate::one_way::select_top_one_way;
use crate::pairing::pair;
use crate::ranking::select_top_n;

/// One configured run over a snapshot of availability. Collaborators are
/// borrowed so callers decide how rates are cached and shared.
pub struct AwardPipeline<'a> {
    config: &'a EngineConfig,
    cities: &'a dyn CityResolver,
    mileage: &'a dyn MileageRateProvider,
    cash: &'a dyn CashRateProvider,
}

impl<'a> AwardPipeline<'a> {
    pub fn new(
        config: &'a EngineConfig,
        cities: &'a dyn CityResolver,
        mileage: &'a dyn MileageRateProvider,
        cash: &'a dyn CashRateProvider,
    ) -> CoreResult<Self> {
        check_setup(config, cash)?;
        Ok(Self {
            config,
            cities,
            mileage,
            cash,
        })
    }

    /// Ranks every source and merges the results. A source whose payload
    /// has no rows contributes nothing; the run fails only when every
    /// source is empty.
    pub fn run(&self, payloads: &BTreeMap<Source, Value>) -> CoreResult<RankedResult> {
        if payloads.is_empty() {
            return Err(CoreError::validation("no availability payloads supplied"));
        }

        let span = info_span!("award_pipeline", run_id = %Uuid::new_v4(), sources = payloads.len());
        let _entered = span.enter();

        let mut results = Vec::with_capacity(payloads.len());
        for (source, payload) in payloads {
            results.push(self.rank_source(source, payload)?);
        }
        combine_available(results, self.config.top_n)
    }

    /// Normalize, price, pair, filter and rank one source.
    pub fn run_source(&self, source: &Source, payload: &Value) -> CoreResult<RankedResult> {
        self.rank_source(source, payload).map(Option::unwrap_or_default)
    }

    /// `None` when the payload is recognizable but carries no rows.
    fn rank_source(&self, source: &Source, payload: &Value) -> CoreResult<Option<RankedResult>> {
        if rows_of(payload)?.is_empty() {
            warn!(%source, "Availability payload has no rows, treating source as empty");
            return Ok(None);
        }

        let priced = self.priced_legs(source, payload)?;
        let window = self.config.return_window()?;
        let filter = &self.config.filter;

        let pairs = pair(&priced, &window);
        let paired = pairs.len();
        let accepted: Vec<RoundTripSummary> = pairs
            .into_iter()
            .filter(|(outbound, back)| {
                filter.is_empty() || filter.accepts(&outbound.leg, outbound.total_cost.saturating_add(back.total_cost))
            })
            .map(|(outbound, back)| round_trip(outbound, back))
            .collect();
        if accepted.len() < paired {
            debug!(%source, paired, accepted = accepted.len(), "Filtered round trips");
        }

        let result = select_top_n(accepted, self.config.top_n);
        if result.is_empty() {
            info!(%source, "No round trips found");
        }
        Ok(Some(result))
    }

    /// Cheapest one-way legs per cabin for one source.
    pub fn run_one_way(&self, source: &Source, payload: &Value) -> CoreResult<BTreeMap<Cabin, Vec<TripSummary>>> {
        let priced = self.priced_legs(source, payload)?;
        Ok(select_top_one_way(&priced, self.config.top_n))
    }

    fn priced_legs(&self, source: &Source, payload: &Value) -> CoreResult<Vec<PricedLeg>> {
        let cabins = self.config.cabins();
        let legs = Normalizer::new(self.cities, &self.config.base_currency).normalize(payload, source, &cabins)?;

        let program = self.config.program_for(source);
        let priced = CostCalculator::new(self.mileage, self.cash).price_all(legs, &program);
        if priced.is_empty() {
            warn!(%source, program = %program, "No priceable legs");
        }
        Ok(priced)
    }
}

fn round_trip(outbound: &PricedLeg, back: &PricedLeg) -> RoundTripSummary {
    RoundTripSummary::new(
        outbound.leg.cabin,
        TripSummary::from_leg(&outbound.leg, outbound.total_cost),
        TripSummary::from_leg(&back.leg, back.total_cost),
    )
}

fn check_setup(config: &EngineConfig, cash: &dyn CashRateProvider) -> CoreResult<()> {
    config.validate()?;
    if !config.base_currency.trim().eq_ignore_ascii_case(cash.base_currency().trim()) {
        return Err(CoreError::validation(format!(
            "base currency {} does not match exchange rates in {}",
            config.base_currency,
            cash.base_currency()
        )));
    }
    Ok(())
}

/// Merges the results of sources that had rows. Fails when no source did.
fn combine_available(results: Vec<Option<RankedResult>>, n: NonZeroUsize) -> CoreResult<RankedResult> {
    let available: Vec<RankedResult> = results.into_iter().flatten().collect();
    if available.is_empty() {
        return Err(CoreError::validation("every availability payload is empty"));
    }
    combine(available, n)
}

/// Merges per-source results, skipping sources that found nothing.
fn combine(results: impl IntoIterator<Item = RankedResult>, n: NonZeroUsize) -> CoreResult<RankedResult> {
    let mut combined = RankedResult::new();
    for result in results {
        if result.is_empty() {
            continue;
        }
        combined = if combined.is_empty() {
            result
        } else {
            merge(combined, result, n)?
        };
    }
    Ok(combined)
}

/// Runs every source through the full pipeline and merges the results.
pub fn run_pipeline(
    payloads: &BTreeMap<Source, Value>,
    config: &EngineConfig,
    cities: &dyn CityResolver,
    mileage: &dyn MileageRateProvider,
    cash: &dyn CashRateProvider,
) -> CoreResult<RankedResult> {
    AwardPipeline::new(config, cities, mileage, cash)?.run(payloads)
}

/// Same result as [`run_pipeline`], with each source processed on the
/// blocking pool. Merging starts once every source has finished.
pub async fn run_pipeline_concurrent(
    payloads: BTreeMap<Source, Value>,
    config: Arc<EngineConfig>,
    cities: Arc<dyn CityResolver>,
    mileage: Arc<dyn MileageRateProvider>,
    cash: Arc<dyn CashRateProvider>,
) -> CoreResult<RankedResult> {
    if payloads.is_empty() {
        return Err(CoreError::validation("no availability payloads supplied"));
    }
    check_setup(&config, &*cash)?;

    let span = info_span!("award_pipeline", run_id = %Uuid::new_v4(), sources = payloads.len());
    let mut tasks = JoinSet::new();

    for (source, payload) in payloads {
        let config = Arc::clone(&config);
        let cities = Arc::clone(&cities);
        let mileage = Arc::clone(&mileage);
        let cash = Arc::clone(&cash);
        let span = span.clone();

        tasks.spawn_blocking(move || {
            let _entered = span.enter();
            let pipeline = AwardPipeline::new(&config, &*cities, &*mileage, &*cash)?;
            let result = pipeline.rank_source(&source, &payload)?;
            Ok::<_, CoreError>((source, result))
        });
    }

    let mut results = BTreeMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (source, result) = joined.map_err(|e| CoreError::InternalError(format!("source task failed: {}", e)))??;
        results.insert(source, result);
    }

    let _entered = span.enter();
    combine_available(results.into_values().collect(), config.top_n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use award_catalog::{CashTable, MileageTable};
    use award_core::CityDirectory;

    #[test]
    fn test_base_currency_mismatch_is_rejected() {
        let config = EngineConfig::new("USD", 1, 10, 3).unwrap();
        let cities = CityDirectory::new();
        let mileage = MileageTable::new();
        let cash = CashTable::new("BRL");

        assert!(matches!(
            AwardPipeline::new(&config, &cities, &mileage, &cash),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_no_payloads_is_rejected() {
        let config = EngineConfig::default();
        let cities = CityDirectory::new();
        let mileage = MileageTable::new();
        let cash = CashTable::new("USD");

        assert!(matches!(
            run_pipeline(&BTreeMap::new(), &config, &cities, &mileage, &cash),
            Err(CoreError::ValidationError(_))
        ));
    }

    #[test]
    fn test_all_sources_without_rows_is_rejected() {
        let n = NonZeroUsize::new(2).unwrap();
        assert!(matches!(
            combine_available(vec![None, None], n),
            Err(CoreError::ValidationError(_))
        ));
        assert!(combine_available(vec![None, Some(RankedResult::new())], n)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_combine_skips_empty_results() {
        let n = NonZeroUsize::new(2).unwrap();
        let combined = combine(vec![RankedResult::new(), RankedResult::new()], n).unwrap();
        assert!(combined.is_empty());
    }
}
