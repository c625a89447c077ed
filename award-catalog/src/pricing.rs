use award_core::{CashRateProvider, CoreResult, Leg, MileageRateProvider, IDENTITY_RATE};
use serde::Serialize;
use tracing::{info, warn};

/// Converts minor units of `currency` into base-currency cents.
/// Truncates toward zero so the converted cost is never overstated.
pub fn convert_to_base(amount: u64, currency: &str, base_currency: &str, rate: u64) -> u64 {
    if currency.trim().eq_ignore_ascii_case(base_currency.trim()) {
        return amount;
    }
    amount.saturating_mul(rate) / IDENTITY_RATE
}

/// Standardized total of one leg: mileage valued at `mileage_rate` cents
/// per mile plus taxes converted with `cash_rate` (base cents per unit).
pub fn cost(leg: &Leg, mileage_rate: u64, cash_rate: u64, base_currency: &str) -> u64 {
    let mileage = leg.mileage_cost.saturating_mul(mileage_rate);
    let taxes = convert_to_base(leg.taxes, &leg.taxes_currency, base_currency, cash_rate);
    mileage.saturating_add(taxes)
}

/// A normalized leg together with its total in base-currency cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PricedLeg {
    pub leg: Leg,
    pub total_cost: u64,
}

impl AsRef<Leg> for PricedLeg {
    fn as_ref(&self) -> &Leg {
        &self.leg
    }
}

/// Prices legs against injected rate providers.
pub struct CostCalculator<'a> {
    mileage: &'a dyn MileageRateProvider,
    cash: &'a dyn CashRateProvider,
}

impl<'a> CostCalculator<'a> {
    pub fn new(mileage: &'a dyn MileageRateProvider, cash: &'a dyn CashRateProvider) -> Self {
        Self { mileage, cash }
    }

    /// Total cost of one leg under `program`'s mileage valuation.
    pub fn cost(&self, leg: &Leg, program: &str) -> CoreResult<u64> {
        let mileage_rate = self.mileage.mileage_rate(program)?;
        let cash_rate = self.cash.cash_rate(&leg.taxes_currency)?;
        Ok(cost(leg, mileage_rate, cash_rate, self.cash.base_currency()))
    }

    /// Prices a batch, skipping legs that cannot be priced. An unknown
    /// program leaves the whole batch unpriced, which is not an error.
    pub fn price_all(&self, legs: Vec<Leg>, program: &str) -> Vec<PricedLeg> {
        let mileage_rate = match self.mileage.mileage_rate(program) {
            Ok(rate) => rate,
            Err(e) => {
                warn!(program, legs = legs.len(), error = %e, "Skipping batch without mileage rate");
                return Vec::new();
            }
        };

        let total = legs.len();
        let mut priced = Vec::with_capacity(total);
        for leg in legs {
            match self.cash.cash_rate(&leg.taxes_currency) {
                Ok(cash_rate) => {
                    let total_cost = cost(&leg, mileage_rate, cash_rate, self.cash.base_currency());
                    priced.push(PricedLeg { leg, total_cost });
                }
                Err(e) => {
                    warn!(leg_id = %leg.id, cabin = %leg.cabin, error = %e, "Skipping unpriceable leg");
                }
            }
        }

        info!(program, priced = priced.len(), skipped = total - priced.len(), "Priced legs");
        priced
    }
}
