pub mod pricing;
pub mod rates;

pub use pricing::{convert_to_base, cost, CostCalculator, PricedLeg};
pub use rates::{CachedRates, CashTable, MileageTable};
