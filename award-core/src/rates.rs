use crate::CoreResult;

/// Cents of base currency per unit of base currency.
pub const IDENTITY_RATE: u64 = 100;

/// Values a loyalty program's miles in base-currency cents per mile.
pub trait MileageRateProvider: Send + Sync {
    /// Fails with `CoreError::RateNotFound` for unknown programs.
    fn mileage_rate(&self, program: &str) -> CoreResult<u64>;
}

/// Exchange rates into the system base currency.
pub trait CashRateProvider: Send + Sync {
    fn base_currency(&self) -> &str;

    /// Base-currency cents per unit of `currency`. Returns
    /// [`IDENTITY_RATE`] for the base currency itself.
    fn cash_rate(&self, currency: &str) -> CoreResult<u64>;
}

impl<T: MileageRateProvider + ?Sized> MileageRateProvider for &T {
    fn mileage_rate(&self, program: &str) -> CoreResult<u64> {
        (**self).mileage_rate(program)
    }
}

impl<T: CashRateProvider + ?Sized> CashRateProvider for &T {
    fn base_currency(&self) -> &str {
        (**self).base_currency()
    }

    fn cash_rate(&self, currency: &str) -> CoreResult<u64> {
        (**self).cash_rate(currency)
    }
}

impl<T: MileageRateProvider + ?Sized> MileageRateProvider for std::sync::Arc<T> {
    fn mileage_rate(&self, program: &str) -> CoreResult<u64> {
        (**self).mileage_rate(program)
    }
}

impl<T: CashRateProvider + ?Sized> CashRateProvider for std::sync::Arc<T> {
    fn base_currency(&self) -> &str {
        (**self).base_currency()
    }

    fn cash_rate(&self, currency: &str) -> CoreResult<u64> {
        (**self).cash_rate(currency)
    }
}
