use award_core::{CashRateProvider, CoreError, CoreResult, MileageRateProvider, IDENTITY_RATE};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Mileage valuations per loyalty program (cents per mile).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MileageTable {
    rates: HashMap<String, u64>,
}

impl MileageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, program: &str, cents_per_mile: u64) -> Self {
        self.insert(program, cents_per_mile);
        self
    }

    pub fn insert(&mut self, program: &str, cents_per_mile: u64) {
        self.rates.insert(program_key(program), cents_per_mile);
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

impl<K: AsRef<str>> FromIterator<(K, u64)> for MileageTable {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut table = MileageTable::new();
        for (program, rate) in iter {
            table.insert(program.as_ref(), rate);
        }
        table
    }
}

impl MileageRateProvider for MileageTable {
    fn mileage_rate(&self, program: &str) -> CoreResult<u64> {
        self.rates
            .get(&program_key(program))
            .copied()
            .ok_or_else(|| CoreError::mileage_rate_missing(program))
    }
}

/// Exchange rates into one base currency (base cents per unit).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashTable {
    base_currency: String,
    rates: HashMap<String, u64>,
}

impl CashTable {
    pub fn new(base_currency: &str) -> Self {
        Self {
            base_currency: currency_key(base_currency),
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: &str, base_cents_per_unit: u64) -> Self {
        self.insert(currency, base_cents_per_unit);
        self
    }

    pub fn insert(&mut self, currency: &str, base_cents_per_unit: u64) {
        self.rates.insert(currency_key(currency), base_cents_per_unit);
    }
}

impl CashRateProvider for CashTable {
    fn base_currency(&self) -> &str {
        &self.base_currency
    }

    fn cash_rate(&self, currency: &str) -> CoreResult<u64> {
        let key = currency_key(currency);
        if key == self.base_currency {
            return Ok(IDENTITY_RATE);
        }
        self.rates
            .get(&key)
            .copied()
            .ok_or_else(|| CoreError::cash_rate_missing(key))
    }
}

fn program_key(program: &str) -> String {
    program.trim().to_ascii_lowercase()
}

fn currency_key(currency: &str) -> String {
    currency.trim().to_ascii_uppercase()
}

/// Memoizes successful lookups of an underlying provider. Misses are not
/// cached so a provider that learns a rate later is asked again.
#[derive(Debug)]
pub struct CachedRates<P> {
    inner: P,
    mileage: DashMap<String, u64>,
    cash: DashMap<String, u64>,
}

impl<P> CachedRates<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            mileage: DashMap::new(),
            cash: DashMap::new(),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.mileage.len() + self.cash.len()
    }

    pub fn clear(&self) {
        self.mileage.clear();
        self.cash.clear();
    }
}

impl<P: MileageRateProvider> MileageRateProvider for CachedRates<P> {
    fn mileage_rate(&self, program: &str) -> CoreResult<u64> {
        let key = program_key(program);
        if let Some(rate) = self.mileage.get(&key) {
            return Ok(*rate);
        }
        let rate = self.inner.mileage_rate(program)?;
        self.mileage.insert(key, rate);
        Ok(rate)
    }
}

impl<P: CashRateProvider> CashRateProvider for CachedRates<P> {
    fn base_currency(&self) -> &str {
        self.inner.base_currency()
    }

    fn cash_rate(&self, currency: &str) -> CoreResult<u64> {
        let key = currency_key(currency);
        if let Some(rate) = self.cash.get(&key) {
            return Ok(*rate);
        }
        let rate = self.inner.cash_rate(currency)?;
        self.cash.insert(key, rate);
        Ok(rate)
    }
}
