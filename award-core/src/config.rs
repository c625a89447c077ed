use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::num::NonZeroUsize;

use crate::model::{Cabin, Leg, Source};
use crate::{CoreError, CoreResult};

/// Inclusive bounds on the days between an outbound and its return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnWindow {
    pub min_days: i64,
    pub max_days: i64,
}

impl ReturnWindow {
    pub fn new(min_days: i64, max_days: i64) -> CoreResult<Self> {
        if min_days < 0 {
            return Err(CoreError::validation(format!(
                "min_return_days must not be negative, got {}",
                min_days
            )));
        }
        if min_days > max_days {
            return Err(CoreError::validation(format!(
                "min_return_days ({}) exceeds max_return_days ({})",
                min_days, max_days
            )));
        }
        Ok(Self { min_days, max_days })
    }

    pub fn contains(&self, days: i64) -> bool {
        days >= self.min_days && days <= self.max_days
    }
}

/// Optional narrowing of round trips before ranking. Every criterion
/// looks at the outbound leg; the cost cap looks at both legs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TripFilter {
    pub origin_cities: Option<BTreeSet<String>>,
    pub destination_cities: Option<BTreeSet<String>>,
    pub exclude_origin_cities: BTreeSet<String>,
    pub exclude_destination_cities: BTreeSet<String>,
    /// Country codes, e.g. `BR`; compared case-insensitively.
    pub origin_countries: Option<BTreeSet<String>>,
    pub destination_countries: Option<BTreeSet<String>>,
    /// Bounds on the outbound route length; a leg without a reported
    /// distance counts as zero.
    pub min_distance: Option<u64>,
    pub max_distance: Option<u64>,
    /// Upper bound on outbound + return cost, base-currency cents.
    pub max_combined_cost: Option<u64>,
}

impl TripFilter {
    pub fn is_empty(&self) -> bool {
        *self == TripFilter::default()
    }

    pub fn accepts(&self, outbound: &Leg, combined_cost: u64) -> bool {
        let origin = &outbound.origin_city;
        let destination = &outbound.destination_city;

        if !allowed(&self.origin_cities, |city| city == origin)
            || !allowed(&self.destination_cities, |city| city == destination)
        {
            return false;
        }

        if self.exclude_origin_cities.contains(origin)
            || self.exclude_destination_cities.contains(destination)
        {
            return false;
        }

        if !allowed(&self.origin_countries, |c| c.eq_ignore_ascii_case(&outbound.origin_country))
            || !allowed(&self.destination_countries, |c| {
                c.eq_ignore_ascii_case(&outbound.destination_country)
            })
        {
            return false;
        }

        let distance = outbound.distance.unwrap_or(0);
        if self.min_distance.map_or(false, |min| distance < min)
            || self.max_distance.map_or(false, |max| distance > max)
        {
            return false;
        }

        self.max_combined_cost
            .map_or(true, |max| combined_cost <= max)
    }
}

/// `None` accepts everything; otherwise some entry must match.
fn allowed(set: &Option<BTreeSet<String>>, matches: impl Fn(&String) -> bool) -> bool {
    set.as_ref().map_or(true, |entries| entries.iter().any(matches))
}

/// Everything one pipeline run needs besides payloads and collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Empty means every cabin.
    #[serde(default)]
    pub allowed_cabins: BTreeSet<Cabin>,
    #[serde(default = "default_min_return_days")]
    pub min_return_days: i64,
    #[serde(default = "default_max_return_days")]
    pub max_return_days: i64,
    #[serde(default = "default_top_n")]
    pub top_n: NonZeroUsize,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Mileage program per source; sources not listed use their own name.
    #[serde(default)]
    pub programs: BTreeMap<Source, String>,
    #[serde(default)]
    pub filter: TripFilter,
}

fn default_min_return_days() -> i64 {
    1
}

fn default_max_return_days() -> i64 {
    30
}

fn default_top_n() -> NonZeroUsize {
    NonZeroUsize::new(5).unwrap_or(NonZeroUsize::MIN)
}

fn default_base_currency() -> String {
    "USD".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            allowed_cabins: BTreeSet::new(),
            min_return_days: default_min_return_days(),
            max_return_days: default_max_return_days(),
            top_n: default_top_n(),
            base_currency: default_base_currency(),
            programs: BTreeMap::new(),
            filter: TripFilter::default(),
        }
    }
}

impl EngineConfig {
    /// Validated constructor; `top_n` of zero is a configuration error.
    pub fn new(
        base_currency: &str,
        min_return_days: i64,
        max_return_days: i64,
        top_n: usize,
    ) -> CoreResult<Self> {
        let top_n = NonZeroUsize::new(top_n)
            .ok_or_else(|| CoreError::validation("top_n must be a positive integer"))?;
        let config = Self {
            min_return_days,
            max_return_days,
            top_n,
            base_currency: base_currency.trim().to_ascii_uppercase(),
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_cabins(mut self, cabins: impl IntoIterator<Item = Cabin>) -> Self {
        self.allowed_cabins = cabins.into_iter().collect();
        self
    }

    pub fn with_program(mut self, source: Source, program: impl Into<String>) -> Self {
        self.programs.insert(source, program.into());
        self
    }

    pub fn with_filter(mut self, filter: TripFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn validate(&self) -> CoreResult<()> {
        if self.base_currency.trim().is_empty() {
            return Err(CoreError::validation("base_currency must be set"));
        }
        self.return_window().map(|_| ())
    }

    pub fn return_window(&self) -> CoreResult<ReturnWindow> {
        ReturnWindow::new(self.min_return_days, self.max_return_days)
    }

    /// Cabins to extract, in fixed order.
    pub fn cabins(&self) -> Vec<Cabin> {
        if self.allowed_cabins.is_empty() {
            Cabin::ALL.to_vec()
        } else {
            self.allowed_cabins.iter().copied().collect()
        }
    }

    pub fn program_for(&self, source: &Source) -> String {
        self.programs
            .get(source)
            .cloned()
            .unwrap_or_else(|| source.default_program())
    }
}
