pub mod city;
pub mod config;
pub mod feed;
pub mod model;
pub mod rates;

pub use feed::AvailabilityRow;
pub use city::{CityDirectory, CityResolver, UNKNOWN_CITY, UNKNOWN_COUNTRY};
pub use config::{EngineConfig, ReturnWindow, TripFilter};
pub use model::{Cabin, CityPair, Leg, RoundTripSummary, Source, TripSummary};
pub use rates::{CashRateProvider, MileageRateProvider, IDENTITY_RATE};

use std::fmt;

/// Which lookup failed when a leg could not be priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateKind {
    Mileage,
    Cash,
}

impl fmt::Display for RateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateKind::Mileage => write!(f, "mileage"),
            RateKind::Cash => write!(f, "cash"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    ValidationError(String),
    #[error("No {kind} rate configured for '{key}'")]
    RateNotFound { kind: RateKind, key: String },
    #[error("Internal service error: {0}")]
    InternalError(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::ValidationError(msg.into())
    }

    pub fn mileage_rate_missing(program: impl Into<String>) -> Self {
        CoreError::RateNotFound {
            kind: RateKind::Mileage,
            key: program.into(),
        }
    }

    pub fn cash_rate_missing(currency: impl Into<String>) -> Self {
        CoreError::RateNotFound {
            kind: RateKind::Cash,
            key: currency.into(),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
