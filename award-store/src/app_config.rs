use award_catalog::{CashTable, MileageTable};
use award_core::{CityDirectory, CoreError, EngineConfig};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use tracing::info;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to load settings: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid engine settings: {0}")]
    Invalid(#[from] CoreError),
}

/// Engine configuration plus the static lookup data it runs against.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub engine: EngineConfig,
    /// Program -> cents per mile.
    #[serde(default)]
    pub mileage_rates: BTreeMap<String, u64>,
    /// Currency -> base-currency cents per unit.
    #[serde(default)]
    pub cash_rates: BTreeMap<String, u64>,
    /// Airport code -> city name.
    #[serde(default)]
    pub cities: BTreeMap<String, String>,
    /// Airport code -> country code.
    #[serde(default)]
    pub countries: BTreeMap<String, String>,
}

impl Settings {
    /// Reads `config/default`, then the optional `config/{RUN_MODE}` and
    /// `config/local` files, then `AWARD__`-prefixed environment variables.
    pub fn load() -> Result<Self, SettingsError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Not checked in.
            .add_source(config::File::with_name("config/local").required(false))
            // e.g. `AWARD__ENGINE__TOP_N=3`
            .add_source(config::Environment::with_prefix("AWARD").separator("__"))
            .build()?;

        let settings = Self::finish(s)?;
        info!(
            run_mode = %run_mode,
            top_n = settings.engine.top_n.get(),
            base_currency = %settings.engine.base_currency,
            programs = settings.mileage_rates.len(),
            currencies = settings.cash_rates.len(),
            airports = settings.cities.len(),
            countries = settings.countries.len(),
            "Loaded settings"
        );
        Ok(settings)
    }

    /// Parses settings from a TOML document, without files or environment.
    pub fn from_toml_str(toml: &str) -> Result<Self, SettingsError> {
        let s = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Self::finish(s)
    }

    fn finish(s: config::Config) -> Result<Self, SettingsError> {
        let mut settings: Settings = s.try_deserialize()?;
        settings.engine.base_currency = settings.engine.base_currency.trim().to_ascii_uppercase();
        settings.engine.validate()?;
        Ok(settings)
    }

    pub fn mileage_table(&self) -> MileageTable {
        self.mileage_rates.iter().map(|(program, rate)| (program, *rate)).collect()
    }

    /// Exchange rates into the engine's base currency.
    pub fn cash_table(&self) -> CashTable {
        let mut table = CashTable::new(&self.engine.base_currency);
        for (currency, rate) in &self.cash_rates {
            table.insert(currency, *rate);
        }
        table
    }

    pub fn city_directory(&self) -> CityDirectory {
        let mut directory: CityDirectory = self.cities.iter().map(|(code, city)| (code, city.clone())).collect();
        for (code, country) in &self.countries {
            directory.set_country(code, country);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use award_core::{Cabin, CashRateProvider, CityResolver, MileageRateProvider, Source, UNKNOWN_CITY, UNKNOWN_COUNTRY};

    const SAMPLE: &str = r#"
        [engine]
        allowed_cabins = ["economy", "business"]
        min_return_days = 3
        max_return_days = 21
        top_n = 4
        base_currency = "usd"

        [engine.programs]
        qantas = "qantas_ff"

        [engine.filter]
        max_combined_cost = 250000

        [mileage_rates]
        smiles = 2
        qantas_ff = 3

        [cash_rates]
        BRL = 20

        [cities]
        GRU = "São Paulo"
        MIA = "Miami"

        [countries]
        GRU = "br"
        MIA = "US"
    "#;

    #[test]
    fn test_parses_full_document() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();

        assert_eq!(settings.engine.top_n.get(), 4);
        assert_eq!(settings.engine.base_currency, "USD");
        assert_eq!(settings.engine.cabins(), vec![Cabin::Economy, Cabin::Business]);
        assert_eq!(settings.engine.program_for(&Source::Qantas), "qantas_ff");
        assert_eq!(settings.engine.program_for(&Source::Smiles), "smiles");
        assert_eq!(settings.engine.filter.max_combined_cost, Some(250000));
    }

    #[test]
    fn test_builds_lookup_tables() {
        let settings = Settings::from_toml_str(SAMPLE).unwrap();

        assert_eq!(settings.mileage_table().mileage_rate("qantas_ff").unwrap(), 3);
        let cash = settings.cash_table();
        assert_eq!(cash.base_currency(), "USD");
        assert_eq!(cash.cash_rate("brl").unwrap(), 20);

        let cities = settings.city_directory();
        assert_eq!(cities.resolve_city("gru"), "São Paulo");
        assert_eq!(cities.resolve_city("LHR"), UNKNOWN_CITY);
        assert_eq!(cities.resolve_country("GRU"), "BR");
        assert_eq!(cities.resolve_country("MIA"), "US");
        assert_eq!(cities.resolve_country("LHR"), UNKNOWN_COUNTRY);
    }

    #[test]
    fn test_defaults_apply_to_missing_sections() {
        let settings = Settings::from_toml_str("").unwrap();

        assert_eq!(settings.engine, EngineConfig::default());
        assert!(settings.mileage_rates.is_empty());
    }

    #[test]
    fn test_rejects_invalid_engine_settings() {
        let inverted = "[engine]\nmin_return_days = 10\nmax_return_days = 2\n";
        assert!(matches!(
            Settings::from_toml_str(inverted),
            Err(SettingsError::Invalid(CoreError::ValidationError(_)))
        ));

        let zero = "[engine]\ntop_n = 0\n";
        assert!(matches!(Settings::from_toml_str(zero), Err(SettingsError::Config(_))));
    }
}
