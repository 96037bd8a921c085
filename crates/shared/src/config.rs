//! Engine configuration management.

use serde::Deserialize;

use crate::types::money::Currency;

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Wallet currency for the whole platform.
    #[serde(default = "default_currency")]
    pub currency: Currency,
    /// Referral bonus in minor units, credited once per referred user.
    #[serde(default = "default_referral_bonus_minor")]
    pub referral_bonus_minor: i64,
    /// Store transaction settings.
    #[serde(default)]
    pub store: StoreConfig,
}

/// Document store transaction settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Maximum optimistic-transaction retries before giving up.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_currency() -> Currency {
    Currency::Inr
}

fn default_referral_bonus_minor() -> i64 {
    10_000 // 100.00
}

fn default_max_retries() -> u32 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            referral_bonus_minor: default_referral_bonus_minor(),
            store: StoreConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Layering: `config/default.toml`, then `config/{RUN_MODE}.toml`,
    /// then `MUTUO__`-prefixed environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("MUTUO").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.currency, Currency::Inr);
        assert_eq!(config.referral_bonus_minor, 10_000);
        assert_eq!(config.store.max_retries, 5);
    }
}
