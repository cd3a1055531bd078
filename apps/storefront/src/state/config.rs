//! # Shop Configuration
//!
//! Configuration loaded once at startup and read-only afterwards.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ZOOSHOP_DB_PATH=/var/lib/zooshop/zooshop.db                        │
//! │     ZOOSHOP_SHIPPING_COST_CENTS=0                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, or                                                │
//! │     ~/.config/zooshop/zooshop.toml (Linux)                             │
//! │     ~/Library/Application Support/com.zooshop.zooshop/zooshop.toml     │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     zooshop.db, Europe/Minsk, zero shipping                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # zooshop.toml
//! [database]
//! path = "zooshop.db"
//! max_connections = 5
//!
//! [shop]
//! name = "Zooshop"
//! currency_code = "BYN"
//! currency_symbol = "Br"
//! shipping_cost_cents = 0
//!
//! [checkout]
//! fallback_timezone = "Europe/Minsk"
//! disallowed_timezones = ["Europe/Moscow"]
//! placeholder_contact = "Not specified"
//! ```
//!
//! Every key is optional; missing keys keep their default.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info};
use zoo_core::checkout::{CheckoutPolicy, TimezonePolicy};
use zoo_core::{Money, DISALLOWED_TIMEZONES, FALLBACK_TIMEZONE, PLACEHOLDER_CONTACT};

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file exists but cannot be read or written.
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for [`AppConfig`].
    #[error("Config file is invalid: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config cannot be rendered as TOML.
    #[error("Config cannot be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value fails validation.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// No explicit path and no platform config directory.
    #[error("No config path available")]
    NoConfigPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, created on first use.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("zooshop.db")
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

/// `[shop]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSettings {
    #[serde(default = "default_shop_name")]
    pub name: String,

    /// ISO 4217 code.
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Added to every order total.
    #[serde(default)]
    pub shipping_cost_cents: i64,
}

fn default_shop_name() -> String {
    "Zooshop".to_string()
}

fn default_currency_code() -> String {
    "BYN".to_string()
}

fn default_currency_symbol() -> String {
    "Br".to_string()
}

impl Default for ShopSettings {
    fn default() -> Self {
        ShopSettings {
            name: default_shop_name(),
            currency_code: default_currency_code(),
            currency_symbol: default_currency_symbol(),
            shipping_cost_cents: 0,
        }
    }
}

/// `[checkout]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSettings {
    #[serde(default = "default_fallback_timezone")]
    pub fallback_timezone: String,

    #[serde(default = "default_disallowed_timezones")]
    pub disallowed_timezones: Vec<String>,

    /// Stored for a blank shipping address or phone.
    #[serde(default = "default_placeholder_contact")]
    pub placeholder_contact: String,
}

fn default_fallback_timezone() -> String {
    FALLBACK_TIMEZONE.to_string()
}

fn default_disallowed_timezones() -> Vec<String> {
    DISALLOWED_TIMEZONES.iter().map(|tz| tz.to_string()).collect()
}

fn default_placeholder_contact() -> String {
    PLACEHOLDER_CONTACT.to_string()
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            fallback_timezone: default_fallback_timezone(),
            disallowed_timezones: default_disallowed_timezones(),
            placeholder_contact: default_placeholder_contact(),
        }
    }
}

// =============================================================================
// AppConfig
// =============================================================================

/// Complete storefront configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub shop: ShopSettings,

    #[serde(default)]
    pub checkout: CheckoutSettings,
}

impl AppConfig {
    /// Loads configuration: defaults, then the file, then `ZOOSHOP_*`
    /// environment variables, then validation.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Writes the configuration as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<PathBuf> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(path)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("database.path must not be empty".into()));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if self.shop.shipping_cost_cents < 0 {
            return Err(ConfigError::Invalid(
                "shop.shipping_cost_cents must not be negative".into(),
            ));
        }

        let fallback = self.checkout.fallback_timezone.trim();
        if fallback.is_empty() {
            return Err(ConfigError::Invalid(
                "checkout.fallback_timezone must not be empty".into(),
            ));
        }
        if self.checkout.disallowed_timezones.iter().any(|tz| tz == fallback) {
            return Err(ConfigError::Invalid(format!(
                "checkout.fallback_timezone '{}' is itself disallowed",
                fallback
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies `ZOOSHOP_*` overrides read through `lookup`.
    ///
    /// Unparsable numbers are ignored and the previous value kept.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("ZOOSHOP_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Some(name) = lookup("ZOOSHOP_SHOP_NAME") {
            self.shop.name = name;
        }

        if let Some(tz) = lookup("ZOOSHOP_FALLBACK_TIMEZONE") {
            debug!(timezone = %tz, "Overriding fallback timezone from environment");
            self.checkout.fallback_timezone = tz;
        }

        if let Some(cost) = lookup("ZOOSHOP_SHIPPING_COST_CENTS") {
            if let Ok(cents) = cost.trim().parse::<i64>() {
                self.shop.shipping_cost_cents = cents;
            }
        }
    }

    /// Platform config file location.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "zooshop", "zooshop")
            .map(|dirs| dirs.config_dir().join("zooshop.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Checkout settings in the form the order assembler takes.
    pub fn checkout_policy(&self) -> CheckoutPolicy {
        CheckoutPolicy {
            shipping_cost: Money::from_cents(self.shop.shipping_cost_cents),
            placeholder_contact: self.checkout.placeholder_contact.clone(),
            timezones: TimezonePolicy {
                fallback: self.checkout.fallback_timezone.trim().to_string(),
                disallowed: self.checkout.disallowed_timezones.clone(),
            },
        }
    }

    /// Formats an amount with the shop's currency symbol, e.g. `12.34 Br`.
    pub fn format_money(&self, amount: Money) -> String {
        amount.format_with(&self.shop.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.database.path, PathBuf::from("zooshop.db"));
        assert_eq!(config.shop.currency_code, "BYN");
        assert_eq!(config.checkout.fallback_timezone, "Europe/Minsk");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [shop]
            name = "Paws & Claws"
            shipping_cost_cents = 350
            "#,
        )
        .unwrap();

        assert_eq!(config.shop.name, "Paws & Claws");
        assert_eq!(config.shop.shipping_cost_cents, 350);
        assert_eq!(config.shop.currency_symbol, "Br");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.checkout.disallowed_timezones, vec!["Europe/Moscow"]);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("ZOOSHOP_DB_PATH", "/tmp/shop.db"),
            ("ZOOSHOP_SHOP_NAME", "Night Shop"),
            ("ZOOSHOP_FALLBACK_TIMEZONE", "Europe/Vilnius"),
            ("ZOOSHOP_SHIPPING_COST_CENTS", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.database.path, PathBuf::from("/tmp/shop.db"));
        assert_eq!(config.shop.name, "Night Shop");
        assert_eq!(config.checkout.fallback_timezone, "Europe/Vilnius");
        assert_eq!(config.shop.shipping_cost_cents, 0);
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.shop.shipping_cost_cents = -1;
        assert!(config.validate().is_err());
        config.shop.shipping_cost_cents = 0;

        config.checkout.fallback_timezone = "Europe/Moscow".to_string();
        assert!(config.validate().is_err());

        config.checkout.fallback_timezone = "  ".to_string();
        assert!(config.validate().is_err());

        config.checkout.fallback_timezone = "Europe/Minsk".to_string();
        config.database.path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_checkout_policy() {
        let mut config = AppConfig::default();
        config.shop.shipping_cost_cents = 500;

        let policy = config.checkout_policy();
        assert_eq!(policy.shipping_cost, Money::from_cents(500));
        assert_eq!(policy.timezones.resolve(Some("Europe/Moscow")), "Europe/Minsk");
        assert_eq!(policy.placeholder_contact, "Not specified");
    }

    #[test]
    fn test_format_money() {
        let config = AppConfig::default();
        assert_eq!(config.format_money(Money::from_cents(1234)), "12.34 Br");
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[checkout]"));

        let back: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(back, config);
    }
}
