//! Configuration file support for Telemed.
//!
//! Configuration is optional and loaded from `$XDG_CONFIG_HOME/telemed/config.toml`.
//! Every key falls back to the built-in clinical defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Fixed multiplier from normalized weight to proposed dose
pub const DEFAULT_RATE_MG_PER_KG: f64 = 10.0;

/// Upper plausibility bound for a human body weight
pub const DEFAULT_MAX_WEIGHT_KG: f64 = 600.0;

/// Maximum safe dose; anything above blocks the transaction
pub const DEFAULT_MAX_DOSE_MG: f64 = 500.0;

/// Wait ceiling for the allergy lookup, measured from dispatch
pub const DEFAULT_ALLERGY_TIMEOUT_MS: u64 = 2000;

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub dosage: DosageConfig,

    #[serde(default)]
    pub safety: SafetyConfig,

    #[serde(default)]
    pub allergy: AllergyConfig,
}

/// Dose calculation parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DosageConfig {
    #[serde(default = "default_rate_mg_per_kg")]
    pub rate_mg_per_kg: f64,

    #[serde(default = "default_max_weight_kg")]
    pub max_weight_kg: f64,
}

impl Default for DosageConfig {
    fn default() -> Self {
        Self {
            rate_mg_per_kg: default_rate_mg_per_kg(),
            max_weight_kg: default_max_weight_kg(),
        }
    }
}

/// Safety ceiling configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SafetyConfig {
    #[serde(default = "default_max_dose_mg")]
    pub max_dose_mg: f64,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            max_dose_mg: default_max_dose_mg(),
        }
    }
}

/// Allergy service configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AllergyConfig {
    #[serde(default = "default_allergy_timeout_ms")]
    pub timeout_ms: u64,
}

impl AllergyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for AllergyConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_allergy_timeout_ms(),
        }
    }
}

// Default value functions
fn default_rate_mg_per_kg() -> f64 {
    DEFAULT_RATE_MG_PER_KG
}

fn default_max_weight_kg() -> f64 {
    DEFAULT_MAX_WEIGHT_KG
}

fn default_max_dose_mg() -> f64 {
    DEFAULT_MAX_DOSE_MG
}

fn default_allergy_timeout_ms() -> u64 {
    DEFAULT_ALLERGY_TIMEOUT_MS
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        match Self::default_config_path() {
            Some(config_path) if config_path.exists() => Self::load_from(&config_path),
            Some(config_path) => {
                tracing::debug!(
                    "No config file found at {:?}, using defaults",
                    config_path
                );
                Ok(Self::default())
            }
            None => {
                tracing::debug!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join("telemed").join("config.toml"))
    }

    /// Reject limits that would make the guards meaningless
    pub fn validate(&self) -> Result<()> {
        let limits = [
            ("dosage.rate_mg_per_kg", self.dosage.rate_mg_per_kg),
            ("dosage.max_weight_kg", self.dosage.max_weight_kg),
            ("safety.max_dose_mg", self.safety.max_dose_mg),
        ];

        for (key, value) in limits {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::Config(format!(
                    "{} must be a positive number, got {}",
                    key, value
                )));
            }
        }

        if self.allergy.timeout_ms == 0 {
            return Err(Error::Config(
                "allergy.timeout_ms must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}
