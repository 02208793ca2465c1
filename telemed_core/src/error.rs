//! Error types for the telemed_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for telemed_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Weight unit outside the accepted set
    #[error("Invalid unit '{0}'. Accepted: kg, lbs, g")]
    InvalidUnit(String),

    /// Normalized weight above the plausibility ceiling
    #[error("Weight exceeds human limits ({weight_kg:.2} kg). Check input.")]
    ImplausibleWeight { weight_kg: f64, limit_kg: f64 },

    /// Dose is zero, negative or not a number
    #[error("CRITICAL ALERT: Invalid dose ({dose_mg} mg, zero or negative). Blocked.")]
    NonPositiveDose { dose_mg: f64 },

    /// Dose above the safety ceiling
    #[error(
        "CRITICAL ALERT: Dosage {dose_mg:.1} mg exceeds safety limit of {limit_mg:.1} mg. Transaction BLOCKED."
    )]
    UnsafeDose { dose_mg: f64, limit_mg: f64 },

    /// Allergy lookup failed before producing a result
    #[error("Allergy lookup failed: {0}")]
    AllergyLookup(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True for the validator's rejections (the dose itself is unsafe),
    /// false for input and infrastructure errors.
    pub fn is_safety_violation(&self) -> bool {
        matches!(self, Error::NonPositiveDose { .. } | Error::UnsafeDose { .. })
    }
}
