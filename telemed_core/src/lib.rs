#![forbid(unsafe_code)]

//! Core logic for the Telemed dosage workflow prototype.
//!
//! This crate provides:
//! - Weight unit normalization and dose calculation
//! - Safety ceiling enforcement
//! - A simulated allergy lookup with a bounded wait
//! - The prescription workflow composing the three
//! - Configuration and logging setup

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod dosage;
pub mod safety;
pub mod allergy;
pub mod workflow;

// Re-export commonly used types
pub use error::{Error, Result};
pub use types::*;
pub use config::Config;
pub use dosage::{calculate_dose, DosageCalculator};
pub use safety::{validate, SafetyMonitor};
pub use allergy::{check_with_timeout, AllergyService, NO_ALLERGIES_FOUND};
pub use workflow::{prescribe, screen_allergies, AllergyScreening, PrescriptionOutcome, Workflow};
