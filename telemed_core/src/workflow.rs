//! Prescription workflow.
//!
//! Composes the calculator, the safety monitor and the allergy service the
//! way a consultation uses them:
//! - A dose is only ever released after the safety monitor accepts it
//! - Calculation and safety errors block the prescription, never retry it
//! - An allergy check that cannot finish in time degrades to manual
//!   verification instead of aborting the consultation

use crate::{
    AllergyCheckResult, AllergyService, Config, DosageCalculator, Error, SafetyMonitor,
    WeightMeasurement,
};

/// Result of one prescription attempt
#[derive(Debug)]
pub enum PrescriptionOutcome {
    /// Dose accepted and released to the pharmacy
    Sent { weight_kg: f64, dose_mg: f64 },
    /// Calculation or safety check failed; no dose is available
    Blocked(Error),
}

impl PrescriptionOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, PrescriptionOutcome::Sent { .. })
    }

    /// The released dose, if any
    pub fn dose_mg(&self) -> Option<f64> {
        match self {
            PrescriptionOutcome::Sent { dose_mg, .. } => Some(*dose_mg),
            PrescriptionOutcome::Blocked(_) => None,
        }
    }
}

/// Fail-safe reading of an allergy check
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllergyScreening {
    /// The database answered in time
    Clear(String),
    /// The database did not answer; a clinician must verify by hand
    ManualVerificationRequired(AllergyCheckResult),
}

impl AllergyScreening {
    pub fn requires_manual_verification(&self) -> bool {
        matches!(self, AllergyScreening::ManualVerificationRequired(_))
    }
}

impl From<AllergyCheckResult> for AllergyScreening {
    fn from(result: AllergyCheckResult) -> Self {
        match result {
            AllergyCheckResult::Completed(payload) => AllergyScreening::Clear(payload),
            other => AllergyScreening::ManualVerificationRequired(other),
        }
    }
}

/// Calculate a dose and release it only if the safety monitor accepts it
pub fn prescribe(
    calculator: &DosageCalculator,
    monitor: &SafetyMonitor,
    measurement: &WeightMeasurement,
) -> PrescriptionOutcome {
    tracing::info!("Prescribing for weight {}", measurement);

    let weight_kg = match calculator.normalize(measurement) {
        Ok(kg) => kg,
        Err(e) => return PrescriptionOutcome::Blocked(e),
    };
    let dose_mg = weight_kg * calculator.rate_mg_per_kg();
    tracing::info!("Calculated dose: {} mg", dose_mg);

    match monitor.validate(dose_mg) {
        Ok(()) => PrescriptionOutcome::Sent { weight_kg, dose_mg },
        Err(e) => PrescriptionOutcome::Blocked(e),
    }
}

/// Run an allergy check and apply the fail-safe to its result
pub fn screen_allergies(
    service: &AllergyService,
    patient_id: &str,
    simulated_latency_ms: u64,
) -> AllergyScreening {
    let screening = AllergyScreening::from(service.check_with_timeout(patient_id, simulated_latency_ms));

    if screening.requires_manual_verification() {
        tracing::warn!(
            "Allergy check for {} incomplete, flagging for manual verification",
            patient_id
        );
    }

    screening
}

/// One calculator, monitor and allergy service sharing a configuration
#[derive(Clone, Debug, Default)]
pub struct Workflow {
    pub calculator: DosageCalculator,
    pub monitor: SafetyMonitor,
    pub allergy: AllergyService,
}

impl Workflow {
    pub fn from_config(config: &Config) -> Self {
        Self {
            calculator: DosageCalculator::from_config(&config.dosage),
            monitor: SafetyMonitor::from_config(&config.safety),
            allergy: AllergyService::from_config(&config.allergy),
        }
    }

    pub fn prescribe(&self, measurement: &WeightMeasurement) -> PrescriptionOutcome {
        prescribe(&self.calculator, &self.monitor, measurement)
    }

    /// Parse the unit token, then prescribe; an unknown unit blocks
    pub fn prescribe_raw(&self, weight: f64, unit: &str) -> PrescriptionOutcome {
        match WeightMeasurement::parse(weight, unit) {
            Ok(measurement) => self.prescribe(&measurement),
            Err(e) => PrescriptionOutcome::Blocked(e),
        }
    }

    pub fn screen_allergies(&self, patient_id: &str, simulated_latency_ms: u64) -> AllergyScreening {
        screen_allergies(&self.allergy, patient_id, simulated_latency_ms)
    }
}
