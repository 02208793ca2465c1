//! Safety ceiling enforcement.
//!
//! The monitor is a guard, not a corrector: it accepts or rejects a dose and
//! never changes it.

use crate::config::{SafetyConfig, DEFAULT_MAX_DOSE_MG};
use crate::{Error, Result, SafetyVerdict};

/// Blocks any dose outside `(0, max_dose_mg]`
#[derive(Clone, Debug)]
pub struct SafetyMonitor {
    max_dose_mg: f64,
}

impl Default for SafetyMonitor {
    fn default() -> Self {
        Self {
            max_dose_mg: DEFAULT_MAX_DOSE_MG,
        }
    }
}

impl SafetyMonitor {
    pub fn from_config(config: &SafetyConfig) -> Self {
        Self {
            max_dose_mg: config.max_dose_mg,
        }
    }

    pub fn max_dose_mg(&self) -> f64 {
        self.max_dose_mg
    }

    /// Accept or reject a dose
    ///
    /// # Errors
    /// - `NonPositiveDose` for zero, negative or NaN doses
    /// - `UnsafeDose` for doses above the ceiling
    pub fn validate(&self, dose_mg: f64) -> Result<()> {
        tracing::debug!("Checking dose: {} mg", dose_mg);

        if dose_mg.is_nan() || dose_mg <= 0.0 {
            tracing::warn!("Blocked invalid dose {} mg", dose_mg);
            return Err(Error::NonPositiveDose { dose_mg });
        }

        if dose_mg > self.max_dose_mg {
            tracing::warn!(
                "Blocked dose {} mg above safety limit {} mg",
                dose_mg,
                self.max_dose_mg
            );
            return Err(Error::UnsafeDose {
                dose_mg,
                limit_mg: self.max_dose_mg,
            });
        }

        tracing::info!("Safety check passed for {} mg", dose_mg);
        Ok(())
    }

    /// Same decision as [`SafetyMonitor::validate`], as a value
    pub fn verdict(&self, dose_mg: f64) -> SafetyVerdict {
        match self.validate(dose_mg) {
            Ok(()) => SafetyVerdict::Accepted,
            Err(e) => SafetyVerdict::Rejected(e),
        }
    }
}

/// Validate a dose against the default 500 mg ceiling
pub fn validate(dose_mg: f64) -> Result<()> {
    SafetyMonitor::default().validate(dose_mg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_doses_within_ceiling() {
        for dose in [0.001, 1.0, 200.0, 499.99, 500.0] {
            assert!(validate(dose).is_ok(), "dose {} should pass", dose);
        }
    }

    #[test]
    fn test_rejects_non_positive() {
        for dose in [0.0, -0.0, -1.0, -500.0, f64::NEG_INFINITY] {
            assert!(
                matches!(validate(dose), Err(Error::NonPositiveDose { .. })),
                "dose {} should be rejected as non-positive",
                dose
            );
        }
    }

    #[test]
    fn test_rejects_nan() {
        assert!(matches!(
            validate(f64::NAN),
            Err(Error::NonPositiveDose { .. })
        ));
    }

    #[test]
    fn test_rejects_above_ceiling() {
        for dose in [500.0001, 501.0, 1000.0, f64::INFINITY] {
            match validate(dose) {
                Err(Error::UnsafeDose { dose_mg, limit_mg }) => {
                    assert_eq!(dose_mg, dose);
                    assert_eq!(limit_mg, 500.0);
                }
                other => panic!("Expected UnsafeDose for {}, got {:?}", dose, other),
            }
        }
    }

    #[test]
    fn test_verdict() {
        let monitor = SafetyMonitor::default();
        assert!(monitor.verdict(200.0).is_accepted());

        match monitor.verdict(1000.0) {
            SafetyVerdict::Rejected(Error::UnsafeDose { dose_mg, .. }) => {
                assert_eq!(dose_mg, 1000.0)
            }
            other => panic!("Expected UnsafeDose rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_configured_ceiling() {
        let monitor = SafetyMonitor::from_config(&SafetyConfig { max_dose_mg: 100.0 });
        assert!(monitor.validate(100.0).is_ok());
        assert!(matches!(
            monitor.validate(100.5),
            Err(Error::UnsafeDose { limit_mg, .. }) if limit_mg == 100.0
        ));
    }
}
