//! Unit normalization and dose calculation.
//!
//! A weight is converted to kilograms, checked against the plausibility
//! ceiling and multiplied by the rate per kilogram. The result is only a
//! proposal: it must still pass the safety validator before it is used.

use crate::config::{DosageConfig, DEFAULT_MAX_WEIGHT_KG, DEFAULT_RATE_MG_PER_KG};
use crate::{Error, Result, WeightMeasurement, WeightUnit};

/// Converts weights and proposes doses
#[derive(Clone, Debug)]
pub struct DosageCalculator {
    rate_mg_per_kg: f64,
    max_weight_kg: f64,
}

impl Default for DosageCalculator {
    fn default() -> Self {
        Self {
            rate_mg_per_kg: DEFAULT_RATE_MG_PER_KG,
            max_weight_kg: DEFAULT_MAX_WEIGHT_KG,
        }
    }
}

impl DosageCalculator {
    pub fn from_config(config: &DosageConfig) -> Self {
        Self {
            rate_mg_per_kg: config.rate_mg_per_kg,
            max_weight_kg: config.max_weight_kg,
        }
    }

    pub fn rate_mg_per_kg(&self) -> f64 {
        self.rate_mg_per_kg
    }

    /// Convert a measurement to kilograms and check it is humanly plausible
    ///
    /// Zero and negative weights pass through; the safety validator rejects
    /// the dose they produce.
    pub fn normalize(&self, measurement: &WeightMeasurement) -> Result<f64> {
        match measurement.unit {
            WeightUnit::Kilogram => {}
            WeightUnit::Pound => tracing::debug!("Converting lbs to kg"),
            WeightUnit::Gram => tracing::debug!("Converting grams to kg"),
        }

        let weight_kg = measurement.unit.to_kg(measurement.value);

        if weight_kg > self.max_weight_kg {
            tracing::warn!(
                "Rejecting implausible weight {:.2} kg (limit {} kg)",
                weight_kg,
                self.max_weight_kg
            );
            return Err(Error::ImplausibleWeight {
                weight_kg,
                limit_kg: self.max_weight_kg,
            });
        }

        tracing::info!("Standardized weight: {:.2} kg", weight_kg);
        Ok(weight_kg)
    }

    /// Propose a dose in milligrams for the measurement
    pub fn dose_for(&self, measurement: &WeightMeasurement) -> Result<f64> {
        let weight_kg = self.normalize(measurement)?;
        Ok(weight_kg * self.rate_mg_per_kg)
    }

    /// Parse the unit token and propose a dose in milligrams
    pub fn calculate(&self, weight: f64, unit: &str) -> Result<f64> {
        let measurement = WeightMeasurement::parse(weight, unit)?;
        self.dose_for(&measurement)
    }
}

/// Propose a dose using the default rate and plausibility ceiling
pub fn calculate_dose(weight: f64, unit: &str) -> Result<f64> {
    DosageCalculator::default().calculate(weight, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kg_is_identity() {
        for w in [0.5, 1.0, 42.0, 72.3, 599.9, 600.0] {
            assert_eq!(calculate_dose(w, "kg").unwrap(), w * 10.0);
        }
    }

    #[test]
    fn test_lbs_conversion() {
        for w in [1.0, 154.0, 220.5, 1000.0] {
            assert_eq!(calculate_dose(w, "lbs").unwrap(), w * 0.453592 * 10.0);
        }
    }

    #[test]
    fn test_gram_conversion() {
        for unit in ["g", "gram", "G", "Gram"] {
            assert_eq!(calculate_dose(20000.0, unit).unwrap(), 200.0);
            assert_eq!(calculate_dose(3500.0, unit).unwrap(), 3500.0 / 1000.0 * 10.0);
        }
    }

    #[test]
    fn test_unknown_unit_rejected() {
        let err = calculate_dose(80.0, "stone").unwrap_err();
        assert!(matches!(err, Error::InvalidUnit(ref u) if u == "stone"));
        assert!(err.to_string().contains("Accepted: kg, lbs, g"));
    }

    #[test]
    fn test_implausible_weight_rejected() {
        let err = calculate_dose(600.01, "kg").unwrap_err();
        assert!(matches!(err, Error::ImplausibleWeight { .. }));

        // 1500 lbs is ~680 kg
        assert!(matches!(
            calculate_dose(1500.0, "lbs"),
            Err(Error::ImplausibleWeight { .. })
        ));

        // Grams are checked after conversion: 700 kg entered as grams
        match calculate_dose(700_000.0, "g") {
            Err(Error::ImplausibleWeight { weight_kg, limit_kg }) => {
                assert_eq!(weight_kg, 700.0);
                assert_eq!(limit_kg, 600.0);
            }
            other => panic!("Expected ImplausibleWeight, got {:?}", other),
        }
    }

    #[test]
    fn test_plausibility_ceiling_is_inclusive() {
        assert_eq!(calculate_dose(600.0, "kg").unwrap(), 6000.0);
    }

    #[test]
    fn test_non_positive_weight_passes_through() {
        assert_eq!(calculate_dose(0.0, "kg").unwrap(), 0.0);
        assert_eq!(calculate_dose(-5.0, "kg").unwrap(), -50.0);
    }

    #[test]
    fn test_configured_calculator() {
        let calculator = DosageCalculator::from_config(&DosageConfig {
            rate_mg_per_kg: 2.5,
            max_weight_kg: 150.0,
        });

        assert_eq!(calculator.calculate(80.0, "kg").unwrap(), 200.0);
        assert!(matches!(
            calculator.calculate(151.0, "kg"),
            Err(Error::ImplausibleWeight { .. })
        ));
    }

    #[test]
    fn test_normalize_measurement() {
        crate::logging::init_test();

        let calculator = DosageCalculator::default();
        let kg = calculator
            .normalize(&WeightMeasurement::new(20000.0, WeightUnit::Gram))
            .unwrap();
        assert_eq!(kg, 20.0);
    }
}
