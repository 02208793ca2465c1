//! Core domain types for the telemedicine dosage workflow.
//!
//! Every value here is transient: it lives for one calculation, one
//! validation or one allergy check and is never stored.

use crate::Error;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Weight Types
// ============================================================================

/// Unit a patient weight was entered in
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeightUnit {
    Kilogram,
    Pound,
    Gram,
}

impl WeightUnit {
    /// Convert a value in this unit to kilograms
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            WeightUnit::Kilogram => value,
            WeightUnit::Pound => value * 0.453592,
            WeightUnit::Gram => value / 1000.0,
        }
    }
}

impl FromStr for WeightUnit {
    type Err = Error;

    /// Parse a unit token, case-insensitively: `kg`, `lbs`, `g` or `gram`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Ok(WeightUnit::Kilogram),
            "lbs" => Ok(WeightUnit::Pound),
            "g" | "gram" => Ok(WeightUnit::Gram),
            _ => Err(Error::InvalidUnit(s.to_string())),
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            WeightUnit::Kilogram => "kg",
            WeightUnit::Pound => "lbs",
            WeightUnit::Gram => "g",
        };
        f.write_str(token)
    }
}

/// A weight as entered by the clinician
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightMeasurement {
    pub value: f64,
    pub unit: WeightUnit,
}

impl WeightMeasurement {
    pub fn new(value: f64, unit: WeightUnit) -> Self {
        Self { value, unit }
    }

    /// Parse the unit token and pair it with the value
    pub fn parse(value: f64, unit: &str) -> crate::Result<Self> {
        Ok(Self::new(value, unit.parse()?))
    }
}

impl fmt::Display for WeightMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

// ============================================================================
// Safety and Allergy Outcomes
// ============================================================================

/// Outcome of checking a dose against the safety ceiling
#[derive(Debug)]
pub enum SafetyVerdict {
    Accepted,
    /// Carries the validator error that explains the rejection
    Rejected(Error),
}

impl SafetyVerdict {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SafetyVerdict::Accepted)
    }
}

/// Raw result of one bounded allergy lookup
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllergyCheckResult {
    /// The lookup finished in time with this payload
    Completed(String),
    /// The wait ceiling elapsed first
    Timeout,
    /// The lookup failed for any other reason
    Error(String),
}

impl AllergyCheckResult {
    pub fn is_timeout(&self) -> bool {
        matches!(self, AllergyCheckResult::Timeout)
    }
}

impl fmt::Display for AllergyCheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllergyCheckResult::Completed(payload) => f.write_str(payload),
            AllergyCheckResult::Timeout => f.write_str("TIMEOUT"),
            AllergyCheckResult::Error(_) => f.write_str("ERROR"),
        }
    }
}
