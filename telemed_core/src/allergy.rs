//! Simulated allergy-database lookup with a bounded wait.
//!
//! Every check builds its own single-threaded tokio runtime, spawns the
//! lookup onto it and races it against a deadline fixed before the spawn.
//! When the deadline wins the lookup is aborted and its result is never
//! read. The runtime is dropped before the check returns, so no lookup
//! outlives the call that started it.
//!
//! Checks block the calling thread and must not be made from inside an
//! async context.

use crate::config::{AllergyConfig, DEFAULT_ALLERGY_TIMEOUT_MS};
use crate::{AllergyCheckResult, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Payload the simulated database returns for every patient
pub const NO_ALLERGIES_FOUND: &str = "No Allergies Found";

/// Client for the (simulated) allergy database
#[derive(Clone, Debug)]
pub struct AllergyService {
    timeout: Duration,
}

impl Default for AllergyService {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_ALLERGY_TIMEOUT_MS),
        }
    }
}

impl AllergyService {
    pub fn from_config(config: &AllergyConfig) -> Self {
        Self::with_timeout(config.timeout())
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look up a patient's allergies, giving up once the wait ceiling elapses
    ///
    /// The simulated lookup sleeps for `simulated_latency_ms` and then
    /// reports [`NO_ALLERGIES_FOUND`]. A latency at or above the ceiling
    /// always yields [`AllergyCheckResult::Timeout`].
    pub fn check_with_timeout(
        &self,
        patient_id: &str,
        simulated_latency_ms: u64,
    ) -> AllergyCheckResult {
        tracing::info!(
            "Contacting allergy database for {} (limit: {} ms)",
            patient_id,
            self.timeout.as_millis()
        );

        let lookup = simulated_lookup(Duration::from_millis(simulated_latency_ms));
        let result = self.run_bounded(lookup);

        match &result {
            AllergyCheckResult::Completed(payload) => {
                tracing::info!("Allergy lookup for {} completed: {}", patient_id, payload)
            }
            AllergyCheckResult::Timeout => tracing::warn!(
                "Allergy lookup for {} timed out after {} ms",
                patient_id,
                self.timeout.as_millis()
            ),
            AllergyCheckResult::Error(detail) => {
                tracing::error!("Allergy lookup for {} failed: {}", patient_id, detail)
            }
        }

        result
    }

    /// Run one lookup on a fresh runtime, bounded by the wait ceiling
    fn run_bounded<F>(&self, lookup: F) -> AllergyCheckResult
    where
        F: Future<Output = Result<String>> + Send + 'static,
    {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => return AllergyCheckResult::Error(format!("runtime unavailable: {}", e)),
        };

        let limit = self.timeout;
        runtime.block_on(async move {
            let deadline = Instant::now() + limit;
            let mut task = tokio::spawn(lookup);

            // Deadline polled first: a lookup finishing on the same tick still times out
            tokio::select! {
                biased;

                () = tokio::time::sleep_until(deadline) => {
                    task.abort();
                    AllergyCheckResult::Timeout
                }
                joined = &mut task => match joined {
                    Ok(Ok(payload)) => AllergyCheckResult::Completed(payload),
                    Ok(Err(e)) => AllergyCheckResult::Error(e.to_string()),
                    Err(e) => AllergyCheckResult::Error(format!("lookup task failed: {}", e)),
                },
            }
        })
    }
}

async fn simulated_lookup(latency: Duration) -> Result<String> {
    tokio::time::sleep(latency).await;
    Ok(NO_ALLERGIES_FOUND.to_string())
}

/// Check with the default 2000 ms wait ceiling
pub fn check_with_timeout(patient_id: &str, simulated_latency_ms: u64) -> AllergyCheckResult {
    AllergyService::default().check_with_timeout(patient_id, simulated_latency_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Instant as StdInstant;

    fn short_service() -> AllergyService {
        AllergyService::with_timeout(Duration::from_millis(100))
    }

    #[test]
    fn test_fast_lookup_completes() {
        crate::logging::init_test();

        let result = short_service().check_with_timeout("Patient_123", 5);
        assert_eq!(result, AllergyCheckResult::Completed(NO_ALLERGIES_FOUND.into()));
    }

    #[test]
    fn test_zero_latency_completes() {
        let result = short_service().check_with_timeout("Patient_123", 0);
        assert_eq!(result.to_string(), NO_ALLERGIES_FOUND);
    }

    #[test]
    fn test_slow_lookup_times_out() {
        let result = short_service().check_with_timeout("Patient_123", 400);
        assert_eq!(result, AllergyCheckResult::Timeout);
    }

    #[test]
    fn test_latency_equal_to_ceiling_times_out() {
        let result = short_service().check_with_timeout("Patient_123", 100);
        assert!(result.is_timeout());
    }

    #[test]
    fn test_wait_is_bounded_by_ceiling() {
        let started = StdInstant::now();
        let result = short_service().check_with_timeout("Patient_123", 5_000);
        let elapsed = started.elapsed();

        assert!(result.is_timeout());
        assert!(
            elapsed < Duration::from_millis(2_000),
            "check waited {:?} for a 100 ms ceiling",
            elapsed
        );
    }

    #[test]
    fn test_timed_out_lookup_never_finishes() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&finished);

        let result = short_service().run_bounded(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(NO_ALLERGIES_FOUND.to_string())
        });

        assert!(result.is_timeout());
        std::thread::sleep(Duration::from_millis(400));
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[test]
    fn test_lookup_error_surfaces_as_error() {
        let result = short_service()
            .run_bounded(async { Err(Error::AllergyLookup("database offline".into())) });

        match result {
            AllergyCheckResult::Error(detail) => assert!(detail.contains("database offline")),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[test]
    fn test_panicking_lookup_surfaces_as_error() {
        let reset = true;
        let result = short_service().run_bounded(async move {
            if reset {
                panic!("connection reset");
            }
            Ok(NO_ALLERGIES_FOUND.to_string())
        });

        assert!(matches!(result, AllergyCheckResult::Error(_)));
        assert_eq!(result.to_string(), "ERROR");
    }

    #[test]
    fn test_default_ceiling() {
        assert_eq!(AllergyService::default().timeout(), Duration::from_millis(2000));
    }
}
