use crate::constants::MAX_RECOVERY_ATTEMPTS;
use crate::error::BackendError;

/// Bounded retry of a failed backend operation.
///
/// The closure is the recovery step for the error type at hand (resume the
/// context, re-probe the driver, re-trigger a tone). Synth failures are
/// never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_RECOVERY_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Run `op`; on a recoverable failure re-run it up to `max_attempts`
    /// more times. Returns the last error once attempts are exhausted.
    pub fn run<T>(
        &self,
        label: &str,
        mut op: impl FnMut() -> Result<T, BackendError>,
    ) -> Result<T, BackendError> {
        let mut last = match op() {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        if matches!(last, BackendError::Synth(_)) {
            return Err(last);
        }
        for attempt in 1..=self.max_attempts {
            log::warn!(
                "[recovery] {label} failed ({last}); retry {attempt}/{}",
                self.max_attempts
            );
            match op() {
                Ok(v) => {
                    log::info!("[recovery] {label} recovered on retry {attempt}");
                    return Ok(v);
                }
                Err(e) => last = e,
            }
        }
        Err(last)
    }
}
