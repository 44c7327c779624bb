//! Bounded exponential-backoff retry around the model call.
//!
//! Classification is a pluggable predicate so the rule can be swapped or
//! tested in isolation. The shipped classifier string-matches the rendered
//! failure message rather than depending on the provider's error taxonomy.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::ProviderError;

const BACKOFF_BASE: f64 = 1.5;

/// Sequential bounded retry with exponential backoff. Delays are
/// deterministic; each call gets its own retry count.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Runs `op`, retrying while `is_transient` approves the failure and the
    /// retry cap is not exhausted. The n-th retry (1-based) waits
    /// `initial_delay * 1.5^n` first. Non-transient failures propagate on
    /// first occurrence; the last failure propagates unchanged once retries
    /// run out.
    pub async fn execute<T, E, F, Fut, P>(&self, mut op: F, is_transient: P) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut retries = 0u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if retries < self.max_retries && is_transient(&err) => {
                    retries += 1;
                    let delay = self.initial_delay.mul_f64(BACKOFF_BASE.powi(retries as i32));
                    warn!(
                        "Transient model failure (retry {retries}/{}, backing off {}ms): {err}",
                        self.max_retries,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

/// Shipped transient classifier: provider overload surfaces as messages
/// containing "503" or "overloaded".
pub fn transient_overload(err: &ProviderError) -> bool {
    let message = err.to_string();
    message.contains("503") || message.contains("overloaded")
}
