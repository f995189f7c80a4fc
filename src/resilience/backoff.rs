//! Exponential backoff with jitter.

use std::time::Duration;

use rand::Rng;

use crate::config::schema::RetryConfig;

/// Delay before retry number `attempt` (1-based) under the given policy.
///
/// Doubles from the base delay, capped by the policy maximum, with up to
/// 10% random jitter so simultaneous clients do not stampede an endpoint.
pub fn retry_delay(attempt: u32, policy: &RetryConfig) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let doubling = 2u64.saturating_pow(attempt - 1);
    let delay_ms = policy.base_delay_ms.saturating_mul(doubling);
    let capped = delay_ms.min(policy.max_delay_ms);

    let jitter_range = capped / 10;
    let jitter = if jitter_range > 0 {
        rand::thread_rng().gen_range(0..jitter_range)
    } else {
        0
    };

    Duration::from_millis(capped + jitter)
}
