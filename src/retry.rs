//! Bounded fixed-interval retry execution for token exchange calls.

// self
use crate::_prelude::*;

/// Fixed-interval retry policy applied to each exchange call.
///
/// The defaults (40 attempts, 3 seconds apart) bound a single call at roughly two minutes of
/// wall-clock time when the endpoint stays unreachable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
	/// Maximum number of attempts, including the first; values below one behave as one.
	pub attempts: u32,
	/// Sleep between consecutive attempts.
	pub interval: Duration,
}
impl RetryPolicy {
	/// Creates a policy with the given attempt bound and inter-attempt sleep.
	pub const fn new(attempts: u32, interval: Duration) -> Self {
		Self { attempts, interval }
	}

	/// Overrides the attempt bound.
	pub fn with_attempts(mut self, attempts: u32) -> Self {
		self.attempts = attempts;

		self
	}

	/// Overrides the inter-attempt sleep.
	pub fn with_interval(mut self, interval: Duration) -> Self {
		self.interval = interval;

		self
	}
}
impl Default for RetryPolicy {
	fn default() -> Self {
		Self::new(40, Duration::from_secs(3))
	}
}

/// Runs `operation` under `policy`, retrying while `is_retryable` approves the failure.
///
/// The first success wins. A failure `is_retryable` rejects is returned immediately; exhausting
/// the attempt bound returns the last failure observed. The executor sleeps `policy.interval`
/// between attempts, never after the final one.
pub async fn retry<T, E, F, Fut, P>(
	policy: RetryPolicy,
	mut is_retryable: P,
	mut operation: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	P: FnMut(&E) -> bool,
{
	let attempts = policy.attempts.max(1);
	let mut attempt = 0;

	loop {
		attempt += 1;

		match operation().await {
			Ok(value) => return Ok(value),
			Err(error) => {
				if attempt >= attempts || !is_retryable(&error) {
					return Err(error);
				}

				#[cfg(feature = "tracing")]
				tracing::debug!(attempt, attempts, "Retrying IAM token exchange request.");
			},
		}

		tokio::time::sleep(policy.interval).await;
	}
}
