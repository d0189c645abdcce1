//! Optional observability helpers for token exchanges.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `iam_token_exchange.exchange` with the
//!   `exchange` (operation) and `stage` (call site) fields, plus per-request debug/error events.
//! - Enable `metrics` to increment the `iam_token_exchange_total` counter for every
//!   attempt/success/failure, labeled by `exchange` + `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Exchange operations observed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
	/// Refresh token to access token.
	RefreshToken,
	/// Access token to IMS token via the derive grant.
	DeriveImsToken,
	/// IAM API key to IMS token.
	ApiKeyImsToken,
	/// IAM API key to access token.
	ApiKeyAccessToken,
}
impl ExchangeKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeKind::RefreshToken => "refresh_token",
			ExchangeKind::DeriveImsToken => "derive_ims_token",
			ExchangeKind::ApiKeyImsToken => "apikey_ims_token",
			ExchangeKind::ApiKeyAccessToken => "apikey_access_token",
		}
	}
}
impl Display for ExchangeKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each exchange call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExchangeOutcome {
	/// Entry to an exchange operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl ExchangeOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ExchangeOutcome::Attempt => "attempt",
			ExchangeOutcome::Success => "success",
			ExchangeOutcome::Failure => "failure",
		}
	}
}
impl Display for ExchangeOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
