//! Typed failures surfaced by the token exchange client.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical exchange error exposed by public APIs.
///
/// Every failure is returned as a value; a call yields exactly one token or one error. The
/// variant sources form the cause chain the retry layer classifies, so transport failures must
/// keep their underlying error attached.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Transport failure, an undecodable success body, or a non-200 response with no
	/// interpretable error payload.
	#[error("{message}")]
	Unclassified {
		/// Human-readable summary of the failure.
		message: String,
		/// HTTP status code, when a response was received.
		status: Option<u16>,
		/// Truncated response body retained for diagnostics.
		body_preview: Option<String>,
		/// Underlying transport or decode failure, when one exists.
		#[source]
		source: Option<BoxError>,
	},
	/// The token endpoint rejected the exchange with a structured error payload.
	#[error("IAM token exchange request failed: {message}")]
	FailedTokenExchange {
		/// `errorMessage` reported by the token endpoint.
		message: String,
		/// `errorCode` reported by the token endpoint, when present.
		error_type: Option<String>,
		/// HTTP status code of the rejection.
		status: u16,
		/// Details and requirement fields reported alongside the rejection.
		#[source]
		source: Box<RejectionDetails>,
	},
	/// The infrastructure account behind the credentials is temporarily locked.
	#[error("Infrastructure account is temporarily locked.")]
	ProviderAccountTemporarilyLocked {
		/// The rejection that carried the account-lock requirement code.
		#[source]
		source: Box<Error>,
	},
}
impl Error {
	/// Creates an [`Error::Unclassified`] carrying only a summary message.
	pub fn unclassified(message: impl Into<String>) -> Self {
		Self::Unclassified { message: message.into(), status: None, body_preview: None, source: None }
	}

	/// Returns the HTTP status code attached to the failure, when one was received.
	pub fn status(&self) -> Option<u16> {
		match self {
			Self::Unclassified { status, .. } => *status,
			Self::FailedTokenExchange { status, .. } => Some(*status),
			Self::ProviderAccountTemporarilyLocked { source } => source.status(),
		}
	}
}

/// Details and requirement fields attached to a structured IAM rejection.
///
/// Renders as `{details} {requirement_code}: {requirement_error}`, with absent payload fields
/// collapsing to empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, ThisError)]
#[error("{details} {requirement_code}: {requirement_error}")]
pub struct RejectionDetails {
	/// `errorDetails` reported by the token endpoint.
	pub details: String,
	/// `requirements.code` reported by the token endpoint.
	pub requirement_code: String,
	/// `requirements.error` reported by the token endpoint.
	pub requirement_error: String,
}
