//! Token types issued by the IAM token endpoint.

// self
use crate::_prelude::*;

/// Redacted token secret wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// Opaque bearer credential for general IBM Cloud API use.
///
/// The exchange client does not track expiry; callers re-exchange when the service starts
/// rejecting the token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
	/// Bearer token material.
	pub token: TokenSecret,
}
impl AccessToken {
	/// Wraps raw access token material.
	pub fn new(token: impl Into<String>) -> Self {
		Self { token: TokenSecret::new(token) }
	}
}

/// IMS-portal-scoped token derived from an access token or IAM API key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImsToken {
	/// IMS user identifier the token is bound to.
	pub user_id: i64,
	/// Bearer token material.
	pub token: TokenSecret,
}
impl ImsToken {
	/// Wraps an IMS user identifier and raw token material.
	pub fn new(user_id: i64, token: impl Into<String>) -> Self {
		Self { user_id, token: TokenSecret::new(token) }
	}
}
