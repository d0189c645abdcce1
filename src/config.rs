//! Client construction inputs for the IAM token endpoint.

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
// self
use crate::_prelude::*;

/// Immutable IAM endpoint coordinates and client credentials.
///
/// Shared by every exchange issued through a client. The client secret never appears in `Debug`
/// output.
#[derive(Clone)]
pub struct AuthConfiguration {
	/// Base URL of the IAM service, e.g. `https://iam.cloud.ibm.com`.
	pub iam_url: Url,
	/// OAuth client identifier presented via Basic auth.
	pub client_id: String,
	client_secret: String,
}
impl AuthConfiguration {
	/// Creates a configuration for the given IAM endpoint and client credentials.
	pub fn new(
		iam_url: Url,
		client_id: impl Into<String>,
		client_secret: impl Into<String>,
	) -> Self {
		Self { iam_url, client_id: client_id.into(), client_secret: client_secret.into() }
	}

	/// Returns the token endpoint, `{iam_url}/oidc/token`.
	///
	/// The path is appended to whatever path the base URL already carries, so a base of
	/// `https://host/prefix` yields `https://host/prefix/oidc/token`; query and fragment are
	/// discarded.
	pub fn token_endpoint(&self) -> Url {
		let mut url = self.iam_url.clone();
		let path = format!("{}/oidc/token", url.path().trim_end_matches('/'));

		url.set_path(&path);
		url.set_query(None);
		url.set_fragment(None);

		url
	}

	/// Returns the `Authorization` header value, `Basic base64(client_id:client_secret)`.
	pub fn basic_authorization(&self) -> String {
		let credentials = format!("{}:{}", self.client_id, self.client_secret);

		format!("Basic {}", STANDARD.encode(credentials))
	}
}
impl Debug for AuthConfiguration {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthConfiguration")
			.field("iam_url", &self.iam_url.as_str())
			.field("client_id", &self.client_id)
			.field("client_secret_set", &!self.client_secret.is_empty())
			.finish()
	}
}
