//! Transport primitives for IAM token exchanges.
//!
//! [`TokenHttpClient`] is the crate's only dependency on an HTTP stack. Implementations execute
//! the single form-encoded `POST` described by a [`TokenRequest`] and hand back the raw status
//! and body as a [`RawResponse`]; payload classification stays with the exchange layer, so custom
//! transports never re-implement error handling.

// std
use std::ops::Deref;
// crates.io
#[cfg(feature = "reqwest")] use reqwest::header::{ACCEPT, AUTHORIZATION};
// self
use crate::_prelude::*;

/// `Accept` header value sent with every token exchange request.
pub const ACCEPT_JSON: &str = "application/json";

/// A single token exchange request, built once per call and reused across retries.
#[derive(Clone)]
pub struct TokenRequest {
	/// Token endpoint receiving the `POST`.
	pub url: Url,
	/// Precomputed `Authorization` header value (`Basic …`).
	pub authorization: String,
	/// Form fields, encoded as `application/x-www-form-urlencoded` on the wire.
	pub form: Vec<(&'static str, String)>,
}
impl TokenRequest {
	/// Assembles a request from an endpoint, an authorization header value, and form fields.
	pub fn new(url: Url, authorization: String, form: Vec<(&'static str, String)>) -> Self {
		Self { url, authorization, form }
	}

	/// Iterates the form field names.
	pub fn field_names(&self) -> impl Iterator<Item = &'static str> {
		self.form.iter().map(|(name, _)| *name)
	}
}
impl Debug for TokenRequest {
	// Field values and the authorization header carry credentials; only names are rendered.
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenRequest")
			.field("url", &self.url.as_str())
			.field("form", &self.field_names().collect::<Vec<_>>())
			.finish()
	}
}

/// Raw transport outcome: HTTP status plus the undecoded body.
#[derive(Clone, Debug)]
pub struct RawResponse {
	/// HTTP status code returned by the token endpoint.
	pub status: u16,
	/// Undecoded response body.
	pub body: Vec<u8>,
}

/// Boxed response future returned by [`TokenHttpClient::execute`].
pub type TransportFuture<'a, E> = Pin<Box<dyn Future<Output = Result<RawResponse, E>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of executing a token exchange `POST`.
///
/// Implementations must send the request's form fields URL-encoded, attach
/// [`TokenRequest::authorization`] and [`ACCEPT_JSON`] as the `Authorization`/`Accept` headers,
/// follow no redirects, and resolve with a [`RawResponse`] for every HTTP response regardless of
/// status; only failures that produced no response at all surface as
/// [`TransportError`](TokenHttpClient::TransportError). Implementations must be
/// `Send + Sync + 'static` so one transport can be shared across clients behind an `Arc`.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Executes one `POST` for `request` and captures the raw response.
	fn execute<'a>(&'a self, request: &'a TokenRequest)
	-> TransportFuture<'a, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
///
/// The stock client verifies TLS through `rustls`; use [`ReqwestHttpClient::with_client`] to
/// adjust trust roots, proxies, or timeouts before handing the transport to the exchange client.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn execute<'a>(
		&'a self,
		request: &'a TokenRequest,
	) -> TransportFuture<'a, Self::TransportError> {
		Box::pin(async move {
			let response = self
				.0
				.post(request.url.clone())
				.header(AUTHORIZATION, request.authorization.as_str())
				.header(ACCEPT, ACCEPT_JSON)
				.form(&request.form)
				.send()
				.await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(RawResponse { status, body })
		})
	}
}
