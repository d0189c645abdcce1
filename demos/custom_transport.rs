//! Demonstrates registering a custom HTTP transport and connection-error classifier.
//!
//! 1. Implement [`TokenHttpClient`] so the transport resolves every HTTP response into a
//!    [`RawResponse`] and surfaces connection failures as its own error type.
//! 2. Implement [`ConnectionErrorClassifier`] when substring sniffing for `"tcp"` over the cause
//!    chain does not fit the transport's error texts.
//! 3. Wrap both in `Arc` and pass them to [`TokenExchangeClient::with_http_client`].

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
	time::Duration,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use iam_token_exchange::{
	classify::{ConnectionErrorClassifier, ErrorChain},
	config::AuthConfiguration,
	exchange::TokenExchangeClient,
	http::{RawResponse, TokenHttpClient, TokenRequest, TransportFuture},
	retry::RetryPolicy,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let iam_url = Url::parse("https://iam.example.com")?;
	let config = AuthConfiguration::new(iam_url, "demo-client", "demo-secret");
	let client = TokenExchangeClient::<CannedTransport, RefusedClassifier>::with_http_client(
		config.clone(),
		Arc::new(CannedTransport),
		Arc::new(RefusedClassifier),
	);
	let token = client.exchange_iam_api_key_for_access_token("demo-api-key").await?;

	println!(
		"Access token issued by the canned transport ({} bytes).",
		token.token.expose().len(),
	);

	let failing = TokenExchangeClient::<RefusedTransport, RefusedClassifier>::with_http_client(
		config,
		Arc::new(RefusedTransport),
		Arc::new(RefusedClassifier),
	)
	.with_retry_policy(RetryPolicy::new(3, Duration::from_millis(50)));

	match failing.exchange_iam_api_key_for_access_token("demo-api-key").await {
		Ok(_) => println!("The refusing transport unexpectedly produced a token."),
		Err(e) => println!(
			"Error surfaced after {} requests: {e}.",
			failing.exchange_metrics.requests(),
		),
	}

	Ok(())
}

#[derive(Clone, Debug)]
enum GatewayError {
	Refused,
}
impl Display for GatewayError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Refused => f.write_str("connection refused by gateway"),
		}
	}
}
impl StdError for GatewayError {}

struct CannedTransport;
impl TokenHttpClient for CannedTransport {
	type TransportError = GatewayError;

	fn execute<'a>(
		&'a self,
		_request: &'a TokenRequest,
	) -> TransportFuture<'a, Self::TransportError> {
		Box::pin(async {
			Ok(RawResponse { status: 200, body: b"{\"access_token\":\"demo-access\"}".to_vec() })
		})
	}
}

struct RefusedTransport;
impl TokenHttpClient for RefusedTransport {
	type TransportError = GatewayError;

	fn execute<'a>(
		&'a self,
		_request: &'a TokenRequest,
	) -> TransportFuture<'a, Self::TransportError> {
		Box::pin(async { Err(GatewayError::Refused) })
	}
}

/// Retries whenever any cause layer mentions a refused connection, instead of the stock `"tcp"`
/// marker.
struct RefusedClassifier;
impl ConnectionErrorClassifier for RefusedClassifier {
	fn is_connection_error(&self, chain: &ErrorChain) -> bool {
		chain.layers().any(|layer| layer.contains("refused"))
	}
}
