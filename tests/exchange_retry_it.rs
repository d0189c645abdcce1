// std
use std::{
	sync::{
		Arc,
		atomic::{AtomicU32, Ordering},
	},
	time::Duration,
};
// crates.io
use thiserror::Error as ThisError;
use url::Url;
// self
use iam_token_exchange::{
	classify::TcpSubstringClassifier,
	config::AuthConfiguration,
	error::Error,
	exchange::TokenExchangeClient,
	http::{TokenHttpClient, TokenRequest, TransportFuture},
	retry::RetryPolicy,
};

#[derive(Clone, Debug, ThisError)]
enum DialError {
	#[error("tcp connect error: connection refused")]
	Tcp,
	#[error("dns lookup failure: name not resolved")]
	Dns,
}

struct FailingTransport {
	error: DialError,
	requests: AtomicU32,
}
impl FailingTransport {
	fn new(error: DialError) -> Self {
		Self { error, requests: AtomicU32::new(0) }
	}
}
impl TokenHttpClient for FailingTransport {
	type TransportError = DialError;

	fn execute<'a>(
		&'a self,
		_request: &'a TokenRequest,
	) -> TransportFuture<'a, Self::TransportError> {
		Box::pin(async move {
			self.requests.fetch_add(1, Ordering::SeqCst);

			Err(self.error.clone())
		})
	}
}

fn build_client(
	transport: Arc<FailingTransport>,
	attempts: u32,
) -> TokenExchangeClient<FailingTransport, TcpSubstringClassifier> {
	let iam_url = Url::parse("https://iam.cloud.ibm.com").expect("Failed to parse IAM URL.");
	let config = AuthConfiguration::new(iam_url, "bx", "bx");

	TokenExchangeClient::with_http_client(config, transport, TcpSubstringClassifier)
		.with_retry_policy(RetryPolicy::new(attempts, Duration::ZERO))
}

#[tokio::test]
async fn tcp_failures_retry_to_the_attempt_bound() {
	let transport = Arc::new(FailingTransport::new(DialError::Tcp));
	let client = build_client(Arc::clone(&transport), 4);
	let err = client
		.exchange_iam_api_key_for_access_token("api-key")
		.await
		.expect_err("Exchange should surface the final transport error.");

	assert_eq!(transport.requests.load(Ordering::SeqCst), 4);
	assert!(matches!(err, Error::Unclassified { .. }));
	assert!(client.is_connection_error(&err));
	assert_eq!(client.exchange_metrics.calls(), 1);
	assert_eq!(client.exchange_metrics.requests(), 4);
	assert_eq!(client.exchange_metrics.failures(), 1);
}

#[tokio::test]
async fn non_tcp_failures_surface_without_retry() {
	let transport = Arc::new(FailingTransport::new(DialError::Dns));
	let client = build_client(Arc::clone(&transport), 4);
	let err = client
		.exchange_refresh_token_for_access_token("refresh-secret")
		.await
		.expect_err("Exchange should surface the transport error.");

	assert_eq!(transport.requests.load(Ordering::SeqCst), 1);
	assert!(matches!(err, Error::Unclassified { .. }));
	assert!(!client.is_connection_error(&err));
	assert_eq!(client.exchange_metrics.requests(), 1);
}

#[tokio::test]
async fn transport_failures_keep_their_cause_attached() {
	let transport = Arc::new(FailingTransport::new(DialError::Tcp));
	let client = build_client(Arc::clone(&transport), 1);
	let err = client
		.exchange_iam_api_key_for_ims_token("api-key")
		.await
		.expect_err("Exchange should surface the transport error.");
	let source = std::error::Error::source(&err)
		.expect("The transport failure should stay attached as a source.");

	assert_eq!(source.to_string(), "tcp connect error: connection refused");
}
