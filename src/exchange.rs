//! Token exchange client and the shared send-and-classify pipeline.
//!
//! Four exchange operations share one transport routine: build a form-encoded `POST` to
//! `{iam_url}/oidc/token`, execute it under the configured [`RetryPolicy`] (retrying only
//! failures the [`ConnectionErrorClassifier`] marks as connection errors), then map the response
//! into exactly one of [`AccessToken`] or [`ImsToken`], or into a classified [`Error`].
//!
//! The client imposes no deadline of its own; a call can block its task for up to
//! `attempts × interval` (two minutes at the defaults). Dropping the future returned by any
//! operation cancels the exchange, remaining retries included, and callers wanting a hard bound
//! wrap calls in `tokio::time::timeout`.

mod metrics;

pub use metrics::ExchangeMetrics;

// self
use crate::{
	_prelude::*,
	auth::{AccessToken, ImsToken, TokenSecret},
	classify::{ConnectionErrorClassifier, ErrorChain},
	config::AuthConfiguration,
	error::RejectionDetails,
	http::{RawResponse, TokenHttpClient, TokenRequest},
	obs::{self, ExchangeKind, ExchangeOutcome, ExchangeSpan},
	retry::{self, RetryPolicy},
};
#[cfg(feature = "reqwest")]
use crate::{classify::TcpSubstringClassifier, http::ReqwestHttpClient};

/// Requirement code IAM reports when the infrastructure account behind the credentials is
/// temporarily locked.
pub const ACCOUNT_LOCKED_CODE: &str = "SoftLayer_Exception_User_Customer_AccountLocked";

const GRANT_TYPE_APIKEY: &str = "urn:ibm:params:oauth:grant-type:apikey";
const GRANT_TYPE_DERIVE: &str = "urn:ibm:params:oauth:grant-type:derive";
const RESPONSE_TYPE_IMS_PORTAL: &str = "ims_portal";
const BODY_PREVIEW_LIMIT: usize = 2_048;

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport and stock classifier.
pub type ReqwestTokenExchangeClient = TokenExchangeClient<ReqwestHttpClient, TcpSubstringClassifier>;

/// Exchanges credentials for short-lived access/IMS tokens against one IAM endpoint.
///
/// The client owns the transport, the connection-error classifier, and the retry policy so the
/// individual operations can focus on their grant-specific form fields. Calls are independent;
/// the only state shared between concurrent callers is the immutable [`AuthConfiguration`], the
/// transport behind its `Arc`, and the monotonic [`ExchangeMetrics`] counters.
#[derive(Clone)]
pub struct TokenExchangeClient<C, S>
where
	C: ?Sized + TokenHttpClient,
	S: ?Sized + ConnectionErrorClassifier,
{
	/// HTTP transport used for every outbound token request.
	pub http_client: Arc<C>,
	/// Classifier deciding which failures count as retryable connection errors.
	pub classifier: Arc<S>,
	/// IAM endpoint coordinates and client credentials.
	pub config: AuthConfiguration,
	/// Retry policy applied to every exchange call.
	pub retry_policy: RetryPolicy,
	/// Shared counters for exchange calls and their outcomes.
	pub exchange_metrics: Arc<ExchangeMetrics>,
}
impl<C, S> TokenExchangeClient<C, S>
where
	C: ?Sized + TokenHttpClient,
	S: ?Sized + ConnectionErrorClassifier,
{
	/// Creates a client that reuses the caller-provided transport + classifier pair.
	pub fn with_http_client(
		config: AuthConfiguration,
		http_client: impl Into<Arc<C>>,
		classifier: impl Into<Arc<S>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			classifier: classifier.into(),
			config,
			retry_policy: RetryPolicy::default(),
			exchange_metrics: Default::default(),
		}
	}

	/// Overrides the retry policy (defaults to 40 attempts, 3 seconds apart).
	pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
		self.retry_policy = policy;

		self
	}

	/// Exchanges a refresh token for an access token (`grant_type=refresh_token`).
	///
	/// Retries connection-level failures per the configured [`RetryPolicy`]; any other failure
	/// is terminal. Dropping the returned future cancels the exchange.
	pub async fn exchange_refresh_token_for_access_token(
		&self,
		refresh_token: &str,
	) -> Result<AccessToken> {
		let form = vec![
			("grant_type", "refresh_token".to_owned()),
			("refresh_token", refresh_token.to_owned()),
		];
		let response = self.send_with_retry(ExchangeKind::RefreshToken, form).await?;

		Ok(response.into_access_token())
	}

	/// Derives an IMS-portal token from an access token
	/// (`grant_type=urn:ibm:params:oauth:grant-type:derive`, `response_type=ims_portal`).
	pub async fn exchange_access_token_for_ims_token(
		&self,
		access_token: &AccessToken,
	) -> Result<ImsToken> {
		let form = vec![
			("grant_type", GRANT_TYPE_DERIVE.to_owned()),
			("response_type", RESPONSE_TYPE_IMS_PORTAL.to_owned()),
			("access_token", access_token.token.expose().to_owned()),
		];
		let response = self.send_with_retry(ExchangeKind::DeriveImsToken, form).await?;

		Ok(response.into_ims_token())
	}

	/// Exchanges an IAM API key for an IMS-portal token
	/// (`grant_type=urn:ibm:params:oauth:grant-type:apikey`, `response_type=ims_portal`).
	pub async fn exchange_iam_api_key_for_ims_token(&self, api_key: &str) -> Result<ImsToken> {
		let form = vec![
			("grant_type", GRANT_TYPE_APIKEY.to_owned()),
			("response_type", RESPONSE_TYPE_IMS_PORTAL.to_owned()),
			("apikey", api_key.to_owned()),
		];
		let response = self.send_with_retry(ExchangeKind::ApiKeyImsToken, form).await?;

		Ok(response.into_ims_token())
	}

	/// Exchanges an IAM API key for an access token
	/// (`grant_type=urn:ibm:params:oauth:grant-type:apikey`).
	pub async fn exchange_iam_api_key_for_access_token(
		&self,
		api_key: &str,
	) -> Result<AccessToken> {
		let form =
			vec![("grant_type", GRANT_TYPE_APIKEY.to_owned()), ("apikey", api_key.to_owned())];
		let response = self.send_with_retry(ExchangeKind::ApiKeyAccessToken, form).await?;

		Ok(response.into_access_token())
	}

	/// Credential-rotation hook retained for interface compatibility.
	///
	/// The client keeps no API key state between calls, so there is nothing to rotate; the call
	/// is intentionally a no-op and always succeeds.
	pub fn update_api_key(&self, _api_key: &str) -> Result<()> {
		Ok(())
	}

	/// Returns `true` when `error`'s rendered cause chain classifies as a connection error.
	pub fn is_connection_error(&self, error: &Error) -> bool {
		self.classifier.is_connection_error(&ErrorChain::from_error(error))
	}

	async fn send_with_retry(
		&self,
		kind: ExchangeKind,
		form: Vec<(&'static str, String)>,
	) -> Result<TokenExchangeResponse> {
		let span = ExchangeSpan::new(kind, "send_with_retry");

		obs::record_exchange_outcome(kind, ExchangeOutcome::Attempt);
		self.exchange_metrics.record_call();

		let request = TokenRequest::new(
			self.config.token_endpoint(),
			self.config.basic_authorization(),
			form,
		);
		let result = span
			.instrument(retry::retry(
				self.retry_policy,
				|error| self.is_connection_error(error),
				|| {
					self.exchange_metrics.record_request();

					self.send_once(kind, &request)
				},
			))
			.await;

		match &result {
			Ok(_) => {
				self.exchange_metrics.record_success();
				obs::record_exchange_outcome(kind, ExchangeOutcome::Success);
			},
			Err(_) => {
				self.exchange_metrics.record_failure();
				obs::record_exchange_outcome(kind, ExchangeOutcome::Failure);
			},
		}

		result
	}

	async fn send_once(
		&self,
		kind: ExchangeKind,
		request: &TokenRequest,
	) -> Result<TokenExchangeResponse> {
		#[cfg(feature = "tracing")]
		tracing::debug!(
			exchange = kind.as_str(),
			url = request.url.as_str(),
			"Sending IAM token exchange request."
		);

		let response = match self.http_client.execute(request).await {
			Ok(response) => response,
			Err(error) => {
				#[cfg(feature = "tracing")]
				tracing::error!(
					exchange = kind.as_str(),
					error = %error,
					"IAM token exchange request failed."
				);

				return Err(Error::Unclassified {
					message: "IAM token exchange request failed.".into(),
					status: None,
					body_preview: None,
					source: Some(Box::new(error)),
				});
			},
		};

		// Only an exact 200 counts as success; other 2xx codes fall through to rejection
		// classification.
		if response.status == 200 {
			#[cfg(feature = "tracing")]
			tracing::debug!(exchange = kind.as_str(), "IAM token exchange request successful.");

			return decode_success(&response.body);
		}

		Err(classify_rejection(kind, response))
	}
}
#[cfg(feature = "reqwest")]
impl TokenExchangeClient<ReqwestHttpClient, TcpSubstringClassifier> {
	/// Creates a client with the crate's default TLS-verifying reqwest transport and the stock
	/// `tcp`-substring classifier.
	pub fn new(config: AuthConfiguration) -> Self {
		Self::with_http_client(config, ReqwestHttpClient::default(), TcpSubstringClassifier)
	}
}
impl<C, S> Debug for TokenExchangeClient<C, S>
where
	C: ?Sized + TokenHttpClient,
	S: ?Sized + ConnectionErrorClassifier,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("TokenExchangeClient")
			.field("config", &self.config)
			.field("retry_policy", &self.retry_policy)
			.finish()
	}
}

/// Success payload returned by the token endpoint; absent fields decode to empty/zero values.
#[derive(Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct TokenExchangeResponse {
	access_token: String,
	ims_token: String,
	ims_user_id: i64,
}
impl TokenExchangeResponse {
	fn into_access_token(self) -> AccessToken {
		AccessToken { token: TokenSecret::new(self.access_token) }
	}

	fn into_ims_token(self) -> ImsToken {
		ImsToken { user_id: self.ims_user_id, token: TokenSecret::new(self.ims_token) }
	}
}

/// Failure payload returned by the token endpoint; every field is optional and an unparseable
/// body decodes as the all-empty shape.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TokenExchangeFailure {
	#[serde(rename = "errorMessage")]
	error_message: Option<String>,
	#[serde(rename = "errorCode")]
	error_code: Option<String>,
	#[serde(rename = "errorDetails")]
	error_details: Option<String>,
	requirements: Requirements,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Requirements {
	error: Option<String>,
	code: Option<String>,
}

fn decode_success(body: &[u8]) -> Result<TokenExchangeResponse> {
	let mut deserializer = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut deserializer).map_err(|error| Error::Unclassified {
		message: "IAM token exchange response could not be decoded.".into(),
		status: Some(200),
		body_preview: preview(body),
		source: Some(Box::new(error)),
	})
}

fn classify_rejection(kind: ExchangeKind, response: RawResponse) -> Error {
	#[cfg(not(feature = "tracing"))]
	let _ = kind;

	let failure: TokenExchangeFailure = serde_json::from_slice(&response.body).unwrap_or_default();
	let message = match failure.error_message {
		Some(message) if !message.is_empty() => message,
		_ => {
			#[cfg(feature = "tracing")]
			tracing::error!(
				exchange = kind.as_str(),
				status = response.status,
				"Unexpected IAM token exchange response."
			);

			return Error::Unclassified {
				message: "Unexpected IAM token exchange response.".into(),
				status: Some(response.status),
				body_preview: preview(&response.body),
				source: None,
			};
		},
	};

	#[cfg(feature = "tracing")]
	tracing::error!(
		exchange = kind.as_str(),
		status = response.status,
		error_message = %message,
		error_type = failure.error_code.as_deref().unwrap_or_default(),
		"IAM token exchange request failed with message."
	);

	let requirement_code = failure.requirements.code.unwrap_or_default();
	let locked = requirement_code == ACCOUNT_LOCKED_CODE;
	let rejection = Error::FailedTokenExchange {
		message,
		error_type: failure.error_code,
		status: response.status,
		source: Box::new(RejectionDetails {
			details: failure.error_details.unwrap_or_default(),
			requirement_code,
			requirement_error: failure.requirements.error.unwrap_or_default(),
		}),
	};

	if locked {
		return Error::ProviderAccountTemporarilyLocked { source: Box::new(rejection) };
	}

	rejection
}

fn preview(body: &[u8]) -> Option<String> {
	if body.is_empty() {
		return None;
	}

	let text = String::from_utf8_lossy(body);

	Some(text.chars().take(BODY_PREVIEW_LIMIT).collect())
}
