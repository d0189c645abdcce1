//! IBM Cloud IAM token exchange client—swap refresh tokens and API keys for access/IMS tokens
//! with typed failures and connection-aware retries.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod classify;
pub mod config;
pub mod error;
pub mod exchange;
pub mod http;
pub mod obs;
pub mod retry;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		classify::TcpSubstringClassifier,
		config::AuthConfiguration,
		exchange::TokenExchangeClient,
		http::ReqwestHttpClient,
		retry::RetryPolicy,
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = TokenExchangeClient<ReqwestHttpClient, TcpSubstringClassifier>;

	/// Builds a reqwest HTTP client that accepts self-signed certificates so tests can target
	/// HTTPS mocks.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`TokenExchangeClient`] pointed at a mock IAM endpoint, with the stock
	/// classifier and a retry policy short enough for tests.
	pub fn build_reqwest_test_client(
		iam_url: &str,
		client_id: &str,
		client_secret: &str,
	) -> ReqwestTestClient {
		let iam_url = Url::parse(iam_url).expect("Failed to parse test IAM URL.");
		let config = AuthConfiguration::new(iam_url, client_id, client_secret);

		TokenExchangeClient::with_http_client(
			config,
			test_reqwest_http_client(),
			TcpSubstringClassifier,
		)
		.with_retry_policy(RetryPolicy::new(3, Duration::from_millis(10)))
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
