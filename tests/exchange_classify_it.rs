// std
use std::time::Duration;
// crates.io
use httpmock::prelude::*;
// self
use iam_token_exchange::{
	config::AuthConfiguration,
	error::Error,
	exchange::{ReqwestTokenExchangeClient, TokenExchangeClient},
	retry::RetryPolicy,
	url::Url,
};

fn build_test_client(server: &MockServer) -> ReqwestTokenExchangeClient {
	let iam_url = Url::parse(&server.base_url()).expect("Failed to parse mock IAM URL.");
	let config = AuthConfiguration::new(iam_url, "bx", "bx");

	TokenExchangeClient::new(config)
		.with_retry_policy(RetryPolicy::new(5, Duration::from_millis(10)))
}

#[tokio::test]
async fn locked_requirements_code_maps_to_account_locked() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oidc/token");
			then.status(401).header("content-type", "application/json").body(
				"{\"errorMessage\":\"bad\",\"errorCode\":\"X\",\"errorDetails\":\"d\",\
				 \"requirements\":{\"code\":\"SoftLayer_Exception_User_Customer_AccountLocked\",\
				 \"error\":\"locked\"}}",
			);
		})
		.await;
	let err = client
		.exchange_iam_api_key_for_access_token("api-key")
		.await
		.expect_err("A locked account should surface an error.");

	match err {
		Error::ProviderAccountTemporarilyLocked { source } => {
			assert!(matches!(*source, Error::FailedTokenExchange { status: 401, .. }));
		},
		other => panic!("Expected an account-locked error, got {other:?}."),
	}

	// A structured rejection is terminal; no retry attempts are spent on it.
	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn other_requirements_code_maps_to_failed_exchange() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oidc/token");
			then.status(400).header("content-type", "application/json").body(
				"{\"errorMessage\":\"bad\",\"errorCode\":\"X\",\"errorDetails\":\"d\",\
				 \"requirements\":{\"code\":\"SoftLayer_Exception_Other\",\"error\":\"locked\"}}",
			);
		})
		.await;
	let err = client
		.exchange_refresh_token_for_access_token("refresh-secret")
		.await
		.expect_err("A rejected exchange should surface an error.");

	match err {
		Error::FailedTokenExchange { message, error_type, status, source } => {
			assert_eq!(message, "bad");
			assert_eq!(error_type.as_deref(), Some("X"));
			assert_eq!(status, 400);
			assert_eq!(source.to_string(), "d SoftLayer_Exception_Other: locked");
		},
		other => panic!("Expected a failed-exchange error, got {other:?}."),
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn empty_error_message_maps_to_unclassified() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oidc/token");
			then.status(500).header("content-type", "application/json").body("{}");
		})
		.await;
	let err = client
		.exchange_iam_api_key_for_ims_token("api-key")
		.await
		.expect_err("An uninterpretable rejection should surface an error.");

	match err {
		Error::Unclassified { status, .. } => assert_eq!(status, Some(500)),
		other => panic!("Expected an unclassified error, got {other:?}."),
	}

	mock.assert_calls_async(1).await;
}

#[tokio::test]
async fn non_json_rejection_body_maps_to_unclassified() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oidc/token");
			then.status(502).body("Bad Gateway");
		})
		.await;
	let err = client
		.exchange_iam_api_key_for_access_token("api-key")
		.await
		.expect_err("A gateway error page should surface an error.");

	match err {
		Error::Unclassified { status, body_preview, .. } => {
			assert_eq!(status, Some(502));
			assert_eq!(body_preview.as_deref(), Some("Bad Gateway"));
		},
		other => panic!("Expected an unclassified error, got {other:?}."),
	}
}

#[tokio::test]
async fn only_exact_200_counts_as_success() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oidc/token");
			then.status(201)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc\"}");
		})
		.await;
	let err = client
		.exchange_iam_api_key_for_access_token("api-key")
		.await
		.expect_err("A 201 response should not be treated as success.");

	match err {
		Error::Unclassified { status, .. } => assert_eq!(status, Some(201)),
		other => panic!("Expected an unclassified error, got {other:?}."),
	}
}

#[tokio::test]
async fn update_api_key_is_a_no_op() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oidc/token");
			then.status(200).body("{}");
		})
		.await;

	client.update_api_key("rotated-key").expect("update_api_key should always succeed.");
	client.update_api_key("").expect("update_api_key should succeed for any input.");

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn exchange_metrics_track_call_outcomes() {
	let server = MockServer::start_async().await;
	let client = build_test_client(&server);
	let _success = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/oidc/token")
				.form_urlencoded_tuple("apikey", "good-key");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"abc\"}");
		})
		.await;
	let _failure = server
		.mock_async(|when, then| {
			when.method(POST).path("/oidc/token").form_urlencoded_tuple("apikey", "bad-key");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"errorMessage\":\"bad\"}");
		})
		.await;

	client
		.exchange_iam_api_key_for_access_token("good-key")
		.await
		.expect("The good key should exchange.");
	client
		.exchange_iam_api_key_for_access_token("bad-key")
		.await
		.expect_err("The bad key should be rejected.");

	assert_eq!(client.exchange_metrics.calls(), 2);
	assert_eq!(client.exchange_metrics.requests(), 2);
	assert_eq!(client.exchange_metrics.successes(), 1);
	assert_eq!(client.exchange_metrics.failures(), 1);
}
