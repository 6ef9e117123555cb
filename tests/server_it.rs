// std
use std::time::Duration as StdDuration;
// crates.io
use axum::{
	Router,
	body::{self, Body},
	http::{Request, StatusCode, header::LOCATION},
};
use httpmock::prelude::*;
use tower::ServiceExt;
// self
use analytics_connect::{
	_preludet::*,
	analytics::ApiVersion,
	server::{
		EXCHANGE_FAILED_MESSAGE, LISTING_FAILED_MESSAGE, NO_ACCOUNTS_MESSAGE,
		NO_PROPERTIES_MESSAGE,
	},
};

const TOKEN_OK: &str =
	"{\"access_token\":\"access-it\",\"token_type\":\"Bearer\",\"expires_in\":3599,\"scope\":\"https://www.googleapis.com/auth/analytics.readonly\"}";

fn router(server: &MockServer) -> Router {
	let config = test_config(&server.base_url(), ApiVersion::AdminV1Beta)
		.expect("Test configuration should build.");

	build_test_router(&config).expect("Test router should build.")
}

async fn get(router: &Router, uri: &str) -> (StatusCode, Option<String>, String) {
	let request =
		Request::builder().uri(uri).body(Body::empty()).expect("Test request should build.");
	let response =
		router.clone().oneshot(request).await.expect("Router should always produce a response.");
	let status = response.status();
	let location = response
		.headers()
		.get(LOCATION)
		.map(|value| value.to_str().expect("Location should be ASCII.").to_owned());
	let bytes = body::to_bytes(response.into_body(), usize::MAX)
		.await
		.expect("Response body should be readable.");

	(status, location, String::from_utf8(bytes.to_vec()).expect("Response body should be UTF-8."))
}

#[tokio::test]
async fn auth_redirects_to_consent_url_with_encoded_parameters() {
	let server = MockServer::start_async().await;
	let router = router(&server);
	let (status, location, _) = get(&router, "/auth").await;
	let location = location.expect("Redirect must carry a Location header.");

	assert_eq!(status, StatusCode::FOUND);
	assert!(location.starts_with(&server.url("/o/oauth2/v2/auth?")));
	assert!(location.contains("response_type=code"));
	assert!(location.contains("client_id=client-it.apps.example.com"));
	assert!(location.contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Foauth2callback"));
	assert!(
		location.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fanalytics.readonly")
	);
	assert!(location.contains("access_type=offline"));

	let (_, again, _) = get(&router, "/auth").await;

	assert_eq!(again.as_deref(), Some(location.as_str()));
}

#[tokio::test]
async fn callback_without_accounts_reports_none_found() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_OK);
		})
		.await;
	let listing = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/v1beta/accountSummaries")
				.header("authorization", "Bearer access-it");
			then.status(200).header("content-type", "application/json").body("{}");
		})
		.await;
	let (status, _, body) = get(&router(&server), "/oauth2callback?code=valid-code").await;

	token.assert_async().await;
	listing.assert_async().await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, NO_ACCOUNTS_MESSAGE);
	assert!(!body.contains("<li>"));
}

#[tokio::test]
async fn callback_with_accounts_but_no_properties_says_so() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_OK);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1beta/accountSummaries");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"accountSummaries":[{"account":"accounts/1","displayName":"Empty"}]}"#);
		})
		.await;

	let (status, _, body) = get(&router(&server), "/oauth2callback?code=valid-code").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, NO_PROPERTIES_MESSAGE);
}

#[tokio::test]
async fn callback_lists_properties_in_returned_order() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_OK);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1beta/accountSummaries");
			then.status(200).header("content-type", "application/json").body(
				r#"{"accountSummaries":[
					{"account":"accounts/1","displayName":"First","propertySummaries":[{"property":"P1","displayName":"Alpha"}]},
					{"account":"accounts/2","displayName":"Second","propertySummaries":[{"property":"P2","displayName":"Beta"}]}
				]}"#,
			);
		})
		.await;

	let (status, _, body) = get(&router(&server), "/oauth2callback?code=valid-code").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body.matches("<li>").count(), 2);
	assert_eq!(body.matches("Alpha (P1)").count(), 1);
	assert_eq!(body.matches("Beta (P2)").count(), 1);

	let alpha = body.find("Alpha").expect("Alpha should be listed.");
	let beta = body.find("Beta").expect("Beta should be listed.");

	assert!(alpha < beta);
}

#[tokio::test]
async fn token_rejection_returns_500_and_server_keeps_serving() {
	let server = MockServer::start_async().await;
	let router = router(&server);
	let mut rejected = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"Bad Request\"}");
		})
		.await;
	let (status, _, body) = get(&router, "/oauth2callback?code=stale-code").await;

	rejected.assert_async().await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, EXCHANGE_FAILED_MESSAGE);

	rejected.delete_async().await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_OK);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1beta/accountSummaries");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"accountSummaries\":[]}");
		})
		.await;

	let (status, _, body) = get(&router, "/oauth2callback?code=fresh-code").await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(body, NO_ACCOUNTS_MESSAGE);
}

#[tokio::test]
async fn missing_code_still_attempts_exchange_and_fails_cleanly() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_request\",\"error_description\":\"Missing code\"}");
		})
		.await;
	let listing = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1beta/accountSummaries");
			then.status(200).body("{}");
		})
		.await;
	let (status, _, body) = get(&router(&server), "/oauth2callback").await;

	token.assert_calls_async(1).await;
	listing.assert_calls_async(0).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, EXCHANGE_FAILED_MESSAGE);
}

#[tokio::test]
async fn provider_error_redirect_is_treated_like_a_missing_code() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\"}");
		})
		.await;
	let (status, _, body) = get(&router(&server), "/oauth2callback?error=access_denied").await;

	token.assert_calls_async(1).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, EXCHANGE_FAILED_MESSAGE);
}

#[tokio::test]
async fn listing_failure_returns_500_with_listing_message() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_OK);
		})
		.await;

	let listing = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1beta/accountSummaries");
			then.status(403)
				.header("content-type", "application/json")
				.body("{\"error\":{\"code\":403,\"status\":\"PERMISSION_DENIED\"}}");
		})
		.await;
	let (status, _, body) = get(&router(&server), "/oauth2callback?code=valid-code").await;

	listing.assert_async().await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, LISTING_FAILED_MESSAGE);
}

#[tokio::test]
async fn unreadable_query_string_takes_the_exchange_failure_path() {
	let server = MockServer::start_async().await;
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_request\",\"error_description\":\"Missing code\"}");
		})
		.await;
	let (status, _, body) = get(&router(&server), "/oauth2callback?code=a&code=b").await;

	token.assert_calls_async(1).await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, EXCHANGE_FAILED_MESSAGE);
}

#[tokio::test]
async fn slow_listing_endpoint_times_out_into_500() {
	let server = MockServer::start_async().await;

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_OK);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/v1beta/accountSummaries");
			then.status(200)
				.header("content-type", "application/json")
				.body("{}")
				.delay(StdDuration::from_secs(2));
		})
		.await;

	let mut config = test_config(&server.base_url(), ApiVersion::AdminV1Beta)
		.expect("Test configuration should build.");

	config.timeout = Some(StdDuration::from_millis(500));

	let router = build_test_router(&config).expect("Test router should build.");
	let (status, _, body) = get(&router, "/oauth2callback?code=valid-code").await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, LISTING_FAILED_MESSAGE);
}

#[tokio::test]
async fn unreachable_token_endpoint_returns_500() {
	let config = test_config("http://127.0.0.1:1/", ApiVersion::AdminV1Beta)
		.expect("Test configuration should build.");
	let router = build_test_router(&config).expect("Test router should build.");
	let (status, _, body) = get(&router, "/oauth2callback?code=valid-code").await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body, EXCHANGE_FAILED_MESSAGE);
}
