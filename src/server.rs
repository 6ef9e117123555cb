//! axum front end: `GET /auth` and `GET /oauth2callback`.

mod render;

pub use render::*;

// crates.io
use axum::{
	Router,
	extract::{Query, State, rejection::QueryRejection},
	http::{StatusCode, header::LOCATION},
	response::{Html, IntoResponse, Response},
	routing::get,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
// self
use crate::{
	_prelude::*,
	config::Config,
	error,
	flows::{FlowStage, ReqwestConnector},
};

/// Body sent when the listing returns no account.
pub const NO_ACCOUNTS_MESSAGE: &str = "No Google Analytics accounts found.";
/// Body sent when accounts exist but none of them has a property.
pub const NO_PROPERTIES_MESSAGE: &str = "No Google Analytics properties found.";
/// Body sent when the code exchange fails.
pub const EXCHANGE_FAILED_MESSAGE: &str = "Authentication failed.";
/// Body sent when the listing call fails.
pub const LISTING_FAILED_MESSAGE: &str = "Failed to list Google Analytics properties.";

/// Shared, read-only handler state.
#[derive(Debug)]
pub struct AppState {
	connector: ReqwestConnector,
}
impl AppState {
	/// Wraps a ready connector.
	pub fn new(connector: ReqwestConnector) -> Self {
		Self { connector }
	}
}

#[derive(Debug, Default, Deserialize)]
struct CallbackParams {
	code: Option<String>,
	error: Option<String>,
}

/// Builds the router with both routes and request tracing.
pub fn router(state: Arc<AppState>) -> Router {
	Router::new()
		.route("/auth", get(authorize))
		.route("/oauth2callback", get(callback))
		.layer(TraceLayer::new_for_http())
		.with_state(state)
}

/// Binds `config.socket_addr()` and serves until Ctrl-C.
pub async fn serve(config: Config) -> Result<()> {
	let connector = ReqwestConnector::new(&config)?;
	let app = router(Arc::new(AppState::new(connector)));
	let listener = TcpListener::bind(config.socket_addr()).await.map_err(Error::Server)?;
	let address = listener.local_addr().map_err(Error::Server)?;

	tracing::info!(%address, "Server listening; open /auth to connect an account.");

	axum::serve(listener, app)
		.with_graceful_shutdown(shutdown_signal())
		.await
		.map_err(Error::Server)
}

async fn authorize(State(state): State<Arc<AppState>>) -> Response {
	let url = state.connector.authorization_url();

	(StatusCode::FOUND, [(LOCATION, url.to_string())]).into_response()
}

async fn callback(
	State(state): State<Arc<AppState>>,
	params: Result<Query<CallbackParams>, QueryRejection>,
) -> Response {
	let params = match params {
		Ok(Query(params)) => params,
		Err(rejection) => {
			tracing::warn!(
				rejection = %rejection.body_text(),
				"Callback query string is unreadable; continuing without a code."
			);

			CallbackParams::default()
		},
	};

	if let Some(error) = &params.error {
		tracing::warn!(%error, "Provider redirected back with an error.");
	}

	let code = params.code.unwrap_or_default();

	match state.connector.complete_callback(&code).await {
		Ok(listing) if listing.has_no_accounts() => NO_ACCOUNTS_MESSAGE.into_response(),
		Ok(listing) if listing.properties.is_empty() => NO_PROPERTIES_MESSAGE.into_response(),
		Ok(listing) => Html(render_property_list(&listing.properties)).into_response(),
		Err(failure) => {
			tracing::error!(
				stage = %failure.stage,
				error = %error::display_chain(&failure.error),
				"OAuth callback failed."
			);

			let message = match failure.stage {
				FlowStage::CodeExchange => EXCHANGE_FAILED_MESSAGE,
				FlowStage::PropertyListing => LISTING_FAILED_MESSAGE,
			};

			(StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
		},
	}
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		tracing::warn!(error = %e, "Failed to listen for the shutdown signal.");

		std::future::pending::<()>().await;
	}
}
