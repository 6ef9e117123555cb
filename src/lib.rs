//! Connect a Google Analytics account over OAuth 2.0 and list its properties.
//!
//! One consent redirect, one code exchange and one listing call, rendered as a short HTML
//! fragment by a small axum server.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod server;
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests.

	pub use crate::_prelude::*;

	// std
	use std::time::Duration as StdDuration;
	// self
	use crate::{
		analytics::{ApiVersion, ListingApi},
		auth::ScopeSet,
		config::{ClientCredentials, Config},
		flows::Connector,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{ClientAuthMethod, DefaultProviderStrategy, ProviderDescriptor},
		server::{self, AppState},
	};

	/// Connector type alias used by reqwest-backed integration tests.
	pub type ReqwestTestConnector = crate::flows::ReqwestConnector;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests; `timeout` bounds each request when set.
	pub fn test_reqwest_http_client(timeout: Option<StdDuration>) -> Result<ReqwestHttpClient> {
		let mut builder = ReqwestClient::builder()
			.redirect(reqwest::redirect::Policy::none())
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true);

		if let Some(timeout) = timeout {
			builder = builder.timeout(timeout);
		}

		Ok(ReqwestHttpClient::with_client(
			builder.build().map_err(crate::error::ConfigError::from)?,
		))
	}

	/// Builds a [`Config`] whose provider and listing endpoints live under `base`.
	pub fn test_config(base: &str, version: ApiVersion) -> Result<Config> {
		let base = Url::parse(base).map_err(|source| crate::error::ConfigError::InvalidUrl {
			field: "base",
			source,
		})?;
		let descriptor = ProviderDescriptor::builder("mock-google")
			.authorization_endpoint(join(&base, "/o/oauth2/v2/auth")?)
			.token_endpoint(join(&base, "/token")?)
			.client_auth(ClientAuthMethod::ClientSecretPost)
			.offline_access(true)
			.build()
			.map_err(crate::error::ConfigError::from)?;
		let credentials = ClientCredentials {
			client_id: "client-it.apps.example.com".into(),
			client_secret: "secret-it".into(),
			redirect_uris: vec!["https://app.example.com/oauth2callback".into()],
		};
		let scope = ScopeSet::new([crate::config::DEFAULT_SCOPE])
			.map_err(crate::error::ConfigError::from)?;

		Config::builder(credentials)
			.descriptor(descriptor)
			.scope(scope)
			.listing_api(ListingApi::new(version, base))
			.build()
	}

	/// Builds the connector backed by the insecure test transport.
	pub fn build_reqwest_test_connector(config: &Config) -> Result<ReqwestTestConnector> {
		let http_client = test_reqwest_http_client(config.timeout)?;

		Connector::with_http_client(
			config,
			Arc::new(DefaultProviderStrategy),
			http_client,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Builds the full axum router backed by the insecure test transport.
	pub fn build_test_router(config: &Config) -> Result<axum::Router> {
		let connector = build_reqwest_test_connector(config)?;

		Ok(server::router(Arc::new(AppState::new(connector))))
	}

	fn join(base: &Url, path: &str) -> Result<Url> {
		base.join(path)
			.map_err(|source| crate::error::ConfigError::InvalidUrl { field: "base", source }.into())
	}
}

mod _prelude {
	pub use std::{
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::Mutex;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
// Binary-only crates.
use {color_eyre as _, tracing_subscriber as _};
#[cfg(test)] use {httpmock as _, tower as _};
