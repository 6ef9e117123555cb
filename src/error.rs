//! Error types for configuration, the code exchange and the listing call.

// self
use crate::_prelude::*;

/// `Result` defaulting to [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn StdError + Send + Sync>;

/// Renders `error` followed by every cause in its `source()` chain.
pub fn display_chain(error: &dyn StdError) -> String {
	let mut rendered = error.to_string();
	let mut source = error.source();

	while let Some(cause) = source {
		rendered.push_str(" Caused by: ");
		rendered.push_str(&cause.to_string());

		source = cause.source();
	}

	rendered
}

/// Every failure the connector can report.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Bad local settings.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Unexpected upstream response or timeout.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// The request never got an HTTP answer.
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Listing endpoint rejected the call or returned an unreadable body.
	#[error(transparent)]
	Listing(#[from] ListingError),
	/// Listener could not be bound or the server loop failed.
	#[error("HTTP server I/O failed.")]
	Server(#[source] std::io::Error),

	/// Requested scopes were refused.
	#[error("Scopes were refused: {reason}.")]
	InsufficientScope {
		/// Provider- or connector-supplied reason string.
		reason: String,
	},
	/// Code is invalid, expired or already used.
	#[error("Authorization code was rejected: {reason}.")]
	InvalidGrant {
		/// Provider- or connector-supplied reason string.
		reason: String,
	},
	/// Client id or secret was not accepted.
	#[error("Client credentials were rejected: {reason}.")]
	InvalidClient {
		/// Provider- or connector-supplied reason string.
		reason: String,
	},
}

/// Settings that cannot be used.
///
/// Raised at startup, except [`ConfigError::HttpRequest`], which surfaces per request when
/// an outbound request cannot be assembled from configured values.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// `.env` file exists but cannot be read or parsed.
	#[error("The .env file is unreadable or malformed.")]
	Dotenv(#[from] dotenvy::Error),
	/// Required environment variable is not set.
	#[error("Environment variable `{name}` is not set.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Credentials document is not valid JSON or misses required fields.
	#[error("Credentials JSON is malformed at `{}`.", .source.path())]
	MalformedCredentials {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Credentials list no redirect URI.
	#[error("Credentials must list at least one redirect URI.")]
	MissingRedirectUri,
	/// A configured URL cannot be parsed.
	#[error("Configured `{field}` is not a valid URL.")]
	InvalidUrl {
		/// Configuration field holding the URL.
		field: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// A numeric setting cannot be parsed.
	#[error("Configured `{field}` must be a number, got `{value}`.")]
	InvalidNumber {
		/// Configuration field holding the number.
		field: &'static str,
		/// Raw value supplied.
		value: String,
	},
	/// A listen address cannot be parsed.
	#[error("Configured `{field}` must be an IP address, got `{value}`.")]
	InvalidAddress {
		/// Configuration field holding the address.
		field: &'static str,
		/// Raw value supplied.
		value: String,
	},
	/// Listing API version string is not recognized.
	#[error("Unsupported analytics API version `{0}`; expected one of v3, v1beta, v1alpha.")]
	UnsupportedApiVersion(String),
	/// A configured scope is empty or contains whitespace.
	#[error("Configured scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Endpoints or delimiter failed validation.
	#[error("Provider endpoints are invalid.")]
	InvalidDescriptor(#[from] crate::provider::ProviderDescriptorError),
	/// The redirect URI was refused by the OAuth client.
	#[error("Redirect URI is not usable.")]
	InvalidRedirect {
		/// Parse failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// reqwest refused the client or request settings.
	#[error("Failed to build the HTTP client.")]
	HttpClientBuild {
		/// Builder failure.
		#[source]
		source: BoxError,
	},
	/// Request assembly failed; can happen per request.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
}
impl ConfigError {
	/// Boxes any builder failure.
	pub fn http_client_build(source: impl 'static + StdError + Send + Sync) -> Self {
		Self::HttpClientBuild { source: Box::new(source) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(source: ReqwestError) -> Self {
		Self::http_client_build(source)
	}
}

/// Unexpected upstream responses; reported once, never retried.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected or unusable response, or the call timed out.
	#[error("Provider returned an unexpected response: {message}.")]
	Upstream {
		/// Provider- or connector-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
	/// Token body is not a token response.
	#[error("Token response is malformed at `{}`.", .source.path())]
	TokenResponseParse {
		/// Parse failure with its JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// Status of the token response.
		status: Option<u16>,
	},
}

/// No HTTP answer was received.
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Connect, TLS or read failure.
	#[error("Could not reach the remote endpoint.")]
	Network {
		/// Transport error.
		#[source]
		source: BoxError,
	},
	/// Socket-level I/O failure.
	#[error("I/O failed while talking to the remote endpoint.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Boxes any transport error.
	pub fn network(source: impl 'static + StdError + Send + Sync) -> Self {
		Self::Network { source: Box::new(source) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(source: ReqwestError) -> Self {
		Self::network(source)
	}
}

/// Failures raised by the account/property listing call.
#[derive(Debug, ThisError)]
pub enum ListingError {
	/// Listing endpoint answered with a non-success status.
	#[error("Listing endpoint returned HTTP {status}: {body_preview}.")]
	Status {
		/// HTTP status code.
		status: u16,
		/// Truncated response body.
		body_preview: String,
	},
	/// Listing endpoint returned JSON that does not match the expected shape.
	#[error("Listing endpoint returned malformed JSON at `{}`.", .source.path())]
	Parse {
		/// Structured parsing failure, including the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
}
