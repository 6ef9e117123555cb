//! Process-wide configuration, resolved once at startup.
//!
//! [`Config`] is immutable after [`ConfigBuilder::build`]; handlers receive it through the
//! connector they are constructed with and never consult the environment themselves.

// std
use std::{
	net::{IpAddr, Ipv4Addr, SocketAddr},
	time::Duration as StdDuration,
};
// self
use crate::{
	_prelude::*,
	analytics::{ApiVersion, ListingApi},
	auth::ScopeSet,
	error::ConfigError,
	provider::ProviderDescriptor,
};

/// Scope requested when `OAUTH_SCOPES` is unset.
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/analytics.readonly";
/// Port used when `PORT` is unset.
pub const DEFAULT_PORT: u16 = 3000;
/// Address used when `BIND_ADDRESS` is unset.
pub const DEFAULT_BIND_ADDRESS: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

const ENV_CREDENTIALS: &str = "GOOGLE_CREDENTIALS";
const ENV_PORT: &str = "PORT";
const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";
const ENV_API_VERSION: &str = "ANALYTICS_API_VERSION";
const ENV_API_BASE: &str = "ANALYTICS_API_BASE";
const ENV_SCOPES: &str = "OAUTH_SCOPES";
const ENV_TIMEOUT: &str = "HTTP_TIMEOUT_SECS";

/// Loads a `.env` file into the process environment when one exists.
///
/// A missing file is fine; an unreadable or malformed one aborts startup.
pub fn load_dotenv() -> Result<(), ConfigError> {
	accept_missing_dotenv(dotenvy::dotenv().map(drop))
}

fn accept_missing_dotenv(result: dotenvy::Result<()>) -> Result<(), ConfigError> {
	match result {
		Err(e) if e.not_found() => Ok(()),
		other => other.map_err(ConfigError::from),
	}
}

/// OAuth client registration as issued by the Google console.
#[derive(Clone, Deserialize)]
pub struct ClientCredentials {
	/// Public client identifier.
	pub client_id: String,
	/// Confidential client secret.
	pub client_secret: String,
	/// Registered redirect targets; the first one is used at runtime.
	#[serde(default)]
	pub redirect_uris: Vec<String>,
}
impl Debug for ClientCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ClientCredentials")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("redirect_uris", &self.redirect_uris)
			.finish()
	}
}

/// Shape of the downloaded `client_secret_*.json` document.
#[derive(Debug, Deserialize)]
pub struct CredentialsFile {
	/// Web-application client section.
	pub web: ClientCredentials,
}
impl CredentialsFile {
	/// Parses the credentials document, reporting the JSON path of any mismatch.
	pub fn parse(raw: &str) -> Result<Self, ConfigError> {
		let mut de = serde_json::Deserializer::from_str(raw);

		serde_path_to_error::deserialize(&mut de)
			.map_err(|source| ConfigError::MalformedCredentials { source })
	}
}

/// Immutable runtime configuration shared by both handlers.
#[derive(Clone, Debug)]
pub struct Config {
	/// Client registration.
	pub credentials: ClientCredentials,
	/// Redirect target sent with the consent URL and the code exchange.
	pub redirect_uri: Url,
	/// Scopes requested at consent.
	pub scope: ScopeSet,
	/// Authorization server description.
	pub descriptor: ProviderDescriptor,
	/// Listing API revision and root.
	pub listing_api: ListingApi,
	/// Listen port.
	pub port: u16,
	/// Listen address.
	pub bind_address: IpAddr,
	/// Per-request bound for outbound calls; `None` keeps the HTTP client's default.
	pub timeout: Option<StdDuration>,
}
impl Config {
	/// Starts a builder seeded with Google defaults.
	pub fn builder(credentials: ClientCredentials) -> ConfigBuilder {
		ConfigBuilder::new(credentials)
	}

	/// Reads configuration from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Reads configuration through `lookup`; blank values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
		let raw = var(ENV_CREDENTIALS).ok_or(ConfigError::MissingVar { name: ENV_CREDENTIALS })?;
		let CredentialsFile { web } = CredentialsFile::parse(&raw)?;
		let mut builder =
			Self::builder(web).descriptor(ProviderDescriptor::google().map_err(ConfigError::from)?);

		if let Some(port) = var(ENV_PORT) {
			builder = builder.port(
				port.trim()
					.parse()
					.map_err(|_| ConfigError::InvalidNumber { field: ENV_PORT, value: port })?,
			);
		}
		if let Some(address) = var(ENV_BIND_ADDRESS) {
			builder = builder.bind_address(address.trim().parse().map_err(|_| {
				ConfigError::InvalidAddress { field: ENV_BIND_ADDRESS, value: address }
			})?);
		}
		if let Some(scopes) = var(ENV_SCOPES) {
			builder = builder
				.scope(ScopeSet::new(scopes.split_whitespace()).map_err(ConfigError::from)?);
		}
		if let Some(timeout) = var(ENV_TIMEOUT) {
			let secs = timeout
				.trim()
				.parse::<u64>()
				.ok()
				.filter(|secs| *secs > 0)
				.ok_or(ConfigError::InvalidNumber { field: ENV_TIMEOUT, value: timeout })?;

			builder = builder.timeout(StdDuration::from_secs(secs));
		}

		let version = match var(ENV_API_VERSION) {
			Some(version) => ApiVersion::from_str(&version)?,
			None => ApiVersion::default(),
		};
		let listing_api = match var(ENV_API_BASE) {
			Some(base) => ListingApi::new(
				version,
				Url::parse(base.trim())
					.map_err(|source| ConfigError::InvalidUrl { field: ENV_API_BASE, source })?,
			),
			None => ListingApi::google(version)?,
		};

		builder.listing_api(listing_api).build()
	}

	/// Socket address the server listens on.
	pub fn socket_addr(&self) -> SocketAddr {
		SocketAddr::new(self.bind_address, self.port)
	}
}

/// Builder for [`Config`]; unset parts fall back to Google defaults.
#[derive(Debug)]
pub struct ConfigBuilder {
	credentials: ClientCredentials,
	descriptor: Option<ProviderDescriptor>,
	scope: Option<ScopeSet>,
	listing_api: Option<ListingApi>,
	port: u16,
	bind_address: IpAddr,
	timeout: Option<StdDuration>,
}
impl ConfigBuilder {
	fn new(credentials: ClientCredentials) -> Self {
		Self {
			credentials,
			descriptor: None,
			scope: None,
			listing_api: None,
			port: DEFAULT_PORT,
			bind_address: DEFAULT_BIND_ADDRESS,
			timeout: None,
		}
	}

	/// Overrides the provider descriptor.
	pub fn descriptor(mut self, descriptor: ProviderDescriptor) -> Self {
		self.descriptor = Some(descriptor);

		self
	}

	/// Overrides the requested scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = Some(scope);

		self
	}

	/// Overrides the listing API.
	pub fn listing_api(mut self, listing_api: ListingApi) -> Self {
		self.listing_api = Some(listing_api);

		self
	}

	/// Sets the listen port.
	pub fn port(mut self, port: u16) -> Self {
		self.port = port;

		self
	}

	/// Sets the listen address.
	pub fn bind_address(mut self, bind_address: IpAddr) -> Self {
		self.bind_address = bind_address;

		self
	}

	/// Bounds every outbound request.
	pub fn timeout(mut self, timeout: StdDuration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Validates the redirect target and fills in defaults.
	pub fn build(self) -> Result<Config> {
		let raw_redirect =
			self.credentials.redirect_uris.first().ok_or(ConfigError::MissingRedirectUri)?;
		let redirect_uri = Url::parse(raw_redirect)
			.map_err(|source| ConfigError::InvalidUrl { field: "redirect_uris", source })?;
		let descriptor = match self.descriptor {
			Some(descriptor) => descriptor,
			None => ProviderDescriptor::google().map_err(ConfigError::from)?,
		};
		let scope = match self.scope {
			Some(scope) => scope,
			None => ScopeSet::new([DEFAULT_SCOPE]).map_err(ConfigError::from)?,
		};
		let listing_api = match self.listing_api {
			Some(listing_api) => listing_api,
			None => ListingApi::google(ApiVersion::default())?,
		};

		Ok(Config {
			credentials: self.credentials,
			redirect_uri,
			scope,
			descriptor,
			listing_api,
			port: self.port,
			bind_address: self.bind_address,
			timeout: self.timeout,
		})
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::collections::HashMap;
	// self
	use super::*;

	const CREDENTIALS: &str = r#"{"web":{"client_id":"id.apps.googleusercontent.com","client_secret":"shh","redirect_uris":["http://localhost:3000/oauth2callback","https://example.com/cb"]}}"#;

	fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let vars: HashMap<String, String> =
			vars.iter().map(|(key, value)| ((*key).to_owned(), (*value).to_owned())).collect();

		move |name| vars.get(name).cloned()
	}

	#[test]
	fn defaults_apply_when_only_credentials_are_set() {
		let config = Config::from_lookup(lookup(&[(ENV_CREDENTIALS, CREDENTIALS)]))
			.expect("Minimal environment should load.");

		assert_eq!(config.port, 3000);
		assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
		assert_eq!(config.redirect_uri.as_str(), "http://localhost:3000/oauth2callback");
		assert!(config.scope.contains(DEFAULT_SCOPE));
		assert_eq!(config.listing_api.version, ApiVersion::AdminV1Beta);
		assert_eq!(config.descriptor.id, "google");
		assert!(config.timeout.is_none());
	}

	#[test]
	fn overrides_are_honored_and_blank_values_ignored() {
		let config = Config::from_lookup(lookup(&[
			(ENV_CREDENTIALS, CREDENTIALS),
			(ENV_PORT, "8080"),
			(ENV_BIND_ADDRESS, "127.0.0.1"),
			(ENV_API_VERSION, "v3"),
			(ENV_API_BASE, "http://127.0.0.1:9999/"),
			(ENV_SCOPES, "email  https://www.googleapis.com/auth/analytics.readonly"),
			(ENV_TIMEOUT, "  "),
		]))
		.expect("Overridden environment should load.");

		assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
		assert_eq!(config.listing_api.version, ApiVersion::ManagementV3);
		assert_eq!(config.listing_api.base.as_str(), "http://127.0.0.1:9999/");
		assert_eq!(config.scope.len(), 2);
		assert!(config.timeout.is_none());
	}

	#[test]
	fn missing_credentials_are_reported_by_name() {
		let err = Config::from_lookup(lookup(&[])).expect_err("Credentials are required.");

		assert_eq!(err.to_string(), "Environment variable `GOOGLE_CREDENTIALS` is not set.");
	}

	#[test]
	fn invalid_values_are_rejected() {
		let port =
			Config::from_lookup(lookup(&[(ENV_CREDENTIALS, CREDENTIALS), (ENV_PORT, "http")]))
				.expect_err("Non-numeric port must fail.");
		let timeout =
			Config::from_lookup(lookup(&[(ENV_CREDENTIALS, CREDENTIALS), (ENV_TIMEOUT, "0")]))
				.expect_err("Zero timeout must fail.");
		let version =
			Config::from_lookup(lookup(&[(ENV_CREDENTIALS, CREDENTIALS), (ENV_API_VERSION, "v2")]))
				.expect_err("Unknown API version must fail.");

		assert!(matches!(port, Error::Config(ConfigError::InvalidNumber { field: "PORT", .. })));
		assert!(matches!(
			timeout,
			Error::Config(ConfigError::InvalidNumber { field: "HTTP_TIMEOUT_SECS", .. })
		));
		assert!(matches!(version, Error::Config(ConfigError::UnsupportedApiVersion(_))));
	}

	#[test]
	fn missing_dotenv_is_ignored_but_malformed_one_is_not() {
		let dir = std::env::temp_dir();
		let missing = dir.join(format!("analytics-connect-missing-{}.env", std::process::id()));

		assert!(accept_missing_dotenv(dotenvy::from_path(&missing)).is_ok());

		let malformed = dir.join(format!("analytics-connect-malformed-{}.env", std::process::id()));

		std::fs::write(&malformed, "not a valid line\n").expect("Fixture file should write.");

		let result = accept_missing_dotenv(dotenvy::from_path(&malformed));

		std::fs::remove_file(&malformed).expect("Fixture file should be removable.");

		assert!(matches!(result, Err(ConfigError::Dotenv(_))));
	}

	#[test]
	fn empty_redirect_list_is_rejected() {
		let raw = r#"{"web":{"client_id":"id","client_secret":"s","redirect_uris":[]}}"#;
		let err = Config::from_lookup(lookup(&[(ENV_CREDENTIALS, raw)]))
			.expect_err("A redirect target is required.");

		assert!(matches!(err, Error::Config(ConfigError::MissingRedirectUri)));
	}

	#[test]
	fn client_secret_is_redacted_in_debug() {
		let CredentialsFile { web } = CredentialsFile::parse(CREDENTIALS).expect("Fixture parses.");
		let rendered = format!("{web:?}");

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("shh"));
	}
}
