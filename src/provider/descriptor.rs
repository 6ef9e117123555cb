//! OAuth provider endpoints and the knobs that shape the consent URL.

// self
use crate::_prelude::*;

const GOOGLE_AUTHORIZATION_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";

/// Descriptor validation failures.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ProviderDescriptorError {
	/// A required endpoint was never set.
	#[error("The {endpoint} endpoint is required.")]
	MissingEndpoint {
		/// `authorization` or `token`.
		endpoint: &'static str,
	},
	/// A built-in endpoint literal failed to parse.
	#[error("The {endpoint} endpoint `{url}` is not a URL.")]
	UnparsableEndpoint {
		/// `authorization` or `token`.
		endpoint: &'static str,
		/// Offending literal.
		url: String,
	},
	/// Plain HTTP is only accepted for loopback hosts.
	#[error("The {endpoint} endpoint `{url}` must use HTTPS.")]
	InsecureEndpoint {
		/// `authorization` or `token`.
		endpoint: &'static str,
		/// Offending URL.
		url: String,
	},
	/// Control characters cannot separate scopes.
	#[error("Scope delimiter {delimiter:?} is a control character.")]
	InvalidScopeDelimiter {
		/// Rejected delimiter.
		delimiter: char,
	},
}

/// How the client authenticates at the token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClientAuthMethod {
	/// `Authorization: Basic` header.
	#[default]
	ClientSecretBasic,
	/// `client_id` and `client_secret` in the form body.
	ClientSecretPost,
}

/// Validated provider endpoints plus consent URL options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderDescriptor {
	/// Name used in logs.
	pub id: String,
	/// Consent page.
	pub authorization_endpoint: Url,
	/// Code exchange endpoint.
	pub token_endpoint: Url,
	/// Token endpoint authentication.
	pub client_auth: ClientAuthMethod,
	/// Adds `access_type=offline` so a refresh token is issued.
	pub offline_access: bool,
	/// Separator placed between scopes in the `scope` parameter.
	pub scope_delimiter: char,
}
impl ProviderDescriptor {
	/// Starts a descriptor named `id`.
	pub fn builder(id: impl Into<String>) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder {
			id: id.into(),
			authorization_endpoint: None,
			token_endpoint: None,
			client_auth: ClientAuthMethod::default(),
			offline_access: false,
			scope_delimiter: ' ',
		}
	}

	/// Google's endpoints, form-body client auth and offline access.
	pub fn google() -> Result<Self, ProviderDescriptorError> {
		let endpoint = |endpoint, raw: &str| {
			Url::parse(raw).map_err(|_| ProviderDescriptorError::UnparsableEndpoint {
				endpoint,
				url: raw.to_owned(),
			})
		};

		Self::builder("google")
			.authorization_endpoint(endpoint("authorization", GOOGLE_AUTHORIZATION_ENDPOINT)?)
			.token_endpoint(endpoint("token", GOOGLE_TOKEN_ENDPOINT)?)
			.client_auth(ClientAuthMethod::ClientSecretPost)
			.offline_access(true)
			.build()
	}
}

/// Collects descriptor fields; [`ProviderDescriptorBuilder::build`] validates them.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	id: String,
	authorization_endpoint: Option<Url>,
	token_endpoint: Option<Url>,
	client_auth: ClientAuthMethod,
	offline_access: bool,
	scope_delimiter: char,
}
impl ProviderDescriptorBuilder {
	/// Sets the consent page.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the code exchange endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Picks header or form-body client authentication.
	pub fn client_auth(mut self, method: ClientAuthMethod) -> Self {
		self.client_auth = method;

		self
	}

	/// Toggles `access_type=offline`.
	pub fn offline_access(mut self, enabled: bool) -> Self {
		self.offline_access = enabled;

		self
	}

	/// Overrides the space used between scopes.
	pub fn scope_delimiter(mut self, delimiter: char) -> Self {
		self.scope_delimiter = delimiter;

		self
	}

	/// Checks both endpoints and the delimiter.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization_endpoint = require("authorization", self.authorization_endpoint)?;
		let token_endpoint = require("token", self.token_endpoint)?;

		if self.scope_delimiter.is_control() {
			return Err(ProviderDescriptorError::InvalidScopeDelimiter {
				delimiter: self.scope_delimiter,
			});
		}

		Ok(ProviderDescriptor {
			id: self.id,
			authorization_endpoint,
			token_endpoint,
			client_auth: self.client_auth,
			offline_access: self.offline_access,
			scope_delimiter: self.scope_delimiter,
		})
	}
}

fn require(endpoint: &'static str, url: Option<Url>) -> Result<Url, ProviderDescriptorError> {
	let url = url.ok_or(ProviderDescriptorError::MissingEndpoint { endpoint })?;
	let loopback = match url.host() {
		Some(url::Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(url::Host::Ipv4(addr)) => addr.is_loopback(),
		Some(url::Host::Ipv6(addr)) => addr.is_loopback(),
		None => false,
	};

	match url.scheme() {
		"https" => Ok(url),
		"http" if loopback => Ok(url),
		_ => Err(ProviderDescriptorError::InsecureEndpoint { endpoint, url: url.into() }),
	}
}
