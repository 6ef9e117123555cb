//! Consent URL and code exchange on top of the `oauth2` crate.

pub use oauth2;

// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError, BasicTokenResponse},
};
// self
use crate::{
	_prelude::*,
	auth::{CredentialSet, ScopeSet},
	error::{ConfigError, TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	provider::{
		ClientAuthMethod, ProviderDescriptor, ProviderErrorContext, ProviderErrorKind,
		ProviderStrategy,
	},
};

type ExchangeClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type ExchangeFuture<'a> = Pin<Box<dyn Future<Output = Result<CredentialSet>> + 'a + Send>>;

/// Turns a transport's [`HttpClientError`] into a connector [`Error`].
///
/// `metadata` holds whatever the transport stored before failing.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Maps one failed call.
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Mapper for [`ReqwestHttpClient`]: timeouts are transient, connection failures are
/// transport errors.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<ReqwestError>,
	) -> Error {
		let status = metadata.and_then(|meta| meta.status);

		match error {
			HttpClientError::Reqwest(inner) if inner.is_builder() => ConfigError::from(*inner).into(),
			HttpClientError::Reqwest(inner) if inner.is_timeout() => upstream(
				"request timed out",
				status.or_else(|| inner.status().map(|code| code.as_u16())),
			),
			HttpClientError::Reqwest(inner) => TransportError::from(*inner).into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => upstream(format!("HTTP client error ({other})"), status),
		}
	}
}

/// Configured `oauth2` client bound to one transport.
pub(crate) struct BasicFacade<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: ExchangeClient,
	descriptor: ProviderDescriptor,
	redirect_uri: Url,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn new(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
		redirect_uri: &Url,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let auth_url = AuthUrl::from_url(descriptor.authorization_endpoint.clone());
		let token_url = TokenUrl::from_url(descriptor.token_endpoint.clone());
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url)
			.set_redirect_uri(redirect_url);
		let client = match descriptor.client_auth {
			ClientAuthMethod::ClientSecretPost => client.set_auth_type(AuthType::RequestBody),
			ClientAuthMethod::ClientSecretBasic => client,
		};

		Ok(Self {
			client,
			descriptor: descriptor.clone(),
			redirect_uri: redirect_uri.clone(),
			http_client: http_client.into(),
			error_mapper: error_mapper.into(),
		})
	}

	/// Consent URL: client, redirect target, scopes and, when enabled, offline access.
	pub(crate) fn authorize_url(&self, scope: &ScopeSet) -> Url {
		let mut url = self.descriptor.authorization_endpoint.clone();

		{
			let mut query = url.query_pairs_mut();

			query
				.append_pair("response_type", "code")
				.append_pair("client_id", self.client.client_id().as_str())
				.append_pair("redirect_uri", self.redirect_uri.as_str());

			if let Some(scope) = scope.join(self.descriptor.scope_delimiter) {
				query.append_pair("scope", &scope);
			}
			if self.descriptor.offline_access {
				query.append_pair("access_type", "offline");
			}
		}

		url
	}

	/// Exchanges `code` once; rejections are classified by `strategy`.
	pub(crate) fn exchange_code<'a>(
		&'a self,
		strategy: &'a dyn ProviderStrategy,
		code: &'a str,
	) -> ExchangeFuture<'a> {
		Box::pin(async move {
			let slot = ResponseMetadataSlot::default();
			let handle = self.http_client.with_metadata(slot.clone());
			let outcome = self
				.client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.request_async(&handle)
				.await;

			match outcome {
				Ok(token) => credentials_from(token),
				Err(error) => Err(self.exchange_error(strategy, slot.take(), error)),
			}
		})
	}

	fn exchange_error(
		&self,
		strategy: &dyn ProviderStrategy,
		metadata: Option<ResponseMetadata>,
		error: BasicRequestTokenError<HttpClientError<C::TransportError>>,
	) -> Error {
		let status = metadata.as_ref().and_then(|meta| meta.status);

		match error {
			RequestTokenError::ServerResponse(response) =>
				classify_rejection(strategy, &response, status),
			RequestTokenError::Request(error) =>
				self.error_mapper.map_transport_error(metadata.as_ref(), error),
			RequestTokenError::Parse(source, _) =>
				TransientError::TokenResponseParse { source, status }.into(),
			RequestTokenError::Other(message) =>
				upstream(format!("token endpoint answered unexpectedly ({message})"), status),
		}
	}
}

fn credentials_from(token: BasicTokenResponse) -> Result<CredentialSet> {
	let mut credentials = CredentialSet::new(token.access_token().secret().as_str());

	if let Some(expires_in) = token.expires_in() {
		let secs = i64::try_from(expires_in.as_secs())
			.map_err(|_| upstream("token expires_in exceeds the supported range", None))?;

		if secs <= 0 {
			return Err(upstream("token expires_in must be positive", None));
		}

		credentials = credentials.with_expires_in(Duration::seconds(secs));
	}
	if token.refresh_token().is_some() {
		credentials = credentials.with_refresh_token_issued();
	}
	if let Some(scopes) = token.scopes() {
		let granted = ScopeSet::new(scopes.iter().map(|scope| scope.as_str()))
			.map_err(|e| upstream(format!("token carries invalid scopes ({e})"), None))?;

		credentials = credentials.with_granted_scope(granted);
	}

	Ok(credentials)
}

fn classify_rejection(
	strategy: &dyn ProviderStrategy,
	response: &BasicErrorResponse,
	status: Option<u16>,
) -> Error {
	let code = response.error().as_ref().to_owned();
	let ctx = ProviderErrorContext {
		http_status: status,
		oauth_error: Some(code.clone()),
		error_description: response.error_description().cloned(),
	};
	let reason = match response.error_description() {
		Some(description) => format!("{code}: {description}"),
		None => code,
	};

	match strategy.classify_token_error(&ctx) {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason },
		ProviderErrorKind::InsufficientScope => Error::InsufficientScope { reason },
		ProviderErrorKind::Transient =>
			upstream(format!("token endpoint rejected the exchange ({reason})"), status),
	}
}

fn upstream(message: impl Into<String>, status: Option<u16>) -> Error {
	TransientError::Upstream { message: message.into(), status }.into()
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn descriptor(method: ClientAuthMethod, offline_access: bool) -> ProviderDescriptor {
		ProviderDescriptor::builder("test-provider")
			.authorization_endpoint(
				Url::parse("https://example.com/oauth2/authorize")
					.expect("Authorization endpoint should parse."),
			)
			.token_endpoint(
				Url::parse("https://example.com/oauth2/token")
					.expect("Token endpoint should parse."),
			)
			.client_auth(method)
			.offline_access(offline_access)
			.build()
			.expect("Descriptor should validate.")
	}

	fn facade(descriptor: &ProviderDescriptor) -> BasicFacade {
		let redirect =
			Url::parse("https://app.example.com/callback").expect("Redirect URI should parse.");

		BasicFacade::new(
			descriptor,
			"client-id",
			"secret",
			&redirect,
			ReqwestHttpClient::default(),
			ReqwestTransportErrorMapper,
		)
		.expect("Facade should build from a valid descriptor.")
	}

	fn token(json: &str) -> BasicTokenResponse {
		serde_json::from_str(json).expect("Token response fixture should parse.")
	}

	#[test]
	fn authorize_url_carries_client_redirect_and_scopes() {
		let descriptor = descriptor(ClientAuthMethod::ClientSecretPost, true);
		let scope = ScopeSet::new(["email", "https://www.googleapis.com/auth/analytics.readonly"])
			.expect("Scope fixture should be valid.");
		let url = facade(&descriptor).authorize_url(&scope);
		let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

		assert_eq!(url.path(), "/oauth2/authorize");
		assert_eq!(pairs, vec![
			("response_type".into(), "code".into()),
			("client_id".into(), "client-id".into()),
			("redirect_uri".into(), "https://app.example.com/callback".into()),
			(
				"scope".into(),
				"email https://www.googleapis.com/auth/analytics.readonly".into()
			),
			("access_type".into(), "offline".into()),
		]);
		assert!(url.as_str().contains("redirect_uri=https%3A%2F%2Fapp.example.com%2Fcallback"));
	}

	#[test]
	fn authorize_url_skips_offline_access_when_disabled() {
		let descriptor = descriptor(ClientAuthMethod::ClientSecretBasic, false);
		let url = facade(&descriptor).authorize_url(&ScopeSet::default());

		assert!(url.query_pairs().all(|(key, _)| key != "access_type" && key != "scope"));
	}

	#[test]
	fn token_response_maps_into_credentials() {
		let credentials = credentials_from(token(
			r#"{"access_token":"at","refresh_token":"rt","token_type":"Bearer","expires_in":3599,"scope":"openid email"}"#,
		))
		.expect("Mapping should succeed.");

		assert_eq!(credentials.bearer(), "Bearer at");
		assert!(credentials.refresh_token_issued);
		assert!(credentials.expires_at.is_some());
		assert!(credentials.granted_scope.is_some_and(|scope| scope.contains("email")));
	}

	#[test]
	fn zero_expires_in_is_a_per_request_upstream_error() {
		let err = credentials_from(token(
			r#"{"access_token":"at","token_type":"bearer","expires_in":0}"#,
		))
		.expect_err("Zero lifetimes must be rejected.");

		assert!(matches!(
			err,
			Error::Transient(TransientError::Upstream { status: None, ref message })
				if message.contains("expires_in must be positive")
		));
	}
}
