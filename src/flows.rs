//! Flow orchestrators behind the two HTTP entry points.

pub mod authorize;
pub mod callback;

pub use callback::*;

// self
use crate::{
	_prelude::*,
	analytics::ListingAdapter,
	auth::ScopeSet,
	config::Config,
	http::{ReqwestHttpClient, TokenHttpClient},
	oauth::{BasicFacade, ReqwestTransportErrorMapper, TransportErrorMapper},
	provider::{DefaultProviderStrategy, ProviderStrategy},
};

/// Connector specialized for the crate's default reqwest transport stack.
pub type ReqwestConnector = Connector<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Runs the consent redirect and callback flows against one provider and listing API.
///
/// The connector is built once from [`Config`] and shared by every request; it holds no
/// mutable state, so concurrent callbacks never observe each other.
pub struct Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Strategy classifying token endpoint failures.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Listing adapter for the configured API revision.
	pub listing: Arc<dyn ListingAdapter>,
	scope: ScopeSet,
	provider_id: String,
	facade: Arc<BasicFacade<C, M>>,
}
impl<C, M> Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a connector that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: &Config,
		strategy: Arc<dyn ProviderStrategy>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let http_client = http_client.into();
		let transport_mapper = mapper.into();
		let facade: BasicFacade<C, M> = BasicFacade::new(
			&config.descriptor,
			&config.credentials.client_id,
			&config.credentials.client_secret,
			&config.redirect_uri,
			http_client.clone(),
			transport_mapper.clone(),
		)?;

		Ok(Self {
			http_client,
			transport_mapper,
			strategy,
			listing: config.listing_api.adapter()?,
			scope: config.scope.clone(),
			provider_id: config.descriptor.id.clone(),
			facade: Arc::new(facade),
		})
	}

	/// Scopes requested at consent.
	pub fn scope(&self) -> &ScopeSet {
		&self.scope
	}
}
impl Connector<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a connector with its own reqwest transport, bounded by `config.timeout`.
	pub fn new(config: &Config) -> Result<Self> {
		Self::with_http_client(
			config,
			Arc::new(DefaultProviderStrategy),
			ReqwestHttpClient::build(config.timeout)?,
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: self.http_client.clone(),
			transport_mapper: self.transport_mapper.clone(),
			strategy: self.strategy.clone(),
			listing: self.listing.clone(),
			scope: self.scope.clone(),
			provider_id: self.provider_id.clone(),
			facade: self.facade.clone(),
		}
	}
}
impl<C, M> Debug for Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Connector")
			.field("provider", &self.provider_id)
			.field("scope", &self.scope)
			.field("listing", &self.listing.label())
			.finish()
	}
}
