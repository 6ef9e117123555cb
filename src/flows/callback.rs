//! Code exchange followed by the single listing call.

// self
use crate::{
	_prelude::*,
	analytics::{self, AccountListing},
	flows::Connector,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Step of the callback flow that failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowStage {
	/// Exchanging the authorization code at the token endpoint.
	CodeExchange,
	/// Calling the account/property listing endpoint.
	PropertyListing,
}
impl FlowStage {
	/// Returns a stable label suitable for span or log fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowStage::CodeExchange => "code_exchange",
			FlowStage::PropertyListing => "property_listing",
		}
	}
}
impl Display for FlowStage {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Callback failure tagged with the stage that produced it.
#[derive(Debug, ThisError)]
#[error("Callback failed during {stage}: {error}")]
pub struct FlowFailure {
	/// Failing stage.
	pub stage: FlowStage,
	/// Underlying error.
	#[source]
	pub error: Error,
}
impl FlowFailure {
	fn at(stage: FlowStage) -> impl FnOnce(Error) -> Self {
		move |error| Self { stage, error }
	}
}

impl<C, M> Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges `code` for credentials, then lists the account's properties once.
	///
	/// An empty `code` is still sent so the provider's rejection drives the failure.
	/// The credentials live only for the listing call.
	pub async fn complete_callback(
		&self,
		code: &str,
	) -> Result<AccountListing, FlowFailure> {
		const KIND: FlowKind = FlowKind::Callback;

		let span = FlowSpan::new(KIND, "complete_callback");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.in_span(async move {
				let credentials = FlowSpan::new(KIND, FlowStage::CodeExchange.as_str())
					.in_span(self.facade.exchange_code(self.strategy.as_ref(), code))
					.await
					.map_err(FlowFailure::at(FlowStage::CodeExchange))?;

				tracing::debug!(
					expires_at = ?credentials.expires_at,
					refresh_token_issued = credentials.refresh_token_issued,
					"Exchanged authorization code."
				);

				FlowSpan::new(KIND, FlowStage::PropertyListing.as_str())
					.in_span(analytics::list_properties(
						self.http_client.as_ref(),
						self.transport_mapper.as_ref(),
						self.listing.as_ref(),
						&credentials,
					))
					.await
					.map_err(FlowFailure::at(FlowStage::PropertyListing))
			})
			.await;

		obs::record_flow_outcome(KIND, FlowOutcome::of(&result));

		result
	}
}
