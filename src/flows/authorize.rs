//! Consent URL construction.

// self
use crate::{
	_prelude::*,
	flows::Connector,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> Connector<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the provider consent URL.
	///
	/// The URL depends only on configuration, so repeated calls return identical values.
	pub fn authorization_url(&self) -> Url {
		const KIND: FlowKind = FlowKind::Authorize;

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let url = FlowSpan::new(KIND, "authorization_url")
			.in_scope(|| self.facade.authorize_url(&self.scope));

		obs::record_flow_outcome(KIND, FlowOutcome::Success);

		url
	}
}
