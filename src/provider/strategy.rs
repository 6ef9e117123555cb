//! Classification of token endpoint rejections.

// self
use crate::_prelude::*;

const OAUTH_ERROR_CODES: [(&str, ProviderErrorKind); 8] = [
	("invalid_grant", ProviderErrorKind::InvalidGrant),
	("access_denied", ProviderErrorKind::InvalidGrant),
	("invalid_client", ProviderErrorKind::InvalidClient),
	("unauthorized_client", ProviderErrorKind::InvalidClient),
	("invalid_scope", ProviderErrorKind::InsufficientScope),
	("insufficient_scope", ProviderErrorKind::InsufficientScope),
	("temporarily_unavailable", ProviderErrorKind::Transient),
	("server_error", ProviderErrorKind::Transient),
];

/// Maps an OAuth error response onto [`ProviderErrorKind`].
///
/// Only error responses reach a strategy. Transport failures are handled by the
/// transport error mapper.
pub trait ProviderStrategy: Send + Sync {
	/// Classifies one rejected code exchange.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;
}

/// How a rejected exchange is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// The code is bad, expired, already used, or consent was denied.
	InvalidGrant,
	/// The client id or secret was not accepted.
	InvalidClient,
	/// The requested scopes were refused.
	InsufficientScope,
	/// Anything else; reported once and never retried.
	Transient,
}

/// Fields of a token endpoint error response.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// HTTP status, when the transport recorded one.
	pub http_status: Option<u16>,
	/// OAuth `error` code.
	pub oauth_error: Option<String>,
	/// OAuth `error_description`.
	pub error_description: Option<String>,
}

/// Looks up the `error` code, then codes mentioned in `error_description`, then the status.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		let code = ctx.oauth_error.as_deref().and_then(|code| {
			OAUTH_ERROR_CODES
				.iter()
				.find(|(known, _)| code.eq_ignore_ascii_case(known))
				.map(|(_, kind)| *kind)
		});
		let mentioned = || {
			let description = ctx.error_description.as_deref()?.to_ascii_lowercase();

			OAUTH_ERROR_CODES
				.iter()
				.find(|(known, _)| description.contains(known))
				.map(|(_, kind)| *kind)
		};

		code.or_else(mentioned).unwrap_or(match ctx.http_status {
			Some(400 | 404 | 410) => ProviderErrorKind::InvalidGrant,
			Some(401) => ProviderErrorKind::InvalidClient,
			Some(403) => ProviderErrorKind::InsufficientScope,
			_ => ProviderErrorKind::Transient,
		})
	}
}
