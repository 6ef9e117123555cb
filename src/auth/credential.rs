//! Request-scoped credential set returned by the code exchange.

// self
use crate::{_prelude::*, auth::ScopeSet};

/// Access token issued for one callback.
///
/// The set lives only for the listing call that follows the exchange and is dropped with
/// the request. A refresh token is only noted, never kept.
#[derive(Clone)]
pub struct CredentialSet {
	access_token: String,
	/// Whether the provider issued a refresh token (offline access was granted).
	pub refresh_token_issued: bool,
	/// Instant the exchange completed.
	pub issued_at: OffsetDateTime,
	/// Expiry derived from `expires_in`, when the provider reported one.
	pub expires_at: Option<OffsetDateTime>,
	/// Scopes echoed back by the provider, if any.
	pub granted_scope: Option<ScopeSet>,
}
impl CredentialSet {
	/// Creates a set holding only an access token issued now.
	pub fn new(access_token: impl Into<String>) -> Self {
		Self {
			access_token: access_token.into(),
			refresh_token_issued: false,
			issued_at: OffsetDateTime::now_utc(),
			expires_at: None,
			granted_scope: None,
		}
	}

	/// Notes that a refresh token came back with the access token.
	pub fn with_refresh_token_issued(mut self) -> Self {
		self.refresh_token_issued = true;

		self
	}

	/// Sets the expiry relative to the issue instant.
	pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
		self.expires_at = Some(self.issued_at + expires_in);

		self
	}

	/// Records the scopes the provider reported as granted.
	pub fn with_granted_scope(mut self, scope: ScopeSet) -> Self {
		self.granted_scope = Some(scope);

		self
	}

	/// Value for the `Authorization` header of API calls.
	pub fn bearer(&self) -> String {
		format!("Bearer {}", self.access_token)
	}
}
impl Debug for CredentialSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("CredentialSet")
			.field("access_token", &"<redacted>")
			.field("refresh_token_issued", &self.refresh_token_issued)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.field("granted_scope", &self.granted_scope)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn expiry_is_relative_to_issue_instant() {
		let set = CredentialSet::new("access").with_expires_in(Duration::seconds(60));
		let expires_at = set.expires_at.expect("Expiry should be populated.");

		assert_eq!(expires_at - set.issued_at, Duration::seconds(60));
		assert!(CredentialSet::new("access").expires_at.is_none());
	}

	#[test]
	fn debug_output_hides_the_access_token() {
		let set = CredentialSet::new("access-secret").with_refresh_token_issued();
		let rendered = format!("{set:?}");

		assert!(!rendered.contains("access-secret"));
		assert!(rendered.contains("<redacted>"));
		assert!(rendered.contains("refresh_token_issued: true"));
		assert_eq!(set.bearer(), "Bearer access-secret");
	}
}
