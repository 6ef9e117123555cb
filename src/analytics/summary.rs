/// One property, tagged with the account it was listed under.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertySummary {
	/// Identifier of the owning account as returned by the API.
	pub account_id: String,
	/// Display name of the owning account.
	pub account_name: String,
	/// Property identifier (e.g. `UA-1234-1` or `properties/1234`).
	pub id: String,
	/// Property display name.
	pub name: String,
}

/// Flattened first page of one listing call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AccountListing {
	/// Accounts returned, including those without properties.
	pub accounts: usize,
	/// Properties across all accounts, in provider order.
	pub properties: Vec<PropertySummary>,
}
impl AccountListing {
	/// Returns `true` when the API returned no account at all.
	pub fn has_no_accounts(&self) -> bool {
		self.accounts == 0
	}
}
