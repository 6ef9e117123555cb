//! Response-shape adapters for each listing API revision.

// crates.io
use serde::de::DeserializeOwned;
// self
use crate::{
	_prelude::*,
	analytics::{AccountListing, PropertySummary},
	error::{ConfigError, ListingError},
};

const MANAGEMENT_BASE: &str = "https://www.googleapis.com/";
const ADMIN_BASE: &str = "https://analyticsadmin.googleapis.com/";

/// Knows one listing API revision: where to call and how to flatten what comes back.
///
/// Implementations must preserve provider order: accounts as returned, then each
/// account's properties as returned.
pub trait ListingAdapter: Send + Sync {
	/// Short label used in logs (e.g. `v1beta`).
	fn label(&self) -> &'static str;

	/// Fully-qualified listing endpoint.
	fn endpoint(&self) -> &Url;

	/// Parses a successful response body into the flattened listing.
	fn flatten(&self, body: &[u8]) -> Result<AccountListing, ListingError>;
}

/// Listing API revisions understood out of the box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ApiVersion {
	/// Management API v3 (`accountSummaries` with `webProperties`).
	ManagementV3,
	/// Admin API v1beta (`accountSummaries` with `propertySummaries`).
	#[default]
	AdminV1Beta,
	/// Admin API v1alpha; same shape as v1beta.
	AdminV1Alpha,
}
impl ApiVersion {
	/// Returns the configuration label for the revision.
	pub const fn as_str(self) -> &'static str {
		match self {
			ApiVersion::ManagementV3 => "v3",
			ApiVersion::AdminV1Beta => "v1beta",
			ApiVersion::AdminV1Alpha => "v1alpha",
		}
	}

	fn default_base(self) -> &'static str {
		match self {
			ApiVersion::ManagementV3 => MANAGEMENT_BASE,
			ApiVersion::AdminV1Beta | ApiVersion::AdminV1Alpha => ADMIN_BASE,
		}
	}
}
impl Display for ApiVersion {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
impl FromStr for ApiVersion {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"v3" => Ok(ApiVersion::ManagementV3),
			"v1beta" => Ok(ApiVersion::AdminV1Beta),
			"v1alpha" => Ok(ApiVersion::AdminV1Alpha),
			_ => Err(ConfigError::UnsupportedApiVersion(s.to_owned())),
		}
	}
}

/// Selected listing revision plus the API root it is served from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingApi {
	/// API revision.
	pub version: ApiVersion,
	/// API root; the revision's path is joined onto it.
	pub base: Url,
}
impl ListingApi {
	/// Creates a listing API rooted at `base`.
	pub fn new(version: ApiVersion, base: Url) -> Self {
		Self { version, base }
	}

	/// Creates a listing API rooted at Google's public host for `version`.
	pub fn google(version: ApiVersion) -> Result<Self, ConfigError> {
		let base = Url::parse(version.default_base())
			.map_err(|source| ConfigError::InvalidUrl { field: "ANALYTICS_API_BASE", source })?;

		Ok(Self::new(version, base))
	}

	/// Builds the adapter for this revision.
	pub fn adapter(&self) -> Result<Arc<dyn ListingAdapter>, ConfigError> {
		let join = |path: &str| {
			self.base
				.join(path)
				.map_err(|source| ConfigError::InvalidUrl { field: "ANALYTICS_API_BASE", source })
		};

		let adapter: Arc<dyn ListingAdapter> = match self.version {
			ApiVersion::ManagementV3 => Arc::new(ManagementV3 {
				endpoint: join("analytics/v3/management/accountSummaries")?,
			}),
			version @ (ApiVersion::AdminV1Beta | ApiVersion::AdminV1Alpha) => Arc::new(AdminV1 {
				version,
				endpoint: join(&format!("{}/accountSummaries", version.as_str()))?,
			}),
		};

		Ok(adapter)
	}
}

/// Management API v3 adapter.
#[derive(Debug)]
pub struct ManagementV3 {
	endpoint: Url,
}
impl ListingAdapter for ManagementV3 {
	fn label(&self) -> &'static str {
		ApiVersion::ManagementV3.as_str()
	}

	fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	fn flatten(&self, body: &[u8]) -> Result<AccountListing, ListingError> {
		let response: ManagementResponse = parse(body)?;
		let accounts = response.items.len();
		let properties = response
			.items
			.into_iter()
			.flat_map(|account| {
				let ManagementAccount { id: account_id, name: account_name, web_properties } =
					account;

				web_properties.into_iter().map(move |property| PropertySummary {
					account_id: account_id.clone(),
					account_name: account_name.clone(),
					id: property.id,
					name: property.name,
				})
			})
			.collect();

		Ok(AccountListing { accounts, properties })
	}
}

/// Admin API adapter (v1beta and v1alpha share one shape).
#[derive(Debug)]
pub struct AdminV1 {
	version: ApiVersion,
	endpoint: Url,
}
impl ListingAdapter for AdminV1 {
	fn label(&self) -> &'static str {
		self.version.as_str()
	}

	fn endpoint(&self) -> &Url {
		&self.endpoint
	}

	fn flatten(&self, body: &[u8]) -> Result<AccountListing, ListingError> {
		let response: AdminResponse = parse(body)?;
		let accounts = response.account_summaries.len();
		let properties = response
			.account_summaries
			.into_iter()
			.flat_map(|account| {
				let AdminAccount { account: account_id, display_name, property_summaries } =
					account;

				property_summaries.into_iter().map(move |property| PropertySummary {
					account_id: account_id.clone(),
					account_name: display_name.clone(),
					id: property.property,
					name: property.display_name,
				})
			})
			.collect();

		Ok(AccountListing { accounts, properties })
	}
}

#[derive(Deserialize)]
struct ManagementResponse {
	#[serde(default)]
	items: Vec<ManagementAccount>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManagementAccount {
	#[serde(default)]
	id: String,
	#[serde(default)]
	name: String,
	#[serde(default)]
	web_properties: Vec<ManagementProperty>,
}

#[derive(Deserialize)]
struct ManagementProperty {
	id: String,
	#[serde(default)]
	name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminResponse {
	#[serde(default)]
	account_summaries: Vec<AdminAccount>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminAccount {
	#[serde(default)]
	account: String,
	#[serde(default)]
	display_name: String,
	#[serde(default)]
	property_summaries: Vec<AdminProperty>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AdminProperty {
	property: String,
	#[serde(default)]
	display_name: String,
}

fn parse<T>(body: &[u8]) -> Result<T, ListingError>
where
	T: DeserializeOwned,
{
	let mut de = serde_json::Deserializer::from_slice(body);

	serde_path_to_error::deserialize(&mut de).map_err(|source| ListingError::Parse { source })
}
