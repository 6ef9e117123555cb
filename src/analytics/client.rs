//! Bearer-authorized listing call.

// crates.io
use oauth2::{
	AsyncHttpClient,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION},
	},
};
// self
use crate::{
	_prelude::*,
	analytics::{AccountListing, ListingAdapter},
	auth::CredentialSet,
	error::{ConfigError, ListingError},
	http::{ResponseMetadataSlot, TokenHttpClient},
	oauth::TransportErrorMapper,
};

const PREVIEW_CHARS: usize = 256;

/// Issues one listing request with `credentials` and flattens the first page.
///
/// Transport failures go through `mapper`; a non-2xx status becomes
/// [`ListingError::Status`] and an unreadable body becomes [`ListingError::Parse`].
/// An empty account list is a success with no entries.
/// Only the first page is read.
pub async fn list_properties<C, M>(
	http_client: &C,
	mapper: &M,
	adapter: &dyn ListingAdapter,
	credentials: &CredentialSet,
) -> Result<AccountListing>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let request = Request::builder()
		.method(Method::GET)
		.uri(adapter.endpoint().as_str())
		.header(AUTHORIZATION, credentials.bearer())
		.header(ACCEPT, "application/json")
		.body(Vec::new())
		.map_err(ConfigError::from)?;
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());
	let response = handle
		.call(request)
		.await
		.map_err(|err| mapper.map_transport_error(meta.take().as_ref(), err))?;
	let status = response.status();

	if !status.is_success() {
		return Err(ListingError::Status {
			status: status.as_u16(),
			body_preview: preview(response.body()),
		}
		.into());
	}

	let listing = adapter.flatten(response.body())?;

	tracing::debug!(
		api = adapter.label(),
		accounts = listing.accounts,
		properties = listing.properties.len(),
		"Listed analytics properties."
	);

	Ok(listing)
}

fn preview(body: &[u8]) -> String {
	let text = String::from_utf8_lossy(body);

	match text.char_indices().nth(PREVIEW_CHARS) {
		Some((cut, _)) => format!("{}…", &text[..cut]),
		None => text.into_owned(),
	}
}
