//! Outbound HTTP for the code exchange and the listing call.
//!
//! Both calls run through one [`TokenHttpClient`], so a custom stack can replace reqwest
//! for both. Each call gets a fresh [`ResponseMetadataSlot`]; the transport clears it on
//! dispatch and stores the status once a response arrives, which lets the error mapper see
//! the status even when the transport itself failed.

// std
use std::time::Duration as StdDuration;
// crates.io
use oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse};
use reqwest::redirect::Policy;
// self
use crate::{_prelude::*, error::ConfigError};

/// HTTP stack shared by every request handler.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Error produced by the underlying stack.
	type TransportError: 'static + Send + Sync + StdError;

	/// Per-call handle that `oauth2` and the listing client drive.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle that reports into `slot`.
	///
	/// The handle must call [`ResponseMetadataSlot::take`] before sending and
	/// [`ResponseMetadataSlot::store`] as soon as a status is known.
	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle;
}

/// What the transport learned about the last response.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadata {
	/// HTTP status, if a response arrived.
	pub status: Option<u16>,
}

/// Shared cell carrying [`ResponseMetadata`] from a handle back to the caller.
#[derive(Clone, Debug, Default)]
pub struct ResponseMetadataSlot(Arc<Mutex<Option<ResponseMetadata>>>);
impl ResponseMetadataSlot {
	/// Replaces the stored metadata.
	pub fn store(&self, meta: ResponseMetadata) {
		*self.0.lock() = Some(meta);
	}

	/// Removes and returns the stored metadata.
	pub fn take(&self) -> Option<ResponseMetadata> {
		self.0.lock().take()
	}
}

/// reqwest-backed [`TokenHttpClient`].
///
/// [`ReqwestHttpClient::build`] disables redirects; a client passed to
/// [`ReqwestHttpClient::with_client`] should do the same.
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(ReqwestClient);
impl ReqwestHttpClient {
	/// Builds a client without redirects, bounded by `timeout` when set.
	pub fn build(timeout: Option<StdDuration>) -> Result<Self, ConfigError> {
		let builder = ReqwestClient::builder().redirect(Policy::none());
		let builder = match timeout {
			Some(timeout) => builder.timeout(timeout),
			None => builder,
		};

		Ok(Self(builder.build()?))
	}

	/// Uses a preconfigured client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
impl TokenHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		ReqwestHandle { client: self.0.clone(), slot }
	}
}

/// [`AsyncHttpClient`] handle returned by [`ReqwestHttpClient`].
#[derive(Clone, Debug)]
pub struct ReqwestHandle {
	client: ReqwestClient,
	slot: ResponseMetadataSlot,
}
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.slot.take();

			let response = self.client.execute(request.try_into().map_err(Box::new)?).await;
			let response = response.map_err(Box::new)?;
			let status = response.status();
			let headers = response.headers().clone();

			self.slot.store(ResponseMetadata { status: Some(status.as_u16()) });

			let body = response.bytes().await.map_err(Box::new)?;
			let mut converted = HttpResponse::new(body.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}
