//! Provider metadata and token error classification.
//!
//! [`ProviderDescriptor`] holds the endpoints and consent URL options; [`ProviderStrategy`]
//! turns an OAuth error response into a [`ProviderErrorKind`] without touching any HTTP
//! client type.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
