//! Google Analytics account/property listing.
//!
//! The listing endpoint changed URL and response shape across API revisions while the
//! rest of the flow stayed the same, so the shape lives behind [`ListingAdapter`].
//! [`ListingApi`] picks the adapter from configuration; `client` performs the single
//! bearer-authorized call and hands the body to the adapter.

pub mod adapter;
pub mod client;
/// Flattened listing entries.
pub mod summary;

pub use adapter::*;
pub use client::*;
pub use summary::*;
