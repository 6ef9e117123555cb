//! Auth-domain scope sets and the transient credential set.

pub mod credential;
pub mod scope;

pub use credential::*;
pub use scope::*;
