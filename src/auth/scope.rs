//! Normalized OAuth scopes.

// std
use std::collections::BTreeSet;
// self
use crate::_prelude::*;

/// Rejected scope entry.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum ScopeValidationError {
	/// An entry was the empty string.
	#[error("Scope entry is empty.")]
	Empty,
	/// An entry contained whitespace and would split into several scopes.
	#[error("Scope `{scope}` contains whitespace.")]
	ContainsWhitespace {
		/// Rejected entry.
		scope: String,
	},
}

/// Sorted, deduplicated scopes.
///
/// Ordering is fixed so the consent URL is identical on every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ScopeSet(BTreeSet<String>);
impl ScopeSet {
	/// Validates and normalizes `scopes`.
	pub fn new<I, S>(scopes: I) -> Result<Self, ScopeValidationError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		scopes
			.into_iter()
			.map(|scope| {
				let scope = scope.into();

				if scope.is_empty() {
					Err(ScopeValidationError::Empty)
				} else if scope.chars().any(char::is_whitespace) {
					Err(ScopeValidationError::ContainsWhitespace { scope })
				} else {
					Ok(scope)
				}
			})
			.collect::<Result<_, _>>()
			.map(Self)
	}

	/// Number of distinct scopes.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// `true` when nothing is requested.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// `true` when `scope` is part of the set.
	pub fn contains(&self, scope: &str) -> bool {
		self.0.contains(scope)
	}

	/// Joins the scopes with `delimiter`; `None` for an empty set.
	pub fn join(&self, delimiter: char) -> Option<String> {
		let mut scopes = self.0.iter();
		let mut joined = scopes.next()?.clone();

		for scope in scopes {
			joined.push(delimiter);
			joined.push_str(scope);
		}

		Some(joined)
	}
}
impl Debug for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_set().entries(&self.0).finish()
	}
}
impl Display for ScopeSet {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.join(' ').unwrap_or_default())
	}
}
