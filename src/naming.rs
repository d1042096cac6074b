//! Used-id registry and collision-growth naming.
//!
//! An id is the shortest prefix of a module's digest, at least the
//! configured length, that no earlier claim has taken. The set only grows.

use std::collections::HashSet;

/// Ids already claimed, by this pass or by anything before it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UsedIds {
	used: HashSet<String>,
}

impl UsedIds {
	pub fn new() -> Self {
		Self {
			used: HashSet::new(),
		}
	}

	pub fn contains(&self, id: &str) -> bool {
		self.used.contains(id)
	}

	/// Reserve an id. Returns false if it was already taken.
	pub fn insert(&mut self, id: impl Into<String>) -> bool {
		self.used.insert(id.into())
	}

	pub fn len(&self) -> usize {
		self.used.len()
	}

	pub fn is_empty(&self) -> bool {
		self.used.is_empty()
	}

	/// Claim the shortest free prefix of `digest` with at least `min_len` chars.
	///
	/// A `min_len` past the end of the digest starts at the full digest. The
	/// claimed id is recorded before returning, so the next claim sees it.
	/// Returns `None` if every prefix up to the full digest is taken.
	pub fn claim_prefix(&mut self, digest: &str, min_len: usize) -> Option<String> {
		let start = min_len.max(1).min(digest.len());
		for len in start..=digest.len() {
			let candidate = &digest[..len];
			if !self.used.contains(candidate) {
				self.used.insert(candidate.to_string());
				return Some(candidate.to_string());
			}
		}
		None
	}
}

impl<S: Into<String>> FromIterator<S> for UsedIds {
	fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
		Self {
			used: iter.into_iter().map(Into::into).collect(),
		}
	}
}

impl<S: Into<String>> Extend<S> for UsedIds {
	fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
		self.used.extend(iter.into_iter().map(Into::into));
	}
}
