//! Error types for id assignment and option validation.

use thiserror::Error;

/// Errors raised by the library.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
	/// The configured hash function is not supported.
	#[error("unknown hash function '{0}' (expected one of: md4, md5, sha256, sha512)")]
	UnknownHashFunction(String),

	/// The configured digest encoding is not supported.
	#[error("unknown digest encoding '{0}' (expected one of: base64, base64url, hex)")]
	UnknownDigestEncoding(String),

	/// The digest length must be at least one character.
	#[error("hashDigestLength must be >= 1, got {0}")]
	InvalidDigestLength(usize),

	/// Every prefix of a module's digest, including the full digest, is already taken.
	#[error("digest space exhausted for module '{module}': full digest '{digest}' is already in use")]
	DigestSpaceExhausted { module: String, digest: String },

	/// The module manifest is structurally invalid.
	#[error("invalid manifest: {0}")]
	Manifest(String),
}

impl IdError {
	/// Returns true if this error comes from option validation, i.e. it was
	/// raised before any id was computed.
	pub fn is_config_error(&self) -> bool {
		matches!(
			self,
			IdError::UnknownHashFunction(_)
				| IdError::UnknownDigestEncoding(_)
				| IdError::InvalidDigestLength(_)
		)
	}
}

pub type Result<T> = std::result::Result<T, IdError>;
