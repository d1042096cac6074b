//! Hash primitive: digest a stable name and encode it as a string.
//!
//! Digests are fully deterministic; the same function, encoding and input
//! always produce the same string on every machine.

use crate::error::IdError;
use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use std::fmt;
use std::str::FromStr;

/// Supported hash functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashFunction {
	/// Legacy fast digest, the default.
	#[default]
	Md4,
	Md5,
	Sha256,
	Sha512,
}

impl HashFunction {
	/// Hash raw bytes.
	pub fn hash(self, bytes: &[u8]) -> Vec<u8> {
		use sha2::Digest;
		match self {
			HashFunction::Md4 => md4::Md4::digest(bytes).to_vec(),
			HashFunction::Md5 => md5::Md5::digest(bytes).to_vec(),
			HashFunction::Sha256 => sha2::Sha256::digest(bytes).to_vec(),
			HashFunction::Sha512 => sha2::Sha512::digest(bytes).to_vec(),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			HashFunction::Md4 => "md4",
			HashFunction::Md5 => "md5",
			HashFunction::Sha256 => "sha256",
			HashFunction::Sha512 => "sha512",
		}
	}
}

impl FromStr for HashFunction {
	type Err = IdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"md4" => Ok(HashFunction::Md4),
			"md5" => Ok(HashFunction::Md5),
			"sha256" => Ok(HashFunction::Sha256),
			"sha512" => Ok(HashFunction::Sha512),
			_ => Err(IdError::UnknownHashFunction(s.to_string())),
		}
	}
}

impl fmt::Display for HashFunction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Supported digest encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestEncoding {
	/// Standard alphabet with `=` padding, the default.
	#[default]
	Base64,
	/// URL-safe alphabet, no padding.
	Base64Url,
	/// Lowercase hex.
	Hex,
}

impl DigestEncoding {
	pub fn encode(self, bytes: &[u8]) -> String {
		match self {
			DigestEncoding::Base64 => STANDARD.encode(bytes),
			DigestEncoding::Base64Url => URL_SAFE_NO_PAD.encode(bytes),
			DigestEncoding::Hex => hex::encode(bytes),
		}
	}

	pub fn as_str(self) -> &'static str {
		match self {
			DigestEncoding::Base64 => "base64",
			DigestEncoding::Base64Url => "base64url",
			DigestEncoding::Hex => "hex",
		}
	}
}

impl FromStr for DigestEncoding {
	type Err = IdError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"base64" => Ok(DigestEncoding::Base64),
			"base64url" => Ok(DigestEncoding::Base64Url),
			"hex" => Ok(DigestEncoding::Hex),
			_ => Err(IdError::UnknownDigestEncoding(s.to_string())),
		}
	}
}

impl fmt::Display for DigestEncoding {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Hash `input` with `function` and encode the result with `encoding`.
pub fn digest(function: HashFunction, encoding: DigestEncoding, input: &str) -> String {
	encoding.encode(&function.hash(input.as_bytes()))
}
