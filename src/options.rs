//! Option file detection and validation.
//!
//! Finds `module-ids.config.json` or a `package.json` with a `moduleIds`
//! key, and turns the raw options into a validated [`Config`].

use crate::error::IdError;
use crate::Config;
use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const OPTIONS_FILE_NAME: &str = "module-ids.config.json";
pub const PACKAGE_JSON_KEY: &str = "moduleIds";

/// Raw options as written by the user. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
	pub context: Option<PathBuf>,
	pub hash_function: Option<String>,
	pub hash_digest: Option<String>,
	pub hash_digest_length: Option<usize>,
}

impl Options {
	/// Fill in defaults and reject anything invalid. Nothing is applied
	/// unless every field passes.
	pub fn validate(self) -> std::result::Result<Config, IdError> {
		let defaults = Config::default();
		let config = Config {
			context: self.context,
			hash_function: match self.hash_function {
				Some(name) => name.parse()?,
				None => defaults.hash_function,
			},
			hash_digest: match self.hash_digest {
				Some(name) => name.parse()?,
				None => defaults.hash_digest,
			},
			hash_digest_length: self.hash_digest_length.unwrap_or(defaults.hash_digest_length),
		};
		config.validate()?;
		Ok(config)
	}

	/// Overlay `other` on top of `self`; fields set in `other` win.
	pub fn merge(self, other: Options) -> Options {
		Options {
			context: other.context.or(self.context),
			hash_function: other.hash_function.or(self.hash_function),
			hash_digest: other.hash_digest.or(self.hash_digest),
			hash_digest_length: other.hash_digest_length.or(self.hash_digest_length),
		}
	}
}

/// Options found on disk
#[derive(Debug, Clone)]
pub struct OptionsFile {
	pub options: Options,
	/// Path to the file the options came from
	pub path: PathBuf,
}

/// Find options by searching upward from a starting directory.
///
/// Searches for:
/// 1. `module-ids.config.json` in the directory or any parent
/// 2. `package.json` with a `"moduleIds"` key in the directory or any parent
///
/// Returns `Ok(None)` if nothing is found. A file that is found but invalid
/// is an error.
pub fn find_options_file(start_dir: &Path) -> Result<Option<OptionsFile>> {
	for dir in start_dir.ancestors() {
		let options_path = dir.join(OPTIONS_FILE_NAME);
		if options_path.exists() {
			return load_options(&options_path).map(Some);
		}

		let package_json_path = dir.join("package.json");
		if package_json_path.exists() {
			let json = read_json(&package_json_path)?;
			if json.get(PACKAGE_JSON_KEY).is_some() {
				return load_options(&package_json_path).map(Some);
			}
		}
	}

	Ok(None)
}

/// Load options from a config file or from the `moduleIds` key of a package.json.
///
/// A relative `context` is resolved against the file's directory.
pub fn load_options(path: &Path) -> Result<OptionsFile> {
	let json = read_json(path)?;

	let is_package_json = path
		.file_name()
		.map(|n| n == "package.json")
		.unwrap_or(false);
	let raw = if is_package_json {
		json.get(PACKAGE_JSON_KEY)
			.cloned()
			.ok_or_else(|| anyhow::anyhow!("No '{}' key found in package.json", PACKAGE_JSON_KEY))?
	} else {
		json
	};

	let mut options: Options = serde_json::from_value(raw)
		.with_context(|| format!("Invalid options in {}", path.display()))?;

	if let (Some(context), Some(dir)) = (options.context.as_ref(), path.parent()) {
		if context.is_relative() {
			options.context = Some(dir.join(context));
		}
	}

	Ok(OptionsFile {
		options,
		path: path.to_path_buf(),
	})
}

fn read_json(path: &Path) -> Result<Value> {
	let content = fs::read_to_string(path)
		.with_context(|| format!("Failed to read {}", path.display()))?;
	serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{DigestEncoding, HashFunction};
	use std::fs;
	use tempfile::tempdir;

	#[test]
	fn test_validate_defaults() {
		assert_eq!(Options::default().validate().unwrap(), Config::default());
	}

	#[test]
	fn test_validate_rejects_bad_values() {
		let options = Options {
			hash_function: Some("crc32".to_string()),
			..Options::default()
		};
		assert_eq!(
			options.validate(),
			Err(IdError::UnknownHashFunction("crc32".to_string()))
		);

		let options = Options {
			hash_digest_length: Some(0),
			..Options::default()
		};
		assert_eq!(options.validate(), Err(IdError::InvalidDigestLength(0)));

		let options = Options {
			hash_digest: Some("latin1".to_string()),
			..Options::default()
		};
		assert!(options.validate().unwrap_err().is_config_error());
	}

	#[test]
	fn test_merge_prefers_overlay() {
		let base = Options {
			hash_function: Some("md5".to_string()),
			hash_digest_length: Some(6),
			..Options::default()
		};
		let overlay = Options {
			hash_digest_length: Some(8),
			..Options::default()
		};
		let config = base.merge(overlay).validate().unwrap();
		assert_eq!(config.hash_function, HashFunction::Md5);
		assert_eq!(config.hash_digest, DigestEncoding::Base64);
		assert_eq!(config.hash_digest_length, 8);
	}

	#[test]
	fn test_find_options_file() {
		let temp = tempdir().unwrap();
		let nested = temp.path().join("packages").join("app");
		fs::create_dir_all(&nested).unwrap();

		// No config → None
		assert!(find_options_file(&nested).unwrap().is_none());

		fs::write(
			temp.path().join(OPTIONS_FILE_NAME),
			r#"{ "hashFunction": "sha256", "context": "./src" }"#,
		)
		.unwrap();

		let found = find_options_file(&nested).unwrap().unwrap();
		assert!(found.path.ends_with(OPTIONS_FILE_NAME));
		assert_eq!(found.options.hash_function.as_deref(), Some("sha256"));
		assert_eq!(found.options.context, Some(temp.path().join("./src")));
	}

	#[test]
	fn test_find_options_in_package_json() {
		let temp = tempdir().unwrap();

		// package.json without the key is skipped
		fs::write(temp.path().join("package.json"), r#"{ "name": "app" }"#).unwrap();
		assert!(find_options_file(temp.path()).unwrap().is_none());

		fs::write(
			temp.path().join("package.json"),
			r#"{ "name": "app", "moduleIds": { "hashDigestLength": 6 } }"#,
		)
		.unwrap();
		let found = find_options_file(temp.path()).unwrap().unwrap();
		assert!(found.path.ends_with("package.json"));
		assert_eq!(found.options.hash_digest_length, Some(6));
	}

	#[test]
	fn test_load_options_rejects_unknown_keys() {
		let temp = tempdir().unwrap();
		let path = temp.path().join(OPTIONS_FILE_NAME);
		fs::write(&path, r#"{ "hashSalt": "x" }"#).unwrap();
		assert!(load_options(&path).is_err());

		fs::write(&path, r#"{ "hashDigestLength": "four" }"#).unwrap();
		assert!(load_options(&path).is_err());
	}
}
