//! Stable Hashed Module Ids
//!
//! Assigns short, collision-free ids to the modules of a build graph. An id
//! is a prefix of the digest of the module's stable name, so it only changes
//! when the module itself moves, not when unrelated modules come and go.

pub mod error;
pub mod graph;
pub mod hash;
pub mod host;
pub mod naming;
pub mod options;
pub mod pipeline;
pub mod stable_name;
pub mod writer;

use host::compare_by_pre_order_or_identifier;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub use error::{IdError, Result};
pub use graph::ModuleGraph;
pub use hash::{DigestEncoding, HashFunction};
pub use host::ModuleIdHost;
pub use naming::UsedIds;

/// Configuration for one id assignment pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
	/// Base directory for stable names (default: the compiler context)
	pub context: Option<PathBuf>,
	/// Hash function applied to stable names (default: md4)
	pub hash_function: HashFunction,
	/// Encoding of the digest (default: base64)
	pub hash_digest: DigestEncoding,
	/// Minimum id length in characters (default: 4)
	pub hash_digest_length: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			context: None,
			hash_function: HashFunction::Md4,
			hash_digest: DigestEncoding::Base64,
			hash_digest_length: 4,
		}
	}
}

impl Config {
	/// Reject settings that can never produce an id.
	pub fn validate(&self) -> Result<()> {
		if self.hash_digest_length == 0 {
			return Err(IdError::InvalidDigestLength(self.hash_digest_length));
		}
		Ok(())
	}
}

/// Counters for one pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AssignStats {
	/// Modules handed to the pass
	pub considered: usize,
	/// Modules that are never emitted with an id
	pub skipped_no_id_needed: usize,
	/// Modules in no chunk
	pub skipped_unreachable: usize,
	/// Modules that already had an id
	pub skipped_already_assigned: usize,
	/// Ids assigned by this pass
	pub assigned: usize,
	/// Ids longer than the configured length because of a collision
	pub grown: usize,
}

impl AssignStats {
	pub fn skipped(&self) -> usize {
		self.skipped_no_id_needed + self.skipped_unreachable + self.skipped_already_assigned
	}
}

/// An id decided for one module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
	pub identifier: String,
	pub id: String,
	pub digest: String,
}

/// Assigns hashed ids to every module that still needs one.
#[derive(Debug, Clone)]
pub struct IdAssigner {
	config: Config,
	context: PathBuf,
}

impl IdAssigner {
	/// Create an assigner. `compiler_context` is used when the config has no
	/// context of its own.
	pub fn new(config: Config, compiler_context: impl Into<PathBuf>) -> Result<Self> {
		config.validate()?;
		let context = config
			.context
			.clone()
			.unwrap_or_else(|| compiler_context.into());
		Ok(Self { config, context })
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	/// Base directory stable names are computed against.
	pub fn context(&self) -> &Path {
		&self.context
	}

	/// Run the pass over every module the host knows.
	pub fn assign_all<H: ModuleIdHost>(&self, host: &mut H) -> Result<(AssignStats, Vec<Assignment>)> {
		let modules = host.modules();
		self.assign(host, modules)
	}

	/// Run the pass over `modules`.
	///
	/// A handle listed more than once is considered once.
	/// The pass is all or nothing: ids are only written back once every
	/// selected module has one.
	pub fn assign<H: ModuleIdHost>(
		&self,
		host: &mut H,
		modules: impl IntoIterator<Item = H::Module>,
	) -> Result<(AssignStats, Vec<Assignment>)> {
		let mut stats = AssignStats::default();
		let mut used_ids = host.used_ids();

		let mut seen: HashSet<H::Module> = HashSet::new();
		let mut selected: Vec<H::Module> = Vec::new();
		for module in modules {
			if !seen.insert(module) {
				continue;
			}
			stats.considered += 1;
			if !host.needs_id(module) {
				stats.skipped_no_id_needed += 1;
			} else if host.chunk_count(module) == 0 {
				stats.skipped_unreachable += 1;
			} else if host.module_id(module).is_some() {
				stats.skipped_already_assigned += 1;
			} else {
				selected.push(module);
			}
		}

		// Host iteration order is not trusted
		selected.sort_by(|&a, &b| compare_by_pre_order_or_identifier(&*host, a, b));

		let mut pending: Vec<(H::Module, Assignment)> = Vec::with_capacity(selected.len());
		for module in selected {
			let name = host
				.short_stable_name(module, &self.context)
				.unwrap_or_default();
			if name.is_empty() {
				warn!(module = host.identifier(module), "empty stable name, hashing \"\"");
			}

			let digest = hash::digest(self.config.hash_function, self.config.hash_digest, &name);
			let id = used_ids
				.claim_prefix(&digest, self.config.hash_digest_length)
				.ok_or_else(|| IdError::DigestSpaceExhausted {
					module: host.identifier(module).to_string(),
					digest: digest.clone(),
				})?;

			if id.len() > self.config.hash_digest_length {
				stats.grown += 1;
			}
			debug!(module = host.identifier(module), %id, len = id.len(), "assigned module id");

			pending.push((
				module,
				Assignment {
					identifier: host.identifier(module).to_string(),
					id,
					digest,
				},
			));
		}

		for (module, assignment) in &pending {
			host.set_module_id(*module, assignment.id.clone());
		}
		stats.assigned = pending.len();

		info!(
			assigned = stats.assigned,
			grown = stats.grown,
			skipped = stats.skipped(),
			"module id pass complete"
		);

		Ok((stats, pending.into_iter().map(|(_, a)| a).collect()))
	}
}

/// Format a duration in seconds for summaries
pub fn format_seconds(seconds: f64) -> String {
	format!("{:.2}s", seconds)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_config() {
		let config = Config::default();
		assert_eq!(config.context, None);
		assert_eq!(config.hash_function, HashFunction::Md4);
		assert_eq!(config.hash_digest, DigestEncoding::Base64);
		assert_eq!(config.hash_digest_length, 4);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_zero_length_rejected_before_pass() {
		let config = Config {
			hash_digest_length: 0,
			..Config::default()
		};
		assert_eq!(
			IdAssigner::new(config, "/project").unwrap_err(),
			IdError::InvalidDigestLength(0)
		);
	}

	#[test]
	fn test_context_precedence() {
		let assigner = IdAssigner::new(Config::default(), "/compiler").unwrap();
		assert_eq!(assigner.context(), Path::new("/compiler"));

		let config = Config {
			context: Some(PathBuf::from("/custom")),
			..Config::default()
		};
		let assigner = IdAssigner::new(config, "/compiler").unwrap();
		assert_eq!(assigner.context(), Path::new("/custom"));
		assert_eq!(assigner.config().hash_digest_length, 4);
	}

	#[test]
	fn test_format_seconds() {
		assert_eq!(format_seconds(1.234), "1.23s");
	}
}
