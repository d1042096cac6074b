//! In-memory module graph loaded from a JSON manifest.
//!
//! The manifest is what a bundler hands over for id assignment:
//!
//! ```json
//! {
//!   "context": "/project",
//!   "reservedIds": ["abcd"],
//!   "modules": [
//!     { "identifier": "/project/src/a.js", "libIdent": "./src/a.js",
//!       "chunks": 1, "preOrderIndex": 0 },
//!     { "identifier": "css /project/src/b.css", "nameForCondition": "/project/src/b.css",
//!       "chunks": 1, "preOrderIndex": 1 }
//!   ]
//! }
//! ```

use crate::error::IdError;
use crate::host::ModuleIdHost;
use crate::naming::UsedIds;
use crate::stable_name::short_module_name;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn default_needs_id() -> bool {
	true
}

fn is_true(value: &bool) -> bool {
	*value
}

/// One module of the graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleRecord {
	/// Unique identity, e.g. the full loader request
	pub identifier: String,
	/// Library identifier, already relative to the context
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub lib_ident: Option<String>,
	/// Resource path used for rule conditions, made relative on use
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name_for_condition: Option<String>,
	#[serde(default = "default_needs_id", skip_serializing_if = "is_true")]
	pub needs_id: bool,
	/// Number of chunks the module is in
	#[serde(default)]
	pub chunks: usize,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub pre_order_index: Option<usize>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub id: Option<String>,
}

impl ModuleRecord {
	pub fn new(identifier: impl Into<String>) -> Self {
		Self {
			identifier: identifier.into(),
			lib_ident: None,
			name_for_condition: None,
			needs_id: true,
			chunks: 0,
			pre_order_index: None,
			id: None,
		}
	}
}

/// Module graph of one compilation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModuleGraph {
	/// Build root
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub context: Option<PathBuf>,
	/// Ids claimed outside this graph
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub reserved_ids: Vec<String>,
	#[serde(default)]
	pub modules: Vec<ModuleRecord>,
}

impl ModuleGraph {
	pub fn new(modules: Vec<ModuleRecord>) -> Self {
		Self {
			context: None,
			reserved_ids: Vec::new(),
			modules,
		}
	}

	/// Parse a manifest and check that identifiers are unique.
	pub fn from_json(content: &str) -> Result<Self> {
		let graph: ModuleGraph =
			serde_json::from_str(content).context("Failed to parse module manifest")?;
		graph.check()?;
		Ok(graph)
	}

	/// Load a manifest from disk.
	pub fn load(path: &Path) -> Result<Self> {
		let content = fs::read_to_string(path)
			.with_context(|| format!("Failed to read {}", path.display()))?;
		Self::from_json(&content).with_context(|| format!("Invalid manifest {}", path.display()))
	}

	pub fn to_json(&self) -> Result<String> {
		let mut json = serde_json::to_string_pretty(self)?;
		json.push('\n');
		Ok(json)
	}

	pub fn get(&self, identifier: &str) -> Option<&ModuleRecord> {
		self.modules.iter().find(|m| m.identifier == identifier)
	}

	/// Id of the module with `identifier`, if it has one.
	pub fn id_of(&self, identifier: &str) -> Option<&str> {
		self.get(identifier).and_then(|m| m.id.as_deref())
	}

	fn check(&self) -> std::result::Result<(), IdError> {
		let mut seen = HashSet::new();
		for module in &self.modules {
			if !seen.insert(module.identifier.as_str()) {
				return Err(IdError::Manifest(format!(
					"duplicate module identifier '{}'",
					module.identifier
				)));
			}
		}
		Ok(())
	}
}

impl ModuleIdHost for ModuleGraph {
	type Module = usize;

	fn modules(&self) -> Vec<usize> {
		(0..self.modules.len()).collect()
	}

	fn used_ids(&self) -> UsedIds {
		let mut used: UsedIds = self.reserved_ids.iter().cloned().collect();
		used.extend(self.modules.iter().filter_map(|m| m.id.clone()));
		used
	}

	fn needs_id(&self, module: usize) -> bool {
		self.modules[module].needs_id
	}

	fn chunk_count(&self, module: usize) -> usize {
		self.modules[module].chunks
	}

	fn module_id(&self, module: usize) -> Option<&str> {
		self.modules[module].id.as_deref()
	}

	fn set_module_id(&mut self, module: usize, id: String) {
		self.modules[module].id = Some(id);
	}

	fn pre_order_index(&self, module: usize) -> Option<usize> {
		self.modules[module].pre_order_index
	}

	fn identifier(&self, module: usize) -> &str {
		&self.modules[module].identifier
	}

	fn short_stable_name(&self, module: usize, context: &Path) -> Option<String> {
		let record = &self.modules[module];
		let context = context.to_string_lossy();
		let name = short_module_name(
			record.lib_ident.as_deref(),
			record.name_for_condition.as_deref(),
			&context,
		);
		if name.is_empty() {
			None
		} else {
			Some(name)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::host::compare_by_pre_order_or_identifier;
	use std::cmp::Ordering;

	fn record(identifier: &str, pre_order_index: Option<usize>) -> ModuleRecord {
		ModuleRecord {
			pre_order_index,
			chunks: 1,
			..ModuleRecord::new(identifier)
		}
	}

	#[test]
	fn test_manifest_defaults() {
		let graph = ModuleGraph::from_json(r#"{ "modules": [ { "identifier": "a" } ] }"#).unwrap();
		let module = &graph.modules[0];
		assert!(module.needs_id);
		assert_eq!(module.chunks, 0);
		assert_eq!(module.id, None);
	}

	#[test]
	fn test_manifest_rejects_duplicates_and_unknown_fields() {
		assert!(ModuleGraph::from_json(
			r#"{ "modules": [ { "identifier": "a" }, { "identifier": "a" } ] }"#
		)
		.is_err());
		assert!(ModuleGraph::from_json(r#"{ "modules": [ { "identifier": "a", "size": 3 } ] }"#).is_err());
	}

	#[test]
	fn test_manifest_name_fields() {
		let graph = ModuleGraph::from_json(
			r#"{ "modules": [
				{ "identifier": "a", "libIdent": "./src/a.js" },
				{ "identifier": "b", "nameForCondition": "/project/src/b.css" }
			] }"#,
		)
		.unwrap();
		assert_eq!(graph.modules[0].lib_ident.as_deref(), Some("./src/a.js"));
		assert_eq!(graph.modules[1].name_for_condition.as_deref(), Some("/project/src/b.css"));
		assert!(graph.to_json().unwrap().contains("\"nameForCondition\""));
	}

	#[test]
	fn test_used_ids_include_reserved_and_assigned() {
		let mut graph = ModuleGraph::new(vec![record("a", None), record("b", None)]);
		graph.reserved_ids.push("zzzz".to_string());
		graph.modules[1].id = Some("bbbb".to_string());

		let used = graph.used_ids();
		assert!(used.contains("zzzz"));
		assert!(used.contains("bbbb"));
		assert_eq!(used.len(), 2);
	}

	#[test]
	fn test_stable_name_is_relative_to_context() {
		let mut graph = ModuleGraph::new(vec![
			record("/project/src/a.js", None),
			record("css /project/src/b.css", None),
		]);
		graph.modules[0].lib_ident = Some("./src/a.js".to_string());
		graph.modules[1].name_for_condition = Some("/project/src/b.css".to_string());
		assert_eq!(
			graph.short_stable_name(0, Path::new("/project")).as_deref(),
			Some("./src/a.js")
		);
		assert_eq!(
			graph.short_stable_name(1, Path::new("/project")).as_deref(),
			Some("./src/b.css")
		);

		let bare = ModuleGraph::new(vec![record("virtual", None)]);
		assert_eq!(bare.short_stable_name(0, Path::new("/project")), None);
	}

	#[test]
	fn test_ordering_by_pre_order_then_identifier() {
		let graph = ModuleGraph::new(vec![
			record("b", Some(1)),
			record("a", Some(2)),
			record("c", None),
			record("d", Some(1)),
		]);

		assert_eq!(compare_by_pre_order_or_identifier(&graph, 0, 1), Ordering::Less);
		assert_eq!(compare_by_pre_order_or_identifier(&graph, 2, 1), Ordering::Greater);
		assert_eq!(compare_by_pre_order_or_identifier(&graph, 0, 3), Ordering::Less);
		assert_eq!(compare_by_pre_order_or_identifier(&graph, 3, 3), Ordering::Equal);
	}
}
