//! Writer module for manifests and id records.

use crate::graph::ModuleGraph;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Identifier → id for every module that has an id, sorted by identifier.
pub fn assignment_map(graph: &ModuleGraph) -> BTreeMap<String, String> {
	graph
		.modules
		.iter()
		.filter_map(|m| m.id.as_ref().map(|id| (m.identifier.clone(), id.clone())))
		.collect()
}

/// Generate the records file content as a string (no I/O).
pub fn generate_records_content(graph: &ModuleGraph) -> Result<String> {
	let mut content = serde_json::to_string_pretty(&assignment_map(graph))?;
	content.push('\n');
	Ok(content)
}

/// Write the manifest back, ids included.
pub fn write_manifest(path: &Path, graph: &ModuleGraph) -> Result<()> {
	fs::write(path, graph.to_json()?)
		.with_context(|| format!("Failed to write {}", path.display()))
}

/// Write the identifier → id records file.
pub fn write_records(path: &Path, graph: &ModuleGraph) -> Result<()> {
	fs::write(path, generate_records_content(graph)?)
		.with_context(|| format!("Failed to write {}", path.display()))
}
