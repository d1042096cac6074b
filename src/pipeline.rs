//! Compilation pipeline with explicit plugin hooks.
//!
//! Plugins are applied at the start of every compilation and register
//! callbacks for the phases they care about. The module-ids phase runs each
//! registered callback once, in registration order.

use crate::graph::ModuleGraph;
use crate::{AssignStats, Assignment, Config, IdAssigner};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Callback for the module-ids phase
pub type ModuleIdsHook = Box<dyn FnMut(&mut ModuleGraph) -> Result<()>>;

/// Hooks of one compilation
#[derive(Default)]
pub struct CompilationHooks {
	module_ids: Vec<(String, ModuleIdsHook)>,
}

impl CompilationHooks {
	/// Register a module-ids callback under a plugin name.
	pub fn on_module_ids(&mut self, name: impl Into<String>, hook: ModuleIdsHook) {
		self.module_ids.push((name.into(), hook));
	}

	fn run_module_ids(&mut self, graph: &mut ModuleGraph) -> Result<()> {
		for (name, hook) in &mut self.module_ids {
			debug!(plugin = name.as_str(), "running module ids hook");
			hook(&mut *graph).with_context(|| format!("{} failed during module ids", name))?;
		}
		Ok(())
	}
}

/// A plugin taps into each compilation as it starts.
pub trait Plugin {
	fn name(&self) -> &str;

	fn apply(&self, context: &Path, hooks: &mut CompilationHooks);
}

/// Result of one compilation
#[derive(Debug)]
pub struct Compilation {
	pub graph: ModuleGraph,
}

/// Runs compilations through registered plugins
pub struct Compiler {
	context: PathBuf,
	plugins: Vec<Box<dyn Plugin>>,
}

impl Compiler {
	pub fn new(context: impl Into<PathBuf>) -> Self {
		Self {
			context: context.into(),
			plugins: Vec::new(),
		}
	}

	pub fn context(&self) -> &Path {
		&self.context
	}

	pub fn register(&mut self, plugin: Box<dyn Plugin>) {
		self.plugins.push(plugin);
	}

	/// Run one compilation over `graph`.
	pub fn compile(&self, mut graph: ModuleGraph) -> Result<Compilation> {
		let mut hooks = CompilationHooks::default();
		for plugin in &self.plugins {
			debug!(plugin = plugin.name(), "applying plugin");
			plugin.apply(&self.context, &mut hooks);
		}

		hooks.run_module_ids(&mut graph)?;

		Ok(Compilation { graph })
	}
}

/// Report sink shared between the plugin and whoever wants the results
pub type Report = std::rc::Rc<std::cell::RefCell<Vec<(AssignStats, Vec<Assignment>)>>>;

/// Plugin that assigns stable hashed ids in the module-ids phase.
pub struct StableIdsPlugin {
	config: Config,
	report: Report,
}

impl StableIdsPlugin {
	/// Build the plugin; the config is validated here, before any compilation.
	pub fn new(config: Config) -> crate::Result<Self> {
		config.validate()?;
		Ok(Self {
			config,
			report: Report::default(),
		})
	}

	/// Stats and assignments of every compilation run so far.
	pub fn report(&self) -> Report {
		self.report.clone()
	}
}

impl Plugin for StableIdsPlugin {
	fn name(&self) -> &str {
		"StableIdsPlugin"
	}

	fn apply(&self, context: &Path, hooks: &mut CompilationHooks) {
		let config = self.config.clone();
		let context = context.to_path_buf();
		let report = self.report.clone();
		hooks.on_module_ids(
			self.name(),
			Box::new(move |graph: &mut ModuleGraph| -> Result<()> {
				let assigner = IdAssigner::new(config.clone(), context.clone())?;
				let result = assigner.assign_all(graph)?;
				report.borrow_mut().push(result);
				Ok(())
			}),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::ModuleRecord;
	use std::cell::RefCell;
	use std::rc::Rc;

	struct Recorder {
		calls: Rc<RefCell<Vec<&'static str>>>,
		label: &'static str,
	}

	impl Plugin for Recorder {
		fn name(&self) -> &str {
			self.label
		}

		fn apply(&self, _context: &Path, hooks: &mut CompilationHooks) {
			let calls = self.calls.clone();
			let label = self.label;
			hooks.on_module_ids(
				label,
				Box::new(move |_graph: &mut ModuleGraph| -> Result<()> {
					calls.borrow_mut().push(label);
					Ok(())
				}),
			);
		}
	}

	fn graph() -> ModuleGraph {
		ModuleGraph::new(vec![ModuleRecord {
			lib_ident: Some("./src/a.js".to_string()),
			chunks: 1,
			pre_order_index: Some(0),
			..ModuleRecord::new("/project/src/a.js")
		}])
	}

	#[test]
	fn test_hooks_run_once_per_compilation_in_order() {
		let calls = Rc::new(RefCell::new(Vec::new()));
		let mut compiler = Compiler::new("/project");
		assert_eq!(compiler.context(), Path::new("/project"));
		compiler.register(Box::new(Recorder { calls: calls.clone(), label: "first" }));
		compiler.register(Box::new(Recorder { calls: calls.clone(), label: "second" }));

		compiler.compile(graph()).unwrap();
		assert_eq!(*calls.borrow(), vec!["first", "second"]);

		compiler.compile(graph()).unwrap();
		assert_eq!(calls.borrow().len(), 4);
	}

	#[test]
	fn test_stable_ids_plugin_assigns_ids() {
		let plugin = StableIdsPlugin::new(Config::default()).unwrap();
		let report = plugin.report();

		let mut compiler = Compiler::new("/project");
		compiler.register(Box::new(plugin));

		let compilation = compiler.compile(graph()).unwrap();
		let id = compilation.graph.modules[0].id.clone().unwrap();
		assert_eq!(id.len(), 4);

		let report = report.borrow();
		assert_eq!(report.len(), 1);
		assert_eq!(report[0].0.assigned, 1);
		assert_eq!(report[0].1[0].id, id);
	}

	#[test]
	fn test_invalid_config_rejected_at_construction() {
		let config = Config {
			hash_digest_length: 0,
			..Config::default()
		};
		assert!(StableIdsPlugin::new(config).is_err());
	}
}
