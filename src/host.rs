//! The narrow view of the build graph the assigner works through.

use crate::naming::UsedIds;
use std::cmp::Ordering;
use std::hash::Hash;
use std::path::Path;

/// Read/write access to the modules of one compilation.
///
/// `Module` is a cheap handle (an index, a key) into the host's own graph.
/// Equal handles name the same module.
/// Implementors only expose what id assignment needs; the assigner never
/// sees the rest of the graph.
pub trait ModuleIdHost {
	type Module: Copy + Eq + Hash;

	/// Every module of the compilation, in whatever order the host keeps them.
	fn modules(&self) -> Vec<Self::Module>;

	/// Snapshot of the ids already reserved when the pass starts.
	fn used_ids(&self) -> UsedIds;

	/// Whether the module is emitted with an id at all.
	fn needs_id(&self, module: Self::Module) -> bool;

	/// Number of chunks containing the module.
	fn chunk_count(&self, module: Self::Module) -> usize;

	fn module_id(&self, module: Self::Module) -> Option<&str>;

	fn set_module_id(&mut self, module: Self::Module, id: String);

	/// Position of the module in a pre-order walk from the entry points.
	fn pre_order_index(&self, module: Self::Module) -> Option<usize>;

	/// Unique identity string, used to break ordering ties.
	fn identifier(&self, module: Self::Module) -> &str;

	/// Name of the module that survives unrelated changes to the build.
	/// `None` is treated as the empty name.
	fn short_stable_name(&self, module: Self::Module, context: &Path) -> Option<String>;
}

/// Total order for processing: pre-order index first, then identifier.
///
/// Modules without a pre-order index sort after every indexed module.
pub fn compare_by_pre_order_or_identifier<H: ModuleIdHost>(
	host: &H,
	a: H::Module,
	b: H::Module,
) -> Ordering {
	let by_index = match (host.pre_order_index(a), host.pre_order_index(b)) {
		(Some(a), Some(b)) => a.cmp(&b),
		(Some(_), None) => Ordering::Less,
		(None, Some(_)) => Ordering::Greater,
		(None, None) => Ordering::Equal,
	};
	by_index.then_with(|| host.identifier(a).cmp(host.identifier(b)))
}
