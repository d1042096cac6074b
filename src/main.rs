//! Stable Module Ids CLI
//!
//! Reads a module manifest, assigns stable hashed ids to every module that
//! needs one, and writes the manifest back.

use anyhow::{bail, Result};
use clap::Parser;
use stable_module_ids::options::{find_options_file, load_options, Options};
use stable_module_ids::pipeline::{Compiler, StableIdsPlugin};
use stable_module_ids::{format_seconds, writer, ModuleGraph};
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "stable-module-ids")]
#[command(author = "Fellow <engineering@fellow.app>")]
#[command(version)]
#[command(about = "Assign stable hashed ids to bundler modules", long_about = None)]
struct Args {
	/// Path to the module manifest (JSON)
	#[arg(value_name = "MANIFEST")]
	manifest: PathBuf,

	/// Base directory for stable names (default: manifest context, then its directory)
	#[arg(long)]
	context: Option<PathBuf>,

	/// Hash function: md4, md5, sha256, sha512
	#[arg(long)]
	hash_function: Option<String>,

	/// Digest encoding: base64, base64url, hex
	#[arg(long)]
	hash_digest: Option<String>,

	/// Minimum id length
	#[arg(long)]
	hash_digest_length: Option<usize>,

	/// Options file (default: search upward for module-ids.config.json or package.json)
	#[arg(long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Skip options file discovery
	#[arg(long)]
	skip_config_file: bool,

	/// Write the identifier → id map to this file
	#[arg(long, value_name = "FILE")]
	records: Option<PathBuf>,

	/// Show what would be assigned without writing files
	#[arg(short = 'n', long)]
	dry_run: bool,

	/// Print every assignment
	#[arg(short, long)]
	verbose: bool,
}

fn main() -> Result<()> {
	let args = Args::parse();

	let default_level = if args.verbose { "debug" } else { "info" };
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
		)
		.with_target(false)
		.init();

	if !args.manifest.exists() {
		bail!(
			"Manifest does not exist: {}\n\
			 Usage: stable-module-ids <MANIFEST>",
			args.manifest.display()
		);
	}

	let graph = ModuleGraph::load(&args.manifest)?;
	let manifest_dir = args
		.manifest
		.parent()
		.map(|p| p.to_path_buf())
		.unwrap_or_default();

	// Options file, then CLI flags on top
	let file_options = if let Some(ref path) = args.config {
		Some(load_options(path)?)
	} else if args.skip_config_file {
		None
	} else {
		find_options_file(&manifest_dir)?
	};
	if let Some(ref found) = file_options {
		info!(path = %found.path.display(), "using options file");
	}

	let cli_options = Options {
		context: args.context.clone(),
		hash_function: args.hash_function.clone(),
		hash_digest: args.hash_digest.clone(),
		hash_digest_length: args.hash_digest_length,
	};
	let options = file_options
		.map(|f| f.options)
		.unwrap_or_default()
		.merge(cli_options);
	let config = options.validate()?;

	let compiler_context = graph.context.clone().unwrap_or(manifest_dir);

	let plugin = StableIdsPlugin::new(config)?;
	let report = plugin.report();
	let mut compiler = Compiler::new(compiler_context);
	compiler.register(Box::new(plugin));

	let start_time = Instant::now();
	let compilation = compiler.compile(graph)?;
	let total_time = start_time.elapsed();

	let (assigned, grown, skipped) = report
		.borrow()
		.iter()
		.fold((0, 0, 0), |(a, g, s), (stats, _)| {
			(a + stats.assigned, g + stats.grown, s + stats.skipped())
		});

	if args.dry_run {
		for (_, assignments) in report.borrow().iter() {
			for assignment in assignments {
				println!("{}\t{}", assignment.id, assignment.identifier);
			}
		}
	} else {
		writer::write_manifest(&args.manifest, &compilation.graph)?;
		if let Some(ref records) = args.records {
			writer::write_records(records, &compilation.graph)?;
		}
	}

	println!(
		"Assigned {} ids ({} grown on collision), skipped {} in {}",
		assigned,
		grown,
		skipped,
		format_seconds(total_time.as_secs_f64())
	);

	Ok(())
}
