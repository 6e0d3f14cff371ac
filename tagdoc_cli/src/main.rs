use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use serde::Serialize;
use similar::ChangeTag;
use similar::TextDiff;
use tagdoc_cli::Commands;
use tagdoc_cli::OutputFormat;
use tagdoc_cli::TagdocCli;
use tagdoc_core::BuildPlan;
use tagdoc_core::BuildReport;
use tagdoc_core::CONFIG_FILE_CANDIDATES;
use tagdoc_core::ExcerptOptions;
use tagdoc_core::TagdocConfig;
use tagdoc_core::check_outputs;
use tagdoc_core::compute_outputs;
use tagdoc_core::index::IndexOptions;
use tagdoc_core::index::LinkStyle;
use tagdoc_core::index::formatted_entry;
use tagdoc_core::index::process_index_tree;
use tagdoc_core::write_outputs;
use tracing_subscriber::EnvFilter;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "TAGDOC_LOG";

const SAMPLE_CONFIG: &str = r###"# tagdoc configuration

# Pages are written to `<output>/<target name>/`, mirroring the source layout.
output = "docs"

# Fail `tagdoc check` when a source file has no documentation block.
# mandatory_coverage = true

[index]
files_heading = "## Files"
dirs_heading = "## Directories"

[[targets]]
name = "api"
root = "src"
include = ["**/*"]
template = "templates/page.md"
formatters = ["title", "trailingNewline"]

[[targets.extract]]
tag = "docs"
strip_comment_prefix = true
"###;

const SAMPLE_TEMPLATE: &str = "%content%\n";

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = TagdocCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Build { dry_run, watch }) => run_build(&args, *dry_run, *watch),
		Some(Commands::Check { diff, format }) => run_check(&args, *diff, *format),
		Some(Commands::Index {
			dir,
			recursive,
			flatten,
			plain,
			excerpt,
		}) => {
			let flags = IndexFlags {
				recursive: *recursive,
				flatten: *flatten,
				plain: *plain,
				excerpt: *excerpt,
			};
			run_index(&args, dir, &flags)
		}
		None => {
			eprintln!("No subcommand specified. Run `tagdoc --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<tagdoc_core::TagdocError>() {
			Ok(tagdoc_err) => {
				let report: miette::Report = (*tagdoc_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Log to stderr. `TAGDOC_LOG` wins over the `--verbose` default.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose {
		"tagdoc_core=debug,tagdoc=debug"
	} else {
		"warn"
	};
	let filter =
		EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.without_time()
		.init();
}

fn resolve_root(args: &TagdocCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_init(args: &TagdocCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config_path = root.join(CONFIG_FILE_CANDIDATES[0]);
	let template_path = root.join("templates").join("page.md");

	let existing_config = TagdocConfig::resolve_path(&root);
	if let Some(existing) = &existing_config {
		println!("Config file already exists: {}", existing.display());
	} else {
		std::fs::write(&config_path, SAMPLE_CONFIG)?;
		println!("Created {}", CONFIG_FILE_CANDIDATES[0]);
	}

	if template_path.exists() {
		println!("Template file already exists: {}", template_path.display());
	} else {
		if let Some(parent) = template_path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&template_path, SAMPLE_TEMPLATE)?;
		println!("Created template file: {}", template_path.display());
	}

	if existing_config.is_none() {
		println!();
		println!("Next steps:");
		println!("  1. Point the `api` target in tagdoc.toml at your sources");
		println!("  2. Wrap documentation in your comments:");
		println!("     // <docs name=\"parse\">");
		println!("     // Parses the input.");
		println!("     // </docs>");
		println!("  3. Run `tagdoc build` to generate pages");
	}

	Ok(())
}

/// Load the project's build plan, or explain why there is nothing to do.
fn load_plan(root: &Path) -> Result<Option<BuildPlan>, Box<dyn std::error::Error>> {
	let Some(config) = TagdocConfig::load(root)? else {
		println!("No tagdoc.toml found. Run `tagdoc init` to create one.");
		return Ok(None);
	};

	if config.targets.is_empty() {
		println!("No targets configured in tagdoc.toml.");
		return Ok(None);
	}

	let plan = BuildPlan::from_config(root, &config)?;
	tracing::debug!(root = %root.display(), targets = plan.targets.len(), "resolved build plan");

	Ok(Some(plan))
}

fn coverage_ok(plan: &BuildPlan, report: &BuildReport) -> bool {
	!plan.mandatory_coverage || report.is_complete()
}

fn run_build(args: &TagdocCli, dry_run: bool, watch: bool) -> Result<(), Box<dyn std::error::Error>> {
	let covered = run_build_once(args, dry_run)?;

	if !watch || dry_run {
		if !covered {
			process::exit(1);
		}
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_)
						| notify::EventKind::Create(_)
						| notify::EventKind::Remove(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rebuilding...");
		if let Err(e) = run_build_once(args, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Run a single build. Returns false when mandatory coverage is missing.
fn run_build_once(args: &TagdocCli, dry_run: bool) -> Result<bool, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let Some(plan) = load_plan(&root)? else {
		return Ok(true);
	};
	let report = compute_outputs(&plan);
	print_uncovered(&report, &root);

	if dry_run {
		let stale = check_outputs(&report);
		if stale.is_empty() {
			println!("All pages are already up to date.");
		} else {
			println!("Dry run: would write {} page(s):", stale.len());
			for entry in &stale {
				println!("  {}", formatted_entry(&root, &entry.path));
			}
		}
		return Ok(coverage_ok(&plan, &report));
	}

	let summary = write_outputs(&report, &plan.index)?;

	if summary.written.is_empty() && summary.index.written.is_empty() {
		println!("All pages are already up to date.");
	} else {
		println!(
			"Wrote {} page(s) and {} index file(s).",
			summary.written.len(),
			summary.index.written.len()
		);

		if args.verbose {
			for path in summary.written.iter().chain(&summary.index.written) {
				println!("  {}", formatted_entry(&root, path));
			}
		}
	}

	println!(
		"Documented {}/{} source file(s).",
		report.success_count, report.total_count
	);

	Ok(coverage_ok(&plan, &report))
}

fn print_uncovered(report: &BuildReport, root: &Path) {
	if report.uncovered.is_empty() {
		return;
	}

	eprintln!(
		"{} {} source file(s) have no documentation:",
		colored!("warning:", yellow),
		report.uncovered.len()
	);
	for path in &report.uncovered {
		eprintln!("  {}", formatted_entry(root, path));
	}
}

#[derive(Serialize)]
struct CheckOutput {
	ok: bool,
	stale: Vec<String>,
	undocumented: Vec<String>,
	documented: usize,
	total: usize,
}

fn run_check(
	args: &TagdocCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let Some(plan) = load_plan(&root)? else {
		return Ok(());
	};
	let report = compute_outputs(&plan);
	let stale = check_outputs(&report);
	let undocumented: &[PathBuf] = if plan.mandatory_coverage {
		&report.uncovered
	} else {
		&[]
	};
	let ok = stale.is_empty() && undocumented.is_empty();

	match format {
		OutputFormat::Json => {
			let output = CheckOutput {
				ok,
				stale: stale
					.iter()
					.map(|entry| formatted_entry(&root, &entry.path))
					.collect(),
				undocumented: undocumented
					.iter()
					.map(|path| formatted_entry(&root, path))
					.collect(),
				documented: report.success_count,
				total: report.total_count,
			};
			println!("{}", serde_json::to_string(&output)?);
		}
		OutputFormat::Text => {
			if !plan.mandatory_coverage {
				print_uncovered(&report, &root);
			}

			if ok {
				println!("Check passed: all pages are up to date.");
			} else {
				eprintln!("Check failed.");
				eprintln!("  stale pages: {}", stale.len());
				if plan.mandatory_coverage {
					eprintln!("  undocumented files: {}", undocumented.len());
				}

				if !stale.is_empty() {
					eprintln!();
					eprintln!("Stale pages:");
					for entry in &stale {
						let status = if entry.current.is_some() {
							"outdated"
						} else {
							"missing"
						};
						eprintln!("  {} [{status}]", formatted_entry(&root, &entry.path));

						if show_diff {
							print_diff(entry.current.as_deref().unwrap_or_default(), &entry.expected);
						}
					}
				}

				if !undocumented.is_empty() {
					eprintln!();
					eprintln!("Undocumented files:");
					for path in undocumented {
						eprintln!("  {}", formatted_entry(&root, path));
					}
				}

				eprintln!();
				eprintln!("{}", check_summary(stale.len(), undocumented.len()));
			}
		}
	}

	if !ok {
		process::exit(1);
	}

	Ok(())
}

fn check_summary(stale: usize, undocumented: usize) -> String {
	let mut parts = Vec::new();
	if stale > 0 {
		parts.push(format!("{stale} page(s) are out of date"));
	}
	if undocumented > 0 {
		parts.push(format!("{undocumented} source file(s) have no documentation"));
	}
	format!("{}. Run `tagdoc build` to regenerate pages.", parts.join(" and "))
}

struct IndexFlags {
	recursive: bool,
	flatten: bool,
	plain: bool,
	excerpt: Option<usize>,
}

fn run_index(args: &TagdocCli, dir: &Path, flags: &IndexFlags) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let dir = root.join(dir);
	if !dir.is_dir() {
		return Err(format!("directory not found: {}", dir.display()).into());
	}

	let mut options = match TagdocConfig::load(&root)? {
		Some(config) => config.index.to_options()?,
		None => {
			IndexOptions {
				only_docs: true,
				sort: true,
				..IndexOptions::default()
			}
		}
	};
	options.recursive |= flags.recursive;
	options.flatten |= flags.flatten;
	if flags.plain {
		options.link_style = LinkStyle::Plain;
	}
	if let Some(length) = flags.excerpt {
		options.excerpt = Some(ExcerptOptions {
			length,
			..ExcerptOptions::default()
		});
	}

	let report = process_index_tree(&dir, &options)?;

	if report.written.is_empty() {
		println!("All index files are already up to date.");
	} else {
		println!("Wrote {} index file(s).", report.written.len());
	}

	if args.verbose {
		for path in &report.written {
			println!("  {}", formatted_entry(&root, path));
		}
		for path in &report.skipped {
			println!("  skipped {} (nothing to list)", formatted_entry(&root, path));
		}
	}

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}
