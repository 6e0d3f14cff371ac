use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use crate::TagdocError;
use crate::TagdocResult;
use crate::config::ExtractConfig;
use crate::config::TagdocConfig;
use crate::discovery::DiscoveryOptions;
use crate::discovery::discover_sources;
use crate::extract::Extraction;
use crate::extract::Fragment;
use crate::formatters::Formatter;
use crate::formatters::apply_formatters;
use crate::index::IndexOptions;
use crate::index::INDEX_FILE_NAME;
use crate::index::IndexReport;
use crate::index::formatted_entry;
use crate::index::process_index_tree;
use crate::merge::MergeOptions;
use crate::merge::merge;

/// Extension given to every generated page.
pub const OUTPUT_EXTENSION: &str = "md";

/// A fully resolved target: absolute paths and compiled extractions.
#[derive(Debug, Clone)]
pub struct Target {
	pub name: String,
	pub root: PathBuf,
	pub discovery: DiscoveryOptions,
	pub output_dir: PathBuf,
	pub template: Option<PathBuf>,
	pub extractions: Vec<Extraction>,
	pub formatters: Vec<Formatter>,
	pub create_index_file: bool,
}

impl Target {
	/// Every placeholder this target's extractions fill.
	pub fn placeholders(&self) -> Vec<String> {
		let mut placeholders: Vec<String> = Vec::new();
		for extraction in &self.extractions {
			if !placeholders.contains(&extraction.placeholder) {
				placeholders.push(extraction.placeholder.clone());
			}
		}
		placeholders
	}
}

/// Everything the pipeline needs, resolved against a project root.
#[derive(Debug, Clone)]
pub struct BuildPlan {
	pub root: PathBuf,
	pub targets: Vec<Target>,
	pub merge: MergeOptions,
	pub index: IndexOptions,
	pub mandatory_coverage: bool,
}

impl BuildPlan {
	/// Resolve a loaded config against `root`.
	pub fn from_config(root: &Path, config: &TagdocConfig) -> TagdocResult<Self> {
		let output_root = root.join(&config.output);
		let mut targets = Vec::with_capacity(config.targets.len());

		for target in &config.targets {
			let output_dir = target
				.output
				.as_ref()
				.map_or_else(|| output_root.join(&target.name), |output| root.join(output));
			let mut discovery = DiscoveryOptions::new(&target.include, &target.exclude)?;
			discovery.disable_gitignore = config.disable_gitignore;
			discovery.skip_dirs = vec![output_root.clone(), output_dir.clone()];

			let extractions = target
				.extract
				.iter()
				.map(ExtractConfig::to_extraction)
				.collect::<TagdocResult<Vec<_>>>()?;

			targets.push(Target {
				name: target.name.clone(),
				root: root.join(&target.root),
				discovery,
				output_dir,
				template: target.template.as_ref().map(|template| root.join(template)),
				extractions,
				formatters: target.formatters.clone(),
				create_index_file: target
					.create_index_file
					.unwrap_or(config.index.create_index_file),
			});
		}

		Ok(Self {
			root: root.to_path_buf(),
			targets,
			merge: config.merge.clone(),
			index: config.index.to_options()?,
			mandatory_coverage: config.mandatory_coverage,
		})
	}

	/// Load the discovered config at `root`, or an empty plan without one.
	pub fn load(root: &Path) -> TagdocResult<Self> {
		let config = TagdocConfig::load(root)?.unwrap_or_default();
		Self::from_config(root, &config)
	}
}

/// One generated page, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRecord {
	pub content: String,
	pub output_directory: PathBuf,
	pub file_name: String,
	/// The source path relative to the project root, with `/` separators.
	pub source_label: String,
}

impl OutputRecord {
	pub fn path(&self) -> PathBuf {
		self.output_directory.join(&self.file_name)
	}
}

/// The folded result of a pipeline run.
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
	pub outputs: Vec<OutputRecord>,
	/// Files that produced a page.
	pub success_count: usize,
	/// Files that were attempted.
	pub total_count: usize,
	/// Human-readable processing log, one line per file or failure.
	pub log_lines: Vec<String>,
	/// Source files without any documentation block.
	pub uncovered: Vec<PathBuf>,
	/// Output roots that should receive index listings.
	pub index_roots: Vec<PathBuf>,
}

impl BuildReport {
	/// True when every discovered source file produced documentation.
	pub fn is_complete(&self) -> bool {
		self.uncovered.is_empty()
	}

	fn log(&mut self, line: String) {
		tracing::info!("{line}");
		self.log_lines.push(line);
	}

	fn warn(&mut self, line: String) {
		tracing::warn!("{line}");
		self.log_lines.push(line);
	}
}

/// A generated page whose on-disk content differs from what would be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleOutput {
	pub path: PathBuf,
	/// Current content, or `None` when the page does not exist yet.
	pub current: Option<String>,
	pub expected: String,
}

/// Summary of a write pass.
#[derive(Debug, Clone, Default)]
pub struct WriteSummary {
	pub written: Vec<PathBuf>,
	pub unchanged: Vec<PathBuf>,
	pub index: IndexReport,
}

/// Run every target and collect the pages it would produce. Nothing is
/// written; failures are logged and counted rather than returned.
pub fn compute_outputs(plan: &BuildPlan) -> BuildReport {
	plan.targets
		.iter()
		.fold(BuildReport::default(), |report, target| process_target(report, target, plan))
}

fn process_target(report: BuildReport, target: &Target, plan: &BuildPlan) -> BuildReport {
	let mut report = report;

	let files = match discover_sources(&target.root, &target.discovery) {
		Ok(files) => files,
		Err(e) => {
			report.warn(format!("[{}] unable to discover sources: {e}", target.name));
			return report;
		}
	};

	let template = match load_template(target) {
		Ok(template) => template,
		Err(e) => {
			report.total_count += files.len();
			report.warn(format!("[{}] {e}", target.name));
			return report;
		}
	};

	tracing::debug!(target = %target.name, files = files.len(), "processing target");

	if target.create_index_file && !report.index_roots.contains(&target.output_dir) {
		report.index_roots.push(target.output_dir.clone());
	}

	files.iter().fold(report, |report, file| {
		process_file(report, file, target, &template, plan)
	})
}

fn process_file(
	report: BuildReport,
	file: &Path,
	target: &Target,
	template: &str,
	plan: &BuildPlan,
) -> BuildReport {
	let mut report = report;
	report.total_count += 1;
	let source_label = formatted_entry(&plan.root, file);

	let text = match read_source(file) {
		Ok(text) => text,
		Err(e) => {
			report.warn(format!("[{}] {source_label}: {e}", target.name));
			return report;
		}
	};

	let fragments = match extract_all(&text, &target.extractions) {
		Ok(fragments) => fragments,
		Err(e) => {
			if e.is_no_content() {
				report.uncovered.push(file.to_path_buf());
			}
			report.warn(format!("[{}] {source_label}: {e}", target.name));
			return report;
		}
	};

	if fragments.is_empty() {
		report.uncovered.push(file.to_path_buf());
		report.log(format!("[{}] {source_label}: no documentation found", target.name));
		return report;
	}

	let merged = merge(template, &fragments, &target.placeholders(), &plan.merge);
	let content = apply_formatters(&merged, Path::new(&source_label), &target.formatters);
	let record = output_record(file, target, content, source_label);

	if shadowed_by_index(&record, target, &plan.index) {
		let error = TagdocError::IndexCollision {
			path: formatted_entry(&plan.root, &record.path()),
		};
		report.warn(format!("[{}] {}: {error}", target.name, record.source_label));
		return report;
	}

	report.success_count += 1;
	report.log(format!(
		"[{}] {} -> {}",
		target.name,
		record.source_label,
		formatted_entry(&plan.root, &record.path())
	));
	report.outputs.push(record);
	report
}

/// Run every extraction over `text`. An optional extraction that matches
/// nothing is skipped; a required one fails the file.
pub fn extract_all(text: &str, extractions: &[Extraction]) -> TagdocResult<Vec<Fragment>> {
	let mut fragments = Vec::new();

	for extraction in extractions {
		match extraction.run(text) {
			Ok(found) => fragments.extend(found),
			Err(e) if !e.is_fatal() => {
				tracing::debug!(method = %extraction.method, "no content");
			}
			Err(e) => return Err(e),
		}
	}

	Ok(fragments)
}

fn read_source(file: &Path) -> TagdocResult<String> {
	std::fs::read_to_string(file).map_err(|_| {
		TagdocError::SourceFileNotFound {
			path: file.display().to_string(),
		}
	})
}

/// Load a target's template, or build one that lists each placeholder on its
/// own when the target has none.
pub fn load_template(target: &Target) -> TagdocResult<String> {
	match &target.template {
		Some(path) => {
			std::fs::read_to_string(path).map_err(|_| {
				TagdocError::TemplateNotFound {
					path: path.display().to_string(),
				}
			})
		}
		None => Ok(format!("{}\n", target.placeholders().join("\n\n"))),
	}
}

fn output_record(file: &Path, target: &Target, content: String, source_label: String) -> OutputRecord {
	let relative = file.strip_prefix(&target.root).unwrap_or(file);
	let output_directory = relative
		.parent()
		.map_or_else(|| target.output_dir.clone(), |parent| target.output_dir.join(parent));
	let file_name = relative
		.with_extension(OUTPUT_EXTENSION)
		.file_name()
		.map(|name| name.to_string_lossy().into_owned())
		.unwrap_or_default();

	OutputRecord {
		content,
		output_directory,
		file_name,
		source_label,
	}
}

/// Whether the index pass would overwrite this page with a listing.
fn shadowed_by_index(record: &OutputRecord, target: &Target, index: &IndexOptions) -> bool {
	target.create_index_file
		&& record.file_name == INDEX_FILE_NAME
		&& (index.recursive || record.output_directory == target.output_dir)
}

/// Compare computed pages with what is on disk.
pub fn check_outputs(report: &BuildReport) -> Vec<StaleOutput> {
	report
		.outputs
		.iter()
		.filter_map(|record| {
			let path = record.path();
			let current = std::fs::read_to_string(&path).ok();
			if current.as_deref() == Some(record.content.as_str()) {
				return None;
			}

			Some(StaleOutput {
				path,
				current,
				expected: record.content.clone(),
			})
		})
		.collect()
}

/// Write every changed page to disk, then regenerate index listings for the
/// output roots that asked for them.
pub fn write_outputs(report: &BuildReport, index: &IndexOptions) -> TagdocResult<WriteSummary> {
	let mut summary = WriteSummary::default();

	for record in &report.outputs {
		let path = record.path();
		if std::fs::read_to_string(&path).ok().as_deref() == Some(record.content.as_str()) {
			summary.unchanged.push(path);
			continue;
		}

		std::fs::create_dir_all(&record.output_directory)?;
		std::fs::write(&path, &record.content)?;
		summary.written.push(path);
	}

	for root in &report.index_roots {
		if !root.is_dir() {
			continue;
		}

		let index_report = process_index_tree(root, index)?;
		summary.index.written.extend(index_report.written);
		summary.index.unchanged.extend(index_report.unchanged);
		summary.index.skipped.extend(index_report.skipped);
	}

	Ok(summary)
}
