use std::path::Path;
use std::path::PathBuf;

use super::DirectoryEntry;
use super::INDEX_FILE_NAME;
use super::IndexOptions;
use super::RenderOptions;
use super::render_listing;
use super::scan_directory;
use crate::TagdocResult;

/// What an index run did to the tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexReport {
	/// Index artifacts whose content changed or that were created.
	pub written: Vec<PathBuf>,
	/// Index artifacts that already held the expected content.
	pub unchanged: Vec<PathBuf>,
	/// Directories without any listable entries.
	pub skipped: Vec<PathBuf>,
}

impl IndexReport {
	/// Every index artifact that exists after the run.
	pub fn artifacts(&self) -> impl Iterator<Item = &PathBuf> {
		self.written.iter().chain(&self.unchanged)
	}
}

/// Write an `index.md` listing into `dir` and, in recursive mode, into every
/// subdirectory beneath it.
///
/// Subdirectories are processed before their parent is scanned for the final
/// time, so the parent's links point at the freshly written nested indexes.
/// Running this twice over an unchanged tree produces identical files.
pub fn process_index_tree(dir: &Path, options: &IndexOptions) -> TagdocResult<IndexReport> {
	process_directory(dir, options, IndexReport::default())
}

fn process_directory(dir: &Path, options: &IndexOptions, report: IndexReport) -> TagdocResult<IndexReport> {
	let mut report = report;
	let scan_options = options.scan_options();
	let mut entries = scan_directory(dir, &scan_options)?;

	if entries.is_empty() {
		tracing::debug!(dir = %dir.display(), "no entries, skipping index");
		report.skipped.push(dir.to_path_buf());
		return Ok(report);
	}

	if options.recursive {
		for child in entries.iter().filter(|entry| entry.is_directory) {
			report = process_directory(&child.source_path, options, report)?;
		}
		entries = scan_directory(dir, &scan_options)?;
	}

	let content = render_index(dir, &entries, options);
	let index_path = dir.join(INDEX_FILE_NAME);
	let existing = std::fs::read_to_string(&index_path).ok();

	if existing.as_deref() == Some(content.as_str()) {
		tracing::debug!(path = %index_path.display(), "index unchanged");
		report.unchanged.push(index_path);
	} else {
		std::fs::write(&index_path, &content)?;
		tracing::info!(path = %index_path.display(), entries = entries.len(), "wrote index");
		report.written.push(index_path);
	}

	Ok(report)
}

/// Render the full index artifact for `dir`: optional title plus listing.
///
/// `entries` must come from a scan taken after nested indexes were written,
/// so each directory link already points at `index.md` exactly when one
/// exists. Directories skipped as empty keep their bare link.
pub fn render_index(dir: &Path, entries: &[DirectoryEntry], options: &IndexOptions) -> String {
	let render_options = RenderOptions {
		recursive: false,
		..options.render_options()
	};
	let body = render_listing(entries, &render_options);

	match &options.title {
		Some(title) => {
			let name = dir
				.file_name()
				.map(|name| name.to_string_lossy().into_owned())
				.unwrap_or_default();
			format!("{}\n\n{body}", title.replace("{name}", &name))
		}
		None => body,
	}
}
