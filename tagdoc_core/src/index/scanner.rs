use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;

use super::INDEX_FILE_NAME;
use super::LinkStyle;
use super::MARKDOWN_EXTENSION;
use crate::TagdocResult;

/// Options for scanning a single directory.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
	/// How each entry's link is rendered.
	pub link_style: LinkStyle,
	/// Scan every subdirectory too and attach the results as
	/// [`DirectoryEntry::child_entries`].
	pub flatten: bool,
	/// Only list markdown files. Directories are always listed.
	pub only_docs: bool,
}

/// One immediate child of a scanned directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
	/// Absolute path of the file or directory.
	pub source_path: PathBuf,
	/// `name.md` for files, `name/` for directories.
	pub display_name: String,
	pub is_directory: bool,
	/// The entry rendered with the configured [`LinkStyle`], relative to the
	/// scanned directory.
	pub rendered_link: String,
	/// The scanned subtree. Only populated in flatten mode.
	pub child_entries: Option<Vec<DirectoryEntry>>,
}

impl DirectoryEntry {
	/// The entry's own file or directory name.
	pub fn file_name(&self) -> String {
		self.source_path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default()
	}

	/// Children of a flattened directory, or an empty slice.
	pub fn children(&self) -> &[DirectoryEntry] {
		self.child_entries.as_deref().unwrap_or_default()
	}
}

/// List the immediate children of `dir` in file name order.
///
/// Hidden entries, symlinks and the directory's own index artifact are
/// skipped. In flatten mode every subdirectory is scanned with the same
/// options and attached to its entry.
pub fn scan_directory(dir: &Path, options: &ScanOptions) -> TagdocResult<Vec<DirectoryEntry>> {
	let mut children = Vec::new();

	for entry in std::fs::read_dir(dir)? {
		let entry = entry?;
		let name = entry.file_name().to_string_lossy().into_owned();
		if name.starts_with('.') {
			continue;
		}

		let file_type = entry.file_type()?;
		if file_type.is_symlink() {
			tracing::debug!(path = %entry.path().display(), "skipping symlink");
			continue;
		}

		children.push((name, entry.path(), file_type.is_dir()));
	}

	children.sort_by(|a, b| a.0.cmp(&b.0));

	let mut entries = Vec::with_capacity(children.len());
	for (name, path, is_directory) in children {
		if is_directory {
			entries.push(directory_entry(&name, path, options)?);
		} else if name != INDEX_FILE_NAME && (!options.only_docs || is_markdown_name(&name)) {
			entries.push(file_entry(&name, path, options));
		}
	}

	Ok(entries)
}

fn file_entry(name: &str, path: PathBuf, options: &ScanOptions) -> DirectoryEntry {
	let display_name = markdown_display_name(name);
	let rendered_link = options.link_style.render(&display_name, name);

	DirectoryEntry {
		source_path: path,
		display_name,
		is_directory: false,
		rendered_link,
		child_entries: None,
	}
}

fn directory_entry(name: &str, path: PathBuf, options: &ScanOptions) -> TagdocResult<DirectoryEntry> {
	let display_name = format!("{name}/");
	let target = if has_index_file(&path) {
		format!("{name}/{INDEX_FILE_NAME}")
	} else {
		display_name.clone()
	};
	let rendered_link = options.link_style.render(&display_name, &target);
	let child_entries = if options.flatten {
		Some(scan_directory(&path, options)?)
	} else {
		None
	};

	Ok(DirectoryEntry {
		source_path: path,
		display_name,
		is_directory: true,
		rendered_link,
		child_entries,
	})
}

/// Whether `dir` already holds a generated index page.
pub fn has_index_file(dir: &Path) -> bool {
	dir.join(INDEX_FILE_NAME).is_file()
}

/// Append the markdown extension to `name` unless it already has it.
pub fn markdown_display_name(name: &str) -> String {
	let suffix = format!(".{MARKDOWN_EXTENSION}");
	if name.ends_with(&suffix) {
		name.to_string()
	} else {
		format!("{name}{suffix}")
	}
}

fn is_markdown_name(name: &str) -> bool {
	Path::new(name)
		.extension()
		.and_then(|ext| ext.to_str())
		.is_some_and(|ext| ext.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}

/// Express `path` relative to `parent` with `/` separators and no leading
/// separator. Paths outside `parent` are returned whole.
pub fn formatted_entry(parent: &Path, path: &Path) -> String {
	let relative = path.strip_prefix(parent).unwrap_or(path);

	relative
		.to_string_lossy()
		.replace('\\', "/")
		.trim_start_matches('/')
		.to_string()
}
