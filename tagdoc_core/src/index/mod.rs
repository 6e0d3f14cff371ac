//! Directory index generation.
//!
//! The [`scanner`] lists one directory, the [`renderer`] turns the listing
//! into markdown and the [`processor`] drives both over a whole tree,
//! writing an `index.md` into every non-empty directory.

use std::fmt;

use serde::Deserialize;

pub use processor::*;
pub use renderer::*;
pub use scanner::*;

pub mod processor;
pub mod renderer;
pub mod scanner;

use crate::excerpt::ExcerptOptions;

/// File name of the generated index artifact.
pub const INDEX_FILE_NAME: &str = "index.md";
/// Extension carried by every listed file's display name.
pub const MARKDOWN_EXTENSION: &str = "md";

/// How a listed entry is written.
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LinkStyle {
	/// The display label as bare text, e.g. `sub/` or `notes.txt.md`. The
	/// link target is dropped.
	Plain,
	/// A markdown hyperlink, e.g. `[sub/](sub/index.md)`.
	#[default]
	Markdown,
}

impl LinkStyle {
	pub fn render(self, label: &str, target: &str) -> String {
		match self {
			Self::Plain => label.to_string(),
			Self::Markdown => format!("[{label}]({target})"),
		}
	}
}

impl fmt::Display for LinkStyle {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Plain => f.write_str("plain"),
			Self::Markdown => f.write_str("markdown"),
		}
	}
}

/// Everything needed to index a directory tree.
#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct IndexOptions {
	pub link_style: LinkStyle,
	/// Render each directory's whole subtree as one indented list.
	pub flatten: bool,
	/// Index every subdirectory first, bottom-up.
	pub recursive: bool,
	/// Only list markdown files.
	pub only_docs: bool,
	/// List files before directories.
	pub sort: bool,
	pub files_heading: Option<String>,
	pub dirs_heading: Option<String>,
	/// Title written above the listing. `{name}` is replaced with the
	/// directory name.
	pub title: Option<String>,
	/// Append an excerpt of each file after its link.
	pub excerpt: Option<ExcerptOptions>,
	/// Replaces the default `- link - excerpt` list item.
	pub line_renderer: Option<LineRenderer>,
}

impl IndexOptions {
	pub fn scan_options(&self) -> ScanOptions {
		ScanOptions {
			link_style: self.link_style,
			flatten: self.flatten,
			only_docs: self.only_docs,
		}
	}

	pub fn render_options(&self) -> RenderOptions {
		RenderOptions {
			link_style: self.link_style,
			flatten: self.flatten,
			recursive: self.recursive,
			sort: self.sort,
			files_heading: self.files_heading.clone(),
			dirs_heading: self.dirs_heading.clone(),
			excerpt: self.excerpt.clone(),
			line_renderer: self.line_renderer.clone(),
		}
	}
}
