use std::fmt;
use std::sync::Arc;

use super::DirectoryEntry;
use super::INDEX_FILE_NAME;
use super::LinkStyle;
use crate::excerpt::ExcerptOptions;
use crate::excerpt::build_excerpt;

/// Indentation added per level of flattened nesting.
pub const INDENT_UNIT: &str = "  ";

/// The values available to a custom list item renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingLine<'a> {
	pub display_name: &'a str,
	/// The resolved link for this entry in the configured style.
	pub link: &'a str,
	/// 1-indexed position of the entry in the listing.
	pub line_number: usize,
	pub excerpt: Option<&'a str>,
	/// Nesting depth in flatten mode. Indentation is added by the renderer.
	pub depth: usize,
}

/// A custom list item renderer.
#[derive(Clone)]
pub struct LineRenderer(Arc<dyn Fn(&ListingLine<'_>) -> String + Send + Sync>);

impl LineRenderer {
	pub fn new(render: impl Fn(&ListingLine<'_>) -> String + Send + Sync + 'static) -> Self {
		Self(Arc::new(render))
	}

	pub fn render(&self, line: &ListingLine<'_>) -> String {
		(self.0)(line)
	}
}

impl fmt::Debug for LineRenderer {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str("LineRenderer")
	}
}

#[derive(Debug, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct RenderOptions {
	pub link_style: LinkStyle,
	/// Render each entry's `child_entries` beneath it, indented.
	pub flatten: bool,
	/// Directory links point at the nested `index.md` the tree processor
	/// creates.
	pub recursive: bool,
	/// Partition entries into files then directories.
	pub sort: bool,
	pub files_heading: Option<String>,
	pub dirs_heading: Option<String>,
	pub excerpt: Option<ExcerptOptions>,
	pub line_renderer: Option<LineRenderer>,
}

/// Accumulator threaded through the entry loop. Each step takes the state by
/// value and returns the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderState {
	pub files_processed: usize,
	pub files_total: usize,
	pub dirs_processed: usize,
	pub dirs_total: usize,
	pub indent_level: usize,
	/// Excerpt of the entry currently being rendered. Cleared before each
	/// entry.
	pub excerpt: Option<String>,
	/// Number of list items emitted so far.
	pub line_number: usize,
	pub lines: Vec<String>,
}

impl RenderState {
	/// Initial state for a top-level listing.
	pub fn for_entries(entries: &[DirectoryEntry]) -> Self {
		let dirs_total = entries.iter().filter(|entry| entry.is_directory).count();

		Self {
			files_total: entries.len() - dirs_total,
			dirs_total,
			..Self::default()
		}
	}

	/// Join the accumulated lines into the listing body.
	pub fn finish(self) -> String {
		if self.lines.is_empty() {
			return String::new();
		}

		let mut body = self.lines.join("\n");
		body.push('\n');
		body
	}

	fn push_heading(&mut self, heading: &str) {
		if !self.lines.is_empty() {
			self.lines.push(String::new());
		}
		self.lines.push(heading.to_string());
		self.lines.push(String::new());
	}
}

/// Render a listing body for `entries`.
pub fn render_listing(entries: &[DirectoryEntry], options: &RenderOptions) -> String {
	let ordered = order_entries(entries, options.sort);
	let initial = RenderState::for_entries(entries);

	ordered
		.into_iter()
		.fold(initial, |state, entry| render_entry(state, entry, options))
		.finish()
}

/// Render one top-level entry and, in flatten mode, its whole subtree.
pub fn render_entry(state: RenderState, entry: &DirectoryEntry, options: &RenderOptions) -> RenderState {
	let mut state = state;
	state.excerpt = None;
	state.indent_level = 0;

	if entry.is_directory {
		if state.dirs_processed == 0 && state.dirs_total > 0 {
			if let Some(heading) = &options.dirs_heading {
				state.push_heading(heading);
			}
		}
		state.dirs_processed += 1;
	} else {
		if state.files_processed == 0 && state.files_total > 0 {
			if let Some(heading) = &options.files_heading {
				state.push_heading(heading);
			}
		}
		state.files_processed += 1;
	}

	let link = if entry.is_directory && (options.recursive || options.flatten) {
		options
			.link_style
			.render(&entry.display_name, &format!("{}/{INDEX_FILE_NAME}", entry.file_name()))
	} else {
		entry.rendered_link.clone()
	};

	state = push_line(state, entry, &link, options);

	if options.flatten {
		let parent = entry.file_name();
		for child in order_entries(entry.children(), options.sort) {
			state = render_descendant(state, child, &parent, 1, options);
		}
	}

	state
}

fn render_descendant(
	state: RenderState,
	entry: &DirectoryEntry,
	parent: &str,
	depth: usize,
	options: &RenderOptions,
) -> RenderState {
	let mut state = state;
	state.excerpt = None;
	state.indent_level = depth;

	let qualified = format!("{parent}/{}", entry.file_name());
	let target = if entry.is_directory {
		format!("{qualified}/{INDEX_FILE_NAME}")
	} else {
		qualified.clone()
	};
	let link = options.link_style.render(&entry.display_name, &target);

	state = push_line(state, entry, &link, options);

	for child in order_entries(entry.children(), options.sort) {
		state = render_descendant(state, child, &qualified, depth + 1, options);
	}

	state
}

fn push_line(state: RenderState, entry: &DirectoryEntry, link: &str, options: &RenderOptions) -> RenderState {
	let mut state = state;

	if !entry.is_directory {
		if let Some(excerpt_options) = &options.excerpt {
			state.excerpt = read_excerpt(entry, excerpt_options);
		}
	}

	state.line_number += 1;
	let item = match &options.line_renderer {
		Some(renderer) => {
			renderer.render(&ListingLine {
				display_name: &entry.display_name,
				link,
				line_number: state.line_number,
				excerpt: state.excerpt.as_deref(),
				depth: state.indent_level,
			})
		}
		None => default_item(link, state.excerpt.as_deref()),
	};

	let indent = INDENT_UNIT.repeat(state.indent_level);
	state.lines.push(format!("{indent}{item}"));
	state
}

fn default_item(link: &str, excerpt: Option<&str>) -> String {
	match excerpt {
		Some(excerpt) => format!("- {link} - {excerpt}"),
		None => format!("- {link}"),
	}
}

fn read_excerpt(entry: &DirectoryEntry, options: &ExcerptOptions) -> Option<String> {
	match std::fs::read_to_string(&entry.source_path) {
		Ok(content) => build_excerpt(&content, options),
		Err(e) => {
			tracing::warn!(path = %entry.source_path.display(), error = %e, "unable to read file for excerpt");
			None
		}
	}
}

/// Listing order: as scanned, or files before directories when sorting.
pub fn order_entries(entries: &[DirectoryEntry], sort: bool) -> Vec<&DirectoryEntry> {
	if !sort {
		return entries.iter().collect();
	}

	let (files, dirs): (Vec<&DirectoryEntry>, Vec<&DirectoryEntry>) =
		entries.iter().partition(|entry| !entry.is_directory);
	files.into_iter().chain(dirs).collect()
}
