use serde::Deserialize;

use crate::extract::Fragment;

/// Default format for attribute lines. `{key}` and `{value}` are replaced
/// literally.
pub const DEFAULT_ATTRIBUTE_FORMAT: &str = "### *{key}*: {value}\n";
/// Default separator between fragments that share a placeholder.
pub const DEFAULT_DIVIDER: &str = "\n\n---\n\n";
/// Default text for placeholders that received no fragments.
pub const DEFAULT_FALLBACK: &str = "Not available.";

/// Controls how fragments are rendered into a template.
///
/// ```toml
/// [merge]
/// attribute_format = "**{key}**: {value}\n"
/// divider = "\n\n"
/// fallback = "_Nothing documented yet._"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MergeOptions {
	pub attribute_format: String,
	pub divider: String,
	pub fallback: String,
}

impl Default for MergeOptions {
	fn default() -> Self {
		Self {
			attribute_format: DEFAULT_ATTRIBUTE_FORMAT.to_string(),
			divider: DEFAULT_DIVIDER.to_string(),
			fallback: DEFAULT_FALLBACK.to_string(),
		}
	}
}

/// Group fragments by their placeholder, keeping the order in which each
/// placeholder was first seen.
pub fn group_by_placeholder(fragments: &[Fragment]) -> Vec<(&str, Vec<&Fragment>)> {
	let mut groups: Vec<(&str, Vec<&Fragment>)> = Vec::new();

	for fragment in fragments {
		let placeholder = fragment.target_placeholder.as_str();
		match groups.iter_mut().find(|(name, _)| *name == placeholder) {
			Some((_, members)) => members.push(fragment),
			None => groups.push((placeholder, vec![fragment])),
		}
	}

	groups
}

/// Render one fragment: its attribute lines followed by its content.
pub fn render_fragment(fragment: &Fragment, options: &MergeOptions) -> String {
	let mut rendered = String::new();

	for (key, value) in &fragment.attributes {
		rendered.push_str(
			&options
				.attribute_format
				.replace("{key}", key)
				.replace("{value}", value),
		);
	}

	rendered.push_str(&fragment.content);
	rendered
}

/// Render a placeholder group, joining fragments with the divider.
pub fn render_group(fragments: &[&Fragment], options: &MergeOptions) -> String {
	fragments
		.iter()
		.map(|fragment| render_fragment(fragment, options))
		.collect::<Vec<_>>()
		.join(&options.divider)
}

/// Replace placeholders in one scan over `template`. Text produced by a
/// replacement is never scanned again, so a fragment that mentions another
/// placeholder keeps it verbatim. The longest placeholder wins when two start
/// at the same position.
pub fn substitute(template: &str, replacements: &[(&str, &str)]) -> String {
	let mut result = String::with_capacity(template.len());
	let mut rest = template;

	loop {
		let next = replacements
			.iter()
			.filter(|(placeholder, _)| !placeholder.is_empty())
			.filter_map(|(placeholder, block)| {
				rest.find(placeholder).map(|at| (at, *placeholder, *block))
			})
			.min_by(|a, b| a.0.cmp(&b.0).then(b.1.len().cmp(&a.1.len())));

		let Some((at, placeholder, block)) = next else {
			result.push_str(rest);
			return result;
		};

		result.push_str(&rest[..at]);
		result.push_str(block);
		rest = &rest[at + placeholder.len()..];
	}
}

fn fragment_blocks(fragments: &[Fragment], options: &MergeOptions) -> Vec<(String, String)> {
	group_by_placeholder(fragments)
		.into_iter()
		.map(|(placeholder, members)| (placeholder.to_string(), render_group(&members, options)))
		.collect()
}

fn fallback_blocks<'a>(
	placeholders: &'a [String],
	fragments: &[Fragment],
	options: &'a MergeOptions,
) -> Vec<(&'a str, &'a str)> {
	placeholders
		.iter()
		.map(String::as_str)
		.filter(|placeholder| {
			!fragments
				.iter()
				.any(|fragment| fragment.target_placeholder == *placeholder)
		})
		.map(|placeholder| (placeholder, options.fallback.as_str()))
		.collect()
}

/// Splice fragments into `template`. Every occurrence of a placeholder is
/// replaced with the same rendered block. Placeholders with no fragments are
/// left untouched; see [`apply_fallbacks`].
pub fn merge_fragments(template: &str, fragments: &[Fragment], options: &MergeOptions) -> String {
	let blocks = fragment_blocks(fragments, options);
	let replacements: Vec<(&str, &str)> = blocks
		.iter()
		.map(|(placeholder, block)| (placeholder.as_str(), block.as_str()))
		.collect();

	substitute(template, &replacements)
}

/// Replace each known placeholder that received no fragments with the
/// fallback text.
pub fn apply_fallbacks(
	content: &str,
	placeholders: &[String],
	fragments: &[Fragment],
	options: &MergeOptions,
) -> String {
	substitute(content, &fallback_blocks(placeholders, fragments, options))
}

/// Merge fragments and fill fallbacks in a single scan of `template`.
pub fn merge(
	template: &str,
	fragments: &[Fragment],
	placeholders: &[String],
	options: &MergeOptions,
) -> String {
	let blocks = fragment_blocks(fragments, options);
	let replacements: Vec<(&str, &str)> = blocks
		.iter()
		.map(|(placeholder, block)| (placeholder.as_str(), block.as_str()))
		.chain(fallback_blocks(placeholders, fragments, options))
		.collect();

	substitute(template, &replacements)
}
