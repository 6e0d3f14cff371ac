use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// A post-merge text transform. Formatters run in the order they are
/// configured and receive the merged page together with its source path.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
#[non_exhaustive]
pub enum Formatter {
	/// Remove leading and trailing whitespace.
	Trim,
	/// Collapse runs of blank lines into a single blank line.
	CollapseBlankLines,
	/// Ensure the page ends with exactly one newline.
	TrailingNewline,
	/// Prepend `# <file stem>` unless the page already starts with a
	/// top-level heading.
	Title,
	/// Append `_Source: <path>_`.
	SourceNote,
}

impl fmt::Display for Formatter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let name = match self {
			Self::Trim => "trim",
			Self::CollapseBlankLines => "collapseBlankLines",
			Self::TrailingNewline => "trailingNewline",
			Self::Title => "title",
			Self::SourceNote => "sourceNote",
		};
		f.write_str(name)
	}
}

/// Apply a sequence of formatters to content.
pub fn apply_formatters(content: &str, source: &Path, formatters: &[Formatter]) -> String {
	let mut result = content.to_string();

	for formatter in formatters {
		result = apply_formatter(&result, source, *formatter);
	}

	result
}

fn apply_formatter(content: &str, source: &Path, formatter: Formatter) -> String {
	match formatter {
		Formatter::Trim => content.trim().to_string(),
		Formatter::CollapseBlankLines => {
			let mut lines: Vec<&str> = Vec::new();
			for line in content.lines() {
				let blank = line.trim().is_empty();
				if blank && lines.last().is_some_and(|last| last.trim().is_empty()) {
					continue;
				}
				lines.push(line);
			}
			let mut collapsed = lines.join("\n");
			if content.ends_with('\n') {
				collapsed.push('\n');
			}
			collapsed
		}
		Formatter::TrailingNewline => format!("{}\n", content.trim_end()),
		Formatter::Title => {
			let has_title = content
				.lines()
				.find(|line| !line.trim().is_empty())
				.is_some_and(|line| line.starts_with("# "));
			if has_title {
				return content.to_string();
			}

			let stem = source
				.file_stem()
				.map(|stem| stem.to_string_lossy().into_owned())
				.unwrap_or_default();
			format!("# {stem}\n\n{content}")
		}
		Formatter::SourceNote => {
			let path = source.to_string_lossy().replace('\\', "/");
			format!("{}\n\n_Source: {path}_\n", content.trim_end())
		}
	}
}
