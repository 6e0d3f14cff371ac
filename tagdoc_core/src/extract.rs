use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::TagdocError;
use crate::TagdocResult;

/// Placeholder used when an extraction does not name its own.
pub const DEFAULT_PLACEHOLDER: &str = "%content%";

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W+").expect("valid regex"));
static ATTRIBUTE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r#"(\w+)="([^"]*)""#).expect("valid regex"));

/// Attribute mapping parsed from an opening tag. Sorted so that rendering is
/// stable regardless of the order attributes were written in.
pub type Attributes = BTreeMap<String, String>;

/// A caller supplied extraction function. It receives the full text and
/// returns every body it found.
pub type ExtractCallback = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// One extracted body together with its attributes and the template
/// placeholder it is destined for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Fragment {
	/// The cleaned body text.
	pub content: String,
	/// Attributes parsed from the opening delimiter. Empty when there were
	/// none.
	pub attributes: Attributes,
	/// The literal placeholder in the template this fragment replaces.
	pub target_placeholder: String,
}

impl Fragment {
	pub fn new(content: impl Into<String>, target_placeholder: impl Into<String>) -> Self {
		Self {
			content: content.into(),
			attributes: Attributes::new(),
			target_placeholder: target_placeholder.into(),
		}
	}

	#[must_use]
	pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.insert(key.into(), value.into());
		self
	}
}

/// How regions are located inside a text blob.
#[derive(Clone)]
#[non_exhaustive]
pub enum ExtractMethod {
	/// `<name attr="value">body</name>` regions. The name is sanitized to word
	/// characters before use.
	Tag(String),
	/// Plain substring delimiters, e.g. `/**` and `*/`.
	Delimiters { start: String, end: String },
	/// A raw regular expression. The body is taken from the `body` named
	/// group, else the first group, else the whole match. A named `attrs`
	/// group is parsed for `key="value"` pairs.
	Pattern(String),
	/// A caller supplied function.
	Callback(ExtractCallback),
}

impl fmt::Debug for ExtractMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tag(name) => f.debug_tuple("Tag").field(name).finish(),
			Self::Delimiters { start, end } => {
				f.debug_struct("Delimiters")
					.field("start", start)
					.field("end", end)
					.finish()
			}
			Self::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
			Self::Callback(_) => f.write_str("Callback"),
		}
	}
}

impl fmt::Display for ExtractMethod {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Tag(name) => write!(f, "tag `<{name}>`"),
			Self::Delimiters { start, end } => write!(f, "delimiters `{start}`…`{end}`"),
			Self::Pattern(pattern) => write!(f, "pattern `{pattern}`"),
			Self::Callback(_) => f.write_str("callback"),
		}
	}
}

/// A configured extraction: what to look for, where the results go and
/// whether finding nothing should fail the file.
#[derive(Debug, Clone)]
pub struct Extraction {
	pub method: ExtractMethod,
	pub placeholder: String,
	/// When true an empty result is reported as a fatal
	/// [`TagdocError::NoContentFound`].
	pub required: bool,
	/// Remove a shared line comment prefix (`//`, ` * `, `#`, …) from bodies.
	pub strip_comment_prefix: bool,
}

impl Extraction {
	pub fn new(method: ExtractMethod) -> Self {
		Self {
			method,
			placeholder: DEFAULT_PLACEHOLDER.to_string(),
			required: false,
			strip_comment_prefix: false,
		}
	}

	pub fn tag(name: impl Into<String>) -> Self {
		Self::new(ExtractMethod::Tag(name.into()))
	}

	#[must_use]
	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = placeholder.into();
		self
	}

	#[must_use]
	pub fn required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	#[must_use]
	pub fn strip_comment_prefix(mut self, strip: bool) -> Self {
		self.strip_comment_prefix = strip;
		self
	}

	/// Run the extraction. An empty result is signalled as
	/// [`TagdocError::NoContentFound`] whose `fatal` flag mirrors
	/// [`Extraction::required`].
	pub fn run(&self, text: &str) -> TagdocResult<Vec<Fragment>> {
		let mut fragments = extract(text, &self.method, &self.placeholder)?;

		if fragments.is_empty() {
			return Err(TagdocError::NoContentFound {
				method: self.method.to_string(),
				fatal: self.required,
			});
		}

		if self.strip_comment_prefix {
			for fragment in &mut fragments {
				fragment.content = clean_body(&strip_shared_comment_prefix(&fragment.content));
			}
		}

		Ok(fragments)
	}
}

/// Pull every non-overlapping region matched by `method` out of `text`.
/// Returns an empty list when nothing matched.
pub fn extract(text: &str, method: &ExtractMethod, placeholder: &str) -> TagdocResult<Vec<Fragment>> {
	let fragments = match method {
		ExtractMethod::Tag(name) => {
			let pattern = tag_pattern(name)?;
			pattern
				.captures_iter(text)
				.map(|caps| {
					let open = caps.name("open").map_or("", |m| m.as_str());
					let body = caps.name("body").map_or("", |m| m.as_str());
					Fragment {
						content: clean_body(body),
						attributes: parse_attributes(open),
						target_placeholder: placeholder.to_string(),
					}
				})
				.collect()
		}
		ExtractMethod::Delimiters { start, end } => {
			if start.is_empty() || end.is_empty() {
				return Err(TagdocError::InvalidPattern {
					pattern: format!("{start}…{end}"),
					reason: "delimiters must not be empty".to_string(),
				});
			}

			find_delimited(text, start, end)
				.into_iter()
				.map(|body| Fragment::new(clean_body(body), placeholder))
				.collect()
		}
		ExtractMethod::Pattern(source) => {
			let pattern = Regex::new(source).map_err(|e| {
				TagdocError::InvalidPattern {
					pattern: source.clone(),
					reason: e.to_string(),
				}
			})?;
			pattern
				.captures_iter(text)
				.filter_map(|caps| {
					let body = caps
						.name("body")
						.or_else(|| caps.get(1))
						.or_else(|| caps.get(0))?;
					let attributes = caps
						.name("attrs")
						.map(|m| parse_attributes(m.as_str()))
						.unwrap_or_default();
					Some(Fragment {
						content: clean_body(body.as_str()),
						attributes,
						target_placeholder: placeholder.to_string(),
					})
				})
				.collect()
		}
		ExtractMethod::Callback(callback) => {
			callback(text)
				.iter()
				.map(|body| Fragment::new(clean_body(body), placeholder))
				.collect()
		}
	};

	Ok(fragments)
}

/// Strip every non-word character from a tag name.
pub fn sanitize_tag_name(name: &str) -> TagdocResult<String> {
	let sanitized = NON_WORD.replace_all(name, "").into_owned();

	if sanitized.is_empty() {
		return Err(TagdocError::InvalidTag(name.to_string()));
	}

	Ok(sanitized)
}

/// Build the non-greedy, newline spanning pattern for `<name ...>body</name>`.
/// Quoted attribute values may contain `>`.
pub fn tag_pattern(name: &str) -> TagdocResult<Regex> {
	let name = sanitize_tag_name(name)?;
	let source = format!(r#"(?s)(?P<open><{name}(?:\s(?:[^>"]|"[^"]*")*)?>)(?P<body>.*?)</{name}\s*>"#);

	Regex::new(&source).map_err(|e| {
		TagdocError::InvalidPattern {
			pattern: source,
			reason: e.to_string(),
		}
	})
}

/// Collect every `key="value"` pair from an opening delimiter.
pub fn parse_attributes(open: &str) -> Attributes {
	ATTRIBUTE
		.captures_iter(open)
		.map(|caps| (caps[1].to_string(), caps[2].to_string()))
		.collect()
}

fn find_delimited<'a>(text: &'a str, start: &str, end: &str) -> Vec<&'a str> {
	let mut bodies = Vec::new();
	let mut search_from = 0;

	while search_from < text.len() {
		let Some(open_offset) = text[search_from..].find(start) else {
			break;
		};
		let body_start = search_from + open_offset + start.len();

		let Some(close_offset) = text[body_start..].find(end) else {
			break;
		};
		let body_end = body_start + close_offset;

		bodies.push(&text[body_start..body_end]);
		search_from = body_end + end.len();
	}

	bodies
}

/// Trim a captured body and collapse runs of blank lines into one. Lines
/// inside fenced code blocks are kept verbatim.
pub fn clean_body(raw: &str) -> String {
	let mut lines: Vec<&str> = Vec::new();
	let mut in_fence = false;
	let mut previous_blank = false;

	for line in raw.trim().lines() {
		let stripped = line.trim_start();
		if stripped.starts_with("```") || stripped.starts_with("~~~") {
			in_fence = !in_fence;
		}

		let blank = line.trim().is_empty();
		if blank && previous_blank && !in_fence {
			continue;
		}

		previous_blank = blank;
		lines.push(line);
	}

	lines.join("\n")
}

/// Line comment prefixes, longest first so `///` wins over `//`.
const COMMENT_PREFIXES: &[&str] = &["///", "//!", "//", "#", "*", "--", ";"];

/// Remove a comment prefix shared by every non-blank line. Content is
/// returned untouched when the lines do not agree on a prefix.
fn strip_shared_comment_prefix(content: &str) -> String {
	let first = content
		.lines()
		.map(str::trim_start)
		.find(|line| !line.is_empty())
		.unwrap_or_default();
	let Some(prefix) = COMMENT_PREFIXES.iter().find(|p| first.starts_with(**p)) else {
		return content.to_string();
	};

	let shared = content
		.lines()
		.map(str::trim_start)
		.filter(|line| !line.is_empty())
		.all(|line| line.starts_with(prefix));
	if !shared {
		return content.to_string();
	}

	content
		.lines()
		.map(|line| {
			let trimmed = line.trim_start();
			match trimmed.strip_prefix(prefix) {
				Some(rest) => rest.strip_prefix(' ').unwrap_or(rest),
				None => trimmed,
			}
		})
		.collect::<Vec<_>>()
		.join("\n")
}
