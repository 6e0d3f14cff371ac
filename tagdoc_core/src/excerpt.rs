use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

static HEADING_LINE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"(?m)^[ \t]*#{1,6}(?:[ \t].*)?$").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static SENTENCE: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"[^.!?]*\w[^.!?]*[.!?]*").expect("valid regex"));

/// Default excerpt length in characters.
pub const DEFAULT_EXCERPT_LENGTH: usize = 120;

/// ```toml
/// [index.excerpt]
/// length = 80
/// first_sentence = true
/// ellipsis = true
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExcerptOptions {
	/// Maximum length in characters before the ellipsis.
	pub length: usize,
	/// Keep only the first sentence.
	pub first_sentence: bool,
	/// End the excerpt with `...` instead of a period.
	pub ellipsis: bool,
}

impl Default for ExcerptOptions {
	fn default() -> Self {
		Self {
			length: DEFAULT_EXCERPT_LENGTH,
			first_sentence: true,
			ellipsis: false,
		}
	}
}

/// Derive a short summary from markdown text. Returns `None` when the text
/// has no sentence content once headings are removed.
pub fn build_excerpt(text: &str, options: &ExcerptOptions) -> Option<String> {
	let without_headings = HEADING_LINE.replace_all(text, "");
	let flattened = WHITESPACE.replace_all(&without_headings, " ");

	let mut sentences = SENTENCE
		.find_iter(&flattened)
		.map(|m| m.as_str().trim())
		.filter(|sentence| !sentence.is_empty());

	let joined = if options.first_sentence {
		sentences.next()?.to_string()
	} else {
		let all: Vec<&str> = sentences.collect();
		if all.is_empty() {
			return None;
		}
		all.join(" ")
	};

	let mut excerpt = truncate_words(&joined, options.length);
	excerpt.truncate(excerpt.trim_end().len());
	if excerpt.is_empty() {
		return None;
	}

	if !excerpt.ends_with('.') {
		excerpt = excerpt
			.trim_end_matches(|c: char| c.is_ascii_punctuation() && c != ')' && c != '`')
			.trim_end()
			.to_string();
		excerpt.push('.');
	}

	if options.ellipsis {
		let kept = excerpt.trim_end_matches(['.', ' ']).len();
		excerpt.truncate(kept);
		excerpt.push_str("...");
	}

	Some(excerpt)
}

/// Cut `text` to at most `length` characters. A word cut in half is dropped
/// entirely unless it is the only word.
fn truncate_words(text: &str, length: usize) -> String {
	if text.chars().count() <= length {
		return text.to_string();
	}

	let cut = text
		.char_indices()
		.nth(length)
		.map_or(text.len(), |(index, _)| index);
	let head = &text[..cut];
	let next_is_word = text[cut..]
		.chars()
		.next()
		.is_some_and(char::is_alphanumeric);
	let last_is_word = head.chars().last().is_some_and(char::is_alphanumeric);

	if next_is_word && last_is_word {
		if let Some(space) = head.rfind(char::is_whitespace) {
			return head[..space].to_string();
		}
	}

	head.to_string()
}
