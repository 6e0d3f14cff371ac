use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum TagdocError {
	#[error(transparent)]
	#[diagnostic(code(tagdoc::io_error))]
	Io(#[from] std::io::Error),

	#[error("invalid tag name: `{0}`")]
	#[diagnostic(
		code(tagdoc::invalid_tag),
		help("tag names must contain at least one word character (letters, digits or `_`)")
	)]
	InvalidTag(String),

	#[error("invalid extraction pattern `{pattern}`: {reason}")]
	#[diagnostic(code(tagdoc::invalid_pattern))]
	InvalidPattern { pattern: String, reason: String },

	#[error("no content found using {method}")]
	#[diagnostic(
		code(tagdoc::no_content_found),
		help("add a documentation block to the file or mark the extraction as optional")
	)]
	NoContentFound { method: String, fatal: bool },

	#[error("template not found: `{path}`")]
	#[diagnostic(
		code(tagdoc::template_not_found),
		help("check the `template` path of this target in tagdoc.toml")
	)]
	TemplateNotFound { path: String },

	#[error("source file not found: `{path}`")]
	#[diagnostic(code(tagdoc::source_file_not_found))]
	SourceFileNotFound { path: String },

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(tagdoc::config_parse),
		help("check that tagdoc.toml is valid TOML with [[targets]] entries")
	)]
	ConfigParse(String),

	#[error("invalid glob pattern `{pattern}`: {reason}")]
	#[diagnostic(code(tagdoc::invalid_glob))]
	InvalidGlob { pattern: String, reason: String },

	#[error("page `{path}` would be overwritten by the generated directory index")]
	#[diagnostic(
		code(tagdoc::index_collision),
		help("rename the source file or set `create_index_file = false` for this target")
	)]
	IndexCollision { path: String },

	#[error("line template rendering failed: {0}")]
	#[diagnostic(code(tagdoc::template_render))]
	TemplateRender(String),
}

impl TagdocError {
	/// Whether the error should abort the unit of work it was raised in. Only
	/// an optional extraction that matched nothing is recoverable.
	pub fn is_fatal(&self) -> bool {
		match self {
			Self::NoContentFound { fatal, .. } => *fatal,
			_ => true,
		}
	}

	/// True for the "nothing matched" signal, fatal or not.
	pub fn is_no_content(&self) -> bool {
		matches!(self, Self::NoContentFound { .. })
	}
}

pub type TagdocResult<T> = Result<T, TagdocError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
