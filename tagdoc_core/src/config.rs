use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::TagdocError;
use crate::TagdocResult;
use crate::excerpt::ExcerptOptions;
use crate::extract::DEFAULT_PLACEHOLDER;
use crate::extract::ExtractMethod;
use crate::extract::Extraction;
use crate::formatters::Formatter;
use crate::index::IndexOptions;
use crate::index::LineRenderer;
use crate::index::LinkStyle;
use crate::merge::MergeOptions;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] =
	["tagdoc.toml", ".tagdoc.toml", ".config/tagdoc.toml"];

/// Output root used when neither the config nor a target names one.
pub const DEFAULT_OUTPUT_DIR: &str = "docs";

/// Configuration loaded from a `tagdoc.toml` file.
///
/// ```toml
/// output = "docs"
/// mandatory_coverage = true
///
/// [merge]
/// divider = "\n\n"
///
/// [index]
/// create_index_file = true
/// recursive = true
///
/// [[targets]]
/// name = "api"
/// root = "src"
/// include = ["**/*.rs"]
/// template = "templates/page.md"
///
/// [[targets.extract]]
/// tag = "docs"
/// ```
#[derive(Debug, Deserialize)]
pub struct TagdocConfig {
	/// Output root. Each target writes to `<output>/<target name>` unless it
	/// sets its own `output`.
	#[serde(default = "default_output")]
	pub output: PathBuf,
	/// When true, `tagdoc check` fails if any discovered source file has no
	/// documentation block.
	#[serde(default)]
	pub mandatory_coverage: bool,
	/// When true, `.gitignore` files are not used for filtering.
	#[serde(default)]
	pub disable_gitignore: bool,
	#[serde(default)]
	pub merge: MergeOptions,
	#[serde(default)]
	pub index: IndexConfig,
	#[serde(default)]
	pub targets: Vec<TargetConfig>,
}

impl Default for TagdocConfig {
	fn default() -> Self {
		Self {
			output: default_output(),
			mandatory_coverage: false,
			disable_gitignore: false,
			merge: MergeOptions::default(),
			index: IndexConfig::default(),
			targets: Vec::new(),
		}
	}
}

fn default_output() -> PathBuf {
	PathBuf::from(DEFAULT_OUTPUT_DIR)
}

/// One set of source files rendered through one template.
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
	pub name: String,
	/// Directory the include patterns are relative to. Output paths mirror
	/// the layout below it.
	#[serde(default = "default_root")]
	pub root: PathBuf,
	/// Glob patterns selecting source files. Empty selects every file.
	#[serde(default)]
	pub include: Vec<String>,
	/// Gitignore-style patterns to skip.
	#[serde(default)]
	pub exclude: Vec<String>,
	/// Output directory for this target.
	#[serde(default)]
	pub output: Option<PathBuf>,
	/// Template file. Without one, each placeholder is emitted on its own.
	#[serde(default)]
	pub template: Option<PathBuf>,
	#[serde(default)]
	pub formatters: Vec<Formatter>,
	#[serde(default = "default_extract")]
	pub extract: Vec<ExtractConfig>,
	/// Overrides `[index] create_index_file` for this target.
	#[serde(default)]
	pub create_index_file: Option<bool>,
}

fn default_root() -> PathBuf {
	PathBuf::from(".")
}

fn default_extract() -> Vec<ExtractConfig> {
	vec![ExtractConfig {
		tag: Some("docs".to_string()),
		..ExtractConfig::default()
	}]
}

/// A single extraction. Exactly one of `tag`, `start`/`end` or `pattern`
/// must be set.
///
/// ```toml
/// [[targets.extract]]
/// tag = "example"
/// placeholder = "%examples%"
/// required = false
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractConfig {
	#[serde(default)]
	pub tag: Option<String>,
	#[serde(default)]
	pub start: Option<String>,
	#[serde(default)]
	pub end: Option<String>,
	#[serde(default)]
	pub pattern: Option<String>,
	#[serde(default)]
	pub placeholder: Option<String>,
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub strip_comment_prefix: bool,
}

impl ExtractConfig {
	/// Build the runtime [`Extraction`].
	pub fn to_extraction(&self) -> TagdocResult<Extraction> {
		let method = match (&self.tag, &self.start, &self.end, &self.pattern) {
			(Some(tag), None, None, None) => ExtractMethod::Tag(tag.clone()),
			(None, Some(start), Some(end), None) => {
				ExtractMethod::Delimiters {
					start: start.clone(),
					end: end.clone(),
				}
			}
			(None, None, None, Some(pattern)) => ExtractMethod::Pattern(pattern.clone()),
			_ => {
				return Err(TagdocError::ConfigParse(
					"each [[targets.extract]] entry needs exactly one of `tag`, `start` + `end`, \
					 or `pattern`"
						.to_string(),
				));
			}
		};

		Ok(Extraction::new(method)
			.with_placeholder(
				self.placeholder
					.clone()
					.unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
			)
			.required(self.required)
			.strip_comment_prefix(self.strip_comment_prefix))
	}
}

/// Configuration for generated `index.md` listings.
///
/// ```toml
/// [index]
/// create_index_file = true
/// recursive = true
/// flatten = false
/// link_style = "markdown"
/// files_heading = "## Pages"
/// line_template = "- {{ link }}{% if excerpt %}: {{ excerpt }}{% endif %}"
///
/// [index.excerpt]
/// length = 80
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct IndexConfig {
	pub create_index_file: bool,
	pub recursive: bool,
	pub flatten: bool,
	pub link_style: LinkStyle,
	pub only_docs: bool,
	pub sort: bool,
	pub files_heading: Option<String>,
	pub dirs_heading: Option<String>,
	pub title: Option<String>,
	pub excerpt: Option<ExcerptOptions>,
	/// A `minijinja` template for each list item. Available variables are
	/// `name`, `link`, `line`, `excerpt` and `depth`.
	pub line_template: Option<String>,
}

impl Default for IndexConfig {
	fn default() -> Self {
		Self {
			create_index_file: true,
			recursive: true,
			flatten: false,
			link_style: LinkStyle::Markdown,
			only_docs: true,
			sort: true,
			files_heading: None,
			dirs_heading: None,
			title: None,
			excerpt: None,
			line_template: None,
		}
	}
}

impl IndexConfig {
	/// Build the runtime [`IndexOptions`], compiling `line_template` if set.
	pub fn to_options(&self) -> TagdocResult<IndexOptions> {
		let line_renderer = self
			.line_template
			.as_deref()
			.map(line_template_renderer)
			.transpose()?;

		Ok(IndexOptions {
			link_style: self.link_style,
			flatten: self.flatten,
			recursive: self.recursive,
			only_docs: self.only_docs,
			sort: self.sort,
			files_heading: self.files_heading.clone(),
			dirs_heading: self.dirs_heading.clone(),
			title: self.title.clone(),
			excerpt: self.excerpt.clone(),
			line_renderer,
		})
	}
}

/// Compile a `minijinja` list item template into a [`LineRenderer`]. The
/// template is rendered once against sample values so syntax errors surface
/// while loading the config rather than halfway through a listing.
pub fn line_template_renderer(template: &str) -> TagdocResult<LineRenderer> {
	let env = minijinja::Environment::new();
	env.render_str(
		template,
		minijinja::context! {
			name => "page.md",
			link => "[page.md](page.md)",
			line => 1,
			excerpt => Some("Sample."),
			depth => 0,
		},
	)
	.map_err(|e| TagdocError::TemplateRender(e.to_string()))?;

	let source = template.to_string();
	Ok(LineRenderer::new(move |line| {
		let ctx = minijinja::context! {
			name => line.display_name,
			link => line.link,
			line => line.line_number,
			excerpt => line.excerpt,
			depth => line.depth,
		};
		env.render_str(&source, ctx).unwrap_or_else(|e| {
			tracing::warn!(error = %e, "line template failed, using default item");
			format!("- {}", line.link)
		})
	}))
}

impl TagdocConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> TagdocResult<Option<TagdocConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::parse(&content)?;
		tracing::debug!(path = %config_path.display(), targets = config.targets.len(), "loaded config");

		Ok(Some(config))
	}

	/// Parse config file content.
	pub fn parse(content: &str) -> TagdocResult<TagdocConfig> {
		toml::from_str(content).map_err(|e| TagdocError::ConfigParse(e.to_string()))
	}
}
