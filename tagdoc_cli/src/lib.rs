use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Turn tagged source comments into a browsable tree of markdown pages.",
	long_about = "tagdoc extracts tagged regions such as `<docs name=\"x\">...</docs>` from your \
	              source files, merges them into markdown templates and mirrors the source layout \
	              under an output directory, writing an `index.md` listing into every generated \
	              directory.\n\nQuick start:\n  tagdoc init    Create tagdoc.toml and a page \
	              template\n  tagdoc build   Generate pages and indexes\n  tagdoc check   Verify \
	              generated pages are up to date\n  tagdoc index   Write index listings for an \
	              existing tree"
)]
pub struct TagdocCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output and debug logging.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize tagdoc in a project.
	///
	/// Creates a sample `tagdoc.toml` and `templates/page.md`. Existing files
	/// are left untouched.
	Init,
	/// Generate documentation pages and index listings.
	///
	/// Runs every configured target: discovers source files, extracts tagged
	/// regions, merges them into the target template and writes one page per
	/// documented source file. Afterwards an `index.md` is written into every
	/// generated directory.
	Build {
		/// Print the pages that would change without writing anything.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch the project for changes and rebuild automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that generated pages are up to date.
	///
	/// Runs the pipeline without writing and compares every page with what is
	/// on disk. Exits with a non-zero status code when a page is stale or,
	/// with `mandatory_coverage`, when a source file has no documentation.
	Check {
		/// Show a unified diff for each stale page.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// Write `index.md` listings for an existing directory tree.
	///
	/// Starts from the `[index]` section of `tagdoc.toml` when one exists;
	/// the flags below switch individual options on.
	Index {
		/// Directory to index, relative to the project root.
		dir: PathBuf,

		/// Index every subdirectory too, innermost first.
		#[arg(long, default_value_t = false)]
		recursive: bool,

		/// Render each directory's whole subtree as one indented list.
		#[arg(long, default_value_t = false)]
		flatten: bool,

		/// Write bare link targets instead of markdown links.
		#[arg(long, default_value_t = false)]
		plain: bool,

		/// Append an excerpt of at most N characters after each file link.
		#[arg(long, value_name = "N")]
		excerpt: Option<usize>,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption.
	Json,
}
