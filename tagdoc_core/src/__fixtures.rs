use std::path::Path;

use tempfile::TempDir;

use crate::AnyResult;

/// Write `files` (relative path, content) below `root`, creating parent
/// directories as needed.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> AnyResult<()> {
	for (relative, content) in files {
		let path = root.join(relative);
		if let Some(parent) = path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(path, content)?;
	}

	Ok(())
}

/// `a.md`, `sub/b.md`, `sub/sub2/c.md`.
pub fn nested_docs_tree() -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	write_tree(
		tmp.path(),
		&[
			("a.md", "# A\n\nThe first page. It has two sentences.\n"),
			("sub/b.md", "# B\n\nSecond page about b.\n"),
			("sub/sub2/c.md", "# C\n\nThird page.\n"),
		],
	)?;

	Ok(tmp)
}

/// A small project with one target documenting `src/**/*.rs`.
pub fn rust_project() -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	write_tree(
		tmp.path(),
		&[
			(
				"tagdoc.toml",
				r###"output = "docs"

[index]
files_heading = "## Pages"

[[targets]]
name = "api"
root = "src"
include = ["**/*.rs"]
template = "templates/page.md"
formatters = ["trailingNewline"]

[[targets.extract]]
tag = "docs"
strip_comment_prefix = true

[[targets.extract]]
tag = "example"
placeholder = "%examples%"
"###,
			),
			("templates/page.md", "# API\n\n%content%\n\n## Examples\n\n%examples%\n"),
			(
				"src/lib.rs",
				"/*\n<docs name=\"lib\">\nThe crate root.\n</docs>\n<example>\nlet x = 1;\n</example>\n*/\npub mod util;\n",
			),
			(
				"src/util/mod.rs",
				"// <docs>\n// Helpers.\n// </docs>\npub fn help() {}\n",
			),
			("src/undocumented.rs", "pub fn nothing() {}\n"),
		],
	)?;

	Ok(tmp)
}
