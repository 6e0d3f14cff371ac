#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use insta_cmd::get_cargo_bin;
use tagdoc_core::AnyResult;
use tempfile::TempDir;

pub const PROJECT_CONFIG: &str = r###"output = "docs"

[index]
files_heading = "## Pages"

[[targets]]
name = "api"
root = "src"
include = ["**/*.rs"]

[[targets.extract]]
tag = "docs"
strip_comment_prefix = true
"###;

pub fn tagdoc_cmd() -> Command {
	let mut cmd = Command::new(get_cargo_bin("tagdoc"));
	cmd.env("NO_COLOR", "1").env_remove("TAGDOC_LOG");
	cmd
}

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

pub fn read(path: impl AsRef<Path>) -> AnyResult<String> {
	Ok(std::fs::read_to_string(path)?)
}

/// `src/lib.rs` and `src/util/mod.rs`, both documented, with `config` as
/// `tagdoc.toml`.
pub fn project_with_config(config: &str) -> AnyResult<TempDir> {
	let tmp = tempfile::tempdir()?;
	write_tree(
		tmp.path(),
		&[
			("tagdoc.toml", config),
			(
				"src/lib.rs",
				"//! <docs>\n//! The crate root.\n//! </docs>\npub mod util;\n",
			),
			(
				"src/util/mod.rs",
				"/// <docs>\n/// Helpers.\n/// </docs>\npub fn help() {}\n",
			),
		],
	)?;

	Ok(tmp)
}

pub fn project() -> AnyResult<TempDir> {
	project_with_config(PROJECT_CONFIG)
}
