use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::TagdocError;
use crate::TagdocResult;

/// Options for discovering the source files of one target.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
	/// Files must match one of these globs (relative to the root). An empty
	/// set matches every file.
	pub include: GlobSet,
	/// Gitignore-style patterns for files and directories to skip.
	pub exclude_patterns: Vec<String>,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
	/// Absolute directories never descended into, such as output roots that
	/// live inside the source tree.
	pub skip_dirs: Vec<PathBuf>,
}

impl Default for DiscoveryOptions {
	fn default() -> Self {
		Self {
			include: GlobSet::empty(),
			exclude_patterns: Vec::new(),
			disable_gitignore: false,
			skip_dirs: Vec::new(),
		}
	}
}

impl DiscoveryOptions {
	pub fn new(include: &[String], exclude: &[String]) -> TagdocResult<Self> {
		Ok(Self {
			include: build_glob_set(include)?,
			exclude_patterns: exclude.to_vec(),
			..Self::default()
		})
	}
}

/// Build a `GlobSet` from a list of glob pattern strings.
pub fn build_glob_set(patterns: &[String]) -> TagdocResult<GlobSet> {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		let glob = Glob::new(pattern).map_err(|e| {
			TagdocError::InvalidGlob {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
		builder.add(glob);
	}
	builder.build().map_err(|e| {
		TagdocError::InvalidGlob {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Collect every source file below `root` that matches `options`, sorted for
/// deterministic ordering.
pub fn discover_sources(root: &Path, options: &DiscoveryOptions) -> TagdocResult<Vec<PathBuf>> {
	if !root.is_dir() {
		return Err(TagdocError::SourceFileNotFound {
			path: root.display().to_string(),
		});
	}

	let gitignore = if options.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
	let mut walker = Walker {
		root,
		options,
		gitignore: &gitignore,
		custom_exclude: &custom_exclude,
		visited_dirs: HashSet::new(),
		files: Vec::new(),
	};

	walker.walk(root)?;

	let mut files = walker.files;
	files.sort();
	Ok(files)
}

struct Walker<'a> {
	root: &'a Path,
	options: &'a DiscoveryOptions,
	gitignore: &'a Gitignore,
	custom_exclude: &'a Gitignore,
	visited_dirs: HashSet<PathBuf>,
	files: Vec<PathBuf>,
}

impl Walker<'_> {
	fn walk(&mut self, dir: &Path) -> TagdocResult<()> {
		// Symlinked directories can loop back on themselves.
		let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
		if !self.visited_dirs.insert(canonical) {
			tracing::debug!(dir = %dir.display(), "already visited, skipping");
			return Ok(());
		}

		for entry in std::fs::read_dir(dir)? {
			let entry = entry?;
			let path = entry.path();

			if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
				if is_ignored_directory_name(name) {
					continue;
				}
			}

			let is_dir = path.is_dir();

			if self.gitignore.matched(&path, is_dir).is_ignore()
				|| self.custom_exclude.matched(&path, is_dir).is_ignore()
			{
				continue;
			}

			if is_dir {
				if self.options.skip_dirs.iter().any(|skip| skip == &path) {
					continue;
				}
				self.walk(&path)?;
			} else if self.is_included(&path) {
				self.files.push(path);
			}
		}

		Ok(())
	}

	fn is_included(&self, path: &Path) -> bool {
		if self.options.include.is_empty() {
			return true;
		}

		path.strip_prefix(self.root)
			.is_ok_and(|relative| self.options.include.is_match(relative))
	}
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

/// Build a `Gitignore` matcher from exclude patterns. These follow
/// `.gitignore` syntax and are applied on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> TagdocResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			TagdocError::InvalidGlob {
				pattern: pattern.clone(),
				reason: e.to_string(),
			}
		})?;
	}
	builder.build().map_err(|e| {
		TagdocError::InvalidGlob {
			pattern: patterns.join(", "),
			reason: e.to_string(),
		}
	})
}

/// Build a `Gitignore` matcher from the root's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}
