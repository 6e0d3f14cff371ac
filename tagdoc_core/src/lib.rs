//! `tagdoc_core` is the core library for [tagdoc](https://github.com/ifiokjr/tagdoc). It turns tagged comment blocks inside source files into a tree of markdown pages, then writes an `index.md` listing into every generated directory.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source file
//!   → Extractor (finds `<docs key="value">…</docs>` regions, or delimiters, patterns, callbacks)
//!   → Merger (groups fragments per placeholder, renders attributes, splices into a template)
//!   → Formatters (trim, title, source note, …)
//!   → Writer (mirrors the source layout under the output root)
//!   → Index processor (scans each output directory bottom-up and writes `index.md`)
//! ```
//!
//! ## Modules
//!
//! - [`extract`]: Tag, delimiter, pattern and callback extraction into [`Fragment`]s.
//! - [`merge`]: Placeholder grouping, attribute rendering and fallback text.
//! - [`excerpt`]: One-sentence summaries used next to index links.
//! - [`index`]: Directory scanning, listing rendering and the recursive index processor.
//! - [`config`]: Configuration loading from `tagdoc.toml`.
//! - [`discovery`]: Glob and gitignore aware source file discovery.
//! - [`formatters`]: Post-merge text transforms.
//! - [`pipeline`]: Target orchestration, producing a [`BuildReport`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tagdoc_core::pipeline::BuildPlan;
//! use tagdoc_core::{compute_outputs, write_outputs};
//! use std::path::Path;
//!
//! let plan = BuildPlan::load(Path::new(".")).unwrap();
//! let report = compute_outputs(&plan);
//! println!("{}/{} files documented", report.success_count, report.total_count);
//!
//! write_outputs(&report, &plan.index).unwrap();
//! ```

pub use config::*;
pub use error::*;
pub use excerpt::*;
pub use extract::*;
pub use merge::*;
pub use pipeline::*;

pub mod config;
pub mod discovery;
#[allow(unused_assignments)]
mod error;
pub mod excerpt;
pub mod extract;
pub mod formatters;
pub mod index;
pub mod merge;
pub mod pipeline;

#[cfg(test)]
mod __fixtures;
