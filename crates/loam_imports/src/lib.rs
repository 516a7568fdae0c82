//! Static import extraction and before/after-compilation diffing.
//!
//! Compilation erases imports that exist only for type information, making
//! them invisible to any invalidation scheme that watches the compiled
//! output. This crate extracts the statically declared import targets from
//! source text, recomputes them on the compiled text, and enriches the
//! imports that disappeared with resolution and modification-time data so a
//! staleness check can consider them.
//!
//! All resolution failures are captured as data on the affected record;
//! this analysis is diagnostic and never blocks a module load.

#![warn(missing_docs)]

mod diff;
mod extract;
mod record;
mod resolve;

pub use diff::{diff_imports, ImportDiff};
pub use extract::{extract_imports, ScanOptions};
pub use record::ImportRecord;
pub use resolve::Resolver;
