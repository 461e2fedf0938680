//! Content cache, generation workflow, and export for instructgen.
//!
//! This crate ties the catalog client and the merge engine together: the
//! [`Generator`] owns both caches and turns a [`Selection`] into a merged
//! document plus statistics.
//!
//! [`Selection`]: instructgen_shared::Selection

pub mod content_cache;
pub mod export;
pub mod generator;

pub use content_cache::{CacheStats, ContentCache};
pub use export::{ExportMeta, write_document};
pub use generator::{Generated, Generator, ProgressReporter, SilentProgress, select_templates};
pub use instructgen_merge::{MergeStats, OutputStats, generate_merge_stats, merge_templates};
