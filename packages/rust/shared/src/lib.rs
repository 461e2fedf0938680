//! Shared types, error model, cache primitives, and configuration for instructgen.
//!
//! This crate is the foundation depended on by all other instructgen crates.
//! It provides:
//! - [`InstructGenError`] for the unified error type
//! - Domain types ([`Template`], [`Selection`])
//! - The cache-or-fetch abstraction ([`CacheStore`], [`Ttl`], [`MemoryStore`])
//! - Configuration ([`AppConfig`], [`CatalogOptions`], config loading)

pub mod cache;
pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use cache::{CacheEntry, CacheStore, MemoryStore, Ttl, get_fresh, is_expired};
pub use config::{
    AppConfig, CacheConfig, CatalogConfig, CatalogOptions, DEFAULT_CATALOG_URL, OUTPUT_FILE_NAME,
    OutputConfig, TEMPLATE_SUFFIX, cache_db_path, config_dir, config_file_path, init_config,
    load_config, load_config_from, validate_config,
};
pub use error::{InstructGenError, Result};
pub use types::{Selection, Template, filter_templates};
