//! Generation workflow: selection → content fetch → merge → stats.

use std::path::Path;
use std::time::Instant;

use tracing::{info, instrument};

use instructgen_catalog::CatalogClient;
use instructgen_merge::{MergeStats, generate_merge_stats, merge_templates};
use instructgen_shared::{CacheStore, CatalogOptions, InstructGenError, Result, Selection, Template};
use instructgen_storage::Storage;

use crate::content_cache::ContentCache;

/// Output of a successful generation.
#[derive(Debug, Clone)]
pub struct Generated {
    pub merged_content: String,
    pub stats: MergeStats,
}

/// Progress callback for reporting generation status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when generation completes.
    fn done(&self, result: &Generated);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _result: &Generated) {}
}

/// Owns the catalog client and the session content cache.
///
/// Concurrent `generate` calls for the same selection are not coalesced, and
/// an abandoned call keeps running until its fetches settle.
pub struct Generator<S> {
    catalog: CatalogClient<S>,
    contents: ContentCache,
}

impl Generator<Storage> {
    /// Build a generator whose listing cache lives in the libSQL file at `db_path`.
    pub async fn open(options: CatalogOptions, db_path: &Path) -> Result<Self> {
        let storage = Storage::open(db_path).await?;
        Ok(Self::new(CatalogClient::new(options, storage)?))
    }
}

impl<S> Generator<S> {
    pub fn new(catalog: CatalogClient<S>) -> Self {
        Self {
            catalog,
            contents: ContentCache::new(),
        }
    }

    pub fn catalog(&self) -> &CatalogClient<S> {
        &self.catalog
    }

    pub fn content_cache(&self) -> &ContentCache {
        &self.contents
    }

    /// Fetch, merge and measure the selected templates, in selection order.
    #[instrument(skip_all, fields(templates = selection.len()))]
    pub async fn generate(
        &self,
        selection: &Selection,
        progress: &dyn ProgressReporter,
    ) -> Result<Generated> {
        if selection.is_empty() {
            return Err(InstructGenError::EmptySelection);
        }

        let start = Instant::now();
        info!(names = ?selection.names(), "generating instructions");

        progress.phase("Fetching template content");
        let contents = self
            .contents
            .fetch_many(&self.catalog, selection.templates())
            .await?;

        progress.phase("Merging templates");
        let merged_content = merge_templates(selection.templates(), &contents)?;
        let stats = generate_merge_stats(selection.templates(), &merged_content);

        let generated = Generated {
            merged_content,
            stats,
        };

        info!(
            lines = generated.stats.output_stats.lines,
            words = generated.stats.output_stats.words,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "generation complete"
        );

        progress.done(&generated);
        Ok(generated)
    }
}

impl<S> Generator<S>
where
    S: CacheStore<Vec<Template>>,
{
    /// The catalog listing, served from the listing cache when fresh.
    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        self.catalog.list_templates().await
    }

    /// List the catalog and resolve `names` against it.
    pub async fn resolve(&self, names: &[String]) -> Result<Selection> {
        let available = self.list_templates().await?;
        select_templates(&available, names)
    }
}

/// Build a selection from `names` in the given order.
///
/// Names match exactly. Repeated names are selected once; an unknown name
/// fails with [`InstructGenError::UnknownTemplate`].
pub fn select_templates(available: &[Template], names: &[String]) -> Result<Selection> {
    let mut selection = Selection::new();
    for name in names {
        let template = available
            .iter()
            .find(|t| &t.name == name)
            .ok_or_else(|| InstructGenError::UnknownTemplate { name: name.clone() })?;
        selection.add(template.clone());
    }
    Ok(selection)
}
