//! Session-lifetime cache of template contents.
//!
//! Keyed by template name and never persisted. Batch fetches run
//! concurrently, and every successful fetch is stored on its own, so a
//! failing sibling never discards content that already arrived.

use chrono::Utc;
use futures_util::future::try_join_all;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use instructgen_catalog::ContentSource;
use instructgen_shared::{CacheStore, InstructGenError, MemoryStore, Result, Template, Ttl, get_fresh};

/// Diagnostic snapshot of the content cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of cached templates.
    pub size: usize,
    /// Cached template names, sorted.
    pub keys: Vec<String>,
}

/// In-memory content cache keyed by [`Template::name`].
#[derive(Debug, Default)]
pub struct ContentCache {
    store: MemoryStore<String>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached content for `name`, if any.
    pub async fn get(&self, name: &str) -> Option<String> {
        get_fresh(&self.store, name, Utc::now(), Ttl::Infinite)
            .await
            .ok()
            .flatten()
    }

    /// Return the cached content of `template`, fetching it from `source` on a miss.
    ///
    /// Nothing is cached when the fetch fails; the error names the template.
    #[instrument(skip_all, fields(template = %template.name))]
    pub async fn get_or_fetch<C: ContentSource>(
        &self,
        source: &C,
        template: &Template,
    ) -> Result<String> {
        if let Some(content) = self.get(&template.name).await {
            debug!("using cached content");
            return Ok(content);
        }

        let content = source.fetch_content(template).await.map_err(|e| {
            warn!(error = %e, "failed to fetch template content");
            match e {
                e @ InstructGenError::ContentFetch { .. } => e,
                other => InstructGenError::content_fetch(&template.name, other.to_string()),
            }
        })?;

        self.store
            .put(&template.name, content.clone(), Utc::now())
            .await?;
        debug!(bytes = content.len(), "content cached");
        Ok(content)
    }

    /// Fetch every template's content concurrently.
    ///
    /// The result is index-aligned with `templates`. The first failure fails
    /// the batch immediately and drops the fetches still in flight; content
    /// that arrived before the failure stays cached.
    #[instrument(skip_all, fields(count = templates.len()))]
    pub async fn fetch_many<C: ContentSource>(
        &self,
        source: &C,
        templates: &[Template],
    ) -> Result<Vec<String>> {
        try_join_all(templates.iter().map(|t| self.get_or_fetch(source, t))).await
    }

    /// Forget every cached template.
    pub async fn clear(&self) {
        self.store.clear().await;
        debug!("template content cache cleared");
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.store.len().await,
            keys: self.store.keys().await,
        }
    }
}
