//! Remote template catalog client.
//!
//! Lists the instruction templates published in a remote directory and
//! fetches their raw Markdown. The listing goes through a time-boxed
//! [`CacheStore`] (durable in production) so repeated listings within the
//! TTL never touch the network. Content fetches are never cached here; that
//! is the content cache's job.

mod parser;

use std::time::Duration;

use chrono::{DateTime, Utc};
use instructgen_shared::{
    CacheEntry, CacheStore, CatalogOptions, InstructGenError, Result, Template, get_fresh,
};
use reqwest::Client;
use reqwest::header::ACCEPT;
use tracing::{debug, info, instrument, warn};

pub use parser::{RemoteEntry, sort_templates, templates_from_entries};

/// Durable cache key of the template listing.
pub const LIST_CACHE_KEY: &str = "copilot-templates-cache";

/// User-Agent string for catalog requests (the GitHub API rejects requests without one).
const USER_AGENT: &str = concat!("instructgen/", env!("CARGO_PKG_VERSION"));

/// Media type requested from the listing endpoint.
const LISTING_MEDIA_TYPE: &str = "application/vnd.github+json";

// ---------------------------------------------------------------------------
// ContentSource
// ---------------------------------------------------------------------------

/// Anything that can produce the raw content of a template.
#[allow(async_fn_in_trait)]
pub trait ContentSource {
    /// Fetch the raw text of `template`. Failures carry the template name.
    async fn fetch_content(&self, template: &Template) -> Result<String>;
}

// ---------------------------------------------------------------------------
// CatalogClient
// ---------------------------------------------------------------------------

/// HTTP client for the remote template catalog.
pub struct CatalogClient<S> {
    client: Client,
    options: CatalogOptions,
    cache: S,
}

impl<S> CatalogClient<S> {
    /// Create a client that persists listings in `cache`.
    pub fn new(options: CatalogOptions, cache: S) -> Result<Self> {
        let client = build_client(&options)?;
        Ok(Self {
            client,
            options,
            cache,
        })
    }

    /// Runtime options this client was built with.
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    /// The listing cache backend.
    pub fn cache(&self) -> &S {
        &self.cache
    }

    /// GET `template.download_url` and return the body verbatim.
    #[instrument(skip_all, fields(template = %template.name))]
    pub async fn fetch_content(&self, template: &Template) -> Result<String> {
        debug!(url = %template.download_url, "fetching template content");

        let response = self
            .client
            .get(&template.download_url)
            .send()
            .await
            .map_err(|e| InstructGenError::content_fetch(&template.name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstructGenError::content_fetch(
                &template.name,
                format!("HTTP {status}"),
            ));
        }

        let body = response.text().await.map_err(|e| {
            InstructGenError::content_fetch(&template.name, format!("failed to read body: {e}"))
        })?;

        debug!(bytes = body.len(), "template content fetched");
        Ok(body)
    }

    /// Fetch and parse the remote listing, bypassing the cache.
    #[instrument(skip_all, fields(url = %self.options.base_url))]
    async fn fetch_listing(&self) -> Result<Vec<Template>> {
        info!("fetching template list");

        let mut request = self
            .client
            .get(&self.options.base_url)
            .header(ACCEPT, LISTING_MEDIA_TYPE);
        if let Some(token) = &self.options.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InstructGenError::catalog_fetch(format!("{}: {e}", self.options.base_url)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstructGenError::catalog_fetch(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| InstructGenError::catalog_fetch(format!("failed to read body: {e}")))?;

        parser::parse_listing(&body, &self.options.suffix)
    }
}

impl<S> CatalogClient<S>
where
    S: CacheStore<Vec<Template>>,
{
    /// List available templates, sorted by name.
    ///
    /// Served from the listing cache while it is younger than the TTL;
    /// otherwise fetched and written back to the cache.
    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        self.list_templates_at(Utc::now()).await
    }

    /// [`list_templates`](Self::list_templates) with an explicit clock reading.
    pub async fn list_templates_at(&self, now: DateTime<Utc>) -> Result<Vec<Template>> {
        let ttl = self.options.list_ttl;
        match get_fresh::<Vec<Template>, S>(&self.cache, LIST_CACHE_KEY, now, ttl).await {
            Ok(Some(templates)) => {
                info!(count = templates.len(), "using cached template list");
                return Ok(templates);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "could not read cached template list, fetching instead");
            }
        }

        let templates = self.fetch_listing().await?;

        match self.cache.put(LIST_CACHE_KEY, templates.clone(), now).await {
            Ok(()) => debug!(count = templates.len(), "cached template list"),
            Err(e) => warn!(error = %e, "failed to cache template list"),
        }

        info!(count = templates.len(), "template list fetched");
        Ok(templates)
    }

    /// The stored listing record, regardless of age.
    pub async fn cached_listing(&self) -> Result<Option<CacheEntry<Vec<Template>>>> {
        self.cache.get(LIST_CACHE_KEY).await
    }

    /// Forget the stored listing so the next call hits the network.
    pub async fn clear_cached_listing(&self) -> Result<()> {
        self.cache.remove(LIST_CACHE_KEY).await
    }
}

impl<S> ContentSource for CatalogClient<S> {
    async fn fetch_content(&self, template: &Template) -> Result<String> {
        CatalogClient::fetch_content(self, template).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &CatalogOptions) -> Result<Client> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if opts.timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(opts.timeout_secs));
    }
    builder
        .build()
        .map_err(|e| InstructGenError::config(format!("failed to build HTTP client: {e}")))
}
