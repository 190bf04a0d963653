//! Species validity and type resolution
//!
//! Lookups go through a [`SpeciesCache`] keyed by slug. A slug is fetched
//! from the [`SpeciesSource`] at most once while a lookup for it is
//! outstanding: concurrent callers attach to the same pending result. Only
//! successful lookups are cached; failures are retried on the next call.
//!
//! The in-flight map holds weak handles. Once every caller awaiting a slug
//! has dropped its future, the source call is cancelled and the next caller
//! starts a fresh one.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use async_trait::async_trait;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, WeakShared};
use reqwest::StatusCode;
use thiserror::Error;
use winrate_protocol::{PokeApiPokemon, Type};
use winrate_team::slug;

pub const POKEAPI_URL: &str = "https://pokeapi.co/api/v2";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpeciesError {
    #[error("Species name is empty")]
    EmptyName,

    #[error("Unknown species: {0}")]
    NotFound(String),

    #[error("Species lookup for {slug} failed: {message}")]
    Transport { slug: String, message: String },

    #[error("Species lookup for {slug} returned an unexpected body: {message}")]
    Decode { slug: String, message: String },
}

impl SpeciesError {
    /// Whether retrying the same lookup later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, SpeciesError::Transport { .. })
    }
}

/// Where species data comes from
#[async_trait]
pub trait SpeciesSource: Send + Sync {
    /// Type tags of the species with this slug, in slot order
    async fn fetch_types(&self, slug: &str) -> Result<Vec<Type>, SpeciesError>;
}

/// [`SpeciesSource`] backed by the PokeAPI `/pokemon/{slug}` endpoint
#[derive(Debug, Clone)]
pub struct PokeApiSource {
    http: reqwest::Client,
    base_url: String,
}

impl PokeApiSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

impl Default for PokeApiSource {
    fn default() -> Self {
        Self::new(POKEAPI_URL)
    }
}

#[async_trait]
impl SpeciesSource for PokeApiSource {
    async fn fetch_types(&self, slug: &str) -> Result<Vec<Type>, SpeciesError> {
        let url = format!("{}/pokemon/{}", self.base_url.trim_end_matches('/'), slug);
        let transport = |e: reqwest::Error| SpeciesError::Transport {
            slug: slug.to_string(),
            message: e.to_string(),
        };

        let response = self.http.get(&url).send().await.map_err(transport)?;
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(SpeciesError::NotFound(slug.to_string()));
        }
        if !status.is_success() {
            return Err(SpeciesError::Transport {
                slug: slug.to_string(),
                message: format!("HTTP {status}"),
            });
        }

        let body = response.text().await.map_err(transport)?;
        let decode = |e: winrate_protocol::ParseError| SpeciesError::Decode {
            slug: slug.to_string(),
            message: e.to_string(),
        };

        PokeApiPokemon::parse(&body)
            .map_err(decode)?
            .ordered_types()
            .map_err(decode)
    }
}

/// What is known about a species after a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeciesEntry {
    pub validated: bool,
    pub types: Vec<Type>,
}

/// Successful lookups by slug. Cloning shares the underlying map.
#[derive(Debug, Clone, Default)]
pub struct SpeciesCache {
    entries: Arc<RwLock<HashMap<String, SpeciesEntry>>>,
}

impl SpeciesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slug: &str) -> Option<SpeciesEntry> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(slug)
            .cloned()
    }

    pub fn insert(&self, slug: impl Into<String>, entry: SpeciesEntry) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(slug.into(), entry);
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(slug))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type LookupFuture = BoxFuture<'static, Result<SpeciesEntry, SpeciesError>>;
type PendingLookup = Shared<LookupFuture>;

/// Resolves species names through a cache, coalescing concurrent lookups
/// of the same slug into one source call.
pub struct SpeciesDirectory {
    source: Arc<dyn SpeciesSource>,
    cache: SpeciesCache,
    in_flight: Arc<Mutex<HashMap<String, WeakShared<LookupFuture>>>>,
}

impl SpeciesDirectory {
    pub fn new(source: Arc<dyn SpeciesSource>) -> Self {
        Self::with_cache(source, SpeciesCache::new())
    }

    /// Use an existing (possibly shared) cache
    pub fn with_cache(source: Arc<dyn SpeciesSource>, cache: SpeciesCache) -> Self {
        Self {
            source,
            cache,
            in_flight: Arc::default(),
        }
    }

    pub fn cache(&self) -> &SpeciesCache {
        &self.cache
    }

    /// Number of slugs with a lookup outstanding
    pub fn in_flight(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|weak| weak.upgrade().is_some())
            .count()
    }

    /// Whether `name` is a known species.
    ///
    /// An empty or unknown name is `Ok(false)`. Transport and decode faults
    /// are returned as errors so a flaky network is not mistaken for an
    /// invalid species.
    pub async fn validate(&self, name: &str) -> Result<bool, SpeciesError> {
        match self.resolve(name).await {
            Ok(entry) => Ok(entry.validated),
            Err(SpeciesError::EmptyName | SpeciesError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Type tags of `name`, in slot order
    pub async fn types_of(&self, name: &str) -> Result<Vec<Type>, SpeciesError> {
        self.resolve(name).await.map(|entry| entry.types)
    }

    /// Look up `name`, from cache when possible
    pub async fn resolve(&self, name: &str) -> Result<SpeciesEntry, SpeciesError> {
        let slug = slug::normalize(name);
        if slug.is_empty() {
            return Err(SpeciesError::EmptyName);
        }

        if let Some(entry) = self.cache.get(&slug) {
            tracing::debug!(%slug, "Species cache hit");
            return Ok(entry);
        }

        let pending = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

            // A lookup may have completed since the first cache check
            if let Some(entry) = self.cache.get(&slug) {
                return Ok(entry);
            }

            match in_flight.get(&slug).and_then(|weak| weak.upgrade()) {
                Some(pending) => {
                    tracing::debug!(%slug, "Joining in-flight species lookup");
                    pending
                }
                None => {
                    // Abandoned lookups leave dead handles behind
                    in_flight.retain(|_, weak| weak.upgrade().is_some());

                    let pending = self.start_lookup(slug.clone());
                    if let Some(weak) = pending.downgrade() {
                        in_flight.insert(slug, weak);
                    }
                    pending
                }
            }
        };

        pending.await
    }

    fn start_lookup(&self, slug: String) -> PendingLookup {
        let source = Arc::clone(&self.source);
        let cache = self.cache.clone();
        let in_flight = Arc::clone(&self.in_flight);

        tracing::debug!(%slug, "Species cache miss, fetching");

        async move {
            let result = source.fetch_types(&slug).await.map(|types| SpeciesEntry {
                validated: true,
                types,
            });

            match &result {
                Ok(entry) => cache.insert(slug.clone(), entry.clone()),
                Err(e) => tracing::warn!(%slug, error = %e, "Could not resolve species"),
            }

            // Cache first, so a caller that misses the in-flight entry hits the cache
            in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&slug);

            result
        }
        .boxed()
        .shared()
    }
}
