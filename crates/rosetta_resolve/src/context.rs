//! Per-run resolver context.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use rosetta_store::{InstanceType, MappingStore, Region};

use crate::error::{ResolveError, ResolveResult};

type OutcomeKey = (String, String, String);
type OutcomeCache = RwLock<HashMap<OutcomeKey, ResolveResult<String>>>;

/// Caches shared by all resolver calls of one translation run.
///
/// The catalogs do not change mid-run, so catalog listings are fetched from
/// the store at most once per provider and resolution outcomes (including
/// local misses) are memoized per
/// `(source_provider, source_value, target_provider)` key. The context is
/// explicitly constructed per run and injected into resolver calls; two runs
/// never share one. All caches take shared references, so a parallel
/// per-resource loop can use one context from many threads; concurrent
/// requesters for the same key may redundantly compute it, which is harmless
/// because resolution is pure and deterministic.
#[derive(Default)]
pub struct ResolverContext {
    instance_catalogs: RwLock<HashMap<String, Arc<Vec<InstanceType>>>>,
    region_catalogs: RwLock<HashMap<String, Arc<Vec<Region>>>>,
    instance_outcomes: OutcomeCache,
    region_outcomes: OutcomeCache,
    image_outcomes: OutcomeCache,
}

impl ResolverContext {
    /// Create a fresh context for one run.
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance catalog of `provider`, fetched once per run.
    pub(crate) fn instance_catalog(
        &self,
        store: &dyn MappingStore,
        provider: &str,
    ) -> ResolveResult<Arc<Vec<InstanceType>>> {
        if let Some(catalog) = self.instance_catalogs.read().get(provider) {
            return Ok(Arc::clone(catalog));
        }
        let catalog = Arc::new(store.instance_types(provider)?);
        debug!(
            "Cached {} instance types for provider {}",
            catalog.len(),
            provider
        );
        self.instance_catalogs
            .write()
            .insert(provider.to_string(), Arc::clone(&catalog));
        Ok(catalog)
    }

    /// The region catalog of `provider`, fetched once per run.
    pub(crate) fn region_catalog(
        &self,
        store: &dyn MappingStore,
        provider: &str,
    ) -> ResolveResult<Arc<Vec<Region>>> {
        if let Some(catalog) = self.region_catalogs.read().get(provider) {
            return Ok(Arc::clone(catalog));
        }
        let catalog = Arc::new(store.regions(provider)?);
        debug!("Cached {} regions for provider {}", catalog.len(), provider);
        self.region_catalogs
            .write()
            .insert(provider.to_string(), Arc::clone(&catalog));
        Ok(catalog)
    }

    pub(crate) fn memoize_instance<F>(&self, key: OutcomeKey, compute: F) -> ResolveResult<String>
    where
        F: FnOnce() -> ResolveResult<String>,
    {
        memoize(&self.instance_outcomes, key, compute)
    }

    pub(crate) fn memoize_region<F>(&self, key: OutcomeKey, compute: F) -> ResolveResult<String>
    where
        F: FnOnce() -> ResolveResult<String>,
    {
        memoize(&self.region_outcomes, key, compute)
    }

    pub(crate) fn memoize_image<F>(&self, key: OutcomeKey, compute: F) -> ResolveResult<String>
    where
        F: FnOnce() -> ResolveResult<String>,
    {
        memoize(&self.image_outcomes, key, compute)
    }
}

/// Memoize everything except store failures; a broken store aborts the run,
/// so its errors must never be replayed from cache.
fn memoize<F>(cache: &OutcomeCache, key: OutcomeKey, compute: F) -> ResolveResult<String>
where
    F: FnOnce() -> ResolveResult<String>,
{
    if let Some(hit) = cache.read().get(&key) {
        return hit.clone();
    }
    let outcome = compute();
    if !matches!(outcome, Err(ResolveError::Store(_))) {
        cache.write().insert(key, outcome.clone());
    }
    outcome
}

impl std::fmt::Debug for ResolverContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolverContext")
            .field(
                "instance_catalogs",
                &self.instance_catalogs.read().keys().collect::<Vec<_>>(),
            )
            .field(
                "region_catalogs",
                &self.region_catalogs.read().keys().collect::<Vec<_>>(),
            )
            .field("instance_outcomes", &self.instance_outcomes.read().len())
            .field("region_outcomes", &self.region_outcomes.read().len())
            .field("image_outcomes", &self.image_outcomes.read().len())
            .finish()
    }
}
