//! Region equivalence by geographic proximity.

use std::cmp::Ordering;

use tracing::debug;

use rosetta_store::{MappingStore, Region};

use crate::context::ResolverContext;
use crate::error::{ResolveError, ResolveResult};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Resolves a source region code to the nearest region of the target
/// provider.
pub struct RegionResolver;

impl RegionResolver {
    /// Find the nearest target region by great-circle distance.
    ///
    /// When the source region carries a continent tag and at least one
    /// target region shares it, the search is restricted to that continent;
    /// otherwise the whole target catalog competes. Equidistant candidates
    /// tie-break on the lexicographically smallest region code.
    pub fn resolve(
        ctx: &ResolverContext,
        store: &dyn MappingStore,
        source_provider: &str,
        region_code: &str,
        target_provider: &str,
    ) -> ResolveResult<String> {
        let key = (
            source_provider.to_string(),
            region_code.to_string(),
            target_provider.to_string(),
        );
        ctx.memoize_region(key, || {
            Self::resolve_uncached(ctx, store, source_provider, region_code, target_provider)
        })
    }

    fn resolve_uncached(
        ctx: &ResolverContext,
        store: &dyn MappingStore,
        source_provider: &str,
        region_code: &str,
        target_provider: &str,
    ) -> ResolveResult<String> {
        let source = store
            .region(source_provider, region_code)?
            .ok_or_else(|| ResolveError::UnknownRegion {
                provider: source_provider.to_string(),
                region_code: region_code.to_string(),
            })?;

        let catalog = ctx.region_catalog(store, target_provider)?;
        if catalog.is_empty() {
            return Err(ResolveError::EmptyCatalog {
                provider: target_provider.to_string(),
            });
        }

        let same_continent: Vec<&Region> = match &source.continent {
            Some(continent) => catalog
                .iter()
                .filter(|r| r.continent.as_deref() == Some(continent))
                .collect(),
            None => Vec::new(),
        };
        let pool: Vec<&Region> = if same_continent.is_empty() {
            catalog.iter().collect()
        } else {
            same_continent
        };

        let best = pool
            .into_iter()
            .min_by(|a, b| rank(&source, a, b))
            .expect("pool is non-empty");

        debug!(
            "Resolved region {}:{} -> {}:{} ({:.0} km)",
            source_provider,
            region_code,
            target_provider,
            best.region_code,
            haversine_km(&source, best)
        );
        Ok(best.region_code.clone())
    }
}

/// Great-circle distance between two regions.
fn haversine_km(a: &Region, b: &Region) -> f64 {
    let phi_a = a.latitude.to_radians();
    let phi_b = b.latitude.to_radians();
    let dphi = (b.latitude - a.latitude).to_radians();
    let dlambda = (b.longitude - a.longitude).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi_a.cos() * phi_b.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

fn rank(source: &Region, a: &Region, b: &Region) -> Ordering {
    haversine_km(source, a)
        .total_cmp(&haversine_km(source, b))
        .then_with(|| a.region_code.cmp(&b.region_code))
}
