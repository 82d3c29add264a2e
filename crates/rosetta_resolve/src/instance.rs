//! Instance type equivalence by hardware characteristics.

use std::cmp::Ordering;

use tracing::{debug, warn};

use rosetta_store::{InstanceType, MappingStore};

use crate::context::ResolverContext;
use crate::error::{ResolveError, ResolveResult};

/// Resolves a source provider's instance type to the closest equivalent in
/// a target provider's catalog, by vCPU count and memory rather than name.
pub struct InstanceResolver;

impl InstanceResolver {
    /// Find the best-matching target instance type.
    ///
    /// Candidates that meet or exceed the source on both vCPU and memory are
    /// preferred, so the translated estimate is never sized below the
    /// declared workload when the target catalog allows it; only when no
    /// candidate qualifies does resolution fall back to the full catalog as
    /// a best-effort undersize. Within the candidate pool the winner is the
    /// lowest normalized distance
    /// `|Δvcpu| / vcpu + |Δmemory| / memory` (equal weight on both axes),
    /// with a matching family preferred when the source is tagged, then
    /// lowest hourly price, then lexicographically smallest type id.
    pub fn resolve(
        ctx: &ResolverContext,
        store: &dyn MappingStore,
        source_provider: &str,
        source_type: &str,
        target_provider: &str,
    ) -> ResolveResult<String> {
        let key = (
            source_provider.to_string(),
            source_type.to_string(),
            target_provider.to_string(),
        );
        ctx.memoize_instance(key, || {
            Self::resolve_uncached(ctx, store, source_provider, source_type, target_provider)
        })
    }

    fn resolve_uncached(
        ctx: &ResolverContext,
        store: &dyn MappingStore,
        source_provider: &str,
        source_type: &str,
        target_provider: &str,
    ) -> ResolveResult<String> {
        let source_catalog = ctx.instance_catalog(store, source_provider)?;
        let source = source_catalog
            .iter()
            .find(|i| i.type_id == source_type)
            .ok_or_else(|| ResolveError::UnknownInstanceType {
                provider: source_provider.to_string(),
                type_id: source_type.to_string(),
            })?;

        let catalog = ctx.instance_catalog(store, target_provider)?;
        if catalog.is_empty() {
            return Err(ResolveError::EmptyCatalog {
                provider: target_provider.to_string(),
            });
        }

        let adequate: Vec<&InstanceType> = catalog
            .iter()
            .filter(|c| c.vcpu >= source.vcpu && c.memory_gb >= source.memory_gb)
            .collect();

        let pool: Vec<&InstanceType> = if adequate.is_empty() {
            warn!(
                "No {} instance meets or exceeds {}:{} ({} vCPU, {} GB); falling back to undersized candidates",
                target_provider, source_provider, source_type, source.vcpu, source.memory_gb
            );
            catalog.iter().collect()
        } else {
            adequate
        };

        let best = pool
            .into_iter()
            .min_by(|a, b| rank(source, a, b))
            .expect("pool is non-empty");

        debug!(
            "Resolved {}:{} -> {}:{} (distance {:.4})",
            source_provider,
            source_type,
            target_provider,
            best.type_id,
            distance(source, best)
        );
        Ok(best.type_id.clone())
    }
}

fn distance(source: &InstanceType, candidate: &InstanceType) -> f64 {
    let dv = (candidate.vcpu as f64 - source.vcpu as f64).abs() / source.vcpu as f64;
    let dm = (candidate.memory_gb - source.memory_gb).abs() / source.memory_gb;
    dv + dm
}

fn family_rank(source: &InstanceType, candidate: &InstanceType) -> u8 {
    match (&source.family, &candidate.family) {
        (Some(s), Some(c)) if s == c => 0,
        (Some(_), _) => 1,
        // Untagged source: no family preference.
        (None, _) => 0,
    }
}

fn rank(source: &InstanceType, a: &InstanceType, b: &InstanceType) -> Ordering {
    family_rank(source, a)
        .cmp(&family_rank(source, b))
        .then_with(|| distance(source, a).total_cmp(&distance(source, b)))
        .then_with(|| a.hourly_price.total_cmp(&b.hourly_price))
        .then_with(|| a.type_id.cmp(&b.type_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosetta_store::MemoryStore;

    fn instance(
        provider: &str,
        type_id: &str,
        vcpu: u32,
        memory_gb: f64,
        family: Option<&str>,
        hourly_price: f64,
    ) -> InstanceType {
        InstanceType {
            provider: provider.to_string(),
            type_id: type_id.to_string(),
            vcpu,
            memory_gb,
            family: family.map(str::to_string),
            generation: 1,
            hourly_price,
        }
    }

    fn store_with(instances: Vec<InstanceType>) -> MemoryStore {
        let mut store = MemoryStore::new();
        for i in instances {
            store.add_instance_type(i).unwrap();
        }
        store
    }

    #[test]
    fn test_meets_or_exceeds_beats_closer_undersized() {
        // t3.micro (1 vCPU, 1 GB) against {d2-2 (1, 2), b2-7 (2, 7)}:
        // both qualify, d2-2 is nearer.
        let store = store_with(vec![
            instance("aws", "t3.micro", 1, 1.0, None, 0.0104),
            instance("ovh", "d2-2", 1, 2.0, None, 0.0084),
            instance("ovh", "b2-7", 2, 7.0, None, 0.0278),
        ]);
        let ctx = ResolverContext::new();

        let resolved = InstanceResolver::resolve(&ctx, &store, "aws", "t3.micro", "ovh").unwrap();
        assert_eq!(resolved, "d2-2");
    }

    #[test]
    fn test_never_undersizes_when_a_candidate_qualifies() {
        // cx31 (2 vCPU, 8 GB): d2-4 (2, 4) is much closer by distance but
        // undersized on memory; b2-15 qualifies and must win.
        let store = store_with(vec![
            instance("hetzner", "cx31", 2, 8.0, None, 0.0137),
            instance("ovh", "d2-4", 2, 4.0, None, 0.0168),
            instance("ovh", "b2-15", 4, 15.0, None, 0.0556),
        ]);
        let ctx = ResolverContext::new();

        let resolved = InstanceResolver::resolve(&ctx, &store, "hetzner", "cx31", "ovh").unwrap();
        assert_eq!(resolved, "b2-15");
    }

    #[test]
    fn test_undersize_fallback_when_nothing_qualifies() {
        let store = store_with(vec![
            instance("aws", "m5.8xlarge", 32, 128.0, None, 1.536),
            instance("ovh", "d2-2", 1, 2.0, None, 0.0084),
            instance("ovh", "b2-30", 8, 30.0, None, 0.1111),
        ]);
        let ctx = ResolverContext::new();

        let resolved =
            InstanceResolver::resolve(&ctx, &store, "aws", "m5.8xlarge", "ovh").unwrap();
        assert_eq!(resolved, "b2-30");
    }

    #[test]
    fn test_family_preferred_when_tagged() {
        // Same specs, one candidate shares the compute family tag.
        let store = store_with(vec![
            instance("ovh", "c2-7", 2, 7.0, Some("compute"), 0.0417),
            instance("aws", "m5.general", 2, 8.0, Some("general"), 0.096),
            instance("aws", "c5.compute", 2, 8.0, Some("compute"), 0.099),
        ]);
        let ctx = ResolverContext::new();

        let resolved = InstanceResolver::resolve(&ctx, &store, "ovh", "c2-7", "aws").unwrap();
        assert_eq!(resolved, "c5.compute");
    }

    #[test]
    fn test_price_then_name_break_exact_ties() {
        let store = store_with(vec![
            instance("ovh", "d2-4", 2, 4.0, None, 0.0168),
            instance("aws", "t3.medium", 2, 4.0, None, 0.0416),
            instance("aws", "a1.medium", 2, 4.0, None, 0.0416),
            instance("aws", "t2.medium", 2, 4.0, None, 0.0464),
        ]);
        let ctx = ResolverContext::new();

        // Equal distance; t2.medium loses on price, a1 beats t3 lexically.
        let resolved = InstanceResolver::resolve(&ctx, &store, "ovh", "d2-4", "aws").unwrap();
        assert_eq!(resolved, "a1.medium");
    }

    #[test]
    fn test_unknown_source_type_is_local() {
        let store = store_with(vec![instance("ovh", "d2-2", 1, 2.0, None, 0.0084)]);
        let ctx = ResolverContext::new();

        let err = InstanceResolver::resolve(&ctx, &store, "aws", "t9.mystery", "ovh").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownInstanceType { .. }));
        assert!(err.is_local());
    }

    #[test]
    fn test_empty_target_catalog_is_local() {
        let store = store_with(vec![instance("aws", "t3.micro", 1, 1.0, None, 0.0104)]);
        let ctx = ResolverContext::new();

        let err = InstanceResolver::resolve(&ctx, &store, "aws", "t3.micro", "ovh").unwrap_err();
        assert!(matches!(err, ResolveError::EmptyCatalog { .. }));
        assert!(err.is_local());
    }

    #[test]
    fn test_outcome_is_memoized_per_run() {
        let store = store_with(vec![
            instance("aws", "t3.micro", 1, 1.0, None, 0.0104),
            instance("ovh", "d2-2", 1, 2.0, None, 0.0084),
        ]);
        let ctx = ResolverContext::new();

        let first = InstanceResolver::resolve(&ctx, &store, "aws", "t3.micro", "ovh").unwrap();
        let second = InstanceResolver::resolve(&ctx, &store, "aws", "t3.micro", "ovh").unwrap();
        assert_eq!(first, second);
    }
}
