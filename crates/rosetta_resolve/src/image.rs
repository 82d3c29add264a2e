//! Image equivalence by operating system.

use tracing::debug;

use rosetta_store::MappingStore;

use crate::context::ResolverContext;
use crate::error::{ResolveError, ResolveResult};

/// Resolves a source image identifier to the target provider's image for the
/// same operating system family and version.
pub struct ImageResolver;

impl ImageResolver {
    pub fn resolve(
        ctx: &ResolverContext,
        store: &dyn MappingStore,
        source_provider: &str,
        image_name: &str,
        target_provider: &str,
    ) -> ResolveResult<String> {
        let key = (
            source_provider.to_string(),
            image_name.to_string(),
            target_provider.to_string(),
        );
        ctx.memoize_image(key, || {
            Self::resolve_uncached(store, source_provider, image_name, target_provider)
        })
    }

    fn resolve_uncached(
        store: &dyn MappingStore,
        source_provider: &str,
        image_name: &str,
        target_provider: &str,
    ) -> ResolveResult<String> {
        let source = store
            .image(source_provider, image_name)?
            .ok_or_else(|| ResolveError::UnknownImage {
                provider: source_provider.to_string(),
                image_name: image_name.to_string(),
            })?;

        let target = store
            .image_by_os(
                target_provider,
                &source.os_family,
                &source.os_version,
                source.architecture.as_deref(),
            )?
            .ok_or_else(|| ResolveError::NoImageEquivalent {
                provider: target_provider.to_string(),
                os_family: source.os_family.clone(),
                os_version: source.os_version.clone(),
            })?;

        debug!(
            "Resolved image {}:{} -> {}:{} ({} {})",
            source_provider,
            image_name,
            target_provider,
            target.image_name,
            source.os_family,
            source.os_version
        );
        Ok(target.image_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rosetta_store::{Image, MemoryStore};

    fn image(provider: &str, name: &str, family: &str, version: &str) -> Image {
        Image {
            provider: provider.to_string(),
            image_name: name.to_string(),
            os_family: family.to_string(),
            os_version: version.to_string(),
            architecture: None,
        }
    }

    #[test]
    fn test_resolves_by_os_family_and_version() {
        let mut store = MemoryStore::new();
        store.add_image(image("ovh", "Ubuntu 22.04", "ubuntu", "22.04")).unwrap();
        store.add_image(image("aws", "ami-ubuntu-22.04", "ubuntu", "22.04")).unwrap();
        store.add_image(image("aws", "ami-debian-12", "debian", "12")).unwrap();
        let ctx = ResolverContext::new();

        let resolved = ImageResolver::resolve(&ctx, &store, "ovh", "Ubuntu 22.04", "aws").unwrap();
        assert_eq!(resolved, "ami-ubuntu-22.04");
    }

    #[test]
    fn test_unknown_source_image_is_local() {
        let store = MemoryStore::new();
        let ctx = ResolverContext::new();

        let err = ImageResolver::resolve(&ctx, &store, "ovh", "Plan 9", "aws").unwrap_err();
        assert!(matches!(err, ResolveError::UnknownImage { .. }));
        assert!(err.is_local());
    }

    #[test]
    fn test_missing_target_equivalent_is_local() {
        let mut store = MemoryStore::new();
        store.add_image(image("ovh", "Rocky Linux 8", "rocky", "8")).unwrap();
        let ctx = ResolverContext::new();

        let err = ImageResolver::resolve(&ctx, &store, "ovh", "Rocky Linux 8", "aws").unwrap_err();
        assert!(matches!(err, ResolveError::NoImageEquivalent { .. }));
        assert!(err.is_local());
    }
}
