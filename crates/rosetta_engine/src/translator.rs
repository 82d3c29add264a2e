//! The resource translator.
//!
//! Walks a plan document, rewrites each resource's type identifier and
//! attribute fields through the mapping store and the equivalence
//! resolvers, and emits a new document plus a report. The input document is
//! never mutated: a run yields either a complete translated document or a
//! fatal error, never a partial application.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use rosetta_plan::{substitute_provider_tokens, AttrValue, PlanDocument, ResourceInstance};
use rosetta_resolve::{
    ImageResolver, InstanceResolver, RegionResolver, ResolveError, ResolverContext,
};
use rosetta_store::{FieldRule, MappingStore, ResourceMapping};

use crate::error::{TranslateError, TranslateResult};
use crate::report::{ResourceStatus, TranslationReport};

/// Options for a translation run.
#[derive(Debug, Clone, Default)]
pub struct TranslateOptions {
    /// Translate resources on the rayon thread pool. Output is identical to
    /// a serial run; resource instances are independent and outcomes are
    /// folded in document order.
    pub parallel: bool,
}

impl TranslateOptions {
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

/// A completed translation run.
#[derive(Debug, Clone)]
pub struct Translation {
    pub document: PlanDocument,
    pub report: TranslationReport,
}

/// Translates plan documents between provider vocabularies.
pub struct Translator {
    store: Arc<dyn MappingStore>,
    options: TranslateOptions,
}

/// Mappings prefetched for one run, keyed by source resource type.
type MappingTable = BTreeMap<String, Option<ResourceMapping>>;

impl Translator {
    /// Create a translator over a mapping store handle.
    pub fn new(store: Arc<dyn MappingStore>) -> Self {
        Self {
            store,
            options: TranslateOptions::default(),
        }
    }

    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    /// Translate a plan document from `source_provider` to
    /// `target_provider`.
    ///
    /// Fails fast with [`TranslateError::UnknownProvider`] before touching
    /// any resource when either identifier has no records in the store.
    /// Per-resource problems never fail the run; they are degraded in place
    /// and enumerated in the returned report.
    pub fn translate(
        &self,
        document: &PlanDocument,
        source_provider: &str,
        target_provider: &str,
    ) -> TranslateResult<Translation> {
        let known = self.store.providers()?;
        for provider in [source_provider, target_provider] {
            if !known.iter().any(|p| p == provider) {
                return Err(TranslateError::UnknownProvider(provider.to_string()));
            }
        }

        info!(
            "Translating plan: {} resources, {} -> {}",
            document.resources.len(),
            source_provider,
            target_provider
        );

        if source_provider == target_provider {
            // Identity run: structurally identical output, clean report.
            let mut report = TranslationReport::default();
            report.total = document.resources.len();
            report.translated = document.resources.len();
            return Ok(Translation {
                document: document.clone(),
                report,
            });
        }

        let mappings = self.prefetch_mappings(document, source_provider, target_provider)?;
        let ctx = ResolverContext::new();

        let outcomes: Vec<TranslateResult<(ResourceInstance, ResourceStatus)>> =
            if self.options.parallel {
                document
                    .resources
                    .par_iter()
                    .map(|resource| {
                        self.translate_resource(
                            &ctx,
                            &mappings,
                            source_provider,
                            target_provider,
                            resource,
                        )
                    })
                    .collect()
            } else {
                document
                    .resources
                    .iter()
                    .map(|resource| {
                        self.translate_resource(
                            &ctx,
                            &mappings,
                            source_provider,
                            target_provider,
                            resource,
                        )
                    })
                    .collect()
            };

        let mut resources = Vec::with_capacity(outcomes.len());
        let mut report = TranslationReport::default();
        for outcome in outcomes {
            let (instance, status) = outcome?;
            report.record(&instance.address, &instance.type_name, status);
            resources.push(instance);
        }

        let mut translated = PlanDocument {
            resources,
            remainder: document.remainder.clone(),
        };
        // Final, unconditional step: the opaque remainder keeps its shape
        // apart from the provider name itself.
        translated.substitute_provider(source_provider, target_provider);

        info!(
            "Translation complete: {}/{} translated, {} partial, {} untranslated",
            report.translated,
            report.total,
            report.partial.len(),
            report.untranslated.len()
        );
        Ok(Translation {
            document: translated,
            report,
        })
    }

    /// One store lookup per distinct resource type, validated before any
    /// resource is rewritten so a conflicting mapping definition blocks the
    /// run instead of silently picking a rule.
    fn prefetch_mappings(
        &self,
        document: &PlanDocument,
        source_provider: &str,
        target_provider: &str,
    ) -> TranslateResult<MappingTable> {
        let mut mappings = MappingTable::new();
        for resource in &document.resources {
            if mappings.contains_key(&resource.type_name) {
                continue;
            }
            let mapping = self.store.resource_mapping(
                source_provider,
                &resource.type_name,
                target_provider,
            )?;
            if let Some(mapping) = &mapping {
                mapping.validate()?;
            }
            mappings.insert(resource.type_name.clone(), mapping);
        }
        debug!(
            "Prefetched {} type mappings ({} resolvable)",
            mappings.len(),
            mappings.values().filter(|m| m.is_some()).count()
        );
        Ok(mappings)
    }

    fn translate_resource(
        &self,
        ctx: &ResolverContext,
        mappings: &MappingTable,
        source_provider: &str,
        target_provider: &str,
        resource: &ResourceInstance,
    ) -> TranslateResult<(ResourceInstance, ResourceStatus)> {
        let Some(mapping) = mappings.get(&resource.type_name).and_then(Option::as_ref) else {
            debug!(
                "No mapping for {} ({}); passing through",
                resource.type_name, resource.address
            );
            return Ok((
                resource.clone(),
                ResourceStatus::Untranslated(format!(
                    "no mapping for type '{}'",
                    resource.type_name
                )),
            ));
        };

        let mut instance = resource.clone();
        instance.type_name = mapping.target_type.clone();
        for value in instance.extra.values_mut() {
            substitute_provider_tokens(value, source_provider, target_provider);
        }

        let mut missing = Vec::new();
        for rule in &mapping.field_rules {
            self.apply_rule(
                ctx,
                rule,
                &mut instance.attributes,
                source_provider,
                target_provider,
                &mut missing,
            )?;
        }

        let status = if missing.is_empty() {
            ResourceStatus::Translated
        } else {
            ResourceStatus::PartiallyTranslated(missing)
        };
        Ok((instance, status))
    }

    fn apply_rule(
        &self,
        ctx: &ResolverContext,
        rule: &FieldRule,
        attrs: &mut BTreeMap<String, AttrValue>,
        source_provider: &str,
        target_provider: &str,
        missing: &mut Vec<String>,
    ) -> TranslateResult<()> {
        match rule {
            FieldRule::Rename { from, to } => {
                if let Some(value) = attrs.remove(from) {
                    attrs.insert(to.clone(), value);
                }
            }
            FieldRule::Constant { key, value } => {
                attrs.insert(key.clone(), AttrValue::from_json(value));
            }
            FieldRule::Drop { key } => {
                attrs.remove(key);
            }
            FieldRule::InstanceType { from, to }
            | FieldRule::Region { from, to }
            | FieldRule::Image { from, to } => {
                self.apply_substitution(
                    ctx,
                    rule,
                    from,
                    to,
                    attrs,
                    source_provider,
                    target_provider,
                    missing,
                )?;
            }
        }
        Ok(())
    }

    /// The one degrade-and-report path shared by all substitution rules:
    /// a local resolver miss leaves the original value in place under its
    /// original key and records the miss; only store failures abort.
    #[allow(clippy::too_many_arguments)]
    fn apply_substitution(
        &self,
        ctx: &ResolverContext,
        rule: &FieldRule,
        from: &str,
        to: &str,
        attrs: &mut BTreeMap<String, AttrValue>,
        source_provider: &str,
        target_provider: &str,
        missing: &mut Vec<String>,
    ) -> TranslateResult<()> {
        enum Probe {
            Absent,
            Reference,
            NotString,
            Text(String),
        }

        let probe = match attrs.get(from) {
            None => Probe::Absent,
            Some(value) if value.is_reference() => Probe::Reference,
            Some(AttrValue::String(s)) => Probe::Text(s.clone()),
            Some(_) => Probe::NotString,
        };

        let text = match probe {
            Probe::Absent => return Ok(()),
            Probe::Reference => {
                // References pass through verbatim; the referenced resource
                // translates independently, so only the key moves.
                if from != to {
                    if let Some(value) = attrs.remove(from) {
                        attrs.insert(to.to_string(), value);
                    }
                }
                return Ok(());
            }
            Probe::NotString => {
                warn!(
                    "{} attribute '{}' is not a string; leaving it untranslated",
                    rule.kind(),
                    from
                );
                missing.push(format!("{} attribute '{}' is not a string", rule.kind(), from));
                return Ok(());
            }
            Probe::Text(text) => text,
        };

        let resolved = match rule {
            FieldRule::InstanceType { .. } => InstanceResolver::resolve(
                ctx,
                self.store.as_ref(),
                source_provider,
                &text,
                target_provider,
            ),
            FieldRule::Region { .. } => RegionResolver::resolve(
                ctx,
                self.store.as_ref(),
                source_provider,
                &text,
                target_provider,
            ),
            FieldRule::Image { .. } => ImageResolver::resolve(
                ctx,
                self.store.as_ref(),
                source_provider,
                &text,
                target_provider,
            ),
            _ => unreachable!("apply_substitution is only called for substitution rules"),
        };

        match resolved {
            Ok(value) => {
                attrs.remove(from);
                attrs.insert(to.to_string(), AttrValue::String(value));
            }
            Err(ResolveError::Store(err)) => return Err(err.into()),
            Err(err) => {
                warn!(
                    "Leaving {} '{}' untranslated: {}",
                    rule.kind(),
                    text,
                    err
                );
                missing.push(format!("{} '{}': {}", rule.kind(), text, err));
            }
        }
        Ok(())
    }
}
