//! Static descriptors for generator types and the process-wide registry.
//!
//! Every generator type owns one `static` [`Metadata`] that names its group, its source and
//! hybrid slots, and its scalar variables. Tooling uses the registry to construct nodes by
//! name for a chosen tier and to configure them through the name-based setters on
//! [`Generator`].
use tracing::warn;

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::generators;
use crate::tier::Tier;

/// A hybrid slot and the constant it starts with.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HybridMeta {
    pub name: &'static str,
    pub default: f32,
}

/// A scalar parameter and its default value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VariableMeta {
    pub name: &'static str,
    pub default: f32,
    pub description: &'static str,
}

/// Static descriptor of one generator type.
#[derive(Debug)]
pub struct Metadata {
    /// Unique type name used for lookup.
    pub name: &'static str,
    /// Group the type is listed under in tooling.
    pub group: &'static str,
    pub description: &'static str,
    /// Mandatory source slots.
    pub sources: &'static [&'static str],
    /// Hybrid slots.
    pub hybrids: &'static [HybridMeta],
    /// Scalar parameters.
    pub variables: &'static [VariableMeta],
    create: fn(Tier) -> Box<dyn Generator>,
}

impl Metadata {
    pub const fn new(
        name: &'static str,
        group: &'static str,
        create: fn(Tier) -> Box<dyn Generator>,
    ) -> Self {
        Self {
            name,
            group,
            description: "",
            sources: &[],
            hybrids: &[],
            variables: &[],
            create,
        }
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub const fn with_sources(mut self, sources: &'static [&'static str]) -> Self {
        self.sources = sources;
        self
    }

    pub const fn with_hybrids(mut self, hybrids: &'static [HybridMeta]) -> Self {
        self.hybrids = hybrids;
        self
    }

    pub const fn with_variables(mut self, variables: &'static [VariableMeta]) -> Self {
        self.variables = variables;
        self
    }

    /// Constructs a node of this type at `tier` with default settings.
    pub fn create(&self, tier: Tier) -> Box<dyn Generator> {
        (self.create)(tier)
    }

    pub fn has_source(&self, slot: &str) -> bool {
        self.sources.iter().any(|s| *s == slot)
    }

    pub fn hybrid(&self, slot: &str) -> Option<&HybridMeta> {
        self.hybrids.iter().find(|h| h.name == slot)
    }

    pub fn variable(&self, name: &str) -> Option<&VariableMeta> {
        self.variables.iter().find(|v| v.name == name)
    }
}

static REGISTRY: [&Metadata; 14] = [
    &generators::basic::CONSTANT,
    &generators::basic::WHITE,
    &generators::basic::POSITION_OUTPUT,
    &generators::value::VALUE,
    &generators::blend::ADD,
    &generators::blend::SUBTRACT,
    &generators::blend::MULTIPLY,
    &generators::blend::MIN,
    &generators::blend::MAX,
    &generators::modifiers::DOMAIN_SCALE,
    &generators::modifiers::DOMAIN_OFFSET,
    &generators::modifiers::REMAP,
    &generators::fractal::FRACTAL_FBM,
    &generators::fractal::FRACTAL_RIDGED,
];

/// Every built-in generator type.
pub fn registry() -> &'static [&'static Metadata] {
    &REGISTRY
}

/// Looks up a generator type by name, ignoring ASCII case.
pub fn find(name: &str) -> Option<&'static Metadata> {
    REGISTRY
        .iter()
        .copied()
        .find(|m| m.name.eq_ignore_ascii_case(name))
}

/// Constructs a generator by type name at `tier`.
pub fn create(name: &str, tier: Tier) -> Result<Box<dyn Generator>> {
    match find(name) {
        Some(meta) => Ok(meta.create(tier)),
        None => {
            warn!("Unknown generator '{}'.", name);
            Err(Error::UnknownGenerator {
                name: name.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use super::*;
    use crate::tier::Vector128;

    #[test]
    fn registry_names_are_unique() {
        let names: HashSet<_> = registry().iter().map(|m| m.name).collect();
        assert_eq!(names.len(), registry().len());
    }

    #[test]
    fn find_ignores_case() {
        let meta = find("domainscale").expect("registered");
        assert_eq!(meta.name, "DomainScale");
        assert!(find("Perlin").is_none());
    }

    #[test]
    fn created_nodes_report_tier_and_descriptor() {
        for meta in registry() {
            for tier in Tier::ALL {
                let node = meta.create(tier);
                assert_eq!(node.tier(), tier);
                assert!(std::ptr::eq(node.metadata(), *meta));
            }
        }
    }

    #[test]
    fn nodes_without_sources_validate_after_creation() {
        for meta in registry() {
            let node = meta.create(Tier::Scalar);
            assert_eq!(
                node.validate().is_ok(),
                meta.sources.is_empty(),
                "{}",
                meta.name
            );
        }
    }

    #[test]
    fn declared_names_are_accepted_by_setters() {
        for meta in registry() {
            let mut node = meta.create(Tier::Vector128);
            for hybrid in meta.hybrids {
                node.set_hybrid_constant(hybrid.name, hybrid.default)
                    .unwrap_or_else(|e| panic!("{}: {e}", meta.name));
            }
            for var in meta.variables {
                node.set_variable(var.name, var.default)
                    .unwrap_or_else(|e| panic!("{}: {e}", meta.name));
            }
            let upstream: Arc<dyn Generator> =
                Arc::new(generators::Constant::<Vector128>::new(1.0));
            for slot in meta.sources {
                node.set_source(slot, &upstream)
                    .unwrap_or_else(|e| panic!("{}: {e}", meta.name));
            }
            assert!(node.validate().is_ok(), "{}", meta.name);
        }
    }

    #[test]
    fn create_reports_unknown_names() {
        assert!(matches!(
            create("Nope", Tier::Scalar),
            Err(Error::UnknownGenerator { .. })
        ));
        assert_eq!(
            create("white", Tier::Vector256).expect("known").tier(),
            Tier::Vector256
        );
    }
}
