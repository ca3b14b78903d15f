//! Compiler for graph specifications into bound generator nodes.
//!
//! This module turns a [`GraphSpec`] into a [`CompiledGraph`] for one [`Tier`]. It checks
//! node references and generator names, computes a topological order, and then constructs
//! every node exactly once in that order, binding each slot to the already built upstream
//! node. A node read by several others is therefore shared, not duplicated.
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::graph::{GraphSpec, HybridSpec, NodeId, NodeSpec};
use crate::metadata::{self, Metadata};
use crate::tier::Tier;

/// Nodes built from a [`GraphSpec`], all at the same tier.
pub struct CompiledGraph {
    tier: Tier,
    nodes: BTreeMap<NodeId, Arc<dyn Generator>>,
    order: Vec<NodeId>,
}

impl CompiledGraph {
    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn get(&self, id: &str) -> Option<&Arc<dyn Generator>> {
        self.nodes.get(id)
    }

    /// Returns a shared handle to node `id` for evaluation.
    pub fn output(&self, id: &str) -> Result<Arc<dyn Generator>> {
        self.nodes
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Compile(format!("Graph has no node '{}'", id)))
    }

    /// Node ids with dependencies first.
    pub fn order(&self) -> &[NodeId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl std::fmt::Debug for CompiledGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledGraph")
            .field("tier", &self.tier)
            .field("order", &self.order)
            .finish()
    }
}

/// Compiler for graph specifications.
pub struct GraphCompiler;

impl GraphCompiler {
    /// Builds every node of `spec` at `tier`.
    pub fn compile(spec: &GraphSpec, tier: Tier) -> Result<CompiledGraph> {
        let mut types: BTreeMap<&str, &'static Metadata> = BTreeMap::new();

        for (id, node_spec) in &spec.nodes {
            for input in node_spec.inputs() {
                if !spec.nodes.contains_key(input) {
                    return Err(Error::Compile(format!(
                        "Node '{}' references unknown input '{}'",
                        id, input
                    )));
                }
            }

            let meta = metadata::find(&node_spec.generator).ok_or_else(|| {
                warn!(
                    "Node '{}' uses unknown generator '{}'.",
                    id, node_spec.generator
                );
                Error::UnknownGenerator {
                    name: node_spec.generator.clone(),
                }
            })?;
            types.insert(id.as_str(), meta);
        }

        let order = topo_sort(&spec.nodes)?;

        let mut nodes: BTreeMap<NodeId, Arc<dyn Generator>> = BTreeMap::new();
        for id in &order {
            let (Some(node_spec), Some(meta)) = (spec.nodes.get(id), types.get(id.as_str()))
            else {
                return Err(Error::Compile(format!("Node '{}' vanished during compile", id)));
            };
            let node = build_node(id, node_spec, meta, tier, &nodes)?;
            nodes.insert(id.clone(), node);
        }

        debug!(
            "Compiled graph with {} nodes at tier {}.",
            nodes.len(),
            tier
        );
        Ok(CompiledGraph { tier, nodes, order })
    }
}

fn build_node(
    id: &str,
    spec: &NodeSpec,
    meta: &Metadata,
    tier: Tier,
    built: &BTreeMap<NodeId, Arc<dyn Generator>>,
) -> Result<Arc<dyn Generator>> {
    let upstream = |input: &NodeId| {
        built.get(input).ok_or_else(|| {
            Error::Compile(format!(
                "Node '{}' reads '{}' before it was built",
                id, input
            ))
        })
    };

    let mut node = meta.create(tier);
    for (name, value) in &spec.variables {
        node.set_variable(name, *value)?;
    }
    for (slot, input) in &spec.sources {
        node.set_source(slot, upstream(input)?)?;
    }
    for (slot, hybrid) in &spec.hybrids {
        match hybrid {
            HybridSpec::Node(input) => node.set_hybrid_source(slot, upstream(input)?)?,
            HybridSpec::Constant(value) => node.set_hybrid_constant(slot, *value)?,
        }
    }
    node.validate()?;

    debug!("Built node '{}' ({}).", id, meta.name);
    Ok(Arc::from(node))
}

fn topo_sort(nodes: &BTreeMap<NodeId, NodeSpec>) -> Result<Vec<NodeId>> {
    let mut indeg: BTreeMap<&str, usize> = BTreeMap::new();
    let mut dependents: BTreeMap<&str, BTreeMap<&str, usize>> = BTreeMap::new();

    for (id, spec) in nodes {
        let id_str = id.as_str();
        let mut count = 0;

        for input in spec.inputs() {
            count += 1;
            dependents
                .entry(input.as_str())
                .or_default()
                .entry(id_str)
                .and_modify(|c| *c += 1)
                .or_insert(1);
        }
        indeg.insert(id_str, count);
    }

    let mut q: Vec<&str> = indeg
        .iter()
        .rev()
        .filter_map(|(k, &v)| if v == 0 { Some(*k) } else { None })
        .collect();
    let mut out: Vec<NodeId> = Vec::new();

    while let Some(n) = q.pop() {
        out.push(n.to_string());

        if let Some(children) = dependents.get(n) {
            for (child, count) in children {
                if let Some(e) = indeg.get_mut(child) {
                    *e = e.saturating_sub(*count);
                    if *e == 0 {
                        q.push(child);
                    }
                }
            }
        }
    }

    if out.len() != nodes.len() {
        let stuck: Vec<&str> = indeg
            .iter()
            .filter_map(|(k, &v)| if v > 0 { Some(*k) } else { None })
            .collect();
        return Err(Error::Compile(format!(
            "Cycle detected among nodes {:?}",
            stuck
        )));
    }

    Ok(out)
}
