//! Specification types for authoring generator graphs by name.
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::graph::NodeId;

/// Value of a hybrid slot in a spec: another node or a constant.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Clone, Debug, PartialEq)]
pub enum HybridSpec {
    Node(NodeId),
    Constant(f32),
}

/// One node: a registered generator name plus its slot and variable settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeSpec {
    /// Registry name of the generator type.
    pub generator: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sources: BTreeMap<String, NodeId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hybrids: BTreeMap<String, HybridSpec>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub variables: BTreeMap<String, f32>,
}

impl NodeSpec {
    pub fn new(generator: &str) -> Self {
        Self {
            generator: generator.to_string(),
            ..Default::default()
        }
    }

    /// Binds source slot `slot` to node `id`.
    pub fn with_source(mut self, slot: &str, id: &str) -> Self {
        self.sources.insert(slot.to_string(), id.to_string());
        self
    }

    /// Binds hybrid slot `slot` to node `id`.
    pub fn with_hybrid_node(mut self, slot: &str, id: &str) -> Self {
        self.hybrids
            .insert(slot.to_string(), HybridSpec::Node(id.to_string()));
        self
    }

    pub fn with_hybrid_constant(mut self, slot: &str, value: f32) -> Self {
        self.hybrids
            .insert(slot.to_string(), HybridSpec::Constant(value));
        self
    }

    pub fn with_variable(mut self, name: &str, value: f32) -> Self {
        self.variables.insert(name.to_string(), value);
        self
    }

    /// Ids of every node this node reads, once per slot.
    pub fn inputs(&self) -> impl Iterator<Item = &NodeId> + '_ {
        let hybrids = self.hybrids.values().filter_map(|h| match h {
            HybridSpec::Node(id) => Some(id),
            HybridSpec::Constant(_) => None,
        });
        self.sources.values().chain(hybrids)
    }
}

/// A specification of a generator graph keyed by node id.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphSpec {
    pub nodes: BTreeMap<NodeId, NodeSpec>,
}

impl GraphSpec {
    /// Add a node to the graph specification, replacing any node with the same id.
    pub fn add(&mut self, id: &str, spec: NodeSpec) -> &mut Self {
        self.nodes.insert(id.to_string(), spec);
        self
    }

    pub fn with(mut self, id: &str, spec: NodeSpec) -> Self {
        self.add(id, spec);
        self
    }

    pub fn get(&self, id: &str) -> Option<&NodeSpec> {
        self.nodes.get(id)
    }
}
