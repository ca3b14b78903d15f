//! Name-based graph authoring: describe a graph as data, then compile it for a tier.
pub mod compiler;
pub mod spec;

pub use compiler::{CompiledGraph, GraphCompiler};
pub use spec::{GraphSpec, HybridSpec, NodeSpec};

/// Identifier of a node within a [`GraphSpec`].
pub type NodeId = String;
