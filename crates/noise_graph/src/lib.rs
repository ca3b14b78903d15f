#![forbid(unsafe_code)]
//! noise_graph: composable noise-field generator graphs with tier-specialized evaluation.
//!
//! A graph is a DAG of generator nodes shared through `Arc`. Every node is built for one
//! hardware [`tier::Tier`] and evaluates whole grids or scattered position sets in lane
//! batches of that tier's width, reporting the min/max of everything it wrote.
//!
//! Modules:
//! - generator: the [`generator::Generator`] contract and the batch drivers
//! - source: slots that bind upstream nodes, with tier checking and a cached kernel path
//! - generators: built-in node types (constants, white and value noise, blends, modifiers, fractals)
//! - metadata: static descriptors and the name registry
//! - graph: describe a graph as data and compile it for a tier
//! - request: validated requests and allocating helpers
//!
//! For examples, see the `noise_graph_examples` crate.
pub mod error;
pub mod generator;
pub mod generators;
pub mod graph;
pub mod lanes;
pub mod metadata;
pub mod range;
pub mod request;
pub mod source;
pub mod tier;

/// Convenient re-exports for common types. Import with `use noise_graph::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::generator::{Generator, Kernel, Node};
    pub use crate::generators::{
        shared, Add, Constant, DomainOffset, DomainScale, FractalFbm, FractalRidged, Max, Min,
        Multiply, PositionOutput, Remap, Subtract, Value, White,
    };
    pub use crate::graph::{CompiledGraph, GraphCompiler, GraphSpec, HybridSpec, NodeSpec};
    pub use crate::metadata::{HybridMeta, Metadata, VariableMeta};
    pub use crate::range::ValueRange;
    pub use crate::request::{GeneratorExt, GridRequest2D, GridRequest3D, NoiseBuffer};
    pub use crate::source::{BaseSource, GeneratorSource, HybridSource};
    pub use crate::tier::{Level, Scalar, Tier, Vector128, Vector256, Vector512};
    pub use crate::with_level;
}
