use glam::UVec2;
use noise_graph::prelude::*;
use noise_graph_examples::{init_tracing, render_buffer_to_png, Palette};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let spec = warp_spec();
    let graph = GraphCompiler::compile(&spec, Tier::Vector256)?;
    let terrain = graph.output("terrain")?;

    let size = UVec2::new(512, 512);
    let request = GridRequest2D::new(size).with_frequency(0.008).with_seed(2024);
    let buffer = terrain.grid_2d(&request)?;

    render_buffer_to_png(
        &buffer,
        size.x,
        size.y,
        Palette::Terrain,
        "graph-spec-domain-warp.png",
    )?;
    Ok(())
}

/// Fractal value noise whose input domain is pushed around by two other fractals.
///
/// The warp fractals share a single value-noise node; the compiler builds it once.
fn warp_spec() -> GraphSpec {
    let mut spec = GraphSpec::default();
    spec.add("value", NodeSpec::new("Value"));
    spec.add(
        "warp_x",
        NodeSpec::new("FractalFbm")
            .with_source("source", "value")
            .with_variable("octaves", 3.0),
    );
    spec.add(
        "warp_y",
        NodeSpec::new("DomainOffset")
            .with_source("source", "warp_x")
            .with_hybrid_constant("offset_x", 17.3)
            .with_hybrid_constant("offset_y", -4.1),
    );
    spec.add(
        "base",
        NodeSpec::new("FractalFbm")
            .with_source("source", "value")
            .with_variable("octaves", 5.0)
            .with_hybrid_constant("gain", 0.45),
    );
    spec.add(
        "warped",
        NodeSpec::new("DomainOffset")
            .with_source("source", "base")
            .with_hybrid_node("offset_x", "warp_x")
            .with_hybrid_node("offset_y", "warp_y"),
    );
    spec.add(
        "terrain",
        NodeSpec::new("Remap")
            .with_source("source", "warped")
            .with_variable("to_min", 0.0)
            .with_variable("to_max", 1.0),
    );
    spec
}
