use glam::UVec2;
use noise_graph::prelude::*;
use noise_graph_examples::{init_tracing, render_buffer_to_png, Palette};

fn main() -> anyhow::Result<()> {
    init_tracing();

    // Five octaves of value noise, wired with the typed API at a fixed level.
    let mut fbm = FractalFbm::<Vector256>::new()
        .with_octaves(5)
        .with_lacunarity(2.0);
    fbm.set_input(&shared(Value::<Vector256>::new()))?;
    fbm.set_hybrid_constant("gain", 0.5)?;

    let size = UVec2::new(512, 512);
    let request = GridRequest2D::new(size).with_frequency(0.01).with_seed(7);
    let buffer = fbm.grid_2d(&request)?;

    render_buffer_to_png(
        &buffer,
        size.x,
        size.y,
        Palette::Terrain,
        "value-fbm-grid.png",
    )?;
    Ok(())
}
