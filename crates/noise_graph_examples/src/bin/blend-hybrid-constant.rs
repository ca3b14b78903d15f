use glam::{UVec2, Vec3};
use noise_graph::prelude::*;
use noise_graph_examples::{init_tracing, render_buffer_to_png, Palette};
use tracing::info;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let size = UVec2::new(256, 256);
    let request = GridRequest2D::new(size).with_frequency(0.04).with_seed(3);
    let noise = shared(Value::<Vector128>::new());

    // rhs as a constant: a uniform lift of the noise.
    let mut lifted = Add::<Vector128>::new();
    lifted.set_lhs(&noise)?;
    lifted.set_rhs_constant(0.5);
    let buffer = lifted.grid_2d(&request)?;
    info!("Constant rhs: range {:?}", buffer.range);
    render_buffer_to_png(&buffer, size.x, size.y, Palette::Grayscale, "blend-constant.png")?;

    // rhs bound to a ramp: the noise fades in from left to right.
    let slope = 1.0 / (size.x as f32 * request.frequency);
    let ramp = shared(PositionOutput::<Vector128>::new().with_multiplier(Vec3::X * slope));
    let mut faded = Multiply::<Vector128>::new();
    faded.set_lhs(&noise)?;
    faded.set_rhs(&ramp)?;
    let buffer = faded.grid_2d(&request)?;
    info!("Ramp rhs: range {:?}", buffer.range);
    render_buffer_to_png(&buffer, size.x, size.y, Palette::Grayscale, "blend-ramp.png")?;

    // Binding a node from another tier is refused and leaves the slot as it was.
    let scalar_ramp = shared(PositionOutput::<Scalar>::new());
    if let Err(err) = faded.set_rhs(&scalar_ramp) {
        info!("Rejected binding: {err}");
    }

    Ok(())
}
