use std::time::Instant;

use anyhow::ensure;
use glam::{UVec3, Vec3};
use noise_graph::prelude::*;
use noise_graph_examples::init_tracing;
use tracing::info;

fn build(tier: Tier) -> anyhow::Result<std::sync::Arc<dyn Generator>> {
    with_level!(tier, L => {
        let mut ridged = FractalRidged::<L>::new().with_octaves(4);
        ridged.set_input(&shared(Value::<L>::new()))?;

        let mut out = Max::<L>::new();
        out.set_lhs(&shared(ridged))?;
        out.set_rhs(&shared(
            PositionOutput::<L>::new().with_multiplier(Vec3::new(0.0, 0.0, -0.05)),
        ))?;
        Ok(shared(out))
    })
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let request = GridRequest3D::new(UVec3::new(96, 96, 32))
        .with_frequency(0.05)
        .with_seed(11);

    let reference = build(Tier::Scalar)?.grid_3d(&request)?;
    for tier in Tier::ALL {
        let node = build(tier)?;
        let started = Instant::now();
        let buffer = node.grid_3d(&request)?;
        info!(
            "{:>9}: {} samples in {:?}, range {:.4}..{:.4}",
            tier.name(),
            buffer.len(),
            started.elapsed(),
            buffer.range.min,
            buffer.range.max
        );
        ensure!(
            buffer == reference,
            "{} disagrees with the scalar reference",
            tier
        );
    }

    info!("All tiers produced identical samples.");
    Ok(())
}
