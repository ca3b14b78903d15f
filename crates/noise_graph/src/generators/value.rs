//! Value noise: hashed lattice values blended with a quintic fade.
use std::marker::PhantomData;

use super::hash::{hash_2d, hash_3d, to_signed_unit, PRIME_X, PRIME_Y, PRIME_Z};
use crate::generator::{Generator, Kernel, Node};
use crate::lanes::{interp_quintic, lerp, FloatLanes, IntLanes};
use crate::metadata::Metadata;
use crate::tier::{IntOf, Level, Tier};
use crate::with_level;

/// Smooth noise in `[-1, 1]` with unit lattice spacing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Value<L: Level> {
    _level: PhantomData<L>,
}

impl<L: Level> Value<L> {
    pub fn new() -> Self {
        Self {
            _level: PhantomData,
        }
    }
}

impl<L: Level> Kernel<L> for Value<L> {
    fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        let xf = x.floor();
        let yf = y.floor();
        let px = IntOf::<L>::splat(PRIME_X);
        let py = IntOf::<L>::splat(PRIME_Y);

        let x0 = xf.to_int().wrapping_mul(px);
        let y0 = yf.to_int().wrapping_mul(py);
        let x1 = x0.wrapping_add(px);
        let y1 = y0.wrapping_add(py);

        let xs = interp_quintic(x - xf);
        let ys = interp_quintic(y - yf);

        let v = |xi: IntOf<L>, yi: IntOf<L>| -> L::F { to_signed_unit(hash_2d(seed, xi, yi)) };
        lerp(
            lerp(v(x0, y0), v(x1, y0), xs),
            lerp(v(x0, y1), v(x1, y1), xs),
            ys,
        )
    }

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        let xf = x.floor();
        let yf = y.floor();
        let zf = z.floor();
        let px = IntOf::<L>::splat(PRIME_X);
        let py = IntOf::<L>::splat(PRIME_Y);
        let pz = IntOf::<L>::splat(PRIME_Z);

        let x0 = xf.to_int().wrapping_mul(px);
        let y0 = yf.to_int().wrapping_mul(py);
        let z0 = zf.to_int().wrapping_mul(pz);
        let x1 = x0.wrapping_add(px);
        let y1 = y0.wrapping_add(py);
        let z1 = z0.wrapping_add(pz);

        let xs = interp_quintic(x - xf);
        let ys = interp_quintic(y - yf);
        let zs = interp_quintic(z - zf);

        let v = |xi: IntOf<L>, yi: IntOf<L>, zi: IntOf<L>| -> L::F {
            to_signed_unit(hash_3d(seed, xi, yi, zi))
        };
        let near = lerp(
            lerp(v(x0, y0, z0), v(x1, y0, z0), xs),
            lerp(v(x0, y1, z0), v(x1, y1, z0), xs),
            ys,
        );
        let far = lerp(
            lerp(v(x0, y0, z1), v(x1, y0, z1), xs),
            lerp(v(x0, y1, z1), v(x1, y1, z1), xs),
            ys,
        );
        lerp(near, far, zs)
    }
}

impl<L: Level> Node for Value<L> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        &VALUE
    }
}

fn create_value(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(Value::<L>::new()))
}

pub static VALUE: Metadata = Metadata::new("Value", "Coherent Noise", create_value)
    .with_description("Smoothly interpolated lattice values in [-1, 1].");
