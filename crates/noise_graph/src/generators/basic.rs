//! Leaf generators without sources: constants, white noise, and coordinate ramps.
use std::marker::PhantomData;
use std::sync::Arc;

use glam::Vec3;

use super::hash::{coordinate_bits, hash_2d, hash_3d, to_signed_unit, PRIME_X, PRIME_Y, PRIME_Z};
use crate::error::Result;
use crate::generator::{Generator, Kernel, Node};
use crate::lanes::{FloatLanes, IntLanes};
use crate::metadata::{Metadata, VariableMeta};
use crate::tier::{IntOf, Level, Tier};
use crate::with_level;

/// Outputs `value` everywhere.
#[derive(Clone, Copy, Debug)]
pub struct Constant<L: Level> {
    value: f32,
    _level: PhantomData<L>,
}

impl<L: Level> Constant<L> {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            _level: PhantomData,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }
}

impl<L: Level> Default for Constant<L> {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl<L: Level> Kernel<L> for Constant<L> {
    fn gen_2d(&self, _seed: i32, _x: L::F, _y: L::F) -> L::F {
        L::F::splat(self.value)
    }

    fn gen_3d(&self, _seed: i32, _x: L::F, _y: L::F, _z: L::F) -> L::F {
        L::F::splat(self.value)
    }
}

impl<L: Level> Node for Constant<L> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        &CONSTANT
    }

    fn set_named_variable(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            "value" => {
                self.value = value;
                Ok(())
            }
            _ => unknown_variable::<Self>(name),
        }
    }
}

fn create_constant(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(Constant::<L>::default()))
}

pub static CONSTANT: Metadata = Metadata::new("Constant", "Basic", create_constant)
    .with_description("Outputs a constant value everywhere.")
    .with_variables(&[VariableMeta {
        name: "value",
        default: 1.0,
        description: "Output value",
    }]);

/// Uncorrelated noise in `[-1, 1]`: every distinct position hashes to an independent value.
#[derive(Clone, Copy, Debug)]
pub struct White<L: Level> {
    seed_offset: i32,
    _level: PhantomData<L>,
}

impl<L: Level> White<L> {
    pub fn new() -> Self {
        Self {
            seed_offset: 0,
            _level: PhantomData,
        }
    }

    /// Offsets the evaluation seed, decorrelating this node from others sharing a seed.
    pub fn with_seed_offset(mut self, seed_offset: i32) -> Self {
        self.seed_offset = seed_offset;
        self
    }
}

impl<L: Level> Default for White<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level> Kernel<L> for White<L> {
    fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        let px = IntOf::<L>::splat(PRIME_X);
        let py = IntOf::<L>::splat(PRIME_Y);
        let h = hash_2d(
            seed.wrapping_add(self.seed_offset),
            coordinate_bits(x).wrapping_mul(px),
            coordinate_bits(y).wrapping_mul(py),
        );
        to_signed_unit(h)
    }

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        let px = IntOf::<L>::splat(PRIME_X);
        let py = IntOf::<L>::splat(PRIME_Y);
        let pz = IntOf::<L>::splat(PRIME_Z);
        let h = hash_3d(
            seed.wrapping_add(self.seed_offset),
            coordinate_bits(x).wrapping_mul(px),
            coordinate_bits(y).wrapping_mul(py),
            coordinate_bits(z).wrapping_mul(pz),
        );
        to_signed_unit(h)
    }
}

impl<L: Level> Node for White<L> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        &WHITE
    }

    fn set_named_variable(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            "seed_offset" => {
                self.seed_offset = value as i32;
                Ok(())
            }
            _ => unknown_variable::<Self>(name),
        }
    }
}

fn create_white(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(White::<L>::new()))
}

pub static WHITE: Metadata = Metadata::new("White", "Basic", create_white)
    .with_description("Uncorrelated hash noise in [-1, 1].")
    .with_variables(&[VariableMeta {
        name: "seed_offset",
        default: 0.0,
        description: "Added to the evaluation seed",
    }]);

/// Linear ramp over the input coordinates: `sum((p + offset) * multiplier)` per axis.
#[derive(Clone, Copy, Debug)]
pub struct PositionOutput<L: Level> {
    multiplier: Vec3,
    offset: Vec3,
    _level: PhantomData<L>,
}

impl<L: Level> PositionOutput<L> {
    pub fn new() -> Self {
        Self {
            multiplier: Vec3::ZERO,
            offset: Vec3::ZERO,
            _level: PhantomData,
        }
    }

    pub fn with_multiplier(mut self, multiplier: Vec3) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_offset(mut self, offset: Vec3) -> Self {
        self.offset = offset;
        self
    }
}

impl<L: Level> Default for PositionOutput<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level> Kernel<L> for PositionOutput<L> {
    fn gen_2d(&self, _seed: i32, x: L::F, y: L::F) -> L::F {
        let m = self.multiplier;
        let o = self.offset;
        (x + L::F::splat(o.x)) * L::F::splat(m.x) + (y + L::F::splat(o.y)) * L::F::splat(m.y)
    }

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        let m = self.multiplier;
        let o = self.offset;
        Kernel::<L>::gen_2d(self, seed, x, y) + (z + L::F::splat(o.z)) * L::F::splat(m.z)
    }
}

impl<L: Level> Node for PositionOutput<L> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        &POSITION_OUTPUT
    }

    fn set_named_variable(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            "multiplier_x" => self.multiplier.x = value,
            "multiplier_y" => self.multiplier.y = value,
            "multiplier_z" => self.multiplier.z = value,
            "offset_x" => self.offset.x = value,
            "offset_y" => self.offset.y = value,
            "offset_z" => self.offset.z = value,
            _ => return unknown_variable::<Self>(name),
        }
        Ok(())
    }
}

fn create_position_output(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(PositionOutput::<L>::new()))
}

pub static POSITION_OUTPUT: Metadata =
    Metadata::new("PositionOutput", "Basic", create_position_output)
        .with_description("Linear function of the input position.")
        .with_variables(&[
            VariableMeta {
                name: "multiplier_x",
                default: 0.0,
                description: "Slope along x",
            },
            VariableMeta {
                name: "multiplier_y",
                default: 0.0,
                description: "Slope along y",
            },
            VariableMeta {
                name: "multiplier_z",
                default: 0.0,
                description: "Slope along z",
            },
            VariableMeta {
                name: "offset_x",
                default: 0.0,
                description: "Added to x before scaling",
            },
            VariableMeta {
                name: "offset_y",
                default: 0.0,
                description: "Added to y before scaling",
            },
            VariableMeta {
                name: "offset_z",
                default: 0.0,
                description: "Added to z before scaling",
            },
        ]);

pub(crate) fn unknown_variable<N: Node>(name: &str) -> Result<()> {
    Err(crate::error::Error::UnknownVariable {
        node: N::descriptor().name,
        name: name.to_owned(),
    })
}

/// Wraps a node in an [`Arc`] typed as `dyn Generator`, ready to be bound as a source.
pub fn shared<N: Node>(node: N) -> Arc<dyn Generator> {
    Arc::new(node)
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, UVec2, Vec2};

    use super::*;
    use crate::range::ValueRange;
    use crate::tier::{Scalar, Vector128, Vector256, Vector512};

    #[test]
    fn constant_fills_grid() {
        let c = Constant::<Vector256>::new(-0.5);
        let mut out = vec![0.0; 10];
        let range = c.gen_uniform_grid_2d(&mut out, IVec2::ZERO, UVec2::new(5, 2), 1.0, 0);
        assert!(out.iter().all(|v| *v == -0.5));
        assert_eq!(range, ValueRange::constant(-0.5));
    }

    #[test]
    fn constant_variable_is_settable_by_name() {
        let mut c = Constant::<Scalar>::default();
        c.set_variable("value", 3.0).expect("known variable");
        assert_eq!(c.value(), 3.0);
    }

    #[test]
    fn white_is_bounded_and_deterministic() {
        let w = White::<Vector128>::new();
        let mut a = vec![0.0; 64 * 64];
        let mut b = vec![0.0; 64 * 64];
        let range = w.gen_uniform_grid_2d(&mut a, IVec2::new(-32, -32), UVec2::new(64, 64), 0.37, 5);
        w.gen_uniform_grid_2d(&mut b, IVec2::new(-32, -32), UVec2::new(64, 64), 0.37, 5);
        assert_eq!(a, b);
        assert!(range.min >= -1.0 && range.max <= 1.0);
        assert!(range.max - range.min > 1.5, "white noise should spread: {range:?}");
    }

    #[test]
    fn white_depends_on_seed_and_offset() {
        let w = White::<Scalar>::new();
        let shifted = White::<Scalar>::new().with_seed_offset(1);
        assert_ne!(w.gen_single_2d(1.5, 2.5, 0), w.gen_single_2d(1.5, 2.5, 1));
        assert_eq!(w.gen_single_2d(1.5, 2.5, 1), shifted.gen_single_2d(1.5, 2.5, 0));
        assert_ne!(w.gen_single_3d(1.0, 2.0, 3.0, 0), w.gen_single_3d(1.0, 2.0, 4.0, 0));
    }

    #[test]
    fn white_matches_across_tiers() {
        let xs: Vec<f32> = (0..37).map(|i| i as f32 * 0.731 - 9.0).collect();
        let ys: Vec<f32> = (0..37).map(|i| (i * i) as f32 * 0.013).collect();

        let reference = {
            let mut out = vec![0.0; xs.len()];
            White::<Scalar>::new().gen_position_array_2d(&mut out, &xs, &ys, Vec2::ONE, 42);
            out
        };

        let nodes: [Box<dyn Generator>; 3] = [
            Box::new(White::<Vector128>::new()),
            Box::new(White::<Vector256>::new()),
            Box::new(White::<Vector512>::new()),
        ];
        for node in nodes {
            let mut out = vec![0.0; xs.len()];
            node.gen_position_array_2d(&mut out, &xs, &ys, Vec2::ONE, 42);
            assert_eq!(out, reference, "{}", node.tier());
        }
    }

    #[test]
    fn position_output_applies_offset_then_multiplier() {
        let p = PositionOutput::<Scalar>::new()
            .with_multiplier(Vec3::new(2.0, -1.0, 0.5))
            .with_offset(Vec3::new(1.0, 0.0, 2.0));
        assert_eq!(p.gen_single_2d(1.0, 3.0, 0), 1.0);
        assert_eq!(p.gen_single_3d(1.0, 3.0, 2.0, 0), 3.0);
    }

    #[test]
    fn position_output_variables_by_name() {
        let mut p = PositionOutput::<Vector128>::new();
        p.set_variable("multiplier_y", 4.0).expect("known");
        p.set_variable("offset_y", 0.5).expect("known");
        assert_eq!(p.gen_single_2d(100.0, 1.0, 0), 6.0);
        assert!(p.set_variable("multiplier_w", 1.0).is_err());
    }
}
