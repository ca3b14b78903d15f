//! Single-source modifiers that reshape the input domain or the output value.
use std::sync::Arc;

use super::basic::unknown_variable;
use crate::error::{Error, Result};
use crate::generator::{Generator, Kernel, Node};
use crate::lanes::FloatLanes;
use crate::metadata::{HybridMeta, Metadata, VariableMeta};
use crate::source::{GeneratorSource, HybridSource};
use crate::tier::{Level, Tier};
use crate::with_level;

fn bind_source_slot<L: Level, N: Node>(
    slot: &str,
    target: &mut GeneratorSource<L>,
    source: &Arc<dyn Generator>,
) -> Result<()> {
    match slot {
        "source" => target.bind(source),
        _ => Err(Error::UnknownSource {
            node: N::descriptor().name,
            slot: slot.to_owned(),
        }),
    }
}

/// Multiplies every input coordinate by `scale` before sampling the source.
#[derive(Clone, Debug)]
pub struct DomainScale<L: Level> {
    source: GeneratorSource<L>,
    scale: f32,
}

impl<L: Level> DomainScale<L> {
    pub fn new() -> Self {
        Self {
            source: GeneratorSource::new(),
            scale: 1.0,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_input(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        self.source.bind(source)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }
}

impl<L: Level> Default for DomainScale<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level> Kernel<L> for DomainScale<L> {
    fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        let s = L::F::splat(self.scale);
        self.source.gen_2d(seed, x * s, y * s)
    }

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        let s = L::F::splat(self.scale);
        self.source.gen_3d(seed, x * s, y * s, z * s)
    }
}

impl<L: Level> Node for DomainScale<L> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        &DOMAIN_SCALE
    }

    fn check_sources(&self) -> Result<()> {
        self.source.ensure_bound(DOMAIN_SCALE.name, "source")
    }

    fn bind_named_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        bind_source_slot::<L, Self>(slot, &mut self.source, source)
    }

    fn set_named_variable(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            "scale" => {
                self.scale = value;
                Ok(())
            }
            _ => unknown_variable::<Self>(name),
        }
    }
}

fn create_domain_scale(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(DomainScale::<L>::new()))
}

pub static DOMAIN_SCALE: Metadata = Metadata::new("DomainScale", "Modifiers", create_domain_scale)
    .with_description("Scales the input position before sampling the source.")
    .with_sources(&["source"])
    .with_variables(&[VariableMeta {
        name: "scale",
        default: 1.0,
        description: "Coordinate multiplier",
    }]);

/// Shifts the input position by per-axis offsets before sampling the source.
///
/// The offsets are hybrid slots, so binding a noise node to them warps the domain. Offset
/// nodes are evaluated at the unshifted position.
#[derive(Clone, Debug)]
pub struct DomainOffset<L: Level> {
    source: GeneratorSource<L>,
    offset: [HybridSource<L>; 3],
}

const AXES: [&str; 3] = ["offset_x", "offset_y", "offset_z"];

impl<L: Level> DomainOffset<L> {
    pub fn new() -> Self {
        Self {
            source: GeneratorSource::new(),
            offset: [
                HybridSource::new(0.0),
                HybridSource::new(0.0),
                HybridSource::new(0.0),
            ],
        }
    }

    pub fn set_input(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        self.source.bind(source)
    }

    /// Hybrid slot for `axis` (0 = x, 1 = y, 2 = z).
    pub fn offset_mut(&mut self, axis: usize) -> &mut HybridSource<L> {
        &mut self.offset[axis]
    }

    fn axis(slot: &str) -> Option<usize> {
        AXES.iter().position(|a| *a == slot)
    }

    fn unknown_hybrid(slot: &str) -> Error {
        Error::UnknownHybrid {
            node: DOMAIN_OFFSET.name,
            slot: slot.to_owned(),
        }
    }
}

impl<L: Level> Default for DomainOffset<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level> Kernel<L> for DomainOffset<L> {
    fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        let [ox, oy, _] = &self.offset;
        self.source.gen_2d(
            seed,
            x + ox.gen_2d(seed, x, y),
            y + oy.gen_2d(seed, x, y),
        )
    }

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        let [ox, oy, oz] = &self.offset;
        self.source.gen_3d(
            seed,
            x + ox.gen_3d(seed, x, y, z),
            y + oy.gen_3d(seed, x, y, z),
            z + oz.gen_3d(seed, x, y, z),
        )
    }
}

impl<L: Level> Node for DomainOffset<L> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        &DOMAIN_OFFSET
    }

    fn check_sources(&self) -> Result<()> {
        self.source.ensure_bound(DOMAIN_OFFSET.name, "source")?;
        self.offset.iter().try_for_each(HybridSource::check)
    }

    fn bind_named_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        bind_source_slot::<L, Self>(slot, &mut self.source, source)
    }

    fn bind_named_hybrid(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        let axis = Self::axis(slot).ok_or_else(|| Self::unknown_hybrid(slot))?;
        self.offset[axis].bind(source)
    }

    fn set_named_constant(&mut self, slot: &str, value: f32) -> Result<()> {
        let axis = Self::axis(slot).ok_or_else(|| Self::unknown_hybrid(slot))?;
        self.offset[axis].set_constant(value);
        Ok(())
    }
}

fn create_domain_offset(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(DomainOffset::<L>::new()))
}

pub static DOMAIN_OFFSET: Metadata =
    Metadata::new("DomainOffset", "Modifiers", create_domain_offset)
        .with_description("Offsets the input position before sampling the source.")
        .with_sources(&["source"])
        .with_hybrids(&[
            HybridMeta {
                name: "offset_x",
                default: 0.0,
            },
            HybridMeta {
                name: "offset_y",
                default: 0.0,
            },
            HybridMeta {
                name: "offset_z",
                default: 0.0,
            },
        ]);

/// Linearly maps the source output from `[from_min, from_max]` to `[to_min, to_max]`.
///
/// Values outside the input interval extrapolate. A degenerate input interval maps
/// everything to `to_min`.
#[derive(Clone, Debug)]
pub struct Remap<L: Level> {
    source: GeneratorSource<L>,
    from: (f32, f32),
    to: (f32, f32),
}

impl<L: Level> Remap<L> {
    pub fn new() -> Self {
        Self {
            source: GeneratorSource::new(),
            from: (-1.0, 1.0),
            to: (0.0, 1.0),
        }
    }

    pub fn with_from(mut self, min: f32, max: f32) -> Self {
        self.from = (min, max);
        self
    }

    pub fn with_to(mut self, min: f32, max: f32) -> Self {
        self.to = (min, max);
        self
    }

    pub fn set_input(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        self.source.bind(source)
    }

    fn slope(&self) -> f32 {
        let span = self.from.1 - self.from.0;
        if span == 0.0 {
            0.0
        } else {
            (self.to.1 - self.to.0) / span
        }
    }

    #[inline]
    fn apply(&self, v: L::F) -> L::F {
        (v - L::F::splat(self.from.0)) * L::F::splat(self.slope()) + L::F::splat(self.to.0)
    }
}

impl<L: Level> Default for Remap<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level> Kernel<L> for Remap<L> {
    fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        self.apply(self.source.gen_2d(seed, x, y))
    }

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        self.apply(self.source.gen_3d(seed, x, y, z))
    }
}

impl<L: Level> Node for Remap<L> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        &REMAP
    }

    fn check_sources(&self) -> Result<()> {
        self.source.ensure_bound(REMAP.name, "source")
    }

    fn bind_named_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        bind_source_slot::<L, Self>(slot, &mut self.source, source)
    }

    fn set_named_variable(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            "from_min" => self.from.0 = value,
            "from_max" => self.from.1 = value,
            "to_min" => self.to.0 = value,
            "to_max" => self.to.1 = value,
            _ => return unknown_variable::<Self>(name),
        }
        Ok(())
    }
}

fn create_remap(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(Remap::<L>::new()))
}

pub static REMAP: Metadata = Metadata::new("Remap", "Modifiers", create_remap)
    .with_description("Linearly maps the source output onto a new interval.")
    .with_sources(&["source"])
    .with_variables(&[
        VariableMeta {
            name: "from_min",
            default: -1.0,
            description: "Input value mapped to to_min",
        },
        VariableMeta {
            name: "from_max",
            default: 1.0,
            description: "Input value mapped to to_max",
        },
        VariableMeta {
            name: "to_min",
            default: 0.0,
            description: "Output for from_min",
        },
        VariableMeta {
            name: "to_max",
            default: 1.0,
            description: "Output for from_max",
        },
    ]);

#[cfg(test)]
mod tests {
    use glam::{IVec2, UVec2, Vec3};

    use super::*;
    use crate::generators::{shared, Constant, PositionOutput, Value};
    use crate::tier::{Scalar, Vector128, Vector512};

    fn ramp_x<L: Level>() -> Arc<dyn Generator> {
        shared(PositionOutput::<L>::new().with_multiplier(Vec3::X))
    }

    #[test]
    fn domain_scale_multiplies_coordinates() {
        let mut scaled = DomainScale::<Vector128>::new().with_scale(3.0);
        scaled.set_input(&ramp_x::<Vector128>()).expect("same tier");

        let mut out = vec![0.0; 4];
        scaled.gen_uniform_grid_2d(&mut out, IVec2::ZERO, UVec2::new(4, 1), 0.5, 0);
        assert_eq!(out, vec![0.0, 1.5, 3.0, 4.5]);
    }

    #[test]
    fn domain_scale_variable_by_name() {
        let mut scaled = DomainScale::<Scalar>::new();
        scaled.set_variable("scale", 0.25).expect("known");
        assert_eq!(scaled.scale(), 0.25);
        scaled.set_input(&ramp_x::<Scalar>()).expect("same tier");
        assert_eq!(scaled.gen_single_3d(8.0, 1.0, 1.0, 0), 2.0);
    }

    #[test]
    fn unbound_modifiers_fail_validation() {
        assert!(matches!(
            DomainOffset::<Scalar>::new().validate(),
            Err(Error::UnboundSource {
                node: "DomainOffset",
                slot: "source"
            })
        ));
        assert!(matches!(
            Remap::<Scalar>::new().validate(),
            Err(Error::UnboundSource { node: "Remap", .. })
        ));
    }

    #[test]
    fn domain_offset_with_constants_translates() {
        let mut offset = DomainOffset::<Scalar>::new();
        offset.set_input(&ramp_x::<Scalar>()).expect("same tier");
        offset.set_hybrid_constant("offset_x", 2.5).expect("known slot");
        assert_eq!(offset.gen_single_2d(1.0, 7.0, 0), 3.5);
        assert!(matches!(
            offset.set_hybrid_constant("offset_w", 1.0),
            Err(Error::UnknownHybrid { .. })
        ));
    }

    #[test]
    fn domain_offset_warps_with_bound_node() {
        let warp = shared(PositionOutput::<Vector512>::new().with_multiplier(Vec3::Y));
        let mut offset = DomainOffset::<Vector512>::new();
        offset.set_input(&ramp_x::<Vector512>()).expect("same tier");
        offset.set_hybrid_source("offset_x", &warp).expect("same tier");

        // x + y, with y sampled at the unshifted position.
        assert_eq!(offset.gen_single_2d(1.0, 4.0, 0), 5.0);
        assert_eq!(offset.gen_single_3d(1.0, 4.0, 9.0, 0), 5.0);
        assert!(offset.validate().is_ok());
    }

    #[test]
    fn domain_offset_validates_bound_offsets() {
        let mut offset = DomainOffset::<Scalar>::new();
        offset.set_input(&ramp_x::<Scalar>()).expect("same tier");
        offset
            .offset_mut(2)
            .bind(&shared(DomainScale::<Scalar>::new()))
            .expect("same tier");
        assert!(matches!(
            offset.validate(),
            Err(Error::UnboundSource {
                node: "DomainScale",
                ..
            })
        ));
    }

    #[test]
    fn remap_maps_interval_endpoints() {
        let mut remap = Remap::<Vector128>::new().with_from(-1.0, 1.0).with_to(10.0, 20.0);
        remap
            .set_input(&shared(Constant::<Vector128>::new(-1.0)))
            .expect("same tier");
        assert_eq!(remap.gen_single_2d(0.0, 0.0, 0), 10.0);

        remap
            .set_input(&shared(Constant::<Vector128>::new(0.0)))
            .expect("same tier");
        assert_eq!(remap.gen_single_2d(0.0, 0.0, 0), 15.0);
    }

    #[test]
    fn remap_of_value_noise_lands_in_unit_interval() {
        let mut remap = Remap::<Vector128>::new();
        remap
            .set_input(&shared(Value::<Vector128>::new()))
            .expect("same tier");
        let mut out = vec![0.0; 32 * 32];
        let range = remap.gen_uniform_grid_2d(&mut out, IVec2::ZERO, UVec2::splat(32), 0.17, 3);
        assert!(range.min >= 0.0 && range.max <= 1.0, "{range:?}");
    }

    #[test]
    fn remap_with_empty_input_interval_is_constant() {
        let mut remap = Remap::<Scalar>::new();
        remap.set_variable("from_min", 2.0).expect("known");
        remap.set_variable("from_max", 2.0).expect("known");
        remap.set_variable("to_min", -3.0).expect("known");
        remap.set_input(&ramp_x::<Scalar>()).expect("same tier");
        assert_eq!(remap.gen_single_2d(100.0, 0.0, 0), -3.0);
    }
}
