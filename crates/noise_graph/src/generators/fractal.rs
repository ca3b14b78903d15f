//! Octave summation over a source.
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::basic::unknown_variable;
use crate::error::{Error, Result};
use crate::generator::{Generator, Kernel, Node};
use crate::lanes::FloatLanes;
use crate::metadata::{HybridMeta, Metadata, VariableMeta};
use crate::source::{GeneratorSource, HybridSource};
use crate::tier::{Level, Tier};
use crate::with_level;

/// Per-octave shaping applied to each source sample before it is summed.
pub trait OctaveShape: Send + Sync + 'static {
    fn descriptor() -> &'static Metadata;

    fn shape<F: FloatLanes>(sample: F) -> F;
}

/// Sums `octaves` copies of the source at increasing frequency and decreasing amplitude.
///
/// Octave `i` samples the source at `p * lacunarity^i` with seed `seed + i` and weight
/// `gain^i`. The sum is divided by the total absolute weight, so a source bounded by
/// `[-1, 1]` stays bounded. `gain` is a hybrid evaluated once at the base position.
pub struct Fractal<L: Level, S: OctaveShape> {
    source: GeneratorSource<L>,
    gain: HybridSource<L>,
    octaves: u32,
    lacunarity: f32,
    _shape: PhantomData<S>,
}

impl<L: Level, S: OctaveShape> Fractal<L, S> {
    pub fn new() -> Self {
        Self {
            source: GeneratorSource::new(),
            gain: HybridSource::new(0.5),
            octaves: 3,
            lacunarity: 2.0,
            _shape: PhantomData,
        }
    }

    /// At least one octave is always evaluated.
    pub fn with_octaves(mut self, octaves: u32) -> Self {
        self.octaves = octaves.max(1);
        self
    }

    pub fn with_lacunarity(mut self, lacunarity: f32) -> Self {
        self.lacunarity = lacunarity;
        self
    }

    pub fn set_input(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        self.source.bind(source)
    }

    pub fn gain_mut(&mut self) -> &mut HybridSource<L> {
        &mut self.gain
    }

    pub fn octaves(&self) -> u32 {
        self.octaves
    }
}

impl<L: Level, S: OctaveShape> Default for Fractal<L, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level, S: OctaveShape> fmt::Debug for Fractal<L, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(S::descriptor().name)
            .field("source", &self.source)
            .field("gain", &self.gain)
            .field("octaves", &self.octaves)
            .field("lacunarity", &self.lacunarity)
            .finish()
    }
}

impl<L: Level, S: OctaveShape> Kernel<L> for Fractal<L, S> {
    fn gen_2d(&self, seed: i32, mut x: L::F, mut y: L::F) -> L::F {
        let gain = self.gain.gen_2d(seed, x, y);
        let lacunarity = L::F::splat(self.lacunarity);

        let mut amp = L::F::splat(1.0);
        let mut total = amp;
        let mut sum = S::shape(self.source.gen_2d(seed, x, y));
        let mut seed = seed;
        for _ in 1..self.octaves {
            seed = seed.wrapping_add(1);
            x = x * lacunarity;
            y = y * lacunarity;
            amp = amp * gain;
            total = total + amp.abs();
            sum = sum + S::shape(self.source.gen_2d(seed, x, y)) * amp;
        }
        sum / total
    }

    fn gen_3d(&self, seed: i32, mut x: L::F, mut y: L::F, mut z: L::F) -> L::F {
        let gain = self.gain.gen_3d(seed, x, y, z);
        let lacunarity = L::F::splat(self.lacunarity);

        let mut amp = L::F::splat(1.0);
        let mut total = amp;
        let mut sum = S::shape(self.source.gen_3d(seed, x, y, z));
        let mut seed = seed;
        for _ in 1..self.octaves {
            seed = seed.wrapping_add(1);
            x = x * lacunarity;
            y = y * lacunarity;
            z = z * lacunarity;
            amp = amp * gain;
            total = total + amp.abs();
            sum = sum + S::shape(self.source.gen_3d(seed, x, y, z)) * amp;
        }
        sum / total
    }
}

impl<L: Level, S: OctaveShape> Node for Fractal<L, S> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        S::descriptor()
    }

    fn check_sources(&self) -> Result<()> {
        self.source.ensure_bound(S::descriptor().name, "source")?;
        self.gain.check()
    }

    fn bind_named_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        match slot {
            "source" => self.source.bind(source),
            _ => Err(Error::UnknownSource {
                node: S::descriptor().name,
                slot: slot.to_owned(),
            }),
        }
    }

    fn bind_named_hybrid(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        match slot {
            "gain" => self.gain.bind(source),
            _ => Err(Error::UnknownHybrid {
                node: S::descriptor().name,
                slot: slot.to_owned(),
            }),
        }
    }

    fn set_named_constant(&mut self, slot: &str, value: f32) -> Result<()> {
        match slot {
            "gain" => {
                self.gain.set_constant(value);
                Ok(())
            }
            _ => Err(Error::UnknownHybrid {
                node: S::descriptor().name,
                slot: slot.to_owned(),
            }),
        }
    }

    fn set_named_variable(&mut self, name: &str, value: f32) -> Result<()> {
        match name {
            "octaves" => self.octaves = value.max(1.0) as u32,
            "lacunarity" => self.lacunarity = value,
            _ => return unknown_variable::<Self>(name),
        }
        Ok(())
    }
}

fn create_fractal<S: OctaveShape>(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(Fractal::<L, S>::new()))
}

const FRACTAL_SOURCES: &[&str] = &["source"];
const FRACTAL_HYBRIDS: &[HybridMeta] = &[HybridMeta {
    name: "gain",
    default: 0.5,
}];
const FRACTAL_VARIABLES: &[VariableMeta] = &[
    VariableMeta {
        name: "octaves",
        default: 3.0,
        description: "Number of octaves, at least 1",
    },
    VariableMeta {
        name: "lacunarity",
        default: 2.0,
        description: "Frequency multiplier between octaves",
    },
];

/// Plain fractional Brownian motion.
#[derive(Clone, Copy, Debug, Default)]
pub struct Fbm;

impl OctaveShape for Fbm {
    fn descriptor() -> &'static Metadata {
        &FRACTAL_FBM
    }

    #[inline]
    fn shape<F: FloatLanes>(sample: F) -> F {
        sample
    }
}

/// Folds each octave into a ridge: `1 - 2|v|`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ridged;

impl OctaveShape for Ridged {
    fn descriptor() -> &'static Metadata {
        &FRACTAL_RIDGED
    }

    #[inline]
    fn shape<F: FloatLanes>(sample: F) -> F {
        F::splat(1.0) - sample.abs() * F::splat(2.0)
    }
}

pub type FractalFbm<L> = Fractal<L, Fbm>;
pub type FractalRidged<L> = Fractal<L, Ridged>;

pub static FRACTAL_FBM: Metadata = Metadata::new("FractalFbm", "Fractal", create_fractal::<Fbm>)
    .with_description("Sums octaves of the source.")
    .with_sources(FRACTAL_SOURCES)
    .with_hybrids(FRACTAL_HYBRIDS)
    .with_variables(FRACTAL_VARIABLES);

pub static FRACTAL_RIDGED: Metadata =
    Metadata::new("FractalRidged", "Fractal", create_fractal::<Ridged>)
        .with_description("Sums octaves of the source folded into ridges.")
        .with_sources(FRACTAL_SOURCES)
        .with_hybrids(FRACTAL_HYBRIDS)
        .with_variables(FRACTAL_VARIABLES);

#[cfg(test)]
mod tests {
    use glam::{IVec2, IVec3, UVec2, UVec3};

    use super::*;
    use crate::generators::{shared, Constant, Value, White};
    use crate::tier::{Scalar, Vector128, Vector256};

    fn value<L: Level>() -> Arc<dyn Generator> {
        shared(Value::<L>::new())
    }

    #[test]
    fn single_octave_equals_source() {
        let mut fbm = FractalFbm::<Vector128>::new().with_octaves(1);
        fbm.set_input(&value::<Vector128>()).expect("same tier");
        let source = value::<Vector128>();
        assert_eq!(
            fbm.gen_single_2d(0.3, 1.7, 5),
            source.gen_single_2d(0.3, 1.7, 5)
        );
    }

    #[test]
    fn constant_source_is_normalized() {
        let mut fbm = FractalFbm::<Scalar>::new().with_octaves(5);
        fbm.set_input(&shared(Constant::<Scalar>::new(0.75)))
            .expect("same tier");
        assert!((fbm.gen_single_2d(2.0, 3.0, 0) - 0.75).abs() < 1e-6);

        fbm.set_hybrid_constant("gain", -1.0).expect("known slot");
        // Alternating weights 1, -1, 1, -1, 1 over total weight 5.
        assert!((fbm.gen_single_3d(2.0, 3.0, 4.0, 0) - 0.15).abs() < 1e-6);
    }

    #[test]
    fn fbm_of_value_stays_bounded() {
        let mut fbm = FractalFbm::<Vector256>::new().with_octaves(4);
        fbm.set_input(&value::<Vector256>()).expect("same tier");
        let mut out = vec![0.0; 40 * 25];
        let range = fbm.gen_uniform_grid_2d(&mut out, IVec2::new(-20, 0), UVec2::new(40, 25), 0.05, 8);
        assert!(range.min >= -1.0 && range.max <= 1.0, "{range:?}");
        assert!(range.max > range.min);
    }

    #[test]
    fn ridged_folds_octaves() {
        let mut ridged = FractalRidged::<Scalar>::new().with_octaves(1);
        ridged
            .set_input(&shared(Constant::<Scalar>::new(-0.25)))
            .expect("same tier");
        assert_eq!(ridged.gen_single_2d(0.0, 0.0, 0), 0.5);
    }

    #[test]
    fn gain_can_be_driven_by_a_node() {
        let mut fbm = FractalFbm::<Scalar>::new();
        fbm.set_input(&shared(Constant::<Scalar>::new(1.0)))
            .expect("same tier");
        let white = shared(White::<Scalar>::new());
        fbm.set_hybrid_source("gain", &white).expect("same tier");
        assert!(fbm.validate().is_ok());

        let g = white.gen_single_2d(0.5, 0.5, 3);
        let expected = (1.0 + g + g * g) / (1.0 + g.abs() + g * g);
        assert!((fbm.gen_single_2d(0.5, 0.5, 3) - expected).abs() < 1e-6);
    }

    #[test]
    fn octave_variable_is_clamped() {
        let mut fbm = FractalFbm::<Scalar>::new();
        fbm.set_variable("octaves", 0.0).expect("known");
        assert_eq!(fbm.octaves(), 1);
        fbm.set_variable("octaves", 6.0).expect("known");
        assert_eq!(fbm.octaves(), 6);
        assert!(fbm.set_variable("persistence", 0.5).is_err());
    }

    #[test]
    fn unbound_fractal_fails_validation() {
        assert!(matches!(
            FractalRidged::<Scalar>::new().validate(),
            Err(Error::UnboundSource {
                node: "FractalRidged",
                slot: "source"
            })
        ));
    }

    #[test]
    fn tiers_agree_on_3d_grid() {
        let size = UVec3::new(6, 5, 2);
        let n = (size.x * size.y * size.z) as usize;

        let mut scalar = FractalRidged::<Scalar>::new();
        scalar.set_input(&value::<Scalar>()).expect("same tier");
        let mut reference = vec![0.0; n];
        scalar.gen_uniform_grid_3d(&mut reference, IVec3::new(1, 2, 3), size, 0.4, 21);

        let mut wide = FractalRidged::<Vector128>::new();
        wide.set_input(&value::<Vector128>()).expect("same tier");
        let mut out = vec![0.0; n];
        wide.gen_uniform_grid_3d(&mut out, IVec3::new(1, 2, 3), size, 0.4, 21);
        assert_eq!(out, reference);
    }
}
