//! The generator contract.
//!
//! Three traits split the work:
//! - [`Kernel<L>`] evaluates one lane batch at level `L`. It is what source wrappers cache and
//!   what graph evaluation recurses through.
//! - [`Node`] is implemented by concrete generator types. It adds a [`Level`], a static
//!   [`Metadata`] descriptor, and name-based configuration hooks.
//! - [`Generator`] is the object-safe interface callers hold as `Arc<dyn Generator>`. Every
//!   [`Node`] gets it through a blanket impl, which drives the kernel over grids and position
//!   arrays and accumulates a [`ValueRange`] in the same pass.
use std::sync::Arc;

use glam::{IVec2, IVec3, UVec2, UVec3, Vec2, Vec3};

use crate::error::{Error, Result};
use crate::lanes::FloatLanes;
use crate::metadata::Metadata;
use crate::range::ValueRange;
use crate::tier::{FastPath, Level, Tier};

/// Tier-specialized evaluation of one lane batch.
///
/// Implementations must be pure: the same inputs give the same lanes, and evaluation never
/// mutates the node.
pub trait Kernel<L: Level>: Send + Sync {
    fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F;

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F;
}

/// Object-safe interface of every generator node.
pub trait Generator: Send + Sync + 'static {
    /// Tier this node was built for. Fixed for the lifetime of the node.
    fn tier(&self) -> Tier;

    /// Static descriptor of this node's type.
    fn metadata(&self) -> &'static Metadata;

    /// Fills `out` with `size.x * size.y` samples, x fastest.
    ///
    /// The sample for cell `(i, j)` is taken at `((start.x + i) * frequency, (start.y + j) * frequency)`.
    /// `out` must hold exactly `size.x * size.y` values.
    fn gen_uniform_grid_2d(
        &self,
        out: &mut [f32],
        start: IVec2,
        size: UVec2,
        frequency: f32,
        seed: i32,
    ) -> ValueRange;

    /// Fills `out` with `size.x * size.y * size.z` samples, x fastest, then y, then z.
    fn gen_uniform_grid_3d(
        &self,
        out: &mut [f32],
        start: IVec3,
        size: UVec3,
        frequency: f32,
        seed: i32,
    ) -> ValueRange;

    /// Evaluates `out.len()` scattered positions `(xs[i] + offset.x, ys[i] + offset.y)`.
    fn gen_position_array_2d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        offset: Vec2,
        seed: i32,
    ) -> ValueRange;

    /// Evaluates `out.len()` scattered 3D positions with a uniform `offset`.
    fn gen_position_array_3d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        offset: Vec3,
        seed: i32,
    ) -> ValueRange;

    fn gen_single_2d(&self, x: f32, y: f32, seed: i32) -> f32;

    fn gen_single_3d(&self, x: f32, y: f32, z: f32, seed: i32) -> f32;

    /// Checks that every mandatory source in this subgraph is bound.
    fn validate(&self) -> Result<()>;

    /// Binds the mandatory source slot `slot`.
    fn set_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()>;

    /// Binds the hybrid slot `slot` to a node.
    fn set_hybrid_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()>;

    /// Sets the hybrid slot `slot` to a constant, releasing any bound node.
    fn set_hybrid_constant(&mut self, slot: &str, value: f32) -> Result<()>;

    /// Sets the scalar parameter `name`.
    fn set_variable(&mut self, name: &str, value: f32) -> Result<()>;

    /// Converts this node into its tier-tagged kernel reference. Used by source binding.
    #[doc(hidden)]
    fn fast_path(self: Arc<Self>) -> FastPath;
}

/// A concrete generator type at a fixed [`Level`].
///
/// Implementors write the kernel and the configuration hooks; [`Generator`] comes for free.
pub trait Node: Kernel<Self::Level> + Sized + 'static {
    type Level: Level;

    fn descriptor() -> &'static Metadata;

    /// Checks this node's own mandatory slots and recurses into bound sources.
    fn check_sources(&self) -> Result<()> {
        Ok(())
    }

    fn bind_named_source(&mut self, slot: &str, _source: &Arc<dyn Generator>) -> Result<()> {
        Err(Error::UnknownSource {
            node: Self::descriptor().name,
            slot: slot.to_owned(),
        })
    }

    fn bind_named_hybrid(&mut self, slot: &str, _source: &Arc<dyn Generator>) -> Result<()> {
        Err(Error::UnknownHybrid {
            node: Self::descriptor().name,
            slot: slot.to_owned(),
        })
    }

    fn set_named_constant(&mut self, slot: &str, _value: f32) -> Result<()> {
        Err(Error::UnknownHybrid {
            node: Self::descriptor().name,
            slot: slot.to_owned(),
        })
    }

    fn set_named_variable(&mut self, name: &str, _value: f32) -> Result<()> {
        Err(Error::UnknownVariable {
            node: Self::descriptor().name,
            name: name.to_owned(),
        })
    }
}

impl<T: Node> Generator for T {
    fn tier(&self) -> Tier {
        <T::Level as Level>::TIER
    }

    fn metadata(&self) -> &'static Metadata {
        T::descriptor()
    }

    fn gen_uniform_grid_2d(
        &self,
        out: &mut [f32],
        start: IVec2,
        size: UVec2,
        frequency: f32,
        seed: i32,
    ) -> ValueRange {
        uniform_grid_2d::<T::Level, _>(self, out, start, size, frequency, seed)
    }

    fn gen_uniform_grid_3d(
        &self,
        out: &mut [f32],
        start: IVec3,
        size: UVec3,
        frequency: f32,
        seed: i32,
    ) -> ValueRange {
        uniform_grid_3d::<T::Level, _>(self, out, start, size, frequency, seed)
    }

    fn gen_position_array_2d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        offset: Vec2,
        seed: i32,
    ) -> ValueRange {
        position_array_2d::<T::Level, _>(self, out, xs, ys, offset, seed)
    }

    fn gen_position_array_3d(
        &self,
        out: &mut [f32],
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        offset: Vec3,
        seed: i32,
    ) -> ValueRange {
        position_array_3d::<T::Level, _>(self, out, [xs, ys, zs], offset, seed)
    }

    fn gen_single_2d(&self, x: f32, y: f32, seed: i32) -> f32 {
        let splat = <<T::Level as Level>::F as FloatLanes>::splat;
        Kernel::<T::Level>::gen_2d(self, seed, splat(x), splat(y)).lane(0)
    }

    fn gen_single_3d(&self, x: f32, y: f32, z: f32, seed: i32) -> f32 {
        let splat = <<T::Level as Level>::F as FloatLanes>::splat;
        Kernel::<T::Level>::gen_3d(self, seed, splat(x), splat(y), splat(z)).lane(0)
    }

    fn validate(&self) -> Result<()> {
        self.check_sources()
    }

    fn set_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        self.bind_named_source(slot, source)
    }

    fn set_hybrid_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        self.bind_named_hybrid(slot, source)
    }

    fn set_hybrid_constant(&mut self, slot: &str, value: f32) -> Result<()> {
        self.set_named_constant(slot, value)
    }

    fn set_variable(&mut self, name: &str, value: f32) -> Result<()> {
        self.set_named_variable(name, value)
    }

    fn fast_path(self: Arc<Self>) -> FastPath {
        <T::Level as Level>::into_fast_path(self)
    }
}

/// Lane-wide min/max kept in registers; batches narrower than the lane width go through a
/// scalar tail so padding lanes never reach the result.
struct LaneRange<F: FloatLanes> {
    min: F,
    max: F,
    tail: ValueRange,
}

impl<F: FloatLanes> LaneRange<F> {
    fn new() -> Self {
        Self {
            min: F::splat(f32::INFINITY),
            max: F::splat(f32::NEG_INFINITY),
            tail: ValueRange::EMPTY,
        }
    }

    #[inline]
    fn store(&mut self, out: &mut [f32], values: F) {
        if out.len() == F::LANES {
            self.min = self.min.min(values);
            self.max = self.max.max(values);
        } else {
            for lane in 0..out.len() {
                self.tail.include(values.lane(lane));
            }
        }
        values.write_to(out);
    }

    fn finish(self) -> ValueRange {
        let mut range = ValueRange {
            min: self.min.reduce_min(),
            max: self.max.reduce_max(),
        };
        range.merge(&self.tail);
        range
    }
}

fn uniform_grid_2d<L: Level, K: Kernel<L> + ?Sized>(
    kernel: &K,
    out: &mut [f32],
    start: IVec2,
    size: UVec2,
    frequency: f32,
    seed: i32,
) -> ValueRange {
    let width = size.x as usize;
    let total = width * size.y as usize;
    debug_assert_eq!(out.len(), total, "grid output must hold size.x * size.y samples");

    let mut range = LaneRange::<L::F>::new();
    for (batch, chunk) in out[..total].chunks_mut(L::F::LANES).enumerate() {
        let base = batch * L::F::LANES;
        let x = L::F::from_fn(|lane| {
            let i = base + lane;
            start.x.wrapping_add((i % width) as i32) as f32 * frequency
        });
        let y = L::F::from_fn(|lane| {
            let i = base + lane;
            start.y.wrapping_add((i / width) as i32) as f32 * frequency
        });
        range.store(chunk, kernel.gen_2d(seed, x, y));
    }
    range.finish()
}

fn uniform_grid_3d<L: Level, K: Kernel<L> + ?Sized>(
    kernel: &K,
    out: &mut [f32],
    start: IVec3,
    size: UVec3,
    frequency: f32,
    seed: i32,
) -> ValueRange {
    let width = size.x as usize;
    let height = size.y as usize;
    let plane = width * height;
    let total = plane * size.z as usize;
    debug_assert_eq!(
        out.len(),
        total,
        "grid output must hold size.x * size.y * size.z samples"
    );

    let mut range = LaneRange::<L::F>::new();
    for (batch, chunk) in out[..total].chunks_mut(L::F::LANES).enumerate() {
        let base = batch * L::F::LANES;
        let x = L::F::from_fn(|lane| {
            let i = base + lane;
            start.x.wrapping_add((i % width) as i32) as f32 * frequency
        });
        let y = L::F::from_fn(|lane| {
            let i = base + lane;
            start.y.wrapping_add((i / width % height) as i32) as f32 * frequency
        });
        let z = L::F::from_fn(|lane| {
            let i = base + lane;
            start.z.wrapping_add((i / plane) as i32) as f32 * frequency
        });
        range.store(chunk, kernel.gen_3d(seed, x, y, z));
    }
    range.finish()
}

fn position_array_2d<L: Level, K: Kernel<L> + ?Sized>(
    kernel: &K,
    out: &mut [f32],
    xs: &[f32],
    ys: &[f32],
    offset: Vec2,
    seed: i32,
) -> ValueRange {
    let count = out.len();
    debug_assert!(
        xs.len() >= count && ys.len() >= count,
        "position arrays must hold at least out.len() entries"
    );

    let mut range = LaneRange::<L::F>::new();
    for (batch, chunk) in out.chunks_mut(L::F::LANES).enumerate() {
        let base = batch * L::F::LANES;
        let last = chunk.len() - 1;
        let x = L::F::from_fn(|lane| xs[base + lane.min(last)] + offset.x);
        let y = L::F::from_fn(|lane| ys[base + lane.min(last)] + offset.y);
        range.store(chunk, kernel.gen_2d(seed, x, y));
    }
    range.finish()
}

fn position_array_3d<L: Level, K: Kernel<L> + ?Sized>(
    kernel: &K,
    out: &mut [f32],
    [xs, ys, zs]: [&[f32]; 3],
    offset: Vec3,
    seed: i32,
) -> ValueRange {
    let count = out.len();
    debug_assert!(
        xs.len() >= count && ys.len() >= count && zs.len() >= count,
        "position arrays must hold at least out.len() entries"
    );

    let mut range = LaneRange::<L::F>::new();
    for (batch, chunk) in out.chunks_mut(L::F::LANES).enumerate() {
        let base = batch * L::F::LANES;
        let last = chunk.len() - 1;
        let x = L::F::from_fn(|lane| xs[base + lane.min(last)] + offset.x);
        let y = L::F::from_fn(|lane| ys[base + lane.min(last)] + offset.y);
        let z = L::F::from_fn(|lane| zs[base + lane.min(last)] + offset.z);
        range.store(chunk, kernel.gen_3d(seed, x, y, z));
    }
    range.finish()
}
