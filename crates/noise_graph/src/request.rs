//! Validated sampling requests and allocating helpers over [`Generator`].
//!
//! The raw entry points on [`Generator`] write into caller buffers and only
//! `debug_assert!` their length contracts. [`GeneratorExt`] wraps them for callers that
//! prefer checked input: it validates the request and the graph, allocates the output,
//! and returns a [`NoiseBuffer`].
use glam::{IVec2, IVec3, UVec2, UVec3, Vec2, Vec3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generator::Generator;
use crate::range::ValueRange;

/// A 2D grid of samples.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridRequest2D {
    /// Integer index of the first cell.
    pub start: IVec2,
    /// Number of cells along each axis.
    pub size: UVec2,
    /// Multiplier from cell index to sample coordinate.
    pub frequency: f32,
    pub seed: i32,
}

impl Default for GridRequest2D {
    fn default() -> Self {
        Self {
            start: IVec2::ZERO,
            size: UVec2::ZERO,
            frequency: 1.0,
            seed: 0,
        }
    }
}

impl GridRequest2D {
    /// Creates a request for `size` cells starting at the origin.
    pub fn new(size: UVec2) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: IVec2) -> Self {
        self.start = start;
        self
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_seed(mut self, seed: i32) -> Self {
        self.seed = seed;
        self
    }

    /// Number of samples the request produces.
    pub fn len(&self) -> usize {
        self.size.x as usize * self.size.y as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validates the request, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        check_frequency(self.frequency)?;
        check_axis("x", self.start.x, self.size.x)?;
        check_axis("y", self.start.y, self.size.y)?;
        check_len(&[self.size.x, self.size.y])
    }
}

/// A 3D grid of samples.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridRequest3D {
    pub start: IVec3,
    pub size: UVec3,
    pub frequency: f32,
    pub seed: i32,
}

impl Default for GridRequest3D {
    fn default() -> Self {
        Self {
            start: IVec3::ZERO,
            size: UVec3::ZERO,
            frequency: 1.0,
            seed: 0,
        }
    }
}

impl GridRequest3D {
    pub fn new(size: UVec3) -> Self {
        Self {
            size,
            ..Default::default()
        }
    }

    pub fn with_start(mut self, start: IVec3) -> Self {
        self.start = start;
        self
    }

    pub fn with_frequency(mut self, frequency: f32) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn with_seed(mut self, seed: i32) -> Self {
        self.seed = seed;
        self
    }

    pub fn len(&self) -> usize {
        self.size.x as usize * self.size.y as usize * self.size.z as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn validate(&self) -> Result<()> {
        check_frequency(self.frequency)?;
        check_axis("x", self.start.x, self.size.x)?;
        check_axis("y", self.start.y, self.size.y)?;
        check_axis("z", self.start.z, self.size.z)?;
        check_len(&[self.size.x, self.size.y, self.size.z])
    }
}

fn check_frequency(frequency: f32) -> Result<()> {
    if !frequency.is_finite() {
        return Err(Error::InvalidConfig("frequency must be finite".into()));
    }
    Ok(())
}

fn check_axis(axis: &str, start: i32, size: u32) -> Result<()> {
    let end = i64::from(start) + i64::from(size);
    if end > i64::from(i32::MAX) + 1 {
        return Err(Error::InvalidConfig(format!(
            "grid extends past i32::MAX along {axis}"
        )));
    }
    Ok(())
}

fn check_len(sizes: &[u32]) -> Result<()> {
    sizes
        .iter()
        .try_fold(1usize, |acc, s| acc.checked_mul(*s as usize))
        .map(|_| ())
        .ok_or_else(|| Error::InvalidConfig("grid sample count overflows usize".into()))
}

/// Samples produced by one request, with their bounds.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoiseBuffer {
    pub values: Vec<f32>,
    pub range: ValueRange,
}

impl NoiseBuffer {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Maps every sample into `[0, 1]` using the recorded range.
    ///
    /// A degenerate range maps everything to `0.0`.
    pub fn normalized(&self) -> Vec<f32> {
        let span = self.range.max - self.range.min;
        if self.range.is_empty() || span <= 0.0 {
            return vec![0.0; self.values.len()];
        }
        self.values
            .iter()
            .map(|v| (v - self.range.min) / span)
            .collect()
    }
}

/// Checked, allocating wrappers over the raw [`Generator`] entry points.
pub trait GeneratorExt: Generator {
    /// Validates the graph and `request`, then samples the grid.
    fn grid_2d(&self, request: &GridRequest2D) -> Result<NoiseBuffer> {
        self.validate()?;
        request.validate()?;
        let mut values = vec![0.0; request.len()];
        let range = self.gen_uniform_grid_2d(
            &mut values,
            request.start,
            request.size,
            request.frequency,
            request.seed,
        );
        Ok(NoiseBuffer { values, range })
    }

    fn grid_3d(&self, request: &GridRequest3D) -> Result<NoiseBuffer> {
        self.validate()?;
        request.validate()?;
        let mut values = vec![0.0; request.len()];
        let range = self.gen_uniform_grid_3d(
            &mut values,
            request.start,
            request.size,
            request.frequency,
            request.seed,
        );
        Ok(NoiseBuffer { values, range })
    }

    /// Samples `xs.len()` positions. `xs` and `ys` must have equal lengths.
    fn positions_2d(&self, xs: &[f32], ys: &[f32], offset: Vec2, seed: i32) -> Result<NoiseBuffer> {
        self.validate()?;
        if xs.len() != ys.len() {
            return Err(Error::InvalidConfig(format!(
                "position arrays differ in length: {} x, {} y",
                xs.len(),
                ys.len()
            )));
        }
        let mut values = vec![0.0; xs.len()];
        let range = self.gen_position_array_2d(&mut values, xs, ys, offset, seed);
        Ok(NoiseBuffer { values, range })
    }

    fn positions_3d(
        &self,
        xs: &[f32],
        ys: &[f32],
        zs: &[f32],
        offset: Vec3,
        seed: i32,
    ) -> Result<NoiseBuffer> {
        self.validate()?;
        if xs.len() != ys.len() || xs.len() != zs.len() {
            return Err(Error::InvalidConfig(format!(
                "position arrays differ in length: {} x, {} y, {} z",
                xs.len(),
                ys.len(),
                zs.len()
            )));
        }
        let mut values = vec![0.0; xs.len()];
        let range = self.gen_position_array_3d(&mut values, xs, ys, zs, offset, seed);
        Ok(NoiseBuffer { values, range })
    }
}

impl<G: Generator + ?Sized> GeneratorExt for G {}
