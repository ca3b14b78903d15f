//! Built-in generator types.
pub mod basic;
pub mod blend;
pub mod fractal;
mod hash;
pub mod modifiers;
pub mod value;

pub use basic::{shared, Constant, PositionOutput, White};
pub use blend::{Add, Blend, BlendOp, Max, Min, Multiply, Subtract};
pub use fractal::{Fractal, FractalFbm, FractalRidged, OctaveShape};
pub use modifiers::{DomainOffset, DomainScale, Remap};
pub use value::Value;
