//! Fixed-width lane vectors that kernels are written against.
//!
//! A [`crate::tier::Level`] picks the lane width; kernels only see the [`FloatLanes`] and
//! [`IntLanes`] traits, so one kernel body serves every tier. Each operation is a plain
//! per-lane loop over a fixed-size array, which the compiler lowers to vector instructions
//! where the target has them. Results are bit-identical across widths because every lane
//! runs the same scalar operation.
use std::array;
use std::fmt::Debug;
use std::ops::{Add, BitAnd, BitXor, Div, Mul, Neg, Sub};

/// `N` lanes of `f32`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct F32s<const N: usize>(pub [f32; N]);

/// `N` lanes of `i32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct I32s<const N: usize>(pub [i32; N]);

/// Float lane vector used for coordinates and samples.
pub trait FloatLanes:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
{
    /// Integer vector of the same width.
    type Int: IntLanes<Float = Self>;

    /// Number of lanes.
    const LANES: usize;

    fn splat(value: f32) -> Self;

    fn from_fn<F: FnMut(usize) -> f32>(f: F) -> Self;

    fn lane(&self, index: usize) -> f32;

    fn floor(self) -> Self;

    fn abs(self) -> Self;

    /// Lane-wise minimum; a NaN lane yields the other operand.
    fn min(self, other: Self) -> Self;

    /// Lane-wise maximum; a NaN lane yields the other operand.
    fn max(self, other: Self) -> Self;

    /// Truncating conversion toward zero.
    fn to_int(self) -> Self::Int;

    /// Raw IEEE-754 bits of each lane.
    fn to_bits(self) -> Self::Int;

    /// Minimum over all lanes, ignoring NaN.
    fn reduce_min(&self) -> f32;

    /// Maximum over all lanes, ignoring NaN.
    fn reduce_max(&self) -> f32;

    /// Writes the first `out.len()` lanes into `out`.
    fn write_to(&self, out: &mut [f32]);
}

/// Integer lane vector used for lattice coordinates and hashing.
pub trait IntLanes:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + 'static
    + BitXor<Output = Self>
    + BitAnd<Output = Self>
{
    /// Float vector of the same width.
    type Float: FloatLanes<Int = Self>;

    fn splat(value: i32) -> Self;

    fn wrapping_add(self, other: Self) -> Self;

    fn wrapping_mul(self, other: Self) -> Self;

    /// Shift right, filling with zeros.
    fn shr_logical(self, bits: u32) -> Self;

    fn to_float(self) -> Self::Float;
}

/// Linear interpolation between `a` and `b`.
#[inline]
pub fn lerp<F: FloatLanes>(a: F, b: F, t: F) -> F {
    a + (b - a) * t
}

/// Quintic fade curve `6t^5 - 15t^4 + 10t^3`.
#[inline]
pub fn interp_quintic<F: FloatLanes>(t: F) -> F {
    t * t * t * (t * (t * F::splat(6.0) - F::splat(15.0)) + F::splat(10.0))
}

macro_rules! lanewise_binop {
    ($ty:ident, $trait:ident, $method:ident, $op:tt) => {
        impl<const N: usize> $trait for $ty<N> {
            type Output = Self;

            #[inline]
            fn $method(self, rhs: Self) -> Self {
                $ty(array::from_fn(|i| self.0[i] $op rhs.0[i]))
            }
        }
    };
}

lanewise_binop!(F32s, Add, add, +);
lanewise_binop!(F32s, Sub, sub, -);
lanewise_binop!(F32s, Mul, mul, *);
lanewise_binop!(F32s, Div, div, /);
lanewise_binop!(I32s, BitXor, bitxor, ^);
lanewise_binop!(I32s, BitAnd, bitand, &);

impl<const N: usize> Neg for F32s<N> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        F32s(self.0.map(|v| -v))
    }
}

impl<const N: usize> FloatLanes for F32s<N> {
    type Int = I32s<N>;

    const LANES: usize = N;

    #[inline]
    fn splat(value: f32) -> Self {
        F32s([value; N])
    }

    #[inline]
    fn from_fn<F: FnMut(usize) -> f32>(f: F) -> Self {
        F32s(array::from_fn(f))
    }

    #[inline]
    fn lane(&self, index: usize) -> f32 {
        self.0[index]
    }

    #[inline]
    fn floor(self) -> Self {
        F32s(self.0.map(f32::floor))
    }

    #[inline]
    fn abs(self) -> Self {
        F32s(self.0.map(f32::abs))
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        F32s(array::from_fn(|i| self.0[i].min(other.0[i])))
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        F32s(array::from_fn(|i| self.0[i].max(other.0[i])))
    }

    #[inline]
    fn to_int(self) -> I32s<N> {
        I32s(self.0.map(|v| v as i32))
    }

    #[inline]
    fn to_bits(self) -> I32s<N> {
        I32s(self.0.map(|v| v.to_bits() as i32))
    }

    #[inline]
    fn reduce_min(&self) -> f32 {
        self.0.iter().fold(f32::INFINITY, |acc, v| acc.min(*v))
    }

    #[inline]
    fn reduce_max(&self) -> f32 {
        self.0.iter().fold(f32::NEG_INFINITY, |acc, v| acc.max(*v))
    }

    #[inline]
    fn write_to(&self, out: &mut [f32]) {
        let n = out.len();
        out.copy_from_slice(&self.0[..n]);
    }
}

impl<const N: usize> IntLanes for I32s<N> {
    type Float = F32s<N>;

    #[inline]
    fn splat(value: i32) -> Self {
        I32s([value; N])
    }

    #[inline]
    fn wrapping_add(self, other: Self) -> Self {
        I32s(array::from_fn(|i| self.0[i].wrapping_add(other.0[i])))
    }

    #[inline]
    fn wrapping_mul(self, other: Self) -> Self {
        I32s(array::from_fn(|i| self.0[i].wrapping_mul(other.0[i])))
    }

    #[inline]
    fn shr_logical(self, bits: u32) -> Self {
        I32s(self.0.map(|v| ((v as u32) >> bits) as i32))
    }

    #[inline]
    fn to_float(self) -> F32s<N> {
        F32s(self.0.map(|v| v as f32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arithmetic_is_lanewise() {
        let a = F32s([1.0, 2.0, 3.0, 4.0]);
        let b = F32s::<4>::splat(2.0);
        assert_eq!(a + b, F32s([3.0, 4.0, 5.0, 6.0]));
        assert_eq!(a * b, F32s([2.0, 4.0, 6.0, 8.0]));
        assert_eq!(-(a - b), F32s([1.0, 0.0, -1.0, -2.0]));
        assert_eq!(a / b, F32s([0.5, 1.0, 1.5, 2.0]));
    }

    #[test]
    fn floor_and_int_conversion() {
        let v = F32s([-1.5, -0.25, 0.0, 2.75]).floor();
        assert_eq!(v, F32s([-2.0, -1.0, 0.0, 2.0]));
        assert_eq!(v.to_int(), I32s([-2, -1, 0, 2]));
        assert_eq!(I32s([-2, 7]).to_float(), F32s([-2.0, 7.0]));
        assert_eq!(F32s([1.0]).to_bits(), I32s([0x3F80_0000]));
    }

    #[test]
    fn reductions_ignore_nan() {
        let v = F32s([f32::NAN, 0.5, -3.0, f32::NAN]);
        assert_eq!(v.reduce_min(), -3.0);
        assert_eq!(v.reduce_max(), 0.5);

        let all_nan = F32s([f32::NAN; 2]);
        assert_eq!(all_nan.reduce_min(), f32::INFINITY);
        assert_eq!(all_nan.reduce_max(), f32::NEG_INFINITY);
    }

    #[test]
    fn integer_ops_wrap() {
        let v = I32s([i32::MAX, -1]);
        assert_eq!(v.wrapping_add(I32s::splat(1)), I32s([i32::MIN, 0]));
        assert_eq!(v.wrapping_mul(I32s::splat(2)), I32s([-2, -2]));
        assert_eq!(I32s([-1]).shr_logical(28), I32s([0xF]));
        assert_eq!(I32s([0b1100]) & I32s([0b1010]), I32s([0b1000]));
        assert_eq!(I32s([0b1100]) ^ I32s([0b1010]), I32s([0b0110]));
    }

    #[test]
    fn write_to_copies_prefix() {
        let v = F32s([1.0, 2.0, 3.0, 4.0]);
        let mut out = [0.0; 3];
        v.write_to(&mut out);
        assert_eq!(out, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn interpolation_helpers() {
        let a = F32s::<2>::splat(0.0);
        let b = F32s::<2>::splat(10.0);
        assert_eq!(lerp(a, b, F32s([0.25, 1.0])), F32s([2.5, 10.0]));
        assert_eq!(interp_quintic(F32s([0.0, 1.0])), F32s([0.0, 1.0]));
        assert_eq!(interp_quintic(F32s([0.5])), F32s([0.5]));
    }
}
