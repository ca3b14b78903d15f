//! Lattice hashing shared by the built-in generators.
use crate::lanes::{FloatLanes, IntLanes};

pub(crate) const PRIME_X: i32 = 501_125_321;
pub(crate) const PRIME_Y: i32 = 1_136_930_381;
pub(crate) const PRIME_Z: i32 = 1_720_413_743;

const HASH_MUL: i32 = 0x27d4_eb2d;

#[inline]
pub(crate) fn hash_2d<I: IntLanes>(seed: i32, x_primed: I, y_primed: I) -> I {
    let h = (I::splat(seed) ^ x_primed ^ y_primed).wrapping_mul(I::splat(HASH_MUL));
    h ^ h.shr_logical(15)
}

#[inline]
pub(crate) fn hash_3d<I: IntLanes>(seed: i32, x_primed: I, y_primed: I, z_primed: I) -> I {
    let h = (I::splat(seed) ^ x_primed ^ y_primed ^ z_primed).wrapping_mul(I::splat(HASH_MUL));
    h ^ h.shr_logical(15)
}

/// Maps the low 24 bits of `hash` onto `[-1, 1)`.
#[inline]
pub(crate) fn to_signed_unit<I: IntLanes>(hash: I) -> I::Float {
    let unit = <I::Float as FloatLanes>::splat(1.0 / 8_388_608.0);
    (hash & I::splat(0x00FF_FFFF)).to_float() * unit - <I::Float as FloatLanes>::splat(1.0)
}

/// Folds the float bits of a coordinate so nearby values hash apart.
#[inline]
pub(crate) fn coordinate_bits<F: FloatLanes>(v: F) -> F::Int {
    let bits = v.to_bits();
    bits ^ bits.shr_logical(16)
}
