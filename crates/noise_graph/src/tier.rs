//! Hardware capability tiers and their compile-time level markers.
//!
//! [`Tier`] is the runtime tag every node reports. Each tier has a zero-sized
//! [`Level`] marker ([`Scalar`], [`Vector128`], [`Vector256`], [`Vector512`]) that fixes the
//! lane width kernels run at. Nodes are generic over their level, so a node's tier is part
//! of its type and cannot change after construction.
//!
//! [`FastPath`] is the tier-tagged form a node hands to a consumer when it gets bound as a
//! source. The consumer's level picks its own variant back out with
//! [`Level::from_fast_path`]; any other variant means the tiers differ.
use std::fmt;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::generator::Kernel;
use crate::lanes::{F32s, FloatLanes};

/// Hardware capability class a node is specialized for.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    /// One lane.
    Scalar,
    /// Four `f32` lanes (SSE / NEON class).
    Vector128,
    /// Eight `f32` lanes (AVX2 class).
    Vector256,
    /// Sixteen `f32` lanes (AVX-512 class).
    Vector512,
}

impl Tier {
    /// All tiers, narrowest first.
    pub const ALL: [Tier; 4] = [
        Tier::Scalar,
        Tier::Vector128,
        Tier::Vector256,
        Tier::Vector512,
    ];

    /// Number of `f32` lanes evaluated per kernel call.
    pub const fn lanes(self) -> usize {
        match self {
            Tier::Scalar => 1,
            Tier::Vector128 => 4,
            Tier::Vector256 => 8,
            Tier::Vector512 => 16,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Tier::Scalar => "Scalar",
            Tier::Vector128 => "Vector128",
            Tier::Vector256 => "Vector256",
            Tier::Vector512 => "Vector512",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tier-tagged kernel reference produced by [`crate::generator::Generator::fast_path`].
#[derive(Clone)]
pub enum FastPath {
    Scalar(Arc<dyn Kernel<Scalar>>),
    Vector128(Arc<dyn Kernel<Vector128>>),
    Vector256(Arc<dyn Kernel<Vector256>>),
    Vector512(Arc<dyn Kernel<Vector512>>),
}

impl FastPath {
    pub fn tier(&self) -> Tier {
        match self {
            FastPath::Scalar(_) => Tier::Scalar,
            FastPath::Vector128(_) => Tier::Vector128,
            FastPath::Vector256(_) => Tier::Vector256,
            FastPath::Vector512(_) => Tier::Vector512,
        }
    }
}

impl fmt::Debug for FastPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FastPath").field(&self.tier()).finish()
    }
}

/// Compile-time tier marker. Implemented once per [`Tier`].
pub trait Level: Copy + Default + fmt::Debug + Send + Sync + 'static {
    /// Runtime tag of this level.
    const TIER: Tier;

    /// Float lane vector kernels of this level operate on.
    type F: FloatLanes;

    /// Tags a kernel of this level.
    fn into_fast_path(kernel: Arc<dyn Kernel<Self>>) -> FastPath;

    /// Recovers a kernel of this level, or `None` if `fast_path` belongs to another tier.
    fn from_fast_path(fast_path: FastPath) -> Option<Arc<dyn Kernel<Self>>>;
}

/// Integer lane vector of level `L`.
pub type IntOf<L> = <<L as Level>::F as FloatLanes>::Int;

macro_rules! define_level {
    ($(#[$doc:meta])* $name:ident, $lanes:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
        pub struct $name;

        impl Level for $name {
            const TIER: Tier = Tier::$name;

            type F = F32s<$lanes>;

            fn into_fast_path(kernel: Arc<dyn Kernel<Self>>) -> FastPath {
                FastPath::$name(kernel)
            }

            fn from_fast_path(fast_path: FastPath) -> Option<Arc<dyn Kernel<Self>>> {
                match fast_path {
                    FastPath::$name(kernel) => Some(kernel),
                    _ => None,
                }
            }
        }
    };
}

define_level!(
    /// One-lane level; the reference implementation every other tier must match.
    Scalar,
    1
);
define_level!(
    /// Four-lane level.
    Vector128,
    4
);
define_level!(
    /// Eight-lane level.
    Vector256,
    8
);
define_level!(
    /// Sixteen-lane level.
    Vector512,
    16
);

/// Runs `$body` with the type alias `$level` bound to the level marker of `$tier`.
///
/// ```ignore
/// let node: Box<dyn Generator> = with_level!(tier, L => Box::new(White::<L>::new()));
/// ```
#[macro_export]
macro_rules! with_level {
    ($tier:expr, $level:ident => $body:expr) => {
        match $tier {
            $crate::tier::Tier::Scalar => {
                type $level = $crate::tier::Scalar;
                $body
            }
            $crate::tier::Tier::Vector128 => {
                type $level = $crate::tier::Vector128;
                $body
            }
            $crate::tier::Tier::Vector256 => {
                type $level = $crate::tier::Vector256;
                $body
            }
            $crate::tier::Tier::Vector512 => {
                type $level = $crate::tier::Vector512;
                $body
            }
        }
    };
}
