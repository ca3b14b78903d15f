//! Two-input arithmetic blends.
//!
//! Every blend reads a mandatory `lhs` source and a hybrid `rhs`, so `rhs` can be another
//! node or a plain constant.
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::basic::unknown_variable;
use crate::error::{Error, Result};
use crate::generator::{Generator, Kernel, Node};
use crate::lanes::FloatLanes;
use crate::metadata::{HybridMeta, Metadata};
use crate::source::{GeneratorSource, HybridSource};
use crate::tier::{Level, Tier};
use crate::with_level;

/// Lane operation applied by a [`Blend`].
pub trait BlendOp: Send + Sync + 'static {
    fn descriptor() -> &'static Metadata;

    fn apply<F: FloatLanes>(lhs: F, rhs: F) -> F;
}

/// `lhs (op) rhs`, evaluated lane by lane.
pub struct Blend<L: Level, O: BlendOp> {
    lhs: GeneratorSource<L>,
    rhs: HybridSource<L>,
    _op: PhantomData<O>,
}

impl<L: Level, O: BlendOp> Blend<L, O> {
    pub fn new() -> Self {
        Self {
            lhs: GeneratorSource::new(),
            rhs: HybridSource::new(0.0),
            _op: PhantomData,
        }
    }

    pub fn set_lhs(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        self.lhs.bind(source)
    }

    pub fn set_rhs(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        self.rhs.bind(source)
    }

    pub fn set_rhs_constant(&mut self, value: f32) {
        self.rhs.set_constant(value);
    }

    pub fn lhs(&self) -> &GeneratorSource<L> {
        &self.lhs
    }

    pub fn rhs(&self) -> &HybridSource<L> {
        &self.rhs
    }
}

impl<L: Level, O: BlendOp> Default for Blend<L, O> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Level, O: BlendOp> fmt::Debug for Blend<L, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(O::descriptor().name)
            .field("lhs", &self.lhs)
            .field("rhs", &self.rhs)
            .finish()
    }
}

impl<L: Level, O: BlendOp> Kernel<L> for Blend<L, O> {
    fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        O::apply(self.lhs.gen_2d(seed, x, y), self.rhs.gen_2d(seed, x, y))
    }

    fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        O::apply(self.lhs.gen_3d(seed, x, y, z), self.rhs.gen_3d(seed, x, y, z))
    }
}

impl<L: Level, O: BlendOp> Node for Blend<L, O> {
    type Level = L;

    fn descriptor() -> &'static Metadata {
        O::descriptor()
    }

    fn check_sources(&self) -> Result<()> {
        self.lhs.ensure_bound(O::descriptor().name, "lhs")?;
        self.rhs.check()
    }

    fn bind_named_source(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        match slot {
            "lhs" => self.lhs.bind(source),
            _ => Err(Error::UnknownSource {
                node: O::descriptor().name,
                slot: slot.to_owned(),
            }),
        }
    }

    fn bind_named_hybrid(&mut self, slot: &str, source: &Arc<dyn Generator>) -> Result<()> {
        match slot {
            "rhs" => self.rhs.bind(source),
            _ => Err(Error::UnknownHybrid {
                node: O::descriptor().name,
                slot: slot.to_owned(),
            }),
        }
    }

    fn set_named_constant(&mut self, slot: &str, value: f32) -> Result<()> {
        match slot {
            "rhs" => {
                self.rhs.set_constant(value);
                Ok(())
            }
            _ => Err(Error::UnknownHybrid {
                node: O::descriptor().name,
                slot: slot.to_owned(),
            }),
        }
    }

    fn set_named_variable(&mut self, name: &str, _value: f32) -> Result<()> {
        unknown_variable::<Self>(name)
    }
}

fn create_blend<O: BlendOp>(tier: Tier) -> Box<dyn Generator> {
    with_level!(tier, L => Box::new(Blend::<L, O>::new()))
}

const BLEND_SOURCES: &[&str] = &["lhs"];
const BLEND_HYBRIDS: &[HybridMeta] = &[HybridMeta {
    name: "rhs",
    default: 0.0,
}];

macro_rules! blend_op {
    ($(#[$doc:meta])* $op:ident, $alias:ident, $meta:ident, $name:literal, |$a:ident, $b:ident| $body:expr) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $op;

        impl BlendOp for $op {
            fn descriptor() -> &'static Metadata {
                &$meta
            }

            #[inline]
            fn apply<F: FloatLanes>($a: F, $b: F) -> F {
                $body
            }
        }

        $(#[$doc])*
        pub type $alias<L> = Blend<L, $op>;

        pub static $meta: Metadata = Metadata::new($name, "Blends", create_blend::<$op>)
            .with_sources(BLEND_SOURCES)
            .with_hybrids(BLEND_HYBRIDS);
    };
}

blend_op!(
    /// `lhs + rhs`.
    AddOp, Add, ADD, "Add", |a, b| a + b
);
blend_op!(
    /// `lhs - rhs`.
    SubtractOp, Subtract, SUBTRACT, "Subtract", |a, b| a - b
);
blend_op!(
    /// `lhs * rhs`.
    MultiplyOp, Multiply, MULTIPLY, "Multiply", |a, b| a * b
);
blend_op!(
    /// Lane-wise minimum of `lhs` and `rhs`.
    MinOp, Min, MIN, "Min", |a, b| a.min(b)
);
blend_op!(
    /// Lane-wise maximum of `lhs` and `rhs`.
    MaxOp, Max, MAX, "Max", |a, b| a.max(b)
);
