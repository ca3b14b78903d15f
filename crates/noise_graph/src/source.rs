//! Source slots through which one node reads another.
//!
//! A [`BaseSource<L>`] pairs the shared owning reference to an upstream node with that
//! node's [`Kernel<L>`]. Both are set together by [`BaseSource::new`] and dropped
//! together, so the cached kernel never outlives or disagrees with the owner.
//!
//! Nodes embed one of two slot kinds:
//! - [`GeneratorSource<L>`]: mandatory, starts unbound.
//! - [`HybridSource<L>`]: either a bound node or a constant broadcast as a uniform field.
//!
//! Binding checks that the upstream tier equals `L`. Rebinding is allowed while the owning
//! node is still exclusively held; each bind derives the kernel afresh.
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::generator::{Generator, Kernel, Node};
use crate::lanes::FloatLanes;
use crate::range::ValueRange;
use crate::tier::Level;

/// A bound upstream node and its tier-specialized kernel.
#[derive(Clone)]
pub struct BaseSource<L: Level> {
    node: Arc<dyn Generator>,
    kernel: Arc<dyn Kernel<L>>,
}

impl<L: Level> BaseSource<L> {
    /// Binds `source`, rejecting it if its tier is not `L`.
    pub fn new(source: &Arc<dyn Generator>) -> Result<Self> {
        let found = source.tier();
        if found != L::TIER {
            warn!(
                source = source.metadata().name,
                expected = %L::TIER,
                found = %found,
                "rejected source from another tier"
            );
            return Err(Error::TierMismatch {
                expected: L::TIER,
                found,
            });
        }

        let fast_path = Arc::clone(source).fast_path();
        let found = fast_path.tier();
        let Some(kernel) = L::from_fast_path(fast_path) else {
            warn!(
                source = source.metadata().name,
                expected = %L::TIER,
                found = %found,
                "source reported a tier its fast path does not match"
            );
            return Err(Error::TierMismatch {
                expected: L::TIER,
                found,
            });
        };

        debug!(source = source.metadata().name, tier = %L::TIER, "bound source");
        Ok(Self {
            node: Arc::clone(source),
            kernel,
        })
    }

    /// Binds a node whose level is statically `L`. Cannot fail.
    pub fn from_node<N: Node<Level = L>>(node: Arc<N>) -> Self {
        let kernel: Arc<dyn Kernel<L>> = node.clone();
        Self { node, kernel }
    }

    /// The owning reference to the upstream node.
    pub fn node(&self) -> &Arc<dyn Generator> {
        &self.node
    }

    #[inline]
    pub fn kernel(&self) -> &dyn Kernel<L> {
        &*self.kernel
    }
}

impl<L: Level> fmt::Debug for BaseSource<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseSource")
            .field("node", &self.node.metadata().name)
            .field("tier", &L::TIER)
            .finish()
    }
}

/// Mandatory source slot. Must be bound before the owning node is evaluated.
#[derive(Clone, Debug)]
pub struct GeneratorSource<L: Level> {
    bound: Option<BaseSource<L>>,
}

impl<L: Level> GeneratorSource<L> {
    pub const fn new() -> Self {
        Self { bound: None }
    }

    /// Binds `source`. On a tier mismatch the slot keeps its previous binding.
    pub fn bind(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        self.bound = Some(BaseSource::new(source)?);
        Ok(())
    }

    /// Binds a node whose level is statically `L`.
    pub fn bind_node<N: Node<Level = L>>(&mut self, node: Arc<N>) {
        self.bound = Some(BaseSource::from_node(node));
    }

    /// Releases the bound node, if any.
    pub fn clear(&mut self) {
        self.bound = None;
    }

    pub fn get(&self) -> Option<&Arc<dyn Generator>> {
        self.bound.as_ref().map(BaseSource::node)
    }

    pub fn is_bound(&self) -> bool {
        self.bound.is_some()
    }

    /// Fails with [`Error::UnboundSource`] if empty, otherwise validates the bound subgraph.
    pub fn ensure_bound(&self, node: &'static str, slot: &'static str) -> Result<()> {
        match &self.bound {
            Some(source) => source.node().validate(),
            None => Err(Error::UnboundSource { node, slot }),
        }
    }

    /// Evaluates the bound node. Evaluating an unbound slot yields zeros.
    #[inline]
    pub fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        debug_assert!(self.is_bound(), "evaluated an unbound generator source");
        match &self.bound {
            Some(source) => source.kernel().gen_2d(seed, x, y),
            None => L::F::splat(0.0),
        }
    }

    #[inline]
    pub fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        debug_assert!(self.is_bound(), "evaluated an unbound generator source");
        match &self.bound {
            Some(source) => source.kernel().gen_3d(seed, x, y, z),
            None => L::F::splat(0.0),
        }
    }
}

impl<L: Level> Default for GeneratorSource<L> {
    fn default() -> Self {
        Self::new()
    }
}

/// Slot holding either a bound node or a constant.
#[derive(Clone, Debug)]
pub enum HybridSource<L: Level> {
    Constant(f32),
    Bound(BaseSource<L>),
}

impl<L: Level> HybridSource<L> {
    pub const fn new(constant: f32) -> Self {
        HybridSource::Constant(constant)
    }

    /// Binds `source`. On a tier mismatch the slot keeps its previous state.
    pub fn bind(&mut self, source: &Arc<dyn Generator>) -> Result<()> {
        *self = HybridSource::Bound(BaseSource::new(source)?);
        Ok(())
    }

    /// Binds a node whose level is statically `L`.
    pub fn bind_node<N: Node<Level = L>>(&mut self, node: Arc<N>) {
        *self = HybridSource::Bound(BaseSource::from_node(node));
    }

    /// Switches to a constant, releasing any bound node.
    pub fn set_constant(&mut self, value: f32) {
        *self = HybridSource::Constant(value);
    }

    /// The constant, or `None` when a node is bound.
    pub fn constant(&self) -> Option<f32> {
        match self {
            HybridSource::Constant(value) => Some(*value),
            HybridSource::Bound(_) => None,
        }
    }

    pub fn get(&self) -> Option<&Arc<dyn Generator>> {
        match self {
            HybridSource::Constant(_) => None,
            HybridSource::Bound(source) => Some(source.node()),
        }
    }

    /// Range this slot produces when it holds a constant.
    pub fn constant_range(&self) -> Option<ValueRange> {
        self.constant().map(ValueRange::constant)
    }

    /// Validates the bound subgraph; constants are always valid.
    pub fn check(&self) -> Result<()> {
        match self {
            HybridSource::Constant(_) => Ok(()),
            HybridSource::Bound(source) => source.node().validate(),
        }
    }

    #[inline]
    pub fn gen_2d(&self, seed: i32, x: L::F, y: L::F) -> L::F {
        match self {
            HybridSource::Constant(value) => L::F::splat(*value),
            HybridSource::Bound(source) => source.kernel().gen_2d(seed, x, y),
        }
    }

    #[inline]
    pub fn gen_3d(&self, seed: i32, x: L::F, y: L::F, z: L::F) -> L::F {
        match self {
            HybridSource::Constant(value) => L::F::splat(*value),
            HybridSource::Bound(source) => source.kernel().gen_3d(seed, x, y, z),
        }
    }
}

impl<L: Level> Default for HybridSource<L> {
    fn default() -> Self {
        HybridSource::Constant(0.0)
    }
}

#[cfg(test)]
mod tests {
    use glam::{IVec2, UVec2, Vec2};

    use super::*;
    use crate::generators::{Constant, DomainScale, White};
    use crate::lanes::F32s;
    use crate::tier::{Scalar, Tier, Vector128, Vector256};

    fn white<L: Level>() -> Arc<dyn Generator> {
        Arc::new(White::<L>::new())
    }

    #[test]
    fn same_tier_binding_stores_supplied_node() {
        let upstream = white::<Scalar>();
        let mut slot = GeneratorSource::<Scalar>::new();
        slot.bind(&upstream).expect("same tier binds");

        let stored = slot.get().expect("slot is bound");
        assert!(Arc::ptr_eq(stored, &upstream));
        assert_eq!(Arc::strong_count(&upstream), 3);
    }

    #[test]
    fn cross_tier_binding_is_rejected() {
        let upstream = white::<Vector256>();
        let mut slot = GeneratorSource::<Scalar>::new();
        let err = slot.bind(&upstream).expect_err("tiers differ");
        assert!(matches!(
            err,
            Error::TierMismatch {
                expected: Tier::Scalar,
                found: Tier::Vector256
            }
        ));
        assert!(!slot.is_bound());
        assert_eq!(Arc::strong_count(&upstream), 1);
    }

    #[test]
    fn rejected_rebind_keeps_previous_binding() {
        let first = white::<Vector128>();
        let mut slot = GeneratorSource::<Vector128>::new();
        slot.bind(&first).expect("same tier binds");

        assert!(slot.bind(&white::<Scalar>()).is_err());
        assert!(Arc::ptr_eq(slot.get().expect("still bound"), &first));
    }

    #[test]
    fn rebind_replaces_kernel() {
        let mut slot = GeneratorSource::<Scalar>::new();
        slot.bind_node(Arc::new(Constant::<Scalar>::new(1.0)));
        assert_eq!(slot.gen_2d(0, F32s([0.0]), F32s([0.0])), F32s([1.0]));

        slot.bind_node(Arc::new(Constant::<Scalar>::new(-2.0)));
        assert_eq!(slot.gen_2d(0, F32s([0.0]), F32s([0.0])), F32s([-2.0]));
    }

    #[test]
    fn clearing_releases_shared_ownership() {
        let upstream = white::<Scalar>();
        let mut slot = GeneratorSource::<Scalar>::new();
        slot.bind(&upstream).expect("same tier binds");
        assert_eq!(Arc::strong_count(&upstream), 3);
        slot.clear();
        assert_eq!(Arc::strong_count(&upstream), 1);
    }

    #[test]
    fn unbound_mandatory_source_fails_validation() {
        let slot = GeneratorSource::<Scalar>::new();
        assert!(matches!(
            slot.ensure_bound("Test", "source"),
            Err(Error::UnboundSource {
                node: "Test",
                slot: "source"
            })
        ));
    }

    #[test]
    fn validation_recurses_into_bound_subgraph() {
        let inner: Arc<dyn Generator> = Arc::new(DomainScale::<Scalar>::new());
        let mut slot = GeneratorSource::<Scalar>::new();
        slot.bind(&inner).expect("same tier binds");
        assert!(matches!(
            slot.ensure_bound("Outer", "source"),
            Err(Error::UnboundSource {
                node: "DomainScale",
                ..
            })
        ));
    }

    #[test]
    fn hybrid_constant_is_uniform() {
        let slot = HybridSource::<Vector128>::new(0.3);
        let x = F32s([0.0, 10.0, -5.0, 1e6]);
        let y = F32s([3.0, -3.0, 0.5, 2.0]);
        assert_eq!(slot.gen_2d(1, x, y), F32s([0.3; 4]));
        assert_eq!(slot.gen_3d(9, x, y, x), F32s([0.3; 4]));
        assert_eq!(slot.constant_range(), Some(ValueRange::constant(0.3)));
        assert!(slot.get().is_none());
        assert!(slot.check().is_ok());
    }

    #[test]
    fn hybrid_defaults_to_zero() {
        let slot = HybridSource::<Scalar>::default();
        assert_eq!(slot.constant(), Some(0.0));
    }

    #[test]
    fn hybrid_switches_between_variants() {
        let upstream = white::<Scalar>();
        let mut slot = HybridSource::<Scalar>::new(1.0);
        slot.bind(&upstream).expect("same tier binds");
        assert!(slot.constant().is_none());
        assert!(Arc::ptr_eq(slot.get().expect("bound"), &upstream));

        let x = F32s([0.25]);
        let expected = upstream.gen_single_2d(0.25, 0.25, 4);
        assert_eq!(slot.gen_2d(4, x, x), F32s([expected]));

        slot.set_constant(2.0);
        assert_eq!(slot.constant(), Some(2.0));
        assert_eq!(Arc::strong_count(&upstream), 1);
    }

    #[test]
    fn hybrid_rejects_cross_tier_and_keeps_constant() {
        let mut slot = HybridSource::<Vector256>::new(0.5);
        assert!(slot.bind(&white::<Vector128>()).is_err());
        assert_eq!(slot.constant(), Some(0.5));
    }

    #[test]
    fn statically_typed_binding_matches_dynamic() {
        let node = Arc::new(White::<Vector128>::new());
        let mut typed = GeneratorSource::<Vector128>::new();
        typed.bind_node(node.clone());

        let erased: Arc<dyn Generator> = node;
        let mut dynamic = GeneratorSource::<Vector128>::new();
        dynamic.bind(&erased).expect("same tier binds");

        let x = F32s([0.5, 1.5, 2.5, 3.5]);
        assert_eq!(typed.gen_2d(3, x, x), dynamic.gen_2d(3, x, x));
    }

    #[test]
    fn bound_source_is_evaluated_through_kernel() {
        let upstream = white::<Vector128>();
        let mut slot = GeneratorSource::<Vector128>::new();
        slot.bind(&upstream).expect("same tier binds");

        let mut out = vec![0.0; 4];
        upstream.gen_uniform_grid_2d(&mut out, IVec2::ZERO, UVec2::new(4, 1), 1.0, 11);
        let lanes = slot.gen_2d(11, F32s([0.0, 1.0, 2.0, 3.0]), F32s([0.0; 4]));
        assert_eq!(lanes.0.to_vec(), out);

        let mut single = vec![0.0; 1];
        upstream.gen_position_array_2d(&mut single, &[2.0], &[0.0], Vec2::ZERO, 11);
        assert_eq!(single[0], lanes.0[2]);
    }
}
