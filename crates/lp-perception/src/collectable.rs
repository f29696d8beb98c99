//! The single-pass reduce protocol over perceived neighbors.
//!
//! A [`PerceptionCollectable`] exposes two views of the same neighbors, both
//! nearest first:
//!
//! - [`underlying`](PerceptionCollectable::underlying): raw objects with
//!   their distance, cheap to produce;
//! - [`iter`](PerceptionCollectable::iter): each raw object wrapped into a
//!   caller-facing headway.
//!
//! [`collect`](PerceptionCollectable::collect) reduces the raw view:
//!
//! ```text
//! value = identity()
//! for (object, distance) in underlying():
//!     intermediate = accumulate(intermediate, object, distance)
//!     intermediate.step += 1
//!     if intermediate.stop: break
//! return finalize(value)
//! ```
//!
//! so consumers that only need an aggregate never pay for wrapping, and an
//! accumulator that found what it needs ends the walk.

use lp_core::{Length, PerceptionResult};

// ── Intermediate ──────────────────────────────────────────────────────────────

/// Running state of one [`collect`](PerceptionCollectable::collect) call.
#[derive(Clone, Debug, PartialEq)]
pub struct Intermediate<I> {
    value: I,
    step:  u32,
    stop:  bool,
}

impl<I> Intermediate<I> {
    pub fn new(value: I) -> Self {
        Self { value, step: 0, stop: false }
    }

    #[inline]
    pub fn value(&self) -> &I {
        &self.value
    }

    #[inline]
    pub fn value_mut(&mut self) -> &mut I {
        &mut self.value
    }

    pub fn set_value(&mut self, value: I) {
        self.value = value;
    }

    /// Number of underlying elements accumulated before the current one.
    #[inline]
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Request that no further elements are visited.  Cannot be undone.
    #[inline]
    pub fn stop(&mut self) {
        self.stop = true;
    }

    #[inline]
    pub fn is_stop(&self) -> bool {
        self.stop
    }

    pub fn into_value(self) -> I {
        self.value
    }
}

// ── UnderlyingDistance ────────────────────────────────────────────────────────

/// A raw neighbor and its distance to the perceiving GTU.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UnderlyingDistance<U> {
    pub object:   U,
    pub distance: Length,
}

impl<U> UnderlyingDistance<U> {
    #[inline]
    pub fn new(object: U, distance: Length) -> Self {
        Self { object, distance }
    }
}

// ── PerceptionCollector ───────────────────────────────────────────────────────

/// The three functions of a reduction, bundled for reuse.
pub struct PerceptionCollector<'f, U, I, C> {
    pub identity:   Box<dyn FnOnce() -> I + 'f>,
    pub accumulate: Box<dyn FnMut(Intermediate<I>, U, Length) -> Intermediate<I> + 'f>,
    pub finalize:   Box<dyn FnOnce(I) -> C + 'f>,
}

impl<'f, U, I, C> PerceptionCollector<'f, U, I, C> {
    pub fn new(
        identity: impl FnOnce() -> I + 'f,
        accumulate: impl FnMut(Intermediate<I>, U, Length) -> Intermediate<I> + 'f,
        finalize: impl FnOnce(I) -> C + 'f,
    ) -> Self {
        Self {
            identity:   Box::new(identity),
            accumulate: Box::new(accumulate),
            finalize:   Box::new(finalize),
        }
    }
}

/// Ready-made collectors.
pub mod collectors {
    use lp_core::Length;

    use super::{Intermediate, PerceptionCollector, UnderlyingDistance};

    /// Number of neighbors.
    pub fn count<'f, U: 'f>() -> PerceptionCollector<'f, U, usize, usize> {
        PerceptionCollector::new(
            || 0,
            |mut acc: Intermediate<usize>, _, _| {
                *acc.value_mut() += 1;
                acc
            },
            |n| n,
        )
    }

    /// The nearest neighbor; visits at most one element.
    pub fn nearest<'f, U: 'f>()
    -> PerceptionCollector<'f, U, Option<UnderlyingDistance<U>>, Option<UnderlyingDistance<U>>> {
        PerceptionCollector::new(
            || None,
            |mut acc: Intermediate<Option<UnderlyingDistance<U>>>, object, distance| {
                acc.set_value(Some(UnderlyingDistance::new(object, distance)));
                acc.stop();
                acc
            },
            |v| v,
        )
    }

    /// The nearest neighbor if it lies within `max`.
    pub fn nearest_within<'f, U: 'f>(
        max: Length,
    ) -> PerceptionCollector<'f, U, Option<UnderlyingDistance<U>>, Option<UnderlyingDistance<U>>> {
        PerceptionCollector::new(
            || None,
            move |mut acc: Intermediate<Option<UnderlyingDistance<U>>>, object, distance: Length| {
                if distance <= max {
                    acc.set_value(Some(UnderlyingDistance::new(object, distance)));
                }
                acc.stop();
                acc
            },
            |v| v,
        )
    }

    /// Every neighbor, nearest first.
    pub fn collect_vec<'f, U: 'f>()
    -> PerceptionCollector<'f, U, Vec<UnderlyingDistance<U>>, Vec<UnderlyingDistance<U>>> {
        PerceptionCollector::new(
            Vec::new,
            |mut acc: Intermediate<Vec<UnderlyingDistance<U>>>, object, distance| {
                acc.value_mut().push(UnderlyingDistance::new(object, distance));
                acc
            },
            |v| v,
        )
    }
}

// ── PerceptionCollectable ─────────────────────────────────────────────────────

/// Re-iterable set of perceived neighbors in topological order.
///
/// Every call to [`underlying`](Self::underlying) starts a fresh walk.
pub trait PerceptionCollectable {
    /// Raw neighbor type.
    type Object: Copy;
    /// Caller-facing neighbor type.
    type Headway;

    /// Raw neighbors with distance, nearest first.
    fn underlying(&self) -> impl Iterator<Item = UnderlyingDistance<Self::Object>> + '_;

    /// Turn one raw neighbor into a headway.
    fn wrap(&self, neighbor: UnderlyingDistance<Self::Object>) -> PerceptionResult<Self::Headway>;

    /// Wrapped neighbors, nearest first.
    fn iter(&self) -> impl Iterator<Item = PerceptionResult<Self::Headway>> + '_ {
        self.underlying().map(move |u| self.wrap(u))
    }

    /// Reduce the raw neighbors in one pass.
    fn collect<I, C>(
        &self,
        identity: impl FnOnce() -> I,
        mut accumulate: impl FnMut(Intermediate<I>, Self::Object, Length) -> Intermediate<I>,
        finalize: impl FnOnce(I) -> C,
    ) -> C {
        let mut intermediate = Intermediate::new(identity());
        for u in self.underlying() {
            intermediate = accumulate(intermediate, u.object, u.distance);
            intermediate.step += 1;
            if intermediate.stop {
                break;
            }
        }
        finalize(intermediate.value)
    }

    /// [`collect`](Self::collect) with a bundled collector.
    fn collect_with<I, C>(&self, collector: PerceptionCollector<'_, Self::Object, I, C>) -> C {
        let PerceptionCollector { identity, accumulate, finalize } = collector;
        self.collect(identity, accumulate, finalize)
    }

    /// The nearest wrapped neighbor.
    fn first(&self) -> Option<PerceptionResult<Self::Headway>> {
        self.underlying().next().map(|u| self.wrap(u))
    }

    fn is_empty(&self) -> bool {
        self.underlying().next().is_none()
    }
}
