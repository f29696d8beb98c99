//! Lazy predicate filter with one element of lookahead.
//!
//! [`FilteredIterable`] is an explicit state machine over `{ inner, buffered }`:
//!
//! ```text
//! has_next():  buffered?  ──yes──► true
//!                  │no
//!                  ▼
//!              pull inner until an element passes (buffer it) or inner ends
//!
//! try_next():  has_next() ? take buffered : Err(NoSuchElement)
//! ```
//!
//! The inner iterator is never advanced beyond the element that answers the
//! current call, so side-effecting or unbounded sources are safe to wrap.

use lp_core::{PerceptionError, PerceptionResult};

pub struct FilteredIterable<I: Iterator, P> {
    inner:     I,
    predicate: P,
    buffered:  Option<I::Item>,
}

impl<I, P> FilteredIterable<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    pub fn new(inner: I, predicate: P) -> Self {
        Self { inner, predicate, buffered: None }
    }

    /// Whether another matching element exists.  Buffers it if so.
    pub fn has_next(&mut self) -> bool {
        if self.buffered.is_some() {
            return true;
        }
        for item in self.inner.by_ref() {
            if (self.predicate)(&item) {
                self.buffered = Some(item);
                return true;
            }
        }
        false
    }

    /// The next matching element, or [`PerceptionError::NoSuchElement`] when
    /// none remains.
    pub fn try_next(&mut self) -> PerceptionResult<I::Item> {
        if self.has_next() {
            self.buffered.take().ok_or(PerceptionError::NoSuchElement)
        } else {
            Err(PerceptionError::NoSuchElement)
        }
    }
}

impl<I, P> Iterator for FilteredIterable<I, P>
where
    I: Iterator,
    P: FnMut(&I::Item) -> bool,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<I::Item> {
        self.try_next().ok()
    }
}
