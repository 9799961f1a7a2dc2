#![forbid(unsafe_code)]

//! Per-thread capture state for the matcher.
//!
//! A matcher thread accumulates two integer sequences as it advances:
//! capture boundaries (offsets delimiting excluded subsequences of the
//! match) and the labels it has matched so far. [`Captures`] bundles both
//! under one thread id so a thread's full state always moves as a unit:
//! fork and release are defined only as compound operations over the pair,
//! and the member maps are never exposed. That rules out the class of bugs
//! where boundaries and labels drift out of sync across a fork.
//!
//! # Usage
//!
//! ```
//! use rpr_state::captures::Captures;
//!
//! let mut state = Captures::new(4, 4, 4);
//! state.save_label(0, 3);
//!
//! // SPLIT: thread 1 continues from thread 0's state.
//! state.fork(0, 1);
//! state.save_label(1, 5);
//!
//! assert_eq!(state.labels(0).as_slice(), &[3]);
//! assert_eq!(state.labels(1).as_slice(), &[3, 5]);
//!
//! // Thread 0 dies; its state is released in one call.
//! state.release(0);
//! assert!(state.labels(0).is_empty());
//! ```

use crate::array_view::ArrayView;
use crate::int_multimap::IntMultimap;

/// The complete per-thread state owned by the matcher: capture boundaries
/// and matched labels, keyed by thread id.
#[derive(Debug)]
pub struct Captures {
    /// Start/end offsets delimiting excluded subsequences, per thread.
    captures: IntMultimap,
    /// Matched label ids, one per consumed position, per thread.
    labels: IntMultimap,
}

impl Captures {
    /// Create state with room for `initial_threads` thread ids; per-thread
    /// lists start with `capture_capacity` and `label_capacity` slots.
    #[must_use]
    pub fn new(initial_threads: usize, capture_capacity: usize, label_capacity: usize) -> Self {
        Self {
            captures: IntMultimap::new(initial_threads, capture_capacity),
            labels: IntMultimap::new(initial_threads, label_capacity),
        }
    }

    /// Record a capture boundary for `thread`.
    pub fn save_capture(&mut self, thread: usize, position: i32) {
        self.captures.append(thread, position);
    }

    /// Record a matched label for `thread`.
    pub fn save_label(&mut self, thread: usize, label: i32) {
        self.labels.append(thread, label);
    }

    /// Fork `parent`'s full state into `child`: both boundary and label
    /// lists are duplicated together, O(1) each, copy-on-write afterwards.
    pub fn fork(&mut self, parent: usize, child: usize) {
        self.captures.fork(parent, child);
        self.labels.fork(parent, child);
    }

    /// Capture boundaries recorded for `thread`; empty when none.
    #[must_use]
    pub fn captures(&self, thread: usize) -> ArrayView<'_> {
        self.captures.view(thread)
    }

    /// Labels recorded for `thread`; empty when none.
    #[must_use]
    pub fn labels(&self, thread: usize) -> ArrayView<'_> {
        self.labels.view(thread)
    }

    /// Release the full state of a finished `thread`. Safe to call for
    /// threads that never recorded anything.
    pub fn release(&mut self, thread: usize) {
        self.captures.release(thread);
        self.labels.release(thread);
    }

    /// Estimated memory footprint of this structure and both maps it owns.
    /// Advisory only.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        std::mem::size_of::<Self>() + self.captures.size_in_bytes() + self.labels.size_in_bytes()
    }
}
