#![forbid(unsafe_code)]

//! Copy-on-write integer lists.
//!
//! An [`IntList`] is a growable sequence of `i32` values backed by a
//! reference-counted buffer. [`IntList::fork`] produces a logical copy in
//! O(1) by sharing the buffer; the first mutation on either side
//! materializes an independent copy for the writer only. The matcher forks
//! thread state at every branching decision, so logical copies vastly
//! outnumber divergent writes and eager copying would dominate the match
//! loop.
//!
//! # Usage
//!
//! ```
//! use rpr_state::int_list::IntList;
//!
//! let mut list = IntList::with_capacity(1);
//! list.push(7);
//!
//! // Fork is O(1): the child shares the parent's buffer.
//! let mut child = list.fork();
//! child.push(8); // first write materializes the child's own buffer
//!
//! assert_eq!(list.len(), 1);
//! assert_eq!(list.get(0), 7);
//! assert_eq!(child.len(), 2);
//! assert_eq!(child.get(1), 8);
//! ```
//!
//! # Sharing and release
//!
//! The reference count is the `Rc` strong count: forking bumps it, dropping
//! a handle releases it, and the buffer is freed when the last handle goes
//! away. There is no explicit release call to misuse: a dropped handle
//! cannot be used again, and the count cannot go negative. `Rc` also pins
//! the whole structure to a single thread of control, which is the intended
//! confinement for one operator instance processing one partition.
//!
//! # Memory accounting
//!
//! [`IntList::size_in_bytes`] charges the backing buffer only to a unique
//! owner. While a buffer is shared every handle reports just its instance
//! overhead, so a buffer is never double-counted in the operator's memory
//! estimate.

use std::rc::Rc;

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::array_view::ArrayView;

const VALUE_BYTES: usize = std::mem::size_of::<i32>();

/// A growable list of `i32` with reference-counted copy-on-write storage.
///
/// The logical length is tracked separately from the buffer capacity:
/// positions in `[len, capacity)` hold residual data from earlier use of
/// the buffer and are not part of the list until a write extends the length
/// over them.
#[derive(Debug)]
pub struct IntList {
    /// Shared backing buffer. Every slot is initialized; `buf.len()` is the
    /// capacity, not the logical length.
    buf: Rc<Vec<i32>>,
    /// Logical length: number of positions written so far.
    size: usize,
}

impl IntList {
    /// Create an empty list with no allocated capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create an empty list whose buffer can hold `capacity` values before
    /// growing.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Rc::new(vec![0; capacity]),
            size: 0,
        }
    }

    /// Logical number of elements in the list.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Check if the list contains no elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Slots available in the backing buffer before the next growth.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Whether the backing buffer is currently shared with a forked handle.
    #[inline]
    #[must_use]
    pub fn is_shared(&self) -> bool {
        Rc::strong_count(&self.buf) > 1
    }

    /// Append a value to the end of the list.
    ///
    /// Materializes first if the buffer is shared, then grows the buffer by
    /// doubling (or to exact fit, whichever is larger) if it is full.
    /// Amortized O(1).
    pub fn push(&mut self, value: i32) {
        let size = self.size;
        let buf = self.make_unique();
        if size == buf.len() {
            grow(buf, size + 1);
        }
        buf[size] = value;
        self.size = size + 1;
    }

    /// Returns the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len()`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> i32 {
        assert!(
            index < self.size,
            "index {index} out of range for list of length {}",
            self.size
        );
        self.buf[index]
    }

    /// Write `value` at `index`, extending the list if `index` is past the
    /// end.
    ///
    /// When `index >= len()`, the length becomes `index + 1` and the gap
    /// `[old_len, index)` keeps whatever the buffer already held at those
    /// positions. The gap contents are unspecified: the matcher never reads
    /// a slot it has not written, and callers must not rely on zero-fill.
    pub fn set(&mut self, index: usize, value: i32) {
        let buf = self.make_unique();
        if index >= buf.len() {
            grow(buf, index + 1);
        }
        buf[index] = value;
        self.size = self.size.max(index + 1);
    }

    /// Reset the logical length to zero.
    ///
    /// Materializes first if the buffer is shared, so clearing one handle
    /// never truncates a forked sibling.
    pub fn clear(&mut self) {
        self.make_unique();
        self.size = 0;
    }

    /// Create a logical copy that shares the backing buffer, O(1).
    ///
    /// Both handles keep full read/write capability; the first write on
    /// either side copies the live prefix into a fresh buffer for the
    /// writer, leaving the other handle untouched.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            buf: Rc::clone(&self.buf),
            size: self.size,
        }
    }

    /// Read-only view of the first `len()` elements.
    ///
    /// The borrow pins this list for the lifetime of the view, so the
    /// underlying buffer cannot be mutated or released while the view is
    /// alive.
    #[must_use]
    pub fn as_view(&self) -> ArrayView<'_> {
        ArrayView::new(&self.buf[..self.size])
    }

    /// Estimated memory footprint in bytes.
    ///
    /// Instance overhead is always counted; the backing buffer is counted
    /// only when this handle is its unique owner, so shared buffers are
    /// never double-counted across forks. Advisory only: used by the
    /// operator's memory accounting, not for correctness.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        let backing = if self.is_shared() {
            0
        } else {
            self.buf.len() * VALUE_BYTES
        };
        std::mem::size_of::<Self>() + backing
    }

    /// Materialize a uniquely owned buffer if this handle shares storage,
    /// then hand out the mutable buffer. Copies only the live prefix, never
    /// the full capacity. Every mutating entry point goes through here.
    fn make_unique(&mut self) -> &mut Vec<i32> {
        if self.is_shared() {
            #[cfg(feature = "tracing")]
            trace!(
                len = self.size,
                shared_refs = Rc::strong_count(&self.buf),
                "materializing copy-on-write buffer"
            );
            let fresh = self.buf[..self.size].to_vec();
            self.buf = Rc::new(fresh);
        }
        // Unique at this point, so no clone happens here.
        Rc::make_mut(&mut self.buf)
    }
}

impl Default for IntList {
    fn default() -> Self {
        Self::new()
    }
}

/// Grow `buf` to hold at least `needed` slots: double, or exact fit if that
/// is larger. New slots are zero-initialized but their contents are not part
/// of the list's contract.
fn grow(buf: &mut Vec<i32>, needed: usize) {
    let target = (buf.len() * 2).max(needed);
    buf.resize(target, 0);
}
