#![forbid(unsafe_code)]

//! Sparse multimap from thread ids to copy-on-write lists.
//!
//! The matcher identifies its execution threads with small, dense-ish
//! integers that it allocates and recycles itself. [`IntMultimap`] maps
//! those keys to [`IntList`] values in a growable slot array: absent keys
//! are explicit empty slots, and [`IntMultimap::fork`] makes one key's list
//! a shared copy of another's in O(1) by leaning on the list's fork
//! primitive.
//!
//! # Usage
//!
//! ```
//! use rpr_state::int_multimap::IntMultimap;
//!
//! let mut map = IntMultimap::new(4, 4);
//! map.append(0, 10);
//!
//! // Thread 1 forks off thread 0 and then diverges.
//! map.fork(0, 1);
//! map.append(1, 11);
//!
//! assert_eq!(map.view(0).as_slice(), &[10]);
//! assert_eq!(map.view(1).as_slice(), &[10, 11]);
//! ```
//!
//! # Memory accounting
//!
//! A running byte estimate is maintained by before/after deltas on the one
//! list each operation touches. Ownership flips caused by *other* handles
//! (a forked sibling materializing away, or being released) can make a
//! slot's current footprint exceed its recorded contribution, so the
//! internal total is signed and the reported estimate clamps at zero. The
//! estimate is advisory: slight over-counting is tolerated, but a shared
//! buffer is never charged twice.

#[cfg(feature = "tracing")]
use tracing::trace;

use crate::array_view::ArrayView;
use crate::int_list::IntList;

/// Sparse map from small non-negative integer keys to [`IntList`] values.
///
/// The slot array grows by doubling (or to exact fit) when a key beyond the
/// current range is touched, and [`IntMultimap::clear`] keeps the slot
/// array's capacity so matching attempts on the same partition do not
/// reallocate it row after row.
#[derive(Debug)]
pub struct IntMultimap {
    /// One optional list per key; `None` marks an absent key.
    slots: Vec<Option<IntList>>,
    /// Initial capacity for lists created on first append.
    list_capacity: usize,
    /// Running byte estimate of the stored lists. Signed: see the module
    /// docs on ownership flips.
    lists_size: isize,
}

impl IntMultimap {
    /// Create a map with room for `key_capacity` keys; lists allocated on
    /// first append start with `list_capacity` slots.
    #[must_use]
    pub fn new(key_capacity: usize, list_capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(key_capacity);
        slots.resize_with(key_capacity, || None);
        Self {
            slots,
            list_capacity,
            lists_size: 0,
        }
    }

    /// Number of keys addressable without growing the slot array.
    #[inline]
    #[must_use]
    pub fn key_capacity(&self) -> usize {
        self.slots.len()
    }

    /// Append `value` to the list at `key`, creating the list on demand.
    ///
    /// Grows the slot array if `key` is out of range. The touched list
    /// materializes first when its buffer is shared.
    pub fn append(&mut self, key: usize, value: i32) {
        self.ensure_key(key);
        let list_capacity = self.list_capacity;
        let slot = &mut self.slots[key];
        let before = slot.as_ref().map_or(0, IntList::size_in_bytes);
        let list = slot.get_or_insert_with(|| IntList::with_capacity(list_capacity));
        list.push(value);
        let after = list.size_in_bytes();
        self.lists_size += after as isize - before as isize;
    }

    /// Make `child`'s list a shared copy of `parent`'s list, O(1).
    ///
    /// An existing list at `child` is released first. When `parent` holds
    /// no list, `child` ends up absent as well: a fork of nothing is
    /// nothing.
    pub fn fork(&mut self, parent: usize, child: usize) {
        self.ensure_key(child);
        let before = self.slots[child].as_ref().map_or(0, IntList::size_in_bytes);
        let forked = self
            .slots
            .get(parent)
            .and_then(Option::as_ref)
            .map(IntList::fork);
        match forked {
            Some(list) => {
                let after = list.size_in_bytes();
                // Installing drops any previous child list, releasing its
                // buffer reference.
                self.slots[child] = Some(list);
                self.lists_size += after as isize - before as isize;
            }
            None => {
                if self.slots[child].take().is_some() {
                    self.lists_size -= before as isize;
                }
            }
        }
    }

    /// Read-only view of the list at `key`, or the empty view when `key`
    /// is absent or out of range.
    #[must_use]
    pub fn view(&self, key: usize) -> ArrayView<'_> {
        match self.slots.get(key).and_then(Option::as_ref) {
            Some(list) => list.as_view(),
            None => ArrayView::EMPTY,
        }
    }

    /// Release the list at `key` and mark the key absent.
    ///
    /// Dropping the list decrements its buffer's reference count; the
    /// buffer itself is freed once the last forked handle goes away. A
    /// no-op for absent or out-of-range keys, so speculative cleanup is
    /// safe.
    pub fn release(&mut self, key: usize) {
        if let Some(list) = self.slots.get_mut(key).and_then(Option::take) {
            self.lists_size -= list.size_in_bytes() as isize;
        }
    }

    /// Release every present list and mark all keys absent.
    ///
    /// Keeps the slot array allocation so the next matching attempt on the
    /// same partition starts without reallocating the key index.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.lists_size = 0;
    }

    /// Estimated memory footprint in bytes: instance overhead, the slot
    /// array, and the stored lists' running total. Advisory only.
    #[must_use]
    pub fn size_in_bytes(&self) -> usize {
        let index = self.slots.len() * std::mem::size_of::<Option<IntList>>();
        let lists = self.lists_size.max(0) as usize;
        std::mem::size_of::<Self>() + index + lists
    }

    /// Grow the slot array to address `key`: double, or exact fit if that
    /// is larger.
    fn ensure_key(&mut self, key: usize) {
        if key >= self.slots.len() {
            let target = (self.slots.len() * 2).max(key + 1);
            #[cfg(feature = "tracing")]
            trace!(from = self.slots.len(), to = target, "growing key index");
            self.slots.resize_with(target, || None);
        }
    }
}
