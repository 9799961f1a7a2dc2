#![forbid(unsafe_code)]

//! Copy-on-write per-thread state for the row pattern matcher.
//!
//! # Role in the matcher
//! The pattern matcher is a backtracking automaton: at every branching
//! decision it forks an execution thread, and each thread carries the
//! capture boundaries and labels it has accumulated so far. Forking happens
//! up to once per input row per alternative, so duplicating that state
//! eagerly would dominate the match loop. This crate makes the logical copy
//! O(1) and defers the real copy to the first divergent write.
//!
//! # Primary responsibilities
//! - **ArrayView**: zero-copy read-only window over a list's live prefix.
//! - **IntList**: growable integer sequence with reference-counted,
//!   copy-on-write backing storage.
//! - **IntMultimap**: sparse thread-id-keyed map of such lists with O(1)
//!   per-key forking.
//! - **Captures**: the two multimaps (boundaries + labels) bundled so a
//!   thread's state forks and releases atomically.
//!
//! # How it fits in the system
//! The automaton owns the thread ids and decides when to save, fork, and
//! release; the surrounding operator polls `size_in_bytes()` to enforce
//! query memory limits. Everything here is transient per-partition working
//! state: no persistence and no wire format. The `Rc`-based refcounts
//! confine a `Captures` to one thread of control by construction.

pub mod array_view;
pub mod captures;
pub mod int_list;
pub mod int_multimap;
