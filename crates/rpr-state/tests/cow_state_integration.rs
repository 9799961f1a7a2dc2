#![forbid(unsafe_code)]

//! End-to-end exercises of the capture state under matcher-shaped usage:
//! fork-heavy exploration, backtracking releases, and reuse of the same
//! state across matching attempts.

use rpr_state::captures::Captures;

/// A miniature backtracking pass: thread 0 advances through three rows,
/// forks alternatives at each split point, loses two of them, and the
/// surviving thread's view must reflect exactly its own path.
#[test]
fn fork_heavy_match_attempt() {
    let mut state = Captures::new(4, 8, 8);

    // Row 0: thread 0 matches label A(=0).
    state.save_label(0, 0);

    // Row 1: SPLIT. Thread 1 continues with label B(=1), thread 0 stays
    // on A. Both carry the row-0 prefix.
    state.fork(0, 1);
    state.save_label(0, 0);
    state.save_label(1, 1);

    // Row 2: SPLIT again off thread 1. Thread 2 tries C(=2) and opens an
    // exclusion at offset 2.
    state.fork(1, 2);
    state.save_label(1, 1);
    state.save_label(2, 2);
    state.save_capture(2, 2);

    assert_eq!(state.labels(0).as_slice(), &[0, 0]);
    assert_eq!(state.labels(1).as_slice(), &[0, 1, 1]);
    assert_eq!(state.labels(2).as_slice(), &[0, 1, 2]);
    assert_eq!(state.captures(2).as_slice(), &[2]);
    assert!(state.captures(0).is_empty());
    assert!(state.captures(1).is_empty());

    // Threads 0 and 1 fail; the automaton releases them.
    state.release(0);
    state.release(1);

    // The survivor is untouched by its siblings' deaths.
    assert_eq!(state.labels(2).as_slice(), &[0, 1, 2]);
    assert_eq!(state.captures(2).as_slice(), &[2]);
}

/// The winning thread's state is read out, every thread is released, and a
/// fresh attempt on the same ids behaves like a fresh structure.
#[test]
fn thread_ids_are_reusable_across_attempts() {
    let mut state = Captures::new(2, 2, 2);

    state.save_label(0, 7);
    state.fork(0, 1);
    state.save_label(1, 8);
    state.release(0);
    state.release(1);

    assert!(state.labels(0).is_empty());
    assert!(state.labels(1).is_empty());

    // Same ids, next attempt.
    state.save_label(0, 9);
    state.fork(0, 1);
    assert_eq!(state.labels(0).as_slice(), &[9]);
    assert_eq!(state.labels(1).as_slice(), &[9]);
}

/// A fork of a fork carries the whole ancestor prefix, and mutating any
/// generation never disturbs the others, boundaries and labels together.
#[test]
fn fork_chain_stays_atomic_per_thread() {
    let mut state = Captures::new(8, 4, 4);

    state.save_capture(0, 0);
    state.save_label(0, 5);

    state.fork(0, 1);
    state.save_capture(1, 1);

    state.fork(1, 2);
    state.save_label(2, 6);

    assert_eq!(state.captures(0).as_slice(), &[0]);
    assert_eq!(state.labels(0).as_slice(), &[5]);
    assert_eq!(state.captures(1).as_slice(), &[0, 1]);
    assert_eq!(state.labels(1).as_slice(), &[5]);
    assert_eq!(state.captures(2).as_slice(), &[0, 1]);
    assert_eq!(state.labels(2).as_slice(), &[5, 6]);

    // Refork over thread 2: it must adopt thread 0's state wholesale.
    state.fork(0, 2);
    assert_eq!(state.captures(2).as_slice(), &[0]);
    assert_eq!(state.labels(2).as_slice(), &[5]);
}

/// Releasing every live thread returns the memory estimate to its
/// baseline, whatever the fork topology was: the cancellation path needs
/// nothing more than releases.
#[test]
fn releasing_all_threads_restores_baseline_estimate() {
    let mut state = Captures::new(8, 8, 8);
    let baseline = state.size_in_bytes();

    for row in 0..20 {
        state.save_label(0, row);
        state.save_capture(0, row);
    }
    for child in 1..8 {
        state.fork(child - 1, child);
        state.save_label(child, child as i32);
    }
    assert!(state.size_in_bytes() > baseline);

    for thread in 0..8 {
        state.release(thread);
    }
    assert_eq!(state.size_in_bytes(), baseline);
}
