//! Reservation-decision and commit logic shared by the SPSC and SPMC writers.
//!
//! Both writer variants need the identical three-branch rule against an
//! "effective read" position (SPSC uses the single reader's cursor directly;
//! SPMC linearizes the slowest of several reader cursors first). Factoring it
//! here avoids the duplication the original C++ implementation carries across
//! `BipBufferWriter` and `BipBufferSPMCWriter`.

use std::sync::atomic::{AtomicU64, Ordering::SeqCst};

/// Decide where a reservation of `length` bytes should start, given the
/// current `write`/`read` cursors and the payload's `buffer_size`.
///
/// Returns `Some((start, wraparound))` on success, `None` if there isn't
/// enough contiguous space. Mirrors spec.md §4.2 exactly, including the
/// one-byte sentinel that keeps "full" distinguishable from "empty".
pub(crate) fn reserve_decision(
    write: u64,
    read: u64,
    buffer_size: u64,
    length: u64,
) -> Option<(u64, bool)> {
    if write >= read {
        // Tail space: [0....read....write------end)
        let end_space = buffer_size.saturating_sub(write);
        if end_space >= length {
            return Some((write, false));
        }
        // Head space: wrap to the front, leaving one sentinel byte before `read`.
        if read.saturating_sub(1) >= length {
            return Some((0, true));
        }
        None
    } else {
        // Wrapped state: [0....write------read....end)
        if (read - write).saturating_sub(1) >= length {
            Some((write, false))
        } else {
            None
        }
    }
}

/// Apply a commit to the `write`/`last` cursor pair. `length == 0` (a
/// canceled reservation) is a no-op and must be filtered out by the caller
/// before calling this — mirrors `BipBufferWriter::commit`.
pub(crate) fn commit(write: &AtomicU64, last: &AtomicU64, start: u64, length: u64, wraparound: bool) {
    debug_assert!(length > 0, "commit called with a zero-length reservation");

    let new_write = start + length;

    if wraparound {
        // Publish `last` before `write` crosses below `read`: a reader racing
        // on read() either sees the new `last` and stays on the old segment
        // until its end, or still sees `write >= read` and the old segment.
        let current_write = write.load(SeqCst);
        last.store(current_write, SeqCst);
    } else {
        let current_last = last.load(SeqCst);
        if new_write > current_last {
            last.store(new_write, SeqCst);
        }
    }

    write.store(new_write, SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_space_preferred_over_wraparound() {
        assert_eq!(reserve_decision(10, 0, 32, 5), Some((10, false)));
    }

    #[test]
    fn wraps_when_tail_space_short_but_head_space_free() {
        // write=30, read=2, buffer_size=32: tail has 2 bytes, head has read-1=1 byte.
        assert_eq!(reserve_decision(30, 2, 32, 1), Some((0, true)));
        assert_eq!(reserve_decision(30, 2, 32, 2), None);
    }

    #[test]
    fn rejects_when_fully_wrapped_and_no_gap() {
        // write=28, read=2: gap is read-write-1 = -27 -> saturates to 0.
        assert_eq!(reserve_decision(2, 28, 32, 1), None);
    }

    #[test]
    fn middle_space_in_wrapped_state() {
        // write=2, read=28, buffer_size=32: gap = 28-2-1 = 25.
        assert_eq!(reserve_decision(2, 28, 32, 25), Some((2, false)));
        assert_eq!(reserve_decision(2, 28, 32, 26), None);
    }

    #[test]
    fn zero_read_reserves_no_head_space() {
        // read == 0: saturating_sub(1) underflows to 0, so head space never fits.
        assert_eq!(reserve_decision(32, 0, 32, 1), None);
    }
}
