//! Process-local reader-slot assignment for the SPMC variant.
//!
//! Which shared reader-cursor index a given `SpmcReader` claims is caller
//! policy, not part of the wire protocol: the ABI header has no room for a
//! claim bitmap, and a reader attaching from a different process has no way
//! to observe another process's in-memory allocator anyway. Slot assignment
//! is therefore local to whichever process created this `ReaderSlots`; ask
//! each process's readers to claim low-to-high and the policy collapses to
//! "index == attach order" in the common single-process case.

use std::sync::atomic::{AtomicU64, Ordering::SeqCst};

use crossbeam_utils::Backoff;

/// A claim bitmap over up to 64 reader-cursor slots.
pub struct ReaderSlots {
    claimed: AtomicU64,
    capacity: usize,
}

impl ReaderSlots {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity <= 64, "ReaderSlots supports at most 64 reader slots");
        ReaderSlots {
            claimed: AtomicU64::new(0),
            capacity,
        }
    }

    /// Claims the lowest-numbered free slot. Returns `None` if every slot
    /// already belongs to some other `SpmcReader` in this process.
    pub fn claim(&self) -> Option<usize> {
        let backoff = Backoff::new();
        loop {
            let current = self.claimed.load(SeqCst);
            let free = !current & mask(self.capacity);
            if free == 0 {
                return None;
            }
            let index = free.trailing_zeros() as usize;
            let attempt = current | (1 << index);
            if self
                .claimed
                .compare_exchange(current, attempt, SeqCst, SeqCst)
                .is_ok()
            {
                return Some(index);
            }
            backoff.spin();
        }
    }

    /// Releases a previously claimed slot so a future reader can reuse it.
    pub fn release(&self, index: usize) {
        debug_assert!(index < self.capacity);
        self.claimed.fetch_and(!(1 << index), SeqCst);
    }
}

fn mask(capacity: usize) -> u64 {
    if capacity >= 64 {
        u64::MAX
    } else {
        (1u64 << capacity) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_are_unique_and_low_first() {
        let slots = ReaderSlots::new(4);
        assert_eq!(slots.claim(), Some(0));
        assert_eq!(slots.claim(), Some(1));
        assert_eq!(slots.claim(), Some(2));
        assert_eq!(slots.claim(), Some(3));
        assert_eq!(slots.claim(), None);
    }

    #[test]
    fn released_slot_is_reclaimable() {
        let slots = ReaderSlots::new(2);
        let a = slots.claim().unwrap();
        let _b = slots.claim().unwrap();
        slots.release(a);
        assert_eq!(slots.claim(), Some(a));
    }
}
