//! The sole producer side of an SPSC bip-buffer.

use std::slice;
use std::sync::atomic::Ordering::SeqCst;

use crate::algo::{commit, reserve_decision};
use crate::header::Header;

/// The exclusive writer for a `Header`-prefixed bip-buffer region.
///
/// Only one `Writer` should exist per region (a documented precondition, not
/// enforced — the same as the original C++). What *is* enforced is that only
/// one `Reservation` can be alive at a time: `reserve` borrows `self`
/// mutably, so the borrow checker rejects a second call before the first
/// reservation is dropped.
pub struct Writer<'a> {
    header: &'a Header,
}

impl<'a> Writer<'a> {
    pub fn new(header: &'a Header) -> Self {
        Writer { header }
    }

    /// Tries to reserve a contiguous block of `length` bytes. Returns `None`
    /// ("No Space") if there isn't enough contiguous room right now — a
    /// normal, recoverable outcome, not an error.
    pub fn reserve(&mut self, length: usize) -> Option<Reservation<'_, 'a>> {
        let write = self.header.write.load(SeqCst);
        let read = self.header.read.load(SeqCst);
        let (start, wraparound) =
            reserve_decision(write, read, self.header.buffer_size, length as u64)?;
        Some(Reservation {
            writer: self,
            start,
            length,
            wraparound,
        })
    }

    fn data(&self) -> *mut u8 {
        self.header.payload_ptr()
    }

    fn do_commit(&self, start: u64, length: u64, wraparound: bool) {
        commit(&self.header.write, &self.header.last, start, length, wraparound);
    }
}

/// A scoped capability representing one in-flight write. Commits on drop
/// unless canceled or truncated to zero first.
///
/// Non-copyable by construction (it holds `&mut Writer`); moving it is fine
/// in Rust (unlike the C++ original, which forbids moves to keep its
/// commit-on-destroy logic simple) since the commit state travels with the
/// value.
#[must_use = "a reservation must be committed (dropped) or canceled, otherwise no bytes are ever written"]
pub struct Reservation<'w, 'a> {
    writer: &'w mut Writer<'a>,
    start: u64,
    length: usize,
    wraparound: bool,
}

impl<'w, 'a> Reservation<'w, 'a> {
    /// The reserved byte slice, ready to be filled by the caller.
    pub fn data(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.writer.data().add(self.start as usize), self.length) }
    }

    /// Current reservation length.
    pub fn size(&self) -> usize {
        self.length
    }

    /// Shrinks the reservation to `new_size` bytes. Returns `false` ("Invalid
    /// Truncate") if `new_size` exceeds the current size, leaving the
    /// reservation unchanged.
    pub fn truncate(&mut self, new_size: usize) -> bool {
        if new_size > self.length {
            return false;
        }
        self.length = new_size;
        true
    }

    /// Cancels the reservation: on drop, no cursors move and no bytes become
    /// visible to any reader.
    pub fn cancel(&mut self) {
        self.length = 0;
    }
}

impl Drop for Reservation<'_, '_> {
    fn drop(&mut self) {
        if self.length > 0 {
            self.writer.do_commit(self.start, self.length as u64, self.wraparound);
        }
    }
}
