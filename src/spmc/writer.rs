//! The sole producer side of an SPMC bip-buffer.

use std::slice;
use std::sync::atomic::Ordering::SeqCst;

use crate::algo::{commit, reserve_decision};
use crate::spmc::header::SpmcHeader;

/// The exclusive writer for a `SpmcHeader`-prefixed region with one or more
/// readers.
///
/// Space can only be reclaimed once every reader has advanced past it, so the
/// writer reserves against the "effective read" position: the slowest
/// reader, once every cursor is linearized onto the same segment (see
/// `effective_read`). A reader that never advances starves the writer
/// permanently — the same tradeoff the single-reader case makes, just
/// generalized across N readers instead of one.
pub struct SpmcWriter<'a> {
    header: &'a SpmcHeader,
}

impl<'a> SpmcWriter<'a> {
    pub fn new(header: &'a SpmcHeader) -> Self {
        SpmcWriter { header }
    }

    /// The slowest reader's position, linearized against the current
    /// `write`/`last` pair so that a reader still finishing the old segment
    /// is never mistaken for one that's already ahead on the new segment.
    ///
    /// A plain `min()` over raw cursor values breaks across a wrap: once a
    /// fast reader rebases to 0 on the new segment, its small raw cursor can
    /// look "behind" a slow reader still sitting mid-old-segment even though
    /// the slow reader hasn't reached that position at all. Reading `write`
    /// first and classifying each cursor as old-segment (`r > write && r <=
    /// last`, contributes `r`) or new-segment (`r <= write`, contributes `r +
    /// last`) puts both segments on one monotonic scale before taking the
    /// minimum, then maps the winner back to an actual cursor value.
    fn effective_read(&self) -> u64 {
        let write = self.header.write.load(SeqCst);
        let last = self.header.last.load(SeqCst);

        let linearized_min = (0..self.header.reader_count())
            .map(|i| {
                let r = self.header.reader(i).load(SeqCst);
                if r > write && r <= last {
                    r
                } else {
                    r + last
                }
            })
            .min()
            .unwrap_or(0);

        // A stored cursor can never literally equal `last` while parked on
        // the old segment — `advance()` snaps it to 0 the instant it would
        // reach `last` — so a linearized value of exactly `last` can only
        // have come from a new-segment reader at position 0, never from an
        // old-segment one. Hence `<` rather than `<=` below.
        if linearized_min < last {
            linearized_min
        } else {
            linearized_min - last
        }
    }

    /// Tries to reserve a contiguous block of `length` bytes, decided against
    /// the slowest reader's cursor. Returns `None` ("No Space") if there
    /// isn't enough contiguous room right now.
    pub fn reserve(&mut self, length: usize) -> Option<SpmcReservation<'_, 'a>> {
        let write = self.header.write.load(SeqCst);
        let read = self.effective_read();
        let (start, wraparound) =
            reserve_decision(write, read, self.header.buffer_size, length as u64)?;
        Some(SpmcReservation {
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

/// A scoped in-flight write against an `SpmcWriter`. Commits on drop unless
/// canceled or truncated to zero first — same shape as the SPSC `Reservation`.
#[must_use = "a reservation must be committed (dropped) or canceled, otherwise no bytes are ever written"]
pub struct SpmcReservation<'w, 'a> {
    writer: &'w mut SpmcWriter<'a>,
    start: u64,
    length: usize,
    wraparound: bool,
}

impl<'w, 'a> SpmcReservation<'w, 'a> {
    pub fn data(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.writer.data().add(self.start as usize), self.length) }
    }

    pub fn size(&self) -> usize {
        self.length
    }

    pub fn truncate(&mut self, new_size: usize) -> bool {
        if new_size > self.length {
            return false;
        }
        self.length = new_size;
        true
    }

    pub fn cancel(&mut self) {
        self.length = 0;
    }
}

impl Drop for SpmcReservation<'_, '_> {
    fn drop(&mut self) {
        if self.length > 0 {
            self.writer.do_commit(self.start, self.length as u64, self.wraparound);
        }
    }
}
