//! One consumer among many on an SPMC bip-buffer.

use std::slice;
use std::sync::atomic::Ordering::SeqCst;

use crate::spmc::header::SpmcHeader;

/// A single reader bound to one slot in the shared reader-cursor table.
///
/// Semantically identical to the SPSC `Reader` — peek then advance, rebase at
/// the high-water mark on wraparound — except every cursor read/write goes
/// through `header.reader(slot)` instead of a lone `read` field, and multiple
/// `SpmcReader`s over different slots may run concurrently against the same
/// `write`/`last` pair.
pub struct SpmcReader<'a> {
    header: &'a SpmcHeader,
    slot: usize,
    cached_read: u64,
    cached_write: u64,
    cached_last: u64,
}

impl<'a> SpmcReader<'a> {
    pub fn new(header: &'a SpmcHeader, slot: usize) -> Self {
        debug_assert!(slot < header.reader_count());
        SpmcReader {
            header,
            slot,
            cached_read: header.reader(slot).load(SeqCst),
            cached_write: header.write.load(SeqCst),
            cached_last: header.last.load(SeqCst),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn offset(&self) -> u64 {
        self.header.reader(self.slot).load(SeqCst)
    }

    /// Peeks at the next available bytes without advancing. See
    /// `crate::reader::Reader::read` for the rebase-at-high-water-mark logic
    /// this mirrors exactly, scoped to this reader's own cursor.
    pub fn read(&mut self) -> &'a [u8] {
        self.cached_write = self.header.write.load(SeqCst);

        if self.cached_write >= self.cached_read {
            let len = (self.cached_write - self.cached_read) as usize;
            return unsafe {
                slice::from_raw_parts(self.header.payload_ptr().add(self.cached_read as usize), len)
            };
        }

        self.cached_last = self.header.last.load(SeqCst);
        if self.cached_read == self.cached_last {
            self.cached_read = 0;
            return self.read();
        }

        let len = (self.cached_last - self.cached_read) as usize;
        unsafe { slice::from_raw_parts(self.header.payload_ptr().add(self.cached_read as usize), len) }
    }

    /// Advances this reader's own cursor by `count` bytes. Other readers'
    /// cursors, and the space the writer can reclaim, are unaffected until
    /// every reader has passed a given byte.
    pub fn advance(&mut self, count: u64) -> bool {
        if self.cached_write >= self.cached_read {
            if count <= self.cached_write - self.cached_read {
                self.cached_read += count;
            } else {
                return false;
            }
        } else {
            let remaining = self.cached_last - self.cached_read;
            if count == remaining {
                self.cached_read = 0;
            } else if count < remaining {
                self.cached_read += count;
            } else {
                return false;
            }
        }

        self.header.reader(self.slot).store(self.cached_read, SeqCst);
        true
    }
}
