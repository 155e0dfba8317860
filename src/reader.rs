//! The sole consumer side of an SPSC bip-buffer.

use std::slice;
use std::sync::atomic::Ordering::SeqCst;

use crate::header::Header;

/// The exclusive reader for a `Header`-prefixed bip-buffer region.
///
/// Caches `read`/`write`/`last` snapshots so that one `peek` (`read()`) and
/// the `advance()` that follows it see a self-consistent view, without
/// re-loading every atomic on every call.
pub struct Reader<'a> {
    header: &'a Header,
    cached_read: u64,
    cached_write: u64,
    cached_last: u64,
}

impl<'a> Reader<'a> {
    pub fn new(header: &'a Header) -> Self {
        Reader {
            header,
            cached_read: header.read.load(SeqCst),
            cached_write: header.write.load(SeqCst),
            cached_last: header.last.load(SeqCst),
        }
    }

    /// The reader's current published read offset.
    pub fn offset(&self) -> u64 {
        self.header.read.load(SeqCst)
    }

    /// Peeks at the next available bytes without advancing the read
    /// position. Returns an empty slice if no new data is available. The
    /// returned slice is always a single contiguous run — a wraparound
    /// boundary is never straddled within one peek.
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
            // Consumed to the high-water mark: rejoin the fresh segment at 0.
            self.cached_read = 0;
            return self.read();
        }

        let len = (self.cached_last - self.cached_read) as usize;
        unsafe { slice::from_raw_parts(self.header.payload_ptr().add(self.cached_read as usize), len) }
    }

    /// Advances the read position by `count` bytes, publishing the new
    /// cursor. Returns `false` ("Invalid Advance") if `count` exceeds the
    /// slice most recently returned by `read()`, leaving the cursor
    /// unchanged.
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

        self.header.read.store(self.cached_read, SeqCst);
        true
    }
}
