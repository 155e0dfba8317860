//! The SPMC control block: `write`/`last` plus a table of per-reader cursors.

use std::mem::size_of;
use std::sync::atomic::{AtomicU64, Ordering::SeqCst};

/// Control block for the single-producer, multi-consumer variant.
///
/// Wire layout (little-endian, packed — see spec §6): `write` @0, `last` @8,
/// `reader_count` @16, `buffer_size` @24, `reader_count * 8` bytes of reader
/// cursors, then the payload.
///
/// The source this protocol was distilled from computes the reader-cursor
/// address as `(this + 1) * sizeof(Header)`, which conflates pointer
/// arithmetic with byte-offset arithmetic. The correct address is
/// `base_address + size_of::<SpmcHeader>()`, which is what `reader()` below
/// computes.
#[repr(C)]
pub struct SpmcHeader {
    pub write: AtomicU64,
    pub last: AtomicU64,
    pub reader_count: u64,
    pub buffer_size: u64,
}

impl SpmcHeader {
    pub const SIZE: usize = size_of::<SpmcHeader>();

    fn reserved_bytes(reader_count: usize) -> usize {
        reader_count * size_of::<AtomicU64>()
    }

    /// Places a header at the start of `mem` for `reader_count` readers,
    /// zero-initializing `write`/`last` and every reader cursor.
    ///
    /// Returns `None` if `mem` can't hold the fixed header, the reader-cursor
    /// table, and at least one payload byte.
    pub fn create(mem: &mut [u8], reader_count: usize) -> Option<&SpmcHeader> {
        let overhead = Self::SIZE + Self::reserved_bytes(reader_count);
        if mem.len() <= overhead {
            return None;
        }
        let buffer_size = (mem.len() - overhead) as u64;
        let base = mem.as_mut_ptr();
        unsafe {
            base.cast::<SpmcHeader>().write(SpmcHeader {
                write: AtomicU64::new(0),
                last: AtomicU64::new(0),
                reader_count: reader_count as u64,
                buffer_size,
            });
            let readers = base.add(Self::SIZE).cast::<AtomicU64>();
            for i in 0..reader_count {
                readers.add(i).write(AtomicU64::new(0));
            }
            Some(&*base.cast::<SpmcHeader>())
        }
    }

    /// Views an already-initialized SPMC header without re-zeroing it.
    pub fn view(mem: &[u8], reader_count: usize) -> Option<&SpmcHeader> {
        let overhead = Self::SIZE + Self::reserved_bytes(reader_count);
        if mem.len() <= overhead {
            return None;
        }
        Some(unsafe { &*mem.as_ptr().cast::<SpmcHeader>() })
    }

    pub fn reader_count(&self) -> usize {
        self.reader_count as usize
    }

    pub fn buffer_size(&self) -> u64 {
        self.buffer_size
    }

    /// The `index`-th reader cursor. Undefined behavior if
    /// `index >= reader_count()` — a documented precondition, checked in
    /// debug builds only, matching the original's unchecked accessor.
    pub fn reader(&self, index: usize) -> &AtomicU64 {
        debug_assert!(index < self.reader_count());
        unsafe {
            let base = (self as *const SpmcHeader as *const u8).add(Self::SIZE);
            &*(base as *const AtomicU64).add(index)
        }
    }

    pub fn payload_ptr(&self) -> *mut u8 {
        unsafe {
            (self as *const SpmcHeader as *mut u8)
                .add(Self::SIZE)
                .add(Self::reserved_bytes(self.reader_count()))
        }
    }

    pub fn write(&self) -> u64 {
        self.write.load(SeqCst)
    }

    pub fn last(&self) -> u64 {
        self.last.load(SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_rejects_undersized_region() {
        let overhead = SpmcHeader::SIZE + 4 * 8;
        let mut mem = vec![0u8; overhead];
        assert!(SpmcHeader::create(&mut mem, 4).is_none());
    }

    #[test]
    fn readers_start_at_zero_and_are_independently_addressable() {
        for reader_count in [1usize, 2, 4] {
            let overhead = SpmcHeader::SIZE + reader_count * 8;
            let mut mem = vec![0xFFu8; overhead + 64];
            let header = SpmcHeader::create(&mut mem, reader_count).unwrap();
            assert_eq!(header.reader_count(), reader_count);
            assert_eq!(header.buffer_size(), 64);
            for i in 0..reader_count {
                assert_eq!(header.reader(i).load(SeqCst), 0);
            }
            // Writing through one slot must not disturb its neighbors.
            if reader_count > 1 {
                header.reader(0).store(7, SeqCst);
                assert_eq!(header.reader(1).load(SeqCst), 0);
            }
        }
    }

    #[test]
    fn payload_follows_fixed_header_and_reader_table() {
        let reader_count = 3;
        let mut mem = vec![0u8; SpmcHeader::SIZE + reader_count * 8 + 10];
        let base = mem.as_ptr();
        let header = SpmcHeader::create(&mut mem, reader_count).unwrap();
        let expected = unsafe { base.add(SpmcHeader::SIZE + reader_count * 8) };
        assert_eq!(header.payload_ptr(), expected as *mut u8);
    }
}
