//! `Debug` impls kept in one place, away from the hot-path modules.
//!
//! Each one reports cursor positions by loading the underlying atomics with
//! `Relaxed` ordering — fine for a snapshot meant for a human, not for
//! synchronizing anything.

use std::fmt;
use std::sync::atomic::Ordering::Relaxed;

use crate::header::Header;
use crate::reader::Reader;
use crate::spmc::header::SpmcHeader;
use crate::spmc::reader::SpmcReader;
use crate::spmc::writer::SpmcWriter;
use crate::writer::Writer;

impl fmt::Debug for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Header")
            .field("read", &self.read.load(Relaxed))
            .field("write", &self.write.load(Relaxed))
            .field("last", &self.last.load(Relaxed))
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl fmt::Debug for Writer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer").field("header", &"<shared>").finish_non_exhaustive()
    }
}

impl fmt::Debug for Reader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader").field("offset", &self.offset()).finish_non_exhaustive()
    }
}

impl fmt::Debug for SpmcHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readers: Vec<u64> = (0..self.reader_count()).map(|i| self.reader(i).load(Relaxed)).collect();
        f.debug_struct("SpmcHeader")
            .field("write", &self.write.load(Relaxed))
            .field("last", &self.last.load(Relaxed))
            .field("readers", &readers)
            .field("buffer_size", &self.buffer_size)
            .finish()
    }
}

impl fmt::Debug for SpmcWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpmcWriter").field("header", &"<shared>").finish_non_exhaustive()
    }
}

impl fmt::Debug for SpmcReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpmcReader")
            .field("slot", &self.slot())
            .field("offset", &self.offset())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_debug_shows_cursor_snapshot() {
        let mut mem = vec![0u8; Header::SIZE + 16];
        let header = Header::create(&mut mem).unwrap();
        let text = format!("{header:?}");
        assert!(text.contains("Header"));
        assert!(text.contains("buffer_size"));
    }

    #[test]
    fn spmc_header_debug_lists_every_reader_cursor() {
        let mut mem = vec![0u8; SpmcHeader::SIZE + 2 * 8 + 16];
        let header = SpmcHeader::create(&mut mem, 2).unwrap();
        let text = format!("{header:?}");
        assert!(text.contains("readers"));
    }
}
