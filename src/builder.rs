//! Attach-or-create entry points tying `shm`, `header`, and the SPSC/SPMC
//! core types together into ready-to-use channels.

use std::io;

use tracing::info;

use crate::header::Header;
use crate::reader::Reader;
use crate::shm::PosixSharedMemory;
use crate::spmc::header::SpmcHeader;
use crate::spmc::reader::SpmcReader;
use crate::spmc::slots::ReaderSlots;
use crate::spmc::writer::SpmcWriter;
use crate::writer::Writer;

const DEFAULT_BUFFER_SIZE: usize = 1024 * 1024;

/// Builds an SPSC or SPMC channel backed by a named shared-memory region.
pub struct BipBufferBuilder {
    name: Option<String>,
    buffer_size: usize,
    reader_count: usize,
}

impl Default for BipBufferBuilder {
    fn default() -> Self {
        Self {
            name: None,
            buffer_size: DEFAULT_BUFFER_SIZE,
            reader_count: 1,
        }
    }
}

impl BipBufferBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size;
        self
    }

    pub fn with_reader_count(mut self, reader_count: usize) -> Self {
        self.reader_count = reader_count;
        self
    }

    fn region_name(&self) -> io::Result<&str> {
        self.name.as_deref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "BipBufferBuilder requires a name")
        })
    }

    /// Creates or attaches to a single-producer, single-consumer channel.
    pub fn build_spsc(self) -> io::Result<SpscChannel> {
        let name = self.region_name()?.to_string();
        let region_size = Header::SIZE + self.buffer_size;
        let (shm, created) = PosixSharedMemory::create_or_attach(&name, region_size)?;
        info!(name = %name, region_size, created, "attached SPSC channel");
        SpscChannel::new(shm, created)
    }

    /// Creates or attaches to a single-producer, multi-consumer channel with
    /// `reader_count` independent reader slots.
    pub fn build_spmc(self) -> io::Result<SpmcChannel> {
        let name = self.region_name()?.to_string();
        let reader_count = self.reader_count;
        let region_size = SpmcHeader::SIZE + reader_count * 8 + self.buffer_size;
        let (shm, created) = PosixSharedMemory::create_or_attach(&name, region_size)?;
        info!(name = %name, region_size, created, reader_count, "attached SPMC channel");
        SpmcChannel::new(shm, created, reader_count)
    }
}

/// An owned SPSC channel: the shared-memory mapping plus a stable pointer to
/// the header inside it. The mapping's address never moves once `mmap`
/// returns, so re-borrowing a `Writer`/`Reader` from `&self` on every call is
/// sound without needing a self-referential struct.
pub struct SpscChannel {
    shm: PosixSharedMemory,
    header: *const Header,
}

unsafe impl Send for SpscChannel {}
unsafe impl Sync for SpscChannel {}

impl SpscChannel {
    fn new(mut shm: PosixSharedMemory, created: bool) -> io::Result<Self> {
        let header = if created {
            Header::create(shm.as_mut_slice())
        } else {
            Header::view(shm.as_mut_slice())
        }
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "region too small for a header"))?
            as *const Header;
        Ok(Self { shm, header })
    }

    fn header(&self) -> &Header {
        unsafe { &*self.header }
    }

    pub fn writer(&self) -> Writer<'_> {
        Writer::new(self.header())
    }

    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self.header())
    }

    pub fn buffer_size(&self) -> u64 {
        self.header().buffer_size()
    }
}

/// An owned SPMC channel, analogous to `SpscChannel` but also tracking which
/// reader slots this process has claimed.
pub struct SpmcChannel {
    shm: PosixSharedMemory,
    header: *const SpmcHeader,
    slots: ReaderSlots,
}

unsafe impl Send for SpmcChannel {}
unsafe impl Sync for SpmcChannel {}

impl SpmcChannel {
    fn new(mut shm: PosixSharedMemory, created: bool, reader_count: usize) -> io::Result<Self> {
        let header = if created {
            SpmcHeader::create(shm.as_mut_slice(), reader_count)
        } else {
            SpmcHeader::view(shm.as_mut_slice(), reader_count)
        }
        .ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "region too small for an SPMC header")
        })? as *const SpmcHeader;
        Ok(Self {
            shm,
            header,
            slots: ReaderSlots::new(reader_count),
        })
    }

    fn header(&self) -> &SpmcHeader {
        unsafe { &*self.header }
    }

    pub fn writer(&self) -> SpmcWriter<'_> {
        SpmcWriter::new(self.header())
    }

    /// Claims the next free reader slot and returns a reader bound to it.
    /// Returns `None` once every slot this process knows about is taken.
    pub fn claim_reader(&self) -> Option<SpmcReader<'_>> {
        let slot = self.slots.claim()?;
        Some(SpmcReader::new(self.header(), slot))
    }

    pub fn release_reader(&self, reader: SpmcReader<'_>) {
        self.slots.release(reader.slot());
    }

    pub fn buffer_size(&self) -> u64 {
        self.header().buffer_size()
    }

    pub fn reader_count(&self) -> usize {
        self.header().reader_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn unique_name(tag: &str) -> String {
        format!("bipbufferbuildertest{tag}{}", std::process::id())
    }

    #[test]
    #[serial]
    fn spsc_builder_roundtrips_through_shared_memory() {
        let name = unique_name("spsc");
        let _ = PosixSharedMemory::destroy(&name);

        let channel = BipBufferBuilder::new()
            .with_name(&name)
            .with_buffer_size(64)
            .build_spsc()
            .unwrap();

        {
            let mut writer = channel.writer();
            let mut r = writer.reserve(5).unwrap();
            r.data().copy_from_slice(b"hello");
        }

        let mut reader = channel.reader();
        assert_eq!(reader.read(), b"hello");

        drop(channel);
        PosixSharedMemory::destroy(&name).unwrap();
    }

    #[test]
    #[serial]
    fn spmc_builder_supports_multiple_reader_slots() {
        let name = unique_name("spmc");
        let _ = PosixSharedMemory::destroy(&name);

        let channel = BipBufferBuilder::new()
            .with_name(&name)
            .with_buffer_size(64)
            .with_reader_count(2)
            .build_spmc()
            .unwrap();

        {
            let mut writer = channel.writer();
            let mut r = writer.reserve(3).unwrap();
            r.data().copy_from_slice(b"abc");
        }

        let mut r0 = channel.claim_reader().unwrap();
        let mut r1 = channel.claim_reader().unwrap();
        assert!(channel.claim_reader().is_none());
        assert_eq!(r0.read(), b"abc");
        assert_eq!(r1.read(), b"abc");

        drop(channel);
        PosixSharedMemory::destroy(&name).unwrap();
    }

    #[test]
    fn build_without_name_fails() {
        let result = BipBufferBuilder::new().build_spsc();
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidInput);
    }
}
