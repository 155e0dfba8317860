//! A lock-free bipartite circular buffer (bip-buffer) for streaming bytes
//! over shared memory, with both single-reader (SPSC) and broadcast
//! multi-reader (SPMC) variants.
//!
//! The core types (`Header`, `Writer`, `Reader`, `Reservation` and their
//! `spmc` counterparts) never allocate and never block: `reserve`/`read`
//! return `None`/an empty slice immediately when there isn't room or
//! nothing new, and every cursor update is a single seq-cst atomic
//! operation. Everything that *can* allocate or block — shared-memory
//! attachment, named-channel setup, polling loops, the C ABI — lives
//! outside that core in its own module.

pub mod algo;
pub mod blocking;
pub mod builder;
pub mod ffi;
pub mod fmt;
pub mod header;
pub mod reader;
pub mod shm;
pub mod spmc;
pub mod writer;

pub use builder::{BipBufferBuilder, SpmcChannel, SpscChannel};
pub use header::Header;
pub use reader::Reader;
pub use shm::{Access, PosixSharedMemory, RawHandle, SharedMemoryBackend};
pub use writer::{Reservation, Writer};
