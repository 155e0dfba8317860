//! Single-producer, multi-consumer bip-buffer: one writer broadcasting to a
//! fixed number of independent readers, each with its own cursor.

pub mod header;
pub mod reader;
pub mod slots;
pub mod writer;

pub use header::SpmcHeader;
pub use reader::SpmcReader;
pub use slots::ReaderSlots;
pub use writer::{SpmcReservation, SpmcWriter};
