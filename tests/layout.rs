// ABI conformance tests: field offsets and sizes for the wire layout any
// other-language peer needs to reproduce byte-for-byte.

use bipbuffer::header::Header;
use bipbuffer::spmc::header::SpmcHeader;
use memoffset::offset_of;
use std::mem::{align_of, size_of};

#[test]
fn spsc_header_layout_matches_the_wire_format() {
    assert_eq!(offset_of!(Header, read), 0);
    assert_eq!(offset_of!(Header, write), 8);
    assert_eq!(offset_of!(Header, last), 16);
    assert_eq!(offset_of!(Header, buffer_size), 24);
    assert_eq!(size_of::<Header>(), 32);
    assert_eq!(align_of::<Header>(), align_of::<u64>());
}

#[test]
fn spmc_header_fixed_fields_match_the_wire_format() {
    assert_eq!(offset_of!(SpmcHeader, write), 0);
    assert_eq!(offset_of!(SpmcHeader, last), 8);
    assert_eq!(offset_of!(SpmcHeader, reader_count), 16);
    assert_eq!(offset_of!(SpmcHeader, buffer_size), 24);
    assert_eq!(size_of::<SpmcHeader>(), 32);
}

#[test]
fn spmc_reader_table_is_contiguous_and_immediately_follows_the_header() {
    for reader_count in [1usize, 2, 4] {
        let overhead = SpmcHeader::SIZE + reader_count * 8;
        let mut mem = vec![0u8; overhead + 64];
        let base = mem.as_ptr();
        let header = SpmcHeader::create(&mut mem, reader_count).unwrap();

        for i in 0..reader_count {
            let expected = unsafe { base.add(SpmcHeader::SIZE + i * 8) };
            assert_eq!(header.reader(i) as *const _ as *const u8, expected);
        }

        let expected_payload = unsafe { base.add(overhead) };
        assert_eq!(header.payload_ptr(), expected_payload as *mut u8);
    }
}

#[test]
fn spsc_payload_immediately_follows_the_fixed_header() {
    let mut mem = vec![0u8; Header::SIZE + 32];
    let base = mem.as_ptr();
    let header = Header::create(&mut mem).unwrap();
    assert_eq!(header.payload_ptr(), unsafe { base.add(Header::SIZE) } as *mut u8);
}
