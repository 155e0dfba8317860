//! C ABI surface for the SPSC channel.
//!
//! A live `Reservation` borrows `&mut Writer`, which can't be handed across
//! an `extern "C"` boundary and reclaimed later by a second call — the
//! caller on the other side has no way to run its destructor. So unlike the
//! in-process API, the FFI surface collapses reserve/write/commit and
//! peek/read/advance into one-shot `bip_spsc_write`/`bip_spsc_read` calls.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use crate::builder::{BipBufferBuilder, SpscChannel};

const BIP_SUCCESS: i32 = 0;
const BIP_ERROR_NULL_POINTER: i32 = -1;
const BIP_ERROR_INVALID_ARG: i32 = -2;
const BIP_ERROR_NO_SPACE: i32 = -3;
const BIP_ERROR_NO_DATA: i32 = -4;
const BIP_ERROR_INTERNAL: i32 = -5;

/// Opaque handle to an SPSC channel attached via shared memory.
pub struct BipSpscHandle {
    channel: SpscChannel,
}

/// Creates or attaches to a named SPSC channel.
///
/// # Safety
/// `name` must be a valid, NUL-terminated C string.
#[no_mangle]
pub unsafe extern "C" fn bip_spsc_open(name: *const c_char, buffer_size: usize) -> *mut BipSpscHandle {
    if name.is_null() {
        return ptr::null_mut();
    }
    let name = match CStr::from_ptr(name).to_str() {
        Ok(s) => s,
        Err(_) => return ptr::null_mut(),
    };

    match BipBufferBuilder::new()
        .with_name(name)
        .with_buffer_size(buffer_size)
        .build_spsc()
    {
        Ok(channel) => Box::into_raw(Box::new(BipSpscHandle { channel })),
        Err(e) => {
            eprintln!("bip_spsc_open failed: {e}");
            ptr::null_mut()
        }
    }
}

/// Writes `len` bytes from `data` as a single reservation. Returns
/// `BIP_ERROR_NO_SPACE` if the channel can't currently hold `len` contiguous
/// bytes; the caller should retry rather than treating this as fatal.
///
/// # Safety
/// `handle` must come from `bip_spsc_open` and not yet be freed. `data` must
/// point to at least `len` readable bytes.
#[no_mangle]
pub unsafe extern "C" fn bip_spsc_write(handle: *mut BipSpscHandle, data: *const u8, len: usize) -> i32 {
    if handle.is_null() || (data.is_null() && len > 0) {
        return BIP_ERROR_NULL_POINTER;
    }
    let handle = &*handle;
    let mut writer = handle.channel.writer();
    match writer.reserve(len) {
        Some(mut reservation) => {
            if len > 0 {
                let src = std::slice::from_raw_parts(data, len);
                reservation.data().copy_from_slice(src);
            }
            BIP_SUCCESS
        }
        None => BIP_ERROR_NO_SPACE,
    }
}

/// Copies up to `*out_len` available bytes into `out_buf` and advances the
/// reader past what was copied. On entry `*out_len` is the capacity of
/// `out_buf`; on return it holds the number of bytes actually copied.
/// Returns `BIP_ERROR_NO_DATA` if nothing is currently available.
///
/// # Safety
/// `handle` must come from `bip_spsc_open` and not yet be freed. `out_buf`
/// must point to at least `*out_len` writable bytes, and `out_len` itself
/// must be a valid pointer.
#[no_mangle]
pub unsafe extern "C" fn bip_spsc_read(handle: *mut BipSpscHandle, out_buf: *mut u8, out_len: *mut usize) -> i32 {
    if handle.is_null() || out_len.is_null() {
        return BIP_ERROR_NULL_POINTER;
    }
    let handle = &*handle;
    let mut reader = handle.channel.reader();
    let available = reader.read();
    if available.is_empty() {
        *out_len = 0;
        return BIP_ERROR_NO_DATA;
    }

    let capacity = *out_len;
    let to_copy = available.len().min(capacity);
    if to_copy > 0 {
        if out_buf.is_null() {
            return BIP_ERROR_INVALID_ARG;
        }
        ptr::copy_nonoverlapping(available.as_ptr(), out_buf, to_copy);
    }
    if !reader.advance(to_copy as u64) {
        return BIP_ERROR_INTERNAL;
    }
    *out_len = to_copy;
    BIP_SUCCESS
}

/// Frees a handle obtained from `bip_spsc_open`.
///
/// # Safety
/// `handle` must either be null or come from `bip_spsc_open` and not
/// already be freed.
#[no_mangle]
pub unsafe extern "C" fn bip_spsc_close(handle: *mut BipSpscHandle) {
    if !handle.is_null() {
        let _ = Box::from_raw(handle);
    }
}
