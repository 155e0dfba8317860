//! Blocking convenience wrappers, layered outside the wait-free core.
//!
//! `Writer::reserve`/`Reader::read` never block — they return immediately
//! with "no space" or "nothing new". Waiting for the other side to make
//! progress is caller policy, so it lives here as a spin-then-yield-then-sleep
//! poll loop, the same shape as `Consumer::receive_timeout` in the MPMC
//! ring-buffer implementation this crate started from, generalized to any
//! "try, then ask again" operation instead of one tied to a ring buffer.
//!
//! The ABI's cursors are 64-bit, so the Linux futex fast path (which wakes
//! on a 32-bit word) doesn't apply directly here without widening the
//! header to carry a separate notify word — left out for now since nothing
//! in the addressed use cases requires sub-millisecond wakeup latency.

use std::time::{Duration, Instant};

use crossbeam_utils::Backoff;

/// Polls `try_op` until it returns `Some`, `timeout` elapses, or `deadline`
/// checking hits its budget — backing off via spin, then yield, then short
/// sleeps, so a tight wait doesn't peg a core at 100%.
pub fn poll_until<T>(timeout: Duration, mut try_op: impl FnMut() -> Option<T>) -> Option<T> {
    let deadline = Instant::now() + timeout;
    let backoff = Backoff::new();
    loop {
        if let Some(value) = try_op() {
            return Some(value);
        }
        if Instant::now() >= deadline {
            return None;
        }
        if backoff.is_completed() {
            std::thread::sleep(Duration::from_micros(200));
        } else {
            backoff.snooze();
        }
    }
}

/// Blocks until `reader.read()` returns a non-empty slice, or `timeout`
/// elapses. Takes the reader by `&mut Reader<'a>` directly (rather than
/// through a generic peek closure) so the returned slice's lifetime can tie
/// back to the buffer's own `'a`, not to this function's stack frame.
pub fn wait_for_data<'a>(reader: &mut crate::reader::Reader<'a>, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    let backoff = Backoff::new();
    loop {
        if !reader.read().is_empty() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        if backoff.is_completed() {
            std::thread::sleep(Duration::from_micros(200));
        } else {
            backoff.snooze();
        }
    }
}

/// Blocks until `try_reserve` succeeds or `timeout` elapses.
pub fn wait_for_space<T>(timeout: Duration, try_reserve: impl FnMut() -> Option<T>) -> Option<T> {
    poll_until(timeout, try_reserve)
}
