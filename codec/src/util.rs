//! Cursor checks shared by handlers.

use crate::Error;
use bytes::{Buf, BufMut};

/// Checks that `buf` holds `len` bytes for a record that starts at the cursor.
///
/// An exhausted buffer is reported as [Error::EndOfInput] so that callers reading a sequence
/// of records can tell a clean end from a truncated record.
#[inline]
pub(crate) fn boundary(buf: &impl Buf, len: usize) -> Result<(), Error> {
    match buf.remaining() {
        0 if len > 0 => Err(Error::EndOfInput),
        remaining => at_least_remaining(remaining, len),
    }
}

/// Checks that `buf` holds at least `len` bytes.
#[inline]
pub(crate) fn at_least(buf: &impl Buf, len: usize) -> Result<(), Error> {
    at_least_remaining(buf.remaining(), len)
}

#[inline]
fn at_least_remaining(remaining: usize, len: usize) -> Result<(), Error> {
    if remaining < len {
        return Err(Error::Truncated(len, remaining));
    }
    Ok(())
}

/// Checks that `buf` can accept `len` more bytes.
#[inline]
pub(crate) fn capacity(buf: &impl BufMut, len: usize) -> Result<(), Error> {
    let available = buf.remaining_mut();
    if available < len {
        return Err(Error::BufferFull(len, available));
    }
    Ok(())
}
