//! Writer wrapper that strips stray terminal bells.
//!
//! Line-editing redraws ring the terminal bell on every cursor move
//! (the bell arrives as a lone BEL byte, written on its own). Wrapping
//! stdout in [`BellFilter`] silences those without touching any other
//! output.

use std::io::{self, Write};

const BELL: u8 = 0x07;

/// Forwards every write to the inner writer except single-byte bells.
///
/// A bell only ever arrives as a write of exactly one byte; that
/// framing is what distinguishes it from a BEL that happens to sit
/// inside a larger buffer, which is forwarded untouched.
pub struct BellFilter<W: Write> {
    inner: W,
}

impl<W: Write> BellFilter<W> {
    pub fn new(inner: W) -> Self {
        BellFilter { inner }
    }
}

impl<W: Write> Write for BellFilter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf.len() == 1 && buf[0] == BELL {
            // Report the byte as written so callers don't retry it.
            return Ok(1);
        }
        self.inner.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}
