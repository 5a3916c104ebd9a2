//! Scoped output capture.
//!
//! Every render writes into an [`OutputCapture`]. The guard counts itself
//! in the current thread's capture depth while alive, so nesting is strict
//! and the count returns to its previous value on every exit path,
//! unwinding included.
//!
//! The depth is per thread: a request renders start to finish on one
//! worker, so [`depth`] before and after a render describes that request
//! alone, whatever other workers are doing.

use std::cell::Cell;
use std::io::{self, Write};

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Number of capture regions open on the current thread.
pub fn depth() -> usize {
    DEPTH.with(Cell::get)
}

/// An open capture region. Dropping it without [`finish`](Self::finish)
/// discards whatever was written.
#[derive(Debug)]
pub struct OutputCapture {
    buffer: Vec<u8>,
}

impl OutputCapture {
    pub fn open() -> Self {
        DEPTH.with(|d| d.set(d.get() + 1));
        Self { buffer: Vec::new() }
    }

    /// Close the region and return the captured text.
    pub fn finish(mut self) -> String {
        let bytes = std::mem::take(&mut self.buffer);
        match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
        }
    }
}

impl Write for OutputCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for OutputCapture {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}
