//! Fixed-size buffered channels between the conversion loop and its byte
//! source and sink.
//!
//! The input side pulls one byte at a time with transparent refills; the
//! output side pushes one byte at a time with transparent drains. Dry runs
//! pass `std::io::sink()` as the writer, which accepts and discards
//! everything, so checking and converting share a single loop.

use std::io::{self, Read, Write};

/// How many bytes travel per refill or drain.
pub const BUFFER_SIZE: usize = 16 * 1024;

/// Read-ahead buffer over a byte source.
pub struct InputChannel<R: Read> {
    reader: R,
    buf: Box<[u8]>,
    len: usize,
    pos: usize,
    eof: bool,
    failed: bool,
}

impl<R: Read> InputChannel<R> {
    /// Wraps a reader and performs the first refill, so the head of the
    /// stream is available for encoding detection before anything is pulled.
    pub fn new(reader: R) -> Self {
        let mut channel = Self {
            reader,
            buf: vec![0u8; BUFFER_SIZE].into_boxed_slice(),
            len: 0,
            pos: 0,
            eof: false,
            failed: false,
        };
        channel.refill();
        channel
    }

    /// The unconsumed bytes currently buffered. Callers use this right after
    /// construction to look at the stream head.
    pub fn head(&self) -> &[u8] {
        &self.buf[self.pos..self.len]
    }

    /// Fills the buffer from the source, stopping only at end of input or on
    /// an error. Short reads from pipes are absorbed here, so the head seen
    /// by encoding detection is as long as the stream allows.
    fn refill(&mut self) {
        self.pos = 0;
        self.len = 0;
        while self.len < self.buf.len() {
            match self.reader.read(&mut self.buf[self.len..]) {
                Ok(0) => {
                    self.eof = true;
                    break;
                }
                Ok(n) => self.len += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(_) => {
                    // A failed read ends the scan; the flag is reported
                    // separately from ordinary end of input.
                    self.failed = true;
                    self.eof = true;
                    break;
                }
            }
        }
    }

    /// Next byte of the stream, or `None` once input is exhausted.
    pub fn pull(&mut self) -> Option<u8> {
        if self.pos == self.len {
            if self.eof {
                return None;
            }
            self.refill();
            if self.len == 0 {
                return None;
            }
        }
        let byte = self.buf[self.pos];
        self.pos += 1;
        Some(byte)
    }

    /// The stream's error indicator: true when a read failed, as opposed to
    /// the stream simply ending.
    pub fn read_failed(&self) -> bool {
        self.failed
    }
}

/// Write-behind buffer over a byte sink.
pub struct OutputChannel<W: Write> {
    writer: W,
    buf: Vec<u8>,
    failed: bool,
}

impl<W: Write> OutputChannel<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buf: Vec::with_capacity(BUFFER_SIZE),
            failed: false,
        }
    }

    /// Appends one byte, draining to the sink when the buffer fills.
    pub fn push(&mut self, byte: u8) {
        self.buf.push(byte);
        if self.buf.len() == BUFFER_SIZE {
            self.drain();
        }
    }

    /// Writes all buffered bytes through to the sink. A failure latches into
    /// a flag rather than unwinding: whatever was flushable has been written,
    /// and the caller decides when to stop pushing.
    pub fn drain(&mut self) {
        if !self.failed && self.writer.write_all(&self.buf).is_err() {
            self.failed = true;
        }
        self.buf.clear();
    }

    /// True once any write has failed.
    pub fn write_failed(&self) -> bool {
        self.failed
    }

    /// Drains what remains and flushes the sink. Returns the final error
    /// state of the channel.
    pub fn finish(&mut self) -> bool {
        self.drain();
        if !self.failed && self.writer.flush().is_err() {
            self.failed = true;
        }
        self.failed
    }
}
