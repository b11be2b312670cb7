//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King

use core::cmp;

extern crate alloc;
use alloc::string::String;

use crate::{ErrorKind, BareResult, Read, bare_error};

const BUF_SIZE: usize = 8 * 1024;

pub struct BareBufReader<R: Read> {
    inner: R,
    buf: [u8; BUF_SIZE],
    pos: usize, // index of next unread byte in `buf`
    cap: usize, // number of bytes currently in `buf`
}

impl<R: Read> Read for BareBufReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> BareResult<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read> BareBufReader<R> {
    #[inline]
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: [0; BUF_SIZE],
            pos: 0,
            cap: 0,
        }
    }

    /// Unwraps the reader, discarding any unread bytes still sitting in
    /// its internal buffer. Only safe when the caller knows the buffer is
    /// empty (nothing since the last `fill_buf` went unconsumed) — use
    /// `get_mut` instead when more reading may follow through this same
    /// reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Borrows the underlying transport for operations that bypass
    /// buffering entirely (writes, in particular — this reader only ever
    /// buffers reads).
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    #[inline(always)]
    fn buffer_consumed(&self) -> bool {
        self.pos >= self.cap
    }

    #[inline]
    fn fill_buf(&mut self) -> BareResult<()> {
        self.pos = 0;
        let n = self.inner.read(&mut self.buf)?;
        self.cap = n;
        Ok(())
    }

    /// Reads all bytes up to and including a newline (0x0A) and appends
    /// them to `buf`. Returns the number of bytes appended; `Ok(0)` at EOF.
    pub fn read_line(&mut self, buf: &mut String) -> BareResult<usize> {
        let mut total = 0;

        loop {
            if self.buffer_consumed() {
                self.fill_buf()?;
                if self.cap == 0 {
                    return Ok(total);
                }
            }

            let available = &self.buf[self.pos..self.cap];
            let mut newline_rel = None;
            for (i, &b) in available.iter().enumerate() {
                if b == b'\n' {
                    newline_rel = Some(i);
                    break;
                }
            }

            let end = match newline_rel {
                Some(i) => self.pos + i + 1,
                None => self.cap,
            };

            let chunk = &self.buf[self.pos..end];
            let s = core::str::from_utf8(chunk)
                .map_err(|_| bare_error(ErrorKind::FormatError, "utf8 decode"))?;
            buf.push_str(s);

            total += chunk.len();
            self.pos = end;

            if newline_rel.is_some() {
                return Ok(total);
            }
        }
    }

    /// Reads exactly `buf.len()` bytes, failing with `UnexpectedEof` otherwise.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> BareResult<()> {
        let mut offset = 0;
        let len = buf.len();

        while offset < len {
            if !self.buffer_consumed() {
                let n = cmp::min(len - offset, self.cap - self.pos);
                buf[offset..offset + n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
                self.pos += n;
                offset += n;
                continue;
            }

            if len - offset >= BUF_SIZE {
                let n = self.inner.read(&mut buf[offset..])?;
                if n == 0 {
                    return Err(bare_error(ErrorKind::UnexpectedEof, "read_exact"));
                }
                offset += n;
            } else {
                self.fill_buf()?;
                if self.cap == 0 {
                    return Err(bare_error(ErrorKind::UnexpectedEof, "read_exact"));
                }
            }
        }

        Ok(())
    }
}
