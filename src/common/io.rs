//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King

use crate::{ErrorKind, BareResult, bare_error};

pub trait Read {
    fn read(&mut self, buf: &mut [u8]) -> BareResult<usize>;

    fn read_exact(&mut self, mut buf: &mut [u8]) -> BareResult<()> {
        while !buf.is_empty() {
            let n = self.read(buf)?;
            if n == 0 {
                break;
            }
            buf = &mut buf[n..];
        }

        if !buf.is_empty() {
            Err(bare_error(ErrorKind::UnexpectedEof, "read_exact"))
        } else {
            Ok(())
        }
    }
}

pub trait Write {
    fn write(&mut self, buf: &[u8]) -> BareResult<usize>;
    fn flush(&mut self) -> BareResult<()>;

    fn write_all(&mut self, mut buf: &[u8]) -> BareResult<()> {
        while !buf.is_empty() {
            match self.write(buf) {
                Ok(0) => {
                    return Err(bare_error(ErrorKind::UnexpectedEof, "write_all"));
                }
                Ok(n) => buf = &buf[n..],
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }
}

extern crate alloc;
use alloc::vec::Vec;

impl Write for &mut Vec<u8> {
    fn write(&mut self, buf: &[u8]) -> BareResult<usize> {
        self.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> BareResult<()> {
        Ok(())
    }
}
