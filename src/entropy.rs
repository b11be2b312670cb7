//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! The random-byte source. Called by ECDH key generation and WebSocket
//! mask-key generation. Stateless, no seeding API.

use core::ffi::c_void;

use crate::libc;

pub struct Entropy;

impl Entropy {
    /// Fills `buf` with cryptographically strong random bytes via the
    /// `getrandom` syscall, retrying on short reads and on `EINTR`.
    pub fn get_array(buf: &mut [u8]) -> bool {
        let mut filled = 0usize;
        while filled < buf.len() {
            let n = unsafe {
                libc::getrandom(
                    buf[filled..].as_mut_ptr() as *mut c_void,
                    buf.len() - filled,
                    0,
                )
            };
            if n < 0 {
                return false;
            }
            filled += n as usize;
        }
        true
    }

    pub fn random_u32() -> u32 {
        let mut buf = [0u8; 4];
        Self::get_array(&mut buf);
        u32::from_ne_bytes(buf)
    }
}
