//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! Debug-only stderr logging. A complete no-op in release builds: no
//! formatting work happens, nothing is linked in, matching the teacher's
//! `print-allocations` style direct-to-fd write rather than a logging crate.

#[cfg(debug_assertions)]
pub fn write_line(msg: &str) {
    use crate::libc;
    unsafe {
        libc::write(2, msg.as_ptr().cast(), msg.len());
        libc::write(2, b"\n".as_ptr().cast(), 1);
    }
}

#[cfg(not(debug_assertions))]
pub fn write_line(_msg: &str) {}

/// Writes `msg` to stderr only in debug builds.
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{
        #[cfg(debug_assertions)]
        {
            extern crate alloc;
            use alloc::string::String;
            use core::fmt::Write as _;
            let mut s = String::new();
            let _ = write!(&mut s, $($arg)*);
            $crate::common::log::write_line(&s);
        }
    }};
}
