//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! Core pieces used by every layer of the runtime: error taxonomy, I/O
//! traits, the buffered reader, the libc-backed allocator, and debug logging.

pub mod alloc;
pub mod buf_read;
pub mod error;
pub mod io;
pub mod log;
pub mod utils;
