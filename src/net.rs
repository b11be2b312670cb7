//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! Transport layer: a raw-syscall TCP socket. Everything above it (TLS,
//! HTTP, WebSocket) is generic over `Read + Write`, so this is the only
//! concrete transport the runtime ships.

pub mod socket;
