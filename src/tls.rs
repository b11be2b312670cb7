//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! TLS 1.3 client, restricted to the one cipher suite and the two key-share
//! groups this runtime needs: `TLS_CHACHA20_POLY1305_SHA256` over P-256 or
//! P-384. No certificate validation (non-goal, see DESIGN.md) and no
//! session resumption.

pub mod record_crypto;
pub mod handshake_hash;
pub mod cipher;
pub mod client;
