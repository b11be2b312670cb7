//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! barestack: a freestanding network runtime. ECDH (P-256/P-384),
//! ChaCha20-Poly1305, a TLS 1.3 client, a DNS-over-HTTPS resolver, an
//! HTTP/1.1 request engine and a WebSocket client, all running without
//! libc startup, a heap beyond the host allocator, or a standard library.

#![no_std]
#![allow(internal_features)]
#![feature(lang_items)]
#![feature(alloc_error_handler)]

extern crate alloc;

pub mod libc;

pub mod common;
pub use common::error::{Context, ErrorKind, BareError, BareResult, bare_err, bare_error};
pub use common::io::{Read, Write};

pub mod embed;
pub use embed::embed;

pub mod entropy;
pub use entropy::Entropy;

pub mod bigint;
pub mod curve;
pub mod ecdh;
pub use ecdh::{CurveId, Ecdh};

pub mod hash;
pub use hash::sha2::{Sha256, Sha384};
pub use hash::hmac::Hmac;

pub mod hkdf;
pub use hkdf::Hkdf;

pub mod chacha20;
pub mod poly1305;
pub mod aead;
pub use aead::Aead;

pub mod net;
pub use net::socket::TcpSocket;

pub mod tls;
pub use tls::client::TlsClient;

pub mod dns;
pub use dns::Dns;

pub mod http;
pub use http::Http;

pub mod websocket;
pub use websocket::{WebSocketClient, WebSocketFrame, WebSocketMessage, WebSocketOpcode};

use core::alloc::Layout;

#[global_allocator]
static ALLOCATOR: common::alloc::LibcAlloc = common::alloc::LibcAlloc;

#[lang = "eh_personality"]
extern "C" fn eh_personality() {}

#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { libc::abort() }
}

#[alloc_error_handler]
fn alloc_error(_layout: Layout) -> ! {
    unsafe { libc::abort() }
}
