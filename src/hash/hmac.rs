//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! HMAC (RFC 2104) over SHA-256 / SHA-384. HMAC itself isn't an
//! incremental algorithm in any useful sense (the inner hash needs the
//! whole message before the outer hash can start), so `Update` here just
//! buffers; the per-block compression happens at `Final`.

extern crate alloc;
use alloc::vec::Vec;

use super::sha2::{Sha256, Sha384};

const SHA256_BLOCK: usize = 64;
const SHA384_BLOCK: usize = 128;

fn pad_key<const BLOCK: usize>(key: &[u8], hash: impl Fn(&[u8]) -> Vec<u8>) -> [u8; BLOCK] {
    let mut block = [0u8; BLOCK];
    if key.len() > BLOCK {
        let digest = hash(key);
        block[..digest.len()].copy_from_slice(&digest);
    } else {
        block[..key.len()].copy_from_slice(key);
    }
    block
}

pub fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let k0 = pad_key::<SHA256_BLOCK>(key, |k| Sha256::hash(k).to_vec());

    let mut inner_key = [0u8; SHA256_BLOCK];
    let mut outer_key = [0u8; SHA256_BLOCK];
    for i in 0..SHA256_BLOCK {
        inner_key[i] = k0[i] ^ 0x36;
        outer_key[i] = k0[i] ^ 0x5c;
    }

    let mut inner = Sha256::new();
    inner.update(&inner_key);
    inner.update(data);
    let inner_digest = inner.finish();

    let mut outer = Sha256::new();
    outer.update(&outer_key);
    outer.update(&inner_digest);
    outer.finish()
}

pub fn hmac_sha384(key: &[u8], data: &[u8]) -> [u8; 48] {
    let k0 = pad_key::<SHA384_BLOCK>(key, |k| Sha384::hash(k).to_vec());

    let mut inner_key = [0u8; SHA384_BLOCK];
    let mut outer_key = [0u8; SHA384_BLOCK];
    for i in 0..SHA384_BLOCK {
        inner_key[i] = k0[i] ^ 0x36;
        outer_key[i] = k0[i] ^ 0x5c;
    }

    let mut inner = Sha384::new();
    inner.update(&inner_key);
    inner.update(data);
    let inner_digest = inner.finish();

    let mut outer = Sha384::new();
    outer.update(&outer_key);
    outer.update(&inner_digest);
    outer.finish()
}

/// Streaming wrapper: `Update` buffers, `Final` runs the two-pass HMAC
/// compression above. Used by the TLS transcript-hash plumbing, which
/// otherwise wants `Init`/`Update`/`Final` symmetry with `Sha256`/`Sha384`.
pub enum Hmac {
    Sha256 { key: Vec<u8>, buf: Vec<u8> },
    Sha384 { key: Vec<u8>, buf: Vec<u8> },
}

impl Hmac {
    pub fn init_sha256(key: &[u8]) -> Self {
        Hmac::Sha256 {
            key: key.to_vec(),
            buf: Vec::new(),
        }
    }

    pub fn init_sha384(key: &[u8]) -> Self {
        Hmac::Sha384 {
            key: key.to_vec(),
            buf: Vec::new(),
        }
    }

    pub fn update(&mut self, data: &[u8]) {
        match self {
            Hmac::Sha256 { buf, .. } | Hmac::Sha384 { buf, .. } => buf.extend_from_slice(data),
        }
    }

    pub fn finish(self) -> Vec<u8> {
        match self {
            Hmac::Sha256 { key, buf } => hmac_sha256(&key, &buf).to_vec(),
            Hmac::Sha384 { key, buf } => hmac_sha384(&key, &buf).to_vec(),
        }
    }
}
