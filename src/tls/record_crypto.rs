//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! Per-direction record protection: one `Aead` key/IV pair for local
//! (client-to-server) traffic and one for remote (server-to-client), each
//! with its own monotonic sequence number. TLS 1.3 section 5.3's per-record
//! nonce is `IV XOR left-padded-64-bit-seqnum`; the sequence number never
//! appears on the wire.

extern crate alloc;
use alloc::vec::Vec;

use crate::aead::Aead;
use crate::{bare_err, BareResult, ErrorKind};

const NONCE_LEN: usize = 12;
pub const TAG_LEN: usize = 16;

fn record_nonce(iv: &[u8; NONCE_LEN], seq: u64) -> [u8; NONCE_LEN] {
    let mut padded = [0u8; NONCE_LEN];
    padded[4..].copy_from_slice(&seq.to_be_bytes());
    let mut nonce = [0u8; NONCE_LEN];
    for i in 0..NONCE_LEN {
        nonce[i] = iv[i] ^ padded[i];
    }
    nonce
}

/// One direction's traffic secret material, installed once per key update
/// (initial handshake keys, then application keys after the handshake
/// completes).
struct Direction {
    key: [u8; 32],
    iv: [u8; NONCE_LEN],
    seq: u64,
}

impl Direction {
    fn new(key: [u8; 32], iv: [u8; NONCE_LEN]) -> Self {
        Self { key, iv, seq: 0 }
    }
}

/// Drives `Aead` for both directions of a TLS 1.3 connection. Re-created
/// (via `install`) whenever the key schedule derives a new traffic secret:
/// once for handshake keys, once for application keys.
pub struct RecordCrypto {
    local: Direction,
    remote: Direction,
}

impl RecordCrypto {
    pub fn new(local_key: [u8; 32], local_iv: [u8; 12], remote_key: [u8; 32], remote_iv: [u8; 12]) -> Self {
        Self {
            local: Direction::new(local_key, local_iv),
            remote: Direction::new(remote_key, remote_iv),
        }
    }

    /// Encrypts `plaintext` (the inner `TLSInnerPlaintext`: content || type
    /// || zero padding) with `aad` as the 5-byte record header, advancing
    /// the local sequence number. Returns `ciphertext || 16-byte tag`.
    pub fn encode(&mut self, aad: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let nonce = record_nonce(&self.local.iv, self.local.seq);
        let sealed = Aead::encrypt(&self.local.key, &nonce, aad, plaintext);
        self.local.seq += 1;
        sealed
    }

    /// Decrypts `sealed` authenticated by `aad`. On success, advances the
    /// remote sequence number; on failure, the counter is left untouched so
    /// a caller can't be tricked into silently resynchronizing.
    pub fn decode(&mut self, aad: &[u8], sealed: &[u8]) -> BareResult<Vec<u8>> {
        let nonce = record_nonce(&self.remote.iv, self.remote.seq);
        match Aead::decrypt(&self.remote.key, &nonce, aad, sealed) {
            Ok(plaintext) => {
                self.remote.seq += 1;
                Ok(plaintext)
            }
            Err(_) => bare_err(ErrorKind::ChaCha20DecodeFailed, "record decryption failed"),
        }
    }

    /// Ciphertext length for a given plaintext length (encode direction).
    pub fn encoded_size(plaintext_len: usize) -> usize {
        plaintext_len + TAG_LEN
    }

    /// Plaintext length for a given ciphertext length (decode direction).
    pub fn decoded_size(ciphertext_len: usize) -> usize {
        ciphertext_len - TAG_LEN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_and_seq_advance() {
        let mut client = RecordCrypto::new([0x11; 32], [0x01; 12], [0x22; 32], [0x02; 12]);
        let mut server = RecordCrypto::new([0x22; 32], [0x02; 12], [0x11; 32], [0x01; 12]);

        let aad = [0x17, 0x03, 0x03, 0x00, 0x20];
        let msg1 = client.encode(&aad, b"first record");
        let msg2 = client.encode(&aad, b"second record");

        assert_eq!(server.decode(&aad, &msg1).unwrap(), b"first record");
        assert_eq!(server.decode(&aad, &msg2).unwrap(), b"second record");
    }

    #[test]
    fn failed_decode_does_not_advance_seq() {
        let mut client = RecordCrypto::new([0x33; 32], [0x03; 12], [0x44; 32], [0x04; 12]);
        let mut server = RecordCrypto::new([0x44; 32], [0x04; 12], [0x33; 32], [0x03; 12]);

        let aad = [0x17, 0x03, 0x03, 0x00, 0x10];
        let mut tampered = client.encode(&aad, b"payload");
        tampered[0] ^= 0xff;

        assert!(server.decode(&aad, &tampered).is_err());
        assert_eq!(server.remote.seq, 0);

        let good = client.encode(&aad, b"payload2");
        assert!(server.decode(&aad, &good).is_err(), "seq desynced after failed decode");
    }
}
