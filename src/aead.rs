//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! ChaCha20-Poly1305 AEAD, RFC 8439 section 2.8. This is the only cipher
//! suite the TLS client speaks (`TLS_CHACHA20_POLY1305_SHA256`), so there's
//! no cipher-agility layer here, just the one composition.

extern crate alloc;
use alloc::vec::Vec;

use crate::chacha20::ChaCha20;
use crate::poly1305::Poly1305;
use crate::{bare_err, BareResult, ErrorKind};

const TAG_LEN: usize = 16;

/// `poly1305_key_gen` from RFC 8439 section 2.6: the first 32 bytes of the
/// block-0 keystream become the one-time Poly1305 key.
fn poly1305_key_gen(key: &[u8; 32], nonce: &[u8; 12]) -> [u8; 32] {
    let mut cipher = ChaCha20::new();
    cipher.key_setup(key);
    cipher.iv_setup_96bit_nonce(nonce, 0);
    let zeros = [0u8; 32];
    let mut out = [0u8; 32];
    cipher.encrypt_bytes(&zeros, &mut out);
    out
}

/// Builds the Poly1305 input: `aad || pad(aad) || ciphertext || pad(ct) ||
/// len(aad) || len(ct)`, each length a little-endian u64 (RFC 8439 section
/// 2.8, the `mac_data` construction).
fn mac_data(aad: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let aad_pad = (16 - (aad.len() % 16)) % 16;
    let ct_pad = (16 - (ciphertext.len() % 16)) % 16;

    let mut buf = Vec::with_capacity(aad.len() + aad_pad + ciphertext.len() + ct_pad + 16);
    buf.extend_from_slice(aad);
    buf.extend(core::iter::repeat(0u8).take(aad_pad));
    buf.extend_from_slice(ciphertext);
    buf.extend(core::iter::repeat(0u8).take(ct_pad));
    buf.extend_from_slice(&(aad.len() as u64).to_le_bytes());
    buf.extend_from_slice(&(ciphertext.len() as u64).to_le_bytes());
    buf
}

#[inline]
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for i in 0..a.len() {
        diff |= a[i] ^ b[i];
    }
    diff == 0
}

/// ChaCha20-Poly1305 AEAD, bound to a 32-byte key. Stateless beyond the
/// key: every call takes its own nonce, matching TLS 1.3's per-record
/// nonce derivation in `record_crypto`.
pub struct Aead;

impl Aead {
    /// Encrypts `plaintext` under `key`/`nonce`, authenticating `aad`.
    /// Returns `ciphertext || 16-byte tag`.
    pub fn encrypt(key: &[u8; 32], nonce: &[u8; 12], aad: &[u8], plaintext: &[u8]) -> Vec<u8> {
        let otk = poly1305_key_gen(key, nonce);

        let mut cipher = ChaCha20::new();
        cipher.key_setup(key);
        cipher.iv_setup_96bit_nonce(nonce, 1);

        let mut out = alloc::vec![0u8; plaintext.len() + TAG_LEN];
        let (ciphertext, tag_out) = out.split_at_mut(plaintext.len());
        cipher.encrypt_bytes(plaintext, ciphertext);

        let tag = Poly1305::tag(&otk, &mac_data(aad, ciphertext));
        tag_out.copy_from_slice(&tag);

        out
    }

    /// Decrypts `sealed` (`ciphertext || tag`) under `key`/`nonce`,
    /// verifying `aad`. The tag is checked before any plaintext is
    /// returned.
    pub fn decrypt(
        key: &[u8; 32],
        nonce: &[u8; 12],
        aad: &[u8],
        sealed: &[u8],
    ) -> BareResult<Vec<u8>> {
        if sealed.len() < TAG_LEN {
            return bare_err(ErrorKind::ChaCha20DecodeFailed, "sealed input shorter than tag");
        }
        let (ciphertext, received_tag) = sealed.split_at(sealed.len() - TAG_LEN);

        let otk = poly1305_key_gen(key, nonce);
        let expected_tag = Poly1305::tag(&otk, &mac_data(aad, ciphertext));

        if !constant_time_eq(received_tag, &expected_tag) {
            return bare_err(ErrorKind::ChaCha20DecodeFailed, "authentication tag mismatch");
        }

        let mut cipher = ChaCha20::new();
        cipher.key_setup(key);
        cipher.iv_setup_96bit_nonce(nonce, 1);

        let mut plaintext = alloc::vec![0u8; ciphertext.len()];
        cipher.encrypt_bytes(ciphertext, &mut plaintext);
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_hex(bytes: &[u8]) -> alloc::string::String {
        use alloc::string::String;
        use core::fmt::Write;
        let mut s = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            write!(s, "{:02x}", b).unwrap();
        }
        s
    }

    /// RFC 8439 section 2.8.2 test vector.
    #[test]
    fn rfc8439_encrypt_vector() {
        let plaintext = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";
        let aad: [u8; 12] = [0x50, 0x51, 0x52, 0x53, 0xc0, 0xc1, 0xc2, 0xc3, 0xc4, 0xc5, 0xc6, 0xc7];
        let key: [u8; 32] = [
            0x80, 0x81, 0x82, 0x83, 0x84, 0x85, 0x86, 0x87, 0x88, 0x89, 0x8a, 0x8b, 0x8c, 0x8d,
            0x8e, 0x8f, 0x90, 0x91, 0x92, 0x93, 0x94, 0x95, 0x96, 0x97, 0x98, 0x99, 0x9a, 0x9b,
            0x9c, 0x9d, 0x9e, 0x9f,
        ];
        let nonce: [u8; 12] = [0x07, 0x00, 0x00, 0x00, 0x40, 0x41, 0x42, 0x43, 0x44, 0x45, 0x46, 0x47];

        let sealed = Aead::encrypt(&key, &nonce, &aad, plaintext);
        let (ciphertext, tag) = sealed.split_at(sealed.len() - 16);

        assert_eq!(
            to_hex(ciphertext),
            "d31a8d34648e60db7b86afbc53ef7ec2a4aded51296e08fea9e2b5a736ee62d\
63dbea45e8ca9671282fafb69da92728b1a71de0a9e060b2905d6a5b67ecd3b\
3692ddbd7f2d778b8c9803aee328091b58fab324e4fad675945585808b4831d\
7bc3ff4def08e4b7a9de576d26586cec64b6116"
        );
        assert_eq!(to_hex(tag), "1ae10b594f09e26a7e902ecbd0600691");
    }

    #[test]
    fn decrypt_roundtrip() {
        let key = [0x11u8; 32];
        let nonce = [0x22u8; 12];
        let aad = b"header";
        let plaintext = b"the quick brown fox jumps over the lazy dog, repeatedly, to fill blocks";

        let sealed = Aead::encrypt(&key, &nonce, aad, plaintext);
        let opened = Aead::decrypt(&key, &nonce, aad, &sealed).unwrap();
        assert_eq!(opened, plaintext);
    }

    #[test]
    fn decrypt_rejects_tampered_ciphertext() {
        let key = [0x33u8; 32];
        let nonce = [0x44u8; 12];
        let aad = b"aad";
        let plaintext = b"secret message";

        let mut sealed = Aead::encrypt(&key, &nonce, aad, plaintext);
        sealed[0] ^= 0x01;

        assert!(Aead::decrypt(&key, &nonce, aad, &sealed).is_err());
    }

    #[test]
    fn decrypt_rejects_wrong_aad() {
        let key = [0x55u8; 32];
        let nonce = [0x66u8; 12];
        let plaintext = b"secret message";

        let sealed = Aead::encrypt(&key, &nonce, b"correct-aad", plaintext);
        assert!(Aead::decrypt(&key, &nonce, b"wrong-aad", &sealed).is_err());
    }
}
