//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! HKDF (RFC 5869) over HMAC-SHA256, plus TLS 1.3's `HKDF-Expand-Label`
//! (RFC 8446 section 7.1). The one cipher suite this runtime speaks,
//! `TLS_CHACHA20_POLY1305_SHA256`, fixes the hash to SHA-256 for the whole
//! key schedule, so `Hkdf` is not generic over hash algorithm.

extern crate alloc;
use alloc::vec::Vec;

use crate::embed::embed_str;
use crate::hash::hmac::hmac_sha256;

const HASH_LEN: usize = 32;

pub struct Hkdf;

impl Hkdf {
    /// `PRK = HMAC-Hash(salt, IKM)`. An empty salt is replaced by
    /// `HASH_LEN` zero bytes per RFC 5869 section 2.2.
    pub fn extract(salt: &[u8], ikm: &[u8]) -> [u8; HASH_LEN] {
        let zero_salt = [0u8; HASH_LEN];
        let key = if salt.is_empty() { &zero_salt[..] } else { salt };
        hmac_sha256(key, ikm)
    }

    /// RFC 5869 section 2.3. `len` must be `<= 255 * HASH_LEN`.
    pub fn expand(prk: &[u8], info: &[u8], len: usize) -> Vec<u8> {
        debug_assert!(len <= 255 * HASH_LEN);
        if len == 0 {
            return Vec::new();
        }

        let mut okm = Vec::with_capacity(len);
        let mut previous: Vec<u8> = Vec::new();
        let mut counter: u8 = 0;

        while okm.len() < len {
            counter = counter.wrapping_add(1);
            let mut block_input = Vec::with_capacity(previous.len() + info.len() + 1);
            block_input.extend_from_slice(&previous);
            block_input.extend_from_slice(info);
            block_input.push(counter);

            let digest = hmac_sha256(prk, &block_input);
            let remaining = len - okm.len();
            let take = remaining.min(HASH_LEN);
            okm.extend_from_slice(&digest[..take]);
            previous = digest.to_vec();
        }

        okm
    }

    /// RFC 8446 7.1: wraps `label` as `"tls13 " || label` inside a
    /// `HkdfLabel` structure and calls `expand`.
    ///
    /// ```text
    /// struct {
    ///     uint16 length;
    ///     opaque label<7..255> = "tls13 " + Label;
    ///     opaque context<0..255> = Context;
    /// } HkdfLabel;
    /// ```
    pub fn expand_label(secret: &[u8], label: &str, context: &[u8], len: usize) -> Vec<u8> {
        const PREFIX: [u8; 6] = *b"tls13 ";
        let prefix = embed_str::<6>("tls13 ");
        debug_assert_eq!(prefix, PREFIX);

        let mut hkdf_label = Vec::with_capacity(2 + 1 + 6 + label.len() + 1 + context.len());
        hkdf_label.extend_from_slice(&(len as u16).to_be_bytes());

        let full_label_len = prefix.len() + label.len();
        hkdf_label.push(full_label_len as u8);
        hkdf_label.extend_from_slice(&prefix);
        hkdf_label.extend_from_slice(label.as_bytes());

        hkdf_label.push(context.len() as u8);
        hkdf_label.extend_from_slice(context);

        Self::expand(secret, &hkdf_label, len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_to_vec(s: &str) -> Vec<u8> {
        let bytes = s.as_bytes();
        assert_eq!(bytes.len() % 2, 0);
        let mut out = Vec::with_capacity(bytes.len() / 2);
        for chunk in bytes.chunks_exact(2) {
            let hi = hex_val(chunk[0]);
            let lo = hex_val(chunk[1]);
            out.push((hi << 4) | lo);
        }
        out
    }

    fn hex_val(b: u8) -> u8 {
        match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b - b'a' + 10,
            b'A'..=b'F' => b - b'A' + 10,
            _ => panic!("invalid hex character"),
        }
    }

    /// RFC 5869 section A.1, case 1.
    #[test]
    fn extract_rfc5869_case1() {
        let ikm = [0x0bu8; 22];
        let salt: [u8; 13] = [
            0x00, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
        ];
        let prk = Hkdf::extract(&salt, &ikm);
        assert_eq!(
            prk.to_vec(),
            hex_to_vec("077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5")
        );
    }

    #[test]
    fn expand_rfc5869_case1() {
        let prk = hex_to_vec("077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5");
        let info: [u8; 10] = [0xf0, 0xf1, 0xf2, 0xf3, 0xf4, 0xf5, 0xf6, 0xf7, 0xf8, 0xf9];
        let okm = Hkdf::expand(&prk, &info, 42);
        assert_eq!(
            okm,
            hex_to_vec(
                "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
            )
        );
    }

    #[test]
    fn expand_zero_len_is_empty() {
        let prk = [0xabu8; 32];
        assert!(Hkdf::expand(&prk, b"", 0).is_empty());
    }

    #[test]
    fn expand_label_is_longer_than_plain_expand() {
        let secret = [0x42u8; 32];
        let a = Hkdf::expand_label(&secret, "derived", &[], 32);
        let b = Hkdf::expand(&secret, b"derived", 32);
        assert_ne!(a, b, "label framing must change the HMAC input");
    }
}
