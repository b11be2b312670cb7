//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! Running transcript hash over every handshake message (not the record
//! layer framing around them), fed incrementally as each message is sent
//! or received. `Finished` MACs and the traffic-key derivations both hash
//! a snapshot of this transcript at a particular point, so `clone_hash`
//! takes a copy without disturbing the live accumulator.

use crate::hash::sha2::Sha256;

pub struct HandshakeHash {
    hasher: Sha256,
}

impl HandshakeHash {
    pub fn new() -> Self {
        Self { hasher: Sha256::new() }
    }

    /// Absorbs one handshake message (the `HandshakeType || length || body`
    /// bytes, not the record header).
    pub fn update(&mut self, message: &[u8]) {
        self.hasher.update(message);
    }

    /// `Transcript-Hash` at this point (RFC 8446 section 4.4.1), without
    /// consuming the running accumulator.
    pub fn snapshot(&self) -> [u8; 32] {
        self.hasher.clone().finish()
    }
}

impl Default for HandshakeHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_matches_one_shot_hash_of_concatenation() {
        let mut hh = HandshakeHash::new();
        hh.update(b"client hello bytes");
        hh.update(b"server hello bytes");

        let expected = Sha256::hash(b"client hello bytesserver hello bytes");
        assert_eq!(hh.snapshot(), expected);
    }

    #[test]
    fn snapshot_does_not_consume_accumulator() {
        let mut hh = HandshakeHash::new();
        hh.update(b"one");
        let first = hh.snapshot();
        hh.update(b"two");
        let second = hh.snapshot();
        assert_ne!(first, second);
        assert_eq!(second, Sha256::hash(b"onetwo"));
    }
}
