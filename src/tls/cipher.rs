//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! TLS 1.3 key schedule (RFC 8446 section 7.1), restricted to the one
//! hash this runtime ever negotiates (SHA-256, since the only cipher
//! suite offered is `TLS_CHACHA20_POLY1305_SHA256`). Holds one ECDH key
//! pair per supported group (P-256, P-384) generated at `ClientHello`
//! time; the server picks one of them via its `key_share` extension.
//!
//! ```text
//!          0
//!          |
//!          v
//! PSK ->  HKDF-Extract = Early Secret
//!          |
//!          +-----> Derive-Secret(., "derived", "") = dES
//!          |
//!          v
//! (EC)DHE -> HKDF-Extract = Handshake Secret
//!          |
//!          +-----> Derive-Secret(., "c hs traffic", CH..SH) = client_hs_secret
//!          +-----> Derive-Secret(., "s hs traffic", CH..SH) = server_hs_secret
//!          +-----> Derive-Secret(., "derived", "") = dHS
//!          v
//!   0 -> HKDF-Extract = Master Secret
//!          |
//!          +-----> Derive-Secret(., "c ap traffic", CH..SF) = client_ap_secret
//!          +-----> Derive-Secret(., "s ap traffic", CH..SF) = server_ap_secret
//! ```

extern crate alloc;

use crate::ecdh::{CurveId, Ecdh};
use crate::hash::hmac::hmac_sha256;
use crate::hkdf::Hkdf;
use crate::{bare_err, BareResult, ErrorKind};

/// Per-direction traffic key material handed to `RecordCrypto::new`.
pub struct TrafficKeys {
    pub key: [u8; 32],
    pub iv: [u8; 12],
}

fn traffic_keys(secret: &[u8; 32]) -> TrafficKeys {
    let key_vec = Hkdf::expand_label(secret, "key", &[], 32);
    let iv_vec = Hkdf::expand_label(secret, "iv", &[], 12);
    let mut key = [0u8; 32];
    let mut iv = [0u8; 12];
    key.copy_from_slice(&key_vec);
    iv.copy_from_slice(&iv_vec);
    TrafficKeys { key, iv }
}

fn finished_key(secret: &[u8; 32]) -> [u8; 32] {
    let k = Hkdf::expand_label(secret, "finished", &[], 32);
    let mut out = [0u8; 32];
    out.copy_from_slice(&k);
    out
}

/// `Finished.verify_data = HMAC(finished_key, Transcript-Hash(Handshake
/// Context, Certificate*, CertificateVerify*))` (RFC 8446 section 4.4.4).
pub fn finished_mac(traffic_secret: &[u8; 32], transcript_hash: &[u8; 32]) -> [u8; 32] {
    hmac_sha256(&finished_key(traffic_secret), transcript_hash)
}

pub struct Cipher {
    p256: Ecdh,
    p384: Ecdh,
    handshake_secret: Option<[u8; 32]>,
    pub client_hs_secret: Option<[u8; 32]>,
    pub server_hs_secret: Option<[u8; 32]>,
    pub client_ap_secret: Option<[u8; 32]>,
    pub server_ap_secret: Option<[u8; 32]>,
}

impl Cipher {
    pub fn new() -> BareResult<Self> {
        Ok(Self {
            p256: Ecdh::generate(CurveId::P256)?,
            p384: Ecdh::generate(CurveId::P384)?,
            handshake_secret: None,
            client_hs_secret: None,
            server_hs_secret: None,
            client_ap_secret: None,
            server_ap_secret: None,
        })
    }

    fn ecdh_for(&self, curve: CurveId) -> &Ecdh {
        match curve {
            CurveId::P256 => &self.p256,
            CurveId::P384 => &self.p384,
        }
    }

    /// The uncompressed `key_share` entry to offer in `ClientHello` for
    /// `curve`.
    pub fn public_key(&self, curve: CurveId, out: &mut [u8]) -> BareResult<usize> {
        self.ecdh_for(curve).export_public_key(out)
    }

    /// `HKDF-Extract(Derive-Secret(EarlySecret, "derived", ""), (EC)DHE)`:
    /// the shared secret becomes the Handshake Secret once the server picks
    /// a group and sends its `key_share`.
    pub fn derive_handshake_secret(&mut self, curve: CurveId, peer_public_key: &[u8]) -> BareResult<()> {
        let mut shared = [0u8; 48];
        let n = self.ecdh_for(curve).compute_shared_secret(peer_public_key, &mut shared)?;

        let zero_ikm = [0u8; 32];
        let early_secret = Hkdf::extract(&[], &zero_ikm);
        let empty_hash = crate::hash::sha2::Sha256::hash(&[]);
        let derived = Hkdf::expand_label(&early_secret, "derived", &empty_hash, 32);
        let hs = Hkdf::extract(&derived, &shared[..n]);

        let mut handshake_secret = [0u8; 32];
        handshake_secret.copy_from_slice(&hs);
        self.handshake_secret = Some(handshake_secret);
        Ok(())
    }

    /// Derives the two handshake traffic secrets and their key/IV pairs
    /// from `transcript_hash` = `Transcript-Hash(ClientHello..ServerHello)`.
    pub fn handshake_traffic_keys(&mut self, transcript_hash: &[u8; 32]) -> BareResult<(TrafficKeys, TrafficKeys)> {
        let hs = self.handshake_secret.ok_or(()).map_err(|_| {
            crate::bare_error(ErrorKind::TlsUnexpectedPacket, "handshake secret not derived yet")
        })?;

        let client_vec = Hkdf::expand_label(&hs, "c hs traffic", transcript_hash, 32);
        let server_vec = Hkdf::expand_label(&hs, "s hs traffic", transcript_hash, 32);
        let mut client_secret = [0u8; 32];
        let mut server_secret = [0u8; 32];
        client_secret.copy_from_slice(&client_vec);
        server_secret.copy_from_slice(&server_vec);

        self.client_hs_secret = Some(client_secret);
        self.server_hs_secret = Some(server_secret);

        Ok((traffic_keys(&client_secret), traffic_keys(&server_secret)))
    }

    /// Transitions Handshake Secret -> Master Secret and derives the two
    /// application traffic secrets from `transcript_hash` =
    /// `Transcript-Hash(ClientHello..ServerFinished)`.
    pub fn application_traffic_keys(&mut self, transcript_hash: &[u8; 32]) -> BareResult<(TrafficKeys, TrafficKeys)> {
        let hs = self.handshake_secret.ok_or(()).map_err(|_| {
            crate::bare_error(ErrorKind::TlsUnexpectedPacket, "handshake secret not derived yet")
        })?;

        let empty_hash = crate::hash::sha2::Sha256::hash(&[]);
        let derived = Hkdf::expand_label(&hs, "derived", &empty_hash, 32);
        let zero_ikm = [0u8; 32];
        let master_secret = Hkdf::extract(&derived, &zero_ikm);

        let client_vec = Hkdf::expand_label(&master_secret, "c ap traffic", transcript_hash, 32);
        let server_vec = Hkdf::expand_label(&master_secret, "s ap traffic", transcript_hash, 32);
        let mut client_secret = [0u8; 32];
        let mut server_secret = [0u8; 32];
        client_secret.copy_from_slice(&client_vec);
        server_secret.copy_from_slice(&server_vec);

        self.client_ap_secret = Some(client_secret);
        self.server_ap_secret = Some(server_secret);

        Ok((traffic_keys(&client_secret), traffic_keys(&server_secret)))
    }

    pub fn client_finished_mac(&self, transcript_hash: &[u8; 32]) -> BareResult<[u8; 32]> {
        let secret = self.client_hs_secret.ok_or(()).map_err(|_| {
            crate::bare_error(ErrorKind::TlsUnexpectedPacket, "client handshake secret missing")
        })?;
        Ok(finished_mac(&secret, transcript_hash))
    }

    pub fn verify_server_finished(&self, transcript_hash: &[u8; 32], received: &[u8]) -> BareResult<()> {
        let secret = self.server_hs_secret.ok_or(()).map_err(|_| {
            crate::bare_error(ErrorKind::TlsUnexpectedPacket, "server handshake secret missing")
        })?;
        let expected = finished_mac(&secret, transcript_hash);
        if constant_time_eq(&expected, received) {
            Ok(())
        } else {
            bare_err(ErrorKind::TlsVerifyFinished, "server Finished verify_data mismatch")
        }
    }
}

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
