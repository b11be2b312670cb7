//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! ECDH key agreement over NIST P-256 / P-384, driving the curve-generic
//! point arithmetic in `curve` with a per-curve parameter set.

use crate::curve::{self, p256, p384, CurveParams, EccPoint, ReduceFn};
use crate::entropy::Entropy;
use crate::{bare_err, BareResult, ErrorKind};

const MAX_TRIES: u32 = 16;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum CurveId {
    P256,
    P384,
}

struct EcdhInner<const N: usize, const N2: usize> {
    params: CurveParams<N>,
    reduce: ReduceFn<N, N2>,
    private_key: [u64; N],
    public_key: EccPoint<N>,
    ecc_bytes: usize,
}

impl<const N: usize, const N2: usize> EcdhInner<N, N2> {
    fn generate(params: CurveParams<N>, reduce: ReduceFn<N, N2>, ecc_bytes: usize) -> BareResult<Self> {
        let mut tries = 0u32;
        loop {
            if tries >= MAX_TRIES {
                return bare_err(ErrorKind::EccInitFailed, "private key generation exhausted retries");
            }
            tries += 1;

            let mut private_key = [0u64; N];
            let bytes = unsafe {
                core::slice::from_raw_parts_mut(private_key.as_mut_ptr().cast::<u8>(), N * 8)
            };
            if !Entropy::get_array(bytes) {
                return bare_err(ErrorKind::EccInitFailed, "entropy source failed");
            }
            // getrandom fills native byte order; the limbs were generated as
            // arbitrary bytes so little-endian reinterpretation is fine for
            // a uniform random scalar candidate.
            if crate::bigint::is_zero(&private_key) {
                continue;
            }
            if crate::bigint::cmp(&params.n, &private_key) != 1 {
                crate::bigint::sub_assign(&mut private_key, &params.n);
            }

            let g = EccPoint { x: params.gx, y: params.gy };
            let public_key = curve::mult::<N, N2>(&g, &private_key, None, &params.p, reduce);
            if public_key.is_zero() {
                continue;
            }

            return Ok(Self {
                params,
                reduce,
                private_key,
                public_key,
                ecc_bytes,
            });
        }
    }

    fn export_public_key(&self, out: &mut [u8]) -> BareResult<usize> {
        let needed = self.ecc_bytes * 2 + 1;
        if out.len() < needed {
            return bare_err(ErrorKind::EccExportKeyFailed, "output buffer too small");
        }
        out[0] = 0x04;
        curve::native_to_bytes(&mut out[1..1 + self.ecc_bytes], &self.public_key.x);
        curve::native_to_bytes(&mut out[1 + self.ecc_bytes..needed], &self.public_key.y);
        Ok(needed)
    }

    fn compute_shared_secret(&self, peer_public_key: &[u8], secret: &mut [u8]) -> BareResult<usize> {
        if peer_public_key.len() != self.ecc_bytes * 2 + 1 || peer_public_key[0] != 0x04 {
            return bare_err(ErrorKind::EccSharedSecretFailed, "malformed peer public key");
        }
        if secret.len() < self.ecc_bytes {
            return bare_err(ErrorKind::EccSharedSecretFailed, "output buffer too small");
        }

        let mut blind = [0u64; N];
        let blind_bytes = unsafe {
            core::slice::from_raw_parts_mut(blind.as_mut_ptr().cast::<u8>(), N * 8)
        };
        if !Entropy::get_array(blind_bytes) {
            return bare_err(ErrorKind::EccSharedSecretFailed, "entropy source failed");
        }

        let peer = EccPoint {
            x: curve::bytes_to_native::<N>(&peer_public_key[1..1 + self.ecc_bytes]),
            y: curve::bytes_to_native::<N>(&peer_public_key[1 + self.ecc_bytes..]),
        };

        let product = curve::mult::<N, N2>(&peer, &self.private_key, Some(&blind), &self.params.p, self.reduce);
        curve::native_to_bytes(&mut secret[..self.ecc_bytes], &product.x);

        if product.is_zero() {
            return bare_err(ErrorKind::EccSharedSecretFailed, "shared secret is the point at infinity");
        }
        Ok(self.ecc_bytes)
    }
}

enum Variant {
    P256(EcdhInner<{ p256::N }, { p256::N2 }>),
    P384(EcdhInner<{ p384::N }, { p384::N2 }>),
}



/// One party's ECDH key pair, bound to a single curve for its lifetime.
pub struct Ecdh(Variant);

impl Ecdh {
    /// Generates a fresh private key, retrying up to `MAX_TRIES` times on a
    /// zero scalar or an identity public key.
    pub fn generate(curve: CurveId) -> BareResult<Self> {
        Ok(match curve {
            CurveId::P256 => Ecdh(Variant::P256(EcdhInner::generate(p256::params(), p256::reduce, 32)?)),
            CurveId::P384 => Ecdh(Variant::P384(EcdhInner::generate(p384::params(), p384::reduce, 48)?)),
        })
    }

    /// Length in bytes of the uncompressed public key (`0x04 || X || Y`).
    pub fn public_key_len(&self) -> usize {
        match &self.0 {
            Variant::P256(i) => i.ecc_bytes * 2 + 1,
            Variant::P384(i) => i.ecc_bytes * 2 + 1,
        }
    }

    pub fn export_public_key(&self, out: &mut [u8]) -> BareResult<usize> {
        match &self.0 {
            Variant::P256(i) => i.export_public_key(out),
            Variant::P384(i) => i.export_public_key(out),
        }
    }

    /// Computes the shared X-coordinate with a peer's uncompressed public
    /// key, blinding the ladder's initial Z with fresh randomness.
    pub fn compute_shared_secret(&self, peer_public_key: &[u8], secret: &mut [u8]) -> BareResult<usize> {
        match &self.0 {
            Variant::P256(i) => i.compute_shared_secret(peer_public_key, secret),
            Variant::P384(i) => i.compute_shared_secret(peer_public_key, secret),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn p256_roundtrip_shared_secret_matches() {
        let alice = Ecdh::generate(CurveId::P256).unwrap();
        let bob = Ecdh::generate(CurveId::P256).unwrap();

        let mut alice_pub = [0u8; 65];
        let mut bob_pub = [0u8; 65];
        alice.export_public_key(&mut alice_pub).unwrap();
        bob.export_public_key(&mut bob_pub).unwrap();

        let mut alice_secret = [0u8; 32];
        let mut bob_secret = [0u8; 32];
        alice.compute_shared_secret(&bob_pub, &mut alice_secret).unwrap();
        bob.compute_shared_secret(&alice_pub, &mut bob_secret).unwrap();

        assert_eq!(alice_secret, bob_secret);
    }

    #[test]
    fn p384_roundtrip_shared_secret_matches() {
        let alice = Ecdh::generate(CurveId::P384).unwrap();
        let bob = Ecdh::generate(CurveId::P384).unwrap();

        let mut alice_pub = [0u8; 97];
        let mut bob_pub = [0u8; 97];
        alice.export_public_key(&mut alice_pub).unwrap();
        bob.export_public_key(&mut bob_pub).unwrap();

        let mut alice_secret = [0u8; 48];
        let mut bob_secret = [0u8; 48];
        alice.compute_shared_secret(&bob_pub, &mut alice_secret).unwrap();
        bob.compute_shared_secret(&alice_pub, &mut bob_secret).unwrap();

        assert_eq!(alice_secret, bob_secret);
    }
}
