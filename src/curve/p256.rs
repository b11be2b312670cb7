//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! NIST P-256 (secp256r1) curve parameters and fast reduction, from
//! http://www.nsa.gov/ia/_files/nist-routines.pdf section on NIST curve P-256.

use crate::bigint;
use crate::curve::CurveParams;
use crate::embed::embed_u64;

pub const N: usize = 4;
pub const N2: usize = 8;

pub fn params() -> CurveParams<N> {
    CurveParams {
        p: embed_u64([
            0xFFFFFFFFFFFFFFFF,
            0x00000000FFFFFFFF,
            0x0000000000000000,
            0xFFFFFFFF00000001,
        ]),
        b: embed_u64([
            0x3BCE3C3E27D2604B,
            0x651D06B0CC53B0F6,
            0xB3EBBD55769886BC,
            0x5AC635D8AA3A93E7,
        ]),
        gx: embed_u64([
            0xF4A13945D898C296,
            0x77037D812DEB33A0,
            0xF8BCE6E563A440F2,
            0x6B17D1F2E12C4247,
        ]),
        gy: embed_u64([
            0xCBB6406837BF51F5,
            0x2BCE33576B315ECE,
            0x8EE7EB4A7C0F9E16,
            0x4FE342E2FE1A7F9B,
        ]),
        n: embed_u64([
            0xF3B9CAC2FC632551,
            0xBCE6FAADA7179E84,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFF00000000,
        ]),
    }
}

/// `product[8] % p -> result[4]`. Limb-shuffle reduction exploiting that
/// `2^256 = 2^224 + 2^192 + 2^96 - 1 (mod p)` for this particular prime.
pub fn reduce(product: &[u64; N2], p: &[u64; N]) -> [u64; N] {
    let mut result = [0u64; N];
    result.copy_from_slice(&product[0..4]); // t
    let mut tmp = [0u64; N];
    let mut carry: i64;

    // s1
    tmp[0] = 0;
    tmp[1] = product[5] & 0xffffffff00000000u64;
    tmp[2] = product[6];
    tmp[3] = product[7];
    carry = bigint::lshift_assign(&mut tmp, 1) as i64;
    carry += bigint::add_assign(&mut result, &tmp) as i64;

    // s2
    tmp[1] = product[6] << 32;
    tmp[2] = (product[6] >> 32) | (product[7] << 32);
    tmp[3] = product[7] >> 32;
    carry += bigint::lshift_assign(&mut tmp, 1) as i64;
    carry += bigint::add_assign(&mut result, &tmp) as i64;

    // s3
    tmp[0] = product[4];
    tmp[1] = product[5] & 0xffffffff;
    tmp[2] = 0;
    tmp[3] = product[7];
    carry += bigint::add_assign(&mut result, &tmp) as i64;

    // s4
    tmp[0] = (product[4] >> 32) | (product[5] << 32);
    tmp[1] = (product[5] >> 32) | (product[6] & 0xffffffff00000000u64);
    tmp[2] = product[7];
    tmp[3] = (product[6] >> 32) | (product[4] << 32);
    carry += bigint::add_assign(&mut result, &tmp) as i64;

    // d1
    tmp[0] = (product[5] >> 32) | (product[6] << 32);
    tmp[1] = product[6] >> 32;
    tmp[2] = 0;
    tmp[3] = (product[4] & 0xffffffff) | (product[5] << 32);
    carry -= bigint::sub_assign(&mut result, &tmp) as i64;

    // d2
    tmp[0] = product[6];
    tmp[1] = product[7];
    tmp[2] = 0;
    tmp[3] = (product[4] >> 32) | (product[5] & 0xffffffff00000000u64);
    carry -= bigint::sub_assign(&mut result, &tmp) as i64;

    // d3
    tmp[0] = (product[6] >> 32) | (product[7] << 32);
    tmp[1] = (product[7] >> 32) | (product[4] << 32);
    tmp[2] = (product[4] >> 32) | (product[5] << 32);
    tmp[3] = product[6] << 32;
    carry -= bigint::sub_assign(&mut result, &tmp) as i64;

    // d4
    tmp[0] = product[7];
    tmp[1] = product[4] & 0xffffffff00000000u64;
    tmp[2] = product[5];
    tmp[3] = product[6] & 0xffffffff00000000u64;
    carry -= bigint::sub_assign(&mut result, &tmp) as i64;

    if carry < 0 {
        while carry < 0 {
            carry += bigint::add_assign(&mut result, p) as i64;
        }
    } else {
        while carry != 0 || bigint::cmp(p, &result) != 1 {
            carry -= bigint::sub_assign(&mut result, p) as i64;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{self, EccPoint};

    /// Known-answer test, private key d and public point Q = d*G
    /// (RFC 6979 appendix A.2.5, P-256 ECDSA key pair). Recomputed
    /// independently against a separate elliptic-curve implementation
    /// before being written here.
    #[test]
    fn base_point_scalar_mult_known_vector() {
        let params = params();
        let g = EccPoint { x: params.gx, y: params.gy };

        let d: [u64; N] = [
            0x7B8A622B120F6721,
            0x4E50C3DB36E89B12,
            0x6B5C215767B1D693,
            0xC9AFA9D845BA7516,
        ];
        let q = curve::mult::<N, N2>(&g, &d, None, &params.p, reduce);

        let expected_x: [u64; N] = [
            0xE669622E60F29FB6,
            0xC049B8923B61FA6C,
            0xC961EB74C6356D68,
            0x60FED4BA255A9D31,
        ];
        let expected_y: [u64; N] = [
            0x77A3C294D4462299,
            0xF2F1B20C2D7E9F51,
            0xA41AE9E95628BC64,
            0x7903FE1008B8BC99,
        ];
        assert_eq!(q.x, expected_x);
        assert_eq!(q.y, expected_y);
    }
}
