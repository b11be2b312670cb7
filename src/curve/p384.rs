//! ort: Open Router CLI
//! https://github.com/grahamking/ort
//!
//! MIT License
//! Copyright (c) 2025 Graham King
//!
//! NIST P-384 (secp384r1) curve parameters and fast reduction, from
//! "Comparing Elliptic Curve Cryptography and RSA on 8-bit CPUs",
//! section "Curve-Specific Optimizations".

use crate::bigint;
use crate::curve::CurveParams;
use crate::embed::embed_u64;

pub const N: usize = 6;
pub const N2: usize = 12;

pub fn params() -> CurveParams<N> {
    CurveParams {
        p: embed_u64([
            0x00000000FFFFFFFF,
            0xFFFFFFFF00000000,
            0xFFFFFFFFFFFFFFFE,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
        ]),
        b: embed_u64([
            0x2A85C8EDD3EC2AEF,
            0xC656398D8A2ED19D,
            0x0314088F5013875A,
            0x181D9C6EFE814112,
            0x988E056BE3F82D19,
            0xB3312FA7E23EE7E4,
        ]),
        gx: embed_u64([
            0x3A545E3872760AB7,
            0x5502F25DBF55296C,
            0x59F741E082542A38,
            0x6E1D3B628BA79B98,
            0x8EB1C71EF320AD74,
            0xAA87CA22BE8B0537,
        ]),
        gy: embed_u64([
            0x7A431D7C90EA0E5F,
            0x0A60B1CE1D7E819D,
            0xE9DA3113B5F0B8C0,
            0xF8F41DBD289A147C,
            0x5D9E98BF9292DC29,
            0x3617DE4A96262C6F,
        ]),
        n: embed_u64([
            0xECEC196ACCC52973,
            0x581A0DB248B0A77A,
            0xC7634D81F4372DDF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
            0xFFFFFFFFFFFFFFFF,
        ]),
    }
}

/// `result[12] = right[6] * (2^128 + 2^96 - 2^32 + 1)`, the P-384-specific
/// reduction multiplier (omega). `result` must be zeroed by the caller.
fn omega_mult(result: &mut [u64; N2], right: &[u64; N]) {
    result[0..N].copy_from_slice(right);

    let mut tmp = [0u64; N];
    let mut carry = bigint::lshift(&mut tmp, right, 32);

    // result[1 + N] = carry + add(result[1..1+N], result[1..1+N], tmp)  => 2^96 + 1
    {
        let mut seg: [u64; N] = result[1..1 + N].try_into().unwrap();
        let c = bigint::add_assign(&mut seg, &tmp);
        result[1..1 + N].copy_from_slice(&seg);
        result[1 + N] = carry + c;
    }

    // result[2 + N] = add(result[2..2+N], result[2..2+N], right)  => 2^128 + 2^96 + 1
    {
        let mut seg: [u64; N] = result[2..2 + N].try_into().unwrap();
        let c = bigint::add_assign(&mut seg, right);
        result[2..2 + N].copy_from_slice(&seg);
        result[2 + N] = c;
    }

    // carry += sub(result[0..N], result[0..N], tmp)  => 2^128 + 2^96 - 2^32 + 1
    {
        let mut seg: [u64; N] = result[0..N].try_into().unwrap();
        let borrow = bigint::sub_assign(&mut seg, &tmp);
        result[0..N].copy_from_slice(&seg);
        carry += borrow;
    }

    let diff = result[N].wrapping_sub(carry);
    if diff > result[N] {
        let mut i = 1 + N;
        loop {
            result[i] = result[i].wrapping_sub(1);
            if result[i] != u64::MAX {
                break;
            }
            i += 1;
        }
    }
    result[N] = diff;
}

/// `product[12] % p -> result[6]`. Reduces one limb-pair of overflow at a
/// time by repeatedly folding the high half back in via `omega_mult`, then
/// finishes with a plain subtract loop.
pub fn reduce(product_in: &[u64; N2], p: &[u64; N]) -> [u64; N] {
    let mut product = *product_in;

    loop {
        let c1: [u64; N] = product[N..2 * N].try_into().unwrap();
        if bigint::is_zero(&c1) {
            break;
        }

        let mut tmp = [0u64; N2];
        omega_mult(&mut tmp, &c1);
        for slot in product[N..2 * N].iter_mut() {
            *slot = 0;
        }

        let mut carry = 0u64;
        for i in 0..(N + 3) {
            let sum = product[i].wrapping_add(tmp[i]).wrapping_add(carry);
            if sum != product[i] {
                carry = (sum < product[i]) as u64;
            }
            product[i] = sum;
        }
    }

    let mut result: [u64; N] = product[0..N].try_into().unwrap();
    while bigint::cmp(&result, p) > 0 {
        bigint::sub_assign(&mut result, p);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{self, EccPoint};

    #[test]
    fn base_point_doubling_stays_on_curve() {
        let params = params();
        let g = EccPoint { x: params.gx, y: params.gy };

        let two: [u64; N] = [2, 0, 0, 0, 0, 0];
        let q = curve::mult::<N, N2>(&g, &two, None, &params.p, reduce);
        assert!(!q.is_zero());
        assert_ne!(q.x, g.x);
    }
}
