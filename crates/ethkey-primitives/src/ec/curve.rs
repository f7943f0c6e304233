//! secp256k1 curve parameters and the low-level arithmetic the signer and the
//! HD node build on.
//!
//! Group arithmetic itself is delegated to k256; this module holds the
//! fixed-width big-endian helpers (comparison against n, n − s, r + n), scalar
//! conversion, point reconstruction from an x-coordinate and parity, and the
//! n·R order check used during public-key recovery.

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::FromEncodedPoint;
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};

/// The secp256k1 curve order n.
/// n = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
pub const CURVE_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
    0x41, 0x41,
];

/// n / 2, the largest canonical (low-s) S value.
pub const HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B,
    0x20, 0xA0,
];

/// The field prime p.
/// p = FFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEFFFFFC2F
pub const FIELD_PRIME: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE, 0xFF, 0xFF,
    0xFC, 0x2F,
];

/// Compressed SEC1 prefix for an even y-coordinate.
pub const PREFIX_EVEN: u8 = 0x02;
/// Compressed SEC1 prefix for an odd y-coordinate.
pub const PREFIX_ODD: u8 = 0x03;
/// Uncompressed SEC1 prefix.
pub const PREFIX_UNCOMPRESSED: u8 = 0x04;

/// Check if a 32-byte big-endian integer is zero.
pub fn is_zero(val: &[u8; 32]) -> bool {
    val.iter().all(|&b| b == 0)
}

/// Compare two 32-byte big-endian integers: a < b.
pub fn is_less_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    for i in 0..32 {
        if a[i] < b[i] {
            return true;
        }
        if a[i] > b[i] {
            return false;
        }
    }
    false
}

/// Compare two 32-byte big-endian integers: a > b.
pub fn is_greater_than(a: &[u8; 32], b: &[u8; 32]) -> bool {
    is_less_than(b, a)
}

/// True if `val` lies in [1, n − 1], the valid private scalar range.
pub fn is_valid_scalar(val: &[u8; 32]) -> bool {
    !is_zero(val) && is_less_than(val, &CURVE_ORDER)
}

/// Compute n − val. `val` must be at most n.
pub fn subtract_from_order(val: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;
    for i in (0..32).rev() {
        let diff = CURVE_ORDER[i] as i32 - val[i] as i32 - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }
    result
}

/// Compute r + n as a candidate x-coordinate.
///
/// # Returns
/// `None` if the sum does not fit in 256 bits or is not below the field
/// prime p, i.e. it cannot be an x-coordinate.
pub fn add_order(r: &[u8; 32]) -> Option<[u8; 32]> {
    let mut result = [0u8; 32];
    let mut carry: u16 = 0;
    for i in (0..32).rev() {
        let sum = r[i] as u16 + CURVE_ORDER[i] as u16 + carry;
        result[i] = sum as u8;
        carry = sum >> 8;
    }
    if carry != 0 || !is_less_than(&result, &FIELD_PRIME) {
        return None;
    }
    Some(result)
}

/// Interpret 32 big-endian bytes as a scalar, reducing modulo n.
pub fn reduce_scalar(bytes: &[u8; 32]) -> Scalar {
    <Scalar as Reduce<U256>>::reduce(U256::from_be_slice(bytes))
}

/// Interpret 32 big-endian bytes as a scalar without reduction.
///
/// # Returns
/// `None` if the value is not below n.
pub fn scalar_from_bytes(bytes: &[u8; 32]) -> Option<Scalar> {
    Option::from(Scalar::from_repr(FieldBytes::from(*bytes)))
}

/// Encode a scalar as 32 big-endian bytes.
pub fn scalar_to_bytes(scalar: &Scalar) -> [u8; 32] {
    scalar.to_bytes().into()
}

/// Reconstruct the curve point with x-coordinate `x` and the given y parity.
///
/// # Returns
/// `None` if `x` is not below p or x³ + 7 has no square root mod p.
pub fn point_from_x(x: &[u8; 32], odd: bool) -> Option<ProjectivePoint> {
    let mut compressed = [0u8; 33];
    compressed[0] = if odd { PREFIX_ODD } else { PREFIX_EVEN };
    compressed[1..].copy_from_slice(x);
    let encoded = EncodedPoint::from_bytes(compressed).ok()?;
    let affine: Option<AffinePoint> = AffinePoint::from_encoded_point(&encoded).into();
    affine.map(ProjectivePoint::from)
}

/// Check that n·R is the point at infinity.
///
/// Computed as (n − 1)·R + R since n itself is not representable as a scalar.
pub fn has_curve_order(point: &ProjectivePoint) -> bool {
    (*point * -Scalar::ONE) + point == ProjectivePoint::IDENTITY
}
