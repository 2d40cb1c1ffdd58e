//! Pure Rust implementation of group operations on the SM2 elliptic curve.
//!
//! Curve parameters can be found in [draft-shen-sm2-ecdsa Appendix D]:
//! Recommended Parameters.
//!
//! [draft-shen-sm2-ecdsa Appendix D]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#appendix-D

#[macro_use]
mod macros;

pub(crate) mod field;
pub(crate) mod point;
pub(crate) mod scalar;
pub(crate) mod table;

pub use self::{
    field::FieldElement,
    point::{AffinePoint, ProjectivePoint},
    scalar::Scalar,
    table::PrecomputedTable,
};

use crypto_bigint::U256;

/// Domain parameters of a short Weierstrass curve `y² = x³ + ax + b` over a
/// prime field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurveParams {
    /// Field modulus `p`.
    pub p: U256,

    /// Equation coefficient `a`.
    pub a: FieldElement,

    /// Equation coefficient `b`.
    pub b: FieldElement,

    /// Affine x-coordinate of the base point.
    pub gx: FieldElement,

    /// Affine y-coordinate of the base point.
    pub gy: FieldElement,

    /// Order of the base point.
    pub n: U256,

    /// Cofactor.
    pub h: u32,
}

/// Adapted from [draft-shen-sm2-ecdsa Appendix D]: Recommended Parameters.
///
/// ```text
/// a  = 0xFFFFFFFE FFFFFFFF FFFFFFFF FFFFFFFF FFFFFFFF 00000000 FFFFFFFF FFFFFFFC
/// b  = 0x28E9FA9E 9D9F5E34 4D5A9E4B CF6509A7 F39789F5 15AB8F92 DDBCBD41 4D940E93
/// Gₓ = 0x32C4AE2C 1F198119 5F990446 6A39C994 8FE30BBF F2660BE1 715A4589 334C74C7
/// Gᵧ = 0xBC3736A2 F4F6779C 59BDCEE3 6B692153 D0A9877C C62A4740 02DF32E5 2139F0A0
/// n  = 0xFFFFFFFE FFFFFFFF FFFFFFFF FFFFFFFF 7203DF6B 21C6052B 53BBF409 39D54123
/// ```
///
/// [draft-shen-sm2-ecdsa Appendix D]: https://datatracker.ietf.org/doc/html/draft-shen-sm2-ecdsa-02#appendix-D
pub const SM2P256: CurveParams = CurveParams {
    p: FieldElement::MODULUS,
    a: FieldElement::from_hex("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFC"),
    b: FieldElement::from_hex("28E9FA9E9D9F5E344D5A9E4BCF6509A7F39789F515AB8F92DDBCBD414D940E93"),
    gx: FieldElement::from_hex("32C4AE2C1F1981195F9904466A39C9948FE30BBFF2660BE1715A4589334C74C7"),
    gy: FieldElement::from_hex("BC3736A2F4F6779C59BDCEE36B692153D0A9877CC62A474002DF32E52139F0A0"),
    n: Scalar::MODULUS,
    h: 1,
};

/// Process-wide copy of [`SM2P256`] that contexts borrow.
pub static CURVE: CurveParams = SM2P256;

impl CurveParams {
    /// Big-endian `a || b || Gx || Gy`, the curve part of the identity hash.
    pub fn z_prefix(&self) -> [u8; 128] {
        let mut out = [0u8; 128];
        for (chunk, fe) in out.chunks_exact_mut(32).zip([self.a, self.b, self.gx, self.gy]) {
            chunk.copy_from_slice(&fe.to_bytes());
        }
        out
    }

    /// Base point in affine coordinates.
    pub fn generator(&self) -> AffinePoint {
        AffinePoint {
            x: self.gx,
            y: self.gy,
            infinity: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FieldElement, SM2P256};

    #[test]
    fn a_is_minus_three() {
        assert_eq!(SM2P256.a, -FieldElement::from_u64(3));
    }
}
