//! SM2 scalar field elements.

use crypto_bigint::{Encoding, U256};
use subtle::{ConditionallySelectable, ConstantTimeLess};

impl_field_element! {
    name: Scalar,
    params: OrderModulus,
    modulus: "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123",
    modulus_minus_two: "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54121",
    doc: "Scalars are elements in the finite field modulo `n = 0xfffffffeffffffffffffffffffffffff7203df6b21c6052b53bbf40939d54123`"
}

impl Scalar {
    /// Reduce a 256-bit big-endian integer modulo `n`.
    ///
    /// `2^256 < 2n`, so a single conditional subtraction suffices.
    pub fn reduce_bytes(bytes: &[u8; 32]) -> Self {
        let uint = U256::from_be_bytes(*bytes);
        let reduced = uint.wrapping_sub(&Self::MODULUS);
        let uint = U256::conditional_select(&reduced, &uint, uint.ct_lt(&Self::MODULUS));
        Self::from_uint(&uint)
    }

    /// Decode a scalar in `[1, n-1]`.
    pub fn from_bytes_nonzero(bytes: &[u8; 32]) -> Option<Self> {
        Option::<Self>::from(Self::from_bytes(bytes)).filter(|s| !bool::from(s.is_zero()))
    }

    fn from_uint(uint: &U256) -> Self {
        Self(Residue::new(uint))
    }
}

#[cfg(test)]
mod tests {
    use super::Scalar;
    use hex_literal::hex;

    const N: [u8; 32] = hex!("FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54123");

    #[test]
    fn order_reduces_to_zero() {
        assert_eq!(Scalar::reduce_bytes(&N), Scalar::ZERO);
        assert!(bool::from(Scalar::from_bytes(&N).is_none()));
        assert!(Scalar::from_bytes_nonzero(&[0u8; 32]).is_none());
    }

    #[test]
    fn reduce_above_order() {
        let max = [0xFFu8; 32];
        let reduced = Scalar::reduce_bytes(&max);
        // 2^256 - 1 - n
        assert_eq!(
            reduced.to_bytes(),
            hex!("000000010000000000000000000000008DFC2094DE39FAD4AC440BF6C62ABEDC")
        );
    }

    #[test]
    fn inverse() {
        let x = Scalar::from_u64(42);
        assert_eq!(x * x.invert().unwrap(), Scalar::ONE);
    }
}
