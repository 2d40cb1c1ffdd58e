//! Field arithmetic modulo p = 0xfffffffeffffffffffffffffffffffffffffffff00000000ffffffffffffffff

use crypto_bigint::U256;
use subtle::{ConstantTimeEq, CtOption};

impl_field_element! {
    name: FieldElement,
    params: FieldModulus,
    modulus: "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFF",
    modulus_minus_two: "FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFF00000000FFFFFFFFFFFFFFFD",
    doc: "Element in the SM2 finite field modulo `p = 0xfffffffeffffffffffffffffffffffffffffffff00000000ffffffffffffffff`"
}

/// `(p + 1) / 4`, the square root exponent for `p ≡ 3 (mod 4)`.
const SQRT_EXP: U256 =
    U256::from_be_hex("3FFFFFFFBFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFC00000004000000000000000");

impl FieldElement {
    /// Square root, if `self` is a quadratic residue.
    pub fn sqrt(&self) -> CtOption<Self> {
        let root = self.pow(&SQRT_EXP);
        CtOption::new(root, root.square().ct_eq(self))
    }
}
