//! Shared implementation of the two 256-bit prime fields (base field and
//! scalar field) on top of `crypto-bigint` constant-modulus residues.

/// Define a Montgomery-form field element wrapper for a 256-bit prime modulus.
macro_rules! impl_field_element {
    (
        name: $name:ident,
        params: $params:ident,
        modulus: $modulus_hex:expr,
        modulus_minus_two: $mm2_hex:expr,
        doc: $doc:expr
    ) => {
        crypto_bigint::impl_modulus!($params, crypto_bigint::U256, $modulus_hex);

        type Residue = crypto_bigint::modular::constant_mod::Residue<
            $params,
            { crypto_bigint::U256::LIMBS },
        >;

        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq)]
        pub struct $name(Residue);

        impl $name {
            /// Zero element.
            pub const ZERO: Self = Self(Residue::ZERO);

            /// Multiplicative identity.
            pub const ONE: Self = Self(Residue::ONE);

            /// Modulus as a big integer.
            pub const MODULUS: crypto_bigint::U256 = crypto_bigint::U256::from_be_hex($modulus_hex);

            const MODULUS_MINUS_TWO: crypto_bigint::U256 =
                crypto_bigint::U256::from_be_hex($mm2_hex);

            /// Parse a big-endian hex constant. The value must be below the
            /// modulus.
            pub const fn from_hex(hex: &str) -> Self {
                Self(Residue::new(&crypto_bigint::U256::from_be_hex(hex)))
            }

            /// Convert a small integer.
            pub const fn from_u64(n: u64) -> Self {
                Self(Residue::new(&crypto_bigint::U256::from_u64(n)))
            }

            /// Decode a canonical big-endian encoding, rejecting values that
            /// are not below the modulus.
            pub fn from_bytes(bytes: &[u8; 32]) -> subtle::CtOption<Self> {
                use crypto_bigint::Encoding;
                use subtle::ConstantTimeLess;

                let uint = crypto_bigint::U256::from_be_bytes(*bytes);
                let in_range = uint.ct_lt(&Self::MODULUS);
                subtle::CtOption::new(Self(Residue::new(&uint)), in_range)
            }

            /// Decode a big-endian byte slice of exactly 32 bytes.
            pub fn from_slice(slice: &[u8]) -> Option<Self> {
                let bytes: &[u8; 32] = slice.try_into().ok()?;
                Self::from_bytes(bytes).into()
            }

            /// Canonical big-endian encoding.
            pub fn to_bytes(&self) -> [u8; 32] {
                use crypto_bigint::Encoding;
                self.0.retrieve().to_be_bytes()
            }

            /// Canonical integer value.
            pub fn to_uint(&self) -> crypto_bigint::U256 {
                self.0.retrieve()
            }

            /// Is this element zero?
            pub fn is_zero(&self) -> subtle::Choice {
                subtle::ConstantTimeEq::ct_eq(self, &Self::ZERO)
            }

            /// Is the canonical integer value odd?
            pub fn is_odd(&self) -> subtle::Choice {
                (self.to_bytes()[31] & 1).into()
            }

            /// Returns `self + rhs`.
            pub fn add(&self, rhs: &Self) -> Self {
                Self(self.0.add(&rhs.0))
            }

            /// Returns `self - rhs`.
            pub fn sub(&self, rhs: &Self) -> Self {
                Self(self.0.sub(&rhs.0))
            }

            /// Returns `self * rhs`.
            pub fn mul(&self, rhs: &Self) -> Self {
                Self(self.0.mul(&rhs.0))
            }

            /// Returns `-self`.
            pub fn neg(&self) -> Self {
                Self(self.0.neg())
            }

            /// Returns `self * self`.
            pub fn square(&self) -> Self {
                Self(self.0.square())
            }

            /// Returns `2 * self`.
            pub fn double(&self) -> Self {
                self.add(self)
            }

            /// Returns `self^exp` for a fixed-size exponent.
            pub fn pow(&self, exp: &crypto_bigint::U256) -> Self {
                Self(self.0.pow(exp))
            }

            /// Multiplicative inverse via Fermat's little theorem. `None` for
            /// zero.
            pub fn invert(&self) -> subtle::CtOption<Self> {
                subtle::CtOption::new(self.pow(&Self::MODULUS_MINUS_TWO), !self.is_zero())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl core::fmt::Debug for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}(0x", stringify!($name))?;
                for byte in self.to_bytes() {
                    write!(f, "{:02X}", byte)?;
                }
                write!(f, ")")
            }
        }

        impl subtle::ConstantTimeEq for $name {
            fn ct_eq(&self, other: &Self) -> subtle::Choice {
                subtle::ConstantTimeEq::ct_eq(&self.0, &other.0)
            }
        }

        impl subtle::ConditionallySelectable for $name {
            fn conditional_select(a: &Self, b: &Self, choice: subtle::Choice) -> Self {
                Self(<Residue as subtle::ConditionallySelectable>::conditional_select(
                    &a.0, &b.0, choice,
                ))
            }
        }

        impl zeroize::DefaultIsZeroes for $name {}

        impl_field_op!($name, Add, add, AddAssign, add_assign);
        impl_field_op!($name, Sub, sub, SubAssign, sub_assign);
        impl_field_op!($name, Mul, mul, MulAssign, mul_assign);

        impl core::ops::Neg for $name {
            type Output = $name;

            fn neg(self) -> $name {
                $name::neg(&self)
            }
        }

        impl core::ops::Neg for &$name {
            type Output = $name;

            fn neg(self) -> $name {
                $name::neg(self)
            }
        }
    };
}

/// Binary operator impls for owned and borrowed operands.
macro_rules! impl_field_op {
    ($name:ident, $op:ident, $op_fn:ident, $assign:ident, $assign_fn:ident) => {
        impl core::ops::$op<$name> for $name {
            type Output = $name;

            #[inline]
            fn $op_fn(self, rhs: $name) -> $name {
                $name::$op_fn(&self, &rhs)
            }
        }

        impl core::ops::$op<&$name> for $name {
            type Output = $name;

            #[inline]
            fn $op_fn(self, rhs: &$name) -> $name {
                $name::$op_fn(&self, rhs)
            }
        }

        impl core::ops::$op<&$name> for &$name {
            type Output = $name;

            #[inline]
            fn $op_fn(self, rhs: &$name) -> $name {
                $name::$op_fn(self, rhs)
            }
        }

        impl core::ops::$assign<$name> for $name {
            #[inline]
            fn $assign_fn(&mut self, rhs: $name) {
                *self = $name::$op_fn(self, &rhs);
            }
        }

        impl core::ops::$assign<&$name> for $name {
            #[inline]
            fn $assign_fn(&mut self, rhs: &$name) {
                *self = $name::$op_fn(self, rhs);
            }
        }
    };
}
