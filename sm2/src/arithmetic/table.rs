//! Fixed-base precomputation.

use super::{AffinePoint, ProjectivePoint, Scalar};
use subtle::{ConditionallySelectable, ConstantTimeEq};

/// Number of 4-bit windows in a 256-bit scalar.
const WINDOWS: usize = 64;

/// Multiples of a fixed point: `windows[i][j] = j·16ⁱ·P`.
///
/// A scalar multiplication is 64 constant-time lookups and 64 additions,
/// with no doublings.
#[derive(Clone)]
pub struct PrecomputedTable {
    point: AffinePoint,
    windows: Vec<[ProjectivePoint; 16]>,
}

impl PrecomputedTable {
    /// Build the table for `point`.
    pub fn new(point: &AffinePoint) -> Self {
        let mut windows = Vec::with_capacity(WINDOWS);
        let mut base = ProjectivePoint::from(point);

        for _ in 0..WINDOWS {
            let mut row = [ProjectivePoint::IDENTITY; 16];
            for j in 1..16 {
                row[j] = row[j - 1].add(&base);
            }
            windows.push(row);
            base = base.double().double().double().double();
        }

        Self {
            point: *point,
            windows,
        }
    }

    /// The point this table was built for.
    pub fn point(&self) -> &AffinePoint {
        &self.point
    }

    /// Was this table built for `point`?
    pub fn matches(&self, point: &AffinePoint) -> bool {
        self.point == *point
    }

    /// Returns `[k] P`.
    pub fn mul(&self, k: &Scalar) -> ProjectivePoint {
        let bytes = k.to_bytes();
        let mut acc = ProjectivePoint::IDENTITY;

        for (i, row) in self.windows.iter().enumerate() {
            let byte = bytes[31 - i / 2];
            let nibble = if i % 2 == 0 { byte & 0xf } else { byte >> 4 };

            let mut t = ProjectivePoint::IDENTITY;
            for (j, entry) in row.iter().enumerate().skip(1) {
                t.conditional_assign(entry, nibble.ct_eq(&(j as u8)));
            }

            acc = acc.add(&t);
        }

        acc
    }
}

impl core::fmt::Debug for PrecomputedTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PrecomputedTable")
            .field("point", &self.point)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::PrecomputedTable;
    use crate::arithmetic::{AffinePoint, ProjectivePoint, Scalar};
    use hex_literal::hex;

    #[test]
    fn agrees_with_variable_base() {
        let table = PrecomputedTable::new(&AffinePoint::GENERATOR);
        let k = Scalar::reduce_bytes(&hex!(
            "59276E27D506861A16680F3AD9C02DCCEF3CC1FA3CDBE4CE6D54B80DEAC1BC21"
        ));
        assert_eq!(table.mul(&k), ProjectivePoint::GENERATOR.mul(&k));
        assert_eq!(table.mul(&-Scalar::ONE).to_affine(), -AffinePoint::GENERATOR);
        assert!(bool::from(table.mul(&Scalar::ZERO).is_identity()));
    }

    #[test]
    fn matches_only_its_point() {
        let table = PrecomputedTable::new(&AffinePoint::GENERATOR);
        assert!(table.matches(&AffinePoint::GENERATOR));
        assert!(!table.matches(&-AffinePoint::GENERATOR));
    }
}
