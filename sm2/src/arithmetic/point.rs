//! Affine and projective points on the SM2 curve.

#![allow(clippy::op_ref)]

use super::{CurveParams, FieldElement, SM2P256, Scalar};
use crate::{Error, Result};
use subtle::{Choice, ConditionallySelectable, ConstantTimeEq, CtOption};

/// Size of an uncompressed SEC1 point: `04 || X || Y`.
pub const UNCOMPRESSED_POINT_SIZE: usize = 65;

/// Size of a compressed SEC1 point: `02/03 || X`.
pub const COMPRESSED_POINT_SIZE: usize = 33;

/// Point in affine coordinates.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    pub(crate) x: FieldElement,
    pub(crate) y: FieldElement,
    /// Is this point the point at infinity? 0 = no, 1 = yes
    pub(crate) infinity: u8,
}

impl AffinePoint {
    /// Additive identity of the group a.k.a. the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ZERO,
        infinity: 1,
    };

    /// Base point of SM2.
    pub const GENERATOR: Self = Self {
        x: SM2P256.gx,
        y: SM2P256.gy,
        infinity: 0,
    };

    /// Create a point from affine coordinates, checking that it lies on the
    /// curve.
    pub fn from_coordinates(x: FieldElement, y: FieldElement) -> CtOption<Self> {
        let point = Self { x, y, infinity: 0 };
        CtOption::new(point, point.is_on_curve())
    }

    /// Does `y² = x³ + ax + b` hold?
    pub fn is_on_curve(&self) -> Choice {
        let rhs = curve_rhs(&self.x, &SM2P256);
        self.y.square().ct_eq(&rhs)
    }

    /// Is this point the identity?
    pub fn is_identity(&self) -> Choice {
        Choice::from(self.infinity)
    }

    /// Big-endian x-coordinate.
    pub fn x_bytes(&self) -> [u8; 32] {
        self.x.to_bytes()
    }

    /// Big-endian y-coordinate.
    pub fn y_bytes(&self) -> [u8; 32] {
        self.y.to_bytes()
    }

    /// Affine x-coordinate as a field element.
    pub fn x(&self) -> FieldElement {
        self.x
    }

    /// Affine y-coordinate as a field element.
    pub fn y(&self) -> FieldElement {
        self.y
    }

    /// `X || Y` without the SEC1 tag.
    pub fn to_raw_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.x.to_bytes());
        out[32..].copy_from_slice(&self.y.to_bytes());
        out
    }

    /// Uncompressed SEC1 encoding `04 || X || Y`.
    pub fn to_uncompressed(&self) -> [u8; UNCOMPRESSED_POINT_SIZE] {
        let mut out = [0u8; UNCOMPRESSED_POINT_SIZE];
        out[0] = 0x04;
        out[1..].copy_from_slice(&self.to_raw_bytes());
        out
    }

    /// Compressed SEC1 encoding `02/03 || X`.
    pub fn to_compressed(&self) -> [u8; COMPRESSED_POINT_SIZE] {
        let mut out = [0u8; COMPRESSED_POINT_SIZE];
        out[0] = 0x02 | self.y.is_odd().unwrap_u8();
        out[1..].copy_from_slice(&self.x.to_bytes());
        out
    }

    /// Decode `X || Y` (64 bytes, no tag).
    pub fn from_raw_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 64 {
            return Err(Error::InvalidKey);
        }
        let x = FieldElement::from_slice(&bytes[..32]).ok_or(Error::InvalidKey)?;
        let y = FieldElement::from_slice(&bytes[32..]).ok_or(Error::InvalidKey)?;
        Option::from(Self::from_coordinates(x, y)).ok_or(Error::InvalidKey)
    }

    /// Decode a SEC1 point: uncompressed (`04`) or compressed (`02`/`03`).
    /// The identity encoding is rejected.
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        match (bytes.first(), bytes.len()) {
            (Some(0x04), UNCOMPRESSED_POINT_SIZE) => Self::from_raw_bytes(&bytes[1..]),
            (Some(tag @ (0x02 | 0x03)), COMPRESSED_POINT_SIZE) => {
                let x = FieldElement::from_slice(&bytes[1..]).ok_or(Error::InvalidKey)?;
                let y = Option::<FieldElement>::from(curve_rhs(&x, &SM2P256).sqrt())
                    .ok_or(Error::InvalidKey)?;
                let want_odd = Choice::from(tag & 1);
                let y = FieldElement::conditional_select(&-y, &y, !(y.is_odd() ^ want_odd));
                Ok(Self { x, y, infinity: 0 })
            }
            _ => Err(Error::InvalidKey),
        }
    }
}

impl ConditionallySelectable for AffinePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            infinity: u8::conditional_select(&a.infinity, &b.infinity, choice),
        }
    }
}

impl ConstantTimeEq for AffinePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.x.ct_eq(&other.x) & self.y.ct_eq(&other.y) & self.infinity.ct_eq(&other.infinity)
    }
}

impl PartialEq for AffinePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for AffinePoint {}

impl core::ops::Neg for AffinePoint {
    type Output = Self;

    fn neg(self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
            infinity: self.infinity,
        }
    }
}

impl From<ProjectivePoint> for AffinePoint {
    fn from(p: ProjectivePoint) -> AffinePoint {
        p.to_affine()
    }
}

/// Point in homogeneous projective coordinates `(X : Y : Z)`, `x = X/Z`,
/// `y = Y/Z`.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    x: FieldElement,
    y: FieldElement,
    z: FieldElement,
}

impl ProjectivePoint {
    /// Additive identity of the group a.k.a. the point at infinity.
    pub const IDENTITY: Self = Self {
        x: FieldElement::ZERO,
        y: FieldElement::ONE,
        z: FieldElement::ZERO,
    };

    /// Base point of SM2.
    pub const GENERATOR: Self = Self {
        x: SM2P256.gx,
        y: SM2P256.gy,
        z: FieldElement::ONE,
    };

    /// Is this point the identity?
    pub fn is_identity(&self) -> Choice {
        self.z.is_zero()
    }

    /// Returns the affine representation of this point, or the identity.
    pub fn to_affine(&self) -> AffinePoint {
        Option::<FieldElement>::from(self.z.invert())
            .map(|zinv| AffinePoint {
                x: self.x * zinv,
                y: self.y * zinv,
                infinity: 0,
            })
            .unwrap_or(AffinePoint::IDENTITY)
    }

    /// Implements complete addition for curves with `a = -3`
    ///
    /// Implements the complete addition formula from [Renes-Costello-Batina 2015]
    /// (Algorithm 4). The comments after each line indicate which algorithm steps
    /// are being performed.
    ///
    /// [Renes-Costello-Batina 2015]: https://eprint.iacr.org/2015/1060
    pub fn add(&self, rhs: &Self) -> Self {
        let b = &SM2P256.b;

        let xx = self.x * rhs.x; // 1
        let yy = self.y * rhs.y; // 2
        let zz = self.z * rhs.z; // 3
        let xy_pairs = ((self.x + self.y) * (rhs.x + rhs.y)) - (xx + yy); // 4, 5, 6, 7, 8
        let yz_pairs = ((self.y + self.z) * (rhs.y + rhs.z)) - (yy + zz); // 9, 10, 11, 12, 13
        let xz_pairs = ((self.x + self.z) * (rhs.x + rhs.z)) - (xx + zz); // 14, 15, 16, 17, 18

        let bzz_part = xz_pairs - (b * &zz); // 19, 20
        let bzz3_part = bzz_part.double() + bzz_part; // 21, 22
        let yy_m_bzz3 = yy - bzz3_part; // 23
        let yy_p_bzz3 = yy + bzz3_part; // 24

        let zz3 = zz.double() + zz; // 26, 27
        let bxz_part = (b * &xz_pairs) - (zz3 + xx); // 25, 28, 29
        let bxz3_part = bxz_part.double() + bxz_part; // 30, 31
        let xx3_m_zz3 = xx.double() + xx - zz3; // 32, 33, 34

        Self {
            x: (yy_p_bzz3 * xy_pairs) - (yz_pairs * bxz3_part), // 35, 39, 40
            y: (yy_p_bzz3 * yy_m_bzz3) + (xx3_m_zz3 * bxz3_part), // 36, 37, 38
            z: (yy_m_bzz3 * yz_pairs) + (xy_pairs * xx3_m_zz3), // 41, 42, 43
        }
    }

    /// Implements complete mixed addition for curves with `a = -3`
    ///
    /// Implements the complete mixed addition formula from [Renes-Costello-Batina 2015]
    /// (Algorithm 5). The comments after each line indicate which algorithm
    /// steps are being performed.
    ///
    /// [Renes-Costello-Batina 2015]: https://eprint.iacr.org/2015/1060
    pub fn add_mixed(&self, rhs: &AffinePoint) -> Self {
        let b = &SM2P256.b;

        let xx = self.x * rhs.x; // 1
        let yy = self.y * rhs.y; // 2
        let xy_pairs = ((self.x + self.y) * (rhs.x + rhs.y)) - (xx + yy); // 3, 4, 5, 6, 7
        let yz_pairs = (rhs.y * self.z) + self.y; // 8, 9 (t4)
        let xz_pairs = (rhs.x * self.z) + self.x; // 10, 11 (y3)

        let bz_part = xz_pairs - (b * &self.z); // 12, 13
        let bz3_part = bz_part.double() + bz_part; // 14, 15
        let yy_m_bzz3 = yy - bz3_part; // 16
        let yy_p_bzz3 = yy + bz3_part; // 17

        let z3 = self.z.double() + self.z; // 19, 20
        let bxz_part = (b * &xz_pairs) - (z3 + xx); // 18, 21, 22
        let bxz3_part = bxz_part.double() + bxz_part; // 23, 24
        let xx3_m_zz3 = xx.double() + xx - z3; // 25, 26, 27

        let mut ret = Self {
            x: (yy_p_bzz3 * xy_pairs) - (yz_pairs * bxz3_part), // 28, 32, 33
            y: (yy_p_bzz3 * yy_m_bzz3) + (xx3_m_zz3 * bxz3_part), // 29, 30, 31
            z: (yy_m_bzz3 * yz_pairs) + (xy_pairs * xx3_m_zz3), // 34, 35, 36
        };
        ret.conditional_assign(self, rhs.is_identity());
        ret
    }

    /// Implements point doubling for curves with `a = -3`
    ///
    /// Implements the exception-free point doubling formula from [Renes-Costello-Batina 2015]
    /// (Algorithm 6). The comments after each line indicate which algorithm
    /// steps are being performed.
    ///
    /// [Renes-Costello-Batina 2015]: https://eprint.iacr.org/2015/1060
    pub fn double(&self) -> Self {
        let b = &SM2P256.b;

        let xx = self.x.square(); // 1
        let yy = self.y.square(); // 2
        let zz = self.z.square(); // 3
        let xy2 = (self.x * self.y).double(); // 4, 5
        let xz2 = (self.x * self.z).double(); // 6, 7

        let bzz_part = (b * &zz) - xz2; // 8, 9
        let bzz3_part = bzz_part.double() + bzz_part; // 10, 11
        let yy_m_bzz3 = yy - bzz3_part; // 12
        let yy_p_bzz3 = yy + bzz3_part; // 13
        let y_frag = yy_p_bzz3 * yy_m_bzz3; // 14
        let x_frag = yy_m_bzz3 * xy2; // 15

        let zz3 = zz.double() + zz; // 16, 17
        let bxz2_part = (b * &xz2) - (zz3 + xx); // 18, 19, 20
        let bxz6_part = bxz2_part.double() + bxz2_part; // 21, 22
        let xx3_m_zz3 = xx.double() + xx - zz3; // 23, 24, 25

        let y = y_frag + (xx3_m_zz3 * bxz6_part); // 26, 27
        let yz2 = (self.y * self.z).double(); // 28, 29
        let x = x_frag - (bxz6_part * yz2); // 30, 31
        let z = (yz2 * yy).double().double(); // 32, 33, 34

        Self { x, y, z }
    }

    /// Returns `-self`.
    pub fn neg(&self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
            z: self.z,
        }
    }

    /// Returns `[k] self` using fixed 4-bit windows and constant-time table
    /// lookups.
    pub fn mul(&self, k: &Scalar) -> Self {
        let k = k.to_bytes();

        let mut pc = [Self::IDENTITY; 16];
        pc[1] = *self;

        for i in 2..16 {
            pc[i] = if i % 2 == 0 {
                pc[i / 2].double()
            } else {
                pc[i - 1].add(self)
            };
        }

        let nibbles = k.iter().flat_map(|byte| [byte >> 4, byte & 0xf]);
        let mut q = Self::IDENTITY;

        for (i, nibble) in nibbles.enumerate() {
            if i > 0 {
                q = q.double().double().double().double();
            }

            let mut t = Self::IDENTITY;
            for (j, entry) in pc.iter().enumerate().skip(1) {
                t.conditional_assign(entry, nibble.ct_eq(&(j as u8)));
            }

            q = q.add(&t);
        }

        q
    }
}

impl ConditionallySelectable for ProjectivePoint {
    fn conditional_select(a: &Self, b: &Self, choice: Choice) -> Self {
        Self {
            x: FieldElement::conditional_select(&a.x, &b.x, choice),
            y: FieldElement::conditional_select(&a.y, &b.y, choice),
            z: FieldElement::conditional_select(&a.z, &b.z, choice),
        }
    }
}

impl ConstantTimeEq for ProjectivePoint {
    fn ct_eq(&self, other: &Self) -> Choice {
        // (X1/Z1 == X2/Z2) && (Y1/Z1 == Y2/Z2), with identity handled by Z
        let x1 = self.x * other.z;
        let x2 = other.x * self.z;
        let y1 = self.y * other.z;
        let y2 = other.y * self.z;
        let both_identity = self.is_identity() & other.is_identity();
        let neither_identity = !self.is_identity() & !other.is_identity();
        both_identity | (neither_identity & x1.ct_eq(&x2) & y1.ct_eq(&y2))
    }
}

impl PartialEq for ProjectivePoint {
    fn eq(&self, other: &Self) -> bool {
        self.ct_eq(other).into()
    }
}

impl Eq for ProjectivePoint {}

impl Default for ProjectivePoint {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<AffinePoint> for ProjectivePoint {
    fn from(p: AffinePoint) -> Self {
        let projective = Self {
            x: p.x,
            y: p.y,
            z: FieldElement::ONE,
        };
        Self::conditional_select(&projective, &Self::IDENTITY, p.is_identity())
    }
}

impl From<&AffinePoint> for ProjectivePoint {
    fn from(p: &AffinePoint) -> Self {
        Self::from(*p)
    }
}

impl core::ops::Add<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, rhs: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, rhs)
    }
}

impl core::ops::Add<ProjectivePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, rhs: ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(&self, &rhs)
    }
}

impl core::ops::Add<&AffinePoint> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn add(self, rhs: &AffinePoint) -> ProjectivePoint {
        ProjectivePoint::add_mixed(&self, rhs)
    }
}

impl core::ops::AddAssign<&ProjectivePoint> for ProjectivePoint {
    fn add_assign(&mut self, rhs: &ProjectivePoint) {
        *self = ProjectivePoint::add(self, rhs);
    }
}

impl core::ops::Sub<&ProjectivePoint> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn sub(self, rhs: &ProjectivePoint) -> ProjectivePoint {
        ProjectivePoint::add(self, &ProjectivePoint::neg(rhs))
    }
}

impl core::ops::Neg for ProjectivePoint {
    type Output = ProjectivePoint;

    fn neg(self) -> ProjectivePoint {
        ProjectivePoint::neg(&self)
    }
}

impl core::ops::Mul<&Scalar> for &ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, k: &Scalar) -> ProjectivePoint {
        ProjectivePoint::mul(self, k)
    }
}

impl core::ops::Mul<&Scalar> for ProjectivePoint {
    type Output = ProjectivePoint;

    fn mul(self, k: &Scalar) -> ProjectivePoint {
        ProjectivePoint::mul(&self, k)
    }
}

/// `x³ + ax + b`
pub(crate) fn curve_rhs(x: &FieldElement, params: &CurveParams) -> FieldElement {
    (x.square() * x) + (params.a * x) + params.b
}
