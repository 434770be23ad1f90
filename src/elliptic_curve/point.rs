//! A thin wrapper around `p256::ProjectivePoint` exposing exactly the
//! operations the base OT needs: generator scalar multiplication, point
//! addition/negation, and big-endian affine-coordinate encode/decode with
//! on-curve validation built into the decode step.

use p256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use p256::elliptic_curve::Field;
use p256::{AffinePoint, EncodedPoint, ProjectivePoint};
use rand::{CryptoRng, RngCore};

use crate::{MpcError, Result};

/// UTF-8 curve identifier exchanged during base-OT init; both sides must
/// agree on this before running any transfer.
pub const CURVE_NAME: &str = "P-256";

pub type Scalar = p256::Scalar;

/// A point on the P-256 curve, or the point at infinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CurvePoint(ProjectivePoint);

impl CurvePoint {
    pub fn generator() -> Self {
        CurvePoint(ProjectivePoint::GENERATOR)
    }

    pub fn identity() -> Self {
        CurvePoint(ProjectivePoint::IDENTITY)
    }

    pub fn random_scalar<R: RngCore + CryptoRng>(rng: &mut R) -> Scalar {
        Scalar::random(rng)
    }

    pub fn mul_generator(scalar: &Scalar) -> Self {
        CurvePoint(ProjectivePoint::GENERATOR * scalar)
    }

    pub fn mul(&self, scalar: &Scalar) -> Self {
        CurvePoint(self.0 * scalar)
    }

    pub fn add(&self, other: &Self) -> Self {
        CurvePoint(self.0 + other.0)
    }

    pub fn negate(&self) -> Self {
        CurvePoint(-self.0)
    }

    /// Big-endian `(x, y)` affine coordinates, 32 bytes each.
    pub fn coordinates(&self) -> ([u8; 32], [u8; 32]) {
        let affine: AffinePoint = self.0.into();
        let encoded = affine.to_encoded_point(false);
        let mut x = [0u8; 32];
        let mut y = [0u8; 32];
        x.copy_from_slice(encoded.x().expect("non-identity point has an x coordinate"));
        y.copy_from_slice(encoded.y().expect("non-identity point has a y coordinate"));
        (x, y)
    }

    /// Parses a point from big-endian `(x, y)` affine coordinates, rejecting
    /// any pair that doesn't lie on the curve.
    pub fn from_coordinates(x: &[u8; 32], y: &[u8; 32]) -> Result<Self> {
        let encoded = EncodedPoint::from_affine_coordinates(x.into(), y.into(), false);
        let affine = AffinePoint::from_encoded_point(&encoded);
        if affine.is_none().into() {
            return Err(MpcError::PointNotOnCurve);
        }
        Ok(CurvePoint(ProjectivePoint::from(affine.unwrap())))
    }
}
