//! Short-Weierstrass point/scalar operations the Chou-Orlandi base OT needs:
//! point validation on decode, scalar multiplication, point addition and
//! negation. Built on the `p256`/`elliptic-curve` crates rather than a
//! hand-rolled field implementation.

pub mod point;

pub use point::{CurvePoint, Scalar, CURVE_NAME};
