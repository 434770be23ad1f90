//! A streaming two-party garbled-circuit engine.
//!
//! Wire labels and the half-gate/row-reduction gate constructions live in
//! [`label`] and [`garbled_circuits`]; Chou-Orlandi base OT, IKNP extension
//! and the COT/ROT wrappers built on top live in [`oblivious_transfer`];
//! [`elliptic_curve`] holds the P-256 point operations the base OT needs;
//! [`transport`] is the length-prefixed IO layer every protocol message
//! flows through; [`session`] wires garbling, OT and transport together
//! into the end-to-end protocol.

pub mod elliptic_curve;
pub mod garbled_circuits;
pub mod label;
pub mod oblivious_transfer;
pub mod session;
pub mod transport;
pub mod utils;

pub use label::Label;

use thiserror::Error;

/// Every failure mode this crate's protocols can report.
#[derive(Error, Debug)]
pub enum MpcError {
    /// A peer sent bytes that don't parse as a well-formed protocol message.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// A received elliptic-curve point failed the on-curve check.
    #[error("point is not on the curve")]
    PointNotOnCurve,

    /// Two peers are configured with different curves/parameters.
    #[error("curve mismatch between peers")]
    CurveMismatch,

    /// The evaluator asked for a wire's active label before it was set.
    #[error("label for this wire is not yet known")]
    LabelUnknown,

    /// The IKNP active-security (KOS-style) consistency check failed.
    #[error("OT extension correctness check failed: {0}")]
    ExtensionCheckFailed(String),

    /// An internal invariant the caller is responsible for upholding (wire
    /// indices in range, array lengths matching) was violated.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// Transport-level IO failure (closed pipe, socket error, short read).
    #[error("IO error: {0}")]
    Io(String),

    #[error("cryptographic error: {0}")]
    CryptographicError(String),
    #[error("protocol error: {0}")]
    ProtocolError(String),
    #[error("serialization error: {0}")]
    SerializationError(String),
}

impl From<String> for MpcError {
    fn from(s: String) -> Self {
        MpcError::ProtocolError(s)
    }
}

impl From<&str> for MpcError {
    fn from(s: &str) -> Self {
        MpcError::ProtocolError(s.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MpcError>;
