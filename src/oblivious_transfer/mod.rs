//! Oblivious transfer: a Chou-Orlandi base OT, an IKNP extension layer built
//! on it, and COT/ROT wrappers that turn extended correlated OT into
//! wire-ready labels for the garbler.

pub mod base_ot;
pub mod cot_rot;
pub mod extension;

pub use base_ot::{CoReceiver, CoSender};
pub use cot_rot::{
    ChosenOtReceiver, ChosenOtSender, CotReceiver, CotSender, MitCcrh, ObliviousTransferProtocol,
    RandomOtReceiver, RandomOtSender, OT_BATCH_SIZE,
};
pub use extension::{IknpReceiver, IknpSender, ACTIVE_CHECK_ROWS, CHUNK_ROWS, K};

/// XORs two equal-length byte slices.
pub fn xor_bytes(a: &[u8], b: &[u8]) -> Vec<u8> {
    a.iter().zip(b.iter()).map(|(x, y)| x ^ y).collect()
}
