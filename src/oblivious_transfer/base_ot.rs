//! Chou-Orlandi base 1-out-of-2 OT over a short-Weierstrass curve.
//!
//! Security rests on the sender/receiver each validating the other's point
//! is actually on the curve before scalar-multiplying it — skipping that
//! check is the classic invalid-point attack against this construction.

use rand::{CryptoRng, RngCore};
use sha2::{Digest, Sha256};

use crate::elliptic_curve::{CurvePoint, Scalar, CURVE_NAME};
use crate::label::Label;
use crate::transport::Channel;
use crate::{MpcError, Result};

/// Derives the one-time mask for transfer `idx` from a shared curve point.
fn mask_from_point(p: &CurvePoint, idx: u64) -> Label {
    let (x, y) = p.coordinates();
    let mut hasher = Sha256::new();
    hasher.update(x);
    hasher.update(y);
    hasher.update(idx.to_be_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest[..16]);
    Label::from_bytes(bytes)
}

/// The OT sender: holds `a` and `A = a*G` for the lifetime of a batch of
/// transfers, amortizing the curve-name handshake across them.
pub struct CoSender {
    a: Scalar,
    point_a_inv: CurvePoint,
}

impl CoSender {
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let a = CurvePoint::random_scalar(rng);
        let point_a = CurvePoint::mul_generator(&a);
        CoSender { a, point_a_inv: point_a.negate() }
    }

    fn point_a(&self) -> CurvePoint {
        self.point_a_inv.negate()
    }

    /// Sends the curve name and `A`; must happen once before any transfer.
    pub fn init<C: Channel>(&self, chan: &mut C) -> Result<()> {
        chan.send_data(CURVE_NAME.as_bytes())?;
        let (x, y) = self.point_a().coordinates();
        chan.send_data(&x)?;
        chan.send_data(&y)?;
        chan.flush()
    }

    /// Completes transfer `idx` for message pair `(m0, m1)`.
    pub fn send<C: Channel>(&self, idx: u64, m0: Label, m1: Label, chan: &mut C) -> Result<()> {
        let bx: [u8; 32] = chan
            .recv_data()?
            .try_into()
            .map_err(|_| MpcError::MalformedMessage("B.x must be 32 bytes".into()))?;
        let by: [u8; 32] = chan
            .recv_data()?
            .try_into()
            .map_err(|_| MpcError::MalformedMessage("B.y must be 32 bytes".into()))?;
        let point_b = CurvePoint::from_coordinates(&bx, &by)?;

        let s0 = point_b.mul(&self.a);
        let s1 = s0.add(&self.point_a_inv);

        let e0 = m0 ^ mask_from_point(&s0, idx);
        let e1 = m1 ^ mask_from_point(&s1, idx);
        chan.send_label(e0)?;
        chan.send_label(e1)?;
        chan.flush()
    }

    /// Runs `init` followed by `send` for every pair in `pairs`, indexing
    /// transfers `0..pairs.len()`.
    pub fn send_batch<C: Channel>(&self, pairs: &[(Label, Label)], chan: &mut C) -> Result<()> {
        self.init(chan)?;
        for (idx, &(m0, m1)) in pairs.iter().enumerate() {
            self.send(idx as u64, m0, m1, chan)?;
        }
        Ok(())
    }
}

/// The OT receiver side. Stateless beyond the per-transfer scalar, since
/// nothing needs to persist across transfers once `A` is known.
pub struct CoReceiver;

impl CoReceiver {
    /// Reads and echoes the curve name, then reads `A`, rejecting it if it
    /// isn't on the curve.
    pub fn init<C: Channel>(chan: &mut C) -> Result<CurvePoint> {
        let name = chan.recv_data()?;
        if name != CURVE_NAME.as_bytes() {
            return Err(MpcError::CurveMismatch);
        }
        let ax: [u8; 32] = chan
            .recv_data()?
            .try_into()
            .map_err(|_| MpcError::MalformedMessage("A.x must be 32 bytes".into()))?;
        let ay: [u8; 32] = chan
            .recv_data()?
            .try_into()
            .map_err(|_| MpcError::MalformedMessage("A.y must be 32 bytes".into()))?;
        CurvePoint::from_coordinates(&ax, &ay)
    }

    /// Completes transfer `idx`, choosing `bit`, and returns the recovered
    /// label.
    pub fn receive<R: RngCore + CryptoRng, C: Channel>(
        point_a: &CurvePoint,
        idx: u64,
        bit: bool,
        rng: &mut R,
        chan: &mut C,
    ) -> Result<Label> {
        let b = CurvePoint::random_scalar(rng);
        let point_b_base = CurvePoint::mul_generator(&b);
        let point_b = if bit { point_b_base.add(point_a) } else { point_b_base };

        let (bx, by) = point_b.coordinates();
        chan.send_data(&bx)?;
        chan.send_data(&by)?;
        chan.flush()?;

        let shared = point_a.mul(&b);
        let mask = mask_from_point(&shared, idx);

        let e0 = chan.recv_label()?;
        let e1 = chan.recv_label()?;
        Ok(if bit { e1 } else { e0 } ^ mask)
    }

    /// Runs `init` followed by `receive` for every bit in `bits`.
    pub fn receive_batch<R: RngCore + CryptoRng, C: Channel>(
        bits: &[bool],
        rng: &mut R,
        chan: &mut C,
    ) -> Result<Vec<Label>> {
        let point_a = Self::init(chan)?;
        bits.iter()
            .enumerate()
            .map(|(idx, &bit)| Self::receive(&point_a, idx as u64, bit, rng, chan))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::channel_pair;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::thread;

    #[test]
    fn receiver_recovers_chosen_label() {
        for &bit in &[false, true] {
            let (mut schan, mut rchan) = channel_pair();
            let mut srng = ChaCha20Rng::seed_from_u64(10);
            let mut rng = ChaCha20Rng::seed_from_u64(11);
            let m0 = Label::random(&mut srng);
            let m1 = Label::random(&mut srng);

            let handle = thread::spawn(move || {
                let sender = CoSender::new(&mut srng);
                sender.send_batch(&[(m0, m1)], &mut schan).unwrap();
            });

            let mut rrng = ChaCha20Rng::seed_from_u64(11);
            let point_a = CoReceiver::init(&mut rchan).unwrap();
            let got = CoReceiver::receive(&point_a, 0, bit, &mut rrng, &mut rchan).unwrap();
            handle.join().unwrap();

            assert_eq!(got, if bit { m1 } else { m0 });
        }
    }

    #[test]
    fn tampered_point_is_rejected() {
        let mut rng = ChaCha20Rng::seed_from_u64(20);
        let s = CurvePoint::random_scalar(&mut rng);
        let p = CurvePoint::mul_generator(&s);
        let (mut x, y) = p.coordinates();
        x[3] ^= 0x01;
        assert!(matches!(CurvePoint::from_coordinates(&x, &y), Err(MpcError::PointNotOnCurve)));
    }
}
