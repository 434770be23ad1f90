//! Random-OT (ROT) and chosen-message OT (COT) built on top of IKNP
//! correlated OT, using a multi-instance tweakable correlation-robust hash
//! ("MITCCRH") to turn raw correlated outputs into labels safe to use as
//! garbled wire values.

use rand::{CryptoRng, RngCore};

use crate::garbled_circuits::prf::Prf;
use crate::label::Label;
use crate::oblivious_transfer::extension::{IknpReceiver, IknpSender};
use crate::transport::Channel;
use crate::{MpcError, Result};

/// Ciphers re-keyed per this many labels when hashing a batch through
/// MITCCRH.
pub const OT_BATCH_SIZE: usize = 8;

/// A session-seeded batch hash: one fixed-key AES instance, reused (via
/// `encrypt_half`'s per-call tweak) across the whole batch rather than
/// re-keyed per label.
pub struct MitCcrh {
    prf: Prf,
}

impl MitCcrh {
    pub fn new(seed: Label) -> Self {
        MitCcrh { prf: Prf::new(&seed_to_key(seed)) }
    }

    /// Hashes each label with a tweak derived from its position
    /// (`gid_start + index`), batched conceptually in groups of
    /// [`OT_BATCH_SIZE`] as the session key rotation would in a
    /// multi-seed deployment.
    pub fn hash_batch(&self, labels: &[Label], gid_start: u64) -> Vec<Label> {
        labels
            .iter()
            .enumerate()
            .map(|(i, &l)| self.hash_one(l, gid_start + i as u64))
            .collect()
    }

    /// Hashes a single label under an explicit tweak.
    pub fn hash_one(&self, label: Label, tweak: u64) -> Label {
        self.prf.encrypt_half(label, tweak as u32)
    }
}

fn seed_to_key(seed: Label) -> [u8; 32] {
    let mut key = [0u8; 32];
    key[..16].copy_from_slice(seed.as_bytes());
    key[16..].copy_from_slice(seed.as_bytes());
    key
}

/// Random OT sender: produces one label `r0` per instance; the correlated
/// partner `r1 = r0 ^ delta` is never materialized on the sender's side.
pub struct RandomOtSender {
    iknp: IknpSender,
}

impl RandomOtSender {
    pub fn new(iknp: IknpSender) -> Self {
        RandomOtSender { iknp }
    }

    pub fn delta(&self) -> Label {
        self.iknp.delta()
    }

    pub fn extend<C: Channel>(&mut self, n: usize, seed: Label, chan: &mut C) -> Result<Vec<Label>> {
        let raw = self.iknp.extend(n, chan)?;
        Ok(MitCcrh::new(seed).hash_batch(&raw, 0))
    }
}

/// Random OT receiver: for choice bits `bits`, produces `r_bits[j]`.
pub struct RandomOtReceiver {
    iknp: IknpReceiver,
}

impl RandomOtReceiver {
    pub fn new(iknp: IknpReceiver) -> Self {
        RandomOtReceiver { iknp }
    }

    pub fn extend<C: Channel>(&mut self, bits: &[bool], seed: Label, chan: &mut C) -> Result<Vec<Label>> {
        let raw = self.iknp.extend(bits, chan)?;
        Ok(MitCcrh::new(seed).hash_batch(&raw, 0))
    }
}

/// Chosen-message OT: delivers both labels of caller-supplied wires, built
/// by one-time-padding each with a ROT output.
///
/// Holds the raw (unhashed) IKNP sender rather than a [`RandomOtSender`]
/// because it needs *two* hashes per wire — `H(raw[j], j)` for the receiver's
/// bit-0 case and `H(raw[j] ^ delta, j)` for bit-1 — both under the same
/// per-wire tweak `j` the receiver's matching [`RandomOtReceiver::extend`]
/// uses. `MitCcrh` is not linear, so `H(raw ^ delta)` cannot be recovered
/// from `H(raw)` and `H(delta)` separately.
pub struct ChosenOtSender {
    iknp: IknpSender,
}

impl ChosenOtSender {
    pub fn new(iknp: IknpSender) -> Self {
        ChosenOtSender { iknp }
    }

    pub fn send<C: Channel>(&mut self, wires: &[(Label, Label)], seed: Label, chan: &mut C) -> Result<()> {
        let n = wires.len();
        let raw = self.iknp.extend(n, chan)?;
        let delta = self.iknp.delta();
        let hasher = MitCcrh::new(seed);
        for (j, &(l0, l1)) in wires.iter().enumerate() {
            let h0 = hasher.hash_one(raw[j], j as u64);
            let h1 = hasher.hash_one(raw[j] ^ delta, j as u64);
            chan.send_label(l0 ^ h0)?;
            chan.send_label(l1 ^ h1)?;
        }
        chan.flush()
    }
}

pub struct ChosenOtReceiver {
    rot: RandomOtReceiver,
}

impl ChosenOtReceiver {
    pub fn new(rot: RandomOtReceiver) -> Self {
        ChosenOtReceiver { rot }
    }

    pub fn receive<C: Channel>(&mut self, bits: &[bool], seed: Label, chan: &mut C) -> Result<Vec<Label>> {
        let n = bits.len();
        let r = self.rot.extend(bits, seed, chan)?;
        let mut out = Vec::with_capacity(n);
        for j in 0..n {
            let c0 = chan.recv_label()?;
            let c1 = chan.recv_label()?;
            out.push((if bits[j] { c1 } else { c0 }) ^ r[j]);
        }
        Ok(out)
    }
}

/// Every OT-backed transport the garbler depends on only through this
/// interface, generic over the channel type rather than a trait object so
/// default [`Channel`] convenience methods stay available at call sites.
pub trait ObliviousTransferProtocol<C: Channel> {
    fn init_sender(&mut self, chan: &mut C) -> Result<()>;
    fn init_receiver(&mut self, chan: &mut C) -> Result<()>;
    fn send(&mut self, wires: &[(Label, Label)], chan: &mut C) -> Result<()>;
    fn receive(&mut self, bits: &[bool], chan: &mut C) -> Result<Vec<Label>>;
}

/// A COT sender that performs the full base-OT + IKNP handshake itself;
/// `init_sender` must run before the first `send`.
pub struct CotSender {
    seed: Label,
    inner: Option<ChosenOtSender>,
}

impl CotSender {
    pub fn new(seed: Label) -> Self {
        CotSender { seed, inner: None }
    }
}

impl<C: Channel> ObliviousTransferProtocol<C> for CotSender {
    fn init_sender(&mut self, chan: &mut C) -> Result<()> {
        let mut rng = rand::thread_rng();
        let iknp = IknpSender::new(&mut rng, chan, None)?;
        self.inner = Some(ChosenOtSender::new(iknp));
        Ok(())
    }

    fn init_receiver(&mut self, _chan: &mut C) -> Result<()> {
        Err(MpcError::InvariantViolation("CotSender cannot act as a receiver".into()))
    }

    fn send(&mut self, wires: &[(Label, Label)], chan: &mut C) -> Result<()> {
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| MpcError::InvariantViolation("call init_sender before send".into()))?;
        inner.send(wires, self.seed, chan)
    }

    fn receive(&mut self, _bits: &[bool], _chan: &mut C) -> Result<Vec<Label>> {
        Err(MpcError::InvariantViolation("CotSender cannot receive".into()))
    }
}

pub struct CotReceiver {
    seed: Label,
    inner: Option<ChosenOtReceiver>,
}

impl CotReceiver {
    pub fn new(seed: Label) -> Self {
        CotReceiver { seed, inner: None }
    }
}

impl<C: Channel> ObliviousTransferProtocol<C> for CotReceiver {
    fn init_sender(&mut self, _chan: &mut C) -> Result<()> {
        Err(MpcError::InvariantViolation("CotReceiver cannot act as a sender".into()))
    }

    fn init_receiver(&mut self, chan: &mut C) -> Result<()> {
        let mut rng = rand::thread_rng();
        let iknp = IknpReceiver::new(&mut rng, chan)?;
        self.inner = Some(ChosenOtReceiver::new(RandomOtReceiver::new(iknp)));
        Ok(())
    }

    fn send(&mut self, _wires: &[(Label, Label)], _chan: &mut C) -> Result<()> {
        Err(MpcError::InvariantViolation("CotReceiver cannot send".into()))
    }

    fn receive(&mut self, bits: &[bool], chan: &mut C) -> Result<Vec<Label>> {
        let inner = self
            .inner
            .as_mut()
            .ok_or_else(|| MpcError::InvariantViolation("call init_receiver before receive".into()))?;
        inner.receive(bits, self.seed, chan)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oblivious_transfer::extension::{IknpReceiver, IknpSender};
    use crate::transport::channel_pair;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::thread;

    fn setup_iknp() -> (IknpSender, RandomOtReceiver) {
        let (mut schan, mut rchan) = channel_pair();
        let mut srng = ChaCha20Rng::seed_from_u64(1);
        let handle = thread::spawn(move || IknpSender::new(&mut srng, &mut schan, None).unwrap());
        let mut rrng = ChaCha20Rng::seed_from_u64(2);
        let receiver = IknpReceiver::new(&mut rrng, &mut rchan).unwrap();
        let sender = handle.join().unwrap();
        (sender, RandomOtReceiver::new(receiver))
    }

    #[test]
    fn cot_delivers_chosen_labels() {
        let (iknp_s, rot_r) = setup_iknp();
        let mut cs = ChosenOtSender::new(iknp_s);
        let mut cr = ChosenOtReceiver::new(rot_r);

        let mut rng = ChaCha20Rng::seed_from_u64(3);
        let wires: Vec<(Label, Label)> =
            (0..20).map(|_| (Label::random(&mut rng), Label::random(&mut rng))).collect();
        let bits: Vec<bool> = (0..20).map(|_| rng.next_u32() & 1 == 1).collect();
        let seed = Label::random(&mut rng);

        let (mut schan, mut rchan) = channel_pair();
        let wires_clone = wires.clone();
        let handle = thread::spawn(move || cs.send(&wires_clone, seed, &mut schan).unwrap());
        let got = cr.receive(&bits, seed, &mut rchan).unwrap();
        handle.join().unwrap();

        for j in 0..20 {
            let expected = if bits[j] { wires[j].1 } else { wires[j].0 };
            assert_eq!(got[j], expected, "wire {j}");
        }
    }
}
