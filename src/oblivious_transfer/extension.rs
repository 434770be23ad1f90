//! IKNP OT extension: amplifies `K` base OTs into an unbounded stream of
//! random correlated OTs, with an optional KOS-style active-security check.
//!
//! Both sides keep 128 AES-CTR PRGs (one per base-OT output) and extend in
//! chunks of up to 128 rows, matching the chunk sizing the base construction
//! uses for its bit-matrix transpose.

use aes::Aes128;
use cipher::{KeyIvInit, StreamCipher};
use ctr::Ctr64BE;
use rand::{CryptoRng, RngCore};

use crate::label::{mul128, Label};
use crate::oblivious_transfer::base_ot::{CoReceiver, CoSender};
use crate::transport::Channel;
use crate::{MpcError, Result};

/// Number of base OTs / PRGs; also the bit-width of the correlation `Δ`.
pub const K: usize = 128;
/// Maximum rows extended per chunk, bounded by `K` so the bit-matrix
/// transpose stays square.
pub const CHUNK_ROWS: usize = 128;
/// Extra rows appended for the active-security consistency check.
pub const ACTIVE_CHECK_ROWS: usize = 256;

type Prg = Ctr64BE<Aes128>;

fn new_prg(key: &[u8; 16]) -> Prg {
    Prg::new(key.into(), &[0u8; 16].into())
}

fn prg_bytes(prg: &mut Prg, n: usize) -> Vec<u8> {
    let mut buf = vec![0u8; n];
    prg.apply_keystream(&mut buf);
    buf
}

fn label_to_key(l: Label) -> [u8; 16] {
    *l.as_bytes()
}

/// Derives `n` pseudorandom `chi` weights from a 32-byte seed, for the
/// active-security linear-combination check.
fn derive_chi(seed: &[u8; 32], n: usize) -> Vec<Label> {
    let mut key = [0u8; 16];
    key.copy_from_slice(&seed[..16]);
    let mut prg = new_prg(&key);
    prg_bytes(&mut prg, n * 16)
        .chunks_exact(16)
        .map(|c| {
            let mut b = [0u8; 16];
            b.copy_from_slice(c);
            Label::from_bytes(b)
        })
        .collect()
}

/// Packs row `r`'s bit into byte-row buffer `buf`, little-endian within the
/// byte — the convention both sides of the transpose agree on.
#[inline]
fn pack_bit(buf: &mut [u8], r: usize, bit: bool) {
    if bit {
        buf[r / 8] |= 1 << (r % 8);
    }
}

#[inline]
fn unpack_bit(buf: &[u8], r: usize) -> bool {
    (buf[r / 8] >> (r % 8)) & 1 == 1
}

/// The OT-extension sender: acts as base-OT *receiver* during setup (its
/// choice bits are `Δ`'s bits), then holds one PRG per base-OT output label.
pub struct IknpSender {
    delta: Label,
    prgs: Vec<Prg>,
}

impl IknpSender {
    /// Runs the `K` base OTs (as receiver, choosing `Δ`'s bits) and derives
    /// the per-row PRGs. `delta` defaults to a fresh random offset with its
    /// select bit set.
    pub fn new<R: RngCore + CryptoRng, C: Channel>(
        rng: &mut R,
        chan: &mut C,
        delta: Option<Label>,
    ) -> Result<Self> {
        let delta = delta.unwrap_or_else(|| Label::random_delta(rng));
        let flags: Vec<bool> = (0..K as u32).map(|i| delta.bit(i)).collect();
        let k0 = CoReceiver::receive_batch(&flags, rng, chan)?;
        let prgs = k0.into_iter().map(|l| new_prg(&label_to_key(l))).collect();
        Ok(IknpSender { delta, prgs })
    }

    pub fn delta(&self) -> Label {
        self.delta
    }

    /// Extends to `n` correlated-OT outputs `result_s[r]`, satisfying
    /// `result_s[r] ^ result_r[r] = b[r] * delta` against the receiver's
    /// matching [`IknpReceiver::extend`] call.
    pub fn extend<C: Channel>(&mut self, n: usize, chan: &mut C) -> Result<Vec<Label>> {
        let mut out = vec![Label::ZERO; n];
        let mut done = 0;
        while done < n {
            let rows = (n - done).min(CHUNK_ROWS);
            let byte_rows = rows.div_ceil(8);
            let mut t_rows = Vec::with_capacity(K);
            for (i, prg) in self.prgs.iter_mut().enumerate() {
                let mut t_i = prg_bytes(prg, byte_rows);
                let received = chan.recv_data()?;
                if received.len() != byte_rows {
                    return Err(MpcError::MalformedMessage("chunk row length mismatch".into()));
                }
                if self.delta.bit(i as u32) {
                    for (a, b) in t_i.iter_mut().zip(received.iter()) {
                        *a ^= b;
                    }
                }
                t_rows.push(t_i);
            }
            for r in 0..rows {
                let mut label = Label::ZERO;
                for (i, t_i) in t_rows.iter().enumerate() {
                    label.set_bit(i as u32, unpack_bit(t_i, r));
                }
                out[done + r] = label;
            }
            done += rows;
        }
        Ok(out)
    }

    /// Active-secure variant: extends `n + 256` rows, then verifies the
    /// receiver's KOS-style linear-combination proof before returning the
    /// first `n` rows.
    pub fn extend_active<C: Channel>(&mut self, n: usize, chan: &mut C) -> Result<Vec<Label>> {
        let total = n + ACTIVE_CHECK_ROWS;
        let rows = self.extend(total, chan)?;

        let seed2: [u8; 32] = chan
            .recv_data()?
            .try_into()
            .map_err(|_| MpcError::MalformedMessage("seed2 must be 32 bytes".into()))?;
        let chi = derive_chi(&seed2, total);

        let mut q0 = Label::ZERO;
        let mut q1 = Label::ZERO;
        for (row, c) in rows.iter().zip(chi.iter()) {
            let (lo, hi) = mul128(*c, *row);
            q0 ^= lo;
            q1 ^= hi;
        }

        let x = chan.recv_label()?;
        let t0 = chan.recv_label()?;
        let t1 = chan.recv_label()?;

        let (dx_lo, dx_hi) = mul128(x, self.delta);
        if (dx_lo ^ q0) != t0 || (dx_hi ^ q1) != t1 {
            return Err(MpcError::ExtensionCheckFailed("correlation check mismatch".into()));
        }
        Ok(rows[..n].to_vec())
    }
}

/// The OT-extension receiver: acts as base-OT *sender* during setup,
/// delivering `K` random wire pairs, then holds two PRGs (`g0`, `g1`) per
/// pair.
pub struct IknpReceiver {
    g0: Vec<Prg>,
    g1: Vec<Prg>,
}

impl IknpReceiver {
    pub fn new<R: RngCore + CryptoRng, C: Channel>(rng: &mut R, chan: &mut C) -> Result<Self> {
        let sender = CoSender::new(rng);
        let wires: Vec<(Label, Label)> =
            (0..K).map(|_| (Label::random(rng), Label::random(rng))).collect();
        sender.send_batch(&wires, chan)?;

        let g0 = wires.iter().map(|&(l0, _)| new_prg(&label_to_key(l0))).collect();
        let g1 = wires.iter().map(|&(_, l1)| new_prg(&label_to_key(l1))).collect();
        Ok(IknpReceiver { g0, g1 })
    }

    /// Extends to `bits.len()` correlated-OT outputs `result_r[r]`, sending
    /// the receiver's matrix to the sender chunk by chunk.
    pub fn extend<C: Channel>(&mut self, bits: &[bool], chan: &mut C) -> Result<Vec<Label>> {
        let n = bits.len();
        let mut out = vec![Label::ZERO; n];
        let mut done = 0;
        while done < n {
            let rows = (n - done).min(CHUNK_ROWS);
            let byte_rows = rows.div_ceil(8);
            let mut bbuf = vec![0u8; byte_rows];
            for r in 0..rows {
                pack_bit(&mut bbuf, r, bits[done + r]);
            }

            let mut chunk_rows = Vec::with_capacity(K);
            for (g0, g1) in self.g0.iter_mut().zip(self.g1.iter_mut()) {
                let chunk_i = prg_bytes(g0, byte_rows);
                let mut tmp = prg_bytes(g1, byte_rows);
                for j in 0..byte_rows {
                    tmp[j] ^= chunk_i[j] ^ bbuf[j];
                }
                chan.send_data(&tmp)?;
                chunk_rows.push(chunk_i);
            }
            chan.flush()?;

            for r in 0..rows {
                let mut label = Label::ZERO;
                for (i, chunk_i) in chunk_rows.iter().enumerate() {
                    label.set_bit(i as u32, unpack_bit(chunk_i, r));
                }
                out[done + r] = label;
            }
            done += rows;
        }
        Ok(out)
    }

    /// Active-secure variant: extends `bits` plus 256 random check rows,
    /// sends the KOS-style linear-combination proof, and returns only the
    /// `bits.len()` data-row outputs.
    pub fn extend_active<R: RngCore + CryptoRng, C: Channel>(
        &mut self,
        bits: &[bool],
        rng: &mut R,
        chan: &mut C,
    ) -> Result<Vec<Label>> {
        let n = bits.len();
        let mut extended_bits = bits.to_vec();
        extended_bits.extend((0..ACTIVE_CHECK_ROWS).map(|_| rng.next_u32() & 1 == 1));

        let rows = self.extend(&extended_bits, chan)?;

        let mut seed2 = [0u8; 32];
        rng.fill_bytes(&mut seed2);
        chan.send_data(&seed2)?;

        let chi = derive_chi(&seed2, extended_bits.len());

        let mut t0 = Label::ZERO;
        let mut t1 = Label::ZERO;
        for (row, c) in rows.iter().zip(chi.iter()) {
            let (lo, hi) = mul128(*c, *row);
            t0 ^= lo;
            t1 ^= hi;
        }
        let mut x = Label::ZERO;
        for (i, &b) in extended_bits.iter().enumerate() {
            if b {
                x ^= chi[i];
            }
        }
        chan.send_label(x)?;
        chan.send_label(t0)?;
        chan.send_label(t1)?;
        chan.flush()?;

        Ok(rows[..n].to_vec())
    }
}
