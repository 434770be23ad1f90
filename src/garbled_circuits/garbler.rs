//! Streaming garbler: walks a circuit's gates in order, assigns wire labels
//! and writes each gate's ciphertext rows to a [`Channel`] as it goes,
//! rather than materializing the whole garbled table in memory.

use rand::{CryptoRng, RngCore};

use crate::garbled_circuits::circuit::{Circuit, Gate, Operation, WireId};
use crate::garbled_circuits::prf::Prf;
use crate::label::Label;
use crate::transport::Channel;
use crate::{MpcError, Result};

/// Garbles a circuit and streams its gates over a [`Channel`].
///
/// Row-reduction for OR/INV always omits the physical point-and-permute slot
/// at select bits `(sa=0, sb=0)` — a fixed protocol constant, not data
/// dependent. Which *semantic* input combination lands there depends on each
/// wire's private select bit, which the evaluator never learns, so fixing
/// the omitted slot at a constant physical position leaks nothing; making it
/// data-dependent would let the evaluator recover `pa`/`pb` by observing
/// which slot was skipped. See `DESIGN.md` for the full argument.
pub struct Garbler {
    key: [u8; 32],
    prf: Prf,
    delta: Label,
    wire_l0: Vec<Label>,
    idp: u32,
}

impl Garbler {
    /// Samples a fresh AES key and global offset, and random labels for
    /// every input wire.
    pub fn new<R: RngCore + CryptoRng>(circuit: &Circuit, rng: &mut R) -> Self {
        let mut key = [0u8; 32];
        rng.fill_bytes(&mut key);
        let prf = Prf::new(&key);
        let delta = Label::random_delta(rng);
        let mut wire_l0 = vec![Label::ZERO; circuit.num_wires as usize];
        for &w in &circuit.input_wires {
            wire_l0[w as usize] = Label::random(rng);
        }
        Garbler { key, prf, delta, wire_l0, idp: 0 }
    }

    pub fn delta(&self) -> Label {
        self.delta
    }

    pub fn key(&self) -> [u8; 32] {
        self.key
    }

    /// The two labels of wire `w`: `(L0, L1 = L0 ^ delta)`.
    pub fn wire_labels(&self, w: WireId) -> (Label, Label) {
        let l0 = self.wire_l0[w as usize];
        (l0, l0 ^ self.delta)
    }

    #[inline]
    fn label_with_select(&self, w: WireId, want_s: bool) -> Label {
        let l0 = self.wire_l0[w as usize];
        if l0.s() == want_s { l0 } else { l0 ^ self.delta }
    }

    /// Sends the AES key, then streams every gate's wire-format encoding and
    /// ciphertext rows in gate order. Returns the `L0` labels of the output
    /// wires, for later output resolution.
    pub fn garble<C: Channel>(&mut self, circuit: &Circuit, chan: &mut C) -> Result<Vec<Label>> {
        chan.send_data(&self.key)?;
        for gate in &circuit.gates {
            self.garble_gate(circuit, gate, chan)?;
        }
        chan.flush()?;
        Ok(circuit.output_wires.iter().map(|&w| self.wire_l0[w as usize]).collect())
    }

    fn garble_gate<C: Channel>(&mut self, circuit: &Circuit, gate: &Gate, chan: &mut C) -> Result<()> {
        write_gate_header(circuit, gate, chan)?;

        match gate.op {
            Operation::Xor => {
                let (a0, _) = self.wire_labels(gate.input0);
                let (b0, _) = self.wire_labels(gate.input1);
                self.wire_l0[gate.output as usize] = a0 ^ b0;
            }
            Operation::Xnor => {
                let (a0, _) = self.wire_labels(gate.input0);
                let (b0, _) = self.wire_labels(gate.input1);
                // XNOR's L0 is free-XOR's L1: swap by XORing in delta.
                self.wire_l0[gate.output as usize] = (a0 ^ b0) ^ self.delta;
            }
            Operation::And => self.garble_and(gate, chan)?,
            Operation::Or => self.garble_binary_reduced(gate, chan, |a, b| a || b)?,
            Operation::Inv => self.garble_inv(gate, chan)?,
            Operation::Count => {
                return Err(MpcError::InvariantViolation("Count is not a real operation".into()))
            }
        }
        Ok(())
    }

    fn garble_and<C: Channel>(&mut self, gate: &Gate, chan: &mut C) -> Result<()> {
        let (a0, a1) = self.wire_labels(gate.input0);
        let (b0, b1) = self.wire_labels(gate.input1);
        let delta = self.delta;
        let j0 = self.idp;
        let j1 = self.idp + 1;
        self.idp += 2;

        let pa = a0.s();
        let pb = b0.s();

        let mut tg = self.prf.encrypt_half(a0, j0) ^ self.prf.encrypt_half(a1, j0);
        if pb {
            tg ^= delta;
        }
        let mut wg0 = self.prf.encrypt_half(a0, j0);
        if pa {
            wg0 ^= tg;
        }

        let te = self.prf.encrypt_half(b0, j1) ^ self.prf.encrypt_half(b1, j1) ^ a0;
        let mut we0 = self.prf.encrypt_half(b0, j1);
        if pb {
            we0 ^= te ^ a0;
        }

        let c0 = wg0 ^ we0;
        self.wire_l0[gate.output as usize] = c0;

        chan.send_label(tg)?;
        chan.send_label(te)?;
        Ok(())
    }

    /// Shared row-reduced construction for binary ops (OR) with 4 physical
    /// slots, omitting the fixed `(0,0)` select-bit slot.
    fn garble_binary_reduced<C: Channel>(
        &mut self,
        gate: &Gate,
        chan: &mut C,
        truth: impl Fn(bool, bool) -> bool,
    ) -> Result<()> {
        let t = self.idp;
        self.idp += 1;
        let a = gate.input0;
        let b = gate.input1;

        // Resolve the omitted slot (0,0) first: decide L0(c)/L1(c).
        let label_a0 = self.label_with_select(a, false);
        let label_b0 = self.label_with_select(b, false);
        let pa = self.wire_l0[a as usize].s();
        let pb = self.wire_l0[b as usize].s();
        let bit_for_slot00 = truth(pa, pb);

        let solved = self.prf.decrypt(label_a0, label_b0, t, Label::ZERO);
        let (l0c, l1c) = if bit_for_slot00 { (solved ^ self.delta, solved) } else { (solved, solved ^ self.delta) };
        self.wire_l0[gate.output as usize] = l0c;

        for &(sa, sb) in &[(false, true), (true, false), (true, true)] {
            let label_a = self.label_with_select(a, sa);
            let label_b = self.label_with_select(b, sb);
            let ba = sa ^ pa;
            let bb = sb ^ pb;
            let out_label = if truth(ba, bb) { l1c } else { l0c };
            let row = self.prf.encrypt(label_a, label_b, out_label, t);
            chan.send_label(row)?;
        }
        Ok(())
    }

    fn garble_inv<C: Channel>(&mut self, gate: &Gate, chan: &mut C) -> Result<()> {
        let t = self.idp;
        self.idp += 1;
        let a = gate.input0;
        let pa = self.wire_l0[a as usize].s();

        let label_a0 = self.label_with_select(a, false);
        let bit_for_slot0 = !pa;
        let solved = self.prf.decrypt(label_a0, Label::ZERO, t, Label::ZERO);
        let (l0c, l1c) = if bit_for_slot0 { (solved ^ self.delta, solved) } else { (solved, solved ^ self.delta) };
        self.wire_l0[gate.output as usize] = l0c;

        let label_a1 = self.label_with_select(a, true);
        let ba1 = true ^ pa;
        let out_label = if !ba1 { l1c } else { l0c };
        let row = self.prf.encrypt(label_a1, Label::ZERO, out_label, t);
        chan.send_label(row)
    }
}

/// Writes the one-byte op header plus the gate's wire indices, sized 16 or
/// 32 bits depending on whether every index fits in 16 bits.
pub(crate) fn write_gate_header<C: Channel>(circuit: &Circuit, gate: &Gate, chan: &mut C) -> Result<()> {
    let a_tmp = circuit.is_temporary(gate.input0);
    let b_tmp = gate.op.is_binary() && circuit.is_temporary(gate.input1);
    let c_tmp = circuit.is_temporary(gate.output);

    let max_idx = if gate.op.is_binary() {
        gate.input0.max(gate.input1).max(gate.output)
    } else {
        gate.input0.max(gate.output)
    };
    let small = max_idx < (1 << 16);

    let mut op_byte = gate.op as u8;
    if a_tmp {
        op_byte |= 1 << 7;
    }
    if b_tmp {
        op_byte |= 1 << 6;
    }
    if c_tmp {
        op_byte |= 1 << 5;
    }
    if small {
        op_byte |= 1 << 4;
    }
    chan.send_byte(op_byte)?;

    let write_idx = |chan: &mut C, idx: WireId| -> Result<()> {
        if small {
            chan.write_bytes(&(idx as u16).to_be_bytes())
        } else {
            chan.send_u32(idx)
        }
    };

    write_idx(chan, gate.input0)?;
    if gate.op.is_binary() {
        write_idx(chan, gate.input1)?;
    }
    write_idx(chan, gate.output)
}
