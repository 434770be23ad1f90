//! Streaming evaluator: mirrors [`super::garbler::Garbler`]'s gate-by-gate
//! encoding, consuming wire indices and ciphertext rows directly off a
//! [`Channel`] instead of requiring the whole garbled table up front.

use crate::garbled_circuits::circuit::{Operation, WireId};
use crate::garbled_circuits::prf::Prf;
use crate::label::Label;
use crate::transport::Channel;
use crate::{MpcError, Result};

/// Evaluates a streamed garbled circuit, holding exactly one active label
/// per wire.
pub struct Evaluator {
    prf: Prf,
    wires: Vec<Option<Label>>,
    idp: u32,
}

impl Evaluator {
    /// Reads the AES key off `chan` (sent first by the garbler) and
    /// allocates storage for `num_wires` wires.
    pub fn from_channel<C: Channel>(chan: &mut C, num_wires: u32) -> Result<Self> {
        let key_bytes = chan.recv_data()?;
        let key: [u8; 32] = key_bytes
            .try_into()
            .map_err(|_| MpcError::MalformedMessage("AES key must be 32 bytes".into()))?;
        Ok(Evaluator { prf: Prf::new(&key), wires: vec![None; num_wires as usize], idp: 0 })
    }

    /// Assigns the active label the evaluator holds for input wire `w`
    /// (obtained via OT or, for the garbler's own inputs, sent directly).
    pub fn set_input_label(&mut self, w: WireId, label: Label) {
        self.wires[w as usize] = Some(label);
    }

    fn get(&self, w: WireId) -> Result<Label> {
        self.wires[w as usize].ok_or_else(|| MpcError::LabelUnknown)
    }

    /// Consumes `num_gates` gates off `chan`, decrypting each in turn, and
    /// returns the active labels of `output_wires` at the end.
    pub fn evaluate<C: Channel>(
        &mut self,
        chan: &mut C,
        num_gates: usize,
        output_wires: &[WireId],
    ) -> Result<Vec<Label>> {
        for _ in 0..num_gates {
            self.evaluate_gate(chan)?;
        }
        output_wires.iter().map(|&w| self.get(w)).collect()
    }

    fn evaluate_gate<C: Channel>(&mut self, chan: &mut C) -> Result<()> {
        let (op, a, b, c) = read_gate_header(chan)?;
        match op {
            Operation::Xor | Operation::Xnor => {
                let result = self.get(a)? ^ self.get(b)?;
                self.wires[c as usize] = Some(result);
            }
            Operation::And => self.evaluate_and(chan, a, b, c)?,
            Operation::Or => self.evaluate_or(chan, a, b, c)?,
            Operation::Inv => self.evaluate_inv(chan, a, c)?,
            Operation::Count => {
                return Err(MpcError::InvariantViolation("Count is not a real operation".into()))
            }
        }
        Ok(())
    }

    fn evaluate_and<C: Channel>(&mut self, chan: &mut C, a: WireId, b: WireId, c: WireId) -> Result<()> {
        let a_lbl = self.get(a)?;
        let b_lbl = self.get(b)?;
        let j0 = self.idp;
        let j1 = self.idp + 1;
        self.idp += 2;

        let tg = chan.recv_label()?;
        let te = chan.recv_label()?;

        let mut wg = self.prf.encrypt_half(a_lbl, j0);
        if a_lbl.s() {
            wg ^= tg;
        }
        let mut we = self.prf.encrypt_half(b_lbl, j1);
        if b_lbl.s() {
            we ^= te ^ a_lbl;
        }

        self.wires[c as usize] = Some(wg ^ we);
        Ok(())
    }

    fn evaluate_or<C: Channel>(&mut self, chan: &mut C, a: WireId, b: WireId, c: WireId) -> Result<()> {
        let a_lbl = self.get(a)?;
        let b_lbl = self.get(b)?;
        let t = self.idp;
        self.idp += 1;

        let rows = [chan.recv_label()?, chan.recv_label()?, chan.recv_label()?];
        let idx = (a_lbl.s() as usize) * 2 + (b_lbl.s() as usize);
        let output = if idx == 0 {
            self.prf.decrypt(a_lbl, b_lbl, t, Label::ZERO)
        } else {
            self.prf.decrypt(a_lbl, b_lbl, t, rows[idx - 1])
        };
        self.wires[c as usize] = Some(output);
        Ok(())
    }

    fn evaluate_inv<C: Channel>(&mut self, chan: &mut C, a: WireId, c: WireId) -> Result<()> {
        let a_lbl = self.get(a)?;
        let t = self.idp;
        self.idp += 1;

        let row = chan.recv_label()?;
        let output = if !a_lbl.s() {
            self.prf.decrypt(a_lbl, Label::ZERO, t, Label::ZERO)
        } else {
            self.prf.decrypt(a_lbl, Label::ZERO, t, row)
        };
        self.wires[c as usize] = Some(output);
        Ok(())
    }
}

/// Reads the one-byte op header plus wire indices written by
/// [`super::garbler::write_gate_header`].
fn read_gate_header<C: Channel>(chan: &mut C) -> Result<(Operation, WireId, WireId, WireId)> {
    let op_byte = chan.recv_byte()?;
    let op = Operation::from_u8(op_byte & 0x0f)?;
    let small = op_byte & (1 << 4) != 0;

    let read_idx = |chan: &mut C| -> Result<WireId> {
        if small {
            let mut b = [0u8; 2];
            chan.read_bytes(&mut b)?;
            Ok(u16::from_be_bytes(b) as WireId)
        } else {
            chan.recv_u32()
        }
    };

    let input0 = read_idx(chan)?;
    let input1 = if op.is_binary() { read_idx(chan)? } else { 0 };
    let output = read_idx(chan)?;
    Ok((op, input0, input1, output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::garbled_circuits::circuit::{Circuit, Gate};
    use crate::garbled_circuits::garbler::Garbler;
    use crate::transport::channel_pair;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::thread;

    /// Garbles and evaluates `circuit` for every combination of `n_inputs`
    /// boolean input bits, asserting the evaluator's output labels match
    /// whichever of the garbler's `(L0, L1)` pair the plaintext truth table
    /// predicts.
    fn check_circuit(circuit: Circuit, n_inputs: usize, truth: impl Fn(&[bool]) -> Vec<bool>) {
        for combo in 0..(1u32 << n_inputs) {
            let bits: Vec<bool> = (0..n_inputs).map(|i| (combo >> i) & 1 == 1).collect();
            let expected = truth(&bits);

            let mut rng = ChaCha20Rng::seed_from_u64(100 + combo as u64);
            let mut garbler = Garbler::new(&circuit, &mut rng);
            let input_labels: Vec<Label> = bits
                .iter()
                .enumerate()
                .map(|(i, &bit)| {
                    let (l0, l1) = garbler.wire_labels(i as WireId);
                    if bit { l1 } else { l0 }
                })
                .collect();
            let output_l0: Vec<Label> = circuit.output_wires.iter().map(|&w| garbler.wire_labels(w).0).collect();
            let delta = garbler.delta();

            let (mut gchan, mut echan) = channel_pair();
            let circuit_for_garbler = circuit.clone();
            let handle = thread::spawn(move || garbler.garble(&circuit_for_garbler, &mut gchan));

            let mut evaluator = Evaluator::from_channel(&mut echan, circuit.num_wires).unwrap();
            for (i, &label) in input_labels.iter().enumerate() {
                evaluator.set_input_label(i as WireId, label);
            }
            let outputs = evaluator
                .evaluate(&mut echan, circuit.num_gates(), &circuit.output_wires)
                .unwrap();
            handle.join().unwrap().unwrap();

            for (i, out) in outputs.iter().enumerate() {
                let expected_label = if expected[i] { output_l0[i] ^ delta } else { output_l0[i] };
                assert_eq!(*out, expected_label, "bits={:?} output #{i}", bits);
            }
        }
    }

    #[test]
    fn and_gate_round_trips() {
        let circuit = Circuit::new(3, vec![0, 1], vec![2], vec![Gate::and(0, 1, 2, 0)]).unwrap();
        check_circuit(circuit, 2, |b| vec![b[0] && b[1]]);
    }

    #[test]
    fn xor_and_xnor_round_trip() {
        let circuit = Circuit::new(
            4,
            vec![0, 1],
            vec![2, 3],
            vec![Gate::xor(0, 1, 2, 0), Gate::xnor(0, 1, 3, 0)],
        )
        .unwrap();
        check_circuit(circuit, 2, |b| vec![b[0] ^ b[1], !(b[0] ^ b[1])]);
    }

    #[test]
    fn or_gate_round_trips() {
        let circuit = Circuit::new(3, vec![0, 1], vec![2], vec![Gate::or(0, 1, 2, 0)]).unwrap();
        check_circuit(circuit, 2, |b| vec![b[0] || b[1]]);
    }

    #[test]
    fn inv_gate_round_trips() {
        let circuit = Circuit::new(2, vec![0], vec![1], vec![Gate::inv(0, 1, 0)]).unwrap();
        check_circuit(circuit, 1, |b| vec![!b[0]]);
    }

    #[test]
    fn mixed_circuit_round_trips() {
        // (a AND b) OR (NOT c)
        let circuit = Circuit::new(
            6,
            vec![0, 1, 2],
            vec![5],
            vec![Gate::and(0, 1, 3, 0), Gate::inv(2, 4, 0), Gate::or(3, 4, 5, 1)],
        )
        .unwrap();
        check_circuit(circuit, 3, |b| vec![(b[0] && b[1]) || !b[2]]);
    }
}
