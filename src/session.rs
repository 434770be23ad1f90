//! Session glue: negotiates an IKNP-extended OT instance for the
//! evaluator's input labels, streams the garbled circuit, and resolves the
//! evaluator's returned output labels back to cleartext bits — the
//! end-to-end flow described for one 2PC run.

use rand::{CryptoRng, RngCore};
use tracing::{debug, warn};

use crate::garbled_circuits::circuit::{Circuit, WireId};
use crate::garbled_circuits::evaluator::Evaluator;
use crate::garbled_circuits::garbler::Garbler;
use crate::label::Label;
use crate::oblivious_transfer::{
    ChosenOtReceiver, ChosenOtSender, IknpReceiver, IknpSender, RandomOtReceiver,
};
use crate::transport::Channel;
use crate::{MpcError, Result};

/// Splits a circuit's input wires between the two parties. Every input wire
/// must appear in exactly one of these lists.
pub struct InputAssignment {
    pub garbler_wires: Vec<WireId>,
    pub evaluator_wires: Vec<WireId>,
}

/// Runs the garbler side of one session: sends the MITCCRH seed, delivers
/// the evaluator's input labels via IKNP-extended chosen-message OT, sends
/// its own input labels directly, streams the garbled circuit, and resolves
/// the evaluator's returned output labels back to bits.
pub fn run_garbler<R: RngCore + CryptoRng, C: Channel>(
    circuit: &Circuit,
    inputs: &InputAssignment,
    garbler_bits: &[bool],
    rng: &mut R,
    chan: &mut C,
) -> Result<Vec<bool>> {
    if garbler_bits.len() != inputs.garbler_wires.len() {
        return Err(MpcError::InvariantViolation(
            "garbler_bits length must match garbler_wires length".into(),
        ));
    }

    let mut garbler = Garbler::new(circuit, rng);
    debug!(gates = circuit.num_gates(), wires = circuit.num_wires, "starting garble session");

    let seed = Label::random(rng);
    chan.send_label(seed)?;
    chan.flush()?;

    let iknp = IknpSender::new(rng, chan, None)?;
    let mut cot = ChosenOtSender::new(iknp);
    let evaluator_pairs: Vec<(Label, Label)> =
        inputs.evaluator_wires.iter().map(|&w| garbler.wire_labels(w)).collect();
    cot.send(&evaluator_pairs, seed, chan)?;

    for (&w, &bit) in inputs.garbler_wires.iter().zip(garbler_bits.iter()) {
        let (l0, l1) = garbler.wire_labels(w);
        chan.send_label(if bit { l1 } else { l0 })?;
    }
    chan.flush()?;

    garbler.garble(circuit, chan)?;

    let mut bits = Vec::with_capacity(circuit.output_wires.len());
    for &w in &circuit.output_wires {
        let (l0, l1) = garbler.wire_labels(w);
        let received = chan.recv_label()?;
        if received == l0 {
            bits.push(false);
        } else if received == l1 {
            bits.push(true);
        } else {
            warn!(wire = w, "output label matched neither L0 nor L1");
            return Err(MpcError::LabelUnknown);
        }
    }
    debug!(outputs = bits.len(), "garble session complete");
    Ok(bits)
}

/// Runs the evaluator side of one session, mirroring [`run_garbler`]
/// message-for-message.
pub fn run_evaluator<R: RngCore + CryptoRng, C: Channel>(
    circuit: &Circuit,
    inputs: &InputAssignment,
    evaluator_bits: &[bool],
    rng: &mut R,
    chan: &mut C,
) -> Result<()> {
    if evaluator_bits.len() != inputs.evaluator_wires.len() {
        return Err(MpcError::InvariantViolation(
            "evaluator_bits length must match evaluator_wires length".into(),
        ));
    }

    let seed = chan.recv_label()?;

    let iknp = IknpReceiver::new(rng, chan)?;
    let mut cot = ChosenOtReceiver::new(RandomOtReceiver::new(iknp));
    let evaluator_labels = cot.receive(evaluator_bits, seed, chan)?;

    let mut evaluator = Evaluator::from_channel(chan, circuit.num_wires)?;
    for (&w, &label) in inputs.evaluator_wires.iter().zip(evaluator_labels.iter()) {
        evaluator.set_input_label(w, label);
    }
    for &w in &inputs.garbler_wires {
        let label = chan.recv_label()?;
        evaluator.set_input_label(w, label);
    }

    let outputs = evaluator.evaluate(chan, circuit.num_gates(), &circuit.output_wires)?;
    for label in outputs {
        chan.send_label(label)?;
    }
    chan.flush()
}
