//! End-to-end session tests: garbler and evaluator, each on their own
//! thread, driving a real circuit over the in-memory channel pair.

use mpc_2pc_core::garbled_circuits::{Circuit, Gate};
use mpc_2pc_core::session::{run_evaluator, run_garbler, InputAssignment};
use mpc_2pc_core::transport::channel_pair;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::thread;

fn run_session(circuit: &Circuit, inputs: &InputAssignment, a: &[bool], b: &[bool]) -> Vec<bool> {
    let (mut gchan, mut echan) = channel_pair();
    let circuit_g = circuit.clone();
    let inputs_g = InputAssignment {
        garbler_wires: inputs.garbler_wires.clone(),
        evaluator_wires: inputs.evaluator_wires.clone(),
    };
    let a = a.to_vec();
    let handle = thread::spawn(move || {
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        run_garbler(&circuit_g, &inputs_g, &a, &mut rng, &mut gchan)
    });

    let mut erng = ChaCha20Rng::seed_from_u64(43);
    run_evaluator(circuit, inputs, b, &mut erng, &mut echan).unwrap();
    handle.join().unwrap().unwrap()
}

#[test]
fn and_or_inv_mixed_circuit() {
    // garbler holds a, b; evaluator holds c. output = (a AND b) OR (NOT c)
    let circuit = Circuit::new(
        6,
        vec![0, 1, 2],
        vec![5],
        vec![
            Gate::and(0, 1, 3, 0),
            Gate::inv(2, 4, 0),
            Gate::or(3, 4, 5, 1),
        ],
    )
    .unwrap();
    let inputs = InputAssignment { garbler_wires: vec![0, 1], evaluator_wires: vec![2] };

    for &a0 in &[false, true] {
        for &a1 in &[false, true] {
            for &c in &[false, true] {
                let out = run_session(&circuit, &inputs, &[a0, a1], &[c]);
                assert_eq!(out, vec![(a0 && a1) || !c], "a0={a0} a1={a1} c={c}");
            }
        }
    }
}

#[test]
fn one_bit_adder_circuit() {
    // sum = a XOR b XOR cin; cout = (a AND b) OR (cin AND (a XOR b))
    // wires: 0=a 1=b 2=cin(garbler-held for this test) 3=a^b 4=a&b 5=cin&(a^b) 6=cout 7=sum
    let circuit = Circuit::new(
        8,
        vec![0, 1, 2],
        vec![7, 6],
        vec![
            Gate::xor(0, 1, 3, 0),
            Gate::and(0, 1, 4, 0),
            Gate::and(2, 3, 5, 1),
            Gate::or(4, 5, 6, 2),
            Gate::xor(3, 2, 7, 1),
        ],
    )
    .unwrap();
    let inputs = InputAssignment { garbler_wires: vec![0, 1], evaluator_wires: vec![2] };

    for &a in &[false, true] {
        for &b in &[false, true] {
            for &cin in &[false, true] {
                let out = run_session(&circuit, &inputs, &[a, b], &[cin]);
                let sum = a ^ b ^ cin;
                let cout = (a && b) || (cin && (a ^ b));
                assert_eq!(out, vec![sum, cout], "a={a} b={b} cin={cin}");
            }
        }
    }
}
