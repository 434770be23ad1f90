//! Circuit model: gates and the static circuit they make up.
//!
//! Wires are dense integer indices into a flat array, never shared mutable
//! references — garbling and evaluation both index `wires[..]` by `u32` id.

use serde::{Deserialize, Serialize};

use crate::{MpcError, Result};

pub type WireId = u32;

/// The boolean operation a [`Gate`] computes. `Count` is a sentinel marking
/// the end of the enumeration, not a real operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum Operation {
    Xor = 0,
    Xnor = 1,
    And = 2,
    Or = 3,
    Inv = 4,
    Count = 5,
}

impl Operation {
    pub fn from_u8(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Operation::Xor),
            1 => Ok(Operation::Xnor),
            2 => Ok(Operation::And),
            3 => Ok(Operation::Or),
            4 => Ok(Operation::Inv),
            _ => Err(MpcError::MalformedMessage(format!("unknown op byte {v}"))),
        }
    }

    /// Number of ciphertext rows a garbled instance of this op emits.
    pub fn row_count(self) -> usize {
        match self {
            Operation::Xor | Operation::Xnor => 0,
            Operation::And => 2,
            Operation::Or => 3,
            Operation::Inv => 1,
            Operation::Count => 0,
        }
    }

    /// Whether the op reads a second input wire (everything but `Inv`).
    pub fn is_binary(self) -> bool {
        !matches!(self, Operation::Inv)
    }
}

/// One gate: two input wires (the second unused for `Inv`), one output wire,
/// an operation, and a scheduling level such that every gate at level `L`
/// depends only on gates at levels `< L`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub input0: WireId,
    pub input1: WireId,
    pub output: WireId,
    pub op: Operation,
    pub level: u32,
}

impl Gate {
    pub fn and(input0: WireId, input1: WireId, output: WireId, level: u32) -> Self {
        Gate { input0, input1, output, op: Operation::And, level }
    }

    pub fn or(input0: WireId, input1: WireId, output: WireId, level: u32) -> Self {
        Gate { input0, input1, output, op: Operation::Or, level }
    }

    pub fn xor(input0: WireId, input1: WireId, output: WireId, level: u32) -> Self {
        Gate { input0, input1, output, op: Operation::Xor, level }
    }

    pub fn xnor(input0: WireId, input1: WireId, output: WireId, level: u32) -> Self {
        Gate { input0, input1, output, op: Operation::Xnor, level }
    }

    pub fn inv(input0: WireId, output: WireId, level: u32) -> Self {
        Gate { input0, input1: 0, output, op: Operation::Inv, level }
    }
}

/// Statistics about a circuit, kept for reporting / sizing buffers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitStats {
    pub and_count: usize,
    pub or_count: usize,
    pub inv_count: usize,
    pub xor_count: usize,
}

/// A static boolean circuit. Wires `0..num_inputs` are inputs; the last
/// `num_outputs` wires (by id, not necessarily contiguous with inputs) are
/// outputs; the remainder are internal. Gates must already be topologically
/// sorted and leveled by the caller — this type does not compute levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Circuit {
    pub num_wires: u32,
    pub input_wires: Vec<WireId>,
    pub output_wires: Vec<WireId>,
    pub gates: Vec<Gate>,
    /// Count of wires, numbered from the top of `0..num_wires`, that belong
    /// to the recyclable scratch pool rather than the persistent range. Zero
    /// means every wire is persistent.
    pub scratch_wires: u32,
}

impl Circuit {
    pub fn new(num_wires: u32, input_wires: Vec<WireId>, output_wires: Vec<WireId>, gates: Vec<Gate>) -> Result<Self> {
        Self::with_scratch(num_wires, input_wires, output_wires, gates, 0)
    }

    pub fn with_scratch(
        num_wires: u32,
        input_wires: Vec<WireId>,
        output_wires: Vec<WireId>,
        gates: Vec<Gate>,
        scratch_wires: u32,
    ) -> Result<Self> {
        for w in input_wires.iter().chain(output_wires.iter()) {
            if *w >= num_wires {
                return Err(MpcError::InvariantViolation(format!(
                    "wire index {w} out of range for {num_wires} wires"
                )));
            }
        }
        for g in &gates {
            if g.output >= num_wires || g.input0 >= num_wires || (g.op.is_binary() && g.input1 >= num_wires) {
                return Err(MpcError::InvariantViolation("gate references out-of-range wire".into()));
            }
        }
        if scratch_wires > num_wires {
            return Err(MpcError::InvariantViolation("scratch_wires exceeds num_wires".into()));
        }
        Ok(Circuit { num_wires, input_wires, output_wires, gates, scratch_wires })
    }

    /// Whether wire `id` belongs to the recyclable scratch pool.
    #[inline]
    pub fn is_temporary(&self, id: WireId) -> bool {
        id >= self.num_wires - self.scratch_wires
    }

    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn stats(&self) -> CircuitStats {
        let mut s = CircuitStats::default();
        for g in &self.gates {
            match g.op {
                Operation::And => s.and_count += 1,
                Operation::Or => s.or_count += 1,
                Operation::Inv => s.inv_count += 1,
                Operation::Xor | Operation::Xnor => s.xor_count += 1,
                Operation::Count => {}
            }
        }
        s
    }

    /// Highest level present among the circuit's gates, or `None` if empty.
    pub fn max_level(&self) -> Option<u32> {
        self.gates.iter().map(|g| g.level).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and_circuit() -> Circuit {
        // wires: 0,1 inputs; 2 = a AND b, output
        Circuit::new(3, vec![0, 1], vec![2], vec![Gate::and(0, 1, 2, 0)]).unwrap()
    }

    #[test]
    fn rejects_out_of_range_wire() {
        let err = Circuit::new(2, vec![0, 1], vec![1], vec![Gate::and(0, 1, 2, 0)]);
        assert!(err.is_err());
    }

    #[test]
    fn stats_count_and_gate() {
        let c = and_circuit();
        let stats = c.stats();
        assert_eq!(stats.and_count, 1);
        assert_eq!(stats.xor_count, 0);
    }
}
