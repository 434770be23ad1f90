//! Small helpers shared across the protocol layers: generic number theory,
//! thread-RNG byte/integer generation, and `bincode`-backed serialization.

pub mod math;
pub mod random;
pub mod serialization;

pub use math::*;
pub use random::*;
pub use serialization::*;
