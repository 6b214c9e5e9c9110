//! Machine state capture at host-step boundaries.
//!
//! A snapshot collects everything the serial ring encodes architecturally:
//! the operand stack, the memory registers and the program code, plus the
//! running flag. It is the unit the host persists or ships over the wire.

use serde::{Deserialize, Serialize};

use crate::calculator::Calculator;
use crate::config::CalcModel;

/// Architectural machine state at a host-step boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub model: CalcModel,
    /// Was a user program running when the snapshot was taken?
    pub running: bool,
    /// X, Y, Z, T, X1; 12 packed BCD nibbles each.
    pub stack: [[u8; 6]; 5],
    /// Memory registers 0..9, A..D/E; 12 packed BCD nibbles each.
    pub registers: Vec<[u8; 6]>,
    /// Program code, one byte per step.
    pub code: Vec<u8>,
}

impl Calculator {
    /// Capture the architectural state. Only valid between host steps.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            model: self.model(),
            running: self.running(),
            stack: self.stack(),
            registers: self.registers(),
            code: self.code(),
        }
    }
}
