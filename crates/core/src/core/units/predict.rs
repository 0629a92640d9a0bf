//! Static branch predictor.
//!
//! Predicts at decode: direct jumps are taken; conditional branches are
//! taken when they point backwards. The target is always `pc + imm`. A
//! prediction whose computed target is misaligned is squashed so that the
//! misalignment resolves at X and traps at M instead of redirecting fetch.

use crate::isa::decode::MicroOp;

/// Decode-stage prediction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Prediction {
    pub taken: bool,
    pub target: u32,
}

/// Predicts one decoded instruction.
pub fn predict(op: &MicroOp, pc: u32) -> Prediction {
    let target = pc.wrapping_add(op.immediate as u32);
    let taken = if target & 0b11 != 0 {
        false
    } else if op.branch {
        // Backward conditional branches are predicted taken, forward ones
        // not taken.
        op.immediate < 0
    } else {
        // Direct jumps are taken; indirect jumps are not predicted.
        op.jump && !op.rs1_re
    };
    Prediction { taken, target }
}
