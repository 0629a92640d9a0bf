//! Inter-stage pipeline latches.
//!
//! One payload struct per stage boundary, wrapped in a [`Latch`] that tracks
//! validity separately from the payload. Payloads latch even for bubbles:
//! the PC selector replays from the PC fields of killed slots, so those must
//! survive a kill.

use crate::isa::decode::MicroOp;

/// A registered stage boundary.
///
/// On a ready cycle the payload latches from the upstream stage's
/// computation; on a stalled cycle it holds. Validity is cleared by kills
/// and by bubbles injected below a locally-stalled stage.
#[derive(Clone, Debug, Default)]
pub struct Latch<T> {
    /// The slot holds a live instruction.
    pub valid: bool,
    /// The latched payload; meaningful PC fields even when not valid.
    pub p: T,
}

impl<T> Latch<T> {
    pub fn new(p: T) -> Self {
        Self { valid: false, p }
    }

    /// The registered update rule shared by every boundary.
    ///
    /// * Not stalled: accept the upstream payload and validity.
    /// * Stalled locally while downstream advances, or downstream kills the
    ///   held slot: inject a bubble.
    /// * Otherwise: hold.
    pub fn update(
        &mut self,
        self_stall: bool,
        down_stall: bool,
        down_kill: bool,
        p: T,
        valid: bool,
    ) {
        if !self_stall {
            self.p = p;
            self.valid = valid;
        } else if !down_stall || down_kill {
            self.valid = false;
        }
    }
}

/// A→F: the program counter sent to the fetch unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct AfPayload {
    pub pc: u32,
}

/// F→D: the fetched instruction word and any fetch fault.
#[derive(Clone, Copy, Debug, Default)]
pub struct FdPayload {
    pub pc: u32,
    pub instruction: u32,
    pub fetch_error: bool,
    /// Faulting word address captured from the instruction bus.
    pub fetch_badaddr: u32,
}

/// D→X: the decoded micro-op with bypassed operands and the prediction.
#[derive(Clone, Copy, Debug, Default)]
pub struct DxPayload {
    pub pc: u32,
    pub instruction: u32,
    pub fetch_error: bool,
    pub fetch_badaddr: u32,
    /// Decoded fields. `adder_sub` is pre-combined with the compare/branch
    /// contribution when the payload is built.
    pub op: MicroOp,
    /// Bypassed rs1 value.
    pub src1: u32,
    /// Bypassed rs2 value.
    pub src2: u32,
    pub branch_predict_taken: bool,
    pub branch_target: u32,
}

/// X→M: execution results.
#[derive(Clone, Copy, Debug, Default)]
pub struct XmPayload {
    pub pc: u32,
    pub instruction: u32,
    pub fetch_error: bool,
    pub fetch_badaddr: u32,
    pub illegal: bool,
    pub loadstore_misaligned: bool,
    pub ecall: bool,
    pub ebreak: bool,
    pub rd: u8,
    pub rd_we: bool,
    pub bypass_m: bool,
    pub funct3: u8,
    pub result: u32,
    pub shift: bool,
    pub load: bool,
    pub store: bool,
    pub store_data: u32,
    pub compare: bool,
    pub multiply: bool,
    pub divide: bool,
    pub condition_met: bool,
    pub branch_target: u32,
    pub branch_taken: bool,
    pub branch_predict_taken: bool,
    pub csr_we: bool,
    pub csr_result: u32,
    pub mret: bool,
}

/// M→W: the commit record.
#[derive(Clone, Copy, Debug, Default)]
pub struct MwPayload {
    pub pc: u32,
    pub rd: u8,
    pub rd_we: bool,
    pub funct3: u8,
    pub result: u32,
    pub load: bool,
    pub load_data: u32,
    pub csr_we: bool,
    pub csr_result: u32,
    pub multiply: bool,
    pub trap: bool,
}
