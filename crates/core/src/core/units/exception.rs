//! Exception unit.
//!
//! Trap selection and delivery, co-designed with the CSR file:
//! 1. **Priority encode at M:** synchronous causes in architectural order
//!    (fetch-misaligned first, ecall last); a pending-and-enabled interrupt
//!    is taken only when no exception fires, tagging the instruction at M.
//! 2. **M→W staging:** the selected cause travels with the instruction so
//!    the CSR state update happens at the commit boundary.
//! 3. **Commit at W:** trap entry saves mstatus.mie into mpie, clears mie,
//!    and writes mepc/mcause/mtval; MRET restores mie from mpie.
//!
//! The PC redirect itself is performed at M by the PC selector using the
//! current mtvec/mepc; the decode-stage CSR stall guarantees those are
//! stable while a trap or MRET is in flight.

use crate::common::Trap;
use crate::core::arch::csr::CsrFile;

/// M-stage exception inputs, gathered from the X/M payload and the
/// load/store unit.
#[derive(Clone, Copy, Debug, Default)]
pub struct MExcInputs {
    pub valid: bool,
    pub pc: u32,
    pub instruction: u32,
    /// A taken branch or jump whose target has a misaligned low pair.
    pub fetch_misaligned: bool,
    pub fetch_error: bool,
    /// Faulting instruction-bus word address.
    pub fetch_badaddr: u32,
    pub illegal: bool,
    pub ebreak: bool,
    pub ecall: bool,
    pub load: bool,
    pub store: bool,
    /// The access at M is misaligned for its width.
    pub misaligned: bool,
    pub load_error: bool,
    pub store_error: bool,
    /// Faulting data-bus word address.
    pub loadstore_badaddr: u32,
    /// The computed effective address.
    pub result: u32,
    /// The resolved branch target.
    pub branch_target: u32,
}

/// Exception unit state: the M→W staging registers.
#[derive(Debug, Default)]
pub struct ExceptionUnit {
    w_trap: Option<Trap>,
    w_mret: bool,
    w_pc: u32,
}

impl ExceptionUnit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the trap raised by the instruction at M, if any.
    pub fn m_trap(&self, csrf: &CsrFile, m: &MExcInputs) -> Option<Trap> {
        if !m.valid {
            return None;
        }
        if m.fetch_misaligned {
            Some(Trap::FetchMisaligned(m.branch_target))
        } else if m.fetch_error {
            Some(Trap::FetchAccessFault(m.fetch_badaddr << 2))
        } else if m.illegal {
            Some(Trap::IllegalInstruction(m.instruction))
        } else if m.ebreak {
            Some(Trap::Breakpoint(m.pc))
        } else if m.load && m.misaligned {
            Some(Trap::LoadMisaligned(m.result))
        } else if m.load_error {
            Some(Trap::LoadAccessFault(m.loadstore_badaddr << 2))
        } else if m.store && m.misaligned {
            Some(Trap::StoreMisaligned(m.result))
        } else if m.store_error {
            Some(Trap::StoreAccessFault(m.loadstore_badaddr << 2))
        } else if m.ecall {
            Some(Trap::EnvironmentCallFromMMode)
        } else {
            csrf.pending_interrupt()
        }
    }

    /// Latches the M-stage selection into the W staging registers; call on
    /// every un-stalled M cycle.
    pub fn latch_mw(&mut self, trap: Option<Trap>, mret: bool, pc: u32) {
        self.w_trap = trap;
        self.w_mret = mret;
        self.w_pc = pc;
    }

    /// Applies the staged trap entry or MRET at the commit boundary.
    ///
    /// Returns the delivered trap for statistics and tracing.
    pub fn commit_w(&mut self, csrf: &mut CsrFile, w_valid: bool) -> Option<Trap> {
        if !w_valid {
            return None;
        }
        if let Some(trap) = self.w_trap {
            csrf.trap_entry(self.w_pc, &trap);
            tracing::trace!(
                target: "rv32pipe_core::trap",
                pc = format_args!("{:#010x}", self.w_pc),
                %trap,
                "trap entry"
            );
            return Some(trap);
        }
        if self.w_mret {
            csrf.mret();
        }
        None
    }
}
