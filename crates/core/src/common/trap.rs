//! Trap causes.
//!
//! This module defines the architectural trap model of the core. It provides:
//! 1. **Cause representation:** one variant per synchronous exception and
//!    machine-level interrupt, carrying the value that lands in `mtval`.
//! 2. **Encoding:** the `mcause` code (with the interrupt bit) and the
//!    per-cause `mtval` selection.
//!
//! Traps are not host-side errors; they flow through the pipeline with the
//! instruction that raised them and are delivered at writeback.

use std::fmt;

/// RISC-V machine-mode trap causes.
///
/// Synchronous exceptions carry the faulting address, instruction word, or
/// program counter as their associated value, matching what `mtval` must hold
/// for that cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trap {
    /// Branch or jump target with a misaligned low two bits. Carries the
    /// target address.
    FetchMisaligned(u32),
    /// Bus error on the instruction bus. Carries the faulting byte address.
    FetchAccessFault(u32),
    /// Undecodable or unsupported instruction. Carries the instruction word.
    IllegalInstruction(u32),
    /// `EBREAK`. Carries the program counter.
    Breakpoint(u32),
    /// Misaligned sub-word load. Carries the effective address.
    LoadMisaligned(u32),
    /// Bus error on a load. Carries the faulting byte address.
    LoadAccessFault(u32),
    /// Misaligned sub-word store. Carries the effective address.
    StoreMisaligned(u32),
    /// Bus error on a store. Carries the faulting byte address.
    StoreAccessFault(u32),
    /// `ECALL` from machine mode.
    EnvironmentCallFromMMode,
    /// Machine software interrupt.
    MachineSoftwareInterrupt,
    /// Machine timer interrupt.
    MachineTimerInterrupt,
    /// Machine external interrupt.
    MachineExternalInterrupt,
    /// Fast interrupt line 0..15, mapped to cause codes 16..31.
    FastInterrupt(u8),
}

/// Exception cause codes (`mcause` with the interrupt bit clear).
pub mod cause {
    pub const FETCH_MISALIGNED: u32 = 0;
    pub const FETCH_ACCESS_FAULT: u32 = 1;
    pub const ILLEGAL_INSTRUCTION: u32 = 2;
    pub const BREAKPOINT: u32 = 3;
    pub const LOAD_MISALIGNED: u32 = 4;
    pub const LOAD_ACCESS_FAULT: u32 = 5;
    pub const STORE_MISALIGNED: u32 = 6;
    pub const STORE_ACCESS_FAULT: u32 = 7;
    pub const ECALL_FROM_M: u32 = 11;

    // Interrupt cause codes (`mcause` with the interrupt bit set).
    pub const M_SOFTWARE_INTERRUPT: u32 = 3;
    pub const M_TIMER_INTERRUPT: u32 = 7;
    pub const M_EXTERNAL_INTERRUPT: u32 = 11;
    pub const FAST_INTERRUPT_BASE: u32 = 16;

    /// Interrupt bit of `mcause`.
    pub const INTERRUPT: u32 = 1 << 31;
}

impl Trap {
    /// Returns true for asynchronous (interrupt) causes.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            Trap::MachineSoftwareInterrupt
                | Trap::MachineTimerInterrupt
                | Trap::MachineExternalInterrupt
                | Trap::FastInterrupt(_)
        )
    }

    /// The value written to `mcause` on trap entry.
    pub fn mcause(&self) -> u32 {
        match self {
            Trap::FetchMisaligned(_) => cause::FETCH_MISALIGNED,
            Trap::FetchAccessFault(_) => cause::FETCH_ACCESS_FAULT,
            Trap::IllegalInstruction(_) => cause::ILLEGAL_INSTRUCTION,
            Trap::Breakpoint(_) => cause::BREAKPOINT,
            Trap::LoadMisaligned(_) => cause::LOAD_MISALIGNED,
            Trap::LoadAccessFault(_) => cause::LOAD_ACCESS_FAULT,
            Trap::StoreMisaligned(_) => cause::STORE_MISALIGNED,
            Trap::StoreAccessFault(_) => cause::STORE_ACCESS_FAULT,
            Trap::EnvironmentCallFromMMode => cause::ECALL_FROM_M,
            Trap::MachineSoftwareInterrupt => cause::INTERRUPT | cause::M_SOFTWARE_INTERRUPT,
            Trap::MachineTimerInterrupt => cause::INTERRUPT | cause::M_TIMER_INTERRUPT,
            Trap::MachineExternalInterrupt => cause::INTERRUPT | cause::M_EXTERNAL_INTERRUPT,
            Trap::FastInterrupt(n) => {
                cause::INTERRUPT | (cause::FAST_INTERRUPT_BASE + u32::from(*n))
            }
        }
    }

    /// The value written to `mtval` on trap entry.
    ///
    /// Faulting address for misaligned/access faults, the instruction word
    /// for illegal instructions, the program counter for breakpoints, zero
    /// otherwise.
    pub fn mtval(&self) -> u32 {
        match self {
            Trap::FetchMisaligned(addr)
            | Trap::FetchAccessFault(addr)
            | Trap::LoadMisaligned(addr)
            | Trap::LoadAccessFault(addr)
            | Trap::StoreMisaligned(addr)
            | Trap::StoreAccessFault(addr) => *addr,
            Trap::IllegalInstruction(insn) => *insn,
            Trap::Breakpoint(pc) => *pc,
            Trap::EnvironmentCallFromMMode
            | Trap::MachineSoftwareInterrupt
            | Trap::MachineTimerInterrupt
            | Trap::MachineExternalInterrupt
            | Trap::FastInterrupt(_) => 0,
        }
    }
}

impl fmt::Display for Trap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trap::FetchMisaligned(addr) => write!(f, "FetchMisaligned({addr:#x})"),
            Trap::FetchAccessFault(addr) => write!(f, "FetchAccessFault({addr:#x})"),
            Trap::IllegalInstruction(insn) => write!(f, "IllegalInstruction({insn:#010x})"),
            Trap::Breakpoint(pc) => write!(f, "Breakpoint({pc:#x})"),
            Trap::LoadMisaligned(addr) => write!(f, "LoadMisaligned({addr:#x})"),
            Trap::LoadAccessFault(addr) => write!(f, "LoadAccessFault({addr:#x})"),
            Trap::StoreMisaligned(addr) => write!(f, "StoreMisaligned({addr:#x})"),
            Trap::StoreAccessFault(addr) => write!(f, "StoreAccessFault({addr:#x})"),
            Trap::EnvironmentCallFromMMode => write!(f, "EnvironmentCallFromMMode"),
            Trap::MachineSoftwareInterrupt => write!(f, "MachineSoftwareInterrupt"),
            Trap::MachineTimerInterrupt => write!(f, "MachineTimerInterrupt"),
            Trap::MachineExternalInterrupt => write!(f, "MachineExternalInterrupt"),
            Trap::FastInterrupt(n) => write!(f, "FastInterrupt({n})"),
        }
    }
}

impl std::error::Error for Trap {}
