//! Comparator.
//!
//! Decides BEQ/BNE/BLT[U]/BGE[U] (and SLT[U], remapped onto the BLT[U]
//! selectors by the decode stage) from the adder's subtract-mode flags.

use crate::isa::funct3;

/// One comparison from the zero/negative/overflow/carry flags.
pub fn condition_met(op: u8, zero: bool, negative: bool, overflow: bool, carry: bool) -> bool {
    match u32::from(op) {
        funct3::BEQ => zero,
        funct3::BNE => !zero,
        funct3::BLT => !zero && (negative != overflow),
        funct3::BGE => negative == overflow,
        funct3::BLTU => !zero && carry,
        funct3::BGEU => !carry,
        _ => false,
    }
}
