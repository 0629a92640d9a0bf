//! Multiplier.
//!
//! Fully-pipelined 33×33 signed multiply. The operands are extended at X
//! according to funct3 (MUL/MULH treat src1 signed, MULH alone treats src2
//! signed), the product is registered X→M, and the low or high half is
//! selected M→W.

use crate::isa::funct3;

/// Registered multiplier state.
#[derive(Debug, Default)]
pub struct Multiplier {
    m_low: bool,
    m_prod: i64,
    w_result: u32,
}

impl Multiplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latches the extended product; call on every un-stalled X cycle.
    pub fn latch_x(&mut self, op: u8, src1: u32, src2: u32) {
        let op = u32::from(op);
        let src1_signed = op == funct3::MULH || op == funct3::MULHSU;
        let src2_signed = op == funct3::MULH;

        let a: i64 = if src1_signed {
            i64::from(src1 as i32)
        } else {
            i64::from(src1)
        };
        let b: i64 = if src2_signed {
            i64::from(src2 as i32)
        } else {
            i64::from(src2)
        };

        self.m_low = op == funct3::MUL;
        self.m_prod = a.wrapping_mul(b);
    }

    /// Selects the result half; call on every un-stalled M cycle.
    pub fn latch_m(&mut self) {
        self.w_result = if self.m_low {
            self.m_prod as u32
        } else {
            (self.m_prod >> 32) as u32
        };
    }

    /// The W-stage result.
    pub fn w_result(&self) -> u32 {
        self.w_result
    }
}
