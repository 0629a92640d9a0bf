//! Instruction decoder.
//!
//! Single-cycle combinational mapping from a 32-bit instruction word to the
//! wide [`MicroOp`] record consumed by the decode stage. It performs:
//! 1. **Field extraction:** opcode, register indices, funct3/funct7/funct12.
//! 2. **Immediate selection:** sign-extended immediate per format
//!    (R, I, S, B, U, J).
//! 3. **Op-group classification:** exactly one of the one-hot group bits, or
//!    `illegal`.
//! 4. **Bypass readiness:** `bypass_x` for results known at the end of X,
//!    `bypass_m` for results known at the end of M.

use crate::isa::{funct12, funct3, funct7, opcode};

/// Instruction formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    R,
    I,
    S,
    B,
    U,
    J,
    /// Unrecognized major opcode; no registers read or written.
    None,
}

/// Decoded micro-op.
///
/// One immutable record per in-flight instruction. The op-group booleans are
/// one-hot: exactly one of them (or `illegal`) is set by [`decode`].
#[derive(Clone, Copy, Debug, Default)]
pub struct MicroOp {
    /// Destination register index.
    pub rd: u8,
    /// First source register index.
    pub rs1: u8,
    /// Second source register index.
    pub rs2: u8,
    /// Destination register is written.
    pub rd_we: bool,
    /// First source register is read.
    pub rs1_re: bool,
    /// Second source register is read.
    pub rs2_re: bool,
    /// Sign-extended immediate.
    pub immediate: i32,
    /// funct3 field.
    pub funct3: u8,

    // One-hot op group.
    pub lui: bool,
    pub auipc: bool,
    pub jump: bool,
    pub branch: bool,
    pub load: bool,
    pub store: bool,
    pub adder: bool,
    pub logic: bool,
    pub multiply: bool,
    pub divide: bool,
    pub shift: bool,
    pub compare: bool,
    pub fence_i: bool,
    pub csr: bool,
    pub ecall: bool,
    pub ebreak: bool,
    pub mret: bool,
    /// No group matched, or the low two bits are not `11`.
    pub illegal: bool,

    /// Subtract instead of add. Raw decode; the decode stage folds in the
    /// compare/branch contribution before latching.
    pub adder_sub: bool,
    /// Shift direction: right when set.
    pub direction: bool,
    /// Arithmetic (sign-filling) right shift.
    pub sext: bool,

    /// Result is known by the end of X.
    pub bypass_x: bool,
    /// Result is known by the end of M.
    pub bypass_m: bool,

    /// CSR read enable.
    pub csr_re: bool,
    /// CSR write enable (CSRRW*, or CSRRS/C with a non-zero source).
    pub csr_we: bool,
    /// CSRRS/CSRRSI.
    pub csr_set: bool,
    /// CSRRC/CSRRCI.
    pub csr_clear: bool,
    /// Immediate (zimm) CSR form.
    pub csr_fmt_i: bool,
}

/// Sign-extends the low `bits` of `value`.
fn sign_extend(value: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((value << shift) as i32) >> shift
}

/// Decodes a 32-bit instruction word.
///
/// `with_muldiv` controls whether the M-extension encodings decode to the
/// multiply/divide groups; without it they fall through to `illegal`.
pub fn decode(insn: u32, with_muldiv: bool) -> MicroOp {
    if insn & 0b11 != 0b11 {
        // Compressed or reserved encoding space; nothing else is decoded so
        // the word cannot create spurious hazards before it traps.
        return MicroOp {
            illegal: true,
            ..MicroOp::default()
        };
    }

    let opcode = (insn >> 2) & 0x1f;
    let f3 = (insn >> 12) & 0x7;
    let f7 = (insn >> 25) & 0x7f;
    let f12 = (insn >> 20) & 0xfff;

    let fmt = match opcode {
        opcode::LUI | opcode::AUIPC => Format::U,
        opcode::JAL => Format::J,
        opcode::JALR | opcode::LOAD | opcode::OP_IMM | opcode::MISC_MEM | opcode::SYSTEM => {
            Format::I
        }
        opcode::BRANCH => Format::B,
        opcode::STORE => Format::S,
        opcode::OP => Format::R,
        _ => Format::None,
    };

    let immediate = match fmt {
        Format::I => sign_extend(insn >> 20, 12),
        Format::S => sign_extend(((insn >> 25) << 5) | ((insn >> 7) & 0x1f), 12),
        Format::B => sign_extend(
            ((insn >> 31) << 12)
                | (((insn >> 7) & 1) << 11)
                | (((insn >> 25) & 0x3f) << 5)
                | (((insn >> 8) & 0xf) << 1),
            13,
        ),
        Format::U => (insn & 0xFFFF_F000) as i32,
        Format::J => sign_extend(
            ((insn >> 31) << 20)
                | (((insn >> 12) & 0xff) << 12)
                | (((insn >> 20) & 1) << 11)
                | (((insn >> 21) & 0x3ff) << 1),
            21,
        ),
        Format::R | Format::None => 0,
    };

    let mut op = MicroOp {
        rd: ((insn >> 7) & 0x1f) as u8,
        rs1: ((insn >> 15) & 0x1f) as u8,
        rs2: ((insn >> 20) & 0x1f) as u8,
        rd_we: matches!(fmt, Format::R | Format::I | Format::U | Format::J),
        rs1_re: matches!(fmt, Format::R | Format::I | Format::S | Format::B),
        rs2_re: matches!(fmt, Format::R | Format::S | Format::B),
        immediate,
        funct3: f3 as u8,
        ..MicroOp::default()
    };

    op.compare = (opcode == opcode::OP_IMM && (f3 == funct3::SLT || f3 == funct3::SLTU))
        || (opcode == opcode::OP && (f3 == funct3::SLT || f3 == funct3::SLTU) && f7 == 0);

    op.branch = opcode == opcode::BRANCH
        && matches!(
            f3,
            funct3::BEQ | funct3::BNE | funct3::BLT | funct3::BGE | funct3::BLTU | funct3::BGEU
        );

    op.adder = (opcode == opcode::OP_IMM && f3 == funct3::ADD)
        || (opcode == opcode::OP && f3 == funct3::ADD && (f7 == funct7::ADD || f7 == funct7::SUB));
    op.adder_sub = op.rs2_re && f7 == funct7::SUB;

    op.logic = (opcode == opcode::OP_IMM
        && matches!(f3, funct3::XOR | funct3::OR | funct3::AND))
        || (opcode == opcode::OP && matches!(f3, funct3::XOR | funct3::OR | funct3::AND) && f7 == 0);

    if with_muldiv && opcode == opcode::OP && f7 == funct7::MULDIV {
        op.multiply = matches!(f3, funct3::MUL | funct3::MULH | funct3::MULHSU | funct3::MULHU);
        op.divide = matches!(f3, funct3::DIV | funct3::DIVU | funct3::REM | funct3::REMU);
    }

    op.shift = (opcode == opcode::OP_IMM || opcode == opcode::OP)
        && ((f3 == funct3::SLL && f7 == 0)
            || (f3 == funct3::SR && (f7 == funct7::SRL || f7 == funct7::SRA)));
    op.direction = f3 == funct3::SR;
    op.sext = f7 == funct7::SRA;

    op.lui = opcode == opcode::LUI;
    op.auipc = opcode == opcode::AUIPC;

    op.jump = opcode == opcode::JAL || (opcode == opcode::JALR && f3 == 0);

    op.load = opcode == opcode::LOAD
        && matches!(f3, funct3::B | funct3::BU | funct3::H | funct3::HU | funct3::W);
    op.store = opcode == opcode::STORE && matches!(f3, funct3::B | funct3::H | funct3::W);

    op.fence_i = opcode == opcode::MISC_MEM && f3 == funct3::FENCEI;

    op.csr = opcode == opcode::SYSTEM
        && matches!(
            f3,
            funct3::CSRRW
                | funct3::CSRRS
                | funct3::CSRRC
                | funct3::CSRRWI
                | funct3::CSRRSI
                | funct3::CSRRCI
        );
    op.csr_re = op.csr;
    op.csr_we = op.csr && ((f3 & 0b010) == 0 || op.rs1 != 0);
    op.csr_set = op.csr && (f3 & 0b011) == 0b010;
    op.csr_clear = op.csr && (f3 & 0b011) == 0b011;
    op.csr_fmt_i = op.csr && (f3 & 0b100) != 0;

    let privileged = opcode == opcode::SYSTEM && f3 == funct3::PRIV;
    op.ecall = privileged && f12 == funct12::ECALL;
    op.ebreak = privileged && f12 == funct12::EBREAK;
    op.mret = privileged && f12 == funct12::MRET;

    op.bypass_x = op.adder || op.logic || op.lui || op.auipc || op.csr;
    op.bypass_m = op.compare || op.divide || op.shift;

    op.illegal = !(op.compare
            || op.branch
            || op.adder
            || op.logic
            || op.multiply
            || op.divide
            || op.shift
            || op.lui
            || op.auipc
            || op.jump
            || op.load
            || op.store
            || op.csr
            || op.ecall
            || op.ebreak
            || op.mret
            || op.fence_i);

    op
}
