//! Control flow: prediction, mispredict recovery, jumps, and alignment.

use crate::common::{asm, TestContext, RAM_BASE};
use pretty_assertions::assert_eq;
use rv32pipe_core::isa::csr;

#[test]
fn backward_loop_counts_down() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 5),
        asm::addi(1, 1, -1), // loop:
        asm::bne(1, 0, -4),
        asm::addi(2, 0, 99),
        asm::jal(0, 0),
    ]);
    // 1 init + 5 iterations of 2 + the final addi.
    ctx.run_retired(12);
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 99);
}

#[test]
fn taken_forward_branch_skips_wrong_path() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::beq(0, 0, 8),
        asm::addi(2, 0, 1), // must not execute
        asm::addi(3, 0, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(2);
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.reg(3), 2);
}

#[test]
fn not_taken_forward_branch_falls_through() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::bne(0, 0, 8),
        asm::addi(2, 0, 1),
        asm::addi(3, 0, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    assert_eq!(ctx.reg(2), 1);
    assert_eq!(ctx.reg(3), 2);
}

#[test]
fn signed_and_unsigned_branches() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, -1),
        asm::addi(2, 0, 1),
        // -1 < 1 signed: taken.
        asm::blt(1, 2, 8),
        asm::addi(3, 0, 1), // skipped
        // -1 (0xFFFF_FFFF) < 1 unsigned: not taken.
        asm::bltu(1, 2, 8),
        asm::addi(4, 0, 1), // executes
        asm::bge(2, 1, 8),
        asm::addi(5, 0, 1), // skipped
        asm::bgeu(1, 2, 8),
        asm::addi(6, 0, 1), // skipped
        asm::jal(0, 0),
    ]);
    ctx.run_retired(8);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 1);
    assert_eq!(ctx.reg(5), 0);
    assert_eq!(ctx.reg(6), 0);
}

#[test]
fn jal_links_pc_plus_4() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::jal(1, 8),
        asm::addi(2, 0, 1), // skipped
        asm::addi(3, 0, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(2);
    assert_eq!(ctx.reg(1), RAM_BASE + 4);
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.reg(3), 2);
}

#[test]
fn jalr_jumps_indirect_and_links() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::auipc(5, 0),
        asm::addi(6, 5, 20),
        asm::jalr(1, 6, 0),
        asm::addi(7, 0, 1), // skipped
        asm::nop(),
        asm::addi(8, 0, 2), // target
        asm::jal(0, 0),
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.reg(1), RAM_BASE + 12);
    assert_eq!(ctx.reg(7), 0);
    assert_eq!(ctx.reg(8), 2);
}

#[test]
fn misaligned_jump_target_traps() {
    let mut ctx = TestContext::bare();
    let base = RAM_BASE;
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 32),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::jal(0, 2), // target pc+2: misaligned
        asm::nop(),
        asm::nop(),
        asm::nop(),
        asm::nop(),
        asm::jal(0, 0), // handler
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.csr(csr::MCAUSE), 0);
    assert_eq!(ctx.csr(csr::MEPC), base + 12);
    assert_eq!(ctx.csr(csr::MTVAL), base + 14);
    // The handler runs.
    ctx.run(100);
    assert!(ctx.retired() > 4);
}

#[test]
fn mispredicted_backward_branch_replays_sequential_path() {
    let mut ctx = TestContext::bare();
    // The backward branch is predicted taken but never is.
    ctx.load_program(&[
        asm::addi(1, 0, 1),
        asm::jal(0, 12), // skip the loop body
        asm::addi(2, 0, 7), // loop head (never reached)
        asm::nop(),
        asm::beq(1, 0, -8), // predicted taken (backward), resolves not-taken
        asm::addi(3, 0, 9),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.reg(2), 0);
    assert_eq!(ctx.reg(3), 9);
    assert!(ctx.sim.core.stats().mispredicts >= 1);
}
