//! Trap delivery, CSR semantics, MRET, and interrupts.

use crate::common::{asm, TestContext, RAM_BASE};
use pretty_assertions::assert_eq;
use rv32pipe_core::isa::csr;

const MSTATUS_MIE: u32 = 1 << 3;
const MSTATUS_MPIE: u32 = 1 << 7;
const MIE_MTIE: u32 = 1 << 7;

#[test]
fn ecall_traps_with_cause_11() {
    let mut ctx = TestContext::bare();
    let base = RAM_BASE;
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 20),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::ecall(),
        asm::nop(),
        asm::jal(0, 0), // handler
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.csr(csr::MCAUSE), 11);
    assert_eq!(ctx.csr(csr::MEPC), base + 12);
    assert_eq!(ctx.csr(csr::MTVAL), 0);
    assert_eq!(ctx.sim.core.stats().traps, 1);
}

#[test]
fn ebreak_reports_its_pc() {
    let mut ctx = TestContext::bare();
    let base = RAM_BASE;
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 20),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::ebreak(),
        asm::nop(),
        asm::jal(0, 0), // handler
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.csr(csr::MCAUSE), 3);
    assert_eq!(ctx.csr(csr::MTVAL), base + 12);
    assert_eq!(ctx.csr(csr::MEPC), base + 12);
}

#[test]
fn illegal_instruction_reports_the_word() {
    let mut ctx = TestContext::bare();
    let base = RAM_BASE;
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 20),
        asm::csrrw(0, csr::MTVEC, 1),
        0x0000_0000, // illegal
        asm::nop(),
        asm::jal(0, 0), // handler
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.csr(csr::MCAUSE), 2);
    assert_eq!(ctx.csr(csr::MTVAL), 0);
    assert_eq!(ctx.csr(csr::MEPC), base + 12);
}

#[test]
fn unknown_csr_is_illegal() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 20),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::csrrw(2, 0x7C0, 1),
        asm::nop(),
        asm::jal(0, 0), // handler
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.csr(csr::MCAUSE), 2);
    assert_eq!(ctx.csr(csr::MTVAL), asm::csrrw(2, 0x7C0, 1));
}

#[test]
fn illegal_mcause_code_is_rejected() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 24),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::addi(2, 0, 10), // 10 is not a legal exception code
        asm::csrrw(0, csr::MCAUSE, 2),
        asm::nop(),
        asm::jal(0, 0), // handler
    ]);
    ctx.run_retired(5);
    assert_eq!(ctx.csr(csr::MCAUSE), 2);
}

#[test]
fn mscratch_swap_round_trips() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 0x111),
        asm::csrrw(0, csr::MSCRATCH, 1),
        asm::addi(2, 0, 0x222),
        asm::csrrw(3, csr::MSCRATCH, 2),
        asm::csrrw(4, csr::MSCRATCH, 3),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(5);
    assert_eq!(ctx.reg(3), 0x111);
    assert_eq!(ctx.reg(4), 0x222);
    assert_eq!(ctx.csr(csr::MSCRATCH), 0x111);
}

#[test]
fn csrrwi_uses_the_zimm_field() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::csrrwi(0, csr::MSCRATCH, 21),
        asm::csrrs(1, csr::MSCRATCH, 0),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(2);
    assert_eq!(ctx.reg(1), 21);
}

#[test]
fn mret_returns_past_the_ecall() {
    let mut ctx = TestContext::bare();
    let base = RAM_BASE;
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 36),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::ecall(),
        asm::addi(5, 0, 7), // resumed here
        asm::jal(0, 0),
        asm::nop(),
        asm::nop(),
        asm::nop(),
        // Handler: mepc += 4, return.
        asm::csrrs(2, csr::MEPC, 0),
        asm::addi(2, 2, 4),
        asm::csrrw(0, csr::MEPC, 2),
        asm::mret(),
    ]);
    ctx.run(800);
    assert_eq!(ctx.reg(2), base + 16);
    assert_eq!(ctx.reg(5), 7);
    assert_eq!(ctx.csr(csr::MEPC), base + 16);
}

#[test]
fn timer_interrupt_is_delivered_at_commit() {
    let mut ctx = TestContext::bare();
    let base = RAM_BASE;
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 40),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::addi(2, 0, MIE_MTIE as i32),
        asm::csrrw(0, csr::MIE, 2),
        asm::addi(3, 0, MSTATUS_MIE as i32),
        asm::csrrw(0, csr::MSTATUS, 3),
        asm::jal(0, 0), // idle loop
        asm::nop(),
        asm::nop(),
        asm::addi(31, 0, 1), // handler
        asm::jal(0, 0),
    ]);
    // Let the setup and at least one loop iteration commit.
    ctx.run_retired(8);
    assert_eq!(ctx.sim.core.stats().traps, 0);

    ctx.sim.irq.timer = true;
    ctx.run(400);

    assert_eq!(ctx.reg(31), 1, "handler must run");
    assert_eq!(ctx.csr(csr::MCAUSE), 0x8000_0007);
    assert_eq!(ctx.csr(csr::MEPC), base + 28);
    let mstatus = ctx.csr(csr::MSTATUS);
    assert_eq!(mstatus & MSTATUS_MIE, 0);
    assert_ne!(mstatus & MSTATUS_MPIE, 0);
    assert_eq!(ctx.sim.core.stats().traps, 1);
}

#[test]
fn interrupts_wait_for_the_global_enable() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(2, 0, MIE_MTIE as i32),
        asm::csrrw(0, csr::MIE, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    ctx.sim.irq.timer = true;
    ctx.run(400);
    assert_eq!(ctx.sim.core.stats().traps, 0);
}

#[test]
fn fast_interrupt_uses_cause_16_plus_line() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::auipc(1, 0),
        asm::addi(1, 1, 40),
        asm::csrrw(0, csr::MTVEC, 1),
        asm::addi(2, 0, 0b100), // unmask line 2
        asm::csrrw(0, csr::IRQ_MASK, 2),
        asm::addi(3, 0, MSTATUS_MIE as i32),
        asm::csrrw(0, csr::MSTATUS, 3),
        asm::jal(0, 0), // idle loop
        asm::nop(),
        asm::nop(),
        asm::addi(31, 0, 1), // handler
        asm::jal(0, 0),
    ]);
    ctx.run_retired(8);
    ctx.sim.irq.fast = 1 << 2;
    ctx.run(400);
    assert_eq!(ctx.reg(31), 1);
    assert_eq!(ctx.csr(csr::MCAUSE), 0x8000_0012);
    assert_eq!(ctx.csr(csr::IRQ_PENDING), 0b100);
}

#[test]
fn masked_fast_interrupts_stay_pending_free() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(3, 0, MSTATUS_MIE as i32),
        asm::csrrw(0, csr::MSTATUS, 3),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    ctx.sim.irq.fast = 1 << 5; // never unmasked
    ctx.run(400);
    assert_eq!(ctx.sim.core.stats().traps, 0);
    assert_eq!(ctx.csr(csr::IRQ_PENDING), 0);
}

#[test]
fn identity_csrs_read_zero() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::csrrs(1, csr::MVENDORID, 0),
        asm::csrrs(2, csr::MHARTID, 0),
        asm::csrrs(3, csr::MISA, 0),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    assert_eq!(ctx.reg(1), 0);
    assert_eq!(ctx.reg(2), 0);
    // RV32IM: base 32, I and M bits.
    assert_eq!(ctx.reg(3), (1 << 30) | (1 << 8) | (1 << 12));
}
