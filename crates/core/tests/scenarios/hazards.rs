//! Data-hazard sequences: bypass networks and stall cases.

use crate::common::{asm, TestContext};
use pretty_assertions::assert_eq;

#[test]
fn dependent_chain_forwards_from_x() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 1),
        asm::addi(2, 1, 1),
        asm::addi(3, 2, 1),
        asm::addi(4, 3, 1),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.reg(1), 1);
    assert_eq!(ctx.reg(2), 2);
    assert_eq!(ctx.reg(3), 3);
    assert_eq!(ctx.reg(4), 4);
}

#[test]
fn load_use_stalls_until_writeback() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::lui(10, 0x80010),
        asm::addi(1, 0, 5),
        asm::sw(1, 10, 0),
        asm::lw(2, 10, 0),
        asm::addi(3, 2, 1),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(5);
    assert_eq!(ctx.reg(2), 5);
    assert_eq!(ctx.reg(3), 6);
}

#[test]
fn shift_result_forwards_from_m() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 3),
        asm::slli(2, 1, 2),
        asm::addi(3, 2, 1),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    assert_eq!(ctx.reg(2), 12);
    assert_eq!(ctx.reg(3), 13);
}

#[test]
fn compare_result_forwards_from_m() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, -5),
        asm::slt(2, 1, 0),
        asm::addi(3, 2, 41),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    assert_eq!(ctx.reg(3), 42);
}

#[test]
fn multiply_result_waits_for_writeback() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 6),
        asm::addi(2, 0, 7),
        asm::mul(3, 1, 2),
        asm::add(4, 3, 3),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.reg(3), 42);
    assert_eq!(ctx.reg(4), 84);
}

#[test]
fn divide_stalls_the_pipeline_then_forwards() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 97),
        asm::addi(2, 0, 7),
        asm::div(3, 1, 2),
        asm::rem(4, 1, 2),
        asm::add(5, 3, 4),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(5);
    assert_eq!(ctx.reg(3), 13);
    assert_eq!(ctx.reg(4), 6);
    assert_eq!(ctx.reg(5), 19);
}

#[test]
fn x0_writes_are_discarded() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(0, 0, 42),
        asm::addi(1, 0, 1),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(2);
    assert_eq!(ctx.reg(0), 0);
    assert_eq!(ctx.reg(1), 1);
}
