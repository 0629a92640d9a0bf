//! Integer arithmetic programs.

use crate::common::{asm, TestContext, RAM_BASE};
use pretty_assertions::assert_eq;

#[test]
fn addi_add_sequence() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 5),
        asm::addi(2, 0, 7),
        asm::add(3, 1, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    assert_eq!(ctx.reg(1), 5);
    assert_eq!(ctx.reg(2), 7);
    assert_eq!(ctx.reg(3), 12);
}

#[test]
fn lui_addi_builds_constants() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::lui(1, 0x12345),
        asm::addi(1, 1, 0x678),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(2);
    // The I-immediate must not reintroduce 0xFFF into the upper bits.
    assert_eq!(ctx.reg(1), 0x1234_5678);
}

#[test]
fn auipc_offsets_the_pc() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[asm::auipc(1, 1), asm::jal(0, 0)]);
    ctx.run_retired(1);
    assert_eq!(ctx.reg(1), RAM_BASE + 0x1000);
}

#[test]
fn subtract_wraps() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 5),
        asm::addi(2, 0, 7),
        asm::sub(3, 1, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(3);
    assert_eq!(ctx.reg(3), (-2i32) as u32);
}

#[test]
fn logic_immediates_and_registers() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, 0b1100),
        asm::addi(2, 0, 0b1010),
        asm::xor(3, 1, 2),
        asm::or(4, 1, 2),
        asm::and(5, 1, 2),
        asm::xori(6, 1, 0b0110),
        asm::ori(7, 1, 0b0001),
        asm::andi(8, 1, 0b0100),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(8);
    assert_eq!(ctx.reg(3), 0b0110);
    assert_eq!(ctx.reg(4), 0b1110);
    assert_eq!(ctx.reg(5), 0b1000);
    assert_eq!(ctx.reg(6), 0b1010);
    assert_eq!(ctx.reg(7), 0b1101);
    assert_eq!(ctx.reg(8), 0b0100);
}

#[test]
fn shifts_by_immediate_and_register() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, -8),
        asm::srai(2, 1, 1),
        asm::srli(3, 1, 28),
        asm::slli(4, 1, 4),
        asm::addi(5, 0, 2),
        asm::sra(6, 1, 5),
        asm::srl(7, 1, 5),
        asm::sll(8, 1, 5),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(8);
    assert_eq!(ctx.reg(2), 0xFFFF_FFFC);
    assert_eq!(ctx.reg(3), 0xF);
    assert_eq!(ctx.reg(4), 0xFFFF_FF80);
    assert_eq!(ctx.reg(6), 0xFFFF_FFFE);
    assert_eq!(ctx.reg(7), 0x3FFF_FFFE);
    assert_eq!(ctx.reg(8), 0xFFFF_FFE0);
}

#[test]
fn set_less_than_signed_and_unsigned() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, -5),
        asm::slti(2, 1, 0),
        asm::sltiu(3, 1, 0),
        asm::sltu(4, 0, 1),
        asm::slt(5, 0, 1),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(5);
    assert_eq!(ctx.reg(2), 1); // -5 < 0 signed
    assert_eq!(ctx.reg(3), 0); // 0xFFFF_FFFB is not < 0 unsigned
    assert_eq!(ctx.reg(4), 1); // 0 < 0xFFFF_FFFB unsigned
    assert_eq!(ctx.reg(5), 0); // 0 is not < -5 signed
}

#[test]
fn multiply_halves() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, -1),
        asm::mulhu(2, 1, 1),
        asm::mulh(3, 1, 1),
        asm::mulhsu(4, 1, 1),
        asm::addi(5, 0, 6),
        asm::addi(6, 0, 7),
        asm::mul(7, 5, 6),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(7);
    assert_eq!(ctx.reg(2), 0xFFFF_FFFE);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 0xFFFF_FFFF);
    assert_eq!(ctx.reg(7), 42);
}

#[test]
fn divide_by_zero_follows_the_spec() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::addi(1, 0, -1),
        asm::addi(2, 0, 0),
        asm::div(3, 1, 2),
        asm::rem(4, 1, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.reg(3), 0xFFFF_FFFF);
    assert_eq!(ctx.reg(4), 0xFFFF_FFFF);
}

#[test]
fn signed_division_overflow() {
    let mut ctx = TestContext::bare();
    ctx.load_program(&[
        asm::lui(1, 0x80000),
        asm::addi(2, 0, -1),
        asm::div(3, 1, 2),
        asm::rem(4, 1, 2),
        asm::jal(0, 0),
    ]);
    ctx.run_retired(4);
    assert_eq!(ctx.reg(3), 0x8000_0000);
    assert_eq!(ctx.reg(4), 0);
}
