//! The six-stage in-order core.
//!
//! This module wires the pipeline together:
//! 1. **Stages:** A (address), F (fetch), D (decode), X (execute),
//!    M (memory), W (writeback), connected by registered payload latches.
//! 2. **Cycle discipline:** [`Core::step`] advances exactly one clock. The
//!    combinational phase computes every stage's signals from the latched
//!    state and the cycle's bus responses, aggregates kill and stall
//!    conditions, and selects the next PC; the edge phase then commits W,
//!    advances the latches, and clocks the units.
//! 3. **Hazards:** operands are bypassed from X, M, and W by youngest
//!    writer; a reader of a result that is not yet ready stalls at D. CSR
//!    readers drain the pipeline and CSR writers block decode until they
//!    commit.
//! 4. **Recovery:** branch mispredicts, traps, and MRET redirect at M and
//!    kill the younger stages for one cycle; FENCE.I replays from the slot
//!    behind it after flushing the instruction cache and draining the
//!    write buffer.

pub mod arch;
pub mod latches;
pub mod stage;
pub mod units;

use crate::bus::{BusRequest, BusResponse};
use crate::common::InterruptLines;
use crate::config::{ConfigError, CoreConfig};
use crate::isa::decode::decode;
use crate::isa::disasm::disasm;
use crate::stats::CoreStats;

use arch::csr::CsrFile;
use arch::gpr::GprFile;
use latches::{AfPayload, DxPayload, FdPayload, Latch, MwPayload, XmPayload};
use stage::{CycleContext, Stage};
use units::adder::{add_sub, AdderOut};
use units::compare::condition_met;
use units::divider::{DivRequest, Divider};
use units::exception::{ExceptionUnit, MExcInputs};
use units::fetch::{next_pc, FetchEdgeArgs, FetchUnit, PcSelInputs};
use units::loadstore::{
    data_select, load_select, DataSelect, LoadStoreUnit, LsuEdgeArgs, LsuQuery, MemIssue,
};
use units::logic::logic_op;
use units::multiplier::Multiplier;
use units::predict::predict;
use units::rvficon::{RvfiCsr, RvfiController, RvfiDCapture, RvfiMCapture, RvfiXCapture};
use units::shifter::Shifter;

/// Per-cycle inputs: bus responses and interrupt levels.
#[derive(Clone, Copy, Debug, Default)]
pub struct CycleInputs {
    pub ibus: BusResponse,
    pub dbus: BusResponse,
    pub irq: InterruptLines,
}

/// Per-cycle outputs: registered bus requests and the retire packet when
/// the formal interface is enabled.
#[derive(Clone, Debug, Default)]
pub struct CycleOutputs {
    pub ibus: BusRequest,
    pub dbus: BusRequest,
    pub retire: Option<units::rvficon::RvfiPacket>,
}

/// X-stage combinational results.
#[derive(Clone, Copy, Debug, Default)]
struct XComb {
    src1: u32,
    src2: u32,
    adder: AdderOut,
    result: u32,
    condition_met: bool,
    branch_taken: bool,
    branch_target: u32,
    csr_rdata: u32,
    csr_result: u32,
    illegal: bool,
    dsel: DataSelect,
}

/// The core.
pub struct Core {
    reset_address: u32,
    with_muldiv: bool,

    af: Latch<AfPayload>,
    fd: Latch<FdPayload>,
    dx: Latch<DxPayload>,
    xm: Latch<XmPayload>,
    mw: Latch<MwPayload>,

    fetch: FetchUnit,
    loadstore: LoadStoreUnit,
    shifter: Shifter,
    multiplier: Option<Multiplier>,
    divider: Option<Divider>,
    exception: ExceptionUnit,
    rvficon: Option<RvfiController>,

    gprf: GprFile,
    csrf: CsrFile,

    /// Instruction word of the slot at W, kept for the retire trace.
    w_insn: u32,

    stats: CoreStats,
}

impl Core {
    /// Builds a core from a validated configuration.
    pub fn new(config: &CoreConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            reset_address: config.reset_address,
            with_muldiv: config.with_muldiv,
            af: Latch::new(AfPayload {
                pc: config.reset_address.wrapping_sub(4),
            }),
            fd: Latch::new(FdPayload::default()),
            dx: Latch::new(DxPayload::default()),
            xm: Latch::new(XmPayload::default()),
            mw: Latch::new(MwPayload::default()),
            fetch: FetchUnit::new(config.icache.as_ref()),
            loadstore: LoadStoreUnit::new(config.dcache.as_ref(), config.wrbuf_depth),
            shifter: Shifter::new(),
            multiplier: config.with_muldiv.then(Multiplier::new),
            divider: config.with_muldiv.then(Divider::new),
            exception: ExceptionUnit::new(),
            rvficon: config.with_rvfi.then(RvfiController::new),
            gprf: GprFile::new(),
            csrf: CsrFile::new(config.with_muldiv),
            w_insn: 0,
            stats: CoreStats::default(),
        })
    }

    /// The reset address this core was built with.
    pub fn reset_address(&self) -> u32 {
        self.reset_address
    }

    /// Reads an architectural register.
    pub fn gpr(&self, idx: u8) -> u32 {
        self.gprf.read(idx)
    }

    /// The CSR file, for inspection.
    pub fn csrs(&self) -> &CsrFile {
        &self.csrf
    }

    /// A register-dump string for diagnostics.
    pub fn gpr_dump(&self) -> String {
        self.gprf.dump()
    }

    /// Statistics, merged with the per-unit counters.
    pub fn stats(&self) -> CoreStats {
        let mut stats = self.stats;
        if let Some(icache) = self.fetch.cache_stats() {
            stats.icache_refills = icache.refills;
        }
        if let Some(dcache) = self.loadstore.cache_stats() {
            stats.dcache_refills = dcache.refills;
        }
        stats.wrbuf_drains = self.loadstore.wrbuf_drains();
        stats
    }

    /// X-stage combinational computation from the D/X latch.
    fn comb_x(&self) -> XComb {
        let p = &self.dx.p;
        let op = &p.op;

        let src1 = if op.lui {
            0
        } else if op.auipc {
            p.pc
        } else if op.csr_re && op.csr_fmt_i {
            u32::from(op.rs1)
        } else {
            p.src1
        };
        let src2 = if op.store || !op.rs2_re {
            op.immediate as u32
        } else {
            p.src2
        };

        let adder = add_sub(op.adder_sub, src1, src2);

        let csr_rdata = self.csrf.x_read();
        let csr_illegal = op.csr && csr_rdata.is_none();
        let csr_rdata = csr_rdata.unwrap_or(0);

        // The logic unit is shared with the CSR set/clear paths: the op is
        // forced into the XOR/OR/AND space and src2 becomes the CSR value.
        let logic_result = if op.csr_re {
            let csr_op = op.funct3 | 0b100;
            let csr_src1 = if op.csr_clear { !src1 } else { src1 };
            logic_op(csr_op, csr_src1, csr_rdata)
        } else {
            logic_op(op.funct3, src1, src2)
        };

        // The comparator shares the adder flags between compares and
        // branches; SLT[U] remaps onto the BLT[U] selectors.
        let cmp_op = if op.compare {
            (op.funct3 & 0b011) << 1
        } else {
            op.funct3
        };
        let met = condition_met(
            cmp_op,
            src1 == src2,
            adder.result >> 31 != 0,
            adder.overflow,
            adder.carry,
        );

        let result = if op.jump {
            p.pc.wrapping_add(4)
        } else if op.logic {
            logic_result
        } else if op.csr_re {
            csr_rdata
        } else {
            adder.result
        };

        let branch_taken = op.jump || (op.branch && met);
        let branch_target = if op.jump && op.rs1_re {
            // JALR: the adder result with its lowest bit cleared.
            adder.result & !1
        } else {
            p.branch_target
        };

        let csr_result = if op.csr_set || op.csr_clear {
            logic_result
        } else {
            src1
        };
        let csr_wlrl_bad = op.csr_we && !csr_illegal && !self.csrf.x_check_write(csr_result);

        let dsel = data_select(op.funct3, (adder.result & 0b11) as u8, p.src2);

        XComb {
            src1,
            src2,
            adder,
            result,
            condition_met: met,
            branch_taken,
            branch_target,
            csr_rdata,
            csr_result,
            illegal: op.illegal || csr_illegal || csr_wlrl_bad,
            dsel,
        }
    }

    /// Bypassed operand read at D: youngest in-flight writer first, then
    /// the register file.
    #[allow(clippy::too_many_arguments)]
    fn read_operand(
        &self,
        idx: u8,
        x_valid: bool,
        x_result: u32,
        m_valid: bool,
        m_result: u32,
        w_valid: bool,
        w_result: u32,
    ) -> (u32, bool) {
        if idx == 0 {
            return (0, true);
        }
        if x_valid && self.dx.p.op.rd_we && self.dx.p.op.rd == idx {
            return (x_result, self.dx.p.op.bypass_x);
        }
        if m_valid && self.xm.p.rd_we && self.xm.p.rd == idx {
            return (m_result, self.xm.p.bypass_m);
        }
        if w_valid && !self.mw.p.trap && self.mw.p.rd_we && self.mw.p.rd == idx {
            return (w_result, true);
        }
        (self.gprf.read(idx), true)
    }

    /// Advances the core by one clock cycle.
    pub fn step(&mut self, inputs: &CycleInputs) -> CycleOutputs {
        // ----- combinational phase -----

        let w_valid = self.mw.valid;
        let m_valid = self.xm.valid;

        // X-stage arithmetic (independent of everything below).
        let x = self.comb_x();

        // Load/store unit state, including error capture for M.
        let ls = self.loadstore.comb(&LsuQuery {
            x_valid: self.dx.valid,
            x_fence_i: self.dx.p.op.fence_i,
            x_load: self.dx.p.op.load,
            x_store: self.dx.p.op.store,
            x_addr: x.adder.result,
            m_valid,
            m_load: self.xm.p.load,
            m_store: self.xm.p.store,
            m_addr: self.xm.p.result,
            m_misaligned: self.xm.p.loadstore_misaligned,
        });

        // M-stage result mux.
        let m_result = if self.xm.p.compare {
            u32::from(self.xm.p.condition_met)
        } else if self.xm.p.divide {
            self.divider.as_ref().map_or(0, Divider::m_result)
        } else if self.xm.p.shift {
            self.shifter.m_result()
        } else {
            self.xm.p.result
        };

        // Trap selection for the instruction at M.
        let m_trap = self.exception.m_trap(
            &self.csrf,
            &MExcInputs {
                valid: m_valid,
                pc: self.xm.p.pc,
                instruction: self.xm.p.instruction,
                fetch_misaligned: self.xm.p.branch_taken
                    && self.xm.p.branch_target & 0b11 != 0,
                fetch_error: self.xm.p.fetch_error,
                fetch_badaddr: self.xm.p.fetch_badaddr,
                illegal: self.xm.p.illegal,
                ebreak: self.xm.p.ebreak,
                ecall: self.xm.p.ecall,
                load: self.xm.p.load,
                store: self.xm.p.store,
                misaligned: self.xm.p.loadstore_misaligned,
                load_error: ls.load_error,
                store_error: ls.store_error,
                loadstore_badaddr: ls.badaddr,
                result: self.xm.p.result,
                branch_target: self.xm.p.branch_target,
            },
        );

        // Kill aggregation. M is never killed; W never stalls.
        let mut cx = CycleContext::new();
        let m_redirect = (m_trap.is_some() || self.xm.p.mret) && m_valid;
        let m_taken_mispredict =
            !self.xm.p.branch_predict_taken && self.xm.p.branch_taken && m_valid;
        let m_not_taken_mispredict =
            self.xm.p.branch_predict_taken && !self.xm.p.branch_taken && m_valid;

        cx.kill_on(Stage::X, m_redirect || m_taken_mispredict);
        cx.kill_on(Stage::D, m_redirect || m_taken_mispredict || m_not_taken_mispredict);
        cx.kill_on(Stage::F, m_redirect || m_taken_mispredict || m_not_taken_mispredict);

        let x_valid = self.dx.valid && !cx.killed(Stage::X);
        let x_fence_i = self.dx.p.op.fence_i && x_valid;
        cx.kill_on(Stage::D, x_fence_i);
        cx.kill_on(Stage::F, x_fence_i);

        let d_valid = self.fd.valid && !cx.killed(Stage::D);

        // Decode and predict.
        let mut dec = decode(self.fd.p.instruction, self.with_muldiv);
        let prediction = predict(&dec, self.fd.p.pc);
        cx.kill_on(Stage::F, prediction.taken && d_valid);

        let f_valid = self.af.valid && !cx.killed(Stage::F);

        // Fetch unit state.
        let fc = self.fetch.comb(self.af.p.pc, f_valid);

        // W-stage result mux.
        let w_result = if self.mw.p.load {
            load_select(
                self.mw.p.funct3,
                (self.mw.p.result & 0b11) as u8,
                self.mw.p.load_data,
            )
        } else if self.mw.p.multiply {
            self.multiplier.as_ref().map_or(0, Multiplier::w_result)
        } else {
            self.mw.p.result
        };

        // Operand bypass.
        let (src1, rdy1) = self.read_operand(
            dec.rs1, x_valid, x.result, m_valid, m_result, w_valid, w_result,
        );
        let (src2, rdy2) = self.read_operand(
            dec.rs2, x_valid, x.result, m_valid, m_result, w_valid, w_result,
        );

        // Stall aggregation.
        let div_busy = self.divider.as_ref().is_some_and(Divider::m_busy);
        cx.stall_on(
            Stage::M,
            fc.a_busy || fc.f_busy || ls.x_busy || ls.m_busy || div_busy,
        );
        cx.stall_on(
            Stage::D,
            d_valid && ((dec.rs1_re && !rdy1) || (dec.rs2_re && !rdy2)),
        );
        cx.stall_on(
            Stage::D,
            dec.csr && d_valid && (x_valid || m_valid || w_valid),
        );
        cx.stall_on(
            Stage::D,
            (self.dx.p.op.csr_we && x_valid)
                || (self.xm.p.csr_we && m_valid && m_trap.is_none())
                || (self.mw.p.csr_we && w_valid && !self.mw.p.trap),
        );
        cx.chain_stalls();

        // Next-PC selection.
        let a_pc = next_pc(&PcSelInputs {
            f_pc: self.af.p.pc,
            d_pc: self.fd.p.pc,
            d_branch_predict_taken: prediction.taken,
            d_branch_target: prediction.target,
            d_valid,
            x_pc: self.dx.p.pc,
            x_fence_i,
            x_valid,
            m_branch_predict_taken: self.xm.p.branch_predict_taken,
            m_branch_taken: self.xm.p.branch_taken,
            m_branch_target: self.xm.p.branch_target,
            m_exception: m_trap.is_some(),
            m_mret: self.xm.p.mret,
            m_valid,
            mtvec_base: self.csrf.mtvec_base(),
            mepc_base: self.csrf.mepc_base(),
        });

        // New payloads, computed from this cycle's signals.
        let fd_new = FdPayload {
            pc: self.af.p.pc,
            instruction: fc.instruction,
            fetch_error: fc.fetch_error,
            fetch_badaddr: fc.fetch_badaddr,
        };

        // The adder subtracts for SUB and for every compare/branch.
        dec.adder_sub = (dec.adder && dec.adder_sub) || dec.compare || dec.branch;
        let dx_new = DxPayload {
            pc: self.fd.p.pc,
            instruction: self.fd.p.instruction,
            fetch_error: self.fd.p.fetch_error,
            fetch_badaddr: self.fd.p.fetch_badaddr,
            op: dec,
            src1,
            src2,
            branch_predict_taken: prediction.taken,
            branch_target: prediction.target,
        };

        let xm_new = XmPayload {
            pc: self.dx.p.pc,
            instruction: self.dx.p.instruction,
            fetch_error: self.dx.p.fetch_error,
            fetch_badaddr: self.dx.p.fetch_badaddr,
            illegal: x.illegal,
            loadstore_misaligned: x.dsel.misaligned,
            ecall: self.dx.p.op.ecall,
            ebreak: self.dx.p.op.ebreak,
            rd: self.dx.p.op.rd,
            rd_we: self.dx.p.op.rd_we,
            bypass_m: self.dx.p.op.bypass_m || self.dx.p.op.bypass_x,
            funct3: self.dx.p.op.funct3,
            result: x.result,
            shift: self.dx.p.op.shift,
            load: self.dx.p.op.load,
            store: self.dx.p.op.store,
            store_data: x.dsel.store_data,
            compare: self.dx.p.op.compare,
            multiply: self.dx.p.op.multiply,
            divide: self.dx.p.op.divide,
            condition_met: x.condition_met,
            branch_target: x.branch_target,
            branch_taken: x.branch_taken,
            branch_predict_taken: self.dx.p.branch_predict_taken,
            csr_we: self.dx.p.op.csr_we,
            csr_result: x.csr_result,
            mret: self.dx.p.op.mret,
        };

        let mw_new = MwPayload {
            pc: self.xm.p.pc,
            rd: self.xm.p.rd,
            rd_we: self.xm.p.rd_we,
            funct3: self.xm.p.funct3,
            result: m_result,
            load: self.xm.p.load,
            load_data: ls.m_load_data,
            csr_we: self.xm.p.csr_we,
            csr_result: self.xm.p.csr_result,
            multiply: self.xm.p.multiply,
            trap: m_trap.is_some(),
        };

        // ----- edge phase -----

        // W commit.
        let mut retire = None;
        if w_valid {
            let commit_write =
                !self.mw.p.trap && self.mw.p.rd_we && self.mw.p.rd != 0;
            if commit_write {
                self.gprf.write(self.mw.p.rd, w_result);
            }
            if !self.mw.p.trap && self.mw.p.csr_we {
                self.csrf.w_write(self.mw.p.csr_result);
            }
            self.stats.retired += 1;
            if let Some(rvficon) = self.rvficon.as_mut() {
                let (rd_addr, rd_wdata) = if commit_write {
                    (self.mw.p.rd, w_result)
                } else {
                    (0, 0)
                };
                retire = Some(rvficon.retire(rd_addr, rd_wdata));
            }
            tracing::trace!(
                target: "rv32pipe_core::retire",
                pc = format_args!("{:#010x}", self.mw.p.pc),
                insn = %disasm(self.w_insn),
                trap = self.mw.p.trap,
                "retire"
            );
        }
        if self.exception.commit_w(&mut self.csrf, w_valid).is_some() {
            self.stats.traps += 1;
        }

        // Exception M→W staging.
        if cx.ready(Stage::M) {
            self.exception
                .latch_mw(m_trap, self.xm.p.mret && m_valid, self.xm.p.pc);
            self.w_insn = self.xm.p.instruction;
            if m_valid && (m_taken_mispredict || m_not_taken_mispredict) {
                self.stats.mispredicts += 1;
            }
            if m_valid && self.xm.p.load && ls.from_dcache {
                self.stats.dcache_accesses += 1;
            }
        }
        if cx.ready(Stage::F) && f_valid && fc.from_icache {
            self.stats.icache_accesses += 1;
        }
        if cx.ready(Stage::D) && d_valid {
            tracing::trace!(
                target: "rv32pipe_core::decode",
                pc = format_args!("{:#010x}", self.fd.p.pc),
                insn = %disasm(self.fd.p.instruction),
                "issue"
            );
        }

        // RVFI captures, oldest stage first so the registers shift like the
        // pipeline.
        if self.rvficon.is_some() {
            let mtvec_base = self.csrf.mtvec_base();
            let mepc_base = self.csrf.mepc_base();
            let csr_x_addr = self.csrf.x_addr();
            if let Some(rvficon) = self.rvficon.as_mut() {
                if cx.ready(Stage::M) {
                    let pc_wdata = if m_trap.is_some() {
                        mtvec_base
                    } else if self.xm.p.mret {
                        mepc_base
                    } else if self.xm.p.branch_taken {
                        self.xm.p.branch_target
                    } else {
                        self.xm.p.pc.wrapping_add(4)
                    };
                    rvficon.capture_m(RvfiMCapture {
                        mem_rdata: if self.xm.p.load { ls.m_load_data } else { 0 },
                        pc_rdata: self.xm.p.pc,
                        pc_wdata,
                        trap: m_trap.is_some(),
                        intr: self.xm.p.pc == mtvec_base,
                    });
                }
                if cx.ready(Stage::X) {
                    let op = &self.dx.p.op;
                    rvficon.capture_x(RvfiXCapture {
                        rs1_rdata: if op.rs1_re { self.dx.p.src1 } else { 0 },
                        rs2_rdata: if op.rs2_re { self.dx.p.src2 } else { 0 },
                        mem_addr: if op.load || op.store {
                            x.adder.result & !0b11
                        } else {
                            0
                        },
                        mem_rmask: if op.load { x.dsel.mask } else { 0 },
                        mem_wmask: if op.store { x.dsel.mask } else { 0 },
                        mem_wdata: if op.store { x.dsel.store_data } else { 0 },
                        csr: op.csr.then_some(RvfiCsr {
                            addr: csr_x_addr,
                            rmask: u32::MAX,
                            wmask: if op.csr_we { u32::MAX } else { 0 },
                            rdata: x.csr_rdata,
                            wdata: x.csr_result,
                        }),
                    });
                }
                if cx.ready(Stage::D) {
                    rvficon.capture_d(RvfiDCapture {
                        insn: self.fd.p.instruction,
                        rs1_addr: if dec.rs1_re { dec.rs1 } else { 0 },
                        rs2_addr: if dec.rs2_re { dec.rs2 } else { 0 },
                    });
                }
            }
        }

        // Staged CSR address tracking, after the X-side consumers above have
        // observed this cycle's selection.
        self.csrf.advance(
            (dec.immediate as u32 & 0xFFF) as u16,
            cx.ready(Stage::D),
            cx.ready(Stage::X),
            cx.ready(Stage::M),
        );

        // Unit clocks. The multiplier's M-side select must read the product
        // before the X-side latch replaces it.
        if cx.ready(Stage::M) {
            if let Some(multiplier) = self.multiplier.as_mut() {
                multiplier.latch_m();
            }
        }
        if cx.ready(Stage::X) {
            self.shifter.latch_x(
                self.dx.p.op.direction,
                self.dx.p.op.sext,
                (x.src2 & 0x1F) as u8,
                x.src1,
            );
            if let Some(multiplier) = self.multiplier.as_mut() {
                multiplier.latch_x(self.dx.p.op.funct3, x.src1, x.src2);
            }
        }
        if let Some(divider) = self.divider.as_mut() {
            let start = (x_valid && cx.ready(Stage::X) && self.dx.p.op.divide).then_some(
                DivRequest {
                    op: self.dx.p.op.funct3,
                    src1: x.src1,
                    src2: x.src2,
                },
            );
            divider.tick(start);
        }

        self.fetch.edge(
            &FetchEdgeArgs {
                a_pc,
                a_stall: cx.stalled(Stage::A),
                f_pc: self.af.p.pc,
                f_valid,
                f_stall: cx.stalled(Stage::F),
                a_flush: x_fence_i,
            },
            &inputs.ibus,
        );

        let x_issue = (x_valid
            && cx.ready(Stage::X)
            && (self.dx.p.op.load || self.dx.p.op.store)
            && !x.dsel.misaligned)
            .then_some(MemIssue {
                addr: x.adder.result,
                mask: x.dsel.mask,
                store_data: x.dsel.store_data,
                load: self.dx.p.op.load,
                store: self.dx.p.op.store,
            });
        self.loadstore.edge(
            &LsuEdgeArgs {
                x_issue,
                x_stall: cx.stalled(Stage::X),
                x_addr: x.adder.result,
                x_mask: x.dsel.mask,
                m_valid,
                m_load: self.xm.p.load,
                m_store: self.xm.p.store,
                m_addr: self.xm.p.result,
                m_misaligned: self.xm.p.loadstore_misaligned,
                m_store_data: self.xm.p.store_data,
                m_stall: cx.stalled(Stage::M),
            },
            &inputs.dbus,
        );

        // Latch advance, last so every unit above observed the old slots.
        // W never stalls and is never killed.
        self.mw
            .update(cx.stalled(Stage::M), false, false, mw_new, m_valid);
        self.xm.update(
            cx.stalled(Stage::X),
            cx.stalled(Stage::M),
            false,
            xm_new,
            x_valid,
        );
        self.dx.update(
            cx.stalled(Stage::D),
            cx.stalled(Stage::X),
            cx.killed(Stage::X),
            dx_new,
            d_valid,
        );
        self.fd.update(
            cx.stalled(Stage::F),
            cx.stalled(Stage::D),
            cx.killed(Stage::D),
            fd_new,
            f_valid,
        );
        self.af.update(
            cx.stalled(Stage::A),
            cx.stalled(Stage::F),
            cx.killed(Stage::F),
            AfPayload { pc: a_pc },
            true,
        );

        self.csrf.sample_interrupts(&inputs.irq);
        self.stats.cycles += 1;

        CycleOutputs {
            ibus: self.fetch.bus_request(),
            dbus: self.loadstore.bus_request(),
            retire,
        }
    }
}

pub use units::rvficon::RvfiPacket;
