//! Instruction fetch.
//!
//! This module contains the PC selector and the two fetch-unit variants:
//! 1. **PC selector:** the strict-priority mux choosing the next fetch
//!    address across trap, MRET, mispredict recovery, FENCE.I replay,
//!    decode-stage prediction, and the sequential path.
//! 2. **Bare unit:** one bus transaction per fetch; holds the pipeline
//!    while the transaction is outstanding and captures bus errors.
//! 3. **Cached unit:** routes in-region fetches through the instruction
//!    cache, arbitrating the cache's refill port against the bare path.
//!
//! The variant is chosen once at construction; the hot loop dispatches on a
//! plain enum.

use crate::bus::arbiter::BusArbiter;
use crate::bus::{BusRequest, BusResponse};
use crate::config::CacheParams;
use crate::core::units::cache::{CacheOp, CacheStats, L1Cache};
use crate::isa::NOP;

/// PC selector inputs, one field per priority source.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcSelInputs {
    pub f_pc: u32,
    pub d_pc: u32,
    pub d_branch_predict_taken: bool,
    pub d_branch_target: u32,
    pub d_valid: bool,
    pub x_pc: u32,
    pub x_fence_i: bool,
    pub x_valid: bool,
    pub m_branch_predict_taken: bool,
    pub m_branch_taken: bool,
    pub m_branch_target: u32,
    pub m_exception: bool,
    pub m_mret: bool,
    pub m_valid: bool,
    pub mtvec_base: u32,
    pub mepc_base: u32,
}

/// Chooses the next PC by strict priority: trap, MRET, mispredict replay,
/// mispredict redirect, FENCE.I replay, predicted branch, sequential.
pub fn next_pc(i: &PcSelInputs) -> u32 {
    if i.m_valid {
        if i.m_exception {
            return i.mtvec_base;
        }
        if i.m_mret {
            return i.mepc_base;
        }
        if i.m_branch_predict_taken && !i.m_branch_taken {
            // Predicted taken, resolved not-taken: replay the sequential
            // path from the slot behind the branch.
            return i.x_pc & !0b11;
        }
        if !i.m_branch_predict_taken && i.m_branch_taken {
            return i.m_branch_target & !0b11;
        }
    }
    if i.x_fence_i && i.x_valid {
        return i.d_pc & !0b11;
    }
    if i.d_branch_predict_taken && i.d_valid {
        return i.d_branch_target & !0b11;
    }
    (i.f_pc & !0b11).wrapping_add(4)
}

/// Combinational fetch-unit outputs for one cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchComb {
    /// A transaction for the A-stage slot is outstanding.
    pub a_busy: bool,
    /// The F-stage slot's instruction is not yet available.
    pub f_busy: bool,
    /// The fetched instruction word; the canonical NOP after a fault.
    pub instruction: u32,
    pub fetch_error: bool,
    /// Faulting word address.
    pub fetch_badaddr: u32,
    /// The word was served by the instruction cache.
    pub from_icache: bool,
}

/// Per-cycle edge inputs shared by both variants.
#[derive(Clone, Copy, Debug, Default)]
pub struct FetchEdgeArgs {
    /// The PC selected for the A stage this cycle.
    pub a_pc: u32,
    pub a_stall: bool,
    /// The PC of the slot at F.
    pub f_pc: u32,
    pub f_valid: bool,
    pub f_stall: bool,
    /// FENCE.I (or an equivalent resume) requests an instruction-cache
    /// flush.
    pub a_flush: bool,
}

/// Bare fetch unit: a single registered bus master.
pub struct BareFetchUnit {
    bus: BusRequest,
    rdata: u32,
    fetch_error: bool,
    badaddr: u32,
}

impl BareFetchUnit {
    pub fn new() -> Self {
        Self {
            bus: BusRequest::default(),
            rdata: NOP,
            fetch_error: false,
            badaddr: 0,
        }
    }

    fn comb(&self) -> FetchComb {
        if self.fetch_error {
            FetchComb {
                a_busy: self.bus.cyc,
                f_busy: false,
                instruction: NOP,
                fetch_error: true,
                fetch_badaddr: self.badaddr,
                from_icache: false,
            }
        } else {
            FetchComb {
                a_busy: self.bus.cyc,
                f_busy: self.bus.cyc,
                instruction: self.rdata,
                fetch_error: false,
                fetch_badaddr: 0,
                from_icache: false,
            }
        }
    }

    fn edge(&mut self, args: &FetchEdgeArgs, resp: &BusResponse) {
        let outstanding = self.bus.cyc;

        if outstanding && resp.err {
            self.fetch_error = true;
            self.badaddr = self.bus.adr;
        } else if !args.f_stall {
            self.fetch_error = false;
        }

        if outstanding {
            // Complete on ack or err; abandon when the slot was killed.
            if resp.ack || resp.err || !args.f_valid {
                self.bus.release();
                self.rdata = resp.dat_r;
            }
        } else if !args.a_stall {
            self.bus = BusRequest::read(args.a_pc >> 2);
        }
    }
}

impl Default for BareFetchUnit {
    fn default() -> Self {
        Self::new()
    }
}

/// Cached fetch unit: instruction cache plus an arbitrated bare path.
pub struct CachedFetchUnit {
    icache: L1Cache,
    arbiter: BusArbiter,
    bare_bus: BusRequest,
    bare_rdata: u32,
    /// Registered A→F region select.
    f_icache_sel: bool,
    /// Registered A→F flush request.
    f_flush: bool,
    fetch_error: bool,
    badaddr: u32,
    base: u32,
    limit: u32,
    bus_out: BusRequest,
}

/// Arbiter port order for the instruction bus.
const PORT_ICACHE: usize = 0;
const PORT_BARE: usize = 1;

impl CachedFetchUnit {
    pub fn new(params: &CacheParams) -> Self {
        Self {
            icache: L1Cache::new(params),
            arbiter: BusArbiter::new(),
            bare_bus: BusRequest::default(),
            bare_rdata: NOP,
            f_icache_sel: false,
            f_flush: false,
            fetch_error: false,
            badaddr: 0,
            base: params.base,
            limit: params.limit,
            bus_out: BusRequest::default(),
        }
    }

    fn in_region(&self, pc: u32) -> bool {
        pc >= self.base && pc < self.limit
    }

    fn comb(&self, f_pc: u32, f_valid: bool) -> FetchComb {
        let a_busy = self.bare_bus.cyc;
        let flushing = self.f_flush && !self.icache.flush_done();

        if flushing {
            FetchComb {
                a_busy,
                f_busy: true,
                instruction: NOP,
                fetch_error: false,
                fetch_badaddr: 0,
                from_icache: false,
            }
        } else if self.fetch_error {
            FetchComb {
                a_busy,
                f_busy: false,
                instruction: NOP,
                fetch_error: true,
                fetch_badaddr: self.badaddr,
                from_icache: false,
            }
        } else if self.f_icache_sel {
            let word = f_pc >> 2;
            FetchComb {
                a_busy,
                f_busy: self.icache.busy() || (f_valid && self.icache.lookup(word).is_none()),
                instruction: self.icache.read_word(word),
                fetch_error: false,
                fetch_badaddr: 0,
                from_icache: true,
            }
        } else {
            FetchComb {
                a_busy,
                f_busy: self.bare_bus.cyc,
                instruction: self.bare_rdata,
                fetch_error: false,
                fetch_badaddr: 0,
                from_icache: false,
            }
        }
    }

    fn edge(&mut self, args: &FetchEdgeArgs, resp: &BusResponse) {
        let icache_resp = self.arbiter.route(resp, PORT_ICACHE);
        let bare_resp = self.arbiter.route(resp, PORT_BARE);

        // A refill or bare error lands in the F slot as a fetch fault.
        if self.bus_out.cyc && resp.err {
            self.fetch_error = true;
            self.badaddr = self.bus_out.adr;
        } else if !args.f_stall {
            self.fetch_error = false;
        }

        let op = CacheOp {
            addr: args.f_pc >> 2,
            read: self.f_icache_sel && !self.f_flush,
            evict: false,
            flush: self.f_flush,
            valid: args.f_valid || self.f_flush,
        };
        self.icache.step(&op, true, &icache_resp);

        let a_sel = self.in_region(args.a_pc);
        if self.bare_bus.cyc {
            if bare_resp.ack || bare_resp.err || !args.f_valid {
                self.bare_bus.release();
                self.bare_rdata = bare_resp.dat_r;
            }
        } else if !a_sel && !args.a_stall {
            self.bare_bus = BusRequest::read(args.a_pc >> 2);
        }

        if !args.a_stall {
            self.f_icache_sel = a_sel;
            self.f_flush = args.a_flush;
        }

        let icache_req = self.icache.bus_request();
        let granted = self.arbiter.step(&[icache_req.cyc, self.bare_bus.cyc]);
        self.bus_out = match granted {
            Some(PORT_ICACHE) => icache_req,
            Some(PORT_BARE) => self.bare_bus,
            _ => BusRequest::default(),
        };
    }
}

/// The fetch-unit variant selected at construction.
pub enum FetchUnit {
    Bare(BareFetchUnit),
    Cached(Box<CachedFetchUnit>),
}

impl FetchUnit {
    pub fn new(icache: Option<&CacheParams>) -> Self {
        match icache {
            Some(params) => FetchUnit::Cached(Box::new(CachedFetchUnit::new(params))),
            None => FetchUnit::Bare(BareFetchUnit::new()),
        }
    }

    /// Combinational outputs for the current cycle.
    pub fn comb(&self, f_pc: u32, f_valid: bool) -> FetchComb {
        match self {
            FetchUnit::Bare(unit) => unit.comb(),
            FetchUnit::Cached(unit) => unit.comb(f_pc, f_valid),
        }
    }

    /// Clock-edge update.
    pub fn edge(&mut self, args: &FetchEdgeArgs, resp: &BusResponse) {
        match self {
            FetchUnit::Bare(unit) => unit.edge(args, resp),
            FetchUnit::Cached(unit) => unit.edge(args, resp),
        }
    }

    /// The instruction-bus request presented to the outside world.
    pub fn bus_request(&self) -> BusRequest {
        match self {
            FetchUnit::Bare(unit) => unit.bus,
            FetchUnit::Cached(unit) => unit.bus_out,
        }
    }

    /// Instruction-cache statistics, when fitted.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match self {
            FetchUnit::Bare(_) => None,
            FetchUnit::Cached(unit) => Some(unit.icache.stats),
        }
    }
}
