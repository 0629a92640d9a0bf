//! Load/store unit.
//!
//! This module contains the data-path selection logic and the two
//! load/store variants:
//! 1. **Data selector:** byte-enable and store-lane shifting for {B, H, W}
//!    accesses at X, misalignment detection, and load-result alignment and
//!    extension at W.
//! 2. **Bare unit:** drives the data bus directly; loads and stores hold M
//!    until the transaction completes.
//! 3. **Cached unit:** routes cacheable reads through the data cache (hit
//!    data available at M), posts cacheable stores through the write buffer
//!    after evicting the matching line, and sends everything else down the
//!    bare path. FENCE.I drains the write buffer before X may advance.
//!
//! Bus errors are captured into load/store error flags with the faulting
//! address and reported at M for trap delivery. Errors on posted writes are
//! imprecise: they blame the instruction occupying M when the error
//! returns.

use crate::bus::arbiter::BusArbiter;
use crate::bus::{BusRequest, BusResponse};
use crate::config::CacheParams;
use crate::core::units::cache::{CacheOp, CacheStats, L1Cache};
use crate::core::units::wrbuf::{WrBufEntry, WriteBuffer};
use crate::isa::funct3;

/// X-stage store/byte-select outputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DataSelect {
    /// Byte enables for the access.
    pub mask: u8,
    /// Store data shifted into lane position.
    pub store_data: u32,
    /// The access is misaligned for its width.
    pub misaligned: bool,
}

/// Computes byte enables, shifted store data, and misalignment at X.
pub fn data_select(f3: u8, offset: u8, store_operand: u32) -> DataSelect {
    let offset = u32::from(offset & 0b11);
    match u32::from(f3) & 0b011 {
        funct3::B => DataSelect {
            mask: (1 << offset) as u8,
            store_data: (store_operand & 0xFF) << (offset * 8),
            misaligned: false,
        },
        funct3::H => DataSelect {
            mask: (0b11 << offset) as u8,
            store_data: (store_operand & 0xFFFF) << (offset * 8),
            misaligned: offset & 0b01 != 0,
        },
        funct3::W => DataSelect {
            mask: 0b1111,
            store_data: store_operand,
            misaligned: offset != 0,
        },
        _ => DataSelect::default(),
    }
}

/// Aligns and extends a loaded word at W.
pub fn load_select(f3: u8, offset: u8, data: u32) -> u32 {
    let shift = u32::from(offset & 0b11) * 8;
    match u32::from(f3) {
        funct3::B => ((data >> shift) as u8 as i8) as i32 as u32,
        funct3::BU => u32::from((data >> shift) as u8),
        funct3::H => ((data >> shift) as u16 as i16) as i32 as u32,
        funct3::HU => u32::from((data >> shift) as u16),
        _ => data,
    }
}

/// A memory operation leaving X on an un-stalled, valid cycle.
#[derive(Clone, Copy, Debug)]
pub struct MemIssue {
    /// Byte address.
    pub addr: u32,
    pub mask: u8,
    pub store_data: u32,
    pub load: bool,
    pub store: bool,
}

/// Combinational query inputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LsuQuery {
    pub x_valid: bool,
    pub x_fence_i: bool,
    pub x_load: bool,
    pub x_store: bool,
    /// Computed effective address at X (byte).
    pub x_addr: u32,
    pub m_valid: bool,
    pub m_load: bool,
    pub m_store: bool,
    /// Effective address of the slot at M (byte).
    pub m_addr: u32,
    pub m_misaligned: bool,
}

/// Combinational outputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LsuComb {
    /// X may not hand its operation over yet.
    pub x_busy: bool,
    /// The M-stage operation has not completed.
    pub m_busy: bool,
    /// Raw loaded word for the slot at M.
    pub m_load_data: u32,
    pub load_error: bool,
    pub store_error: bool,
    /// Faulting word address.
    pub badaddr: u32,
    /// The load at M is served by the data cache.
    pub from_dcache: bool,
}

/// Clock-edge inputs.
#[derive(Clone, Copy, Debug, Default)]
pub struct LsuEdgeArgs {
    /// Present when a load/store leaves X this cycle (valid, un-stalled,
    /// aligned).
    pub x_issue: Option<MemIssue>,
    pub x_stall: bool,
    /// Computed effective address at X, registered into the M-side region
    /// select.
    pub x_addr: u32,
    pub x_mask: u8,
    pub m_valid: bool,
    pub m_load: bool,
    pub m_store: bool,
    pub m_addr: u32,
    pub m_misaligned: bool,
    pub m_store_data: u32,
    pub m_stall: bool,
}

/// Bare load/store unit: one registered bus master.
pub struct BareLoadStoreUnit {
    bus: BusRequest,
    rdata: u32,
    load_error: bool,
    store_error: bool,
    badaddr: u32,
}

impl BareLoadStoreUnit {
    pub fn new() -> Self {
        Self {
            bus: BusRequest::default(),
            rdata: 0,
            load_error: false,
            store_error: false,
            badaddr: 0,
        }
    }

    fn comb(&self, q: &LsuQuery) -> LsuComb {
        LsuComb {
            x_busy: self.bus.cyc && q.x_valid && (q.x_load || q.x_store),
            m_busy: self.bus.cyc,
            m_load_data: self.rdata,
            load_error: self.load_error,
            store_error: self.store_error,
            badaddr: self.badaddr,
            from_dcache: false,
        }
    }

    fn edge(&mut self, args: &LsuEdgeArgs, resp: &BusResponse) {
        let outstanding = self.bus.cyc;

        if outstanding && resp.err {
            if self.bus.we {
                self.store_error = true;
            } else {
                self.load_error = true;
            }
            self.badaddr = self.bus.adr;
        } else if !args.m_stall {
            self.load_error = false;
            self.store_error = false;
        }

        if outstanding {
            if resp.ack || resp.err {
                self.bus.release();
                self.rdata = resp.dat_r;
            }
        } else if let Some(issue) = args.x_issue {
            self.bus = if issue.store {
                BusRequest::write(issue.addr >> 2, issue.mask, issue.store_data)
            } else {
                BusRequest {
                    sel: issue.mask,
                    ..BusRequest::read(issue.addr >> 2)
                }
            };
        }
    }
}

impl Default for BareLoadStoreUnit {
    fn default() -> Self {
        Self::new()
    }
}

/// Arbiter port order for the data bus: posted writes drain ahead of
/// refills, refills ahead of uncached traffic.
const PORT_WRBUF: usize = 0;
const PORT_DCACHE: usize = 1;
const PORT_BARE: usize = 2;

/// Cached load/store unit.
pub struct CachedLoadStoreUnit {
    dcache: L1Cache,
    wrbuf: WriteBuffer,
    arbiter: BusArbiter,
    bare_bus: BusRequest,
    bare_rdata: u32,
    /// Registered X→M region select.
    m_dcache_sel: bool,
    /// Registered X→M byte enables.
    m_mask: u8,
    load_error: bool,
    store_error: bool,
    badaddr: u32,
    base: u32,
    limit: u32,
    bus_out: BusRequest,
    /// Posted stores drained to the bus.
    pub wrbuf_drains: u64,
}

impl CachedLoadStoreUnit {
    pub fn new(params: &CacheParams, wrbuf_depth: usize) -> Self {
        Self {
            dcache: L1Cache::new(params),
            wrbuf: WriteBuffer::new(wrbuf_depth),
            arbiter: BusArbiter::new(),
            bare_bus: BusRequest::default(),
            bare_rdata: 0,
            m_dcache_sel: false,
            m_mask: 0,
            load_error: false,
            store_error: false,
            badaddr: 0,
            base: params.base,
            limit: params.limit,
            bus_out: BusRequest::default(),
            wrbuf_drains: 0,
        }
    }

    fn in_region(&self, addr: u32) -> bool {
        addr >= self.base && addr < self.limit
    }

    fn comb(&self, q: &LsuQuery) -> LsuComb {
        let x_sel = self.in_region(q.x_addr);
        let fence_drain = q.x_fence_i && q.x_valid && !self.wrbuf.drained();
        let x_busy = fence_drain
            || (q.x_store && q.x_valid && x_sel && !self.wrbuf.w_rdy())
            || (self.bare_bus.cyc && q.x_valid && (q.x_load || q.x_store) && !x_sel);

        let m_sel = self.m_dcache_sel;
        let m_read_pending = q.m_load
            && q.m_valid
            && m_sel
            && !q.m_misaligned
            && self.dcache.lookup(q.m_addr >> 2).is_none();
        let m_busy = self.dcache.busy()
            || m_read_pending
            || self.bare_bus.cyc
            || (q.m_store && q.m_valid && m_sel && !self.wrbuf.w_rdy());

        LsuComb {
            x_busy,
            m_busy,
            m_load_data: if m_sel {
                self.dcache.read_word(q.m_addr >> 2)
            } else {
                self.bare_rdata
            },
            load_error: self.load_error,
            store_error: self.store_error,
            badaddr: self.badaddr,
            from_dcache: m_sel,
        }
    }

    fn edge(&mut self, args: &LsuEdgeArgs, resp: &BusResponse) {
        let wrbuf_resp = self.arbiter.route(resp, PORT_WRBUF);
        let dcache_resp = self.arbiter.route(resp, PORT_DCACHE);
        let bare_resp = self.arbiter.route(resp, PORT_BARE);

        if self.bus_out.cyc && resp.err {
            if self.bus_out.we {
                self.store_error = true;
            } else {
                self.load_error = true;
            }
            self.badaddr = self.bus_out.adr;
        } else if !args.m_stall {
            self.load_error = false;
            self.store_error = false;
        }

        if let Some(err) = self.wrbuf.step(&wrbuf_resp, &mut self.wrbuf_drains) {
            self.store_error = true;
            self.badaddr = err.adr;
        }

        let m_mem_op = args.m_valid && self.m_dcache_sel && !args.m_misaligned;
        let op = CacheOp {
            addr: args.m_addr >> 2,
            read: args.m_load && m_mem_op,
            evict: args.m_store && m_mem_op,
            flush: false,
            valid: args.m_valid,
        };
        self.dcache.step(&op, self.wrbuf.drained(), &dcache_resp);

        if self.bare_bus.cyc {
            if bare_resp.ack || bare_resp.err {
                self.bare_bus.release();
                self.bare_rdata = bare_resp.dat_r;
            }
        } else if let Some(issue) = args.x_issue {
            if !self.in_region(issue.addr) {
                self.bare_bus = if issue.store {
                    BusRequest::write(issue.addr >> 2, issue.mask, issue.store_data)
                } else {
                    BusRequest {
                        sel: issue.mask,
                        ..BusRequest::read(issue.addr >> 2)
                    }
                };
            }
        }

        // A cacheable store leaves M: the matching line is being evicted,
        // the data is posted.
        if args.m_store && m_mem_op && !args.m_stall {
            self.wrbuf.push(WrBufEntry {
                adr: args.m_addr >> 2,
                sel: self.m_mask,
                data: args.m_store_data,
            });
        }

        if !args.x_stall {
            self.m_dcache_sel = self.in_region(args.x_addr);
            self.m_mask = args.x_mask;
        }

        let wrbuf_req = self.wrbuf.bus_request();
        let dcache_req = self.dcache.bus_request();
        let granted = self
            .arbiter
            .step(&[wrbuf_req.cyc, dcache_req.cyc, self.bare_bus.cyc]);
        self.bus_out = match granted {
            Some(PORT_WRBUF) => wrbuf_req,
            Some(PORT_DCACHE) => dcache_req,
            Some(PORT_BARE) => self.bare_bus,
            _ => BusRequest::default(),
        };
    }
}

/// The load/store variant selected at construction.
pub enum LoadStoreUnit {
    Bare(BareLoadStoreUnit),
    Cached(Box<CachedLoadStoreUnit>),
}

impl LoadStoreUnit {
    pub fn new(dcache: Option<&CacheParams>, wrbuf_depth: usize) -> Self {
        match dcache {
            Some(params) => {
                LoadStoreUnit::Cached(Box::new(CachedLoadStoreUnit::new(params, wrbuf_depth)))
            }
            None => LoadStoreUnit::Bare(BareLoadStoreUnit::new()),
        }
    }

    /// Combinational outputs for the current cycle.
    pub fn comb(&self, q: &LsuQuery) -> LsuComb {
        match self {
            LoadStoreUnit::Bare(unit) => unit.comb(q),
            LoadStoreUnit::Cached(unit) => unit.comb(q),
        }
    }

    /// Clock-edge update.
    pub fn edge(&mut self, args: &LsuEdgeArgs, resp: &BusResponse) {
        match self {
            LoadStoreUnit::Bare(unit) => unit.edge(args, resp),
            LoadStoreUnit::Cached(unit) => unit.edge(args, resp),
        }
    }

    /// The data-bus request presented to the outside world.
    pub fn bus_request(&self) -> BusRequest {
        match self {
            LoadStoreUnit::Bare(unit) => unit.bus,
            LoadStoreUnit::Cached(unit) => unit.bus_out,
        }
    }

    /// Data-cache statistics, when fitted.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        match self {
            LoadStoreUnit::Bare(_) => None,
            LoadStoreUnit::Cached(unit) => Some(unit.dcache.stats),
        }
    }

    /// Posted stores drained so far.
    pub fn wrbuf_drains(&self) -> u64 {
        match self {
            LoadStoreUnit::Bare(_) => 0,
            LoadStoreUnit::Cached(unit) => unit.wrbuf_drains,
        }
    }
}
