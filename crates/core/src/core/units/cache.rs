//! L1 cache.
//!
//! Set-associative (1 or 2 ways) tagged store shared by the instruction and
//! data ports. It provides:
//! 1. **Lookup:** combinational hit check and word read, one request per
//!    cycle when hitting.
//! 2. **Control FSM:** CHECK dispatches to FLUSH (whole-cache invalidate),
//!    EVICT (invalidate one hit line), or REFILL (incrementing burst of
//!    `nwords` reads starting at word 0 of the missed line); DONE is a
//!    single recovery cycle back to CHECK.
//! 3. **Replacement:** one LRU bit per line for 2-way configurations,
//!    flipped whenever a way completes a refill.
//!
//! Stores never write cache data: the data port evicts the matching line
//! and posts the store through the write buffer, and a refill may only
//! start once the write buffer has drained (`refill_ready`).

use crate::bus::{cycle_type, BusRequest, BusResponse};
use crate::config::CacheParams;

/// One tag entry.
#[derive(Clone, Copy, Debug, Default)]
struct TagEntry {
    tag: u32,
    valid: bool,
}

/// The S2 operation presented to the cache each cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheOp {
    /// Word address of the access.
    pub addr: u32,
    /// Read lookup requested.
    pub read: bool,
    /// Evict the line matching `addr`, if any.
    pub evict: bool,
    /// Flush the whole cache.
    pub flush: bool,
    /// The requesting slot holds a live operation.
    pub valid: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum State {
    #[default]
    Check,
    Flush,
    Evict,
    Refill,
    Done,
}

/// Cache statistics.
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheStats {
    /// Lines refilled from the bus.
    pub refills: u64,
    /// Whole-cache flushes completed.
    pub flushes: u64,
}

/// One L1 cache instance.
pub struct L1Cache {
    nways: usize,
    nlines: usize,
    nwords: usize,
    offset_bits: u32,
    line_bits: u32,

    /// Tags, indexed `[way][line]`.
    tags: Vec<Vec<TagEntry>>,
    /// Data words, indexed `[way][line * nwords + offset]`.
    data: Vec<Vec<u32>>,
    /// Refill victim selector per line (2-way only).
    lru: Vec<bool>,

    state: State,
    flush_done: bool,
    flush_line: usize,
    evict_way: usize,
    evict_line: usize,
    refill_line: usize,
    refill_tag: u32,
    refill_offset: usize,
    refill_way: usize,
    refill_error: bool,

    /// Refill bus master port (registered).
    bus: BusRequest,

    pub stats: CacheStats,
}

impl L1Cache {
    /// Builds a cache from validated geometry.
    pub fn new(params: &CacheParams) -> Self {
        let offset_bits = params.nwords.trailing_zeros();
        let line_bits = params.nlines.trailing_zeros();
        Self {
            nways: params.nways,
            nlines: params.nlines,
            nwords: params.nwords,
            offset_bits,
            line_bits,
            tags: vec![vec![TagEntry::default(); params.nlines]; params.nways],
            data: vec![vec![0; params.nlines * params.nwords]; params.nways],
            lru: vec![false; params.nlines],
            state: State::Check,
            flush_done: false,
            flush_line: 0,
            evict_way: 0,
            evict_line: 0,
            refill_line: 0,
            refill_tag: 0,
            refill_offset: 0,
            refill_way: 0,
            refill_error: false,
            bus: BusRequest::default(),
            stats: CacheStats::default(),
        }
    }

    /// Splits a word address into `(offset, line, tag)`.
    fn split(&self, word_addr: u32) -> (usize, usize, u32) {
        let offset = (word_addr & ((1 << self.offset_bits) - 1)) as usize;
        let line = ((word_addr >> self.offset_bits) & ((1 << self.line_bits) - 1)) as usize;
        let tag = word_addr >> (self.offset_bits + self.line_bits);
        (offset, line, tag)
    }

    /// The way hitting `word_addr`, if any.
    pub fn lookup(&self, word_addr: u32) -> Option<usize> {
        let (_, line, tag) = self.split(word_addr);
        (0..self.nways).find(|&way| {
            let entry = &self.tags[way][line];
            entry.valid && entry.tag == tag
        })
    }

    /// Reads the word at a hitting address; zero when missing.
    pub fn read_word(&self, word_addr: u32) -> u32 {
        let (offset, line, _) = self.split(word_addr);
        match self.lookup(word_addr) {
            Some(way) => self.data[way][line * self.nwords + offset],
            None => 0,
        }
    }

    /// True while the FSM is doing anything other than sitting idle in
    /// CHECK. S1 must not be treated as ready while this holds.
    pub fn busy(&self) -> bool {
        self.state != State::Check
    }

    /// True once a flush has completed and the flush request is still held
    /// high; cleared when the request drops.
    pub fn flush_done(&self) -> bool {
        self.flush_done
    }

    /// The refill port's registered request.
    pub fn bus_request(&self) -> BusRequest {
        self.bus
    }

    /// Advances the control FSM by one cycle.
    ///
    /// `refill_ready` gates CHECK→REFILL; the data port holds it low until
    /// the write buffer has drained. `resp` is this cycle's response on the
    /// refill port.
    pub fn step(&mut self, op: &CacheOp, refill_ready: bool, resp: &BusResponse) {
        if !op.flush {
            self.flush_done = false;
        }

        match self.state {
            State::Check => {
                if op.flush && op.valid && !self.flush_done {
                    self.flush_line = self.nlines - 1;
                    self.state = State::Flush;
                } else if op.evict && op.valid {
                    if let Some(way) = self.lookup(op.addr) {
                        let (_, line, _) = self.split(op.addr);
                        self.evict_way = way;
                        self.evict_line = line;
                        self.state = State::Evict;
                    }
                } else if op.read && op.valid && self.lookup(op.addr).is_none() && refill_ready {
                    let (_, line, tag) = self.split(op.addr);
                    self.refill_line = line;
                    self.refill_tag = tag;
                    self.refill_offset = 0;
                    self.refill_way = usize::from(self.nways == 2 && self.lru[line]);
                    self.refill_error = false;
                    let line_base = op.addr & !((1 << self.offset_bits) - 1);
                    self.bus = BusRequest {
                        adr: line_base,
                        sel: 0b1111,
                        cyc: true,
                        stb: true,
                        we: false,
                        cti: if self.nwords == 1 {
                            cycle_type::END
                        } else {
                            cycle_type::INCREMENT
                        },
                        bte: (self.offset_bits - 1) as u8,
                        dat_w: 0,
                    };
                    self.stats.refills += 1;
                    tracing::debug!(
                        target: "rv32pipe_core::cache",
                        addr = format_args!("{:#x}", op.addr << 2),
                        line,
                        way = self.refill_way,
                        "refill"
                    );
                    self.state = State::Refill;
                }
            }
            State::Flush => {
                for way in 0..self.nways {
                    self.tags[way][self.flush_line].valid = false;
                }
                if self.flush_line == 0 {
                    self.flush_done = true;
                    self.stats.flushes += 1;
                    self.state = State::Done;
                } else {
                    self.flush_line -= 1;
                }
            }
            State::Evict => {
                self.tags[self.evict_way][self.evict_line].valid = false;
                self.state = State::Done;
            }
            State::Refill => {
                if resp.ack || resp.err {
                    if resp.err {
                        self.refill_error = true;
                    }
                    self.data[self.refill_way][self.refill_line * self.nwords + self.refill_offset] =
                        resp.dat_r;
                    if self.refill_offset == self.nwords - 1 {
                        if !self.refill_error {
                            self.tags[self.refill_way][self.refill_line] = TagEntry {
                                tag: self.refill_tag,
                                valid: true,
                            };
                        }
                        if self.nways == 2 {
                            self.lru[self.refill_line] = !self.lru[self.refill_line];
                        }
                        self.bus.release();
                        self.state = State::Done;
                    } else {
                        self.refill_offset += 1;
                        self.bus.adr += 1;
                        self.bus.cti = if self.refill_offset == self.nwords - 1 {
                            cycle_type::END
                        } else {
                            cycle_type::INCREMENT
                        };
                    }
                }
            }
            State::Done => {
                self.state = State::Check;
            }
        }
    }
}
