//! Write buffer.
//!
//! Bounded FIFO of posted stores fronting the data cache. Entries are
//! enqueued in commit order at M and drain onto the bus as single-beat
//! write cycles, popping on ack or err. `w_rdy` back-pressures the pipeline
//! when the FIFO is full.

use std::collections::VecDeque;

use crate::bus::{BusRequest, BusResponse};

/// One posted store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WrBufEntry {
    /// Word address.
    pub adr: u32,
    /// Byte enables.
    pub sel: u8,
    /// Store data, already shifted into lane position.
    pub data: u32,
}

/// A completed drain transaction that terminated with a bus error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrainError {
    /// Word address of the failed write.
    pub adr: u32,
}

/// The write buffer with its drain FSM.
pub struct WriteBuffer {
    entries: VecDeque<WrBufEntry>,
    depth: usize,
    /// Drain bus master port (registered).
    bus: BusRequest,
}

impl WriteBuffer {
    pub fn new(depth: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(depth),
            depth,
            bus: BusRequest::default(),
        }
    }

    /// Back-pressure: a store can be enqueued this cycle.
    pub fn w_rdy(&self) -> bool {
        self.entries.len() < self.depth
    }

    /// True when no posted store remains buffered or in flight.
    pub fn drained(&self) -> bool {
        self.entries.is_empty() && !self.bus.cyc
    }

    /// Enqueues a posted store. Call only when [`w_rdy`](Self::w_rdy).
    pub fn push(&mut self, entry: WrBufEntry) {
        debug_assert!(self.w_rdy());
        self.entries.push_back(entry);
    }

    /// The drain port's registered request.
    pub fn bus_request(&self) -> BusRequest {
        self.bus
    }

    /// Advances the drain FSM by one cycle.
    ///
    /// Returns the error record when the in-flight write terminated with a
    /// bus error. Completed drains are reported through `drains`.
    pub fn step(&mut self, resp: &BusResponse, drains: &mut u64) -> Option<DrainError> {
        let mut error = None;
        if self.bus.cyc {
            if resp.ack || resp.err {
                if resp.err {
                    error = Some(DrainError { adr: self.bus.adr });
                }
                *drains += 1;
                self.bus.release();
            }
        } else if let Some(entry) = self.entries.pop_front() {
            self.bus = BusRequest::write(entry.adr, entry.sel, entry.data);
        }
        error
    }
}
