//! Simulator: owns the core, the RAM, and one memory port per bus.
//!
//! Devices observe the core's registered bus outputs from the end of the
//! previous cycle and answer during the current one, which models
//! synchronous bus slaves. Both ports share one RAM, so stores become
//! visible to instruction fetch — self-modifying code works once FENCE.I
//! has flushed the instruction cache.

use crate::bus::BusRequest;
use crate::common::InterruptLines;
use crate::config::{ConfigError, CoreConfig};
use crate::core::{Core, CycleInputs, CycleOutputs, RvfiPacket};
use crate::sim::memory::{MemoryPort, Ram};

/// The simulator.
pub struct Simulator {
    pub core: Core,
    pub ram: Ram,
    iport: MemoryPort,
    dport: MemoryPort,
    ibus_req: BusRequest,
    dbus_req: BusRequest,
    /// Interrupt levels presented to the core each cycle.
    pub irq: InterruptLines,
}

impl Simulator {
    /// Builds a simulator with the given memory latency (cycles to first
    /// ack).
    pub fn new(config: &CoreConfig, ram: Ram, mem_latency: u32) -> Result<Self, ConfigError> {
        Ok(Self {
            core: Core::new(config)?,
            ram,
            iport: MemoryPort::new(mem_latency),
            dport: MemoryPort::new(mem_latency),
            ibus_req: BusRequest::default(),
            dbus_req: BusRequest::default(),
            irq: InterruptLines::default(),
        })
    }

    /// Advances the system by one clock cycle.
    pub fn step(&mut self) -> Option<RvfiPacket> {
        let ibus = self.iport.respond(&self.ibus_req, &mut self.ram);
        let dbus = self.dport.respond(&self.dbus_req, &mut self.ram);

        let CycleOutputs {
            ibus: ibus_req,
            dbus: dbus_req,
            retire,
        } = self.core.step(&CycleInputs {
            ibus,
            dbus,
            irq: self.irq,
        });

        self.ibus_req = ibus_req;
        self.dbus_req = dbus_req;
        retire
    }

    /// Runs for `cycles` clock cycles.
    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            let _ = self.step();
        }
    }

    /// Runs until `count` instructions have retired.
    ///
    /// Returns false when `max_cycles` elapse first.
    pub fn run_until_retired(&mut self, count: u64, max_cycles: u64) -> bool {
        for _ in 0..max_cycles {
            if self.core.stats().retired >= count {
                return true;
            }
            let _ = self.step();
        }
        self.core.stats().retired >= count
    }
}
