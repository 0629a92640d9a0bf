//! Simulation statistics.

/// Counters maintained by the core while it runs.
#[derive(Clone, Copy, Debug, Default)]
pub struct CoreStats {
    /// Clock cycles stepped.
    pub cycles: u64,
    /// Instructions retired (including trapped instructions).
    pub retired: u64,
    /// Traps delivered (exceptions and interrupts).
    pub traps: u64,
    /// Branches and jumps resolved against the prediction at M.
    pub mispredicts: u64,
    /// Instruction-cache refills (misses).
    pub icache_refills: u64,
    /// Instruction fetches served by the instruction cache.
    pub icache_accesses: u64,
    /// Data-cache refills (misses).
    pub dcache_refills: u64,
    /// Data-cache read accesses.
    pub dcache_accesses: u64,
    /// Posted stores drained from the write buffer.
    pub wrbuf_drains: u64,
}

impl CoreStats {
    /// Cycles per retired instruction.
    pub fn cpi(&self) -> f64 {
        if self.retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.retired as f64
        }
    }

    /// A human-readable multi-line summary.
    pub fn summary(&self) -> String {
        format!(
            "cycles            {}\n\
             retired           {}\n\
             cpi               {:.2}\n\
             traps             {}\n\
             mispredicts       {}\n\
             icache accesses   {} ({} refills)\n\
             dcache accesses   {} ({} refills)\n\
             wrbuf drains      {}",
            self.cycles,
            self.retired,
            self.cpi(),
            self.traps,
            self.mispredicts,
            self.icache_accesses,
            self.icache_refills,
            self.dcache_accesses,
            self.dcache_refills,
            self.wrbuf_drains,
        )
    }
}
