//! RISC-V formal interface (RVFI) retire monitor.
//!
//! A passive observer that assembles one packet per retired instruction.
//! Capture registers track each instruction through the pipeline, keyed on
//! the stage-ready signals, so the packet reflects exactly what the
//! pipeline did: source values after bypassing, the memory access masks and
//! data, the CSR access, and the architectural next PC. The `order` field
//! is strictly monotonic across retires.

/// Per-retire CSR access channel.
///
/// RV32IM instructions touch at most one CSR, so the per-CSR channel set
/// collapses to a single record tagged with the address.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RvfiCsr {
    pub addr: u16,
    pub rmask: u32,
    pub wmask: u32,
    pub rdata: u32,
    pub wdata: u32,
}

/// One retired instruction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RvfiPacket {
    /// Retire sequence number, strictly monotonic.
    pub order: u64,
    pub insn: u32,
    pub trap: bool,
    pub halt: bool,
    /// The first instruction of a trap handler.
    pub intr: bool,
    /// Machine mode.
    pub mode: u8,
    /// XLEN=32.
    pub ixl: u8,
    pub rs1_addr: u8,
    pub rs2_addr: u8,
    pub rs1_rdata: u32,
    pub rs2_rdata: u32,
    pub rd_addr: u8,
    pub rd_wdata: u32,
    pub pc_rdata: u32,
    pub pc_wdata: u32,
    pub mem_addr: u32,
    pub mem_rmask: u8,
    pub mem_wmask: u8,
    pub mem_rdata: u32,
    pub mem_wdata: u32,
    /// The CSR access, when the instruction performed one.
    pub csr: Option<RvfiCsr>,
}

/// D-stage capture.
#[derive(Clone, Copy, Debug, Default)]
pub struct RvfiDCapture {
    pub insn: u32,
    pub rs1_addr: u8,
    pub rs2_addr: u8,
}

/// X-stage capture.
#[derive(Clone, Copy, Debug, Default)]
pub struct RvfiXCapture {
    pub rs1_rdata: u32,
    pub rs2_rdata: u32,
    pub mem_addr: u32,
    pub mem_rmask: u8,
    pub mem_wmask: u8,
    pub mem_wdata: u32,
    pub csr: Option<RvfiCsr>,
}

/// M-stage capture.
#[derive(Clone, Copy, Debug, Default)]
pub struct RvfiMCapture {
    pub mem_rdata: u32,
    pub pc_rdata: u32,
    /// Architectural next PC, including trap redirection.
    pub pc_wdata: u32,
    pub trap: bool,
    pub intr: bool,
}

/// The retire monitor.
///
/// One capture register set per slot, shifted on the stage-ready signals so
/// the observations travel with their instruction.
#[derive(Debug, Default)]
pub struct RvfiController {
    order: u64,
    x_d: RvfiDCapture,
    m_d: RvfiDCapture,
    m_x: RvfiXCapture,
    w_d: RvfiDCapture,
    w_x: RvfiXCapture,
    w_m: RvfiMCapture,
}

impl RvfiController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures decode-stage observations; call on every un-stalled D cycle.
    pub fn capture_d(&mut self, capture: RvfiDCapture) {
        self.x_d = capture;
    }

    /// Captures execute-stage observations; call on every un-stalled X
    /// cycle.
    pub fn capture_x(&mut self, capture: RvfiXCapture) {
        self.m_d = self.x_d;
        self.m_x = capture;
    }

    /// Captures memory-stage observations; call on every un-stalled M
    /// cycle.
    pub fn capture_m(&mut self, capture: RvfiMCapture) {
        self.w_d = self.m_d;
        self.w_x = self.m_x;
        self.w_m = capture;
    }

    /// Emits the packet for the instruction committing at W.
    ///
    /// `rd_addr`/`rd_wdata` describe the general-register write actually
    /// performed (zero when suppressed).
    pub fn retire(&mut self, rd_addr: u8, rd_wdata: u32) -> RvfiPacket {
        let packet = RvfiPacket {
            order: self.order,
            insn: self.w_d.insn,
            trap: self.w_m.trap,
            halt: false,
            intr: self.w_m.intr,
            mode: 3,
            ixl: 1,
            rs1_addr: self.w_d.rs1_addr,
            rs2_addr: self.w_d.rs2_addr,
            rs1_rdata: self.w_x.rs1_rdata,
            rs2_rdata: self.w_x.rs2_rdata,
            rd_addr,
            rd_wdata,
            pc_rdata: self.w_m.pc_rdata,
            pc_wdata: self.w_m.pc_wdata,
            mem_addr: self.w_x.mem_addr,
            mem_rmask: self.w_x.mem_rmask,
            mem_wmask: self.w_x.mem_wmask,
            mem_rdata: self.w_m.mem_rdata,
            mem_wdata: self.w_x.mem_wdata,
            csr: self.w_x.csr,
        };
        self.order += 1;
        packet
    }
}
