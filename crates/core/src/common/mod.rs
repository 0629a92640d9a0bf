//! Common types shared across the core: traps and interrupt inputs.

pub mod trap;

pub use trap::Trap;

/// Level-sensitive interrupt inputs, sampled once per cycle.
///
/// These are the architectural interrupt pins of the core. `fast` carries the
/// sixteen fast-interrupt lines, gated by the `irq_mask` CSR before they can
/// pend.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InterruptLines {
    /// Machine software interrupt request.
    pub software: bool,
    /// Machine timer interrupt request.
    pub timer: bool,
    /// Machine external interrupt request.
    pub external: bool,
    /// Fast interrupt requests 0..15.
    pub fast: u16,
}
