//! Execution and memory-path units.
//!
//! Leaf components of the pipeline:
//! 1. **Integer units:** adder, logic, shifter, comparator, multiplier,
//!    divider.
//! 2. **Control-flow:** static branch predictor and the PC selector (in
//!    [`fetch`]).
//! 3. **Memory path:** fetch and load/store units (bare and cached
//!    variants), the L1 cache, and the write buffer.
//! 4. **Privilege:** the exception unit and the RVFI retire monitor.

pub mod adder;
pub mod cache;
pub mod compare;
pub mod divider;
pub mod exception;
pub mod fetch;
pub mod loadstore;
pub mod logic;
pub mod multiplier;
pub mod predict;
pub mod rvficon;
pub mod shifter;
pub mod wrbuf;
