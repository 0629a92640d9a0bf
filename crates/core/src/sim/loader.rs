//! Binary loader.
//!
//! Loads programs into simulator RAM:
//! 1. **ELF:** 32-bit RISC-V executables; every PT_LOAD segment is copied
//!    to its physical address and the entry point is returned.
//! 2. **Flat binary:** raw bytes at an explicit base address.

use object::read::elf::ElfFile32;
use object::{Endianness, Object, ObjectSegment};
use thiserror::Error;

use crate::sim::memory::Ram;

/// Loader failures.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse ELF: {0}")]
    Elf(#[from] object::read::Error),

    #[error("image is not a 32-bit RISC-V executable")]
    WrongArchitecture,

    #[error("segment {addr:#x}..{end:#x} does not fit in RAM")]
    SegmentOutOfRange { addr: u32, end: u64 },
}

/// Loads a 32-bit RISC-V ELF image into RAM and returns its entry point.
pub fn load_elf(ram: &mut Ram, image: &[u8]) -> Result<u32, LoadError> {
    let file = ElfFile32::<Endianness>::parse(image)?;
    if file.architecture() != object::Architecture::Riscv32 {
        return Err(LoadError::WrongArchitecture);
    }

    for segment in file.segments() {
        let addr = segment.address() as u32;
        let data = segment.data()?;
        if data.is_empty() {
            continue;
        }
        if !ram.write_bytes(addr, data) {
            return Err(LoadError::SegmentOutOfRange {
                addr,
                end: u64::from(addr) + data.len() as u64,
            });
        }
        tracing::debug!(
            target: "rv32pipe_core::loader",
            addr = format_args!("{addr:#010x}"),
            size = data.len(),
            "loaded segment"
        );
    }

    Ok(file.entry() as u32)
}

/// Loads a flat binary at `base`.
pub fn load_binary(ram: &mut Ram, image: &[u8], base: u32) -> Result<(), LoadError> {
    if ram.write_bytes(base, image) {
        Ok(())
    } else {
        Err(LoadError::SegmentOutOfRange {
            addr: base,
            end: u64::from(base) + image.len() as u64,
        })
    }
}
