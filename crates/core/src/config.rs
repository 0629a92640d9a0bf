//! Core configuration.
//!
//! This module defines the construction-time parameters of the core:
//! 1. **Defaults:** baseline geometry constants for caches and the write
//!    buffer.
//! 2. **Structures:** `CoreConfig` and `CacheParams`, deserializable from
//!    JSON.
//! 3. **Validation:** the geometry constraints every configuration must
//!    satisfy before a core is built.

use serde::Deserialize;
use thiserror::Error;

/// Default configuration constants.
mod defaults {
    /// Reset address: the first instruction is fetched from here.
    pub const RESET_ADDRESS: u32 = 0x0000_0000;

    /// Cache associativity (direct-mapped).
    pub const CACHE_NWAYS: usize = 1;

    /// Cache line count.
    pub const CACHE_NLINES: usize = 32;

    /// Cache line size in 32-bit words.
    pub const CACHE_NWORDS: usize = 4;

    /// Cacheable region base.
    pub const CACHE_BASE: u32 = 0;

    /// Cacheable region limit (exclusive).
    pub const CACHE_LIMIT: u32 = 1 << 31;

    /// Write-buffer depth in entries.
    pub const WRBUF_DEPTH: usize = 8;
}

/// Errors produced by [`CoreConfig::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{cache} cache associativity must be 1 or 2, not {nways}")]
    Associativity { cache: &'static str, nways: usize },

    #[error("{cache} cache line count must be a non-zero power of two, not {nlines}")]
    LineCount { cache: &'static str, nlines: usize },

    #[error("{cache} cache line size must be 4, 8 or 16 words, not {nwords}")]
    LineSize { cache: &'static str, nwords: usize },

    #[error("{cache} cacheable region {base:#x}..{limit:#x} must span a power of two")]
    RegionSize {
        cache: &'static str,
        base: u32,
        limit: u32,
    },

    #[error("{cache} cacheable region base {base:#x} must be a multiple of its size {size:#x}")]
    RegionAlignment {
        cache: &'static str,
        base: u32,
        size: u32,
    },

    #[error("{cache} cacheable region is smaller than one cache fill ({lines} lines of {words} words)")]
    RegionTooSmall {
        cache: &'static str,
        lines: usize,
        words: usize,
    },

    #[error("write buffer depth must be at least 1")]
    WriteBufferDepth,
}

/// Geometry of one L1 cache.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
pub struct CacheParams {
    /// Associativity; 1 or 2 ways.
    #[serde(default = "CacheParams::default_nways")]
    pub nways: usize,

    /// Number of lines per way; a power of two.
    #[serde(default = "CacheParams::default_nlines")]
    pub nlines: usize,

    /// Line size in 32-bit words; 4, 8 or 16.
    #[serde(default = "CacheParams::default_nwords")]
    pub nwords: usize,

    /// Cacheable region base (byte address).
    #[serde(default = "CacheParams::default_base")]
    pub base: u32,

    /// Cacheable region limit, exclusive (byte address).
    #[serde(default = "CacheParams::default_limit")]
    pub limit: u32,
}

impl CacheParams {
    fn default_nways() -> usize {
        defaults::CACHE_NWAYS
    }

    fn default_nlines() -> usize {
        defaults::CACHE_NLINES
    }

    fn default_nwords() -> usize {
        defaults::CACHE_NWORDS
    }

    fn default_base() -> u32 {
        defaults::CACHE_BASE
    }

    fn default_limit() -> u32 {
        defaults::CACHE_LIMIT
    }

    /// Validates this cache's geometry.
    fn validate(&self, cache: &'static str) -> Result<(), ConfigError> {
        if !matches!(self.nways, 1 | 2) {
            return Err(ConfigError::Associativity {
                cache,
                nways: self.nways,
            });
        }
        if self.nlines == 0 || !self.nlines.is_power_of_two() {
            return Err(ConfigError::LineCount {
                cache,
                nlines: self.nlines,
            });
        }
        if !matches!(self.nwords, 4 | 8 | 16) {
            return Err(ConfigError::LineSize {
                cache,
                nwords: self.nwords,
            });
        }
        let size = self.limit.wrapping_sub(self.base);
        if size == 0 || !size.is_power_of_two() {
            return Err(ConfigError::RegionSize {
                cache,
                base: self.base,
                limit: self.limit,
            });
        }
        if self.base % size != 0 {
            return Err(ConfigError::RegionAlignment {
                cache,
                base: self.base,
                size,
            });
        }
        if (size as usize) < self.nlines * self.nwords * 4 {
            return Err(ConfigError::RegionTooSmall {
                cache,
                lines: self.nlines,
                words: self.nwords,
            });
        }
        Ok(())
    }
}

impl Default for CacheParams {
    fn default() -> Self {
        Self {
            nways: defaults::CACHE_NWAYS,
            nlines: defaults::CACHE_NLINES,
            nwords: defaults::CACHE_NWORDS,
            base: defaults::CACHE_BASE,
            limit: defaults::CACHE_LIMIT,
        }
    }
}

/// Construction-time configuration of one core.
///
/// Deserializable from JSON:
///
/// ```
/// use rv32pipe_core::config::CoreConfig;
///
/// let json = r#"{
///     "reset_address": 2147483648,
///     "with_muldiv": true,
///     "icache": { "nlines": 64, "nwords": 8, "base": 2147483648, "limit": 2415919104 }
/// }"#;
/// let config: CoreConfig = serde_json::from_str(json).unwrap();
/// assert!(config.validate().is_ok());
/// assert_eq!(config.icache.unwrap().nwords, 8);
/// ```
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct CoreConfig {
    /// The address of the first fetched instruction.
    #[serde(default = "CoreConfig::default_reset_address")]
    pub reset_address: u32,

    /// Instruction-cache geometry; `None` selects the bare fetch unit.
    #[serde(default)]
    pub icache: Option<CacheParams>,

    /// Data-cache geometry; `None` selects the bare load/store unit.
    #[serde(default)]
    pub dcache: Option<CacheParams>,

    /// Write-buffer depth (only used with a data cache).
    #[serde(default = "CoreConfig::default_wrbuf_depth")]
    pub wrbuf_depth: usize,

    /// Enable the M-extension decode and execution units.
    #[serde(default)]
    pub with_muldiv: bool,

    /// Expose the formal-interface retire monitor.
    #[serde(default)]
    pub with_rvfi: bool,
}

impl CoreConfig {
    fn default_reset_address() -> u32 {
        defaults::RESET_ADDRESS
    }

    fn default_wrbuf_depth() -> usize {
        defaults::WRBUF_DEPTH
    }

    /// Checks every geometry constraint of the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(icache) = &self.icache {
            icache.validate("instruction")?;
        }
        if let Some(dcache) = &self.dcache {
            dcache.validate("data")?;
        }
        if self.dcache.is_some() && self.wrbuf_depth == 0 {
            return Err(ConfigError::WriteBufferDepth);
        }
        Ok(())
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            reset_address: defaults::RESET_ADDRESS,
            icache: None,
            dcache: None,
            wrbuf_depth: defaults::WRBUF_DEPTH,
            with_muldiv: false,
            with_rvfi: false,
        }
    }
}
