//! Field storage sizes of the engine's processed-frame record.
//!
//! These match a CryptoLib build with default sizing. Engines report the
//! meaningful length of each field per call; these are only capacities.

pub const IV_CAPACITY: usize = 16;
pub const SN_CAPACITY: usize = 16;
pub const PAD_CAPACITY: usize = 16;
pub const MAC_CAPACITY: usize = 64;
pub const PDU_CAPACITY: usize = 1019;

/// Largest frame the engine length arguments can carry.
pub const MAX_FRAME_ARGUMENT: usize = u16::MAX as usize;
