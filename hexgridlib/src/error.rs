//! The `error` module defines the errors that can occur when mutating the patch set via
//! [`PatchStore`](crate::PatchStore) ([`PatchError`]), and the crate-level [`HexGridError`]
//! returned by view actions and image loading.
//!
//! Out-of-bounds cursor moves and pointer positions that hit no cell are not errors.
//! Those return `None`/`false` and leave all state untouched.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchError {
    /// Split point is not strictly inside the patch
    #[error("Cannot split patch at 0x{addr:X}: 0x{at:X} is not an interior address")]
    InvalidSplit { addr: usize, at: usize },
    /// Merge candidate does not start right after the patch
    #[error("Patch at 0x{other:X} is not directly adjacent to patch at 0x{addr:X}")]
    NotAdjacent { addr: usize, other: usize },
    /// No patch starts at the provided address
    #[error("No patch found at address: 0x{0:X}")]
    NotFound(usize),
    /// Write range does not fit the address space
    #[error("Write of {len} bytes at 0x{addr:X} overflows the address space")]
    AddressOverflow { addr: usize, len: usize },
    /// Existing patch intersects the write in a shape none of the resolution cases cover
    #[error(
        "Patch 0x{patch_addr:X}..=0x{patch_last:X} intersects write 0x{addr:X}..=0x{last:X} in an unsupported way"
    )]
    OverlapInvariant {
        patch_addr: usize,
        patch_last: usize,
        addr: usize,
        last: usize,
    },
}

#[derive(Debug, Error)]
pub enum HexGridError {
    #[error("Error encountered during patch update:\n{0}")]
    Patch(#[from] PatchError),
    #[error("Memory image has no data")]
    EmptyImage,
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
