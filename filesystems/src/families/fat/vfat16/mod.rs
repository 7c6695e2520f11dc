// Virtual FAT16 volume
//
// A block device that presents a single-level FAT16 filesystem synthesized
// from in-memory files, and streams files written by the host to registered
// handlers instead of storing them.

pub mod boot_sector;
pub mod engine;
pub mod fat_table;
pub mod geometry;
pub mod registry;
pub mod root_directory;
pub mod session;

#[cfg(test)]
mod tests;

pub use engine::VfatEngine;
pub use geometry::{Geometry, Region};
pub use registry::{ReadOnlyFile, MAX_FILE_SLOTS};
pub use session::SessionStatus;
