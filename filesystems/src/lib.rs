// Filesystem families organization
pub mod families;

pub use families::fat::common::{FatAttributes, FatDirEntry};
pub use families::fat::vfat16::{Geometry, ReadOnlyFile, Region, SessionStatus, VfatEngine, MAX_FILE_SLOTS};
