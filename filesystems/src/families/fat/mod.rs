// FAT family: shared on-disk structures and the virtual FAT16 volume

pub mod common;
pub mod vfat16;

pub use vfat16::VfatEngine;
