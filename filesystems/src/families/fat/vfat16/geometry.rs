// Static layout of the virtual volume

use vfat_core::{VfatError, BLOCK_SIZE};

use crate::families::fat::common::DIR_ENTRY_SIZE;

pub const SECTORS_PER_CLUSTER: u8 = 1;
pub const RESERVED_SECTORS: u32 = 1;
pub const ROOT_DIR_SECTORS: u32 = 4;
pub const FAT_COPIES: u32 = 2;
pub const ROOT_DIR_ENTRIES: u16 = (ROOT_DIR_SECTORS as usize * BLOCK_SIZE / DIR_ENTRY_SIZE) as u16;

/// Bytes per FAT16 entry
const FAT_ENTRY_BYTES: u32 = 2;

/// Largest capacity whose FAT still fits the 16-bit sectors-per-FAT field
pub const MAX_CAPACITY_BLOCKS: u32 = u16::MAX as u32 * BLOCK_SIZE as u32 / FAT_ENTRY_BYTES;

/// Region a block index falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Boot,
    /// `sector` is relative to the start of FAT copy `copy`.
    Fat { copy: u32, sector: u32 },
    RootDirectory { sector: u32 },
    /// `offset` is relative to the start of the data region.
    Data { offset: u32 },
    OutOfRange,
}

/// Region start offsets derived from the advertised capacity.
///
/// Every block of the volume is a cluster (one sector per cluster), so the
/// cluster count equals the capacity in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    capacity_blocks: u32,
    sectors_per_fat: u32,
}

impl Geometry {
    pub fn new(capacity_blocks: u32) -> Result<Self, VfatError> {
        if capacity_blocks == 0 {
            return Err(VfatError::ZeroCapacity);
        }
        if capacity_blocks > MAX_CAPACITY_BLOCKS {
            return Err(VfatError::CapacityTooLarge(capacity_blocks));
        }

        let sectors_per_fat = Self::fat_sectors_for(capacity_blocks);
        let geometry = Self {
            capacity_blocks,
            sectors_per_fat,
        };

        // At least one data cluster must follow the metadata
        if geometry.data_start() >= capacity_blocks {
            return Err(VfatError::CapacityTooSmall {
                capacity: capacity_blocks,
                required: geometry.data_start() + 1,
            });
        }

        Ok(geometry)
    }

    /// `ceil(cluster_count * 2 / 512)`
    pub fn fat_sectors_for(cluster_count: u32) -> u32 {
        let fat_bytes = cluster_count as u64 * FAT_ENTRY_BYTES as u64;
        ((fat_bytes + BLOCK_SIZE as u64 - 1) / BLOCK_SIZE as u64) as u32
    }

    pub fn capacity_blocks(&self) -> u32 {
        self.capacity_blocks
    }

    pub fn cluster_count(&self) -> u32 {
        self.capacity_blocks
    }

    pub fn sectors_per_fat(&self) -> u32 {
        self.sectors_per_fat
    }

    pub fn fat_start(&self, copy: u32) -> u32 {
        RESERVED_SECTORS + copy * self.sectors_per_fat
    }

    pub fn root_dir_start(&self) -> u32 {
        self.fat_start(FAT_COPIES)
    }

    pub fn data_start(&self) -> u32 {
        self.root_dir_start() + ROOT_DIR_SECTORS
    }

    pub fn data_blocks(&self) -> u32 {
        self.capacity_blocks - self.data_start()
    }

    pub fn classify(&self, block: u32) -> Region {
        if block >= self.capacity_blocks {
            Region::OutOfRange
        } else if block < RESERVED_SECTORS {
            Region::Boot
        } else if block < self.root_dir_start() {
            let offset = block - RESERVED_SECTORS;
            Region::Fat {
                copy: offset / self.sectors_per_fat,
                sector: offset % self.sectors_per_fat,
            }
        } else if block < self.data_start() {
            Region::RootDirectory {
                sector: block - self.root_dir_start(),
            }
        } else {
            Region::Data {
                offset: block - self.data_start(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_layout() {
        // 4 MiB volume
        let geometry = Geometry::new(8192).unwrap();
        assert_eq!(geometry.sectors_per_fat(), 32);
        assert_eq!(geometry.fat_start(0), 1);
        assert_eq!(geometry.fat_start(1), 33);
        assert_eq!(geometry.root_dir_start(), 65);
        assert_eq!(geometry.data_start(), 69);
        assert_eq!(geometry.data_blocks(), 8192 - 69);
        assert_eq!(ROOT_DIR_ENTRIES, 64);
    }

    #[test]
    fn test_regions_strictly_increasing_for_all_capacities() {
        let capacities = (8..600)
            .chain([1000, 4096, 8192, 65535, 65536, 100_000, MAX_CAPACITY_BLOCKS]);

        for capacity in capacities {
            let geometry = Geometry::new(capacity).unwrap();
            assert!(0 < geometry.fat_start(0));
            assert!(geometry.fat_start(0) < geometry.fat_start(1));
            assert!(geometry.fat_start(1) < geometry.root_dir_start());
            assert!(geometry.root_dir_start() < geometry.data_start());
            assert!(geometry.data_start() < capacity);

            let expected = (geometry.cluster_count() as u64 * 2 + 511) / 512;
            assert_eq!(geometry.sectors_per_fat() as u64, expected);
        }
    }

    #[test]
    fn test_invalid_capacities() {
        assert!(matches!(Geometry::new(0), Err(VfatError::ZeroCapacity)));
        assert!(matches!(
            Geometry::new(7),
            Err(VfatError::CapacityTooSmall { capacity: 7, required: 8 })
        ));
        assert!(matches!(
            Geometry::new(MAX_CAPACITY_BLOCKS + 1),
            Err(VfatError::CapacityTooLarge(_))
        ));
    }

    #[test]
    fn test_classify() {
        let geometry = Geometry::new(8192).unwrap();
        assert_eq!(geometry.classify(0), Region::Boot);
        assert_eq!(geometry.classify(1), Region::Fat { copy: 0, sector: 0 });
        assert_eq!(geometry.classify(32), Region::Fat { copy: 0, sector: 31 });
        assert_eq!(geometry.classify(33), Region::Fat { copy: 1, sector: 0 });
        assert_eq!(geometry.classify(65), Region::RootDirectory { sector: 0 });
        assert_eq!(geometry.classify(68), Region::RootDirectory { sector: 3 });
        assert_eq!(geometry.classify(69), Region::Data { offset: 0 });
        assert_eq!(geometry.classify(8191), Region::Data { offset: 8122 });
        assert_eq!(geometry.classify(8192), Region::OutOfRange);
    }
}
