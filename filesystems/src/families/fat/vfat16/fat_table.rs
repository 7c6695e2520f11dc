// FAT region synthesis
//
// Only the first sector of each FAT copy carries data: the two reserved
// entries plus one end-of-chain entry per published file. No next-cluster
// links are ever encoded, so every published file must fit in the single
// cluster it starts at.

use crate::families::fat::common::FAT_ALLOCATED_BYTE;

/// Fill one FAT sector. `sector` is relative to the start of its FAT copy.
pub fn fill_fat_sector(buffer: &mut [u8], sector: u32, media_descriptor: u8, file_count: usize) {
    buffer.fill(0);
    if sector != 0 {
        return;
    }

    // Entry 0 reads 0xFF<media>, entry 1 and each file entry read 0xFFFF
    let allocated = allocated_bytes(file_count);
    buffer[0] = media_descriptor;
    buffer[1..=allocated].fill(FAT_ALLOCATED_BYTE);
}

/// Bytes after the media descriptor that are marked allocated.
pub fn allocated_bytes(file_count: usize) -> usize {
    2 * file_count + 3
}
