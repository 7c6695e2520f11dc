use crate::VfatError;

/// Size of one addressable block on the synthetic device.
pub const BLOCK_SIZE: usize = 512;

/// Block-addressable storage as seen by a host mass-storage driver.
///
/// The transport layer (USB MSC, SCSI, a test harness) turns its own
/// protocol into these two calls. Buffers hold `count * BLOCK_SIZE` bytes.
pub trait BlockDevice {
    /// Fill `buffer` with `count` blocks starting at `block`.
    ///
    /// Blocks that map to nothing (unallocated clusters, indices past the end
    /// of the volume) read back as zeroes rather than failing.
    fn read(&self, buffer: &mut [u8], block: u32, count: u16) -> Result<(), VfatError>;

    /// Accept `count` blocks of host data starting at `block`.
    fn write(&mut self, buffer: &[u8], block: u32, count: u16) -> Result<(), VfatError>;

    /// Number of blocks the device advertises to the host.
    fn capacity_blocks(&self) -> u32;
}

/// Make sure a transfer buffer is large enough for `count` blocks.
pub fn check_buffer_len(len: usize, count: u16) -> Result<(), VfatError> {
    let expected = count as usize * BLOCK_SIZE;
    if len < expected {
        return Err(VfatError::BufferTooShort {
            expected,
            actual: len,
        });
    }
    Ok(())
}
