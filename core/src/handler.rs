/// Receiver for the payload of a file the host is writing.
///
/// `data` is exactly one block. `block_offset` is the block index relative to
/// the start of the data region and `remaining` counts the declared file bytes
/// not yet forwarded, including the ones in `data`. Only the first
/// `min(remaining, data.len())` bytes belong to the file.
///
/// Handlers run synchronously inside the host's write call, so they must not
/// block indefinitely.
pub trait WriteHandler: Send {
    fn accept(&mut self, data: &[u8], block_offset: u32, remaining: u32) -> anyhow::Result<()>;
}

impl<F> WriteHandler for F
where
    F: FnMut(&[u8], u32, u32) -> anyhow::Result<()> + Send,
{
    fn accept(&mut self, data: &[u8], block_offset: u32, remaining: u32) -> anyhow::Result<()> {
        self(data, block_offset, remaining)
    }
}
