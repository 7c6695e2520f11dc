// Virtual FAT16 block device: routes host block reads and writes to the
// synthesizers and the write-session tracker

use chrono::NaiveDateTime;
use log::{debug, info, trace};
use vfat_core::device::check_buffer_len;
use vfat_core::{BlockDevice, FileContents, VfatError, VolumeConfig, WriteHandler, BLOCK_SIZE};

use crate::families::fat::common::{format_volume_label, to_fat_datetime, LABEL_LEN};

use super::boot_sector::{build_boot_sector, BootSectorParams};
use super::fat_table::fill_fat_sector;
use super::geometry::{Geometry, Region};
use super::registry::{ReadFileRegistry, ReadOnlyFile, WriteExtensionRegistry};
use super::root_directory::fill_root_dir_sector;
use super::session::{SessionStatus, SessionTracker};

/// Extension given to files registered with [`VfatEngine::register_text_file`]
pub const TEXT_EXTENSION: &str = "TXT";

/// A synthetic FAT16 volume with no backing store.
///
/// Reads are synthesized on demand from the registered files; writes are
/// discarded unless they belong to a file whose extension has a handler.
#[derive(Debug)]
pub struct VfatEngine {
    geometry: Geometry,
    boot_params: BootSectorParams,
    boot_sector: [u8; BLOCK_SIZE],
    timestamp: Option<(u16, u16)>,
    read_files: ReadFileRegistry,
    write_bindings: WriteExtensionRegistry,
    sessions: SessionTracker,
}

impl VfatEngine {
    pub fn new(capacity_blocks: u32, volume_label: &str) -> Result<Self, VfatError> {
        let geometry = Geometry::new(capacity_blocks)?;
        let boot_params = BootSectorParams {
            volume_label: format_volume_label(volume_label),
            ..BootSectorParams::default()
        };
        let boot_sector = build_boot_sector(&geometry, &boot_params);

        info!(
            "Virtual FAT16 volume: {} blocks, {} sectors per FAT, data at block {}",
            capacity_blocks,
            geometry.sectors_per_fat(),
            geometry.data_start()
        );

        Ok(Self {
            geometry,
            boot_params,
            boot_sector,
            timestamp: None,
            read_files: ReadFileRegistry::new(),
            write_bindings: WriteExtensionRegistry::new(),
            sessions: SessionTracker::new(),
        })
    }

    /// Build an engine and publish the configured files.
    ///
    /// Write extensions named in the config still need a handler from
    /// [`register_write_handler`](Self::register_write_handler).
    pub fn from_config(config: &VolumeConfig) -> Result<Self, VfatError> {
        let mut engine = Self::new(config.capacity_blocks, &config.volume_label)?;
        if let Some(modified) = &config.modified {
            engine.set_modified(modified);
        }

        for file in &config.read_files {
            match file.load_contents()? {
                FileContents::Text(text) => {
                    let mut data = text.into_bytes();
                    data.push(0);
                    engine.register_read_only_file(&file.name, &file.extension, data)?;
                }
                FileContents::Raw(data) => {
                    engine.register_read_only_file(&file.name, &file.extension, data)?;
                }
            }
        }

        Ok(engine)
    }

    /// Stamp every synthesized directory entry with `modified`.
    pub fn set_modified(&mut self, modified: &NaiveDateTime) {
        self.timestamp = Some(to_fat_datetime(modified));
    }

    /// Publish a text file. The stored size includes a trailing NUL byte.
    pub fn register_text_file(&mut self, name: &str, text: &str) -> Result<(), VfatError> {
        let mut data = Vec::with_capacity(text.len() + 1);
        data.extend_from_slice(text.as_bytes());
        data.push(0);
        self.register_read_only_file(name, TEXT_EXTENSION, data)
    }

    /// Publish `data` verbatim as `NAME.EXT`.
    pub fn register_read_only_file(
        &mut self,
        name: &str,
        extension: &str,
        data: impl Into<Vec<u8>>,
    ) -> Result<(), VfatError> {
        let file = ReadOnlyFile::new(name, extension, data.into())?;
        self.read_files.register(file)
    }

    /// Stream files with this extension to `handler` as the host writes them.
    pub fn register_write_handler<H>(&mut self, extension: &str, handler: H) -> Result<(), VfatError>
    where
        H: WriteHandler + 'static,
    {
        self.write_bindings.register(extension, Box::new(handler))
    }

    pub fn capacity_blocks(&self) -> u32 {
        self.geometry.capacity_blocks()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn volume_label(&self) -> &[u8; LABEL_LEN] {
        &self.boot_params.volume_label
    }

    pub fn read_files(&self) -> &[ReadOnlyFile] {
        self.read_files.files()
    }

    pub fn write_extensions(&self) -> Vec<String> {
        self.write_bindings.extensions()
    }

    pub fn active_session(&self) -> Option<SessionStatus> {
        let session = self.sessions.active()?;
        let extension = self
            .write_bindings
            .get(session.binding())
            .map(|b| b.extension())
            .unwrap_or_default();

        Some(SessionStatus {
            extension,
            slot: session.slot(),
            declared_size: session.declared_size(),
            remaining: session.remaining().max(0) as u32,
        })
    }

    /// Abandon the file being streamed, e.g. after its handler failed.
    /// Returns whether a session was active.
    pub fn cancel_active_session(&mut self) -> bool {
        self.sessions.cancel()
    }

    fn read_block(&self, block: u32, out: &mut [u8]) {
        match self.geometry.classify(block) {
            Region::Boot => out.copy_from_slice(&self.boot_sector),
            Region::Fat { sector, .. } => fill_fat_sector(
                out,
                sector,
                self.boot_params.media_descriptor,
                self.read_files.len(),
            ),
            Region::RootDirectory { sector } => fill_root_dir_sector(
                out,
                sector,
                &self.boot_params.volume_label,
                &self.read_files,
                self.timestamp,
            ),
            Region::Data { offset } => {
                out.fill(0);
                if let Some(file) = self.read_files.get(offset as usize) {
                    out[..file.data().len()].copy_from_slice(file.data());
                }
            }
            Region::OutOfRange => {
                trace!("Read past end of volume at block {}", block);
                out.fill(0);
            }
        }
    }

    fn write_block(&mut self, block: u32, data: &[u8]) -> Result<(), VfatError> {
        match self.geometry.classify(block) {
            Region::RootDirectory { sector: 0 } => {
                let outcome = self
                    .sessions
                    .scan(data, self.read_files.len(), &self.write_bindings);
                debug!("Root directory write: {:?}", outcome);
                Ok(())
            }
            Region::Data { offset } if self.sessions.is_active() => {
                self.sessions.forward(data, offset, &mut self.write_bindings)
            }
            _ => Ok(()),
        }
    }
}

impl BlockDevice for VfatEngine {
    fn read(&self, buffer: &mut [u8], block: u32, count: u16) -> Result<(), VfatError> {
        check_buffer_len(buffer.len(), count)?;

        for (i, out) in buffer.chunks_exact_mut(BLOCK_SIZE).take(count as usize).enumerate() {
            self.read_block(block.saturating_add(i as u32), out);
        }
        Ok(())
    }

    fn write(&mut self, buffer: &[u8], block: u32, count: u16) -> Result<(), VfatError> {
        check_buffer_len(buffer.len(), count)?;

        // Nothing can be streamed, the volume is effectively read-only
        if self.write_bindings.is_empty() {
            return Ok(());
        }

        for (i, data) in buffer.chunks_exact(BLOCK_SIZE).take(count as usize).enumerate() {
            let target = block.saturating_add(i as u32);
            if target == 0 {
                continue;
            }
            self.write_block(target, data)?;
        }
        Ok(())
    }

    fn capacity_blocks(&self) -> u32 {
        self.geometry.capacity_blocks()
    }
}
