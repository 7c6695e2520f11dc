// Published read-only files and write-extension bindings

use log::info;
use vfat_core::{VfatError, WriteHandler, BLOCK_SIZE};

use crate::families::fat::common::{
    format_base_name, format_extension, parse_83_name, EXT_LEN, FIRST_DATA_CLUSTER, NAME_LEN,
};

/// One root-directory sector holds 16 entries; slot 0 is the volume label.
pub const MAX_FILE_SLOTS: usize = 15;

/// A file published to the host, backed by an owned buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOnlyFile {
    name: [u8; NAME_LEN],
    ext: [u8; EXT_LEN],
    data: Vec<u8>,
}

impl ReadOnlyFile {
    pub fn new(name: &str, ext: &str, data: Vec<u8>) -> Result<Self, VfatError> {
        let name_bytes = format_base_name(name)?;
        let ext_bytes = format_extension(ext)?;

        // The FAT never links a second cluster
        if data.len() > BLOCK_SIZE {
            return Err(VfatError::FileTooLarge {
                name: parse_83_name(&name_bytes, &ext_bytes),
                size: data.len(),
                limit: BLOCK_SIZE,
            });
        }

        Ok(Self {
            name: name_bytes,
            ext: ext_bytes,
            data,
        })
    }

    pub fn name_bytes(&self) -> &[u8; NAME_LEN] {
        &self.name
    }

    pub fn ext_bytes(&self) -> &[u8; EXT_LEN] {
        &self.ext
    }

    pub fn display_name(&self) -> String {
        parse_83_name(&self.name, &self.ext)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn size(&self) -> u32 {
        self.data.len() as u32
    }
}

/// Ordered set of published files. File `i` starts at cluster `i + 2`.
#[derive(Debug, Default)]
pub struct ReadFileRegistry {
    files: Vec<ReadOnlyFile>,
}

impl ReadFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, file: ReadOnlyFile) -> Result<(), VfatError> {
        if self.files.len() >= MAX_FILE_SLOTS {
            return Err(VfatError::ReadFileLimit(MAX_FILE_SLOTS));
        }

        info!(
            "Publishing {} ({} bytes) at cluster {}",
            file.display_name(),
            file.size(),
            self.files.len() as u16 + FIRST_DATA_CLUSTER
        );
        self.files.push(file);
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&ReadOnlyFile> {
        self.files.get(index)
    }

    pub fn files(&self) -> &[ReadOnlyFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn start_cluster(index: usize) -> u16 {
        index as u16 + FIRST_DATA_CLUSTER
    }
}

/// An extension whose files are streamed to `handler` instead of stored.
pub struct WriteBinding {
    ext: [u8; EXT_LEN],
    handler: Box<dyn WriteHandler>,
}

impl WriteBinding {
    pub fn ext_bytes(&self) -> &[u8; EXT_LEN] {
        &self.ext
    }

    pub fn extension(&self) -> String {
        String::from_utf8_lossy(&self.ext).trim_end().to_string()
    }

    pub fn handler_mut(&mut self) -> &mut dyn WriteHandler {
        self.handler.as_mut()
    }
}

impl std::fmt::Debug for WriteBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteBinding")
            .field("ext", &String::from_utf8_lossy(&self.ext))
            .finish_non_exhaustive()
    }
}

/// Extension-to-handler table consulted by the write detector.
#[derive(Debug, Default)]
pub struct WriteExtensionRegistry {
    bindings: Vec<WriteBinding>,
}

impl WriteExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, ext: &str, handler: Box<dyn WriteHandler>) -> Result<(), VfatError> {
        let ext_bytes = format_extension(ext)?;

        if self.bindings.len() >= MAX_FILE_SLOTS {
            return Err(VfatError::WriteBindingLimit(MAX_FILE_SLOTS));
        }
        if self.find(&ext_bytes).is_some() {
            return Err(VfatError::DuplicateExtension(ext.to_uppercase()));
        }

        info!("Streaming *.{} writes to a registered handler", ext.to_uppercase());
        self.bindings.push(WriteBinding {
            ext: ext_bytes,
            handler,
        });
        Ok(())
    }

    /// Index of the binding for an on-disk extension.
    pub fn find(&self, ext: &[u8]) -> Option<usize> {
        self.bindings.iter().position(|b| b.ext[..] == *ext)
    }

    pub fn get(&self, index: usize) -> Option<&WriteBinding> {
        self.bindings.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut WriteBinding> {
        self.bindings.get_mut(index)
    }

    pub fn extensions(&self) -> Vec<String> {
        self.bindings.iter().map(WriteBinding::extension).collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
