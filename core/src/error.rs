use thiserror::Error;

#[derive(Debug, Error)]
pub enum VfatError {
    #[error("Volume capacity must be non-zero")]
    ZeroCapacity,

    #[error("Volume too small: {capacity} blocks, metadata alone needs {required}")]
    CapacityTooSmall { capacity: u32, required: u32 },

    #[error("Volume too large for FAT16: {0} blocks")]
    CapacityTooLarge(u32),

    #[error("Read-only file limit reached ({0} files)")]
    ReadFileLimit(usize),

    #[error("Write handler limit reached ({0} extensions)")]
    WriteBindingLimit(usize),

    #[error("Invalid filename: {0}")]
    InvalidName(String),

    #[error("Invalid extension: {0}")]
    InvalidExtension(String),

    #[error("Write handler already registered for extension: {0}")]
    DuplicateExtension(String),

    #[error("File {name} is {size} bytes, larger than one {limit}-byte cluster")]
    FileTooLarge { name: String, size: usize, limit: usize },

    #[error("Buffer of {actual} bytes cannot hold {expected} bytes of block data")]
    BufferTooShort { expected: usize, actual: usize },

    #[error("Write handler rejected block at offset {offset}: {reason}")]
    HandlerRejected { offset: u32, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}
