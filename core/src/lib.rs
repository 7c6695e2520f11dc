pub mod config;
pub mod device;
pub mod error;
pub mod handler;

pub use config::{FileContents, ReadFileConfig, VolumeConfig};
pub use device::{BlockDevice, BLOCK_SIZE};
pub use error::VfatError;
pub use handler::WriteHandler;
