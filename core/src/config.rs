use crate::VfatError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_VOLUME_LABEL: &str = "VFATSYS";
pub const DEFAULT_CAPACITY_BLOCKS: u32 = 8192; // 4 MiB
pub const DEFAULT_READ_EXTENSION: &str = "TXT";

/// Description of one virtual volume and the files it publishes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VolumeConfig {
    pub capacity_blocks: u32,
    pub volume_label: String,
    /// Timestamp written into the directory entries. `None` leaves them zeroed.
    pub modified: Option<NaiveDateTime>,
    pub read_files: Vec<ReadFileConfig>,
    pub write_extensions: Vec<String>,
}

impl Default for VolumeConfig {
    fn default() -> Self {
        Self {
            capacity_blocks: DEFAULT_CAPACITY_BLOCKS,
            volume_label: DEFAULT_VOLUME_LABEL.to_string(),
            modified: None,
            read_files: Vec::new(),
            write_extensions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReadFileConfig {
    pub name: String,
    #[serde(default = "default_read_extension")]
    pub extension: String,
    /// Inline text; published with a trailing NUL byte.
    #[serde(default)]
    pub text: Option<String>,
    /// Host file whose bytes are published verbatim.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_read_extension() -> String {
    DEFAULT_READ_EXTENSION.to_string()
}

/// Where the bytes of a published file come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContents {
    Text(String),
    Raw(Vec<u8>),
}

impl ReadFileConfig {
    pub fn text(name: &str, text: &str) -> Self {
        Self {
            name: name.to_string(),
            extension: default_read_extension(),
            text: Some(text.to_string()),
            path: None,
        }
    }

    pub fn load_contents(&self) -> Result<FileContents, VfatError> {
        match (&self.text, &self.path) {
            (Some(text), None) => Ok(FileContents::Text(text.clone())),
            (None, Some(path)) => {
                tracing::debug!("Loading contents of {} from {}", self.name, path.display());
                Ok(FileContents::Raw(std::fs::read(path)?))
            }
            (Some(_), Some(_)) => Err(VfatError::Configuration(format!(
                "file {} sets both text and path",
                self.name
            ))),
            (None, None) => Err(VfatError::Configuration(format!(
                "file {} needs either text or path",
                self.name
            ))),
        }
    }
}

impl VolumeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, VfatError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, VfatError> {
        tracing::debug!("Loading volume configuration from {}", path.display());
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, VfatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
