// Root directory synthesis

use crate::families::fat::common::*;

use super::registry::{ReadFileRegistry, ReadOnlyFile};

/// Attributes of a published file
pub const READ_FILE_ATTRIBUTES: u8 = FatAttributes::ARCHIVE | FatAttributes::READ_ONLY;
/// Attributes of the volume label entry
pub const VOLUME_LABEL_ATTRIBUTES: u8 = FatAttributes::ARCHIVE | FatAttributes::VOLUME_ID;

/// Volume label entry for slot 0
pub fn volume_label_entry(label: &[u8; LABEL_LEN], timestamp: Option<(u16, u16)>) -> FatDirEntry {
    let mut entry = FatDirEntry {
        attributes: VOLUME_LABEL_ATTRIBUTES,
        ..FatDirEntry::default()
    };
    entry.name.copy_from_slice(&label[..NAME_LEN]);
    entry.ext.copy_from_slice(&label[NAME_LEN..]);
    if let Some((date, time)) = timestamp {
        entry.set_timestamp(date, time);
    }
    entry
}

/// Directory entry for the published file at `index`
pub fn read_file_entry(index: usize, file: &ReadOnlyFile, timestamp: Option<(u16, u16)>) -> FatDirEntry {
    let mut entry = FatDirEntry {
        name: *file.name_bytes(),
        ext: *file.ext_bytes(),
        attributes: READ_FILE_ATTRIBUTES,
        first_cluster_low: ReadFileRegistry::start_cluster(index),
        file_size: file.size(),
        ..FatDirEntry::default()
    };
    if let Some((date, time)) = timestamp {
        entry.set_timestamp(date, time);
    }
    entry
}

/// Fill one root-directory sector. `sector` is relative to the region start.
///
/// Only the first sector has content: the label, then one entry per file in
/// registration order. The zeroed slots that follow end the listing.
pub fn fill_root_dir_sector(
    buffer: &mut [u8],
    sector: u32,
    label: &[u8; LABEL_LEN],
    files: &ReadFileRegistry,
    timestamp: Option<(u16, u16)>,
) {
    buffer.fill(0);
    if sector != 0 {
        return;
    }

    volume_label_entry(label, timestamp).write_to(&mut buffer[..DIR_ENTRY_SIZE]);

    for (index, file) in files.files().iter().enumerate() {
        let offset = (index + 1) * DIR_ENTRY_SIZE;
        read_file_entry(index, file, timestamp).write_to(&mut buffer[offset..offset + DIR_ENTRY_SIZE]);
    }
}
