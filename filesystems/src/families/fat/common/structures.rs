// FAT16 directory entry layout shared by the synthesizer and the write detector

use byteorder::{ByteOrder, LittleEndian};
use static_assertions::const_assert_eq;
use std::mem::size_of;

use super::constants::*;

/// FAT Directory Entry Attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FatAttributes(pub u8);

impl FatAttributes {
    pub const READ_ONLY: u8 = 0x01;
    pub const HIDDEN: u8 = 0x02;
    pub const SYSTEM: u8 = 0x04;
    pub const VOLUME_ID: u8 = 0x08;
    pub const DIRECTORY: u8 = 0x10;
    pub const ARCHIVE: u8 = 0x20;
    pub const LFN: u8 = 0x0F;

    pub fn is_read_only(&self) -> bool { self.0 & Self::READ_ONLY != 0 }
    pub fn is_system(&self) -> bool { self.0 & Self::SYSTEM != 0 }
    pub fn is_volume_id(&self) -> bool { self.0 & Self::VOLUME_ID != 0 }
    pub fn is_directory(&self) -> bool { self.0 & Self::DIRECTORY != 0 }
    pub fn is_archive(&self) -> bool { self.0 & Self::ARCHIVE != 0 }
    pub fn is_lfn(&self) -> bool { self.0 == Self::LFN }
}

/// FAT16 Directory Entry (32 bytes)
#[repr(C, packed(1))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FatDirEntry {
    pub name: [u8; 8],             // 0x00: Base name, space padded
    pub ext: [u8; 3],              // 0x08: Extension, space padded
    pub attributes: u8,            // 0x0B: File attributes
    pub nt_reserved: u8,           // 0x0C: Reserved
    pub creation_time_tenth: u8,   // 0x0D: Creation time, tenths of a second
    pub creation_time: u16,        // 0x0E: Creation time
    pub creation_date: u16,        // 0x10: Creation date
    pub last_access_date: u16,     // 0x12: Last access date
    pub first_cluster_high: u16,   // 0x14: Unused on FAT16
    pub write_time: u16,           // 0x16: Last write time
    pub write_date: u16,           // 0x18: Last write date
    pub first_cluster_low: u16,    // 0x1A: Start cluster
    pub file_size: u32,            // 0x1C: File size in bytes
}

const_assert_eq!(size_of::<FatDirEntry>(), DIR_ENTRY_SIZE);

impl FatDirEntry {
    /// Decode an entry from the first 32 bytes of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut name = [0u8; NAME_LEN];
        let mut ext = [0u8; EXT_LEN];
        name.copy_from_slice(&bytes[0x00..0x08]);
        ext.copy_from_slice(&bytes[0x08..0x0B]);

        Self {
            name,
            ext,
            attributes: bytes[0x0B],
            nt_reserved: bytes[0x0C],
            creation_time_tenth: bytes[0x0D],
            creation_time: LittleEndian::read_u16(&bytes[0x0E..0x10]),
            creation_date: LittleEndian::read_u16(&bytes[0x10..0x12]),
            last_access_date: LittleEndian::read_u16(&bytes[0x12..0x14]),
            first_cluster_high: LittleEndian::read_u16(&bytes[0x14..0x16]),
            write_time: LittleEndian::read_u16(&bytes[0x16..0x18]),
            write_date: LittleEndian::read_u16(&bytes[0x18..0x1A]),
            first_cluster_low: LittleEndian::read_u16(&bytes[0x1A..0x1C]),
            file_size: LittleEndian::read_u32(&bytes[0x1C..0x20]),
        }
    }

    /// Encode the entry into the first 32 bytes of `out`.
    pub fn write_to(&self, out: &mut [u8]) {
        // Copy out of the packed struct before borrowing
        let entry = *self;

        out[0x00..0x08].copy_from_slice(&entry.name);
        out[0x08..0x0B].copy_from_slice(&entry.ext);
        out[0x0B] = entry.attributes;
        out[0x0C] = entry.nt_reserved;
        out[0x0D] = entry.creation_time_tenth;
        LittleEndian::write_u16(&mut out[0x0E..0x10], entry.creation_time);
        LittleEndian::write_u16(&mut out[0x10..0x12], entry.creation_date);
        LittleEndian::write_u16(&mut out[0x12..0x14], entry.last_access_date);
        LittleEndian::write_u16(&mut out[0x14..0x16], entry.first_cluster_high);
        LittleEndian::write_u16(&mut out[0x16..0x18], entry.write_time);
        LittleEndian::write_u16(&mut out[0x18..0x1A], entry.write_date);
        LittleEndian::write_u16(&mut out[0x1A..0x1C], entry.first_cluster_low);
        LittleEndian::write_u32(&mut out[0x1C..0x20], entry.file_size);
    }

    pub fn attributes(&self) -> FatAttributes {
        FatAttributes(self.attributes)
    }

    /// A zero first byte ends the directory listing.
    pub fn is_end(&self) -> bool {
        self.name[0] == DIR_ENTRY_END
    }

    pub fn is_deleted(&self) -> bool {
        self.name[0] == DIR_ENTRY_DELETED
    }

    pub fn set_timestamp(&mut self, date: u16, time: u16) {
        self.creation_date = date;
        self.creation_time = time;
        self.write_date = date;
        self.write_time = time;
        self.last_access_date = date;
    }
}
