// Boot sector synthesis for the virtual FAT16 volume

use static_assertions::const_assert;
use vfat_core::BLOCK_SIZE;

use super::geometry::{Geometry, FAT_COPIES, RESERVED_SECTORS, ROOT_DIR_ENTRIES, SECTORS_PER_CLUSTER};
use crate::families::fat::common::*;

const_assert!(BS16_FIL_SYS_TYPE + FS_TYPE_FAT16.len() <= BOOT_SIGNATURE_OFFSET);
const_assert!(BOOT_SIGNATURE_OFFSET + BOOT_SIGNATURE.len() == BLOCK_SIZE);

/// Fixed boot sector fields that do not follow from the geometry
#[derive(Debug, Clone)]
pub struct BootSectorParams {
    pub oem_name: [u8; 8],
    pub media_descriptor: u8,
    pub sectors_per_track: u16,
    pub num_heads: u16,
    pub hidden_sectors: u32,
    pub volume_serial: u32,
    pub volume_label: [u8; LABEL_LEN],
}

impl Default for BootSectorParams {
    fn default() -> Self {
        Self {
            oem_name: *b"VFAT FS ",
            media_descriptor: MEDIA_FIXED,
            sectors_per_track: 1,
            num_heads: 1,
            hidden_sectors: 0,
            volume_serial: 0x0042_0042,
            volume_label: [b' '; LABEL_LEN],
        }
    }
}

/// Build the boot sector for `geometry`.
pub fn build_boot_sector(geometry: &Geometry, params: &BootSectorParams) -> [u8; BLOCK_SIZE] {
    let mut boot_sector = [0u8; BLOCK_SIZE];

    boot_sector[BS_JMP_BOOT..BS_JMP_BOOT + 3].copy_from_slice(&JUMP_BOOT);
    boot_sector[BS_OEM_NAME..BS_OEM_NAME + 8].copy_from_slice(&params.oem_name);

    // BPB
    boot_sector[BPB_BYTES_PER_SEC..BPB_BYTES_PER_SEC + 2]
        .copy_from_slice(&(BLOCK_SIZE as u16).to_le_bytes());
    boot_sector[BPB_SEC_PER_CLUS] = SECTORS_PER_CLUSTER;
    boot_sector[BPB_RSVD_SEC_CNT..BPB_RSVD_SEC_CNT + 2]
        .copy_from_slice(&(RESERVED_SECTORS as u16).to_le_bytes());
    boot_sector[BPB_NUM_FATS] = FAT_COPIES as u8;
    boot_sector[BPB_ROOT_ENT_CNT..BPB_ROOT_ENT_CNT + 2]
        .copy_from_slice(&ROOT_DIR_ENTRIES.to_le_bytes());

    let total_sectors = geometry.capacity_blocks();
    if total_sectors < 65536 {
        boot_sector[BPB_TOT_SEC16..BPB_TOT_SEC16 + 2]
            .copy_from_slice(&(total_sectors as u16).to_le_bytes());
    } else {
        boot_sector[BPB_TOT_SEC32..BPB_TOT_SEC32 + 4]
            .copy_from_slice(&total_sectors.to_le_bytes());
    }

    boot_sector[BPB_MEDIA] = params.media_descriptor;
    boot_sector[BPB_FAT_SZ16..BPB_FAT_SZ16 + 2]
        .copy_from_slice(&(geometry.sectors_per_fat() as u16).to_le_bytes());
    boot_sector[BPB_SEC_PER_TRK..BPB_SEC_PER_TRK + 2]
        .copy_from_slice(&params.sectors_per_track.to_le_bytes());
    boot_sector[BPB_NUM_HEADS..BPB_NUM_HEADS + 2]
        .copy_from_slice(&params.num_heads.to_le_bytes());
    boot_sector[BPB_HIDD_SEC..BPB_HIDD_SEC + 4]
        .copy_from_slice(&params.hidden_sectors.to_le_bytes());

    // FAT16 extended BPB
    boot_sector[BS16_DRV_NUM] = DRIVE_NUMBER_FIXED;
    boot_sector[BS16_RESERVED1] = 0;
    boot_sector[BS16_BOOT_SIG] = EXTENDED_BOOT_SIGNATURE;
    boot_sector[BS16_VOL_ID..BS16_VOL_ID + 4]
        .copy_from_slice(&params.volume_serial.to_le_bytes());
    boot_sector[BS16_VOL_LAB..BS16_VOL_LAB + LABEL_LEN]
        .copy_from_slice(&params.volume_label);
    boot_sector[BS16_FIL_SYS_TYPE..BS16_FIL_SYS_TYPE + 8]
        .copy_from_slice(&FS_TYPE_FAT16);

    boot_sector[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2]
        .copy_from_slice(&BOOT_SIGNATURE);

    boot_sector
}
