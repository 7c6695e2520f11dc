// FAT16 on-disk constants used by the virtual volume

// Boot sector offsets
pub const BS_JMP_BOOT: usize = 0x00;
pub const BS_OEM_NAME: usize = 0x03;
pub const BPB_BYTES_PER_SEC: usize = 0x0B;
pub const BPB_SEC_PER_CLUS: usize = 0x0D;
pub const BPB_RSVD_SEC_CNT: usize = 0x0E;
pub const BPB_NUM_FATS: usize = 0x10;
pub const BPB_ROOT_ENT_CNT: usize = 0x11;
pub const BPB_TOT_SEC16: usize = 0x13;
pub const BPB_MEDIA: usize = 0x15;
pub const BPB_FAT_SZ16: usize = 0x16;
pub const BPB_SEC_PER_TRK: usize = 0x18;
pub const BPB_NUM_HEADS: usize = 0x1A;
pub const BPB_HIDD_SEC: usize = 0x1C;
pub const BPB_TOT_SEC32: usize = 0x20;

// FAT16 extended BPB (starts at 36)
pub const BS16_DRV_NUM: usize = 0x24;
pub const BS16_RESERVED1: usize = 0x25;
pub const BS16_BOOT_SIG: usize = 0x26;
pub const BS16_VOL_ID: usize = 0x27;
pub const BS16_VOL_LAB: usize = 0x2B;
pub const BS16_FIL_SYS_TYPE: usize = 0x36;

// Boot sector signature
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;
pub const JUMP_BOOT: [u8; 3] = [0xEB, 0x3C, 0x90];
pub const EXTENDED_BOOT_SIGNATURE: u8 = 0x29;
pub const DRIVE_NUMBER_FIXED: u8 = 0x80;
pub const FS_TYPE_FAT16: [u8; 8] = *b"FAT16   ";

// FAT entry values
pub const FAT16_EOC: u16 = 0xFFFF;
pub const FAT_ALLOCATED_BYTE: u8 = 0xFF;
pub const FIRST_DATA_CLUSTER: u16 = 2;

// Directory entries
pub const DIR_ENTRY_SIZE: usize = 32;
pub const DIR_ENTRY_END: u8 = 0x00;
pub const DIR_ENTRY_DELETED: u8 = 0xE5;
pub const NAME_LEN: usize = 8;
pub const EXT_LEN: usize = 3;
pub const LABEL_LEN: usize = NAME_LEN + EXT_LEN;

// Media descriptor
pub const MEDIA_FIXED: u8 = 0xF8;
