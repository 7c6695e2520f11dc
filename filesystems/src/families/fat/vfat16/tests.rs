// Virtual FAT16 engine tests

use std::sync::{Arc, Mutex};

use vfat_core::{BlockDevice, VfatError, BLOCK_SIZE};

use super::*;
use crate::families::fat::common::{FatAttributes, FatDirEntry, DIR_ENTRY_SIZE};

type Calls = Arc<Mutex<Vec<(u32, u32)>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn engine_with_details() -> VfatEngine {
    let mut engine = VfatEngine::new(8192, "GeigerBoot").unwrap();
    engine
        .register_text_file("DETAILS", "Copy ESP32 binary for flashing")
        .unwrap();
    engine
}

fn register_recorder(engine: &mut VfatEngine, ext: &str) -> Calls {
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    engine
        .register_write_handler(ext, move |_: &[u8], offset: u32, remaining: u32| -> anyhow::Result<()> {
            sink.lock().unwrap().push((offset, remaining));
            Ok(())
        })
        .unwrap();
    calls
}

/// Root directory as the host would write it back after creating `NAME.EXT`.
fn host_directory(engine: &VfatEngine, name: &[u8; 8], ext: &[u8; 3], size: u32) -> Vec<u8> {
    let root = engine.geometry().root_dir_start();
    let mut sector = vec![0u8; BLOCK_SIZE];
    engine.read(&mut sector, root, 1).unwrap();

    let slot = engine.read_files().len();
    let entry = FatDirEntry {
        name: *name,
        ext: *ext,
        attributes: FatAttributes::ARCHIVE,
        first_cluster_low: (slot + 2) as u16,
        file_size: size,
        ..FatDirEntry::default()
    };
    let offset = (slot + 1) * DIR_ENTRY_SIZE;
    entry.write_to(&mut sector[offset..offset + DIR_ENTRY_SIZE]);
    sector
}

#[test]
fn test_boot_sector_signature() {
    let engine = engine_with_details();
    let mut block = vec![0u8; BLOCK_SIZE];
    engine.read(&mut block, 0, 1).unwrap();
    assert_eq!(&block[510..], &[0x55, 0xAA]);
    assert_eq!(&block[0x2B..0x36], b"GEIGERBOOT ");
}

#[test]
fn test_both_fat_copies_match() {
    let engine = engine_with_details();
    let geometry = *engine.geometry();

    let mut fat0 = vec![0u8; BLOCK_SIZE];
    let mut fat1 = vec![0u8; BLOCK_SIZE];
    engine.read(&mut fat0, geometry.fat_start(0), 1).unwrap();
    engine.read(&mut fat1, geometry.fat_start(1), 1).unwrap();

    assert_eq!(fat0, fat1);
    assert_eq!(&fat0[..6], &[0xF8, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]);
    assert!(fat0[6..].iter().all(|&b| b == 0));

    let mut tail = vec![0xAAu8; BLOCK_SIZE];
    engine.read(&mut tail, geometry.fat_start(1) - 1, 1).unwrap();
    assert!(tail.iter().all(|&b| b == 0));
}

#[test]
fn test_directory_lists_every_file() {
    let mut engine = VfatEngine::new(8192, "VFATSYS").unwrap();
    for i in 0..MAX_FILE_SLOTS {
        engine
            .register_read_only_file(&format!("F{}", i), "TXT", vec![b'a'; i + 1])
            .unwrap();
    }
    assert!(matches!(
        engine.register_text_file("EXTRA", "x"),
        Err(VfatError::ReadFileLimit(_))
    ));

    let mut sector = vec![0u8; BLOCK_SIZE];
    engine.read(&mut sector, engine.geometry().root_dir_start(), 1).unwrap();

    for i in 0..MAX_FILE_SLOTS {
        let offset = (i + 1) * DIR_ENTRY_SIZE;
        let entry = FatDirEntry::from_bytes(&sector[offset..offset + DIR_ENTRY_SIZE]);
        let expected_name = format!("{:<8}", format!("F{}", i));
        assert_eq!(&entry.name[..], expected_name.as_bytes());
        assert_eq!({ entry.file_size }, i as u32 + 1);
        assert_eq!({ entry.first_cluster_low }, i as u16 + 2);
    }
}

#[test]
fn test_data_blocks_hold_file_contents() {
    let engine = engine_with_details();
    let data_start = engine.geometry().data_start();

    let mut block = vec![0xEEu8; BLOCK_SIZE];
    engine.read(&mut block, data_start, 1).unwrap();
    let text = b"Copy ESP32 binary for flashing\0";
    assert_eq!(&block[..text.len()], text);
    assert!(block[text.len()..].iter().all(|&b| b == 0));

    for offset in [1, 2, 100, engine.geometry().data_blocks() - 1] {
        engine.read(&mut block, data_start + offset, 1).unwrap();
        assert!(block.iter().all(|&b| b == 0), "block {} not empty", offset);
    }
}

#[test]
fn test_out_of_range_reads_are_zero() {
    let engine = engine_with_details();
    let mut block = vec![0xEEu8; BLOCK_SIZE];
    engine.read(&mut block, engine.capacity_blocks(), 1).unwrap();
    assert!(block.iter().all(|&b| b == 0));

    engine.read(&mut block, u32::MAX, 1).unwrap();
    assert!(block.iter().all(|&b| b == 0));
}

#[test]
fn test_multi_block_read_covers_every_block() {
    let engine = engine_with_details();
    let root = engine.geometry().root_dir_start();

    // Last FAT sector, root directory, first data block
    let mut buf = vec![0xEEu8; BLOCK_SIZE * 6];
    engine.read(&mut buf, root - 1, 6).unwrap();

    assert!(buf[..BLOCK_SIZE].iter().all(|&b| b == 0));
    assert_eq!(&buf[BLOCK_SIZE..BLOCK_SIZE + 8], b"GEIGERBO");
    assert_eq!(&buf[BLOCK_SIZE + 32..BLOCK_SIZE + 40], b"DETAILS ");
    assert!(buf[2 * BLOCK_SIZE..5 * BLOCK_SIZE].iter().all(|&b| b == 0));
    assert_eq!(&buf[5 * BLOCK_SIZE..5 * BLOCK_SIZE + 4], b"Copy");
}

#[test]
fn test_short_buffers_are_rejected() {
    let mut engine = engine_with_details();
    let mut buf = vec![0u8; BLOCK_SIZE];
    assert!(matches!(
        engine.read(&mut buf, 0, 2),
        Err(VfatError::BufferTooShort { expected: 1024, actual: 512 })
    ));
    assert!(matches!(
        engine.write(&buf, 10, 2),
        Err(VfatError::BufferTooShort { .. })
    ));
}

#[test]
fn test_writes_without_bindings_are_discarded() {
    let mut engine = engine_with_details();
    let dir = host_directory(&engine, b"FIRMWARE", b"BIN", 1536);
    let root = engine.geometry().root_dir_start();

    engine.write(&dir, root, 1).unwrap();
    engine.write(&[0xAB; BLOCK_SIZE], engine.geometry().data_start() + 1, 1).unwrap();

    assert!(engine.active_session().is_none());

    // Nothing written is ever reflected back
    let mut block = vec![0u8; BLOCK_SIZE];
    engine.read(&mut block, engine.geometry().data_start() + 1, 1).unwrap();
    assert!(block.iter().all(|&b| b == 0));
}

#[test]
fn test_streams_bin_file_in_three_blocks() {
    init_logging();
    let mut engine = engine_with_details();
    let calls = register_recorder(&mut engine, "BIN");
    let root = engine.geometry().root_dir_start();
    let data_start = engine.geometry().data_start();

    let dir = host_directory(&engine, b"FIRMWARE", b"BIN", 1536);
    engine.write(&dir, root, 1).unwrap();

    let status = engine.active_session().unwrap();
    assert_eq!(status.extension, "BIN");
    assert_eq!(status.slot, 1);
    assert_eq!(status.declared_size, 1536);

    for i in 0..3 {
        engine.write(&[i as u8; BLOCK_SIZE], data_start + 1 + i, 1).unwrap();
    }

    assert_eq!(*calls.lock().unwrap(), vec![(1, 1536), (2, 1024), (3, 512)]);
    assert!(engine.active_session().is_none());

    // Stray data after completion goes nowhere
    engine.write(&[0u8; BLOCK_SIZE], data_start + 4, 1).unwrap();
    assert_eq!(calls.lock().unwrap().len(), 3);
}

#[test]
fn test_metadata_writes_do_not_consume_session() {
    let mut engine = engine_with_details();
    let calls = register_recorder(&mut engine, "BIN");
    let geometry = *engine.geometry();

    let dir = host_directory(&engine, b"FIRMWARE", b"BIN", 1024);
    engine.write(&dir, geometry.root_dir_start(), 1).unwrap();

    // FAT updates interleaved with data
    engine.write(&[0xFF; BLOCK_SIZE], geometry.fat_start(0), 1).unwrap();
    engine.write(&[0xFF; BLOCK_SIZE], geometry.fat_start(1), 1).unwrap();
    engine.write(&[0u8; BLOCK_SIZE], 0, 1).unwrap();
    assert_eq!(engine.active_session().unwrap().remaining, 1024);

    // One call spanning the last root-directory sector and two data blocks
    let buf = vec![0u8; BLOCK_SIZE * 3];
    engine.write(&buf, geometry.data_start() - 1, 3).unwrap();

    assert_eq!(*calls.lock().unwrap(), vec![(0, 1024), (1, 512)]);
    assert!(engine.active_session().is_none());
}

#[test]
fn test_repeated_directory_write_does_not_retrigger() {
    let mut engine = engine_with_details();
    let calls = register_recorder(&mut engine, "BIN");
    let root = engine.geometry().root_dir_start();
    let data_start = engine.geometry().data_start();

    let dir = host_directory(&engine, b"FIRMWARE", b"BIN", 512);
    engine.write(&dir, root, 1).unwrap();
    engine.write(&[0u8; BLOCK_SIZE], data_start + 1, 1).unwrap();
    assert!(engine.active_session().is_none());

    engine.write(&dir, root, 1).unwrap();
    assert!(engine.active_session().is_none());

    engine.write(&[0u8; BLOCK_SIZE], data_start + 1, 1).unwrap();
    assert_eq!(calls.lock().unwrap().len(), 1);
}

#[test]
fn test_unbound_extension_is_ignored() {
    let mut engine = engine_with_details();
    let calls = register_recorder(&mut engine, "BIN");

    let dir = host_directory(&engine, b"NOTES   ", b"DOC", 512);
    engine.write(&dir, engine.geometry().root_dir_start(), 1).unwrap();
    engine.write(&[0u8; BLOCK_SIZE], engine.geometry().data_start() + 1, 1).unwrap();

    assert!(engine.active_session().is_none());
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_handler_failure_halts_write_call() {
    let mut engine = engine_with_details();
    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let sink = calls.clone();
    engine
        .register_write_handler("BIN", move |_: &[u8], offset: u32, remaining: u32| -> anyhow::Result<()> {
            sink.lock().unwrap().push((offset, remaining));
            if offset == 2 {
                anyhow::bail!("flash write failed");
            }
            Ok(())
        })
        .unwrap();

    let root = engine.geometry().root_dir_start();
    let data_start = engine.geometry().data_start();
    let dir = host_directory(&engine, b"FIRMWARE", b"BIN", 1536);
    engine.write(&dir, root, 1).unwrap();

    let buf = vec![0u8; BLOCK_SIZE * 3];
    match engine.write(&buf, data_start + 1, 3) {
        Err(VfatError::HandlerRejected { offset, reason }) => {
            assert_eq!(offset, 2);
            assert!(reason.contains("flash write failed"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(*calls.lock().unwrap(), vec![(1, 1536), (2, 1024)]);

    // The session is left for the application to clear
    let status = engine.active_session().unwrap();
    assert_eq!(status.remaining, 1024);
    assert!(engine.cancel_active_session());
    assert!(engine.active_session().is_none());
    assert!(!engine.cancel_active_session());
}

#[test]
fn test_new_file_after_cancel_binds_again() {
    let mut engine = engine_with_details();
    let calls = register_recorder(&mut engine, "BIN");
    let root = engine.geometry().root_dir_start();

    let first = host_directory(&engine, b"FIRST   ", b"BIN", 1024);
    engine.write(&first, root, 1).unwrap();
    assert!(engine.cancel_active_session());

    // Second file lands in the next slot
    let mut second = first.clone();
    let entry = FatDirEntry {
        name: *b"SECOND  ",
        ext: *b"BIN",
        attributes: FatAttributes::ARCHIVE,
        file_size: 512,
        ..FatDirEntry::default()
    };
    entry.write_to(&mut second[3 * DIR_ENTRY_SIZE..4 * DIR_ENTRY_SIZE]);
    engine.write(&second, root, 1).unwrap();

    let status = engine.active_session().unwrap();
    assert_eq!(status.slot, 2);
    assert_eq!(status.declared_size, 512);
    assert!(calls.lock().unwrap().is_empty());
}

#[test]
fn test_engine_from_config() {
    let json = r#"{
        "capacity_blocks": 4096,
        "volume_label": "GeigerBoot",
        "modified": "2024-03-15T12:30:46",
        "read_files": [
            { "name": "DETAILS", "text": "hello" },
            { "name": "VERSION", "extension": "INF", "text": "1.2" }
        ]
    }"#;
    let config = vfat_core::VolumeConfig::from_json_str(json).unwrap();
    let engine = VfatEngine::from_config(&config).unwrap();

    assert_eq!(engine.capacity_blocks(), 4096);
    assert_eq!(engine.read_files().len(), 2);
    assert_eq!(engine.read_files()[0].size(), 6);
    assert_eq!(engine.read_files()[1].display_name(), "VERSION.INF");

    let mut sector = vec![0u8; BLOCK_SIZE];
    engine.read(&mut sector, engine.geometry().root_dir_start(), 1).unwrap();
    let entry = FatDirEntry::from_bytes(&sector[32..64]);
    assert_eq!({ entry.write_date }, (44 << 9) | (3 << 5) | 15);
    assert_eq!({ entry.write_time }, (12 << 11) | (30 << 5) | 23);
}

#[test]
fn test_zero_capacity_is_rejected() {
    assert!(matches!(VfatEngine::new(0, "VFATSYS"), Err(VfatError::ZeroCapacity)));
}
