extern crate docfile;
use byteorder::{ByteOrder, LittleEndian};
use docfile::{DocfileError, ElementType, StatFlag, Storage, BLOCK_END_OF_CHAIN, BLOCK_SPECIAL};

mod common;
use common::*;

const MAGIC: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];

#[test]
fn test_create_layout() {
    let (handler, _root) = new_docfile();
    let disk = handler.dump_disk();

    // Header, one allocation-table block and one directory block.
    assert_eq!(disk.len(), 512 * 3);
    assert_eq!(disk[0..8].to_vec(), MAGIC.to_vec());
    assert_eq!(LittleEndian::read_u16(&disk[0x1e..]), 9);
    assert_eq!(LittleEndian::read_u16(&disk[0x20..]), 6);
    assert_eq!(LittleEndian::read_u32(&disk[0x2c..]), 1);
    assert_eq!(LittleEndian::read_u32(&disk[0x30..]), 1);
    assert_eq!(LittleEndian::read_u32(&disk[0x3c..]), BLOCK_END_OF_CHAIN);
    assert_eq!(LittleEndian::read_u32(&disk[0x44..]), BLOCK_END_OF_CHAIN);
    assert_eq!(LittleEndian::read_u32(&disk[0x48..]), 0);
    assert_eq!(LittleEndian::read_u32(&disk[0x4c..]), 0);
    assert_eq!(LittleEndian::read_u32(&disk[0x50..]), 0xffff_ffff);

    assert_eq!(LittleEndian::read_u32(&disk[512..]), BLOCK_SPECIAL);
    assert_eq!(LittleEndian::read_u32(&disk[516..]), BLOCK_END_OF_CHAIN);
    assert_eq!(LittleEndian::read_u32(&disk[520..]), 0xffff_ffff);

    // Root record at the start of the directory block.
    assert_eq!(LittleEndian::read_u16(&disk[1024..]), 'R' as u16);
    assert_eq!(LittleEndian::read_u16(&disk[1024 + 0x40..]), 22);
    assert_eq!(disk[1024 + 0x42], 5);
    assert_eq!(LittleEndian::read_u32(&disk[1024 + 0x74..]), BLOCK_END_OF_CHAIN);
}

#[test]
fn test_reopen_root() {
    let (handler, root) = new_docfile();
    drop(root);

    let root = reopen(&handler, open_modes()).unwrap();
    assert!(root.is_root());

    let stat = root.stat(StatFlag::Default).unwrap();
    assert_eq!(stat.name(), Some("Root Entry"));
    assert_eq!(stat.element_type(), ElementType::Storage);
    assert_eq!(root.enum_elements().unwrap().count(), 0);
}

#[test]
fn test_reopen_keeps_directory_start() {
    let (handler, root) = new_docfile();

    for i in 0..10 {
        root.create_stream(&format!("stream {}", i), create_modes())
            .unwrap()
            .write(b"contents")
            .unwrap();
    }

    let directory_start = root.header().root_start_block;
    drop(root);

    let root = reopen(&handler, open_modes()).unwrap();
    assert_eq!(root.header().root_start_block, directory_start);
    assert_eq!(root.enum_elements().unwrap().count(), 10);
}

#[test]
fn test_open_empty_file() {
    let handler = Handler::new();

    assert_eq!(
        reopen(&handler, open_modes()).err(),
        Some(DocfileError::InvalidHeader)
    );
}

#[test]
fn test_open_garbage() {
    let handler = Handler::with_bytes(vec![0x42u8; 2048]);

    assert_eq!(
        reopen(&handler, open_modes()).err(),
        Some(DocfileError::InvalidHeader)
    );
}

#[test]
fn test_open_old_format() {
    let (handler, root) = new_docfile();
    drop(root);

    handler.disk.borrow_mut()[4..8].copy_from_slice(&[0x0e, 0x11, 0xfc, 0x0d]);

    assert_eq!(
        reopen(&handler, open_modes()).err(),
        Some(DocfileError::OldFormat)
    );
}

#[test]
fn test_open_bad_block_size() {
    let (handler, root) = new_docfile();
    drop(root);

    LittleEndian::write_u16(&mut handler.disk.borrow_mut()[0x1e..], 20);

    assert_eq!(
        reopen(&handler, open_modes()).err(),
        Some(DocfileError::InvalidBlockSize)
    );
}

#[test]
fn test_create_over_existing_contents() {
    let handler = Handler::with_bytes(vec![0x42u8; 512 * 10]);

    let root = Storage::create_docfile(
        Box::new(handler.clone()),
        Box::new(Manager::new()),
        create_modes(),
    )
    .unwrap();

    assert_eq!(handler.dump_disk().len(), 512 * 3);
    assert_eq!(root.enum_elements().unwrap().count(), 0);
}

#[test]
fn test_root_commit_and_revert() {
    let (_handler, root) = new_docfile();

    root.commit().unwrap();
    root.revert().unwrap();
    root.set_element_times("anything", None, None, None).unwrap();
    root.set_state_bits(1, 1).unwrap();
}

#[test]
fn test_handles_share_the_file() {
    let (_handler, root) = new_docfile();
    assert_eq!(root.ref_count(), 1);

    let storage = root.create_storage("child", create_modes()).unwrap();
    let stream = storage.create_stream("data", create_modes()).unwrap();
    assert_eq!(root.ref_count(), 3);

    drop(storage);
    // The stream keeps its storage alive.
    assert_eq!(root.ref_count(), 2);

    drop(stream);
    assert_eq!(root.ref_count(), 1);
}

#[test]
fn test_fresh_disk_info() {
    let (_handler, root) = new_docfile();
    let info = root.disk_info().unwrap();

    assert_eq!(info.big_block_size(), 512);
    assert_eq!(info.small_block_size(), 64);
    assert_eq!(info.depot_block_count(), 1);
    assert_eq!(info.ext_depot_block_count(), 0);
    assert_eq!(info.big_block_count(), 2);
    assert_eq!(info.free_big_block_count(), 0);
    assert_eq!(info.entry_count(), 4);
    assert_eq!(info.free_entry_count(), 3);
}
