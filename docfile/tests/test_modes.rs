extern crate docfile;
use docfile::{modes_from_bits, DocfileError, Storage, StorageMode, StorageModes};

mod common;
use common::*;

#[test]
fn test_invalid_docfile_modes() {
    let handler = Handler::new();

    let result = Storage::create_docfile(
        Box::new(handler.clone()),
        Box::new(Manager::new()),
        StorageMode::Transacted | StorageMode::Simple | StorageMode::ShareExclusive,
    );
    assert_eq!(result.err(), Some(DocfileError::InvalidFlag));

    let result = Storage::create_docfile(
        Box::new(handler.clone()),
        Box::new(Manager::new()),
        StorageMode::Write | StorageMode::ReadWrite | StorageMode::ShareExclusive,
    );
    assert_eq!(result.err(), Some(DocfileError::InvalidFlag));

    // Nothing was written.
    assert_eq!(handler.dump_disk().len(), 0);
}

#[test]
fn test_transacted_docfile_is_accepted() {
    let handler = Handler::new();

    let root = Storage::create_docfile(
        Box::new(handler.clone()),
        Box::new(Manager::new()),
        create_modes() | StorageMode::Transacted,
    )
    .unwrap();

    root.create_stream("direct", create_modes()).unwrap();
    drop(root);

    let root = reopen(&handler, open_modes()).unwrap();
    assert!(root.open_stream("direct", open_modes()).is_ok());
}

#[test]
fn test_stream_modes() {
    let (_handler, root) = new_docfile();

    assert_eq!(
        root.create_stream("s", StorageMode::ReadWrite | StorageMode::Create)
            .err(),
        Some(DocfileError::InvalidFunction)
    );
    assert_eq!(
        root.create_stream("s", create_modes() | StorageMode::Transacted)
            .err(),
        Some(DocfileError::InvalidFunction)
    );
    assert_eq!(
        root.create_stream("s", create_modes() | StorageMode::DeleteOnRelease)
            .err(),
        Some(DocfileError::InvalidFunction)
    );
    assert_eq!(
        root.create_stream("s", create_modes() | StorageMode::Write)
            .err(),
        Some(DocfileError::InvalidFlag)
    );

    root.create_stream("s", create_modes()).unwrap();

    assert_eq!(
        root.open_stream("s", StorageModes::from(StorageMode::ReadWrite))
            .err(),
        Some(DocfileError::InvalidFunction)
    );
}

#[test]
fn test_storage_modes() {
    let (_handler, root) = new_docfile();

    assert_eq!(
        root.create_storage("t", create_modes() | StorageMode::DeleteOnRelease)
            .err(),
        Some(DocfileError::InvalidFlag)
    );
    assert_eq!(
        root.create_storage("t", StorageMode::ReadWrite | StorageMode::Create)
            .err(),
        Some(DocfileError::InvalidFunction)
    );
    assert_eq!(
        root.create_storage("t", create_modes() | StorageMode::Priority)
            .err(),
        Some(DocfileError::InvalidFunction)
    );

    // Transacted child storages are accepted and written directly.
    root.create_storage("t", create_modes() | StorageMode::Transacted)
        .unwrap();

    assert_eq!(
        root.open_storage("t", open_modes() | StorageMode::Priority)
            .err(),
        Some(DocfileError::InvalidFunction)
    );
    assert!(root.open_storage("t", open_modes()).is_ok());
}

#[test]
fn test_missing_elements() {
    let (_handler, root) = new_docfile();

    assert_eq!(
        root.open_stream("nope", open_modes()).err(),
        Some(DocfileError::FileNotFound)
    );
    assert_eq!(
        root.open_storage("nope", open_modes()).err(),
        Some(DocfileError::FileNotFound)
    );
    assert_eq!(
        root.rename_element("nope", "yes"),
        Err(DocfileError::FileNotFound)
    );
}

#[test]
fn test_read_only_docfile() {
    let (handler, root) = new_docfile();
    root.create_storage("inside", create_modes()).unwrap();
    drop(root);

    let root = reopen(&handler, read_only_modes()).unwrap();
    let before = handler.dump_disk();

    assert_eq!(
        root.create_stream("s", create_modes()).err(),
        Some(DocfileError::AccessDenied)
    );
    assert_eq!(
        root.create_storage("t", create_modes()).err(),
        Some(DocfileError::AccessDenied)
    );
    assert_eq!(
        root.destroy_element("inside"),
        Err(DocfileError::AccessDenied)
    );
    assert_eq!(
        root.rename_element("inside", "outside"),
        Err(DocfileError::AccessDenied)
    );
    assert_eq!(
        root.set_class(docfile::ClassId::default()),
        Err(DocfileError::AccessDenied)
    );

    assert!(root.open_storage("inside", read_only_modes()).is_ok());
    assert_eq!(handler.dump_disk(), before);
}

#[test]
fn test_modes_from_bits() {
    let modes = modes_from_bits::<Error>(0x1012).unwrap();

    assert!(modes.contains(StorageMode::ReadWrite));
    assert!(modes.contains(StorageMode::ShareExclusive));
    assert!(modes.contains(StorageMode::Create));

    assert_eq!(
        modes_from_bits::<Error>(0x8000_0000),
        Err(DocfileError::InvalidFlag)
    );
}
