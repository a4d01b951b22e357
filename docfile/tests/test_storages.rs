extern crate docfile;
use docfile::{compare_names, ClassId, DocfileError, ElementType, StatFlag};

mod common;
use common::*;

fn element_names(root: &docfile::Storage<Error>) -> Vec<String> {
    return root
        .enum_elements()
        .unwrap()
        .map(|stat| String::from(stat.unwrap().name().unwrap()))
        .collect();
}

#[test]
fn test_insert_and_find_in_any_order() {
    let (handler, root) = new_docfile();

    // A fixed shuffle of 0..50.
    let order: Vec<usize> = (0..50).map(|i| (i * 37 + 11) % 50).collect();

    for i in order.iter() {
        root.create_stream(&format!("Entry {}", i), create_modes())
            .unwrap()
            .write(format!("{}", i).as_bytes())
            .unwrap();
    }

    drop(root);
    let root = reopen(&handler, open_modes()).unwrap();

    for i in 0..50 {
        let mut stream = root.open_stream(&format!("Entry {}", i), open_modes()).unwrap();
        assert_eq!(stream.read_to_end().unwrap(), format!("{}", i).into_bytes());
    }

    let mut expected: Vec<String> = (0..50).map(|i| format!("Entry {}", i)).collect();
    expected.sort_by(|a, b| {
        let a: Vec<u16> = a.encode_utf16().collect();
        let b: Vec<u16> = b.encode_utf16().collect();
        compare_names(&a, &b)
    });

    assert_eq!(element_names(&root), expected);
}

#[test]
fn test_enumeration_order() {
    let (_handler, root) = new_docfile();

    for name in ["bb", "A", "ccc", "a2", "B"].iter() {
        root.create_stream(name, create_modes()).unwrap();
    }

    // Shorter names sort first, then case-insensitively.
    assert_eq!(element_names(&root), vec!["A", "B", "a2", "bb", "ccc"]);
}

#[test]
fn test_names_match_case_insensitively() {
    let (_handler, root) = new_docfile();
    root.create_stream("Contents", create_modes()).unwrap();

    assert!(root.open_stream("CONTENTS", open_modes()).is_ok());
    assert_eq!(
        root.create_stream("contents", open_modes()).err(),
        Some(DocfileError::FileAlreadyExists)
    );
}

#[test]
fn test_enumerator_skip_reset_clone() {
    let (_handler, root) = new_docfile();

    for name in ["a", "b", "c", "d"].iter() {
        root.create_storage(name, create_modes()).unwrap();
    }

    let mut elements = root.enum_elements().unwrap();
    assert_eq!(elements.skip_entries(1).unwrap(), 1);

    let copy = elements.clone();
    let rest: Vec<String> = copy
        .map(|stat| String::from(stat.unwrap().name().unwrap()))
        .collect();
    assert_eq!(rest, vec!["b", "c", "d"]);

    assert_eq!(elements.skip_entries(10).unwrap(), 3);
    assert!(elements.next().is_none());

    elements.reset().unwrap();
    let first = elements.next().unwrap().unwrap();
    assert_eq!(first.name(), Some("a"));
    assert_eq!(first.element_type(), ElementType::Storage);
}

#[test]
fn test_nested_storages() {
    let (handler, root) = new_docfile();

    let outer = root.create_storage("outer", create_modes()).unwrap();
    let inner = outer.create_storage("inner", create_modes()).unwrap();
    inner
        .create_stream("leaf", create_modes())
        .unwrap()
        .write(b"leaf data")
        .unwrap();

    drop(inner);
    drop(outer);
    drop(root);

    let root = reopen(&handler, open_modes()).unwrap();
    let outer = root.open_storage("outer", open_modes()).unwrap();
    let inner = outer.open_storage("inner", open_modes()).unwrap();
    let mut leaf = inner.open_stream("leaf", open_modes()).unwrap();
    assert_eq!(leaf.read_to_end().unwrap(), b"leaf data".to_vec());

    // Wrong kind of element.
    assert_eq!(
        outer.open_stream("inner", open_modes()).err(),
        Some(DocfileError::FileNotFound)
    );
    assert_eq!(
        inner.open_storage("leaf", open_modes()).err(),
        Some(DocfileError::FileNotFound)
    );

    assert_eq!(element_names(&root), vec!["outer"]);
    assert_eq!(element_names(&outer), vec!["inner"]);
}

#[test]
fn test_destroy_storage_recursively() {
    let (_handler, root) = new_docfile();

    let storage = root.create_storage("S", create_modes()).unwrap();
    storage
        .create_stream("a", create_modes())
        .unwrap()
        .write(&pattern(10000))
        .unwrap();
    storage
        .create_stream("b", create_modes())
        .unwrap()
        .write(&pattern(6000))
        .unwrap();

    let inner = storage.create_storage("T", create_modes()).unwrap();
    inner
        .create_stream("c", create_modes())
        .unwrap()
        .write(&pattern(5000))
        .unwrap();

    drop(inner);
    drop(storage);

    let before = root.disk_info().unwrap();
    root.destroy_element("S").unwrap();
    let after = root.disk_info().unwrap();

    // 20 + 12 + 10 blocks of stream data.
    assert_eq!(
        after.free_big_block_count() - before.free_big_block_count(),
        42
    );
    assert_eq!(after.free_entry_count() - before.free_entry_count(), 5);

    assert_eq!(
        root.open_storage("S", open_modes()).err(),
        Some(DocfileError::FileNotFound)
    );
    assert_eq!(root.enum_elements().unwrap().count(), 0);
}

#[test]
fn test_destroy_keeps_siblings() {
    let (handler, root) = new_docfile();
    let names = ["m", "f", "t", "b", "h", "p", "w", "a", "c", "g", "i"];

    for name in names.iter() {
        root.create_stream(name, create_modes())
            .unwrap()
            .write(name.as_bytes())
            .unwrap();
    }

    // Inner node with both subtrees, a leaf and the top of the tree.
    root.destroy_element("f").unwrap();
    root.destroy_element("i").unwrap();
    root.destroy_element("m").unwrap();

    drop(root);
    let root = reopen(&handler, open_modes()).unwrap();

    let mut remaining: Vec<&str> = names
        .iter()
        .cloned()
        .filter(|name| !["f", "i", "m"].contains(name))
        .collect();
    remaining.sort();

    assert_eq!(element_names(&root), remaining);

    for name in remaining.iter() {
        let mut stream = root.open_stream(name, open_modes()).unwrap();
        assert_eq!(stream.read_to_end().unwrap(), name.as_bytes().to_vec());
    }
}

#[test]
fn test_destroy_missing() {
    let (_handler, root) = new_docfile();

    assert_eq!(
        root.destroy_element("nothing"),
        Err(DocfileError::FileNotFound)
    );
}

#[test]
fn test_destroyed_slot_is_reused() {
    let (_handler, root) = new_docfile();

    root.create_stream("first", create_modes()).unwrap();
    root.destroy_element("first").unwrap();
    let free = root.disk_info().unwrap().free_entry_count();

    root.create_stream("second", create_modes()).unwrap();
    assert_eq!(root.disk_info().unwrap().free_entry_count(), free - 1);
    assert_eq!(element_names(&root), vec!["second"]);
}

#[test]
fn test_rename() {
    let (handler, root) = new_docfile();
    let contents = pattern(7000);

    root.create_stream("old", create_modes())
        .unwrap()
        .write(&contents)
        .unwrap();
    root.create_stream("other", create_modes()).unwrap();

    let free_blocks = root.disk_info().unwrap().free_big_block_count();

    assert_eq!(
        root.rename_element("old", "other"),
        Err(DocfileError::FileAlreadyExists)
    );
    assert_eq!(
        root.rename_element("missing", "fresh"),
        Err(DocfileError::FileNotFound)
    );
    assert_eq!(
        root.rename_element("old", "bad/name"),
        Err(DocfileError::InvalidName(String::from("bad/name")))
    );

    root.rename_element("old", "new").unwrap();

    // The content moves, it is not copied or freed.
    assert_eq!(root.disk_info().unwrap().free_big_block_count(), free_blocks);

    drop(root);
    let root = reopen(&handler, open_modes()).unwrap();

    assert_eq!(
        root.open_stream("old", open_modes()).err(),
        Some(DocfileError::FileNotFound)
    );

    let mut stream = root.open_stream("new", open_modes()).unwrap();
    assert_eq!(stream.read_to_end().unwrap(), contents);
    assert_eq!(element_names(&root), vec!["new", "other"]);
}

#[test]
fn test_rename_storage_keeps_children() {
    let (_handler, root) = new_docfile();

    let storage = root.create_storage("before", create_modes()).unwrap();
    storage.create_stream("child", create_modes()).unwrap();
    drop(storage);

    root.rename_element("before", "after").unwrap();

    let storage = root.open_storage("after", open_modes()).unwrap();
    assert_eq!(element_names(&storage), vec!["child"]);
}

#[test]
fn test_create_existing() {
    let (_handler, root) = new_docfile();

    root.create_stream("stream", create_modes())
        .unwrap()
        .write(&pattern(5000))
        .unwrap();

    assert_eq!(
        root.create_stream("stream", open_modes()).err(),
        Some(DocfileError::FileAlreadyExists)
    );
    assert_eq!(
        root.create_storage("stream", open_modes()).err(),
        Some(DocfileError::FileAlreadyExists)
    );

    // Create replaces the old element.
    let stream = root.create_stream("stream", create_modes()).unwrap();
    assert_eq!(stream.size().unwrap(), 0);
    assert_eq!(root.enum_elements().unwrap().count(), 1);

    let storage = root.create_storage("stream", create_modes()).unwrap();
    assert_eq!(
        storage.stat(StatFlag::Default).unwrap().element_type(),
        ElementType::Storage
    );
    assert_eq!(root.enum_elements().unwrap().count(), 1);
}

#[test]
fn test_invalid_names() {
    let (_handler, root) = new_docfile();

    for name in ["", "a/b", "a\\b", "a:b", "a!b"].iter() {
        assert_eq!(
            root.create_stream(name, create_modes()).err(),
            Some(DocfileError::InvalidName(String::from(*name)))
        );
    }

    let longest = "x".repeat(31);
    assert!(root.create_storage(&longest, create_modes()).is_ok());

    let too_long = "x".repeat(32);
    assert_eq!(
        root.create_storage(&too_long, create_modes()).err(),
        Some(DocfileError::InvalidName(too_long.clone()))
    );
}

#[test]
fn test_stat_and_class() {
    let (handler, root) = new_docfile();
    let clsid = ClassId::new(
        0x0002_0906,
        0,
        0,
        [0xc0, 0, 0, 0, 0, 0, 0, 0x46],
    );

    let storage = root.create_storage("classy", create_modes()).unwrap();
    storage.set_class(clsid).unwrap();

    let stat = storage.stat(StatFlag::Default).unwrap();
    assert_eq!(stat.name(), Some("classy"));
    assert_eq!(stat.clsid(), clsid);
    assert!(stat.created().is_some());
    assert!(stat.modified().is_some());

    assert_eq!(storage.stat(StatFlag::NoName).unwrap().name(), None);

    drop(storage);
    drop(root);

    let root = reopen(&handler, open_modes()).unwrap();
    let storage = root.open_storage("classy", open_modes()).unwrap();
    assert_eq!(storage.stat(StatFlag::Default).unwrap().clsid(), clsid);
}

#[test]
fn test_directory_growth() {
    let (_handler, root) = new_docfile();

    for i in 0..100 {
        root.create_storage(&format!("storage {}", i), create_modes())
            .unwrap();
    }

    let info = root.disk_info().unwrap();
    assert_eq!(info.entry_count(), 104);
    assert_eq!(info.free_entry_count(), 3);
    assert_eq!(root.enum_elements().unwrap().count(), 100);
}
