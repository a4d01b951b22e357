mod error;
mod handler;
mod manager;

pub use error::ToolError;
pub use handler::Handler;
pub use manager::Manager;
use byte_unit::Byte;
use docfile::{Storage, StorageMode, StorageModes};

pub type Docfile = Storage<ToolError>;

/// Read/write, exclusive.
pub fn read_write_modes() -> StorageModes {
    return StorageMode::ReadWrite | StorageMode::ShareExclusive;
}

/// Read only, exclusive.
pub fn read_modes() -> StorageModes {
    return StorageModes::from(StorageMode::ShareExclusive);
}

/// Read/write, exclusive, replacing whatever is there.
pub fn create_modes() -> StorageModes {
    return read_write_modes() | StorageMode::Create;
}

/// Lays out a new docfile at `path` and returns its root storage.
pub fn create_docfile(path: &str, modes: StorageModes) -> Result<Docfile, ToolError> {
    let handler = Handler::new_create(path, modes)?;

    return Ok(Storage::create_docfile(
        Box::new(handler),
        Box::new(Manager::new()),
        modes,
    )?);
}

pub fn open_docfile(path: &str, modes: StorageModes) -> Result<Docfile, ToolError> {
    let handler = Handler::new(path, modes)?;

    return Ok(Storage::open_docfile(
        Box::new(handler),
        Box::new(Manager::new()),
        modes,
    )?);
}

/// Splits a path inside a docfile into element names. Empty components are skipped.
pub fn split_path(path: &str) -> Vec<&str> {
    return path.split('/').filter(|s| !s.is_empty()).collect();
}

/// Walks `components` down from `root`. Missing storages are created when `create` is set.
pub fn walk_storages(
    root: &Docfile,
    components: &[&str],
    create: bool,
) -> Result<Docfile, ToolError> {
    let mut storage = root.clone();

    for name in components.iter() {
        storage = match storage.open_storage(name, read_write_modes()) {
            Ok(s) => s,
            Err(docfile::DocfileError::FileNotFound) if create => {
                storage.create_storage(name, read_write_modes())?
            }
            Err(e) => return Err(ToolError::from(e)),
        };
    }

    return Ok(storage);
}

/// Splits a path into its parent storage (opened or created) and the final element name.
pub fn parent_and_name<'a>(
    root: &Docfile,
    path: &'a str,
    create: bool,
) -> Result<(Docfile, &'a str), ToolError> {
    let components = split_path(path);

    let (name, parents) = match components.split_last() {
        Some(split) => split,
        None => return Err(ToolError::new("An element name is required.")),
    };

    return Ok((walk_storages(root, parents, create)?, *name));
}

pub fn u64_to_sized_string(n: u64) -> String {
    return Byte::from(n).get_appropriate_unit(false).to_string();
}
