#![allow(dead_code)]
extern crate docfile;
use chrono::{DateTime, Utc};
use docfile::{
    DiskHandler, DocfileErrorConvertible, OSManager, Storage, StorageMode, StorageModes,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, PartialEq, Eq)]
pub struct Error {}

impl DocfileErrorConvertible for Error {}

pub type Result<T> = std::result::Result<T, docfile::DocfileError<Error>>;

/// An in-memory disk. Clones share the same bytes so a file can be reopened.
#[derive(Clone)]
pub struct Handler {
    pub disk: Rc<RefCell<Vec<u8>>>,
}

impl Handler {
    pub fn new() -> Self {
        return Self {
            disk: Rc::new(RefCell::new(Vec::new())),
        };
    }

    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        return Self {
            disk: Rc::new(RefCell::new(bytes)),
        };
    }

    pub fn dump_disk(&self) -> Vec<u8> {
        return self.disk.borrow().clone();
    }
}

impl DiskHandler<Error> for Handler {
    fn write_bytes(&mut self, bytes: &[u8], location: u64) -> std::result::Result<(), Error> {
        let mut disk = self.disk.borrow_mut();
        let location = location as usize;

        if disk.len() < location + bytes.len() {
            disk.resize(location + bytes.len(), 0);
        }

        disk[location..location + bytes.len()].copy_from_slice(bytes);

        return Ok(());
    }

    fn read_bytes(&self, location: u64, amount: u64) -> std::result::Result<Vec<u8>, Error> {
        let disk = self.disk.borrow();
        let location = location as usize;
        let amount = amount as usize;
        return Ok(disk[location..location + amount].to_vec());
    }

    fn disk_size(&self) -> std::result::Result<u64, Error> {
        return Ok(self.disk.borrow().len() as u64);
    }

    fn set_disk_size(&mut self, size: u64) -> std::result::Result<(), Error> {
        self.disk.borrow_mut().resize(size as usize, 0);

        return Ok(());
    }
}

#[derive(Debug)]
pub struct Manager {}

impl Manager {
    pub fn new() -> Self {
        return Self {};
    }
}

impl OSManager for Manager {
    fn current_time(&self) -> DateTime<Utc> {
        return Utc::now();
    }
}

/// Read/write, exclusive, create.
pub fn create_modes() -> StorageModes {
    return StorageMode::ReadWrite | StorageMode::ShareExclusive | StorageMode::Create;
}

/// Read/write, exclusive.
pub fn open_modes() -> StorageModes {
    return StorageMode::ReadWrite | StorageMode::ShareExclusive;
}

pub fn read_only_modes() -> StorageModes {
    return StorageModes::from(StorageMode::ShareExclusive);
}

/// A fresh root storage over an empty in-memory disk.
pub fn new_docfile() -> (Handler, Storage<Error>) {
    let handler = Handler::new();
    let root = Storage::create_docfile(
        Box::new(handler.clone()),
        Box::new(Manager::new()),
        create_modes(),
    )
    .unwrap();

    return (handler, root);
}

pub fn reopen(handler: &Handler, modes: StorageModes) -> Result<Storage<Error>> {
    return Storage::open_docfile(
        Box::new(handler.clone()),
        Box::new(Manager::new()),
        modes,
    );
}

/// Bytes with a recognisable pattern.
pub fn pattern(len: usize) -> Vec<u8> {
    return (0..len).map(|i| (i % 251) as u8).collect();
}
