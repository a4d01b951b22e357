use crate::disk::{
    encode_name, ClassId, CompoundFile, DirEntry, DiskHandler, DiskInfo, EntryType, Header,
    StreamChain, NO_ENTRY,
};
use crate::enumerator::Elements;
use crate::mode::{validate_modes, StorageMode, StorageModes};
use crate::stat::{StatFlag, StatInfo};
use crate::stream::Stream;
use crate::{DocfileError, DocfileErrorConvertible, OSManager};
use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use chrono::{DateTime, Utc};
use core::cell::RefCell;

/// A handle to a storage. Clones share the open file and keep it alive.
pub struct Storage<E: DocfileErrorConvertible> {
    pub(crate) file: Rc<RefCell<CompoundFile<E>>>,
    index: u32,
}

impl<E: DocfileErrorConvertible> Clone for Storage<E> {
    fn clone(&self) -> Self {
        return Self {
            file: Rc::clone(&self.file),
            index: self.index,
        };
    }
}

fn check_stream_modes<E>(modes: StorageModes) -> Result<(), DocfileError<E>> {
    if !validate_modes(modes) {
        return Err(DocfileError::InvalidFlag);
    }

    if !modes.contains(StorageMode::ShareExclusive)
        || modes.contains(StorageMode::DeleteOnRelease)
        || modes.contains(StorageMode::Transacted)
    {
        return Err(DocfileError::InvalidFunction);
    }

    return Ok(());
}

fn check_open_storage_modes<E>(modes: StorageModes) -> Result<(), DocfileError<E>> {
    if !validate_modes(modes) {
        return Err(DocfileError::InvalidFlag);
    }

    if !modes.contains(StorageMode::ShareExclusive)
        || modes.contains(StorageMode::DeleteOnRelease)
        || modes.contains(StorageMode::Priority)
    {
        return Err(DocfileError::InvalidFunction);
    }

    return Ok(());
}

fn encode<E>(name: &str) -> Result<Vec<u16>, DocfileError<E>> {
    return match encode_name(name) {
        Some(units) => Ok(units),
        None => Err(DocfileError::InvalidName(String::from(name))),
    };
}

fn check_writable<E: DocfileErrorConvertible>(
    file: &CompoundFile<E>,
) -> Result<(), DocfileError<E>> {
    if !file.is_writable() {
        return Err(DocfileError::AccessDenied);
    }

    return Ok(());
}

/// Writes a new record and links it below `parent`.
fn add_entry<E: DocfileErrorConvertible>(
    file: &mut CompoundFile<E>,
    parent: u32,
    name: Vec<u16>,
    entry_type: EntryType,
) -> Result<u32, DocfileError<E>> {
    let now = file.current_filetime();

    let mut entry = DirEntry::new(name, entry_type);
    entry.created = now;
    entry.modified = now;

    let index = file.allocate_entry()?;
    file.write_entry(index, &entry)?;
    file.insert_entry(parent, index, &entry)?;

    return Ok(index);
}

impl<E: DocfileErrorConvertible> Storage<E> {
    /// Lays out a new compound file over the handler and returns its root storage.
    pub fn create_docfile(
        handler: Box<dyn DiskHandler<E>>,
        manager: Box<dyn OSManager>,
        modes: StorageModes,
    ) -> Result<Self, DocfileError<E>> {
        let file = CompoundFile::create(handler, manager, modes)?;

        return Ok(Self::root(file));
    }

    /// Opens the root storage of an existing compound file.
    pub fn open_docfile(
        handler: Box<dyn DiskHandler<E>>,
        manager: Box<dyn OSManager>,
        modes: StorageModes,
    ) -> Result<Self, DocfileError<E>> {
        let file = CompoundFile::open(handler, manager, modes)?;

        return Ok(Self::root(file));
    }

    fn root(file: CompoundFile<E>) -> Self {
        let index = file.root_entry_index();

        return Self {
            file: Rc::new(RefCell::new(file)),
            index,
        };
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        return self.index == self.file.borrow().root_entry_index();
    }

    /// Number of live handles on the open file.
    #[inline]
    pub fn ref_count(&self) -> usize {
        return Rc::strong_count(&self.file);
    }

    pub fn create_stream(
        &self,
        name: &str,
        modes: StorageModes,
    ) -> Result<Stream<E>, DocfileError<E>> {
        check_stream_modes(modes)?;
        let units = encode(name)?;

        let mut file = self.file.borrow_mut();
        check_writable(&file)?;

        if file.find_entry(self.index, &units)?.is_some() {
            if !modes.contains(StorageMode::Create) {
                return Err(DocfileError::FileAlreadyExists);
            }

            file.destroy_entry(self.index, &units)?;
        }

        let index = add_entry(&mut file, self.index, units, EntryType::Stream)?;
        let chain = StreamChain::open(&mut file, index)?;

        return Ok(Stream::new(self.clone(), index, chain));
    }

    pub fn open_stream(
        &self,
        name: &str,
        modes: StorageModes,
    ) -> Result<Stream<E>, DocfileError<E>> {
        check_stream_modes(modes)?;
        let units: Vec<u16> = name.encode_utf16().collect();

        let mut file = self.file.borrow_mut();

        return match file.find_entry(self.index, &units)? {
            Some((index, entry)) if entry.entry_type == EntryType::Stream => {
                let chain = StreamChain::open(&mut file, index)?;
                Ok(Stream::new(self.clone(), index, chain))
            }
            _ => Err(DocfileError::FileNotFound),
        };
    }

    pub fn create_storage(
        &self,
        name: &str,
        modes: StorageModes,
    ) -> Result<Storage<E>, DocfileError<E>> {
        if !validate_modes(modes) || modes.contains(StorageMode::DeleteOnRelease) {
            return Err(DocfileError::InvalidFlag);
        }

        check_open_storage_modes(modes)?;
        let units = encode(name)?;

        let mut file = self.file.borrow_mut();
        check_writable(&file)?;

        if file.find_entry(self.index, &units)?.is_some() {
            if !modes.contains(StorageMode::Create) {
                return Err(DocfileError::FileAlreadyExists);
            }

            file.destroy_entry(self.index, &units)?;
        }

        let index = add_entry(&mut file, self.index, units, EntryType::Storage)?;

        return Ok(Self {
            file: Rc::clone(&self.file),
            index,
        });
    }

    pub fn open_storage(
        &self,
        name: &str,
        modes: StorageModes,
    ) -> Result<Storage<E>, DocfileError<E>> {
        check_open_storage_modes(modes)?;
        let units: Vec<u16> = name.encode_utf16().collect();

        let mut file = self.file.borrow_mut();

        return match file.find_entry(self.index, &units)? {
            Some((index, entry)) if entry.entry_type == EntryType::Storage => Ok(Self {
                file: Rc::clone(&self.file),
                index,
            }),
            _ => Err(DocfileError::FileNotFound),
        };
    }

    /// The children of this storage in name order.
    pub fn enum_elements(&self) -> Result<Elements<E>, DocfileError<E>> {
        return Elements::new(Rc::clone(&self.file), self.index);
    }

    pub fn stat(&self, flag: StatFlag) -> Result<StatInfo, DocfileError<E>> {
        let entry = self.file.borrow_mut().entry(self.index)?;

        return Ok(StatInfo::from_entry(&entry, flag));
    }

    /// Moves a child to a new record under `new_name`. The content is not copied.
    pub fn rename_element(&self, old_name: &str, new_name: &str) -> Result<(), DocfileError<E>> {
        let new_units = encode(new_name)?;
        let old_units: Vec<u16> = old_name.encode_utf16().collect();

        let mut file = self.file.borrow_mut();
        check_writable(&file)?;

        if file.find_entry(self.index, &new_units)?.is_some() {
            return Err(DocfileError::FileAlreadyExists);
        }

        let (old_index, old_entry) = match file.find_entry(self.index, &old_units)? {
            Some(found) => found,
            None => return Err(DocfileError::FileNotFound),
        };

        let mut renamed = DirEntry::new(new_units, old_entry.entry_type);
        renamed.start_block = old_entry.start_block;
        renamed.size = old_entry.size;
        renamed.child = old_entry.child;
        renamed.clsid = old_entry.clsid;
        renamed.created = old_entry.created;
        renamed.modified = old_entry.modified;

        let new_index = file.allocate_entry()?;
        file.write_entry(new_index, &renamed)?;
        file.insert_entry(self.index, new_index, &renamed)?;

        // The content now belongs to the new record, so delete the old one as an empty storage.
        let mut neutered = file.entry(old_index)?;
        neutered.entry_type = EntryType::Storage;
        neutered.child = NO_ENTRY;
        file.write_entry(old_index, &neutered)?;

        return file.destroy_entry(self.index, old_entry.name_units());
    }

    /// Deletes a child and, for storages, everything below it.
    pub fn destroy_element(&self, name: &str) -> Result<(), DocfileError<E>> {
        let units: Vec<u16> = name.encode_utf16().collect();

        let mut file = self.file.borrow_mut();
        check_writable(&file)?;

        return file.destroy_entry(self.index, &units);
    }

    /// Accepted and ignored.
    pub fn set_element_times(
        &self,
        _name: &str,
        _created: Option<DateTime<Utc>>,
        _accessed: Option<DateTime<Utc>>,
        _modified: Option<DateTime<Utc>>,
    ) -> Result<(), DocfileError<E>> {
        return Ok(());
    }

    /// Accepted and ignored.
    pub fn set_state_bits(&self, _bits: u32, _mask: u32) -> Result<(), DocfileError<E>> {
        return Ok(());
    }

    pub fn set_class(&self, clsid: ClassId) -> Result<(), DocfileError<E>> {
        let mut file = self.file.borrow_mut();
        check_writable(&file)?;

        let mut entry = file.entry(self.index)?;
        entry.clsid = clsid;

        return file.write_entry(self.index, &entry);
    }

    /// Changes are written as they happen, committing the root only flushes the handler.
    pub fn commit(&self) -> Result<(), DocfileError<E>> {
        if self.is_root() {
            return self.file.borrow_mut().flush();
        }

        return Ok(());
    }

    pub fn revert(&self) -> Result<(), DocfileError<E>> {
        return Ok(());
    }

    pub fn disk_info(&self) -> Result<DiskInfo, DocfileError<E>> {
        return DiskInfo::from_file(&mut self.file.borrow_mut());
    }

    pub fn header(&self) -> Header {
        return self.file.borrow().header().clone();
    }

    /// Raw content of a big block.
    pub fn read_block(&self, index: u32) -> Result<Vec<u8>, DocfileError<E>> {
        return self.file.borrow().read_block(index);
    }
}
