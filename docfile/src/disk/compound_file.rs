use super::block_file::{BlockFile, HEADER_BLOCK};
use super::disk_blocks::{
    DirEntry, EntryType, Header, Signature, DIR_ENTRY_SIZE, HEADER_SIZE, MAX_ENTRY_INDEX,
};
use super::{BlockChainStream, DiskHandler, BLOCK_END_OF_CHAIN, BLOCK_SPECIAL};
use crate::mode::{access_mode, validate_modes, AccessMode, StorageMode, StorageModes};
use crate::{ByteSerializable, DocfileError, DocfileErrorConvertible, OSManager};
use alloc::boxed::Box;
use alloc::collections::BTreeSet;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};

/// The allocation-table block most recently read.
pub(super) struct DepotCache {
    pub depot_index: u32,
    pub entries: Vec<u32>,
}

/// Shared state of one open compound file: the block file, its header and the allocation-table cache.
pub struct CompoundFile<E: DocfileErrorConvertible> {
    pub(super) blocks: BlockFile<E>,
    pub(super) header: Header,
    pub(super) depot_cache: Option<DepotCache>,
    /// Stream records that keep big blocks after shrinking below the small-block limit.
    shrunk_big_streams: BTreeSet<u32>,
    manager: Box<dyn OSManager>,
    root_entry_index: u32,
    writable: bool,
}

impl<E: DocfileErrorConvertible> CompoundFile<E> {
    /// Lays out an empty compound file over the handler, discarding its contents.
    pub fn create(
        handler: Box<dyn DiskHandler<E>>,
        manager: Box<dyn OSManager>,
        modes: StorageModes,
    ) -> Result<Self, DocfileError<E>> {
        Self::check_modes(modes)?;

        let header = Header::new();
        let blocks = BlockFile::new(handler, header.big_block_size());

        let mut file = Self {
            blocks,
            header,
            depot_cache: None,
            shrunk_big_streams: BTreeSet::new(),
            manager,
            root_entry_index: 0,
            writable: access_mode(modes) != AccessMode::Read,
        };

        file.blocks.set_size(0)?;
        file.save_header()?;
        file.blocks.set_size(file.big_block_size() * 3)?;

        file.blocks.map_block_mut(0, |block| {
            for byte in block.iter_mut() {
                *byte = 0xff;
            }

            LittleEndian::write_u32(&mut block[0..], BLOCK_SPECIAL);
            LittleEndian::write_u32(&mut block[4..], BLOCK_END_OF_CHAIN);
        })?;

        file.write_entry(0, &DirEntry::root())?;
        file.root_entry_index = file.locate_root_entry()?;

        return Ok(file);
    }

    /// Loads the header of an existing compound file.
    pub fn open(
        handler: Box<dyn DiskHandler<E>>,
        manager: Box<dyn OSManager>,
        modes: StorageModes,
    ) -> Result<Self, DocfileError<E>> {
        Self::check_modes(modes)?;

        let mut blocks = BlockFile::new(handler, HEADER_SIZE as u64);

        let bytes = match blocks.read_bytes(blocks.location(HEADER_BLOCK), HEADER_SIZE as u64)? {
            Some(b) => b,
            None => return Err(DocfileError::InvalidHeader),
        };

        match Header::signature(&bytes) {
            Signature::Current => (),
            Signature::Old => return Err(DocfileError::OldFormat),
            Signature::Unknown => return Err(DocfileError::InvalidHeader),
        }

        let header = match Header::from_bytes(&bytes) {
            Some(h) => h,
            None => return Err(DocfileError::InvalidHeader),
        };

        if !header.has_valid_block_sizes() {
            return Err(DocfileError::InvalidBlockSize);
        }

        blocks.set_block_size(header.big_block_size());

        let mut file = Self {
            blocks,
            header,
            depot_cache: None,
            shrunk_big_streams: BTreeSet::new(),
            manager,
            root_entry_index: 0,
            writable: access_mode(modes) != AccessMode::Read,
        };

        file.root_entry_index = file.locate_root_entry()?;

        return Ok(file);
    }

    fn check_modes(modes: StorageModes) -> Result<(), DocfileError<E>> {
        if !validate_modes(modes) {
            return Err(DocfileError::InvalidFlag);
        }

        if modes.contains(StorageMode::Transacted) {
            log::warn!("Transacted mode is not implemented, changes are written directly");
        }

        return Ok(());
    }

    fn locate_root_entry(&mut self) -> Result<u32, DocfileError<E>> {
        let mut index = 0;

        loop {
            match self.read_entry(index)? {
                Some(entry) => {
                    if entry.entry_type == EntryType::Root && !entry.is_free() {
                        return Ok(index);
                    }
                }
                None => return Err(DocfileError::CorruptedFile),
            }

            index += 1;
        }
    }

    #[inline]
    pub fn big_block_size(&self) -> u64 {
        return self.blocks.block_size();
    }

    #[inline]
    pub fn small_block_size(&self) -> u64 {
        return self.header.small_block_size();
    }

    #[inline]
    pub fn root_entry_index(&self) -> u32 {
        return self.root_entry_index;
    }

    #[inline]
    pub fn header(&self) -> &Header {
        return &self.header;
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        return self.writable;
    }

    #[inline]
    pub(super) fn is_shrunk_big_stream(&self, index: u32) -> bool {
        return self.shrunk_big_streams.contains(&index);
    }

    pub(super) fn set_shrunk_big_stream(&mut self, index: u32, shrunk: bool) {
        if shrunk {
            self.shrunk_big_streams.insert(index);
        } else {
            self.shrunk_big_streams.remove(&index);
        }
    }

    /// Current time in FILETIME ticks.
    pub fn current_filetime(&self) -> u64 {
        return crate::manager::to_filetime(&self.manager.current_time());
    }

    pub fn save_header(&mut self) -> Result<(), DocfileError<E>> {
        let bytes = self.header.to_bytes();
        let location = self.blocks.location(HEADER_BLOCK);

        return self.blocks.write_bytes(&bytes, location);
    }

    pub fn file_size(&self) -> Result<u64, DocfileError<E>> {
        return self.blocks.size();
    }

    pub fn flush(&mut self) -> Result<(), DocfileError<E>> {
        return self.blocks.flush();
    }

    /// Reads raw bytes of a big block for diagnostics.
    pub fn read_block(&self, index: u32) -> Result<Vec<u8>, DocfileError<E>> {
        return self.blocks.map_block(index, |block| block.to_vec());
    }

    /// Reads a directory record. None if the directory stream does not reach that far.
    pub fn read_entry(&mut self, index: u32) -> Result<Option<DirEntry>, DocfileError<E>> {
        let mut buffer = [0u8; DIR_ENTRY_SIZE as usize];
        let directory = BlockChainStream::directory();

        let read = directory.read_at(self, index as u64 * DIR_ENTRY_SIZE, &mut buffer)?;

        if read < buffer.len() {
            return Ok(None);
        }

        return Ok(DirEntry::from_bytes(&buffer));
    }

    /// Reads a record that the directory tree refers to.
    pub fn entry(&mut self, index: u32) -> Result<DirEntry, DocfileError<E>> {
        return match self.read_entry(index)? {
            Some(entry) => Ok(entry),
            None => Err(DocfileError::CorruptedFile),
        };
    }

    pub fn write_entry(&mut self, index: u32, entry: &DirEntry) -> Result<(), DocfileError<E>> {
        let bytes = entry.to_bytes();
        let directory = BlockChainStream::directory();

        let written = directory.write_at(self, index as u64 * DIR_ENTRY_SIZE, &bytes)?;

        if written < bytes.len() {
            return Err(DocfileError::CorruptedFile);
        }

        return Ok(());
    }

    /// Returns the first free directory slot, growing the directory stream by one block if all are taken.
    pub fn allocate_entry(&mut self) -> Result<u32, DocfileError<E>> {
        let mut index = 0;

        loop {
            match self.read_entry(index)? {
                Some(entry) => {
                    if entry.is_free() {
                        return Ok(index);
                    }
                }
                None => break,
            }

            if index >= MAX_ENTRY_INDEX {
                return Err(DocfileError::InsufficientMemory);
            }

            index += 1;
        }

        let mut directory = BlockChainStream::directory();
        let block_count = directory.count(self)? as u64 + 1;
        directory.set_size(self, self.big_block_size() * block_count)?;

        let last_index = ((self.big_block_size() / DIR_ENTRY_SIZE) * block_count) as u32;

        log::debug!(
            "Directory stream grown to {} blocks ({} records)",
            block_count,
            last_index
        );

        let empty = DirEntry::empty();
        for i in index..last_index {
            self.write_entry(i, &empty)?;
        }

        return Ok(index);
    }
}
