use super::{BlockChainStream, CompoundFile, BLOCK_END_OF_CHAIN, BLOCK_UNUSED};
use crate::{DocfileError, DocfileErrorConvertible};
use alloc::vec;
use byteorder::{ByteOrder, LittleEndian};
use core::cmp::min;

// Small blocks live inside the root stream, the big-block chain started by the root record.
// Their chains are kept in the mini allocation table, itself a headless big-block chain.

impl<E: DocfileErrorConvertible> CompoundFile<E> {
    fn root_stream(&self) -> BlockChainStream {
        return BlockChainStream::for_entry(self.root_entry_index());
    }

    /// Next small block in a chain. Entries past the end of the table read as end of chain.
    pub(crate) fn next_small_block(&mut self, index: u32) -> Result<u32, DocfileError<E>> {
        let mut buffer = [0u8; 4];
        let depot = BlockChainStream::small_depot();

        if depot.read_at(self, index as u64 * 4, &mut buffer)? < buffer.len() {
            return Ok(BLOCK_END_OF_CHAIN);
        }

        return Ok(LittleEndian::read_u32(&buffer));
    }

    pub(crate) fn set_next_small_block(
        &mut self,
        index: u32,
        next: u32,
    ) -> Result<(), DocfileError<E>> {
        let mut buffer = [0u8; 4];
        LittleEndian::write_u32(&mut buffer, next);

        let depot = BlockChainStream::small_depot();

        if depot.write_at(self, index as u64 * 4, &buffer)? < buffer.len() {
            return Err(DocfileError::CorruptedFile);
        }

        return Ok(());
    }

    #[inline]
    fn free_small_block(&mut self, index: u32) -> Result<(), DocfileError<E>> {
        return self.set_next_small_block(index, BLOCK_UNUSED);
    }

    /// First free small block. Grows the mini allocation table and the root stream together
    /// so that the returned block has both a table entry and physical storage.
    pub(crate) fn allocate_small_block(&mut self) -> Result<u32, DocfileError<E>> {
        let depot = BlockChainStream::small_depot();
        let mut index = 0u32;

        loop {
            let mut buffer = [0u8; 4];

            if depot.read_at(self, index as u64 * 4, &mut buffer)? == buffer.len() {
                if LittleEndian::read_u32(&buffer) == BLOCK_UNUSED {
                    break;
                }

                index += 1;
            } else {
                self.grow_small_block_depot()?;
            }
        }

        let big_block_size = self.big_block_size();
        let per_big_block = (big_block_size / self.small_block_size()) as u32;

        if index % per_big_block == 0 {
            let required = (index / per_big_block + 1) as u64 * big_block_size;
            let root_index = self.root_entry_index();
            let root_size = self.entry(root_index)?.size as u64;

            if root_size < required {
                let new_size = root_size + big_block_size;
                let mut root_stream = self.root_stream();
                root_stream.set_size(self, new_size)?;

                let mut root = self.entry(root_index)?;
                root.size = new_size as u32;
                self.write_entry(root_index, &root)?;
            }
        }

        return Ok(index);
    }

    /// Appends one big block of free entries to the mini allocation table.
    /// The first time around this also starts the root stream.
    fn grow_small_block_depot(&mut self) -> Result<(), DocfileError<E>> {
        let depot = BlockChainStream::small_depot();
        let count = depot.count(self)?;

        let mut last = BLOCK_END_OF_CHAIN;
        let mut next = self.header.small_block_depot_start;
        while next != BLOCK_END_OF_CHAIN {
            last = next;
            next = self.next_block_in_chain(last)?;
        }

        let block = self.allocate_big_block()?;

        if last != BLOCK_END_OF_CHAIN {
            self.set_next_block_in_chain(last, block)?;
        }

        self.set_next_block_in_chain(block, BLOCK_END_OF_CHAIN)?;
        self.blocks.map_block_mut(block, |data| {
            for byte in data.iter_mut() {
                *byte = 0xff;
            }
        })?;

        log::debug!("Mini allocation table grown to {} blocks", count + 1);

        if count == 0 {
            self.header.small_block_depot_start = block;
            self.save_header()?;

            let start = self.allocate_big_block()?;
            self.set_next_block_in_chain(start, BLOCK_END_OF_CHAIN)?;

            let root_index = self.root_entry_index();
            let mut root = self.entry(root_index)?;
            root.start_block = start;
            root.size = self.big_block_size() as u32;
            self.write_entry(root_index, &root)?;

            log::debug!("Root stream started at block {}", start);
        }

        return Ok(());
    }

    /// Moves the content of a small-block chain to a new big-block chain and points the owning record at it.
    pub(crate) fn small_blocks_to_big_blocks(
        &mut self,
        small: &SmallBlockChainStream,
    ) -> Result<BlockChainStream, DocfileError<E>> {
        let size = small.size(self)?;
        let mut big = BlockChainStream::detached();
        big.set_size(self, size)?;

        let small_block_size = self.small_block_size() as usize;
        let mut buffer = vec![0u8; small_block_size];
        let mut offset = 0u64;

        loop {
            let read = small.read_at(self, offset, &mut buffer)?;
            let written = big.write_at(self, offset, &buffer[..read])?;

            if read < small_block_size || written < read {
                break;
            }

            offset += small_block_size as u64;
        }

        small.set_size(self, 0)?;

        let head = big.head_of_chain(self)?;
        let mut entry = self.entry(small.owner())?;
        entry.start_block = head;
        self.write_entry(small.owner(), &entry)?;

        log::debug!(
            "Stream {} moved to big blocks ({} bytes)",
            small.owner(),
            size
        );

        return Ok(BlockChainStream::for_entry(small.owner()));
    }
}

/// A read/write/resize view over a chain of small blocks owned by a directory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SmallBlockChainStream {
    owner: u32,
}

impl SmallBlockChainStream {
    pub fn new(owner: u32) -> Self {
        return Self { owner };
    }

    #[inline]
    pub fn owner(&self) -> u32 {
        return self.owner;
    }

    fn head_of_chain<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
    ) -> Result<u32, DocfileError<E>> {
        return Ok(match file.read_entry(self.owner)? {
            Some(entry) => entry.start_block,
            None => BLOCK_END_OF_CHAIN,
        });
    }

    fn set_head_of_chain<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        block: u32,
    ) -> Result<(), DocfileError<E>> {
        let mut entry = file.entry(self.owner)?;
        entry.start_block = block;

        return file.write_entry(self.owner, &entry);
    }

    pub fn count<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
    ) -> Result<u32, DocfileError<E>> {
        let mut count = 0;
        let mut block = self.head_of_chain(file)?;

        while block != BLOCK_END_OF_CHAIN {
            count += 1;
            block = file.next_small_block(block)?;
        }

        return Ok(count);
    }

    #[inline]
    pub fn size<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
    ) -> Result<u64, DocfileError<E>> {
        return Ok(file.entry(self.owner)?.size as u64);
    }

    fn block_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        skip: u64,
    ) -> Result<u32, DocfileError<E>> {
        let mut block = self.head_of_chain(file)?;
        let mut skip = skip;

        while skip > 0 && block != BLOCK_END_OF_CHAIN {
            block = file.next_small_block(block)?;
            skip -= 1;
        }

        return Ok(block);
    }

    pub fn read_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        offset: u64,
        buffer: &mut [u8],
    ) -> Result<usize, DocfileError<E>> {
        let small_block_size = file.small_block_size();
        let root_stream = file.root_stream();
        let mut offset_in_block = offset % small_block_size;
        let mut block = self.block_at(file, offset / small_block_size)?;
        let mut read = 0;

        while read < buffer.len() && block != BLOCK_END_OF_CHAIN {
            let amount = min(
                (small_block_size - offset_in_block) as usize,
                buffer.len() - read,
            );
            let location = block as u64 * small_block_size + offset_in_block;

            if root_stream.read_at(file, location, &mut buffer[read..read + amount])? < amount {
                return Err(DocfileError::CorruptedFile);
            }

            block = file.next_small_block(block)?;
            read += amount;
            offset_in_block = 0;
        }

        return Ok(read);
    }

    pub fn write_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        offset: u64,
        buffer: &[u8],
    ) -> Result<usize, DocfileError<E>> {
        let small_block_size = file.small_block_size();
        let root_stream = file.root_stream();
        let mut offset_in_block = offset % small_block_size;
        let mut block = self.block_at(file, offset / small_block_size)?;
        let mut written = 0;

        while written < buffer.len() && block != BLOCK_END_OF_CHAIN {
            let amount = min(
                (small_block_size - offset_in_block) as usize,
                buffer.len() - written,
            );
            let location = block as u64 * small_block_size + offset_in_block;

            if root_stream.write_at(file, location, &buffer[written..written + amount])? < amount {
                return Err(DocfileError::CorruptedFile);
            }

            block = file.next_small_block(block)?;
            written += amount;
            offset_in_block = 0;
        }

        return Ok(written);
    }

    fn shrink<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        new_size: u64,
    ) -> Result<(), DocfileError<E>> {
        let small_block_size = file.small_block_size();
        let keep = (new_size + small_block_size - 1) / small_block_size;
        let head = self.head_of_chain(file)?;

        if head == BLOCK_END_OF_CHAIN {
            return Ok(());
        }

        let mut extra = if keep == 0 {
            self.set_head_of_chain(file, BLOCK_END_OF_CHAIN)?;
            head
        } else {
            let last = self.block_at(file, keep - 1)?;

            if last == BLOCK_END_OF_CHAIN {
                return Ok(());
            }

            let extra = file.next_small_block(last)?;
            file.set_next_small_block(last, BLOCK_END_OF_CHAIN)?;
            extra
        };

        while extra != BLOCK_END_OF_CHAIN {
            let next = file.next_small_block(extra)?;
            file.free_small_block(extra)?;
            extra = next;
        }

        return Ok(());
    }

    fn enlarge<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        new_size: u64,
    ) -> Result<(), DocfileError<E>> {
        let small_block_size = file.small_block_size();
        let wanted = (new_size + small_block_size - 1) / small_block_size;
        let mut head = self.head_of_chain(file)?;

        if head == BLOCK_END_OF_CHAIN {
            head = file.allocate_small_block()?;
            file.set_next_small_block(head, BLOCK_END_OF_CHAIN)?;
            self.set_head_of_chain(file, head)?;
        }

        let mut count = 1;
        let mut last = head;
        let mut next = file.next_small_block(last)?;

        while next != BLOCK_END_OF_CHAIN {
            last = next;
            next = file.next_small_block(last)?;
            count += 1;
        }

        while count < wanted {
            let block = file.allocate_small_block()?;
            file.set_next_small_block(last, block)?;
            file.set_next_small_block(block, BLOCK_END_OF_CHAIN)?;
            last = block;
            count += 1;
        }

        return Ok(());
    }

    /// Resizes the chain. Updating the record's size is left to the caller.
    pub fn set_size<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        new_size: u64,
    ) -> Result<(), DocfileError<E>> {
        let size = self.size(file)?;

        if new_size == size {
            return Ok(());
        }

        if new_size < size {
            return self.shrink(file, new_size);
        }

        return self.enlarge(file, new_size);
    }
}
