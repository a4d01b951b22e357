use super::{CompoundFile, BLOCK_END_OF_CHAIN};
use crate::{DocfileError, DocfileErrorConvertible};
use core::cmp::min;

/// Where the first block of a chain is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ChainHead {
    /// The start block of a directory record.
    Entry(u32),
    /// The header's directory start block.
    Directory,
    /// The header's mini allocation table start block.
    SmallDepot,
    /// A head kept in the view itself.
    Detached(u32),
}

/// A read/write/resize view over a chain of big blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockChainStream {
    head: ChainHead,
}

impl BlockChainStream {
    pub fn for_entry(index: u32) -> Self {
        return Self {
            head: ChainHead::Entry(index),
        };
    }

    pub fn directory() -> Self {
        return Self {
            head: ChainHead::Directory,
        };
    }

    pub fn small_depot() -> Self {
        return Self {
            head: ChainHead::SmallDepot,
        };
    }

    /// An empty chain not yet attached to anything.
    pub fn detached() -> Self {
        return Self {
            head: ChainHead::Detached(BLOCK_END_OF_CHAIN),
        };
    }

    pub fn head_of_chain<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
    ) -> Result<u32, DocfileError<E>> {
        return match self.head {
            ChainHead::Entry(index) => Ok(match file.read_entry(index)? {
                Some(entry) => entry.start_block,
                None => BLOCK_END_OF_CHAIN,
            }),
            ChainHead::Directory => Ok(file.header.root_start_block),
            ChainHead::SmallDepot => Ok(file.header.small_block_depot_start),
            ChainHead::Detached(block) => Ok(block),
        };
    }

    fn set_head_of_chain<E: DocfileErrorConvertible>(
        &mut self,
        file: &mut CompoundFile<E>,
        block: u32,
    ) -> Result<(), DocfileError<E>> {
        match self.head {
            ChainHead::Entry(index) => {
                let mut entry = file.entry(index)?;
                entry.start_block = block;
                file.write_entry(index, &entry)?;
            }
            ChainHead::Directory => {
                file.header.root_start_block = block;
                file.save_header()?;
            }
            ChainHead::SmallDepot => {
                file.header.small_block_depot_start = block;
                file.save_header()?;
            }
            ChainHead::Detached(_) => self.head = ChainHead::Detached(block),
        }

        return Ok(());
    }

    /// Number of blocks in the chain.
    pub fn count<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
    ) -> Result<u32, DocfileError<E>> {
        let mut count = 0;
        let mut block = self.head_of_chain(file)?;

        while block != BLOCK_END_OF_CHAIN {
            count += 1;
            block = file.next_block_in_chain(block)?;
        }

        return Ok(count);
    }

    /// Entry-owned chains report the record's size, others their block count times the block size.
    pub fn size<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
    ) -> Result<u64, DocfileError<E>> {
        return match self.head {
            ChainHead::Entry(index) => Ok(file.entry(index)?.size as u64),
            _ => Ok(self.count(file)? as u64 * file.big_block_size()),
        };
    }

    /// Walks `skip` links from the head. End of chain if the chain is shorter.
    fn block_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        skip: u64,
    ) -> Result<u32, DocfileError<E>> {
        let mut block = self.head_of_chain(file)?;
        let mut skip = skip;

        while skip > 0 && block != BLOCK_END_OF_CHAIN {
            block = file.next_block_in_chain(block)?;
            skip -= 1;
        }

        return Ok(block);
    }

    /// Copies from the chain into `buffer`. Returns the number of bytes read, short if the chain ends.
    pub fn read_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        offset: u64,
        buffer: &mut [u8],
    ) -> Result<usize, DocfileError<E>> {
        let block_size = file.big_block_size();
        let mut offset_in_block = (offset % block_size) as usize;
        let mut block = self.block_at(file, offset / block_size)?;
        let mut read = 0;

        while read < buffer.len() && block != BLOCK_END_OF_CHAIN {
            let amount = min(block_size as usize - offset_in_block, buffer.len() - read);
            let destination = &mut buffer[read..read + amount];

            file.blocks.map_block(block, |data| {
                destination.copy_from_slice(&data[offset_in_block..offset_in_block + amount]);
            })?;

            block = file.next_block_in_chain(block)?;
            read += amount;
            offset_in_block = 0;
        }

        return Ok(read);
    }

    /// Copies `buffer` into the chain. Returns the number of bytes written, short if the chain ends.
    pub fn write_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        offset: u64,
        buffer: &[u8],
    ) -> Result<usize, DocfileError<E>> {
        let block_size = file.big_block_size();
        let mut offset_in_block = (offset % block_size) as usize;
        let mut block = self.block_at(file, offset / block_size)?;
        let mut written = 0;

        while written < buffer.len() && block != BLOCK_END_OF_CHAIN {
            let amount = min(block_size as usize - offset_in_block, buffer.len() - written);
            let source = &buffer[written..written + amount];

            file.blocks.map_block_mut(block, |data| {
                data[offset_in_block..offset_in_block + amount].copy_from_slice(source);
            })?;

            block = file.next_block_in_chain(block)?;
            written += amount;
            offset_in_block = 0;
        }

        return Ok(written);
    }

    /// Cuts the chain after the blocks needed for `new_size`. The file keeps its length.
    fn shrink<E: DocfileErrorConvertible>(
        &mut self,
        file: &mut CompoundFile<E>,
        new_size: u64,
    ) -> Result<(), DocfileError<E>> {
        let block_size = file.big_block_size();
        let keep = (new_size + block_size - 1) / block_size;
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

            let extra = file.next_block_in_chain(last)?;
            file.set_next_block_in_chain(last, BLOCK_END_OF_CHAIN)?;
            extra
        };

        while extra != BLOCK_END_OF_CHAIN {
            let next = file.next_block_in_chain(extra)?;
            file.free_big_block(extra)?;
            extra = next;
        }

        return Ok(());
    }

    /// Appends blocks until the chain can hold `new_size` bytes.
    fn enlarge<E: DocfileErrorConvertible>(
        &mut self,
        file: &mut CompoundFile<E>,
        new_size: u64,
    ) -> Result<(), DocfileError<E>> {
        let block_size = file.big_block_size();
        let wanted = (new_size + block_size - 1) / block_size;
        let mut head = self.head_of_chain(file)?;

        if head == BLOCK_END_OF_CHAIN {
            head = file.allocate_big_block()?;
            file.set_next_block_in_chain(head, BLOCK_END_OF_CHAIN)?;
            self.set_head_of_chain(file, head)?;
        }

        let mut count = 1;
        let mut last = head;
        let mut next = file.next_block_in_chain(last)?;

        while next != BLOCK_END_OF_CHAIN {
            last = next;
            next = file.next_block_in_chain(last)?;
            count += 1;
        }

        while count < wanted {
            let block = file.allocate_big_block()?;
            file.set_next_block_in_chain(last, block)?;
            file.set_next_block_in_chain(block, BLOCK_END_OF_CHAIN)?;
            last = block;
            count += 1;
        }

        return Ok(());
    }

    /// Resizes the chain. Entry-owned chains leave updating the record's size to the caller.
    pub fn set_size<E: DocfileErrorConvertible>(
        &mut self,
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

        let block_size = file.big_block_size();
        let mut diff = new_size - size;

        if diff % block_size != 0 {
            diff += block_size - diff % block_size;
        }

        let file_size = file.file_size()?;
        file.blocks.set_size(file_size + diff)?;

        return self.enlarge(file, new_size);
    }
}
