use super::disk_blocks::DIR_ENTRY_SIZE;
use super::{BlockChainStream, CompoundFile, BLOCK_UNUSED};
use crate::{DocfileError, DocfileErrorConvertible};

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DiskInfo {
    big_block_size: u64,
    small_block_size: u64,
    depot_block_count: u64,
    ext_depot_block_count: u64,
    big_block_count: u64,
    free_big_block_count: u64,
    small_block_count: u64,
    free_small_block_count: u64,
    entry_count: u64,
    free_entry_count: u64,
}

impl DiskInfo {
    /// Scans the allocation tables and the directory. Linear in the size of the file.
    pub(crate) fn from_file<E: DocfileErrorConvertible>(
        file: &mut CompoundFile<E>,
    ) -> Result<Self, DocfileError<E>> {
        let big_block_size = file.big_block_size();
        let small_block_size = file.small_block_size();

        // The header block is not part of the allocation table.
        let big_block_count = file.file_size()? / big_block_size - 1;
        let covered = file.header().big_block_depot_count as u64 * file.blocks_per_depot() as u64;

        let mut free_big_block_count = 0;
        for index in 0..core::cmp::min(big_block_count, covered) {
            if file.next_block_in_chain(index as u32)? == BLOCK_UNUSED {
                free_big_block_count += 1;
            }
        }

        let root_index = file.root_entry_index();
        let small_block_count = file.entry(root_index)?.size as u64 / small_block_size;

        let mut free_small_block_count = 0;
        for index in 0..small_block_count {
            if file.next_small_block(index as u32)? == BLOCK_UNUSED {
                free_small_block_count += 1;
            }
        }

        let directory = BlockChainStream::directory();
        let entry_count = directory.count(file)? as u64 * big_block_size / DIR_ENTRY_SIZE;

        let mut free_entry_count = 0;
        for index in 0..entry_count {
            if file.entry(index as u32)?.is_free() {
                free_entry_count += 1;
            }
        }

        return Ok(Self {
            big_block_size,
            small_block_size,
            depot_block_count: file.header().big_block_depot_count as u64,
            ext_depot_block_count: file.header().ext_big_block_depot_count as u64,
            big_block_count,
            free_big_block_count,
            small_block_count,
            free_small_block_count,
            entry_count,
            free_entry_count,
        });
    }

    #[inline]
    pub fn big_block_size(&self) -> u64 {
        return self.big_block_size;
    }

    #[inline]
    pub fn small_block_size(&self) -> u64 {
        return self.small_block_size;
    }

    #[inline]
    pub fn depot_block_count(&self) -> u64 {
        return self.depot_block_count;
    }

    #[inline]
    pub fn ext_depot_block_count(&self) -> u64 {
        return self.ext_depot_block_count;
    }

    /// Big blocks present in the file, the header excluded.
    #[inline]
    pub fn big_block_count(&self) -> u64 {
        return self.big_block_count;
    }

    #[inline]
    pub fn free_big_block_count(&self) -> u64 {
        return self.free_big_block_count;
    }

    /// Small blocks backed by the root stream.
    #[inline]
    pub fn small_block_count(&self) -> u64 {
        return self.small_block_count;
    }

    #[inline]
    pub fn free_small_block_count(&self) -> u64 {
        return self.free_small_block_count;
    }

    #[inline]
    pub fn entry_count(&self) -> u64 {
        return self.entry_count;
    }

    #[inline]
    pub fn free_entry_count(&self) -> u64 {
        return self.free_entry_count;
    }

    #[inline]
    pub fn free_space(&self) -> u64 {
        return self.free_big_block_count * self.big_block_size
            + self.free_small_block_count * self.small_block_size;
    }
}
