use super::compound_file::{CompoundFile, DepotCache};
use super::disk_blocks::COUNT_DEPOT_IN_HEADER;
use super::{
    BLOCK_END_OF_CHAIN, BLOCK_EXT_DEPOT, BLOCK_SPECIAL, BLOCK_UNUSED, MAX_BLOCK_INDEX,
};
use crate::{DocfileError, DocfileErrorConvertible};
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};

// The big-block allocation table. Each table block holds block_size / 4 "next" entries.
// Table blocks 0..109 are listed in the header, the rest in a chain of extended blocks
// whose last entry links to the next extended block.

impl<E: DocfileErrorConvertible> CompoundFile<E> {
    #[inline]
    pub(crate) fn blocks_per_depot(&self) -> u32 {
        return (self.big_block_size() / 4) as u32;
    }

    /// Table entries an extended block can hold, the link entry excluded.
    #[inline]
    fn depots_per_ext_block(&self) -> u32 {
        return self.blocks_per_depot() - 1;
    }

    /// Finds the block holding allocation-table block number `depot_index`.
    fn depot_block_location(&mut self, depot_index: u32) -> Result<u32, DocfileError<E>> {
        let location = if (depot_index as usize) < COUNT_DEPOT_IN_HEADER {
            self.header.big_block_depot_start[depot_index as usize]
        } else {
            self.ext_depot_block(depot_index)?
        };

        if location > MAX_BLOCK_INDEX {
            return Err(DocfileError::CorruptedFile);
        }

        return Ok(location);
    }

    pub(crate) fn next_block_in_chain(&mut self, index: u32) -> Result<u32, DocfileError<E>> {
        let per_depot = self.blocks_per_depot();
        let depot_index = index / per_depot;
        let offset = (index % per_depot) as usize;

        if depot_index >= self.header.big_block_depot_count {
            return Err(DocfileError::CorruptedFile);
        }

        let cached = match &self.depot_cache {
            Some(cache) => cache.depot_index == depot_index,
            None => false,
        };

        if !cached {
            let location = self.depot_block_location(depot_index)?;
            let entries = self.blocks.map_block(location, |block| {
                block
                    .chunks_exact(4)
                    .map(LittleEndian::read_u32)
                    .collect::<Vec<u32>>()
            })?;

            self.depot_cache = Some(DepotCache {
                depot_index,
                entries,
            });
        }

        return match &self.depot_cache {
            Some(cache) => Ok(cache.entries[offset]),
            None => Err(DocfileError::CorruptedFile),
        };
    }

    pub(crate) fn set_next_block_in_chain(
        &mut self,
        index: u32,
        next: u32,
    ) -> Result<(), DocfileError<E>> {
        let per_depot = self.blocks_per_depot();
        let depot_index = index / per_depot;
        let offset = (index % per_depot) as usize;

        if depot_index >= self.header.big_block_depot_count {
            return Err(DocfileError::CorruptedFile);
        }

        let location = self.depot_block_location(depot_index)?;
        self.blocks.map_block_mut(location, |block| {
            LittleEndian::write_u32(&mut block[offset * 4..], next);
        })?;

        if let Some(cache) = &mut self.depot_cache {
            if cache.depot_index == depot_index {
                cache.entries[offset] = next;
            }
        }

        return Ok(());
    }

    #[inline]
    pub(crate) fn free_big_block(&mut self, index: u32) -> Result<(), DocfileError<E>> {
        return self.set_next_block_in_chain(index, BLOCK_UNUSED);
    }

    fn next_extended_block(&mut self, ext_block: u32) -> Result<u32, DocfileError<E>> {
        let offset = (self.depots_per_ext_block() * 4) as usize;

        return self
            .blocks
            .map_block(ext_block, |block| LittleEndian::read_u32(&block[offset..]));
    }

    /// Walks the extended chain to the block listing `depot_index`. Unused if it is not listed yet.
    fn ext_depot_block(&mut self, depot_index: u32) -> Result<u32, DocfileError<E>> {
        let per_ext = self.depots_per_ext_block();
        let ext_index = depot_index - COUNT_DEPOT_IN_HEADER as u32;
        let ext_block_count = ext_index / per_ext;
        let ext_offset = (ext_index % per_ext) as usize;

        if ext_block_count >= self.header.ext_big_block_depot_count
            || self.header.ext_big_block_depot_start == BLOCK_END_OF_CHAIN
        {
            return Ok(BLOCK_UNUSED);
        }

        let mut ext_block = self.header.ext_big_block_depot_start;
        for _ in 0..ext_block_count {
            ext_block = self.next_extended_block(ext_block)?;

            if ext_block > MAX_BLOCK_INDEX {
                return Ok(BLOCK_UNUSED);
            }
        }

        return self
            .blocks
            .map_block(ext_block, |block| LittleEndian::read_u32(&block[ext_offset * 4..]));
    }

    fn set_ext_depot_block(
        &mut self,
        depot_index: u32,
        location: u32,
    ) -> Result<(), DocfileError<E>> {
        let per_ext = self.depots_per_ext_block();
        let ext_index = depot_index - COUNT_DEPOT_IN_HEADER as u32;
        let ext_block_count = ext_index / per_ext;
        let ext_offset = (ext_index % per_ext) as usize;

        let mut ext_block = self.header.ext_big_block_depot_start;
        for _ in 0..ext_block_count {
            ext_block = self.next_extended_block(ext_block)?;
        }

        if ext_block > MAX_BLOCK_INDEX {
            return Err(DocfileError::CorruptedFile);
        }

        self.blocks.map_block_mut(ext_block, |block| {
            LittleEndian::write_u32(&mut block[ext_offset * 4..], location);
        })?;

        return Ok(());
    }

    /// Appends an extended block and links it from the previous one or the header.
    fn add_ext_block_depot(&mut self) -> Result<u32, DocfileError<E>> {
        let ext_count = self.header.ext_big_block_depot_count;
        let per_depot = self.blocks_per_depot();
        let index =
            (COUNT_DEPOT_IN_HEADER as u32 + ext_count * self.depots_per_ext_block()) * per_depot;

        if ext_count == 0 {
            self.header.ext_big_block_depot_start = index;
        } else {
            let mut last = self.header.ext_big_block_depot_start;
            for _ in 0..ext_count - 1 {
                last = self.next_extended_block(last)?;
            }

            let link_offset = (self.depots_per_ext_block() * 4) as usize;
            self.blocks.map_block_mut(last, |block| {
                LittleEndian::write_u32(&mut block[link_offset..], index);
            })?;
        }

        self.blocks.map_block_mut(index, |block| {
            for byte in block.iter_mut() {
                *byte = 0xff;
            }
        })?;

        self.header.ext_big_block_depot_count += 1;

        log::debug!("Added extended allocation block at {}", index);

        return Ok(index);
    }

    /// Writes an empty allocation-table block.
    fn add_block_depot(&mut self, index: u32) -> Result<(), DocfileError<E>> {
        return self.blocks.map_block_mut(index, |block| {
            for byte in block.iter_mut() {
                *byte = 0xff;
            }
        });
    }

    /// First-fit scan of the allocation table, growing it when every entry is taken.
    /// The backing file is extended to cover the returned block.
    pub(crate) fn allocate_big_block(&mut self) -> Result<u32, DocfileError<E>> {
        let per_depot = self.blocks_per_depot();
        let mut depot_index = 0u32;

        loop {
            let mut location = if (depot_index as usize) < COUNT_DEPOT_IN_HEADER {
                self.header.big_block_depot_start[depot_index as usize]
            } else {
                self.ext_depot_block(depot_index)?
            };

            if location == BLOCK_UNUSED {
                location = self.grow_depot(depot_index)?;
            }

            let free = self.blocks.map_block(location, |block| {
                block
                    .chunks_exact(4)
                    .position(|entry| LittleEndian::read_u32(entry) == BLOCK_UNUSED)
            })?;

            if let Some(position) = free {
                let index = depot_index as u64 * per_depot as u64 + position as u64;

                if index > MAX_BLOCK_INDEX as u64 {
                    return Err(DocfileError::InsufficientMemory);
                }

                self.blocks.ensure_block(index as u32)?;

                return Ok(index as u32);
            }

            depot_index += 1;
        }
    }

    /// Adds allocation-table block number `depot_index` and returns where it was placed.
    fn grow_depot(&mut self, depot_index: u32) -> Result<u32, DocfileError<E>> {
        let per_depot = self.blocks_per_depot();

        if (depot_index as usize) < COUNT_DEPOT_IN_HEADER {
            let location = depot_index * per_depot;

            self.add_block_depot(location)?;
            self.header.big_block_depot_count += 1;
            self.header.big_block_depot_start[depot_index as usize] = location;
            self.set_next_block_in_chain(location, BLOCK_SPECIAL)?;
            self.save_header()?;

            log::debug!("Added allocation block {} at {}", depot_index, location);

            return Ok(location);
        }

        let ext_index = depot_index - COUNT_DEPOT_IN_HEADER as u32;
        let mut ext_block = None;

        let location = if ext_index % self.depots_per_ext_block() == 0 {
            let index = self.add_ext_block_depot()?;
            ext_block = Some(index);
            index + 1
        } else {
            depot_index * per_depot
        };

        self.add_block_depot(location)?;
        self.header.big_block_depot_count += 1;
        self.set_ext_depot_block(depot_index, location)?;
        self.set_next_block_in_chain(location, BLOCK_SPECIAL)?;

        if let Some(index) = ext_block {
            self.set_next_block_in_chain(index, BLOCK_EXT_DEPOT)?;
        }

        self.save_header()?;

        log::debug!("Added extended allocation block {} at {}", depot_index, location);

        return Ok(location);
    }
}
