use super::small_block_chain::SmallBlockChainStream;
use super::{BlockChainStream, CompoundFile, LIMIT_TO_USE_SMALL_BLOCK};
use crate::{DocfileError, DocfileErrorConvertible};

/// The chain backing a stream record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StreamChain {
    Small(SmallBlockChainStream),
    Big(BlockChainStream),
}

impl StreamChain {
    /// Picks the representation from the record's current size, unless the record was shrunk
    /// while on big blocks during this session.
    pub fn open<E: DocfileErrorConvertible>(
        file: &mut CompoundFile<E>,
        index: u32,
    ) -> Result<Self, DocfileError<E>> {
        let size = file.entry(index)?.size as u64;

        if size < LIMIT_TO_USE_SMALL_BLOCK && !file.is_shrunk_big_stream(index) {
            return Ok(StreamChain::Small(SmallBlockChainStream::new(index)));
        }

        return Ok(StreamChain::Big(BlockChainStream::for_entry(index)));
    }

    /// Follows a promotion done through another handle on the same record.
    pub fn sync<E: DocfileErrorConvertible>(
        &mut self,
        file: &CompoundFile<E>,
        index: u32,
        size: u64,
    ) {
        if let StreamChain::Small(_) = self {
            if size >= LIMIT_TO_USE_SMALL_BLOCK || file.is_shrunk_big_stream(index) {
                *self = StreamChain::Big(BlockChainStream::for_entry(index));
            }
        }
    }

    pub fn read_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        offset: u64,
        buffer: &mut [u8],
    ) -> Result<usize, DocfileError<E>> {
        return match self {
            StreamChain::Small(chain) => chain.read_at(file, offset, buffer),
            StreamChain::Big(chain) => chain.read_at(file, offset, buffer),
        };
    }

    pub fn write_at<E: DocfileErrorConvertible>(
        &self,
        file: &mut CompoundFile<E>,
        offset: u64,
        buffer: &[u8],
    ) -> Result<usize, DocfileError<E>> {
        return match self {
            StreamChain::Small(chain) => chain.write_at(file, offset, buffer),
            StreamChain::Big(chain) => chain.write_at(file, offset, buffer),
        };
    }

    /// Resizes the stream recorded at `index`, moving it to big blocks when it crosses the threshold.
    /// Big-block streams stay big when shrunk.
    pub fn set_size<E: DocfileErrorConvertible>(
        &mut self,
        file: &mut CompoundFile<E>,
        index: u32,
        new_size: u64,
    ) -> Result<(), DocfileError<E>> {
        if new_size > u32::MAX as u64 {
            return Err(DocfileError::InvalidArgument);
        }

        let size = file.entry(index)?.size as u64;

        if size < LIMIT_TO_USE_SMALL_BLOCK && new_size >= LIMIT_TO_USE_SMALL_BLOCK {
            if let StreamChain::Small(small) = self {
                let big = file.small_blocks_to_big_blocks(small)?;
                *self = StreamChain::Big(big);
            }
        }

        match self {
            StreamChain::Small(chain) => chain.set_size(file, new_size)?,
            StreamChain::Big(chain) => {
                chain.set_size(file, new_size)?;
                file.set_shrunk_big_stream(index, new_size < LIMIT_TO_USE_SMALL_BLOCK);
            }
        }

        let mut entry = file.entry(index)?;
        entry.size = new_size as u32;
        file.write_entry(index, &entry)?;

        return Ok(());
    }
}
