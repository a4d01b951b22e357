use super::DiskHandler;
use crate::{DocfileError, DocfileErrorConvertible};
use alloc::boxed::Box;
use alloc::vec::Vec;

/// The header occupies the block before block 0.
pub const HEADER_BLOCK: i64 = -1;

macro_rules! unwrap_disk_error {
    ($v:expr) => {
        match $v {
            Ok(val) => val,
            Err(e) => return Err(e.into_docfile_error()),
        }
    };
}

/// Maps big-block indices onto byte ranges of the backing file.
pub struct BlockFile<E: DocfileErrorConvertible> {
    handler: Box<dyn DiskHandler<E>>,
    block_size: u64,
}

impl<E: DocfileErrorConvertible> BlockFile<E> {
    pub fn new(handler: Box<dyn DiskHandler<E>>, block_size: u64) -> Self {
        return Self {
            handler,
            block_size,
        };
    }

    #[inline]
    pub fn block_size(&self) -> u64 {
        return self.block_size;
    }

    pub fn set_block_size(&mut self, block_size: u64) {
        self.block_size = block_size;
    }

    /// Byte offset of a block. Block -1 is the header.
    #[inline]
    pub fn location(&self, index: i64) -> u64 {
        return ((index + 1) as u64) * self.block_size;
    }

    pub fn size(&self) -> Result<u64, DocfileError<E>> {
        return Ok(unwrap_disk_error!(self.handler.disk_size()));
    }

    /// Resizes the backing file, rounding up to a whole number of blocks.
    pub fn set_size(&mut self, size: u64) -> Result<(), DocfileError<E>> {
        let mut size = size;

        if size % self.block_size != 0 {
            size += self.block_size - size % self.block_size;
        }

        if size != self.size()? {
            unwrap_disk_error!(self.handler.set_disk_size(size));
        }

        return Ok(());
    }

    /// Grows the file so that the block at `index` exists.
    pub fn ensure_block(&mut self, index: u32) -> Result<(), DocfileError<E>> {
        let end = self.location(index as i64) + self.block_size;

        if self.size()? < end {
            self.set_size(end)?;
        }

        return Ok(());
    }

    /// Reads raw bytes, returning None if the range runs past the end of the file.
    pub fn read_bytes(
        &self,
        location: u64,
        amount: u64,
    ) -> Result<Option<Vec<u8>>, DocfileError<E>> {
        if location + amount > self.size()? {
            return Ok(None);
        }

        let bytes = unwrap_disk_error!(self.handler.read_bytes(location, amount));

        if bytes.len() as u64 != amount {
            return Err(DocfileError::CorruptedFile);
        }

        return Ok(Some(bytes));
    }

    pub fn write_bytes(&mut self, bytes: &[u8], location: u64) -> Result<(), DocfileError<E>> {
        let end = location + bytes.len() as u64;

        if self.size()? < end {
            self.set_size(end)?;
        }

        unwrap_disk_error!(self.handler.write_bytes(bytes, location));

        return Ok(());
    }

    /// Gives `f` read access to a block. The block must lie inside the file.
    pub fn map_block<V>(
        &self,
        index: u32,
        f: impl FnOnce(&[u8]) -> V,
    ) -> Result<V, DocfileError<E>> {
        let location = self.location(index as i64);

        return match self.read_bytes(location, self.block_size)? {
            Some(block) => Ok(f(&block)),
            None => Err(DocfileError::CorruptedFile),
        };
    }

    /// Gives `f` write access to a block and writes the result back, growing the file if needed.
    pub fn map_block_mut<V>(
        &mut self,
        index: u32,
        f: impl FnOnce(&mut [u8]) -> V,
    ) -> Result<V, DocfileError<E>> {
        self.ensure_block(index)?;

        let location = self.location(index as i64);
        let mut block = match self.read_bytes(location, self.block_size)? {
            Some(block) => block,
            None => return Err(DocfileError::CorruptedFile),
        };

        let result = f(&mut block);
        self.write_bytes(&block, location)?;

        return Ok(result);
    }

    pub fn flush(&mut self) -> Result<(), DocfileError<E>> {
        unwrap_disk_error!(self.handler.flush());

        return Ok(());
    }
}
