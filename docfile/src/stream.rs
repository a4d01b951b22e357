use crate::disk::StreamChain;
use crate::stat::{StatFlag, StatInfo};
use crate::storage::Storage;
use crate::{DocfileError, DocfileErrorConvertible};
use alloc::vec;
use alloc::vec::Vec;
use core::cmp::min;

const COPY_BUFFER_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    Start(u64),
    End(i64),
    Current(i64),
}

/// A handle to a stream with its own seek position. Keeps its storage alive.
pub struct Stream<E: DocfileErrorConvertible> {
    storage: Storage<E>,
    index: u32,
    position: u64,
    chain: StreamChain,
}

impl<E: DocfileErrorConvertible> Stream<E> {
    pub(crate) fn new(storage: Storage<E>, index: u32, chain: StreamChain) -> Self {
        return Self {
            storage,
            index,
            position: 0,
            chain,
        };
    }

    #[inline]
    pub fn position(&self) -> u64 {
        return self.position;
    }

    pub fn size(&self) -> Result<u64, DocfileError<E>> {
        return Ok(self.storage.file.borrow_mut().entry(self.index)?.size as u64);
    }

    /// Reads from the current position, stopping at the end of the stream.
    pub fn read(&mut self, buffer: &mut [u8]) -> Result<usize, DocfileError<E>> {
        let mut file = self.storage.file.borrow_mut();
        let size = file.entry(self.index)?.size as u64;
        self.chain.sync(&*file, self.index, size);

        if self.position >= size || buffer.is_empty() {
            return Ok(0);
        }

        let amount = min(buffer.len() as u64, size - self.position) as usize;
        let read = self
            .chain
            .read_at(&mut file, self.position, &mut buffer[..amount])?;

        self.position += read as u64;

        return Ok(read);
    }

    /// Everything from the current position to the end.
    pub fn read_to_end(&mut self) -> Result<Vec<u8>, DocfileError<E>> {
        let size = self.size()?;

        if self.position >= size {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0u8; (size - self.position) as usize];
        let read = self.read(&mut buffer)?;
        buffer.truncate(read);

        return Ok(buffer);
    }

    /// Writes at the current position, growing the stream if needed.
    pub fn write(&mut self, buffer: &[u8]) -> Result<usize, DocfileError<E>> {
        let mut file = self.storage.file.borrow_mut();

        if !file.is_writable() {
            return Err(DocfileError::AccessDenied);
        }

        if buffer.is_empty() {
            return Ok(0);
        }

        let end = match self.position.checked_add(buffer.len() as u64) {
            Some(end) if end <= u32::MAX as u64 => end,
            _ => return Err(DocfileError::InvalidArgument),
        };
        let size = file.entry(self.index)?.size as u64;
        self.chain.sync(&*file, self.index, size);

        if end > size {
            self.chain.set_size(&mut file, self.index, end)?;
        }

        let written = self.chain.write_at(&mut file, self.position, buffer)?;
        self.position += written as u64;

        return Ok(written);
    }

    pub fn seek(&mut self, position: SeekFrom) -> Result<u64, DocfileError<E>> {
        let target = match position {
            SeekFrom::Start(offset) => offset as i128,
            SeekFrom::Current(offset) => self.position as i128 + offset as i128,
            SeekFrom::End(offset) => self.size()? as i128 + offset as i128,
        };

        if target < 0 || target > u64::MAX as i128 {
            return Err(DocfileError::InvalidFunction);
        }

        self.position = target as u64;

        return Ok(self.position);
    }

    /// Sets the stream's size. The position is left alone.
    pub fn set_size(&mut self, size: u64) -> Result<(), DocfileError<E>> {
        let mut file = self.storage.file.borrow_mut();

        if !file.is_writable() {
            return Err(DocfileError::AccessDenied);
        }

        let current = file.entry(self.index)?.size as u64;
        self.chain.sync(&*file, self.index, current);

        return self.chain.set_size(&mut file, self.index, size);
    }

    pub fn stat(&self, flag: StatFlag) -> Result<StatInfo, DocfileError<E>> {
        let entry = self.storage.file.borrow_mut().entry(self.index)?;

        return Ok(StatInfo::from_entry(&entry, flag));
    }

    /// Copies up to `count` bytes from this stream's position to `destination`'s position.
    /// Returns the bytes read and written.
    pub fn copy_to(
        &mut self,
        destination: &mut Stream<E>,
        count: u64,
    ) -> Result<(u64, u64), DocfileError<E>> {
        let mut buffer = vec![0u8; COPY_BUFFER_SIZE];
        let mut total_read = 0u64;
        let mut total_written = 0u64;

        while total_read < count {
            let amount = min(COPY_BUFFER_SIZE as u64, count - total_read) as usize;
            let read = self.read(&mut buffer[..amount])?;

            if read == 0 {
                break;
            }

            total_read += read as u64;
            total_written += destination.write(&buffer[..read])? as u64;
        }

        return Ok((total_read, total_written));
    }

    /// Writes go straight to the file, so there is nothing to commit.
    pub fn commit(&self) -> Result<(), DocfileError<E>> {
        return Ok(());
    }

    pub fn revert(&self) -> Result<(), DocfileError<E>> {
        return Ok(());
    }
}
