use crate::DocfileErrorConvertible;
use alloc::vec::Vec;

/// Implementors can define an error struct if they wish but they must implement methods to read and write from a growable file or buffer.
/// Locations and sizes are all in bytes.
pub trait DiskHandler<E: DocfileErrorConvertible> {
    /// Write a slice of bytes to a location. The engine never writes past the size it last set.
    fn write_bytes(&mut self, bytes: &[u8], location: u64) -> Result<(), E>;

    /// Read an amount of bytes from a location. If the resulting vector is not equal to the amount requested the engine reports a corrupted file.
    fn read_bytes(&self, location: u64, amount: u64) -> Result<Vec<u8>, E>;

    /// This should return the current size of the backing file.
    fn disk_size(&self) -> Result<u64, E>;

    /// Grow or truncate the backing file. New bytes must read back as zero.
    fn set_disk_size(&mut self, size: u64) -> Result<(), E>;

    /// Push buffered writes to the backing medium.
    fn flush(&mut self) -> Result<(), E> {
        return Ok(());
    }
}
