use crate::error::ToolError;
use docfile::{
    access_mode, creation_mode, AccessMode, CreationMode, DiskHandler, StorageMode, StorageModes,
};
use std::cell::RefCell;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::PathBuf;

/// A docfile image on the host file system.
pub struct Handler {
    file: RefCell<File>,
    path: PathBuf,
    delete_on_release: bool,
}

impl Handler {
    /// Creates the image file. Create-always truncates an existing file, create-new refuses to touch one.
    pub fn new_create(path: &str, modes: StorageModes) -> Result<Self, ToolError> {
        let mut options = OpenOptions::new();
        options.read(true).write(true);

        match creation_mode(modes) {
            CreationMode::CreateAlways => options.create(true).truncate(true),
            CreationMode::CreateNew => options.create_new(true),
        };

        let file = match options.open(path) {
            Ok(f) => f,
            Err(e) => {
                return Err(ToolError::new(&format!(
                    "Failed to create {}. Error: {}",
                    path, e
                )))
            }
        };

        return Ok(Self {
            file: RefCell::new(file),
            path: PathBuf::from(path),
            delete_on_release: modes.contains(StorageMode::DeleteOnRelease),
        });
    }

    /// Opens an existing image, writable unless the access mode is read.
    pub fn new(path: &str, modes: StorageModes) -> Result<Self, ToolError> {
        let writable = access_mode(modes) != AccessMode::Read;

        let file = match OpenOptions::new().read(true).write(writable).open(path) {
            Ok(f) => f,
            Err(e) => {
                return Err(ToolError::new(&format!(
                    "Failed to open file {}. Error: {}",
                    path, e
                )))
            }
        };

        return Ok(Self {
            file: RefCell::new(file),
            path: PathBuf::from(path),
            delete_on_release: modes.contains(StorageMode::DeleteOnRelease),
        });
    }

    pub fn path(&self) -> &PathBuf {
        return &self.path;
    }

    fn seek(&self, location: u64) -> Result<(), ToolError> {
        return match self.file.borrow_mut().seek(SeekFrom::Start(location)) {
            Ok(_) => Ok(()),
            Err(e) => Err(ToolError::new(&format!(
                "Failed to seek to location: {}. Error: {}",
                location, e
            ))),
        };
    }
}

impl DiskHandler<ToolError> for Handler {
    fn write_bytes(&mut self, bytes: &[u8], location: u64) -> Result<(), ToolError> {
        self.seek(location)?;

        return match self.file.borrow_mut().write_all(bytes) {
            Ok(_) => Ok(()),
            Err(e) => Err(ToolError::new(&format!(
                "Failed to write bytes. Error: {}",
                e
            ))),
        };
    }

    fn read_bytes(&self, location: u64, amount: u64) -> Result<Vec<u8>, ToolError> {
        if self.disk_size()? < location + amount {
            return Err(ToolError::new(&format!(
                "File is not large enough to read address: {}",
                location + amount
            )));
        }

        self.seek(location)?;

        let mut result = vec![0u8; amount as usize];
        match self.file.borrow_mut().read_exact(&mut result) {
            Ok(_) => (),
            Err(e) => {
                return Err(ToolError::new(&format!(
                    "Failed to read bytes. Error: {}",
                    e
                )))
            }
        }

        return Ok(result);
    }

    fn disk_size(&self) -> Result<u64, ToolError> {
        let b = self.file.borrow();
        let metadata = match b.metadata() {
            Ok(m) => m,
            Err(e) => {
                return Err(ToolError::new(&format!(
                    "Could not determine file size. Error: {}",
                    e
                )))
            }
        };

        return Ok(metadata.len());
    }

    fn set_disk_size(&mut self, size: u64) -> Result<(), ToolError> {
        return match self.file.borrow_mut().set_len(size) {
            Ok(_) => Ok(()),
            Err(e) => Err(ToolError::new(&format!(
                "Failed to resize file to {} bytes. Error: {}",
                size, e
            ))),
        };
    }

    fn flush(&mut self) -> Result<(), ToolError> {
        let mut file = self.file.borrow_mut();

        if let Err(e) = file.flush() {
            return Err(ToolError::new(&format!("Failed to flush. Error: {}", e)));
        }

        return match file.sync_data() {
            Ok(_) => Ok(()),
            Err(e) => Err(ToolError::new(&format!("Failed to sync. Error: {}", e))),
        };
    }
}

impl Drop for Handler {
    fn drop(&mut self) {
        if self.delete_on_release {
            if let Err(e) = std::fs::remove_file(&self.path) {
                log::warn!("Could not remove {}: {}", self.path.display(), e);
            }
        }
    }
}
