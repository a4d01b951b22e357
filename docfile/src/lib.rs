#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod byte_serializable;
mod disk;
mod docfile_error;
mod enumerator;
mod manager;
mod mode;
mod stat;
mod storage;
mod stream;

pub use byte_serializable::ByteSerializable;
pub use disk::{
    compare_names, encode_name, ClassId, DirEntry, DiskHandler, DiskInfo, EntryType, Header,
    Signature, BLOCK_END_OF_CHAIN, BLOCK_EXT_DEPOT, BLOCK_SPECIAL, BLOCK_UNUSED,
    COUNT_DEPOT_IN_HEADER, DIR_ENTRY_SIZE, FORBIDDEN_CHARACTERS, HEADER_SIZE,
    LIMIT_TO_USE_SMALL_BLOCK, MAX_BLOCK_INDEX, MAX_NAME_LEN, NO_ENTRY,
};
pub use docfile_error::{DocfileError, DocfileErrorConvertible};
pub use enumerator::Elements;
pub use manager::{from_filetime, to_filetime, OSManager};
pub use mode::{
    access_mode, creation_mode, modes_from_bits, share_mode, validate_modes, AccessMode,
    CreationMode, ShareMode, StorageMode, StorageModes, SHARE_DENY_READ,
};
pub use stat::{ElementType, StatFlag, StatInfo};
pub use storage::Storage;
pub use stream::{SeekFrom, Stream};
