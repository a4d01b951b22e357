// File layout:
// header (block -1), then big blocks chained through the allocation table.
// Block 0 is the first allocation-table block and block 1 starts the directory stream on a new file.

mod block_chain;
mod block_file;
mod compound_file;
mod depot;
mod directory;
mod disk_blocks;
mod disk_info;
mod small_block_chain;
mod stream_chain;
pub mod disk_handler;

/// Free block.
pub const BLOCK_UNUSED: u32 = 0xffff_ffff;
pub const BLOCK_END_OF_CHAIN: u32 = 0xffff_fffe;
/// Block holding part of the allocation table.
pub const BLOCK_SPECIAL: u32 = 0xffff_fffd;
/// Block holding part of the extended allocation table.
pub const BLOCK_EXT_DEPOT: u32 = 0xffff_fffc;
/// Largest index an ordinary block may have.
pub const MAX_BLOCK_INDEX: u32 = 0xffff_fffa;

/// Streams below this size live in small blocks.
pub const LIMIT_TO_USE_SMALL_BLOCK: u64 = 0x1000;

pub(crate) use block_chain::BlockChainStream;
pub(crate) use compound_file::CompoundFile;
pub(crate) use directory::SearchStack;
pub(crate) use stream_chain::StreamChain;

pub use disk_blocks::{
    compare_names, encode_name, ClassId, DirEntry, EntryType, Header, Signature,
    COUNT_DEPOT_IN_HEADER, DIR_ENTRY_SIZE, FORBIDDEN_CHARACTERS, HEADER_SIZE, MAX_NAME_LEN,
    NO_ENTRY,
};
pub use disk_handler::DiskHandler;
pub use disk_info::DiskInfo;
