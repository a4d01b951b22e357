mod dir_entry;
mod header;

pub use dir_entry::{
    compare_names, encode_name, ClassId, DirEntry, EntryType, DIR_ENTRY_SIZE, FORBIDDEN_CHARACTERS,
    MAX_ENTRY_INDEX, MAX_NAME_LEN, NO_ENTRY,
};
pub use header::{Header, Signature, COUNT_DEPOT_IN_HEADER, HEADER_SIZE};
