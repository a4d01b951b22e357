use crate::DocfileError;
use enumflags2::{bitflags, make_bitflags, BitFlags};

/// Flags controlling how a storage or stream is opened.
/// Read-only access with no other flags is the empty set.
#[bitflags]
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Write = 0x0000_0001,
    ReadWrite = 0x0000_0002,
    ShareExclusive = 0x0000_0010,
    ShareDenyWrite = 0x0000_0020,
    ShareDenyNone = 0x0000_0040,
    Create = 0x0000_1000,
    Transacted = 0x0001_0000,
    Convert = 0x0002_0000,
    Priority = 0x0004_0000,
    NoScratch = 0x0010_0000,
    NoSnapshot = 0x0020_0000,
    DeleteOnRelease = 0x0400_0000,
    Simple = 0x0800_0000,
}

pub type StorageModes = BitFlags<StorageMode>;

/// Deny-read shares its bits with exclusive and deny-write.
pub const SHARE_DENY_READ: StorageModes =
    make_bitflags!(StorageMode::{ShareExclusive | ShareDenyWrite});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
    ReadWrite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShareMode {
    Exclusive,
    DenyWrite,
    DenyNone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationMode {
    /// Replace whatever is there.
    CreateAlways,
    /// Fail if the target already exists.
    CreateNew,
}

pub fn modes_from_bits<E>(bits: u32) -> Result<StorageModes, DocfileError<E>> {
    return match BitFlags::from_bits(bits) {
        Ok(modes) => Ok(modes),
        Err(_) => Err(DocfileError::InvalidFlag),
    };
}

/// Returns false for flag combinations that can never be honoured.
pub fn validate_modes(modes: StorageModes) -> bool {
    let transacted = modes.contains(StorageMode::Transacted);
    let simple = modes.contains(StorageMode::Simple);

    if transacted && simple {
        return false;
    }

    if modes.contains(StorageMode::Write) && modes.contains(StorageMode::ReadWrite) {
        return false;
    }

    let deny_none = modes.contains(StorageMode::ShareDenyNone);
    let deny_read = modes.contains(SHARE_DENY_READ);
    let deny_write = modes.contains(StorageMode::ShareDenyWrite);
    let exclusive = modes.contains(StorageMode::ShareExclusive);

    if deny_none && (deny_read || deny_write || exclusive) {
        return false;
    }

    if modes.contains(StorageMode::Create) && modes.contains(StorageMode::Convert) {
        return false;
    }

    if modes.contains(StorageMode::NoScratch) && !transacted {
        return false;
    }

    if modes.contains(StorageMode::NoSnapshot) && !(transacted && !(exclusive || deny_write)) {
        return false;
    }

    return true;
}

pub fn access_mode(modes: StorageModes) -> AccessMode {
    if modes.contains(StorageMode::ReadWrite) {
        return AccessMode::ReadWrite;
    }

    if modes.contains(StorageMode::Write) {
        return AccessMode::Write;
    }

    return AccessMode::Read;
}

pub fn share_mode(modes: StorageModes) -> ShareMode {
    if modes.contains(StorageMode::ShareDenyNone) {
        return ShareMode::DenyNone;
    }

    if modes.contains(StorageMode::ShareDenyWrite) && !modes.contains(StorageMode::ShareExclusive)
    {
        return ShareMode::DenyWrite;
    }

    // Exclusive, deny-read or no share flag at all.
    return ShareMode::Exclusive;
}

pub fn creation_mode(modes: StorageModes) -> CreationMode {
    if modes.contains(StorageMode::Create) {
        return CreationMode::CreateAlways;
    }

    if modes.contains(StorageMode::Convert) {
        log::warn!("Convert mode is not implemented, treating it as create-new");
    }

    return CreationMode::CreateNew;
}
