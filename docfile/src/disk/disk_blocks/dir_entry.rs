use crate::ByteSerializable;
use crate::disk::BLOCK_END_OF_CHAIN;
use alloc::string::String;
use alloc::vec::Vec;
use byteorder::{ByteOrder, LittleEndian};
use core::cmp::Ordering;

pub const DIR_ENTRY_SIZE: u64 = 128;
/// Marks an absent sibling or child link.
pub const NO_ENTRY: u32 = 0xffff_ffff;
/// Largest index a directory record may occupy.
pub const MAX_ENTRY_INDEX: u32 = 0xffff_fffa;

const NAME_BUFFER_LEN: usize = 64;
/// Name length in UTF-16 units, the terminator excluded.
pub const MAX_NAME_LEN: usize = NAME_BUFFER_LEN / 2 - 1;
pub const FORBIDDEN_CHARACTERS: [char; 4] = ['/', '\\', ':', '!'];
pub const ROOT_ENTRY_NAME: &str = "Root Entry";

const OFFSET_NAME_LENGTH: usize = 0x40;
const OFFSET_TYPE: usize = 0x42;
const OFFSET_PREVIOUS: usize = 0x44;
const OFFSET_NEXT: usize = 0x48;
const OFFSET_CHILD: usize = 0x4c;
const OFFSET_CLSID: usize = 0x50;
const OFFSET_CREATED_LOW: usize = 0x64;
const OFFSET_CREATED_HIGH: usize = 0x68;
const OFFSET_MODIFIED_LOW: usize = 0x6c;
const OFFSET_MODIFIED_HIGH: usize = 0x70;
const OFFSET_START_BLOCK: usize = 0x74;
const OFFSET_SIZE: usize = 0x78;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryType {
    Empty,
    Storage,
    Stream,
    Root,
    Other(u8),
}

impl EntryType {
    pub fn from_u8(value: u8) -> Self {
        return match value {
            0 => EntryType::Empty,
            1 => EntryType::Storage,
            2 => EntryType::Stream,
            5 => EntryType::Root,
            v => EntryType::Other(v),
        };
    }

    pub fn to_u8(&self) -> u8 {
        return match self {
            EntryType::Empty => 0,
            EntryType::Storage => 1,
            EntryType::Stream => 2,
            EntryType::Root => 5,
            EntryType::Other(v) => *v,
        };
    }

    #[inline]
    pub fn is_storage(&self) -> bool {
        return *self == EntryType::Storage || *self == EntryType::Root;
    }
}

/// A class identifier, laid out like a GUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ClassId {
    pub data1: u32,
    pub data2: u16,
    pub data3: u16,
    pub data4: [u8; 8],
}

impl ClassId {
    pub fn new(data1: u32, data2: u16, data3: u16, data4: [u8; 8]) -> Self {
        return Self {
            data1,
            data2,
            data3,
            data4,
        };
    }

    pub fn is_null(&self) -> bool {
        return *self == ClassId::default();
    }

    pub fn write(&self, bytes: &mut [u8]) {
        LittleEndian::write_u32(&mut bytes[0..], self.data1);
        LittleEndian::write_u16(&mut bytes[4..], self.data2);
        LittleEndian::write_u16(&mut bytes[6..], self.data3);
        bytes[8..16].copy_from_slice(&self.data4);
    }

    pub fn read(bytes: &[u8]) -> Self {
        let mut data4 = [0u8; 8];
        data4.copy_from_slice(&bytes[8..16]);

        return Self {
            data1: LittleEndian::read_u32(&bytes[0..]),
            data2: LittleEndian::read_u16(&bytes[4..]),
            data3: LittleEndian::read_u16(&bytes[6..]),
            data4,
        };
    }
}

/// A directory record describing one storage or stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    name: Vec<u16>,
    pub entry_type: EntryType,
    pub previous: u32,
    pub next: u32,
    pub child: u32,
    pub clsid: ClassId,
    /// FILETIME ticks, zero when unset.
    pub created: u64,
    pub modified: u64,
    pub start_block: u32,
    pub size: u32,
}

impl DirEntry {
    /// A record whose name is already validated.
    pub fn new(name: Vec<u16>, entry_type: EntryType) -> Self {
        return Self {
            name,
            entry_type,
            previous: NO_ENTRY,
            next: NO_ENTRY,
            child: NO_ENTRY,
            clsid: ClassId::default(),
            created: 0,
            modified: 0,
            start_block: BLOCK_END_OF_CHAIN,
            size: 0,
        };
    }

    pub fn root() -> Self {
        return DirEntry::new(ROOT_ENTRY_NAME.encode_utf16().collect(), EntryType::Root);
    }

    /// A free slot.
    pub fn empty() -> Self {
        return Self {
            name: Vec::new(),
            entry_type: EntryType::Empty,
            previous: NO_ENTRY,
            next: NO_ENTRY,
            child: NO_ENTRY,
            clsid: ClassId::default(),
            created: 0,
            modified: 0,
            start_block: 0,
            size: 0,
        };
    }

    pub fn name(&self) -> String {
        return String::from_utf16_lossy(&self.name);
    }

    #[inline]
    pub fn name_units(&self) -> &[u16] {
        return &self.name;
    }

    /// Length of the encoded name in bytes including the terminator, or 0 for a free slot.
    pub fn name_length(&self) -> u16 {
        if self.name.is_empty() {
            return 0;
        }

        return ((self.name.len() + 1) * 2) as u16;
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        return self.name.is_empty();
    }

    /// Marks the slot free. Every other field is left as it was.
    pub fn clear_name(&mut self) {
        self.name.clear();
    }
}

impl ByteSerializable for DirEntry {
    type BytesArrayType = [u8; DIR_ENTRY_SIZE as usize];

    fn to_bytes(&self) -> Self::BytesArrayType {
        let mut bytes = [0u8; DIR_ENTRY_SIZE as usize];

        let mut offset = 0;
        for unit in self.name.iter().take(MAX_NAME_LEN) {
            LittleEndian::write_u16(&mut bytes[offset..], *unit);
            offset += 2;
        }

        LittleEndian::write_u16(&mut bytes[OFFSET_NAME_LENGTH..], self.name_length());
        bytes[OFFSET_TYPE] = self.entry_type.to_u8();
        LittleEndian::write_u32(&mut bytes[OFFSET_PREVIOUS..], self.previous);
        LittleEndian::write_u32(&mut bytes[OFFSET_NEXT..], self.next);
        LittleEndian::write_u32(&mut bytes[OFFSET_CHILD..], self.child);
        self.clsid.write(&mut bytes[OFFSET_CLSID..]);
        LittleEndian::write_u32(&mut bytes[OFFSET_CREATED_LOW..], self.created as u32);
        LittleEndian::write_u32(&mut bytes[OFFSET_CREATED_HIGH..], (self.created >> 32) as u32);
        LittleEndian::write_u32(&mut bytes[OFFSET_MODIFIED_LOW..], self.modified as u32);
        LittleEndian::write_u32(
            &mut bytes[OFFSET_MODIFIED_HIGH..],
            (self.modified >> 32) as u32,
        );
        LittleEndian::write_u32(&mut bytes[OFFSET_START_BLOCK..], self.start_block);
        LittleEndian::write_u32(&mut bytes[OFFSET_SIZE..], self.size);

        return bytes;
    }

    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: core::marker::Sized,
    {
        if bytes.len() < DIR_ENTRY_SIZE as usize {
            return None;
        }

        let name_length = LittleEndian::read_u16(&bytes[OFFSET_NAME_LENGTH..]) as usize;
        let units = core::cmp::min(name_length / 2, NAME_BUFFER_LEN / 2).saturating_sub(1);

        let mut name = Vec::with_capacity(units);
        for i in 0..units {
            name.push(LittleEndian::read_u16(&bytes[i * 2..]));
        }

        let created = LittleEndian::read_u32(&bytes[OFFSET_CREATED_LOW..]) as u64
            | (LittleEndian::read_u32(&bytes[OFFSET_CREATED_HIGH..]) as u64) << 32;
        let modified = LittleEndian::read_u32(&bytes[OFFSET_MODIFIED_LOW..]) as u64
            | (LittleEndian::read_u32(&bytes[OFFSET_MODIFIED_HIGH..]) as u64) << 32;

        return Some(Self {
            name,
            entry_type: EntryType::from_u8(bytes[OFFSET_TYPE]),
            previous: LittleEndian::read_u32(&bytes[OFFSET_PREVIOUS..]),
            next: LittleEndian::read_u32(&bytes[OFFSET_NEXT..]),
            child: LittleEndian::read_u32(&bytes[OFFSET_CHILD..]),
            clsid: ClassId::read(&bytes[OFFSET_CLSID..]),
            created,
            modified,
            start_block: LittleEndian::read_u32(&bytes[OFFSET_START_BLOCK..]),
            size: LittleEndian::read_u32(&bytes[OFFSET_SIZE..]),
        });
    }
}

/// Checks a user supplied name and encodes it.
pub fn encode_name(name: &str) -> Option<Vec<u16>> {
    if name.is_empty() || name.contains(&FORBIDDEN_CHARACTERS[..]) {
        return None;
    }

    let units: Vec<u16> = name.encode_utf16().collect();

    if units.len() > MAX_NAME_LEN {
        return None;
    }

    return Some(units);
}

fn fold_case(units: &[u16]) -> Vec<u16> {
    let mut folded = Vec::with_capacity(units.len());

    for decoded in core::char::decode_utf16(units.iter().cloned()) {
        match decoded {
            Ok(c) => {
                let mut upper = c.to_uppercase();
                let c = match (upper.next(), upper.next()) {
                    (Some(u), None) => u,
                    _ => c,
                };

                let mut buffer = [0u16; 2];
                folded.extend_from_slice(c.encode_utf16(&mut buffer));
            }
            Err(e) => folded.push(e.unpaired_surrogate()),
        }
    }

    return folded;
}

/// Sibling order: shorter names first, then case-insensitive comparison.
pub fn compare_names(a: &[u16], b: &[u16]) -> Ordering {
    return match a.len().cmp(&b.len()) {
        Ordering::Equal => fold_case(a).cmp(&fold_case(b)),
        other => other,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    fn units(s: &str) -> Vec<u16> {
        return s.encode_utf16().collect();
    }

    #[test]
    fn test_root_entry_bytes() {
        let bytes = DirEntry::root().to_bytes();

        assert_eq!(LittleEndian::read_u16(&bytes[0..]), 'R' as u16);
        assert_eq!(LittleEndian::read_u16(&bytes[18..]), 'y' as u16);
        assert_eq!(LittleEndian::read_u16(&bytes[20..]), 0);
        assert_eq!(LittleEndian::read_u16(&bytes[0x40..]), 22);
        assert_eq!(bytes[0x42], 5);
        assert_eq!(LittleEndian::read_u32(&bytes[0x44..]), NO_ENTRY);
        assert_eq!(LittleEndian::read_u32(&bytes[0x48..]), NO_ENTRY);
        assert_eq!(LittleEndian::read_u32(&bytes[0x4c..]), NO_ENTRY);
        assert_eq!(LittleEndian::read_u32(&bytes[0x74..]), BLOCK_END_OF_CHAIN);
        assert_eq!(LittleEndian::read_u32(&bytes[0x78..]), 0);
    }

    #[test]
    fn test_entry_fields() {
        let mut entry = DirEntry::new(units("Contents"), EntryType::Stream);
        entry.previous = 3;
        entry.next = 9;
        entry.clsid = ClassId::new(0x0002_0906, 0, 0, [0xc0, 0, 0, 0, 0, 0, 0, 0x46]);
        entry.created = 0x0123_4567_89ab_cdef;
        entry.start_block = 12;
        entry.size = 5000;

        let bytes = entry.to_bytes();
        assert_eq!(bytes[0x42], 2);
        assert_eq!(LittleEndian::read_u32(&bytes[0x44..]), 3);
        assert_eq!(LittleEndian::read_u32(&bytes[0x48..]), 9);
        assert_eq!(bytes[0x50..0x54], [0x06, 0x09, 0x02, 0x00]);
        assert_eq!(bytes[0x58], 0xc0);
        assert_eq!(bytes[0x5f], 0x46);
        assert_eq!(LittleEndian::read_u32(&bytes[0x64..]), 0x89ab_cdef);
        assert_eq!(LittleEndian::read_u32(&bytes[0x68..]), 0x0123_4567);
        assert_eq!(LittleEndian::read_u32(&bytes[0x74..]), 12);
        assert_eq!(LittleEndian::read_u32(&bytes[0x78..]), 5000);

        assert_eq!(DirEntry::from_bytes(&bytes), Some(entry));
    }

    #[test]
    fn test_free_entry() {
        let mut entry = DirEntry::new(units("gone"), EntryType::Stream);
        entry.clear_name();

        let bytes = entry.to_bytes();
        assert_eq!(LittleEndian::read_u16(&bytes[0x40..]), 0);
        assert!(DirEntry::from_bytes(&bytes).unwrap().is_free());
        assert!(DirEntry::from_bytes(&[0u8; 128]).unwrap().is_free());
    }

    #[test]
    fn test_encode_name() {
        assert_eq!(encode_name("data"), Some(units("data")));
        assert_eq!(encode_name(""), None);
        assert_eq!(encode_name("a/b"), None);
        assert_eq!(encode_name("a!b"), None);
        assert!(encode_name("abcdefghijklmnopqrstuvwxyz01234").is_some());
        assert!(encode_name("abcdefghijklmnopqrstuvwxyz012345").is_none());
    }

    #[test]
    fn test_compare_names() {
        assert_eq!(compare_names(&units("zz"), &units("aaa")), Ordering::Less);
        assert_eq!(compare_names(&units("abc"), &units("ABD")), Ordering::Less);
        assert_eq!(compare_names(&units("Data"), &units("dATA")), Ordering::Equal);
        assert_eq!(compare_names(&units("b"), &units("A")), Ordering::Greater);
    }
}
