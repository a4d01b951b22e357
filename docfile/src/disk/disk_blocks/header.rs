use crate::ByteSerializable;
use crate::disk::{BLOCK_END_OF_CHAIN, BLOCK_UNUSED};
use byteorder::{ByteOrder, LittleEndian};

pub const HEADER_SIZE: usize = 512;
/// Number of allocation-table blocks addressed directly from the header.
pub const COUNT_DEPOT_IN_HEADER: usize = 109;

pub const MAGIC: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1];
pub const OLD_MAGIC: [u8; 8] = [0xd0, 0xcf, 0x11, 0xe0, 0x0e, 0x11, 0xfc, 0x0d];

pub const DEFAULT_BIG_BLOCK_SIZE_BITS: u16 = 9;
pub const DEFAULT_SMALL_BLOCK_SIZE_BITS: u16 = 6;

const MIN_BIG_BLOCK_SIZE_BITS: u16 = 7;
const MAX_BIG_BLOCK_SIZE_BITS: u16 = 16;

const OFFSET_MINOR_VERSION: usize = 0x18;
const OFFSET_MAJOR_VERSION: usize = 0x1a;
const OFFSET_BYTE_ORDER: usize = 0x1c;
const OFFSET_BIG_BLOCK_SIZE_BITS: usize = 0x1e;
const OFFSET_SMALL_BLOCK_SIZE_BITS: usize = 0x20;
const OFFSET_BIG_BLOCK_DEPOT_COUNT: usize = 0x2c;
const OFFSET_ROOT_START_BLOCK: usize = 0x30;
const OFFSET_SMALL_BLOCK_CUTOFF: usize = 0x38;
const OFFSET_SMALL_BLOCK_DEPOT_START: usize = 0x3c;
const OFFSET_SMALL_BLOCK_DEPOT_COUNT: usize = 0x40;
const OFFSET_EXT_BIG_BLOCK_DEPOT_START: usize = 0x44;
const OFFSET_EXT_BIG_BLOCK_DEPOT_COUNT: usize = 0x48;
const OFFSET_BIG_BLOCK_DEPOT_START: usize = 0x4c;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    Current,
    Old,
    Unknown,
}

/// The first block of every compound file.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Header {
    big_block_size_bits: u16,
    small_block_size_bits: u16,

    /// Number of allocation-table blocks in use.
    pub big_block_depot_count: u32,
    /// First block of the directory stream.
    pub root_start_block: u32,
    /// First block of the mini allocation table.
    pub small_block_depot_start: u32,
    /// First block of the extended allocation table.
    pub ext_big_block_depot_start: u32,
    pub ext_big_block_depot_count: u32,
    pub big_block_depot_start: [u32; COUNT_DEPOT_IN_HEADER],

    // Bytes we do not interpret are written back unchanged.
    raw: [u8; HEADER_SIZE],
}

impl Header {
    /// The header of a freshly created file: one depot block at 0, the directory at 1.
    pub fn new() -> Self {
        let mut raw = [0u8; HEADER_SIZE];

        raw[..MAGIC.len()].copy_from_slice(&MAGIC);
        LittleEndian::write_u16(&mut raw[OFFSET_MINOR_VERSION..], 0x3b);
        LittleEndian::write_u16(&mut raw[OFFSET_MAJOR_VERSION..], 0x3);
        LittleEndian::write_u16(&mut raw[OFFSET_BYTE_ORDER..], 0xfffe);
        LittleEndian::write_u32(&mut raw[OFFSET_SMALL_BLOCK_CUTOFF..], 0x1000);
        LittleEndian::write_u32(&mut raw[OFFSET_SMALL_BLOCK_DEPOT_COUNT..], 0x1);

        let mut big_block_depot_start = [BLOCK_UNUSED; COUNT_DEPOT_IN_HEADER];
        big_block_depot_start[0] = 0;

        return Self {
            big_block_size_bits: DEFAULT_BIG_BLOCK_SIZE_BITS,
            small_block_size_bits: DEFAULT_SMALL_BLOCK_SIZE_BITS,
            big_block_depot_count: 1,
            root_start_block: 1,
            small_block_depot_start: BLOCK_END_OF_CHAIN,
            ext_big_block_depot_start: BLOCK_END_OF_CHAIN,
            ext_big_block_depot_count: 0,
            big_block_depot_start,
            raw,
        };
    }

    pub fn signature(bytes: &[u8]) -> Signature {
        if bytes.len() < MAGIC.len() {
            return Signature::Unknown;
        }

        if bytes[..MAGIC.len()] == MAGIC {
            return Signature::Current;
        }

        if bytes[..OLD_MAGIC.len()] == OLD_MAGIC {
            return Signature::Old;
        }

        return Signature::Unknown;
    }

    #[inline]
    pub fn big_block_size(&self) -> u64 {
        return 1 << self.big_block_size_bits;
    }

    #[inline]
    pub fn small_block_size(&self) -> u64 {
        return 1 << self.small_block_size_bits;
    }

    pub fn has_valid_block_sizes(&self) -> bool {
        return self.big_block_size_bits >= MIN_BIG_BLOCK_SIZE_BITS
            && self.big_block_size_bits <= MAX_BIG_BLOCK_SIZE_BITS
            && self.small_block_size_bits < self.big_block_size_bits;
    }
}

impl ByteSerializable for Header {
    type BytesArrayType = [u8; HEADER_SIZE];

    fn to_bytes(&self) -> Self::BytesArrayType {
        let mut bytes = self.raw;

        LittleEndian::write_u16(&mut bytes[OFFSET_BIG_BLOCK_SIZE_BITS..], self.big_block_size_bits);
        LittleEndian::write_u16(
            &mut bytes[OFFSET_SMALL_BLOCK_SIZE_BITS..],
            self.small_block_size_bits,
        );
        LittleEndian::write_u32(
            &mut bytes[OFFSET_BIG_BLOCK_DEPOT_COUNT..],
            self.big_block_depot_count,
        );
        LittleEndian::write_u32(&mut bytes[OFFSET_ROOT_START_BLOCK..], self.root_start_block);
        LittleEndian::write_u32(
            &mut bytes[OFFSET_SMALL_BLOCK_DEPOT_START..],
            self.small_block_depot_start,
        );
        LittleEndian::write_u32(
            &mut bytes[OFFSET_EXT_BIG_BLOCK_DEPOT_START..],
            self.ext_big_block_depot_start,
        );
        LittleEndian::write_u32(
            &mut bytes[OFFSET_EXT_BIG_BLOCK_DEPOT_COUNT..],
            self.ext_big_block_depot_count,
        );

        let mut offset = OFFSET_BIG_BLOCK_DEPOT_START;

        for depot in self.big_block_depot_start.iter() {
            LittleEndian::write_u32(&mut bytes[offset..], *depot);
            offset += 4;
        }

        return bytes;
    }

    /// Only headers carrying the current signature parse.
    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: core::marker::Sized,
    {
        if bytes.len() < HEADER_SIZE || Header::signature(bytes) != Signature::Current {
            return None;
        }

        let mut raw = [0u8; HEADER_SIZE];
        raw.copy_from_slice(&bytes[..HEADER_SIZE]);

        let mut big_block_depot_start = [BLOCK_UNUSED; COUNT_DEPOT_IN_HEADER];
        let mut offset = OFFSET_BIG_BLOCK_DEPOT_START;

        for depot in big_block_depot_start.iter_mut() {
            *depot = LittleEndian::read_u32(&raw[offset..]);
            offset += 4;
        }

        return Some(Self {
            big_block_size_bits: LittleEndian::read_u16(&raw[OFFSET_BIG_BLOCK_SIZE_BITS..]),
            small_block_size_bits: LittleEndian::read_u16(&raw[OFFSET_SMALL_BLOCK_SIZE_BITS..]),
            big_block_depot_count: LittleEndian::read_u32(&raw[OFFSET_BIG_BLOCK_DEPOT_COUNT..]),
            root_start_block: LittleEndian::read_u32(&raw[OFFSET_ROOT_START_BLOCK..]),
            small_block_depot_start: LittleEndian::read_u32(
                &raw[OFFSET_SMALL_BLOCK_DEPOT_START..],
            ),
            ext_big_block_depot_start: LittleEndian::read_u32(
                &raw[OFFSET_EXT_BIG_BLOCK_DEPOT_START..],
            ),
            ext_big_block_depot_count: LittleEndian::read_u32(
                &raw[OFFSET_EXT_BIG_BLOCK_DEPOT_COUNT..],
            ),
            big_block_depot_start,
            raw,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_header_bytes() {
        let bytes = Header::new().to_bytes();

        assert_eq!(bytes[..8], MAGIC);
        assert_eq!(LittleEndian::read_u16(&bytes[0x18..]), 0x3b);
        assert_eq!(LittleEndian::read_u16(&bytes[0x1a..]), 0x3);
        assert_eq!(LittleEndian::read_u16(&bytes[0x1c..]), 0xfffe);
        assert_eq!(LittleEndian::read_u16(&bytes[0x1e..]), 9);
        assert_eq!(LittleEndian::read_u16(&bytes[0x20..]), 6);
        assert_eq!(LittleEndian::read_u32(&bytes[0x2c..]), 1);
        assert_eq!(LittleEndian::read_u32(&bytes[0x30..]), 1);
        assert_eq!(LittleEndian::read_u32(&bytes[0x38..]), 0x1000);
        assert_eq!(LittleEndian::read_u32(&bytes[0x3c..]), 0xffff_fffe);
        assert_eq!(LittleEndian::read_u32(&bytes[0x40..]), 1);
        assert_eq!(LittleEndian::read_u32(&bytes[0x44..]), 0xffff_fffe);
        assert_eq!(LittleEndian::read_u32(&bytes[0x48..]), 0);
        assert_eq!(LittleEndian::read_u32(&bytes[0x4c..]), 0);

        for i in 1..COUNT_DEPOT_IN_HEADER {
            assert_eq!(LittleEndian::read_u32(&bytes[0x4c + i * 4..]), 0xffff_ffff);
        }
    }

    #[test]
    fn test_parse_written_header() {
        let mut header = Header::new();
        header.big_block_depot_count = 2;
        header.big_block_depot_start[1] = 128;
        header.small_block_depot_start = 7;

        assert_eq!(Header::from_bytes(&header.to_bytes()), Some(header));
    }

    #[test]
    fn test_unknown_bytes_preserved() {
        let mut bytes = Header::new().to_bytes();
        bytes[0x34] = 0xab;
        bytes[0x28] = 0x11;

        let header = Header::from_bytes(&bytes).unwrap();
        let written = header.to_bytes();

        assert_eq!(written[0x34], 0xab);
        assert_eq!(written[0x28], 0x11);
    }

    #[test]
    fn test_signatures() {
        let mut bytes = Header::new().to_bytes();
        assert_eq!(Header::signature(&bytes), Signature::Current);

        bytes[..8].copy_from_slice(&OLD_MAGIC);
        assert_eq!(Header::signature(&bytes), Signature::Old);
        assert!(Header::from_bytes(&bytes).is_none());

        bytes[0] = 0;
        assert_eq!(Header::signature(&bytes), Signature::Unknown);
        assert_eq!(Header::signature(&[0xd0, 0xcf]), Signature::Unknown);
    }

    #[test]
    fn test_block_sizes() {
        let header = Header::new();
        assert_eq!(header.big_block_size(), 512);
        assert_eq!(header.small_block_size(), 64);
        assert!(header.has_valid_block_sizes());

        let mut bytes = header.to_bytes();
        LittleEndian::write_u16(&mut bytes[0x20..], 9);
        assert!(!Header::from_bytes(&bytes).unwrap().has_valid_block_sizes());

        LittleEndian::write_u16(&mut bytes[0x1e..], 12);
        assert!(Header::from_bytes(&bytes).unwrap().has_valid_block_sizes());
    }
}
