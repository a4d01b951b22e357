use crate::disk::{ClassId, DirEntry};
use crate::manager::from_filetime;
use alloc::string::String;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Storage,
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatFlag {
    Default,
    /// Leave the name out.
    NoName,
}

/// Metadata of a storage or stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatInfo {
    name: Option<String>,
    element_type: ElementType,
    size: u64,
    clsid: ClassId,
    created: Option<DateTime<Utc>>,
    modified: Option<DateTime<Utc>>,
}

impl StatInfo {
    pub(crate) fn from_entry(entry: &DirEntry, flag: StatFlag) -> Self {
        let name = match flag {
            StatFlag::Default => Some(entry.name()),
            StatFlag::NoName => None,
        };

        let element_type = if entry.entry_type.is_storage() {
            ElementType::Storage
        } else {
            ElementType::Stream
        };

        return Self {
            name,
            element_type,
            size: entry.size as u64,
            clsid: entry.clsid,
            created: from_filetime(entry.created),
            modified: from_filetime(entry.modified),
        };
    }

    #[inline]
    pub fn name(&self) -> Option<&str> {
        return self.name.as_deref();
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        return self.element_type;
    }

    #[inline]
    pub fn is_storage(&self) -> bool {
        return self.element_type == ElementType::Storage;
    }

    #[inline]
    pub fn size(&self) -> u64 {
        return self.size;
    }

    #[inline]
    pub fn clsid(&self) -> ClassId {
        return self.clsid;
    }

    #[inline]
    pub fn created(&self) -> Option<DateTime<Utc>> {
        return self.created;
    }

    #[inline]
    pub fn modified(&self) -> Option<DateTime<Utc>> {
        return self.modified;
    }
}
