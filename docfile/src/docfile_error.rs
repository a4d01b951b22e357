use alloc::string::String;
use core::fmt::{Debug, Display};

macro_rules! enum_variant_stringify {
    ($self:expr, [$($var:ident),+]) => {
        match $self {
            $(
               $var => stringify!($var),
            )+
            _ => "",
        }
    }
}

pub trait DocfileErrorConvertible: Debug {
    /// Wraps an error raised by a disk handler so it can travel through the engine.
    fn into_docfile_error(self) -> DocfileError<Self>
    where
        Self: Sized,
    {
        return DocfileError::DiskError(self);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocfileError<E> {
    /// The mode flags form a combination that is never valid.
    InvalidFlag,
    /// The mode flags are valid but not supported by the requested operation.
    InvalidFunction,
    FileNotFound,
    FileAlreadyExists,
    /// An index space (blocks or directory records) is exhausted.
    InsufficientMemory,
    InvalidName(String),
    InvalidArgument,
    InvalidHeader,
    /// The file carries the signature of the pre-release format.
    OldFormat,
    InvalidBlockSize,
    AccessDenied,
    /// A chain or record points outside the structures of the file.
    CorruptedFile,
    DiskError(E),
}

impl<E: Display> core::fmt::Display for DocfileError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        use DocfileError::*;

        match self {
            DiskError(e) => write!(f, "Disk error: {}", e),
            InvalidName(n) => write!(f, "InvalidName({})", n),
            _ => write!(
                f,
                "{}",
                enum_variant_stringify!(
                    self,
                    [
                        InvalidFlag,
                        InvalidFunction,
                        FileNotFound,
                        FileAlreadyExists,
                        InsufficientMemory,
                        InvalidArgument,
                        InvalidHeader,
                        OldFormat,
                        InvalidBlockSize,
                        AccessDenied,
                        CorruptedFile
                    ]
                )
            ),
        }
    }
}
