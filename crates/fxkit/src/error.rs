use std::io;

use fxkit_preshader::PreshaderError;
use thiserror::Error;

use crate::shader::ShaderError;

pub type Result<T> = std::result::Result<T, EffectError>;

/// Coarse classification of an [`EffectError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The input is malformed.
    Corrupt,
    /// The input is valid but uses something this crate does not implement.
    Unsupported,
    /// The model does not fit the compact format's counters.
    Capacity,
    /// The underlying writer failed.
    Io,
}

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("unexpected end of input: need {needed} bytes at offset {offset}, buffer is {len} bytes")]
    Truncated {
        offset: usize,
        needed: usize,
        len: usize,
    },

    #[error("unrecognised effect tag {0:#010x}")]
    BadTag(u32),

    #[error("invalid compact effect magic")]
    BadMagic,

    #[error("compact effect version {found} does not match supported version {expected}")]
    VersionMismatch { found: u8, expected: u8 },

    #[error("corrupt effect: {field}: {detail}")]
    Corrupt { field: &'static str, detail: String },

    #[error("unsupported {what} {value:#x}")]
    Unsupported { what: &'static str, value: u32 },

    #[error("too many {what}: {count} exceeds the format limit of {max}")]
    Capacity {
        what: &'static str,
        count: usize,
        max: usize,
    },

    #[error("shader bytecode: {0}")]
    Shader(#[from] ShaderError),

    #[error("preshader: {0}")]
    Preshader(#[from] PreshaderError),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl EffectError {
    pub(crate) fn corrupt(field: &'static str, detail: impl Into<String>) -> Self {
        Self::Corrupt {
            field,
            detail: detail.into(),
        }
    }

    pub(crate) fn unsupported(what: &'static str, value: u32) -> Self {
        Self::Unsupported { what, value }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Truncated { .. }
            | Self::BadTag(_)
            | Self::BadMagic
            | Self::VersionMismatch { .. }
            | Self::Corrupt { .. } => ErrorKind::Corrupt,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::Capacity { .. } => ErrorKind::Capacity,
            Self::Shader(err) => err.kind(),
            Self::Preshader(err) => preshader_error_kind(err),
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

pub(crate) fn preshader_error_kind(err: &PreshaderError) -> ErrorKind {
    match err {
        PreshaderError::RelativeAddressing(_) | PreshaderError::UnsupportedOpcode(_) => {
            ErrorKind::Unsupported
        }
        _ => ErrorKind::Corrupt,
    }
}
