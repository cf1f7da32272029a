//! Error taxonomy for the mapping library

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    /// Bad magic, unsupported version, truncated or inconsistent input
    #[error("format error: {0}")]
    Format(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Inconsistent options caught by an upfront check
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type MapResult<T> = Result<T, MapError>;

/// Soft outcomes that approximate or omit one query's output without
/// failing the batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// anchors beyond the cap were dropped, rarest k-mers kept
    AnchorsTruncated { kept: usize, total: usize },
    /// the DP band of a chain exceeded the cell bound
    ChainTooLarge { chain: usize, cells: usize },
    /// no positive-scoring path in the band of a chain
    NoAlignment { chain: usize },
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Degradation::AnchorsTruncated { kept, total } => {
                write!(f, "anchors truncated to {} of {}", kept, total)
            }
            Degradation::ChainTooLarge { chain, cells } => {
                write!(f, "chain {} skipped: {} DP cells", chain, cells)
            }
            Degradation::NoAlignment { chain } => write!(f, "chain {} has no alignment", chain),
        }
    }
}

impl MapError {
    pub fn format(msg: impl Into<String>) -> Self {
        MapError::Format(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        MapError::Config(msg.into())
    }

    /// Convert an error raised while decoding a binary file. Running out of
    /// bytes means the file is truncated, which is a format problem.
    pub fn from_read(err: io::Error, what: &str) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            MapError::Format(format!("truncated {}", what))
        } else {
            MapError::Io(err)
        }
    }
}
