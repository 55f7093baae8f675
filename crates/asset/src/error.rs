//! Error taxonomy for mesh loading.

use std::{io, path::Path};

use thiserror::Error;

/// Everything that can stop a load. The first error wins; no partial mesh is
/// ever returned alongside one.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },

    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("unexpected document structure: {0}")]
    Structure(String),

    #[error("unsupported face on line {line}: expected a triangle, found {corners} corners")]
    UnsupportedTopology { line: usize, corners: usize },

    #[error("missing {attribute} for a vertex on line {line}")]
    MissingAttribute { line: usize, attribute: Attribute },

    #[error("{attribute} index {index} out of range (len={len}) on line {line}")]
    IndexOutOfRange {
        line: usize,
        attribute: Attribute,
        index: i64,
        len: usize,
    },
}

impl LoadError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            origin: path.display().to_string(),
            source,
        }
    }

    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Which attribute table a face corner refers to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Attribute {
    Position,
    Texcoord,
    Normal,
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Attribute::Position => "position",
            Attribute::Texcoord => "texture coordinate",
            Attribute::Normal => "normal",
        })
    }
}

pub type LoadResult<T> = Result<T, LoadError>;
