//! Typed errors for the in-memory mesh and pixel-map parsers.

use std::fmt;

use thiserror::Error;

/// Which source list a face corner refers into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum IndexKind {
    Position,
    Texcoord,
    Normal,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IndexKind::Position => "position",
            IndexKind::Texcoord => "texcoord",
            IndexKind::Normal => "normal",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AssetError {
    /// A mandatory token was missing or not a number.
    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// Pixel-map magic is neither `P3` nor `P6`.
    #[error("Unsupported pixel-map format (magic {magic:?})")]
    UnsupportedFormat { magic: String },

    /// A face corner references outside its source list.
    #[error("{kind} index {index} out of range (len={len}) on line {line}")]
    IndexOutOfRange {
        kind: IndexKind,
        index: i64,
        len: usize,
        line: usize,
    },
}

impl AssetError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        AssetError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type AssetResult<T> = Result<T, AssetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_error_message_names_the_list() {
        let err = AssetError::IndexOutOfRange {
            kind: IndexKind::Normal,
            index: 7,
            len: 2,
            line: 12,
        };
        assert_eq!(
            err.to_string(),
            "normal index 7 out of range (len=2) on line 12"
        );
    }
}
