//! Error types.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors produced when an edit script does not fit the text it is applied to.
pub enum ApplyError {
    #[error("operation {index}: insert at {offset} is past the end of a {len}-char text")]
    /// An insertion offset lies beyond the current text length.
    InsertOutOfBounds {
        /// Position of the operation in the script.
        index: usize,
        /// Requested insertion offset.
        offset: usize,
        /// Text length at the time the operation applies.
        len: usize,
    },

    #[error("operation {index}: delete of {offset}..{end} is past the end of a {len}-char text")]
    /// A deletion extends beyond the current text length.
    DeleteOutOfBounds {
        /// Position of the operation in the script.
        index: usize,
        /// Requested deletion start.
        offset: usize,
        /// Requested deletion end (saturating).
        end: usize,
        /// Text length at the time the operation applies.
        len: usize,
    },
}

/// Which copy of the document a rejected diff was checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffTarget {
    /// The last state acknowledged by the peer.
    Shadow,
    /// The local authoritative copy.
    Authoritative,
}

impl std::fmt::Display for DiffTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shadow => f.write_str("shadow"),
            Self::Authoritative => f.write_str("authoritative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors surfaced by a synchronization session.
pub enum SyncError {
    #[error("malformed diff for {target} copy: {source}")]
    /// An inbound diff does not apply to the session's current text.
    ///
    /// The session is left unchanged.
    MalformedDiff {
        /// Copy the diff failed against.
        target: DiffTarget,
        /// Underlying apply failure.
        source: ApplyError,
    },
}
