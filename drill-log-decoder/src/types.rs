//! Core types for the drill log decoder library
//!
//! This module defines the fundamental types the decoder emits when processing
//! a logger session: tags, resolved tag references, decoded samples, and the
//! error types for opening a session and for decoding individual records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Timestamp type used throughout the decoder
///
/// The logger writes wall-clock time without a zone, so timestamps stay naive.
pub type Timestamp = NaiveDateTime;

/// Result type for decoder operations
pub type Result<T> = std::result::Result<T, DecoderError>;

/// Errors that prevent a session (or a traversal) from starting
///
/// Mid-stream decode failures never surface here; they end the stream and are
/// reported as a [`crate::Diagnostic`] instead.
#[derive(Debug, thiserror::Error)]
pub enum DecoderError {
    #[error("File not found: {0:?}")]
    NotFound(PathBuf),

    #[error("No header terminator (0x0D) before end of file: {0:?}")]
    MissingHeaderTerminator(PathBuf),

    #[error("Tag file name does not contain the expected token: {0:?}")]
    InvalidFileName(PathBuf),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Reasons a fixed-width record payload could not be decoded
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("Truncated record: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Read failed: {0}")]
    Io(String),

    #[error("Invalid {field} field {text:?}: {reason}")]
    Field {
        field: &'static str,
        text: String,
        reason: String,
    },

    #[error("Invalid timestamp {text:?}: {reason}")]
    Timestamp { text: String, reason: String },
}

/// A logger channel descriptor from the tag-definition file
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    /// Trimmed display name (e.g. "[PLC]DRILLACTIVECURRENT")
    pub name: String,
    /// Key referenced by value records
    pub index: u32,
    /// Logger-defined category code
    #[serde(rename = "type")]
    pub tag_type: u16,
    /// Declared data type code
    pub dtype: u8,
}

/// A tag reference resolved against the tag table
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TagRef {
    /// The index was found in the tag table
    Known(Tag),
    /// The index has no tag table entry
    Unknown { index: u32 },
}

impl TagRef {
    /// Index referenced by the value record, known or not
    pub fn index(&self) -> u32 {
        match self {
            TagRef::Known(tag) => tag.index,
            TagRef::Unknown { index } => *index,
        }
    }

    /// Tag name, or `None` for unknown tags
    pub fn name(&self) -> Option<&str> {
        match self {
            TagRef::Known(tag) => Some(tag.name.as_str()),
            TagRef::Unknown { .. } => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, TagRef::Unknown { .. })
    }

    /// Display label used for table columns and reports
    ///
    /// Unknown tags get `UNKNOWN[<index>]`, which cannot collide with a logger
    /// name because those are prefixed with their source (e.g. `[PLC]`).
    pub fn label(&self) -> String {
        match self {
            TagRef::Known(tag) => tag.name.clone(),
            TagRef::Unknown { index } => format!("UNKNOWN[{}]", index),
        }
    }
}

impl fmt::Display for TagRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One decoded measurement from the float-value file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Date/time field combined with the millisecond field
    pub timestamp: Timestamp,
    /// Resolved channel
    pub tag: TagRef,
    /// Measured value
    pub value: f64,
    /// Opaque status flag
    pub status: u8,
    /// Opaque marker flag
    pub marker: u8,
    /// Logger-internal bookkeeping
    pub internal: i32,
}

/// How a record stream ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// A 0x1A separator was found
    Sentinel,
    /// End of file reached where a separator was expected
    EndOfFile,
    /// A record could not be decoded; a diagnostic was emitted
    Malformed,
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Sentinel => write!(f, "end-of-data sentinel"),
            Termination::EndOfFile => write!(f, "end of file"),
            Termination::Malformed => write!(f, "malformed record"),
        }
    }
}
