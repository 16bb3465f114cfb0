//! Diagnostics for records that end a stream early
//!
//! Logger files are routinely cut short by power loss, so a bad trailing record
//! is not an error for the caller: the stream stops and a [`Diagnostic`] is
//! handed to the session's [`DiagnosticSink`].

use crate::types::RecordError;
use std::fmt;
use std::path::PathBuf;
use std::sync::Mutex;

/// Which of the two session files a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Tag-definition file
    Tagname,
    /// Float-value file
    Float,
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Tagname => write!(f, "tag file"),
            FileKind::Float => write!(f, "float file"),
        }
    }
}

/// A record that could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File the record was read from
    pub file: PathBuf,
    pub kind: FileKind,
    /// Zero-based record number within the file
    pub record_index: u64,
    /// Byte offset of the record payload (after the separator)
    pub offset: u64,
    /// Separator byte preceding the payload, if one was read
    pub separator: Option<u8>,
    /// Payload bytes actually read
    pub raw: Vec<u8>,
    pub error: RecordError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error decoding record {} of {} {:?} at offset {}: err='{}', raw={:02X?}, sep=",
            self.record_index,
            self.kind,
            self.file,
            self.offset,
            self.error,
            self.raw,
        )?;
        match self.separator {
            Some(byte) => write!(f, "0x{:02X}", byte),
            None => write!(f, "none"),
        }
    }
}

/// Receiver for decode diagnostics
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default sink: forwards diagnostics to the `log` facade
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}

/// Sink that keeps every diagnostic for later inspection
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the diagnostics collected so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.diagnostics.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: &Diagnostic) {
        log::debug!("{}", diagnostic);
        match self.diagnostics.lock() {
            Ok(mut guard) => guard.push(diagnostic.clone()),
            Err(poisoned) => poisoned.into_inner().push(diagnostic.clone()),
        }
    }
}
