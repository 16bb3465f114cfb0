//! Drill Log Decoder Library
//!
//! Decodes the binary data-logger files written by the drill rig's PLC: a
//! tag-definition file (`... (Tagname).DAT`) describing the logged channels and
//! a paired float-value file (`... (Float).DAT`) holding timestamped samples.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on decoding:
//! - Parses the tag-definition file into a [`TagTable`]
//! - Streams the float-value file as a lazy sequence of [`Sample`]s
//! - Tolerates truncated or corrupt trailing records (power loss is common)
//! - Pivots a decoded series into a [`WideTable`] for random access
//!
//! The library does NOT:
//! - Smooth, filter, or clean values
//! - Detect drill runs or cutting state
//! - Plot anything
//!
//! Those belong to downstream analysis; the `drill-log` CLI is a thin driver.
//!
//! # Example Usage
//!
//! ```no_run
//! use drill_log_decoder::{CollectingSink, DecoderConfig, LogSession};
//! use std::sync::Arc;
//!
//! let sink = Arc::new(CollectingSink::new());
//! let session = LogSession::open_with(
//!     "DataLog/2024 02 20 0000 BigRAID (Tagname).DAT",
//!     DecoderConfig::new(),
//!     sink.clone(),
//! ).unwrap();
//!
//! let mut samples = session.samples().unwrap();
//! for sample in samples.by_ref() {
//!     match sample.tag.name() {
//!         Some(name) => println!("{} {} = {}", sample.timestamp, name, sample.value),
//!         None => println!("{} tag #{} (unknown)", sample.timestamp, sample.tag.index()),
//!     }
//! }
//!
//! println!("Stream ended: {:?}", samples.termination());
//! for diagnostic in sink.diagnostics() {
//!     eprintln!("{}", diagnostic);
//! }
//! ```

// Public modules
pub mod config;
pub mod decoder;
pub mod diagnostics;
pub mod table;
pub mod tag_table;
pub mod types;

// Record framing and layouts
pub mod formats;

// Re-export main types for convenience
pub use config::DecoderConfig;
pub use decoder::{value_file_path, LogSession, Samples};
pub use diagnostics::{CollectingSink, Diagnostic, DiagnosticSink, FileKind, LogSink};
pub use table::WideTable;
pub use tag_table::TagTable;
pub use types::{
    DecoderError, RecordError, Result, Sample, Tag, TagRef, Termination, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
