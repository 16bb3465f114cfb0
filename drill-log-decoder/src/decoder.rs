//! Main decoder API
//!
//! [`LogSession`] is the entry point: it pairs a tag-definition file with its
//! float-value file, parses the tag table once, and hands out lazy
//! [`Samples`] traversals of the value file.

use crate::config::DecoderConfig;
use crate::diagnostics::{DiagnosticSink, FileKind, LogSink};
use crate::formats::{RecordStream, ValueRecord};
use crate::table::WideTable;
use crate::tag_table::TagTable;
use crate::types::{DecoderError, Result, Sample, Termination};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Derive the float-value file path from a tag-definition file path
///
/// The tag token in the file name is replaced by the value token; the parent
/// directory stays the same.
///
/// # Example
/// ```
/// use drill_log_decoder::{value_file_path, DecoderConfig};
/// use std::path::Path;
///
/// let path = value_file_path(
///     Path::new("DataLog/2024 02 20 0000 BigRAID (Tagname).DAT"),
///     &DecoderConfig::new(),
/// ).unwrap();
/// assert_eq!(path, Path::new("DataLog/2024 02 20 0000 BigRAID (Float).DAT"));
/// ```
pub fn value_file_path(tag_file: &Path, config: &DecoderConfig) -> Result<PathBuf> {
    let name = tag_file
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !config.tag_token.is_empty() && n.contains(config.tag_token.as_str()))
        .ok_or_else(|| DecoderError::InvalidFileName(tag_file.to_path_buf()))?;

    let value_name = name.replace(config.tag_token.as_str(), &config.value_token);
    Ok(match tag_file.parent() {
        Some(parent) => parent.join(value_name),
        None => PathBuf::from(value_name),
    })
}

/// One logger session: a tag file, its float file, and the parsed tag table
pub struct LogSession {
    tag_file: PathBuf,
    value_file: PathBuf,
    config: DecoderConfig,
    tags: TagTable,
    sink: Arc<dyn DiagnosticSink>,
}

impl LogSession {
    /// Open a session with the default configuration
    ///
    /// Decode diagnostics are forwarded to the `log` facade.
    ///
    /// # Example
    /// ```no_run
    /// use drill_log_decoder::LogSession;
    ///
    /// let session = LogSession::open("DataLog/2024 02 20 0000 BigRAID (Tagname).DAT").unwrap();
    /// for sample in session.samples().unwrap() {
    ///     println!("{} {} = {}", sample.timestamp, sample.tag, sample.value);
    /// }
    /// ```
    pub fn open(tag_file: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(tag_file, DecoderConfig::new(), Arc::new(LogSink))
    }

    /// Open a session with an explicit configuration and diagnostic sink
    ///
    /// Fails if either file is missing, if the tag file name lacks the tag
    /// token, or if the tag file header is never terminated.
    pub fn open_with(
        tag_file: impl AsRef<Path>,
        config: DecoderConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let tag_file = tag_file.as_ref();
        log::info!("Opening log session: {:?}", tag_file);

        if !tag_file.exists() {
            return Err(DecoderError::NotFound(tag_file.to_path_buf()));
        }

        let value_file = value_file_path(tag_file, &config)?;
        if !value_file.exists() {
            return Err(DecoderError::NotFound(value_file));
        }

        let tags = TagTable::from_file(tag_file, config.buffer_capacity, Arc::clone(&sink))?;

        Ok(Self {
            tag_file: tag_file.to_path_buf(),
            value_file,
            config,
            tags,
            sink,
        })
    }

    pub fn tag_file(&self) -> &Path {
        &self.tag_file
    }

    pub fn value_file(&self) -> &Path {
        &self.value_file
    }

    /// The tag table parsed when the session was opened
    pub fn tags(&self) -> &TagTable {
        &self.tags
    }

    /// Start a new traversal of the float-value file
    ///
    /// Every call re-opens the file and re-scans it from the header, so
    /// traversals are independent. The file handle is released when the
    /// returned iterator is dropped.
    pub fn samples(&self) -> Result<Samples<'_>> {
        log::debug!("Decoding float file: {:?}", self.value_file);

        if !self.value_file.exists() {
            return Err(DecoderError::NotFound(self.value_file.clone()));
        }

        let file = File::open(&self.value_file)?;
        let reader = BufReader::with_capacity(self.config.buffer_capacity.max(1), file);
        let records = RecordStream::new(reader, &self.value_file, FileKind::Float, Arc::clone(&self.sink))?;

        Ok(Samples {
            records,
            tags: &self.tags,
        })
    }

    /// Decode the whole session into a wide table
    pub fn to_table(&self) -> Result<WideTable> {
        Ok(WideTable::from_samples(self.samples()?))
    }
}

/// Lazy sequence of decoded samples, in on-disk order
pub struct Samples<'a> {
    records: RecordStream<BufReader<File>, ValueRecord>,
    tags: &'a TagTable,
}

impl Samples<'_> {
    /// How the traversal ended, or `None` while samples remain
    ///
    /// `Some(Termination::Malformed)` means the file has a truncated or corrupt
    /// tail; the diagnostic went to the session's sink.
    pub fn termination(&self) -> Option<Termination> {
        self.records.termination()
    }

    /// Number of samples yielded so far
    pub fn samples_read(&self) -> u64 {
        self.records.records_read()
    }
}

impl Iterator for Samples<'_> {
    type Item = Sample;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;
        let tag = self.tags.resolve(record.tag_index);
        if tag.is_unknown() {
            log::trace!("Unknown tag index {} at {}", record.tag_index, record.timestamp);
        }

        Some(Sample {
            timestamp: record.timestamp,
            tag,
            value: record.value,
            status: record.status,
            marker: record.marker,
            internal: record.internal,
        })
    }
}
