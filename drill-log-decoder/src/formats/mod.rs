//! Record framing shared by the tag-definition and float-value files
//!
//! Both files use the same envelope:
//! - A free-form header terminated by the first carriage return (0x0D)
//! - A sequence of `separator byte + fixed-width payload` records
//! - An optional 0x1A separator marking the end of data
//!
//! The payload layout differs per file and is described by [`RecordLayout`].

use crate::diagnostics::{Diagnostic, DiagnosticSink, FileKind};
use crate::types::{DecoderError, RecordError, Result, Termination};
use std::io::{self, BufRead, Read};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

pub mod float;
pub mod tagname;

pub use float::ValueRecord;

/// Last byte of the file header
pub const HEADER_TERMINATOR: u8 = 0x0D;

/// Separator value marking the end of data (ASCII SUB)
pub const END_SENTINEL: u8 = 0x1A;

/// A fixed-width record payload
pub trait RecordLayout: Sized {
    /// Payload size in bytes, excluding the separator
    const SIZE: usize;

    /// Decode a payload of exactly `SIZE` bytes
    fn decode(raw: &[u8]) -> std::result::Result<Self, RecordError>;
}

/// Discard everything up to and including the first header terminator
///
/// Returns the number of bytes skipped.
pub fn skip_header<R: BufRead>(reader: &mut R, path: &Path) -> Result<u64> {
    let mut skipped = 0u64;
    loop {
        let (found, used) = {
            let available = match reader.fill_buf() {
                Ok(buf) => buf,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            if available.is_empty() {
                return Err(DecoderError::MissingHeaderTerminator(path.to_path_buf()));
            }
            match available.iter().position(|&b| b == HEADER_TERMINATOR) {
                Some(pos) => (true, pos + 1),
                None => (false, available.len()),
            }
        };
        reader.consume(used);
        skipped += used as u64;
        if found {
            return Ok(skipped);
        }
    }
}

/// Lazy iterator over the records of one file
///
/// Stops at the end sentinel, at end of file, or at the first record that
/// cannot be decoded. In the last case a [`Diagnostic`] goes to the sink and
/// the stream ends; records already yielded are unaffected.
pub struct RecordStream<R, L> {
    reader: R,
    path: PathBuf,
    kind: FileKind,
    sink: Arc<dyn DiagnosticSink>,
    offset: u64,
    record_index: u64,
    termination: Option<Termination>,
    _layout: PhantomData<L>,
}

impl<R: BufRead, L: RecordLayout> RecordStream<R, L> {
    /// Skip the header and position the stream at the first record
    pub fn new(
        mut reader: R,
        path: &Path,
        kind: FileKind,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Result<Self> {
        let header_len = skip_header(&mut reader, path)?;
        log::debug!("Skipped {} header bytes in {} {:?}", header_len, kind, path);

        Ok(Self {
            reader,
            path: path.to_path_buf(),
            kind,
            sink,
            offset: header_len,
            record_index: 0,
            termination: None,
            _layout: PhantomData,
        })
    }

    /// How the stream ended, or `None` while records remain
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Number of records decoded so far
    pub fn records_read(&self) -> u64 {
        self.record_index
    }

    fn finish(&mut self, termination: Termination) -> Option<L> {
        log::debug!(
            "{} {:?} ended after {} records ({})",
            self.kind,
            self.path,
            self.record_index,
            termination
        );
        self.termination = Some(termination);
        None
    }

    fn fail(&mut self, separator: Option<u8>, raw: Vec<u8>, error: RecordError) -> Option<L> {
        let diagnostic = Diagnostic {
            file: self.path.clone(),
            kind: self.kind,
            record_index: self.record_index,
            offset: self.offset + separator.map_or(0, |_| 1),
            separator,
            raw,
            error,
        };
        self.sink.report(&diagnostic);
        self.finish(Termination::Malformed)
    }

    fn read_separator(&mut self) -> io::Result<Option<u8>> {
        let mut byte = [0u8; 1];
        loop {
            match self.reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

impl<R: BufRead, L: RecordLayout> Iterator for RecordStream<R, L> {
    type Item = L;

    fn next(&mut self) -> Option<Self::Item> {
        if self.termination.is_some() {
            return None;
        }

        let separator = match self.read_separator() {
            Ok(Some(END_SENTINEL)) => return self.finish(Termination::Sentinel),
            Ok(Some(byte)) => byte,
            Ok(None) => return self.finish(Termination::EndOfFile),
            Err(e) => return self.fail(None, Vec::new(), RecordError::Io(e.to_string())),
        };

        let mut raw = Vec::with_capacity(L::SIZE);
        if let Err(e) = (&mut self.reader).take(L::SIZE as u64).read_to_end(&mut raw) {
            return self.fail(Some(separator), raw, RecordError::Io(e.to_string()));
        }
        if raw.len() < L::SIZE {
            let actual = raw.len();
            return self.fail(
                Some(separator),
                raw,
                RecordError::Truncated {
                    expected: L::SIZE,
                    actual,
                },
            );
        }

        match L::decode(&raw) {
            Ok(record) => {
                log::trace!(
                    "{} record {} at offset {}",
                    self.kind,
                    self.record_index,
                    self.offset + 1
                );
                self.offset += 1 + L::SIZE as u64;
                self.record_index += 1;
                Some(record)
            }
            Err(error) => self.fail(Some(separator), raw, error),
        }
    }
}

/// Decode a padded text field, falling back to Latin-1 for non-UTF-8 bytes
pub(crate) fn decode_text(raw: &[u8]) -> String {
    let text = match std::str::from_utf8(raw) {
        Ok(text) => text.to_string(),
        Err(_) => raw.iter().map(|&b| b as char).collect(),
    };
    trim_padding(&text).to_string()
}

fn trim_padding(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '\0')
}

/// Parse a decimal-digit text field into an integer
pub(crate) fn parse_decimal<T>(field: &'static str, raw: &[u8]) -> std::result::Result<T, RecordError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let text = std::str::from_utf8(raw).map_err(|e| RecordError::Field {
        field,
        text: String::from_utf8_lossy(raw).into_owned(),
        reason: e.to_string(),
    })?;

    trim_padding(text).parse::<T>().map_err(|e| RecordError::Field {
        field,
        text: text.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::CollectingSink;
    use std::io::Cursor;

    /// Two-byte test layout holding a decimal number
    #[derive(Debug, PartialEq)]
    struct Pair(u8);

    impl RecordLayout for Pair {
        const SIZE: usize = 2;

        fn decode(raw: &[u8]) -> std::result::Result<Self, RecordError> {
            parse_decimal("pair", raw).map(Pair)
        }
    }

    fn stream(bytes: &[u8], sink: Arc<CollectingSink>) -> Result<RecordStream<Cursor<Vec<u8>>, Pair>> {
        RecordStream::new(
            Cursor::new(bytes.to_vec()),
            Path::new("test.DAT"),
            FileKind::Tagname,
            sink,
        )
    }

    #[test]
    fn test_skip_header_discards_terminator() {
        let mut reader = Cursor::new(b"any\x00header\xff\rrest".to_vec());
        let skipped = skip_header(&mut reader, Path::new("h.DAT")).unwrap();
        assert_eq!(skipped, 12);

        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "rest");
    }

    #[test]
    fn test_skip_header_spans_buffer_refills() {
        let mut bytes = vec![b'x'; 100];
        bytes.push(HEADER_TERMINATOR);
        bytes.extend_from_slice(b"ok");
        let mut reader = io::BufReader::with_capacity(8, Cursor::new(bytes));

        assert_eq!(skip_header(&mut reader, Path::new("h.DAT")).unwrap(), 101);
    }

    #[test]
    fn test_skip_header_without_terminator_fails() {
        let mut reader = Cursor::new(b"no terminator here".to_vec());
        let result = skip_header(&mut reader, Path::new("h.DAT"));
        assert!(matches!(result, Err(DecoderError::MissingHeaderTerminator(_))));
    }

    #[test]
    fn test_stream_stops_at_sentinel() {
        let sink = Arc::new(CollectingSink::new());
        let mut records = stream(b"hdr\r 01 02\x1a 03", sink.clone()).unwrap();

        assert_eq!(records.next(), Some(Pair(1)));
        assert_eq!(records.next(), Some(Pair(2)));
        assert_eq!(records.next(), None);
        assert_eq!(records.next(), None);
        assert_eq!(records.termination(), Some(Termination::Sentinel));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_stream_stops_at_eof() {
        let sink = Arc::new(CollectingSink::new());
        let mut records = stream(b"\r 07", sink.clone()).unwrap();

        assert_eq!(records.by_ref().collect::<Vec<_>>(), vec![Pair(7)]);
        assert_eq!(records.termination(), Some(Termination::EndOfFile));
        assert_eq!(records.records_read(), 1);
    }

    #[test]
    fn test_truncated_payload_reports_diagnostic() {
        let sink = Arc::new(CollectingSink::new());
        let mut records = stream(b"\r 07|4", sink.clone()).unwrap();

        assert_eq!(records.by_ref().collect::<Vec<_>>(), vec![Pair(7)]);
        assert_eq!(records.termination(), Some(Termination::Malformed));

        let diagnostics = sink.diagnostics();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].separator, Some(b'|'));
        assert_eq!(diagnostics[0].raw, b"4".to_vec());
        assert_eq!(diagnostics[0].record_index, 1);
        assert_eq!(diagnostics[0].offset, 5);
        assert_eq!(
            diagnostics[0].error,
            RecordError::Truncated {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn test_bad_field_ends_stream() {
        let sink = Arc::new(CollectingSink::new());
        let records: Vec<Pair> = stream(b"\r 01 x2 03", sink.clone()).unwrap().collect();

        assert_eq!(records, vec![Pair(1)]);
        assert!(matches!(
            sink.diagnostics()[0].error,
            RecordError::Field { field: "pair", .. }
        ));
    }

    #[test]
    fn test_decode_text_latin1_fallback() {
        assert_eq!(decode_text(b"  Temp\xb0C  \0\0"), "Temp\u{b0}C");
        assert_eq!(decode_text(b"[PLC]CABLESPEED   "), "[PLC]CABLESPEED");
    }
}
