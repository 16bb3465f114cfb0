//! Tag table
//!
//! Maps tag indices to the channel descriptors read from a tag-definition
//! file. Built once per session and read-only afterwards.

use crate::diagnostics::{DiagnosticSink, FileKind};
use crate::formats::RecordStream;
use crate::types::{DecoderError, Result, Tag, TagRef, Termination};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

/// All tags of one logger session, keyed by index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TagTable {
    tags: HashMap<u32, Tag>,
    termination: Option<Termination>,
}

impl TagTable {
    /// Create an empty tag table
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a tag-definition file
    ///
    /// Missing files and headers without a terminator are errors. A malformed
    /// or truncated record ends parsing; the tags before it are kept and the
    /// problem is reported to `sink`.
    pub fn from_file(path: &Path, buffer_capacity: usize, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        log::info!("Parsing tag file: {:?}", path);

        if !path.exists() {
            return Err(DecoderError::NotFound(path.to_path_buf()));
        }

        let file = File::open(path)?;
        let reader = BufReader::with_capacity(buffer_capacity.max(1), file);
        let mut records: RecordStream<_, Tag> = RecordStream::new(reader, path, FileKind::Tagname, sink)?;

        let mut table = TagTable::new();
        for tag in records.by_ref() {
            table.insert(tag);
        }
        table.termination = records.termination();

        log::info!("Parsed {} tags from {:?}", table.len(), path);
        Ok(table)
    }

    /// Add a tag, replacing any previous tag with the same index
    pub fn insert(&mut self, tag: Tag) -> Option<Tag> {
        let previous = self.tags.insert(tag.index, tag);
        if let Some(ref old) = previous {
            log::debug!("Tag index {} redefined (was {:?})", old.index, old.name);
        }
        previous
    }

    /// Look up a tag by index
    pub fn get(&self, index: u32) -> Option<&Tag> {
        self.tags.get(&index)
    }

    /// Resolve an index, falling back to [`TagRef::Unknown`]
    pub fn resolve(&self, index: u32) -> TagRef {
        match self.tags.get(&index) {
            Some(tag) => TagRef::Known(tag.clone()),
            None => TagRef::Unknown { index },
        }
    }

    /// Find a tag by its display name
    pub fn find_by_name(&self, name: &str) -> Option<&Tag> {
        self.tags.values().find(|tag| tag.name == name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Tags ordered by index
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        let mut tags: Vec<&Tag> = self.tags.values().collect();
        tags.sort_by_key(|tag| tag.index);
        tags.into_iter()
    }

    /// How parsing of the tag file ended (`None` for tables built in memory)
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }
}

impl FromIterator<Tag> for TagTable {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        let mut table = TagTable::new();
        for tag in iter {
            table.insert(tag);
        }
        table
    }
}
