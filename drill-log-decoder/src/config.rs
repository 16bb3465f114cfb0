//! Decoder configuration types
//!
//! The decoder needs very little configuration: the file-name tokens used to
//! pair a tag-definition file with its float-value file, and the read buffer
//! size. Everything else about the format is fixed.

use serde::{Deserialize, Deserializer, Serialize};

/// Configuration for the decoder library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Token identifying the tag-definition file name
    #[serde(default = "default_tag_token")]
    pub tag_token: String,

    /// Replacement token giving the float-value file name
    #[serde(default = "default_value_token")]
    pub value_token: String,

    /// Capacity of the buffered reader used for each file (bytes)
    #[serde(
        default = "default_buffer_capacity",
        deserialize_with = "deserialize_buffer_capacity"
    )]
    pub buffer_capacity: usize,
}

fn default_tag_token() -> String {
    "(Tagname)".to_string()
}

fn default_value_token() -> String {
    "(Float)".to_string()
}

fn default_buffer_capacity() -> usize {
    64 * 1024
}

// A zero-sized BufReader never fills, which reads as an empty file
fn deserialize_buffer_capacity<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(usize::deserialize(deserializer)?.max(1))
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            tag_token: default_tag_token(),
            value_token: default_value_token(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl DecoderConfig {
    /// Create a new decoder configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the tag/value file-name tokens
    pub fn with_tokens(mut self, tag_token: impl Into<String>, value_token: impl Into<String>) -> Self {
        self.tag_token = tag_token.into();
        self.value_token = value_token.into();
        self
    }

    /// Builder method: set the read buffer capacity
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity.max(1);
        self
    }
}
