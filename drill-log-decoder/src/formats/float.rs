//! Float-value ("(Float)") record layout
//!
//! ## Record layout (38 bytes, little-endian)
//! | Offset | Size | Field                                   |
//! |--------|------|-----------------------------------------|
//! | 0      | 16   | date/time text, `YYYYMMDDHH:MM:SS`      |
//! | 16     | 3    | milliseconds, decimal text              |
//! | 19     | 5    | tag index, decimal text                 |
//! | 24     | 8    | value, IEEE-754 double                  |
//! | 32     | 1    | status flag                             |
//! | 33     | 1    | marker flag                             |
//! | 34     | 4    | internal, signed 32-bit                 |

use super::{parse_decimal, RecordLayout};
use crate::types::{RecordError, Timestamp};
use byteorder::{ByteOrder, LittleEndian};
use chrono::{NaiveDateTime, Timelike};

/// Date/time layout of the 16-byte text field
pub const TIME_FORMAT: &str = "%Y%m%d%H:%M:%S";

const TIME_LEN: usize = 16;
const MSEC_LEN: usize = 3;
const INDEX_LEN: usize = 5;

/// A float-value record before tag resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ValueRecord {
    pub timestamp: Timestamp,
    pub tag_index: u32,
    pub value: f64,
    pub status: u8,
    pub marker: u8,
    pub internal: i32,
}

impl RecordLayout for ValueRecord {
    const SIZE: usize = TIME_LEN + MSEC_LEN + INDEX_LEN + 8 + 1 + 1 + 4;

    fn decode(raw: &[u8]) -> Result<Self, RecordError> {
        let (time, rest) = raw.split_at(TIME_LEN);
        let (msec, rest) = rest.split_at(MSEC_LEN);
        let (index, rest) = rest.split_at(INDEX_LEN);

        let millis: u32 = parse_decimal("millisecond", msec)?;

        Ok(ValueRecord {
            timestamp: parse_timestamp(time, millis)?,
            tag_index: parse_decimal("tag index", index)?,
            value: LittleEndian::read_f64(&rest[0..8]),
            status: rest[8],
            marker: rest[9],
            internal: LittleEndian::read_i32(&rest[10..14]),
        })
    }
}

/// Parse the date/time text and attach the millisecond field
fn parse_timestamp(raw: &[u8], millis: u32) -> Result<Timestamp, RecordError> {
    let text = String::from_utf8_lossy(raw);
    let time_error = |reason: String| RecordError::Timestamp {
        text: text.to_string(),
        reason,
    };

    let time = NaiveDateTime::parse_from_str(text.trim(), TIME_FORMAT)
        .map_err(|e| time_error(e.to_string()))?;

    time.with_nanosecond(millis * 1_000_000)
        .ok_or_else(|| time_error(format!("millisecond value {} out of range", millis)))
}
