//! Tag-definition ("(Tagname)") record layout
//!
//! ## Record layout (263 bytes)
//! | Offset | Size | Field                          |
//! |--------|------|--------------------------------|
//! | 0      | 256  | name, space padded             |
//! | 256    | 4    | index, decimal text            |
//! | 260    | 2    | type, decimal text             |
//! | 262    | 1    | dtype, decimal text            |

use super::{decode_text, parse_decimal, RecordLayout};
use crate::types::{RecordError, Tag};

const NAME_LEN: usize = 256;
const INDEX_LEN: usize = 4;
const TYPE_LEN: usize = 2;
const DTYPE_LEN: usize = 1;

impl RecordLayout for Tag {
    const SIZE: usize = NAME_LEN + INDEX_LEN + TYPE_LEN + DTYPE_LEN;

    fn decode(raw: &[u8]) -> Result<Self, RecordError> {
        let (name, rest) = raw.split_at(NAME_LEN);
        let (index, rest) = rest.split_at(INDEX_LEN);
        let (tag_type, dtype) = rest.split_at(TYPE_LEN);

        Ok(Tag {
            name: decode_text(name),
            index: parse_decimal("index", index)?,
            tag_type: parse_decimal("type", tag_type)?,
            dtype: parse_decimal("dtype", &dtype[..DTYPE_LEN])?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, index: &str, tag_type: &str, dtype: &str) -> Vec<u8> {
        let mut raw = format!("{:<256}", name).into_bytes();
        raw.extend_from_slice(index.as_bytes());
        raw.extend_from_slice(tag_type.as_bytes());
        raw.extend_from_slice(dtype.as_bytes());
        raw
    }

    #[test]
    fn test_decode_tag() {
        let raw = payload("[PLC]WIRESPOOLEDOUT", "  17", " 3", "2");
        assert_eq!(raw.len(), Tag::SIZE);

        let tag = Tag::decode(&raw).unwrap();
        assert_eq!(tag.name, "[PLC]WIRESPOOLEDOUT");
        assert_eq!(tag.index, 17);
        assert_eq!(tag.tag_type, 3);
        assert_eq!(tag.dtype, 2);
    }

    #[test]
    fn test_decode_zero_padded_fields() {
        let tag = Tag::decode(&payload("[PLC]IMUYAW", "0042", "01", "8")).unwrap();
        assert_eq!(tag.index, 42);
        assert_eq!(tag.tag_type, 1);
    }

    #[test]
    fn test_non_numeric_index_is_rejected() {
        let err = Tag::decode(&payload("[PLC]IMUYAW", "ab12", "01", "8")).unwrap_err();
        assert!(matches!(err, RecordError::Field { field: "index", .. }));
    }
}
