//! Index name <-> backing table name codec

use super::errors::{IndexError, IndexResult};

/// Suffix appended to an index name to form its backing table name
pub const BACKING_TABLE_SUFFIX: &str = "_index";

/// Returns the backing table name for an index.
pub fn encode_table_name(index_name: &str) -> String {
    format!("{}{}", index_name, BACKING_TABLE_SUFFIX)
}

/// Recovers the index name from a backing table name.
///
/// The table name must be longer than the suffix and end with it.
pub fn decode_table_name(table_name: &str) -> IndexResult<String> {
    if table_name.len() <= BACKING_TABLE_SUFFIX.len() {
        return Err(IndexError::malformed_backing_name(table_name));
    }
    table_name
        .strip_suffix(BACKING_TABLE_SUFFIX)
        .map(str::to_string)
        .ok_or_else(|| IndexError::malformed_backing_name(table_name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexErrorCode;

    #[test]
    fn test_encode() {
        assert_eq!(encode_table_name("by_email"), "by_email_index");
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode_table_name("myidx_index").unwrap(), "myidx");
        assert_eq!(decode_table_name("a_index").unwrap(), "a");
    }

    #[test]
    fn test_decode_rejects_short_and_unsuffixed() {
        for name in ["short", "abc_inde", "_index", "", "index"] {
            let err = decode_table_name(name).unwrap_err();
            assert_eq!(err.code(), IndexErrorCode::MalformedBackingName, "{}", name);
        }
    }

    #[test]
    fn test_round_trip() {
        for name in ["a", "by_email", "x_index", "Mixed Case", "ünïcode"] {
            assert_eq!(decode_table_name(&encode_table_name(name)).unwrap(), name);
        }
    }
}
