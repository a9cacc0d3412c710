//! Line serialization for dump records
//!
//! Every record becomes exactly one line:
//!
//! ```text
//! N:<id>:<json-data>;
//! R:<id>:<type>:<start-id>:<end-id>:<json-data>;
//! ```
//!
//! Literal newlines inside a field are replaced by the two characters `\n`
//! so that a record can never span more than one line.

use std::borrow::Cow;
use std::collections::HashSet;

use tracing::warn;

use crate::error::Result;
use crate::export::{NodeRecord, Record, RelationshipRecord};

/// Two-character sequence written in place of a literal newline.
pub const ESCAPED_NEWLINE: &str = "\\n";

/// Replace every literal newline with [`ESCAPED_NEWLINE`]
pub fn escape_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\n') {
        Cow::Owned(text.replace('\n', ESCAPED_NEWLINE))
    } else {
        Cow::Borrowed(text)
    }
}

/// Inverse of [`escape_newlines`]
///
/// Exact for any text that did not already contain the two-character
/// sequence `\n` before escaping.
pub fn unescape_newlines(text: &str) -> String {
    text.replace(ESCAPED_NEWLINE, "\n")
}

/// Serializes records into dump lines.
///
/// Keeps track of which fields have needed newline escaping so the note
/// about it is emitted once per field rather than once per record.
#[derive(Debug, Default)]
pub struct LineFormatter {
    noted: HashSet<&'static str>,
}

impl LineFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether newline escaping has fired for `field`
    pub fn has_escaped(&self, field: &str) -> bool {
        self.noted.contains(field)
    }

    fn escape(&mut self, field: &'static str, text: &str) -> String {
        let escaped = escape_newlines(text);
        if let Cow::Owned(_) = escaped {
            if self.noted.insert(field) {
                warn!("Escaped literal newlines in field '{}'", field);
            }
        }
        escaped.into_owned()
    }

    /// Serialize one record, without the trailing newline
    pub fn format_record(&mut self, record: &Record) -> Result<String> {
        match record {
            Record::Node(node) => self.format_node(node),
            Record::Relationship(rel) => self.format_relationship(rel),
        }
    }

    pub fn format_node(&mut self, node: &NodeRecord) -> Result<String> {
        let data = serde_json::to_string(&node.data)?;
        Ok(format!("N:{}:{};", node.id, self.escape("data", &data)))
    }

    pub fn format_relationship(&mut self, rel: &RelationshipRecord) -> Result<String> {
        let data = serde_json::to_string(&rel.data)?;
        Ok(format!(
            "R:{}:{}:{}:{}:{};",
            rel.id,
            self.escape("type", &rel.rel_type),
            rel.start_id,
            rel.end_id,
            self.escape("data", &data)
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_node_line() {
        let mut formatter = LineFormatter::new();
        let line = formatter
            .format_node(&NodeRecord {
                id: 3,
                data: json!({"name": "Alice"}),
            })
            .unwrap();
        assert_eq!(line, r#"N:3:{"name":"Alice"};"#);
        assert!(!formatter.has_escaped("data"));
    }

    #[test]
    fn test_relationship_with_newline_in_type() {
        let mut formatter = LineFormatter::new();
        let line = formatter
            .format_record(&Record::Relationship(RelationshipRecord {
                id: 7,
                rel_type: "KNOWS\nWELL".into(),
                start_id: 1,
                end_id: 2,
                data: json!({"a": 1}),
            }))
            .unwrap();

        assert_eq!(line, r#"R:7:KNOWS\nWELL:1:2:{"a":1};"#);
        assert!(!line.contains('\n'));
        assert!(formatter.has_escaped("type"));
        assert!(!formatter.has_escaped("data"));
    }

    #[test]
    fn test_newlines_in_data_never_break_the_line() {
        let mut formatter = LineFormatter::new();
        let line = formatter
            .format_node(&NodeRecord {
                id: 1,
                data: json!({"bio": "first\nsecond"}),
            })
            .unwrap();
        assert!(!line.contains('\n'));
        assert_eq!(line, r#"N:1:{"bio":"first\nsecond"};"#);
    }

    #[test]
    fn test_escape_round_trip() {
        let original = "line one\nline two\n\nend";
        let escaped = escape_newlines(original);
        assert!(!escaped.contains('\n'));
        assert_eq!(unescape_newlines(&escaped), original);
    }

    #[test]
    fn test_escape_borrows_when_clean() {
        assert!(matches!(escape_newlines("KNOWS"), Cow::Borrowed("KNOWS")));
    }

    #[test]
    fn test_null_data() {
        let mut formatter = LineFormatter::new();
        let line = formatter
            .format_node(&NodeRecord {
                id: 9,
                data: serde_json::Value::Null,
            })
            .unwrap();
        assert_eq!(line, "N:9:null;");
    }
}
