//! Source metadata stamp embedded in generated subtitle files.
//!
//! The stamp records which remote revision a subtitle file was produced
//! from. It is stored as the two leading comment lines of an SRT file and
//! compared byte-for-byte; the modified value is never parsed as a date.
//! No other module touches the comment syntax.

use std::fs;
use std::path::Path;

use crate::models::FileMetadata;

/// Provenance record for a generated subtitle file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceStamp {
    pub owner: String,
    pub modified: String,
}

impl SourceStamp {
    /// Build a stamp from current remote metadata.
    pub fn from_metadata(metadata: &FileMetadata) -> Self {
        Self {
            owner: metadata.owner_display().trim().to_string(),
            modified: metadata.modified_display().trim().to_string(),
        }
    }

    /// Comment lines to emit at the top of an SRT file.
    pub fn header_lines(&self) -> [String; 2] {
        [
            format!("# Owner: {}", self.owner),
            format!("# Modified: {}", self.modified),
        ]
    }

    /// Read the stamp from an existing subtitle file.
    ///
    /// Returns `None` when the file is missing, unreadable, or carries no
    /// complete header.
    pub fn read_from_file(path: &Path) -> Option<Self> {
        let content = fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse the leading comment block of subtitle content.
    ///
    /// Parsing stops at the first blank or non-comment line.
    pub fn parse(content: &str) -> Option<Self> {
        let mut owner = None;
        let mut modified = None;

        for line in content.lines() {
            if line.is_empty() {
                break;
            }
            let Some(payload) = line.strip_prefix("# ") else {
                break;
            };
            if let Some((key, value)) = payload.split_once(':') {
                match key.trim() {
                    "Owner" => owner = Some(value.trim().to_string()),
                    "Modified" => modified = Some(value.trim().to_string()),
                    _ => {}
                }
            }
        }

        match (owner, modified) {
            (Some(owner), Some(modified)) => Some(Self { owner, modified }),
            _ => None,
        }
    }

    /// Whether this stamp matches current remote metadata exactly.
    pub fn matches(&self, metadata: &FileMetadata) -> bool {
        self.owner == metadata.owner_display().trim()
            && self.modified == metadata.modified_display().trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Owner;

    fn metadata(owner: &str, modified: &str) -> FileMetadata {
        FileMetadata {
            id: "f1".to_string(),
            name: "lecture.mp4".to_string(),
            mime_type: Some("video/mp4".to_string()),
            size: None,
            modified_time: Some(modified.to_string()),
            owners: vec![Owner {
                display_name: Some(owner.to_string()),
            }],
        }
    }

    #[test]
    fn test_header_roundtrip() {
        let stamp = SourceStamp::from_metadata(&metadata("Alice", "2024-01-01T00:00:00Z"));
        let content = stamp.header_lines().join("\n");
        assert_eq!(SourceStamp::parse(&content).unwrap(), stamp);
    }

    #[test]
    fn test_parse_stops_at_non_comment() {
        let content = "# Owner: Alice\n1\n00:00:00,000 --> 00:00:01,000\nhello\n";
        // Header incomplete: Modified never appears before the first block
        assert!(SourceStamp::parse(content).is_none());
    }

    #[test]
    fn test_parse_stops_at_blank_line() {
        let content = "# Owner: Alice\n\n# Modified: 2024-01-01T00:00:00Z\n";
        assert!(SourceStamp::parse(content).is_none());
    }

    #[test]
    fn test_parse_ignores_unknown_keys() {
        let content = "# Owner: Alice\n# Tool: whisper\n# Modified: 2024-01-01T00:00:00Z\n\n";
        let stamp = SourceStamp::parse(content).unwrap();
        assert_eq!(stamp.owner, "Alice");
        assert_eq!(stamp.modified, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_matches_is_exact() {
        let stamp = SourceStamp {
            owner: "Alice".to_string(),
            modified: "2024-01-01T00:00:00Z".to_string(),
        };
        assert!(stamp.matches(&metadata("Alice", "2024-01-01T00:00:00Z")));
        assert!(!stamp.matches(&metadata("Bob", "2024-01-01T00:00:00Z")));
        assert!(!stamp.matches(&metadata("Alice", "2024-01-01T00:00:01Z")));
    }

    #[test]
    fn test_read_missing_file() {
        assert!(SourceStamp::read_from_file(Path::new("/nonexistent/sub.srt")).is_none());
    }
}
