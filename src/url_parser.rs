//! URL parser for resolving Google Drive references from URLs or raw IDs.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{Result, ScribeError};

/// Regex patterns for Google Drive URLs.
static FOLDER_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/drive/(?:u/\d+/)?folders/([a-zA-Z0-9_-]+)")
        .expect("Invalid folder URL regex")
});

static FILE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/file/d/([a-zA-Z0-9_-]+)")
        .expect("Invalid file URL regex")
});

/// Matches `open?id=<ID>` and `uc?export=download&id=<ID>` style links.
static QUERY_ID_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://drive\.google\.com/(?:open|uc)\?(?:[^&#]*&)*id=([a-zA-Z0-9_-]+)")
        .expect("Invalid query-id URL regex")
});

/// Valid Google Drive ID pattern (alphanumeric, underscore, hyphen).
static ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid ID regex"));

/// What a resolved reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    File,
    Folder,
}

/// A file or folder reference resolved from a URL or raw ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRef {
    pub id: String,
    pub kind: RefKind,
}

/// Resolve a Google Drive reference from a URL or raw ID.
///
/// Supports the following URL formats:
/// - `https://drive.google.com/drive/folders/<ID>`
/// - `https://drive.google.com/drive/u/0/folders/<ID>`
/// - `https://drive.google.com/file/d/<ID>/view`
/// - `https://drive.google.com/open?id=<ID>`
/// - `https://drive.google.com/uc?export=download&id=<ID>`
/// - Raw ID string
///
/// URL patterns determine whether the reference is a file or a folder. A raw
/// ID carries no such information, so it adopts `assumed` (the CLI knows which
/// flag the ID arrived on).
///
/// # Examples
///
/// ```
/// use drive_scribe::url_parser::{parse_ref, RefKind};
///
/// let r = parse_ref("https://drive.google.com/file/d/1abc123/view", RefKind::File).unwrap();
/// assert_eq!(r.id, "1abc123");
/// assert_eq!(r.kind, RefKind::File);
///
/// let r = parse_ref("1abc123", RefKind::Folder).unwrap();
/// assert_eq!(r.kind, RefKind::Folder);
/// ```
pub fn parse_ref(url_or_id: &str, assumed: RefKind) -> Result<RemoteRef> {
    let trimmed = url_or_id.trim();

    // Try folder URL pattern
    if let Some(captures) = FOLDER_URL_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Ok(RemoteRef {
                id: id.as_str().to_string(),
                kind: RefKind::Folder,
            });
        }
    }

    // Try file URL pattern
    if let Some(captures) = FILE_URL_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Ok(RemoteRef {
                id: id.as_str().to_string(),
                kind: RefKind::File,
            });
        }
    }

    // Try open/uc query-parameter pattern
    if let Some(captures) = QUERY_ID_URL_REGEX.captures(trimmed) {
        if let Some(id) = captures.get(1) {
            return Ok(RemoteRef {
                id: id.as_str().to_string(),
                kind: RefKind::File,
            });
        }
    }

    // Check if it's a raw ID
    if ID_REGEX.is_match(trimmed) && !trimmed.is_empty() {
        return Ok(RemoteRef {
            id: trimmed.to_string(),
            kind: assumed,
        });
    }

    Err(ScribeError::InvalidReference(url_or_id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_folder_url() {
        let url = "https://drive.google.com/drive/folders/1abc123XYZ";
        let r = parse_ref(url, RefKind::File).unwrap();
        assert_eq!(r.id, "1abc123XYZ");
        assert_eq!(r.kind, RefKind::Folder);
    }

    #[test]
    fn test_parse_folder_url_with_user() {
        let url = "https://drive.google.com/drive/u/0/folders/1abc123XYZ";
        assert_eq!(parse_ref(url, RefKind::Folder).unwrap().id, "1abc123XYZ");

        let url = "https://drive.google.com/drive/u/2/folders/1abc123XYZ";
        assert_eq!(parse_ref(url, RefKind::Folder).unwrap().id, "1abc123XYZ");
    }

    #[test]
    fn test_parse_file_url() {
        let url = "https://drive.google.com/file/d/1abc123XYZ/view";
        let r = parse_ref(url, RefKind::Folder).unwrap();
        assert_eq!(r.id, "1abc123XYZ");
        assert_eq!(r.kind, RefKind::File);

        let url = "https://drive.google.com/file/d/1abc123XYZ/view?usp=sharing";
        assert_eq!(parse_ref(url, RefKind::File).unwrap().id, "1abc123XYZ");
    }

    #[test]
    fn test_parse_open_url() {
        let url = "https://drive.google.com/open?id=1abc123XYZ";
        let r = parse_ref(url, RefKind::Folder).unwrap();
        assert_eq!(r.id, "1abc123XYZ");
        assert_eq!(r.kind, RefKind::File);
    }

    #[test]
    fn test_parse_uc_url() {
        let url = "https://drive.google.com/uc?id=1abc123XYZ&export=download";
        assert_eq!(parse_ref(url, RefKind::File).unwrap().id, "1abc123XYZ");

        let url = "https://drive.google.com/uc?export=download&id=1abc123XYZ";
        assert_eq!(parse_ref(url, RefKind::File).unwrap().id, "1abc123XYZ");
    }

    #[test]
    fn test_parse_raw_id_adopts_assumed_kind() {
        let r = parse_ref("1abc123XYZ", RefKind::File).unwrap();
        assert_eq!(r.kind, RefKind::File);

        let r = parse_ref("abc-123_XYZ", RefKind::Folder).unwrap();
        assert_eq!(r.id, "abc-123_XYZ");
        assert_eq!(r.kind, RefKind::Folder);
    }

    #[test]
    fn test_parse_with_whitespace() {
        assert_eq!(
            parse_ref("  1abc123XYZ  ", RefKind::File).unwrap().id,
            "1abc123XYZ"
        );
    }

    #[test]
    fn test_invalid_input() {
        assert!(parse_ref("https://example.com/folder/123", RefKind::File).is_err());
        assert!(parse_ref("", RefKind::File).is_err());
        assert!(parse_ref("   ", RefKind::Folder).is_err());
    }
}
