//! Comment cleanup before embedding.

use std::collections::HashSet;

use services::hash::short_hash;

/// A trimmed, non-empty comment with its content digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CleanComment {
    pub video_id: String,
    pub text: String,
    /// First 16 hex chars of SHA-256 over `text`; dedup key and id suffix.
    pub content_hash: String,
}

/// Trims, drops blanks and removes exact duplicates (after trim), keeping
/// first-occurrence order.
pub fn normalize_comments<S: AsRef<str>>(video_id: &str, raw: &[S]) -> Vec<CleanComment> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for r in raw {
        let text = r.as_ref().trim();
        if text.is_empty() {
            continue;
        }
        let content_hash = short_hash(text);
        if !seen.insert(content_hash.clone()) {
            continue;
        }
        out.push(CleanComment {
            video_id: video_id.to_string(),
            text: text.to_string(),
            content_hash,
        });
    }

    out
}
