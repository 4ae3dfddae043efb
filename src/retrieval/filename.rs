//! Local filename derivation from archive URLs.
//!
//! The local name is the URL's last path segment, sanitized for the local
//! filesystem. Nothing here consults the server; a repeated run derives the
//! same name and overwrites the earlier file.

use url::Url;

/// Fallback when the URL path yields nothing usable.
const DEFAULT_FILENAME: &str = "download.bin";

/// Linux NAME_MAX.
const NAME_MAX: usize = 255;

/// Derive a safe local filename from `url`.
pub fn derive_filename(url: &str) -> String {
    let candidate = match last_path_segment(url) {
        Some(seg) => seg,
        None => return DEFAULT_FILENAME.to_string(),
    };
    let sanitized = sanitize(&candidate);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Last non-empty path segment of the URL, query and fragment excluded.
fn last_path_segment(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .next_back()
        .map(|s| s.to_string())
}

/// Replace path separators, NUL, control chars, and whitespace with `_`,
/// collapse runs, trim leading/trailing dots and underscores, and cap at
/// NAME_MAX bytes.
fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_underscore = false;

    for c in name.chars() {
        let mapped = if c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if mapped == '_' {
            if !prev_underscore {
                out.push('_');
            }
            prev_underscore = true;
        } else {
            out.push(mapped);
            prev_underscore = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    if trimmed.len() <= NAME_MAX {
        return trimmed.to_string();
    }
    let mut take = NAME_MAX;
    while take > 0 && !trimmed.is_char_boundary(take) {
        take -= 1;
    }
    trimmed[..take].to_string()
}
