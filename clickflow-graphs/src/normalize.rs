//! URL normalization — the canonical key used for node identity.
//!
//! A normalized key is lower-cased, percent-decoded, and stripped of
//! trailing slashes. Absolute URLs pointing at an internal host keep only
//! the decoded path; other absolute URLs keep `host + decoded path`.
//! Anything that does not parse as an absolute URL is treated as
//! already-a-path. The function is total and idempotent over its own
//! outputs.

use std::fmt;

use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use url::Url;

/// Hosts treated as "the tracked site itself" rather than an external
/// referrer. The snippet reports relative paths for same-site navigation,
/// but older snippet versions sent absolute localhost URLs.
const INTERNAL_HOSTS: [&str; 3] = ["localhost", "127.0.0.1", "dummy"];

/// Canonical node identity: lower-cased, decoded, trailing-slash-trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalize a raw URL or path string into its canonical key.
pub fn normalize(raw: &str) -> NormalizedUrl {
    let key = match Url::parse(raw.trim()) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !is_internal_host(host) => {
                format!("{}{}", host, decode(parsed.path()))
            }
            // Internal or host-less URLs keep only the path.
            _ => decode(parsed.path()),
        },
        // Relative paths and malformed strings are already path-like.
        Err(_) => decode(raw),
    };

    let trimmed = key
        .trim_start()
        .trim_end_matches(|c: char| c == '/' || c.is_whitespace());
    NormalizedUrl(trimmed.to_lowercase())
}

fn is_internal_host(host: &str) -> bool {
    INTERNAL_HOSTS.contains(&host.to_ascii_lowercase().as_str())
}

/// Percent-decode, falling back to the raw bytes on invalid UTF-8.
fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
