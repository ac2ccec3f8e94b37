//! Address bar input classification
//!
//! Input is a direct URL when it has no whitespace and either starts with a
//! known scheme, mentions `www`, or looks like `<label>.<tld>` where the
//! suffix is at least two letters. Everything else is a search query.

use std::fmt::Write;

use crate::provider::SearchProvider;

/// Sentinel URL of an empty rendering surface.
pub const BLANK_PAGE: &str = "about:blank";

const SCHEMES: &[&str] = &["http://", "https://", "file://", "about:"];

/// What the user meant by a piece of address bar text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Free text to hand to the search provider
    SearchQuery(String),
    /// Navigable URL, scheme guaranteed
    DirectUrl(String),
}

impl Classification {
    /// URL to load for this classification.
    pub fn destination(&self, provider: SearchProvider) -> String {
        match self {
            Classification::SearchQuery(text) => provider.search_url(text),
            Classification::DirectUrl(url) => url.clone(),
        }
    }

    pub fn is_search(&self) -> bool {
        matches!(self, Classification::SearchQuery(_))
    }
}

/// Classify raw address bar input.
///
/// Returns `None` when the input is blank after trimming; there is nothing
/// to navigate to and the caller should say so instead of searching.
pub fn classify(input: &str) -> Option<Classification> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if input.chars().any(char::is_whitespace) {
        return Some(Classification::SearchQuery(input.to_string()));
    }

    if has_scheme(input) {
        return Some(Classification::DirectUrl(input.to_string()));
    }

    if input.to_ascii_lowercase().contains("www") || has_tld_suffix(input) {
        return Some(Classification::DirectUrl(format!("https://{}", input)));
    }

    Some(Classification::SearchQuery(input.to_string()))
}

fn has_scheme(input: &str) -> bool {
    SCHEMES.iter().any(|scheme| {
        input
            .get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// A dot preceded by something and followed by at least two ASCII letters.
fn has_tld_suffix(input: &str) -> bool {
    let bytes = input.as_bytes();
    bytes.iter().enumerate().any(|(i, &b)| {
        b == b'.'
            && i > 0
            && bytes[i + 1..]
                .iter()
                .take_while(|c| c.is_ascii_alphabetic())
                .count()
                >= 2
    })
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
pub fn percent_encode(input: &str) -> String {
    let mut result = String::with_capacity(input.len() * 3);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                let _ = write!(result, "%{:02X}", byte);
            }
        }
    }
    result
}
