//! Endpoint identity scheme handling.
//!
//! The host platform has sent the same API URL with both `http://` and
//! `https://` over time. Both denote one registration; `https://` is canonical.

use std::borrow::Cow;

pub const SECURE_SCHEME: &str = "https://";
pub const INSECURE_SCHEME: &str = "http://";

/// Rewrites a leading `http://` to `https://`. Anything else is returned as is.
///
/// Only the scheme prefix is touched; path, query and trailing slash survive
/// byte for byte.
#[must_use]
pub fn canonicalize(api_url: &str) -> Cow<'_, str> {
    swap_prefix(api_url, INSECURE_SCHEME, SECURE_SCHEME)
}

/// Rewrites a leading `https://` to `http://`. Anything else is returned as is.
#[must_use]
pub fn insecure_form(api_url: &str) -> Cow<'_, str> {
    swap_prefix(api_url, SECURE_SCHEME, INSECURE_SCHEME)
}

fn swap_prefix<'a>(api_url: &'a str, from: &str, to: &str) -> Cow<'a, str> {
    match api_url.strip_prefix(from) {
        Some(rest) => Cow::Owned(format!("{to}{rest}")),
        None => Cow::Borrowed(api_url),
    }
}
