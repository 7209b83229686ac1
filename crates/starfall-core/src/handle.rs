//! Player handle rules shared by the game client and the score service.
//!
//! A handle is a Twitter-style name: an optional leading `@` followed by
//! 1-15 ASCII letters, digits or underscores. Stored handles are always
//! `@`-prefixed.

/// Maximum number of name characters after the optional `@`.
pub const HANDLE_MAX_LEN: usize = 15;

/// Hosts whose profile URLs are accepted by [`extract_handle`].
const PROFILE_HOSTS: &[&str] = &[
    "twitter.com",
    "www.twitter.com",
    "mobile.twitter.com",
    "x.com",
    "www.x.com",
];

fn is_handle_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= HANDLE_MAX_LEN && name.chars().all(is_handle_char)
}

/// Server-side format check, equivalent to `^@?[A-Za-z0-9_]{1,15}$`.
pub fn is_valid_handle(handle: &str) -> bool {
    is_valid_name(handle.strip_prefix('@').unwrap_or(handle))
}

/// Trim and ensure the canonical `@` prefix. Does not validate.
pub fn normalize_handle(handle: &str) -> String {
    let trimmed = handle.trim();
    if trimmed.starts_with('@') {
        trimmed.to_string()
    } else {
        format!("@{trimmed}")
    }
}

/// Client-side sanitizer for whatever the player typed into the handle field.
///
/// Accepts a bare name, an `@name`, or a profile URL such as
/// `https://twitter.com/name/status/1`. Returns the canonical `@name` only
/// when it satisfies the handle rules.
pub fn extract_handle(input: &str) -> Option<String> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let candidate = profile_name(input).unwrap_or(input);
    let handle = normalize_handle(candidate);
    let name = &handle[1..];
    is_valid_name(name).then_some(handle)
}

/// First path segment of a recognised profile URL, if `input` is one.
fn profile_name(input: &str) -> Option<&str> {
    let without_scheme = input
        .strip_prefix("https://")
        .or_else(|| input.strip_prefix("http://"))
        .unwrap_or(input);
    let (host, path) = without_scheme.split_once('/')?;
    if !PROFILE_HOSTS.contains(&host.to_ascii_lowercase().as_str()) {
        return None;
    }
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.split('/').find(|segment| !segment.is_empty())
}
