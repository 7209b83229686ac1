//! Request-provenance checks run before a submission body is looked at.

use axum::http::HeaderMap;
use axum::http::header::{HOST, ORIGIN, REFERER};

use starfall_core::score::{INTEGRITY_HEADER, INTEGRITY_VALUE};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OriginError {
    #[error("origin not allowed")]
    OriginNotAllowed,
    #[error("missing integrity header")]
    MissingIntegrityHeader,
    #[error("cross-site not allowed")]
    CrossSite,
    #[error("bad fetch mode")]
    BadFetchMode,
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
}

/// `Origin`, or failing that the origin of the `Referer` URL.
pub fn request_origin(headers: &HeaderMap) -> Option<String> {
    if let Some(origin) = header(headers, ORIGIN.as_str()) {
        return Some(origin.to_string());
    }
    let referer = header(headers, REFERER.as_str())?;
    let url = reqwest::Url::parse(referer).ok()?;
    Some(url.origin().ascii_serialization())
}

/// Configured origins, or the page origins implied by the `Host` header.
pub fn allowed_origins(configured: &[String], headers: &HeaderMap) -> Vec<String> {
    if !configured.is_empty() {
        return configured.to_vec();
    }
    let Some(host) = header(headers, HOST.as_str()) else {
        return Vec::new();
    };
    let primary = if host.starts_with("localhost") {
        format!("http://{host}")
    } else {
        format!("https://{host}")
    };
    vec![primary, format!("http://{host}")]
}

/// Reject requests that do not look like they came from the game page.
pub fn check_request(headers: &HeaderMap, configured: &[String]) -> Result<(), OriginError> {
    let allowed = allowed_origins(configured, headers);
    if !allowed.is_empty() {
        let origin = request_origin(headers);
        if !origin.is_some_and(|o| allowed.contains(&o)) {
            return Err(OriginError::OriginNotAllowed);
        }
    }

    if headers.get(INTEGRITY_HEADER).and_then(|v| v.to_str().ok()) != Some(INTEGRITY_VALUE) {
        return Err(OriginError::MissingIntegrityHeader);
    }

    if header(headers, "sec-fetch-site") == Some("cross-site") {
        return Err(OriginError::CrossSite);
    }

    if let Some(mode) = header(headers, "sec-fetch-mode")
        && mode != "cors"
        && mode != "same-origin"
    {
        return Err(OriginError::BadFetchMode);
    }

    Ok(())
}
