use url::Url;

use crate::{Error, Result};

/// Sites that only serve content to authenticated sessions.
pub const BLOCKED_DOMAINS: &[&str] = &["linkedin.com", "facebook.com", "instagram.com", "twitter.com"];

/// Returns the host of `url` with a single leading `www.` removed.
/// Malformed input yields an empty string.
pub fn extract_domain(url: &str) -> String {
    let host = host_of(url);
    match host.strip_prefix("www.") {
        Some(stripped) => stripped.to_string(),
        None => host,
    }
}

/// Returns the raw host of `url`, or an empty string if it has none.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

pub fn is_blocked(domain: &str) -> bool {
    BLOCKED_DOMAINS.contains(&domain)
}

/// Rejects URLs pointing at a blocked domain. Performs no network access.
pub fn check_allowed(url: &str) -> Result<String> {
    let domain = extract_domain(url);
    if is_blocked(&domain) {
        return Err(Error::BlockedDomain(domain));
    }
    Ok(domain)
}

/// Domain-membership check: the host of `url` contains `domain`.
pub fn belongs_to(url: &Url, domain: &str) -> bool {
    if domain.is_empty() {
        return false;
    }
    url.host_str()
        .map(|host| host.contains(domain))
        .unwrap_or(false)
}

fn is_web_scheme(scheme: &str) -> bool {
    matches!(scheme, "http" | "https")
}

/// Makes a link found on `base` absolute. Links with a non-web scheme
/// (`mailto:`, `javascript:`, `ftp:` ...) yield `None`; scheme-relative links
/// take the scheme of `base`; paths are appended to `base`.
pub fn absolutize(base: &str, link: &str) -> Option<String> {
    let link = link.trim();
    if link.is_empty() {
        return None;
    }
    if let Ok(url) = Url::parse(link) {
        return is_web_scheme(url.scheme()).then(|| url.to_string());
    }
    if let Some(rest) = link.strip_prefix("//") {
        let scheme = Url::parse(base).ok()?.scheme().to_string();
        return is_web_scheme(&scheme).then(|| format!("{}://{}", scheme, rest));
    }
    Some(format!("{}/{}", base.trim_end_matches('/'), link.trim_start_matches('/')))
}
