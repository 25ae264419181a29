//! Hostname allow-list validation for media URLs.
//!
//! The check is deliberately strict: the URL must parse, the scheme must not
//! be script-capable, and the parsed hostname must equal an allow-list entry
//! or end with `.{entry}`. Substring containment is never used — both
//! `evil.com/twimg.com/x` (host in path) and `twimg.com.evil.com` (host as
//! subdomain prefix) must fail.

use url::Url;

/// Schemes rejected regardless of hostname.
const FORBIDDEN_SCHEMES: &[&str] = &["data", "blob", "javascript", "vbscript"];

/// Whether `raw` parses to a URL whose hostname belongs to `allow_list`.
///
/// Returns `false` for anything malformed; never panics.
pub fn is_trusted_media_host(raw: &str, allow_list: &[String]) -> bool {
    let parsed = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return false,
    };
    if FORBIDDEN_SCHEMES.contains(&parsed.scheme()) {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    allow_list
        .iter()
        .any(|entry| host == entry.as_str() || host.ends_with(&format!(".{entry}")))
}
