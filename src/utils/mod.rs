//! Utility functions and helpers.

pub mod http;
pub mod text;

use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Scheme and host of a URL (`https://ua.usembassy.gov`), for log lines.
///
/// Falls back to the input when it does not parse.
pub fn site_root(url_str: &str) -> String {
    match Url::parse(url_str) {
        Ok(url) => match url.host_str() {
            Some(host) => match url.port() {
                Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
                None => format!("{}://{}", url.scheme(), host),
            },
            None => url_str.to_string(),
        },
        Err(_) => url_str.to_string(),
    }
}
