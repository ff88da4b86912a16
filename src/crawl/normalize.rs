// src/crawl/normalize.rs
// =============================================================================
// URL helpers for the crawler.
//
// - normalize(): resolve a (possibly relative) link against the page it was
//   found on and drop the #fragment. The result is the visited-set key.
// - same_domain(): do two URLs belong to the same site? "www." is ignored.
// - site_root(): turn user input like "example.com" into a crawlable URL
//   plus its scheme://authority base.
//
// None of these fail. Bad input just comes back (mostly) untouched, and the
// crawler's fetch step reports the problem for that one URL.
// =============================================================================

use url::Url;

// Resolves `url` against `base` and strips the fragment
//
// Examples:
//   normalize("/menu#lunch", "https://example.com/a") -> "https://example.com/menu"
//   normalize("https://x.com/a?b=1#c", "")            -> "https://x.com/a?b=1"
pub fn normalize(url: &str, base: &str) -> String {
    let resolved = match Url::parse(base) {
        Ok(base) => base.join(url),
        Err(_) => Url::parse(url),
    };

    match resolved {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        // Not something we can parse, so just cut the fragment textually
        Err(_) => match url.find('#') {
            Some(pos) => url[..pos].to_string(),
            None => url.to_string(),
        },
    }
}

// Two URLs are on the same site when their authorities (host + port) match,
// ignoring case and a leading "www."
pub fn same_domain(a: &str, b: &str) -> bool {
    match (site_identity(a), site_identity(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn site_identity(url: &str) -> Option<String> {
    let authority = authority(&Url::parse(url).ok()?)?.to_lowercase();
    Some(match authority.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => authority,
    })
}

// host[:port] of a URL, None for URLs without a host (mailto:, data:, ...)
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str().filter(|h| !h.is_empty())?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

// Prepares a site URL for crawling
//
// Returns (start_url, base) where base is "scheme://authority".
// Adds "https://" when the input has no scheme. Returns None when no host
// can be found even after that.
pub fn site_root(site_url: &str) -> Option<(String, String)> {
    let site_url = site_url.trim();
    if site_url.is_empty() {
        return None;
    }

    let start = if site_url.contains("://") {
        site_url.to_string()
    } else {
        format!("https://{}", site_url)
    };

    let parsed = Url::parse(&start).ok()?;
    let authority = authority(&parsed)?;
    let base = format!("{}://{}", parsed.scheme(), authority);
    Some((start, base))
}

// Path component used for robots.txt checks ("/" for a bare host)
pub fn path_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => "/".to_string(),
    }
}
