// src/crawl/mod.rs
// =============================================================================
// This module handles website crawling for menus.
//
// Submodules:
// - normalize: URL resolution, fragment stripping, same-domain checks
// - robots: robots.txt rules for our user agent
// - rate_limit: minimum delay between requests
// - links: <a href> / <img src> extraction from HTML
// - fetch: the HTTP side (GET/HEAD, retries)
// - queue: the breadth-first crawl itself
// =============================================================================

mod fetch;
mod links;
mod normalize;
mod queue;
mod rate_limit;
mod robots;

// Re-export the crawler; everything else is an implementation detail
pub use queue::MenuCrawler;
