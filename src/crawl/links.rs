// src/crawl/links.rs
// =============================================================================
// This module pulls candidate links out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever, which recovers from broken markup the same way
//   browsers do, so a malformed page still yields whatever links it has
//
// We collect:
// - href of every <a> tag
// - src of every <img> tag (menus are often posted as images)
//
// Values come back exactly as written in the page. Resolving them against
// the page URL is the crawler's job (see normalize.rs).
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;

// Extracts raw link targets from HTML content
//
// Returns: a set, so duplicates on the page collapse
//
// Example:
//   html = "<a href='/menu'>Menu</a><img src='carte.jpg'>"
//   result = {"/menu", "carte.jpg"}
pub fn extract_links(html: &str) -> HashSet<String> {
    let mut links = HashSet::new();

    // The selector is a constant, but we still don't want a panic here
    let selector = match Selector::parse("a[href], img[src]") {
        Ok(selector) => selector,
        Err(_) => return links,
    };

    let document = Html::parse_document(html);

    for element in document.select(&selector) {
        let attribute = match element.value().name() {
            "a" => "href",
            "img" => "src",
            _ => continue,
        };

        if let Some(value) = element.value().attr(attribute) {
            if !value.is_empty() {
                links.insert(value.to_string());
            }
        }
    }

    links
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does "a[href], img[src]" select?
//    - <a> tags that have an href attribute, plus <img> tags with a src
//    - The comma means "either selector"
//
// 2. Why a HashSet?
//    - Pages repeat links (header, footer, body); we only need each once
// -----------------------------------------------------------------------------
