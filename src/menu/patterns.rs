// src/menu/patterns.rs
// =============================================================================
// Menu signals: URL keywords, price patterns and menu vocabulary.
//
// Patterns are compiled once on first use with `LazyLock`.
// =============================================================================

use std::sync::LazyLock;

use regex::Regex;

/// Substrings that mark a URL as a likely menu page
pub const MENU_URL_KEYWORDS: [&str; 5] = ["menu", "carte", "la-carte", "food", "menus"];

/// French menu vocabulary
pub const FR_KEYWORDS: &[&str] = &[
    "menu", "carte", "à la carte", "entrées", "entrée", "plats", "plat",
    "desserts", "dessert", "boissons", "boisson", "formule", "formules",
    "apéritifs", "digestifs", "vins", "prix",
];

/// English menu vocabulary
pub const EN_KEYWORDS: &[&str] = &[
    "menu", "starters", "starter", "appetizers", "appetizer", "mains", "main",
    "entrees", "entree", "sides", "side", "desserts", "dessert",
    "beverages", "beverage", "drinks", "lunch", "dinner", "breakfast",
    "specials", "prix fixe", "course", "courses",
];

// `€` is not a word character, so a trailing amount only counts when a
// word character follows the symbol ("12€ttc"), never before whitespace
const EURO_PATTERN: &str = r"\b\d{1,3}([.,]\d{3})*([.,]\d{2})?\s?€\b|€\s?\d+([.,]\d{2})?";
const DOLLAR_PATTERN: &str = r"\$\s?\d+([.,]\d{2})?";
// "Magret de canard ........ 24"
const DOTTED_LEADER_PATTERN: &str = r"\.{3,}\s*\d+([.,]\d{2})?";

/// Any price: euro amount, dollar amount, or dotted leader followed by a number
#[allow(clippy::expect_used)]
pub static PRICE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        "(?i)(?:{EURO_PATTERN})|(?:{DOLLAR_PATTERN})|(?:{DOTTED_LEADER_PATTERN})"
    ))
    .expect("PRICE regex")
});

/// One word-bounded matcher per distinct keyword (French and English merged)
#[allow(clippy::expect_used)]
pub static MENU_KEYWORDS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    let mut seen = Vec::new();
    for keyword in FR_KEYWORDS.iter().chain(EN_KEYWORDS) {
        if seen.iter().any(|(k, _)| k == keyword) {
            continue;
        }
        let pattern = format!(r"\b{}\b", regex::escape(keyword));
        seen.push((*keyword, Regex::new(&pattern).expect("keyword regex")));
    }
    seen
});

/// Cheap, network-free guess: does this URL point at a menu?
///
/// True when the lowercased URL ends in `.pdf` or contains one of
/// [`MENU_URL_KEYWORDS`].
pub fn is_menu_candidate(url: &str) -> bool {
    let url = url.to_lowercase();
    is_pdf_link(&url) || MENU_URL_KEYWORDS.iter().any(|k| url.contains(k))
}

/// Links that need a HEAD check before they count as menus
pub fn is_pdf_link(url: &str) -> bool {
    url.to_lowercase().ends_with(".pdf")
}

/// Number of non-overlapping price matches
pub fn count_prices(text: &str) -> usize {
    PRICE.find_iter(text).count()
}

/// Number of distinct menu keywords present, compared in lowercase
pub fn count_keywords(text: &str) -> usize {
    let text = text.to_lowercase();
    MENU_KEYWORDS
        .iter()
        .filter(|(_, re)| re.is_match(&text))
        .count()
}
