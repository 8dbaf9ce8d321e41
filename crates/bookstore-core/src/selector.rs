//! # Publisher Selector
//!
//! Decides how a caller-supplied search string picks publishers.
//!
//! ```text
//! "3"        ──► Id(3)                 publisher.id = 3
//! "Pearson"  ──► NamePattern("Pearson") publisher.name LIKE 'Pearson'
//! "%press%"  ──► NamePattern("%press%") publisher.name LIKE '%press%'
//! "123abc"   ──► NamePattern("123abc")
//! "99999999999999999999" ──► IdOutOfRange   matches nothing
//! ```
//!
//! ## Case Folding
//! Names are compared through [`fold_case`]: the stored publisher name and
//! the pattern are both lowercased with full Unicode rules, so `"эксмо"`
//! finds `"Эксмо"`. SQLite's own `LIKE` only folds ASCII.
//!
//! ## Known Limitation
//! A string made only of ASCII digits is always an identifier. A publisher
//! literally named `"123"` can't be found by name; use `"12_"` or `"%123"`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a search selects publishers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublisherSelector {
    /// Exact identifier match.
    Id(i64),

    /// All digits, but too large to be any stored identifier.
    IdOutOfRange(String),

    /// Case-insensitive `LIKE` pattern. `%` matches any run of characters and
    /// `_` exactly one; they are never escaped.
    NamePattern(String),
}

impl PublisherSelector {
    /// Resolves a selector string. Never fails.
    ///
    /// ## Rules
    /// - Non-empty and all ASCII digits, fitting in `i64` → [`PublisherSelector::Id`]
    /// - All ASCII digits past `i64::MAX` → [`PublisherSelector::IdOutOfRange`]
    /// - Anything else (signs, spaces, wildcards) → [`PublisherSelector::NamePattern`]
    ///
    /// ## Example
    /// ```rust
    /// use bookstore_core::selector::PublisherSelector;
    ///
    /// assert_eq!(PublisherSelector::parse("007"), PublisherSelector::Id(7));
    /// assert_eq!(
    ///     PublisherSelector::parse("%reilly"),
    ///     PublisherSelector::NamePattern("%reilly".to_string())
    /// );
    /// ```
    pub fn parse(input: &str) -> Self {
        let numeric = !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit());
        if !numeric {
            return PublisherSelector::NamePattern(input.to_string());
        }
        match input.parse::<i64>() {
            Ok(id) => PublisherSelector::Id(id),
            Err(_) => PublisherSelector::IdOutOfRange(input.to_string()),
        }
    }
}

/// Lowercases a publisher name or name pattern for case-insensitive
/// matching. `%` and `_` pass through unchanged.
///
/// ```rust
/// use bookstore_core::selector::fold_case;
///
/// assert_eq!(fold_case("%КСМО"), "%ксмо");
/// assert_eq!(fold_case("O'Reilly"), "o'reilly");
/// ```
pub fn fold_case(name: &str) -> String {
    name.to_lowercase()
}

impl From<&str> for PublisherSelector {
    fn from(input: &str) -> Self {
        PublisherSelector::parse(input)
    }
}

impl fmt::Display for PublisherSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublisherSelector::Id(id) => write!(f, "id = {}", id),
            PublisherSelector::IdOutOfRange(digits) => write!(f, "id = {}", digits),
            PublisherSelector::NamePattern(pattern) => write!(f, "name LIKE '{}'", pattern),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
