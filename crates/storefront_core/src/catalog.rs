//! crates/storefront_core/src/catalog.rs
//!
//! Browse and search parameters for the catalog listing.

use std::cmp::Ordering;

use crate::domain::{Book, CategoryId};

/// The category part of a listing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(CategoryId),
}

/// A parsed listing request: optional case-insensitive substring plus an
/// optional category. Both filters compose with AND.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    pub text: Option<String>,
    pub category: CategoryFilter,
}

impl CatalogQuery {
    /// Builds a query from raw `q` / `cat` request parameters.
    ///
    /// `q` is trimmed and ignored when empty. `cat` may be absent, empty,
    /// `all`, or a category id; a value that is none of these is treated
    /// as `all`.
    pub fn from_params(q: Option<&str>, cat: Option<&str>) -> Self {
        let text = q
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let category = match cat.map(str::trim) {
            None | Some("") | Some("all") => CategoryFilter::All,
            Some(raw) => raw
                .parse::<CategoryId>()
                .map(CategoryFilter::Only)
                .unwrap_or(CategoryFilter::All),
        };

        Self { text, category }
    }

    /// The `cat` value to echo back to the client.
    pub fn category_param(&self) -> String {
        match self.category {
            CategoryFilter::All => "all".to_string(),
            CategoryFilter::Only(id) => id.to_string(),
        }
    }

    /// Whether `book` passes both filters. Storage adapters that cannot push
    /// the filter down use this directly.
    pub fn matches(&self, book: &Book) -> bool {
        if let CategoryFilter::Only(id) = self.category {
            if book.category_id != Some(id) {
                return false;
            }
        }
        match &self.text {
            None => true,
            Some(text) => {
                let needle = text.to_lowercase();
                book.title.to_lowercase().contains(&needle)
                    || book.description.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Listing order: cheapest first, newest first among equal prices.
pub fn listing_order(a: &Book, b: &Book) -> Ordering {
    a.price
        .cmp(&b.price)
        .then_with(|| b.created_at.cmp(&a.created_at))
}
