//! crates/storefront_core/src/resolver.rs
//!
//! Prices a cart against the live catalog.
//!
//! Resolution never fails on inconsistent cart state. A cart entry whose book
//! no longer exists is left out of the result, so carts heal themselves as the
//! catalog drifts. Only a failure of the catalog store itself is an error.

use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::cart::Cart;
use crate::domain::{Book, BookId};
use crate::ports::{CatalogService, PortResult};

/// A cart entry paired with its book and priced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItem {
    pub book: Book,
    pub quantity: u32,
    pub line_total: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedCart {
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
}

impl ResolvedCart {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Resolves `cart` into line items in cart order. Read-only and idempotent.
pub async fn resolve_cart<C>(catalog: &C, cart: &Cart) -> PortResult<ResolvedCart>
where
    C: CatalogService + ?Sized,
{
    if cart.is_empty() {
        return Ok(ResolvedCart::default());
    }

    let ids: Vec<BookId> = cart.entries().iter().map(|e| e.book_id).collect();
    let mut books: HashMap<BookId, Book> = catalog
        .find_books(&ids)
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect();

    let mut resolved = ResolvedCart::default();
    for entry in cart.entries() {
        let Some(book) = books.remove(&entry.book_id) else {
            continue;
        };
        let quantity = entry.quantity.get();
        let line_total = book.price * Decimal::from(quantity);
        resolved.subtotal += line_total;
        resolved.items.push(LineItem {
            book,
            quantity,
            line_total,
        });
    }
    Ok(resolved)
}
