//! crates/storefront_core/src/cart.rs
//!
//! The visitor's shopping cart: an insertion-ordered map from book id to a
//! positive quantity, stored in the session as `{"<book_id>": {"qty": n}}`.
//!
//! Loading is lenient. A blob that is not a JSON object yields an empty cart,
//! and entries with a non-numeric key or a quantity that does not parse to a
//! positive integer are dropped, so a `Cart` value never holds a zero or
//! negative quantity.

use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;
use std::fmt;
use std::num::NonZeroU32;

use crate::domain::BookId;

/// A single cart line before it is priced against the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartEntry {
    pub book_id: BookId,
    pub quantity: NonZeroU32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    entries: Vec<CartEntry>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a stored session blob. Never fails: anything unusable becomes
    /// an empty cart.
    pub fn from_session_json(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// Adds one unit of `book_id`, creating the entry if needed. The id is
    /// not checked against the catalog here; the resolver drops stale ids.
    pub fn add(&mut self, book_id: BookId) {
        match self.position(book_id) {
            Some(i) => {
                let entry = &mut self.entries[i];
                entry.quantity = entry.quantity.saturating_add(1);
            }
            None => self.entries.push(CartEntry {
                book_id,
                quantity: NonZeroU32::MIN,
            }),
        }
    }

    /// Removes one unit of `book_id`. The entry disappears when it reaches zero.
    pub fn decrease(&mut self, book_id: BookId) {
        if let Some(i) = self.position(book_id) {
            match NonZeroU32::new(self.entries[i].quantity.get() - 1) {
                Some(quantity) => self.entries[i].quantity = quantity,
                None => {
                    self.entries.remove(i);
                }
            }
        }
    }

    /// Drops the entry for `book_id`, if any.
    pub fn remove(&mut self, book_id: BookId) {
        self.entries.retain(|e| e.book_id != book_id);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    pub fn quantity_of(&self, book_id: BookId) -> u32 {
        self.position(book_id)
            .map_or(0, |i| self.entries[i].quantity.get())
    }

    /// Total number of units across all entries.
    pub fn item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity.get())).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, book_id: BookId) -> Option<usize> {
        self.entries.iter().position(|e| e.book_id == book_id)
    }

    // Repeated keys in a stored blob replace the earlier value in place.
    fn upsert(&mut self, book_id: BookId, quantity: NonZeroU32) {
        match self.position(book_id) {
            Some(i) => self.entries[i].quantity = quantity,
            None => self.entries.push(CartEntry { book_id, quantity }),
        }
    }
}

/// Reads `{"qty": ...}` the way a loosely typed session would: integers,
/// floats (truncated) and numeric strings are accepted, everything else is 0.
fn parse_quantity(value: &Value) -> i64 {
    match value.get("qty") {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

//=========================================================================================
// Session Blob Format
//=========================================================================================

#[derive(serde::Serialize)]
struct StoredQuantity {
    qty: u32,
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(
                &entry.book_id.to_string(),
                &StoredQuantity {
                    qty: entry.quantity.get(),
                },
            )?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Cart {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(CartVisitor)
    }
}

struct CartVisitor;

impl<'de> Visitor<'de> for CartVisitor {
    type Value = Cart;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of book ids to quantities")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Cart, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut cart = Cart::new();
        while let Some((key, value)) = map.next_entry::<String, Value>()? {
            let Ok(book_id) = key.trim().parse::<BookId>() else {
                continue;
            };
            let quantity = u32::try_from(parse_quantity(&value))
                .ok()
                .and_then(NonZeroU32::new);
            if let Some(quantity) = quantity {
                cart.upsert(book_id, quantity);
            }
        }
        Ok(cart)
    }
}
