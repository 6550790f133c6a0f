//! crates/storefront_core/src/domain.rs
//!
//! Defines the pure, core data structures for the storefront.
//! These structs are independent of any database or wire format.

use crate::cart::Cart;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a `Book` row.
pub type BookId = i64;
/// Identifier of a `Category` row.
pub type CategoryId = i64;
/// Identifier of an `Order` row.
pub type OrderId = i64;
/// Identifier of an `Account` row.
pub type AccountId = i64;

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A book offered in the catalog. Cart and order flows only ever read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    pub id: BookId,
    pub category_id: Option<CategoryId>,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for adding a book to the catalog.
#[derive(Debug, Clone)]
pub struct NewBook {
    pub category_id: Option<CategoryId>,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
}

//=========================================================================================
// Orders
//=========================================================================================

/// The closed set of payment labels stored on an order. Nothing is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    #[serde(rename = "COD")]
    Cod,
    /// Bank card.
    #[serde(rename = "CARD")]
    Card,
}

impl PaymentMethod {
    /// Maps a submitted value onto the closed set. Anything unknown,
    /// including an absent value, falls back to `Cod`.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw {
            Some("CARD") => PaymentMethod::Card,
            _ => PaymentMethod::Cod,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "COD",
            PaymentMethod::Card => "CARD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentMethod::Cod => "Cash on Delivery",
            PaymentMethod::Card => "Bank Card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated delivery details of a checkout submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingInfo {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: PaymentMethod,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One purchased line. `price` is frozen at checkout time; `book_id` is
/// cleared when the book is later removed from the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: OrderId,
    pub book_id: Option<BookId>,
    pub price: Decimal,
    pub quantity: u32,
}

/// Everything needed to persist an order and its items in one transaction.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub shipping: ShippingInfo,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub items: Vec<NewOrderItem>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub book_id: BookId,
    pub price: Decimal,
    pub quantity: u32,
}

//=========================================================================================
// Accounts
//=========================================================================================

/// A customer account. Carries the password hash because activation tokens
/// are bound to it; never serialize this type to a client.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
    pub date_joined: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

// Only used when creating an account - the password is already hashed
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

//=========================================================================================
// Visitor Sessions
//=========================================================================================

/// Per-visitor state carried between requests by the session store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionData {
    pub account_id: Option<AccountId>,
    pub cart: Cart,
}
