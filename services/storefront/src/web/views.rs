//! services/storefront/src/web/views.rs
//!
//! The JSON documents returned by each page of the storefront.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use storefront_core::accounts::SignupErrors;
use storefront_core::checkout::{CheckoutSummary, FormEcho};
use storefront_core::domain::{Book, Category, Order, OrderItem};
use storefront_core::resolver::{LineItem, ResolvedCart};
use utoipa::ToSchema;

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
pub struct BookView {
    pub id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Book> for BookView {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            category_id: book.category_id,
            title: book.title.clone(),
            description: book.description.clone(),
            price: book.price,
            image: book.image.clone(),
            created_at: book.created_at,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CategoryView {
    pub id: i64,
    pub name: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

/// The home page: filtered books plus everything needed to render the filters.
#[derive(Serialize, ToSchema, Debug)]
pub struct CatalogPage {
    pub books: Vec<BookView>,
    pub categories: Vec<CategoryView>,
    /// The search text in effect, empty when none.
    pub query: String,
    /// The category in effect: an id or `all`.
    pub cat: String,
    pub cart_count: u64,
    pub signed_in: bool,
}

//=========================================================================================
// Cart and Checkout
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
pub struct LineItemView {
    pub book: BookView,
    pub quantity: u32,
    pub line_total: Decimal,
}

impl From<&LineItem> for LineItemView {
    fn from(item: &LineItem) -> Self {
        Self {
            book: BookView::from(&item.book),
            quantity: item.quantity,
            line_total: item.line_total,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CartPage {
    pub items: Vec<LineItemView>,
    pub subtotal: Decimal,
    pub cart_count: u64,
}

impl CartPage {
    pub fn new(resolved: &ResolvedCart, cart_count: u64) -> Self {
        Self {
            items: resolved.items.iter().map(LineItemView::from).collect(),
            subtotal: resolved.subtotal,
            cart_count,
        }
    }
}

/// The shipping form as last submitted (or blank with the default payment method).
#[derive(Serialize, ToSchema, Debug)]
pub struct ShippingFormView {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: String,
}

impl From<&FormEcho> for ShippingFormView {
    fn from(echo: &FormEcho) -> Self {
        Self {
            full_name: echo.full_name.clone(),
            phone: echo.phone.clone(),
            address: echo.address.clone(),
            city: echo.city.clone(),
            payment_method: echo.payment_method.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct CheckoutPage {
    pub items: Vec<LineItemView>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub cart_count: u64,
    pub form: ShippingFormView,
    pub error: Option<String>,
}

impl CheckoutPage {
    pub fn new(summary: &CheckoutSummary, cart_count: u64, form: &FormEcho, error: Option<&str>) -> Self {
        Self {
            items: summary.items.iter().map(LineItemView::from).collect(),
            subtotal: summary.subtotal,
            shipping_fee: summary.shipping_fee,
            total: summary.total,
            cart_count,
            form: ShippingFormView::from(form),
            error: error.map(str::to_string),
        }
    }
}

//=========================================================================================
// Orders
//=========================================================================================

#[derive(Serialize, ToSchema, Debug)]
pub struct OrderItemView {
    pub id: i64,
    pub book_id: Option<i64>,
    pub price: Decimal,
    pub quantity: u32,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id,
            book_id: item.book_id,
            price: item.price,
            quantity: item.quantity,
        }
    }
}

#[derive(Serialize, ToSchema, Debug)]
pub struct OrderView {
    pub id: i64,
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: String,
    pub payment_method_label: String,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id,
            full_name: order.full_name.clone(),
            phone: order.phone.clone(),
            address: order.address.clone(),
            city: order.city.clone(),
            payment_method: order.payment_method.as_str().to_string(),
            payment_method_label: order.payment_method.label().to_string(),
            shipping_fee: order.shipping_fee,
            total: order.total,
            created_at: order.created_at,
            items: order.items.iter().map(OrderItemView::from).collect(),
        }
    }
}

//=========================================================================================
// Accounts
//=========================================================================================

#[derive(Serialize, ToSchema, Debug, Default)]
pub struct FieldErrors {
    pub username: Vec<String>,
    pub email: Vec<String>,
    pub password1: Vec<String>,
    pub password2: Vec<String>,
}

impl From<SignupErrors> for FieldErrors {
    fn from(errors: SignupErrors) -> Self {
        Self {
            username: errors.username,
            email: errors.email,
            password1: errors.password1,
            password2: errors.password2,
        }
    }
}

/// The signup form. Passwords are never echoed.
#[derive(Serialize, ToSchema, Debug, Default)]
pub struct SignupPage {
    pub username: String,
    pub email: String,
    pub errors: FieldErrors,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct SignupSuccess {
    /// Where the activation link was sent.
    pub email: String,
}

#[derive(Serialize, ToSchema, Debug, Default)]
pub struct LoginPage {
    pub username: String,
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivationStatus {
    Activated,
    Invalid,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ActivationPage {
    pub status: ActivationStatus,
}
