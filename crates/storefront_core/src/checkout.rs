//! crates/storefront_core/src/checkout.rs
//!
//! Turns a visitor's cart into a persisted order.
//!
//! A checkout is either displayed (the priced cart plus totals) or submitted.
//! Submission validates the shipping form and, when it passes, asks the order
//! store to write the order and its items in one transaction. The caller gets
//! back the cart to keep in the session: emptied after a placed order,
//! untouched otherwise.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::domain::{NewOrder, NewOrderItem, Order, PaymentMethod, ShippingInfo};
use crate::ports::{CatalogService, OrderService, PortResult};
use crate::resolver::{resolve_cart, LineItem};

/// Shown when a required shipping field is blank.
pub const MISSING_FIELDS_MESSAGE: &str = "Please fill in: full name, phone, address.";

//=========================================================================================
// Shipping Form
//=========================================================================================

/// The shipping form exactly as submitted. Every field may be missing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

/// Normalized form values, echoed back to the client on rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormEcho {
    pub full_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRejection {
    pub form: FormEcho,
    pub error: &'static str,
}

impl CheckoutForm {
    /// Trims the text fields and coerces the payment method. Full name, phone
    /// and address are required; city is optional.
    pub fn validate(&self) -> Result<ShippingInfo, CheckoutRejection> {
        let echo = FormEcho {
            full_name: self.full_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            payment_method: PaymentMethod::coerce(self.payment_method.as_deref()),
        };

        if echo.full_name.is_empty() || echo.phone.is_empty() || echo.address.is_empty() {
            return Err(CheckoutRejection {
                form: echo,
                error: MISSING_FIELDS_MESSAGE,
            });
        }

        Ok(ShippingInfo {
            full_name: echo.full_name,
            phone: echo.phone,
            address: echo.address,
            city: echo.city,
            payment_method: echo.payment_method,
        })
    }
}

//=========================================================================================
// Checkout Orchestration
//=========================================================================================

/// The priced cart with shipping and grand total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Nothing in the cart resolves; the visitor is sent back to the catalog.
    EmptyCart,
    /// The form failed validation. No order was written.
    Rejected {
        summary: CheckoutSummary,
        rejection: CheckoutRejection,
    },
    Placed(Order),
}

/// The result of a submission: the cart to store back into the session and
/// what happened.
#[derive(Debug, Clone)]
pub struct Submission {
    pub cart: Cart,
    pub outcome: CheckoutOutcome,
}

pub struct Checkout<'a, S: ?Sized> {
    store: &'a S,
    shipping_fee: Decimal,
}

impl<'a, S> Checkout<'a, S>
where
    S: CatalogService + OrderService + ?Sized,
{
    pub fn new(store: &'a S, shipping_fee: Decimal) -> Self {
        Self {
            store,
            shipping_fee,
        }
    }

    /// Prices the cart for display. `None` means there is nothing to check out.
    pub async fn prepare(&self, cart: &Cart) -> PortResult<Option<CheckoutSummary>> {
        let resolved = resolve_cart(self.store, cart).await?;
        if resolved.is_empty() {
            return Ok(None);
        }
        Ok(Some(CheckoutSummary {
            total: resolved.subtotal + self.shipping_fee,
            subtotal: resolved.subtotal,
            shipping_fee: self.shipping_fee,
            items: resolved.items,
        }))
    }

    /// Validates `form` and places the order.
    ///
    /// On success the returned cart is empty. A store failure while writing
    /// the order is returned as an error and leaves no partial order behind.
    pub async fn submit(&self, cart: Cart, form: &CheckoutForm) -> PortResult<Submission> {
        let Some(summary) = self.prepare(&cart).await? else {
            return Ok(Submission {
                cart,
                outcome: CheckoutOutcome::EmptyCart,
            });
        };

        let shipping = match form.validate() {
            Ok(shipping) => shipping,
            Err(rejection) => {
                return Ok(Submission {
                    cart,
                    outcome: CheckoutOutcome::Rejected { summary, rejection },
                })
            }
        };

        let new_order = NewOrder {
            shipping,
            shipping_fee: summary.shipping_fee,
            total: summary.total,
            items: summary
                .items
                .iter()
                .map(|item| NewOrderItem {
                    book_id: item.book.id,
                    price: item.book.price,
                    quantity: item.quantity,
                })
                .collect(),
        };
        let order = self.store.create_order(new_order).await?;

        let mut cart = cart;
        cart.clear();
        Ok(Submission {
            cart,
            outcome: CheckoutOutcome::Placed(order),
        })
    }
}
