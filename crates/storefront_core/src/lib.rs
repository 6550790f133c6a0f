pub mod accounts;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod domain;
pub mod ports;
pub mod resolver;

#[cfg(test)]
mod testing;

pub use cart::{Cart, CartEntry};
pub use catalog::{CatalogQuery, CategoryFilter};
pub use checkout::{Checkout, CheckoutForm, CheckoutOutcome, CheckoutSummary, Submission};
pub use domain::{Account, Book, Category, NewOrder, Order, OrderItem, PaymentMethod, SessionData};
pub use ports::{
    AccountService, CatalogService, DatabaseService, MailService, OrderService, OutgoingMail,
    PortError, PortResult, SessionStore, TokenService,
};
pub use resolver::{resolve_cart, LineItem, ResolvedCart};
