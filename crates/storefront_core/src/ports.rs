//! crates/storefront_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the storefront's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or mailers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::catalog::CatalogQuery;
use crate::domain::{
    Account, AccountId, Book, BookId, Category, NewAccount, NewBook, NewOrder, Order, OrderId,
    SessionData,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, mail).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Storage Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CatalogService: Send + Sync {
    /// All categories, ordered by name.
    async fn list_categories(&self) -> PortResult<Vec<Category>>;

    async fn find_category_by_name(&self, name: &str) -> PortResult<Option<Category>>;

    /// Books matching the query, cheapest first, newest first among equal prices.
    async fn search_books(&self, query: &CatalogQuery) -> PortResult<Vec<Book>>;

    /// The subset of `ids` that still exists. Missing ids are simply absent
    /// from the result; order is unspecified.
    async fn find_books(&self, ids: &[BookId]) -> PortResult<Vec<Book>>;

    /// Fails with `Conflict` when the name is taken.
    async fn create_category(&self, name: &str) -> PortResult<Category>;

    async fn create_book(&self, book: NewBook) -> PortResult<Book>;
}

#[async_trait]
pub trait OrderService: Send + Sync {
    /// Persists the order and all of its items atomically: either every row
    /// is written or none is.
    async fn create_order(&self, order: NewOrder) -> PortResult<Order>;

    async fn get_order(&self, order_id: OrderId) -> PortResult<Order>;
}

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Stores a new, inactive account. Fails with `Conflict` when the
    /// username is taken.
    async fn create_account(&self, account: NewAccount) -> PortResult<Account>;

    async fn get_account(&self, account_id: AccountId) -> PortResult<Account>;

    async fn get_account_by_username(&self, username: &str) -> PortResult<Account>;

    async fn activate_account(&self, account_id: AccountId) -> PortResult<()>;

    async fn record_login(&self, account_id: AccountId, at: DateTime<Utc>) -> PortResult<()>;
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Returns `None` for unknown or expired sessions.
    async fn load_session(&self, session_id: &str) -> PortResult<Option<SessionData>>;

    async fn save_session(
        &self,
        session_id: &str,
        data: &SessionData,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    async fn delete_session(&self, session_id: &str) -> PortResult<()>;
}

/// Every storage port at once; implemented automatically for any adapter
/// that provides all of them.
pub trait DatabaseService: CatalogService + OrderService + AccountService + SessionStore {}

impl<T> DatabaseService for T where T: CatalogService + OrderService + AccountService + SessionStore {}

//=========================================================================================
// Outbound Service Ports
//=========================================================================================

/// A plain-text message to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait MailService: Send + Sync {
    async fn send_mail(&self, mail: OutgoingMail) -> PortResult<()>;
}

/// Issues and verifies single-use, time-bound activation tokens.
pub trait TokenService: Send + Sync {
    fn make_token(&self, account: &Account) -> String;

    fn check_token(&self, account: &Account, token: &str) -> bool;
}
