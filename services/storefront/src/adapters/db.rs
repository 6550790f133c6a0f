//! services/storefront/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the storage ports from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use storefront_core::catalog::{CatalogQuery, CategoryFilter};
use storefront_core::domain::{
    Account, AccountId, Book, BookId, Category, NewAccount, NewBook, NewOrder, Order, OrderId,
    OrderItem, PaymentMethod, SessionData,
};
use storefront_core::ports::{
    AccountService, CatalogService, OrderService, PortError, PortResult, SessionStore,
};
use storefront_core::Cart;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the storage ports on PostgreSQL.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    /// Deletes visitor sessions past their expiry. Returns how many were removed.
    pub async fn purge_expired_sessions(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM visitor_sessions WHERE expires_at <= NOW()")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == "23505")
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CategoryRecord {
    id: i64,
    name: String,
}
impl CategoryRecord {
    fn to_domain(self) -> Category {
        Category {
            id: self.id,
            name: self.name,
        }
    }
}

#[derive(FromRow)]
struct BookRecord {
    id: i64,
    category_id: Option<i64>,
    title: String,
    description: String,
    price: Decimal,
    image: Option<String>,
    created_at: DateTime<Utc>,
}
impl BookRecord {
    fn to_domain(self) -> Book {
        Book {
            id: self.id,
            category_id: self.category_id,
            title: self.title,
            description: self.description,
            price: self.price,
            image: self.image,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct OrderRecord {
    id: i64,
    full_name: String,
    phone: String,
    address: String,
    city: String,
    payment_method: String,
    shipping_fee: Decimal,
    total: Decimal,
    created_at: DateTime<Utc>,
}
impl OrderRecord {
    fn to_domain(self, items: Vec<OrderItem>) -> Order {
        Order {
            id: self.id,
            full_name: self.full_name,
            phone: self.phone,
            address: self.address,
            city: self.city,
            payment_method: PaymentMethod::coerce(Some(&self.payment_method)),
            shipping_fee: self.shipping_fee,
            total: self.total,
            created_at: self.created_at,
            items,
        }
    }
}

#[derive(FromRow)]
struct OrderItemRecord {
    id: i64,
    order_id: i64,
    book_id: Option<i64>,
    price: Decimal,
    quantity: i32,
}
impl OrderItemRecord {
    fn to_domain(self) -> PortResult<OrderItem> {
        let quantity = u32::try_from(self.quantity).map_err(|_| {
            PortError::Unexpected(format!(
                "Order item {} has invalid quantity {}",
                self.id, self.quantity
            ))
        })?;
        Ok(OrderItem {
            id: self.id,
            order_id: self.order_id,
            book_id: self.book_id,
            price: self.price,
            quantity,
        })
    }
}

#[derive(FromRow)]
struct AccountRecord {
    id: i64,
    username: String,
    email: String,
    password_hash: String,
    is_active: bool,
    date_joined: DateTime<Utc>,
    last_login: Option<DateTime<Utc>>,
}
impl AccountRecord {
    fn to_domain(self) -> Account {
        Account {
            id: self.id,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            is_active: self.is_active,
            date_joined: self.date_joined,
            last_login: self.last_login,
        }
    }
}

#[derive(FromRow)]
struct SessionRecord {
    account_id: Option<i64>,
    cart: String,
}
impl SessionRecord {
    fn to_domain(self) -> SessionData {
        SessionData {
            account_id: self.account_id,
            cart: Cart::from_session_json(&self.cart),
        }
    }
}

const BOOK_COLUMNS: &str = "id, category_id, title, description, price, image, created_at";
const ORDER_COLUMNS: &str =
    "id, full_name, phone, address, city, payment_method, shipping_fee, total, created_at";
const ACCOUNT_COLUMNS: &str =
    "id, username, email, password_hash, is_active, date_joined, last_login";

/// Escapes `%`, `_` and `\` so user text is matched literally by ILIKE.
fn like_pattern(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + 2);
    escaped.push('%');
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

//=========================================================================================
// `CatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogService for DbAdapter {
    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name FROM categories ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_category_by_name(&self, name: &str) -> PortResult<Option<Category>> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "SELECT id, name FROM categories WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn search_books(&self, query: &CatalogQuery) -> PortResult<Vec<Book>> {
        let category_id = match query.category {
            CategoryFilter::All => None,
            CategoryFilter::Only(id) => Some(id),
        };
        let pattern = query.text.as_deref().map(like_pattern);

        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books \
             WHERE ($1::BIGINT IS NULL OR category_id = $1) \
               AND ($2::TEXT IS NULL OR title ILIKE $2 OR description ILIKE $2) \
             ORDER BY price ASC, created_at DESC"
        );
        let records = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(category_id)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn find_books(&self, ids: &[BookId]) -> PortResult<Vec<Book>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ANY($1)");
        let records = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn create_category(&self, name: &str) -> PortResult<Category> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            "INSERT INTO categories (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::Conflict(format!("Category {} already exists", name))
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn create_book(&self, book: NewBook) -> PortResult<Book> {
        let sql = format!(
            "INSERT INTO books (category_id, title, description, price, image) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {BOOK_COLUMNS}"
        );
        let record = sqlx::query_as::<_, BookRecord>(&sql)
            .bind(book.category_id)
            .bind(&book.title)
            .bind(&book.description)
            .bind(book.price)
            .bind(&book.image)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(record.to_domain())
    }
}

//=========================================================================================
// `OrderService` Trait Implementation
//=========================================================================================

#[async_trait]
impl OrderService for DbAdapter {
    async fn create_order(&self, order: NewOrder) -> PortResult<Order> {
        // Dropping `tx` without commit rolls back every row written so far.
        let mut tx = self.pool.begin().await.map_err(unexpected)?;

        let sql = format!(
            "INSERT INTO orders (full_name, phone, address, city, payment_method, shipping_fee, total) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {ORDER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, OrderRecord>(&sql)
            .bind(&order.shipping.full_name)
            .bind(&order.shipping.phone)
            .bind(&order.shipping.address)
            .bind(&order.shipping.city)
            .bind(order.shipping.payment_method.as_str())
            .bind(order.shipping_fee)
            .bind(order.total)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let quantity = i32::try_from(item.quantity).map_err(|_| {
                PortError::Unexpected(format!("Quantity {} is out of range", item.quantity))
            })?;
            let item_record = sqlx::query_as::<_, OrderItemRecord>(
                "INSERT INTO order_items (order_id, book_id, price, quantity) \
                 VALUES ($1, $2, $3, $4) RETURNING id, order_id, book_id, price, quantity",
            )
            .bind(record.id)
            .bind(item.book_id)
            .bind(item.price)
            .bind(quantity)
            .fetch_one(&mut *tx)
            .await
            .map_err(unexpected)?;
            items.push(item_record.to_domain()?);
        }

        tx.commit().await.map_err(unexpected)?;
        Ok(record.to_domain(items))
    }

    async fn get_order(&self, order_id: OrderId) -> PortResult<Order> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let record = sqlx::query_as::<_, OrderRecord>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Order {} not found", order_id)))?;

        let item_records = sqlx::query_as::<_, OrderItemRecord>(
            "SELECT id, order_id, book_id, price, quantity FROM order_items \
             WHERE order_id = $1 ORDER BY id ASC",
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let items = item_records
            .into_iter()
            .map(|r| r.to_domain())
            .collect::<PortResult<Vec<_>>>()?;
        Ok(record.to_domain(items))
    }
}

//=========================================================================================
// `AccountService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountService for DbAdapter {
    async fn create_account(&self, account: NewAccount) -> PortResult<Account> {
        let sql = format!(
            "INSERT INTO accounts (username, email, password_hash, is_active) \
             VALUES ($1, $2, $3, FALSE) RETURNING {ACCOUNT_COLUMNS}"
        );
        let record = sqlx::query_as::<_, AccountRecord>(&sql)
            .bind(&account.username)
            .bind(&account.email)
            .bind(&account.password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Conflict(format!("Username {} is taken", account.username))
                } else {
                    unexpected(e)
                }
            })?;
        Ok(record.to_domain())
    }

    async fn get_account(&self, account_id: AccountId) -> PortResult<Account> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1");
        let record = sqlx::query_as::<_, AccountRecord>(&sql)
            .bind(account_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Account {} not found", account_id)))?;
        Ok(record.to_domain())
    }

    async fn get_account_by_username(&self, username: &str) -> PortResult<Account> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE username = $1");
        let record = sqlx::query_as::<_, AccountRecord>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?
            .ok_or_else(|| PortError::NotFound(format!("Account {} not found", username)))?;
        Ok(record.to_domain())
    }

    async fn activate_account(&self, account_id: AccountId) -> PortResult<()> {
        let result = sqlx::query("UPDATE accounts SET is_active = TRUE WHERE id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Account {} not found", account_id)));
        }
        Ok(())
    }

    async fn record_login(&self, account_id: AccountId, at: DateTime<Utc>) -> PortResult<()> {
        sqlx::query("UPDATE accounts SET last_login = $1 WHERE id = $2")
            .bind(at)
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for DbAdapter {
    async fn load_session(&self, session_id: &str) -> PortResult<Option<SessionData>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT account_id, cart FROM visitor_sessions WHERE id = $1 AND expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(|r| r.to_domain()))
    }

    async fn save_session(
        &self,
        session_id: &str,
        data: &SessionData,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let cart = serde_json::to_string(&data.cart)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        sqlx::query(
            "INSERT INTO visitor_sessions (id, account_id, cart, expires_at) VALUES ($1, $2, $3, $4) \
             ON CONFLICT (id) DO UPDATE \
             SET account_id = EXCLUDED.account_id, cart = EXCLUDED.cart, expires_at = EXCLUDED.expires_at",
        )
        .bind(session_id)
        .bind(data.account_id)
        .bind(cart)
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM visitor_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
