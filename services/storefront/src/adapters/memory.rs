//! services/storefront/src/adapters/memory.rs
//!
//! A process-local implementation of every storage port, selected with
//! `DATABASE_URL=memory://`. Nothing survives a restart. It is also what the
//! integration tests run against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use storefront_core::catalog::{listing_order, CatalogQuery};
use storefront_core::domain::{
    Account, AccountId, Book, BookId, Category, NewAccount, NewBook, NewOrder, Order, OrderId,
    OrderItem, SessionData,
};
use storefront_core::ports::{
    AccountService, CatalogService, OrderService, PortError, PortResult, SessionStore,
};

#[derive(Default)]
struct Tables {
    categories: Vec<Category>,
    books: Vec<Book>,
    orders: Vec<Order>,
    accounts: Vec<Account>,
    sessions: HashMap<String, (SessionData, DateTime<Utc>)>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn account_mut(&mut self, account_id: AccountId) -> PortResult<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == account_id)
            .ok_or_else(|| PortError::NotFound(format!("Account {} not found", account_id)))
    }
}

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

#[derive(Default)]
pub struct MemoryAdapter {
    tables: Mutex<Tables>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> PortResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| PortError::Unexpected("memory store lock poisoned".to_string()))
    }

    /// Removes a book from the catalog the way the schema does: order items
    /// keep their row but lose the reference.
    pub fn delete_book(&self, book_id: BookId) -> PortResult<()> {
        let mut tables = self.tables()?;
        tables.books.retain(|b| b.id != book_id);
        for item in tables.orders.iter_mut().flat_map(|o| o.items.iter_mut()) {
            if item.book_id == Some(book_id) {
                item.book_id = None;
            }
        }
        Ok(())
    }

    pub fn order_count(&self) -> PortResult<usize> {
        Ok(self.tables()?.orders.len())
    }
}

//=========================================================================================
// `CatalogService` Trait Implementation
//=========================================================================================

#[async_trait]
impl CatalogService for MemoryAdapter {
    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        let mut categories = self.tables()?.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category_by_name(&self, name: &str) -> PortResult<Option<Category>> {
        Ok(self
            .tables()?
            .categories
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn search_books(&self, query: &CatalogQuery) -> PortResult<Vec<Book>> {
        let mut books: Vec<Book> = self
            .tables()?
            .books
            .iter()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        books.sort_by(listing_order);
        Ok(books)
    }

    async fn find_books(&self, ids: &[BookId]) -> PortResult<Vec<Book>> {
        Ok(self
            .tables()?
            .books
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect())
    }

    async fn create_category(&self, name: &str) -> PortResult<Category> {
        let mut tables = self.tables()?;
        if tables.categories.iter().any(|c| c.name == name) {
            return Err(PortError::Conflict(format!("Category {} already exists", name)));
        }
        let category = Category {
            id: tables.next_id(),
            name: name.to_string(),
        };
        tables.categories.push(category.clone());
        Ok(category)
    }

    async fn create_book(&self, book: NewBook) -> PortResult<Book> {
        let mut tables = self.tables()?;
        let book = Book {
            id: tables.next_id(),
            category_id: book.category_id,
            title: book.title,
            description: book.description,
            price: book.price,
            image: book.image,
            created_at: Utc::now(),
        };
        tables.books.push(book.clone());
        Ok(book)
    }
}

//=========================================================================================
// `OrderService` Trait Implementation
//=========================================================================================

#[async_trait]
impl OrderService for MemoryAdapter {
    async fn create_order(&self, order: NewOrder) -> PortResult<Order> {
        // The whole record set is built and inserted under one lock, so no
        // other request can observe a partial order.
        let mut tables = self.tables()?;
        let order_id = tables.next_id();
        let mut items = Vec::with_capacity(order.items.len());
        for item in order.items {
            items.push(OrderItem {
                id: tables.next_id(),
                order_id,
                book_id: Some(item.book_id),
                price: item.price,
                quantity: item.quantity,
            });
        }
        let placed = Order {
            id: order_id,
            full_name: order.shipping.full_name,
            phone: order.shipping.phone,
            address: order.shipping.address,
            city: order.shipping.city,
            payment_method: order.shipping.payment_method,
            shipping_fee: order.shipping_fee,
            total: order.total,
            created_at: Utc::now(),
            items,
        };
        tables.orders.push(placed.clone());
        Ok(placed)
    }

    async fn get_order(&self, order_id: OrderId) -> PortResult<Order> {
        self.tables()?
            .orders
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Order {} not found", order_id)))
    }
}

//=========================================================================================
// `AccountService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AccountService for MemoryAdapter {
    async fn create_account(&self, account: NewAccount) -> PortResult<Account> {
        let mut tables = self.tables()?;
        if tables.accounts.iter().any(|a| a.username == account.username) {
            return Err(PortError::Conflict(format!(
                "Username {} is taken",
                account.username
            )));
        }
        let account = Account {
            id: tables.next_id(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            is_active: false,
            date_joined: Utc::now(),
            last_login: None,
        };
        tables.accounts.push(account.clone());
        Ok(account)
    }

    async fn get_account(&self, account_id: AccountId) -> PortResult<Account> {
        Ok(self.tables()?.account_mut(account_id)?.clone())
    }

    async fn get_account_by_username(&self, username: &str) -> PortResult<Account> {
        self.tables()?
            .accounts
            .iter()
            .find(|a| a.username == username)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Account {} not found", username)))
    }

    async fn activate_account(&self, account_id: AccountId) -> PortResult<()> {
        self.tables()?.account_mut(account_id)?.is_active = true;
        Ok(())
    }

    async fn record_login(&self, account_id: AccountId, at: DateTime<Utc>) -> PortResult<()> {
        self.tables()?.account_mut(account_id)?.last_login = Some(at);
        Ok(())
    }
}

//=========================================================================================
// `SessionStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionStore for MemoryAdapter {
    async fn load_session(&self, session_id: &str) -> PortResult<Option<SessionData>> {
        let now = Utc::now();
        Ok(self
            .tables()?
            .sessions
            .get(session_id)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(data, _)| data.clone()))
    }

    async fn save_session(
        &self,
        session_id: &str,
        data: &SessionData,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        self.tables()?
            .sessions
            .insert(session_id.to_string(), (data.clone(), expires_at));
        Ok(())
    }

    async fn delete_session(&self, session_id: &str) -> PortResult<()> {
        self.tables()?.sessions.remove(session_id);
        Ok(())
    }
}
