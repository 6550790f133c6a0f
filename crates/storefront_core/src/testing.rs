//! In-process fakes of the storage ports for unit tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::catalog::{listing_order, CatalogQuery};
use crate::domain::{Book, BookId, Category, NewBook, NewOrder, Order, OrderId, OrderItem};
use crate::ports::{CatalogService, OrderService, PortError, PortResult};

pub fn book(id: BookId, title: &str, cents: i64) -> Book {
    Book {
        id,
        category_id: None,
        title: title.to_string(),
        description: String::new(),
        price: Decimal::new(cents, 2),
        image: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

#[derive(Default)]
pub struct FakeStore {
    books: Mutex<Vec<Book>>,
    orders: Mutex<Vec<Order>>,
    fail_reads: AtomicBool,
    fail_order_writes: AtomicBool,
}

impl FakeStore {
    pub fn with_books(books: Vec<Book>) -> Self {
        Self {
            books: Mutex::new(books),
            ..Self::default()
        }
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_order_writes(&self) {
        self.fail_order_writes.store(true, Ordering::SeqCst);
    }

    pub fn order_count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    fn check_reads(&self) -> PortResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("catalog offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogService for FakeStore {
    async fn list_categories(&self) -> PortResult<Vec<Category>> {
        Ok(Vec::new())
    }

    async fn find_category_by_name(&self, _name: &str) -> PortResult<Option<Category>> {
        Ok(None)
    }

    async fn search_books(&self, query: &CatalogQuery) -> PortResult<Vec<Book>> {
        self.check_reads()?;
        let mut found: Vec<Book> = self
            .books
            .lock()
            .unwrap()
            .iter()
            .filter(|b| query.matches(b))
            .cloned()
            .collect();
        found.sort_by(listing_order);
        Ok(found)
    }

    async fn find_books(&self, ids: &[BookId]) -> PortResult<Vec<Book>> {
        self.check_reads()?;
        Ok(self
            .books
            .lock()
            .unwrap()
            .iter()
            .filter(|b| ids.contains(&b.id))
            .cloned()
            .collect())
    }

    async fn create_category(&self, _name: &str) -> PortResult<Category> {
        Err(PortError::Unexpected("not supported by the fake".to_string()))
    }

    async fn create_book(&self, _book: NewBook) -> PortResult<Book> {
        Err(PortError::Unexpected("not supported by the fake".to_string()))
    }
}

#[async_trait]
impl OrderService for FakeStore {
    async fn create_order(&self, order: NewOrder) -> PortResult<Order> {
        if self.fail_order_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unexpected("write failed".to_string()));
        }
        let mut orders = self.orders.lock().unwrap();
        let id = orders.len() as OrderId + 1;
        let items = order
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| OrderItem {
                id: i as i64 + 1,
                order_id: id,
                book_id: Some(item.book_id),
                price: item.price,
                quantity: item.quantity,
            })
            .collect();
        let placed = Order {
            id,
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
        orders.push(placed.clone());
        Ok(placed)
    }

    async fn get_order(&self, order_id: OrderId) -> PortResult<Order> {
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.id == order_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Order {} not found", order_id)))
    }
}
