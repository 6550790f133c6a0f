//! services/storefront/src/seed.rs
//!
//! Loads catalog fixtures through the `CatalogService` port. This stands in
//! for an admin screen: categories and books are created here and nowhere else.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use storefront_core::domain::{CategoryId, NewBook};
use storefront_core::ports::{CatalogService, PortError, PortResult};
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct CatalogFixture {
    #[serde(default)]
    pub categories: Vec<CategoryFixture>,
    #[serde(default)]
    pub books: Vec<BookFixture>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryFixture {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct BookFixture {
    /// Name of the book's category, which must appear in the fixture or
    /// already exist.
    pub category: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
}

/// What a seeding run created.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub categories_created: usize,
    pub categories_reused: usize,
    pub books_created: usize,
}

pub async fn seed_catalog<C>(catalog: &C, fixture: CatalogFixture) -> PortResult<SeedReport>
where
    C: CatalogService + ?Sized,
{
    let mut report = SeedReport::default();
    let mut category_ids: HashMap<String, CategoryId> = HashMap::new();

    for category in fixture.categories {
        let name = category.name.trim().to_string();
        let id = match catalog.find_category_by_name(&name).await? {
            Some(existing) => {
                report.categories_reused += 1;
                existing.id
            }
            None => {
                report.categories_created += 1;
                catalog.create_category(&name).await?.id
            }
        };
        category_ids.insert(name, id);
    }

    for book in fixture.books {
        if book.price.is_sign_negative() {
            return Err(PortError::Unexpected(format!(
                "Book '{}' has a negative price",
                book.title
            )));
        }
        let category_id = match book.category.as_deref().map(str::trim) {
            None => None,
            Some(name) => match category_ids.get(name) {
                Some(id) => Some(*id),
                None => {
                    let existing = catalog.find_category_by_name(name).await?.ok_or_else(|| {
                        PortError::NotFound(format!(
                            "Category '{}' for book '{}' not found",
                            name, book.title
                        ))
                    })?;
                    category_ids.insert(name.to_string(), existing.id);
                    Some(existing.id)
                }
            },
        };

        let created = catalog
            .create_book(NewBook {
                category_id,
                title: book.title,
                description: book.description,
                price: book.price,
                image: book.image,
            })
            .await?;
        info!(book_id = created.id, title = %created.title, "Seeded book");
        report.books_created += 1;
    }

    Ok(report)
}
