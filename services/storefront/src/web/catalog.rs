//! services/storefront/src/web/catalog.rs
//!
//! The catalog home page: browse, filter by category, search.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use serde::Deserialize;
use std::sync::Arc;
use storefront_core::catalog::CatalogQuery;
use utoipa::IntoParams;

use crate::web::{
    internal_error,
    session::Visitor,
    state::AppState,
    views::{BookView, CatalogPage, CategoryView},
};

/// Raw listing parameters.
#[derive(Deserialize, IntoParams, Debug, Default)]
pub struct CatalogParams {
    /// Case-insensitive text searched in titles and descriptions.
    pub q: Option<String>,
    /// A category id, or `all`.
    pub cat: Option<String>,
}

/// List the catalog, cheapest first.
#[utoipa::path(
    get,
    path = "/",
    params(CatalogParams),
    responses(
        (status = 200, description = "Filtered catalog", body = CatalogPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn catalog_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<CatalogPage>, (StatusCode, String)> {
    let query = CatalogQuery::from_params(params.q.as_deref(), params.cat.as_deref());

    let books = state
        .db
        .search_books(&query)
        .await
        .map_err(internal_error("Failed to load books"))?;
    let categories = state
        .db
        .list_categories()
        .await
        .map_err(internal_error("Failed to load categories"))?;

    Ok(Json(CatalogPage {
        books: books.iter().map(BookView::from).collect(),
        categories: categories.iter().map(CategoryView::from).collect(),
        query: query.text.clone().unwrap_or_default(),
        cat: query.category_param(),
        cart_count: visitor.data.cart.item_count(),
        signed_in: visitor.data.account_id.is_some(),
    }))
}
