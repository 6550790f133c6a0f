//! services/storefront/src/web/cart.rs
//!
//! Cart display and the three cart mutations. Each mutation saves the session
//! and redirects back to the cart.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    Extension,
};
use std::sync::Arc;
use storefront_core::{resolver::resolve_cart, Cart};

use crate::web::{
    internal_error,
    session::{save_session, Visitor},
    state::AppState,
    views::CartPage,
};

/// Show the priced cart.
#[utoipa::path(
    get,
    path = "/cart/",
    responses(
        (status = 200, description = "The visitor's cart", body = CartPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn cart_detail_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Json<CartPage>, (StatusCode, String)> {
    let cart = &visitor.data.cart;
    let resolved = resolve_cart(state.db.as_ref(), cart)
        .await
        .map_err(internal_error("Failed to load cart"))?;
    Ok(Json(CartPage::new(&resolved, cart.item_count())))
}

/// Add one unit of a book.
#[utoipa::path(
    get,
    path = "/cart/add/{book_id}/",
    params(("book_id" = i64, Path, description = "The book to add")),
    responses((status = 303, description = "Redirect to the cart"))
)]
pub async fn cart_add_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Path(book_id): Path<i64>,
) -> Result<Response, (StatusCode, String)> {
    update_cart(&state, visitor, |cart| cart.add(book_id)).await
}

/// Remove one unit of a book; the line disappears at zero.
#[utoipa::path(
    get,
    path = "/cart/decrease/{book_id}/",
    params(("book_id" = i64, Path, description = "The book to decrease")),
    responses((status = 303, description = "Redirect to the cart"))
)]
pub async fn cart_decrease_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Path(book_id): Path<i64>,
) -> Result<Response, (StatusCode, String)> {
    update_cart(&state, visitor, |cart| cart.decrease(book_id)).await
}

/// Drop a book from the cart.
#[utoipa::path(
    get,
    path = "/cart/remove/{book_id}/",
    params(("book_id" = i64, Path, description = "The book to remove")),
    responses((status = 303, description = "Redirect to the cart"))
)]
pub async fn cart_remove_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Path(book_id): Path<i64>,
) -> Result<Response, (StatusCode, String)> {
    update_cart(&state, visitor, |cart| cart.remove(book_id)).await
}

async fn update_cart(
    state: &AppState,
    visitor: Visitor,
    change: impl FnOnce(&mut Cart),
) -> Result<Response, (StatusCode, String)> {
    let Visitor {
        session_id,
        mut data,
        ..
    } = visitor;
    change(&mut data.cart);
    let cookie = save_session(state, &session_id, &data).await?;
    Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/cart/")).into_response())
}
