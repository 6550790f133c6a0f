//! services/storefront/src/web/checkout.rs
//!
//! Checkout display and submission, and the order confirmation page.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    Extension, Form,
};
use std::sync::Arc;
use storefront_core::checkout::{
    Checkout, CheckoutForm, CheckoutOutcome, FormEcho, Submission,
};
use storefront_core::domain::SessionData;
use storefront_core::ports::PortError;
use tracing::{error, info};

use crate::web::{
    internal_error,
    session::{save_session, Visitor},
    state::AppState,
    views::{CheckoutPage, OrderView},
};

/// Show the checkout form with the priced cart.
#[utoipa::path(
    get,
    path = "/checkout/",
    responses(
        (status = 200, description = "Checkout summary and blank form", body = CheckoutPage),
        (status = 303, description = "Cart is empty; redirect to the catalog"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn checkout_page_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Response, (StatusCode, String)> {
    let checkout = Checkout::new(state.db.as_ref(), state.config.shipping_fee);
    let summary = checkout
        .prepare(&visitor.data.cart)
        .await
        .map_err(internal_error("Failed to prepare checkout"))?;

    let Some(summary) = summary else {
        return Ok(Redirect::to("/").into_response());
    };
    let page = CheckoutPage::new(
        &summary,
        visitor.data.cart.item_count(),
        &FormEcho::default(),
        None,
    );
    Ok(Json(page).into_response())
}

/// Submit shipping details and place the order.
#[utoipa::path(
    post,
    path = "/checkout/",
    request_body(
        content_type = "application/x-www-form-urlencoded",
        description = "full_name, phone, address, city, payment_method (COD or CARD)"
    ),
    responses(
        (status = 303, description = "Order placed; redirect to its confirmation, or to the catalog when the cart is empty"),
        (status = 422, description = "A required field is blank", body = CheckoutPage),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn checkout_submit_handler(
    State(state): State<Arc<AppState>>,
    Extension(visitor): Extension<Visitor>,
    Form(form): Form<CheckoutForm>,
) -> Result<Response, (StatusCode, String)> {
    let Visitor {
        session_id, data, ..
    } = visitor;
    let cart_count = data.cart.item_count();

    let checkout = Checkout::new(state.db.as_ref(), state.config.shipping_fee);
    let Submission { cart, outcome } = checkout
        .submit(data.cart, &form)
        .await
        .map_err(internal_error("Failed to place order"))?;

    match outcome {
        CheckoutOutcome::EmptyCart => Ok(Redirect::to("/").into_response()),
        CheckoutOutcome::Rejected { summary, rejection } => {
            let page = CheckoutPage::new(&summary, cart_count, &rejection.form, Some(rejection.error));
            Ok((StatusCode::UNPROCESSABLE_ENTITY, Json(page)).into_response())
        }
        CheckoutOutcome::Placed(order) => {
            info!(
                order_id = order.id,
                items = order.items.len(),
                total = %order.total,
                payment_method = %order.payment_method,
                "Order placed"
            );
            let data = SessionData {
                account_id: data.account_id,
                cart,
            };
            let cookie = save_session(&state, &session_id, &data).await?;
            let target = format!("/order/success/{}/", order.id);
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to(&target)).into_response())
        }
    }
}

/// Show a placed order.
#[utoipa::path(
    get,
    path = "/order/success/{order_id}/",
    params(("order_id" = i64, Path, description = "The order to show")),
    responses(
        (status = 200, description = "The order and its items", body = OrderView),
        (status = 404, description = "No such order"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn order_success_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<i64>,
) -> Result<Json<OrderView>, (StatusCode, String)> {
    match state.db.get_order(order_id).await {
        Ok(order) => Ok(Json(OrderView::from(&order))),
        Err(PortError::NotFound(_)) => {
            Err((StatusCode::NOT_FOUND, format!("Order {} not found", order_id)))
        }
        Err(e) => {
            error!("Failed to load order {}: {:?}", order_id, e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load order".to_string(),
            ))
        }
    }
}
