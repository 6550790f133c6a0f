pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod rest;
pub mod session;
pub mod state;
pub mod views;

use axum::{
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware as axum_middleware,
    routing::get,
    Router,
};
use std::sync::Arc;
use storefront_core::ports::PortError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use self::{
    auth::{
        activate_handler, login_handler, login_page_handler, logout_handler, signup_handler,
        signup_page_handler,
    },
    cart::{cart_add_handler, cart_decrease_handler, cart_detail_handler, cart_remove_handler},
    catalog::catalog_handler,
    checkout::{checkout_page_handler, checkout_submit_handler, order_success_handler},
    rest::ApiDoc,
    session::load_visitor,
    state::AppState,
};

/// Logs a storage failure and turns it into a bare 500 for the client.
pub(crate) fn internal_error(context: &'static str) -> impl Fn(PortError) -> (StatusCode, String) {
    move |e| {
        error!("{}: {:?}", context, e);
        (StatusCode::INTERNAL_SERVER_ERROR, context.to_string())
    }
}

/// Builds the full storefront application, Swagger UI included.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.config.allowed_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    let pages = Router::new()
        .route("/", get(catalog_handler))
        .route("/cart/", get(cart_detail_handler))
        .route("/cart/add/{book_id}/", get(cart_add_handler))
        .route("/cart/decrease/{book_id}/", get(cart_decrease_handler))
        .route("/cart/remove/{book_id}/", get(cart_remove_handler))
        .route(
            "/checkout/",
            get(checkout_page_handler).post(checkout_submit_handler),
        )
        .route("/order/success/{order_id}/", get(order_success_handler))
        .route("/signup/", get(signup_page_handler).post(signup_handler))
        .route("/activate/{uid}/{token}/", get(activate_handler))
        .route("/login/", get(login_page_handler).post(login_handler))
        .route("/logout/", get(logout_handler))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            load_visitor,
        ))
        .layer(cors)
        .with_state(state);

    Router::new()
        .merge(pages)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
}
