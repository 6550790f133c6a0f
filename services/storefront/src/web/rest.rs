//! services/storefront/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::{
    auth::{self, LoginForm},
    cart, catalog, checkout,
    views::{
        ActivationPage, ActivationStatus, BookView, CartPage, CatalogPage, CategoryView,
        CheckoutPage, FieldErrors, LineItemView, LoginPage, OrderItemView, OrderView,
        ShippingFormView, SignupPage, SignupSuccess,
    },
};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        catalog::catalog_handler,
        cart::cart_detail_handler,
        cart::cart_add_handler,
        cart::cart_decrease_handler,
        cart::cart_remove_handler,
        checkout::checkout_page_handler,
        checkout::checkout_submit_handler,
        checkout::order_success_handler,
        auth::signup_page_handler,
        auth::signup_handler,
        auth::activate_handler,
        auth::login_page_handler,
        auth::login_handler,
        auth::logout_handler,
    ),
    components(
        schemas(
            BookView,
            CategoryView,
            CatalogPage,
            LineItemView,
            CartPage,
            ShippingFormView,
            CheckoutPage,
            OrderItemView,
            OrderView,
            FieldErrors,
            SignupPage,
            SignupSuccess,
            LoginForm,
            LoginPage,
            ActivationStatus,
            ActivationPage,
        )
    ),
    tags(
        (name = "Storefront", description = "Catalog, cart, checkout and account pages of the bookstore.")
    )
)]
pub struct ApiDoc;
