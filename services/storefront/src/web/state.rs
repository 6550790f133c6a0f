//! services/storefront/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use std::sync::Arc;
use storefront_core::ports::{DatabaseService, MailService, TokenService};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub mailer: Arc<dyn MailService>,
    pub tokens: Arc<dyn TokenService>,
    pub config: Arc<Config>,
}
