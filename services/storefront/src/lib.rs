//! services/storefront/src/lib.rs
//!
//! The storefront web service: configuration, adapters for the core ports,
//! and the axum handlers that expose the shop over HTTP.

pub mod adapters;
pub mod config;
pub mod error;
pub mod seed;
pub mod web;
