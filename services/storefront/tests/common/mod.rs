//! Shared setup for the HTTP-level tests: an in-memory storefront driven
//! through the real router, one request at a time.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderValue, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::Duration;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use storefront_core::domain::{Book, Category, NewBook};
use storefront_core::ports::{CatalogService, MailService, OutgoingMail, PortResult};
use storefront_lib::{
    adapters::{HmacTokenService, MemoryAdapter},
    config::{Config, DatabaseBackend},
    web::{router, state::AppState},
};
use tower::ServiceExt;

/// A `MailService` that keeps every message for inspection.
#[derive(Default)]
pub struct CapturingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
}

impl CapturingMailer {
    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailService for CapturingMailer {
    async fn send_mail(&self, mail: OutgoingMail) -> PortResult<()> {
        self.sent.lock().unwrap().push(mail);
        Ok(())
    }
}

pub fn test_config(shipping_fee: Decimal) -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database: DatabaseBackend::Memory,
        log_level: tracing::Level::INFO,
        secret_key: "integration-test-secret-key".to_string(),
        public_base_url: "http://shop.test".to_string(),
        allowed_origin: HeaderValue::from_static("http://shop.test"),
        shipping_fee,
        session_ttl: Duration::days(14),
        activation_timeout: Duration::days(3),
        mail_from: "no-reply@shop.test".to_string(),
    }
}

pub struct TestApp {
    pub store: Arc<MemoryAdapter>,
    pub mailer: Arc<CapturingMailer>,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_shipping_fee(Decimal::ZERO)
    }

    pub fn with_shipping_fee(shipping_fee: Decimal) -> Self {
        let config = Arc::new(test_config(shipping_fee));
        let store = Arc::new(MemoryAdapter::new());
        let mailer = Arc::new(CapturingMailer::default());
        let tokens = Arc::new(
            HmacTokenService::new(&config.secret_key, config.activation_timeout).unwrap(),
        );
        let state = Arc::new(AppState {
            db: store.clone(),
            mailer: mailer.clone(),
            tokens,
            config,
        });
        Self {
            store,
            mailer,
            router: router(state),
        }
    }

    pub async fn category(&self, name: &str) -> Category {
        self.store.create_category(name).await.unwrap()
    }

    pub async fn book(&self, category: Option<&Category>, title: &str, price: &str) -> Book {
        self.store
            .create_book(NewBook {
                category_id: category.map(|c| c.id),
                title: title.to_string(),
                description: format!("About {}", title),
                price: Decimal::from_str(price).unwrap(),
                image: None,
            })
            .await
            .unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, form: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).unwrap())
            .await
    }
}

/// The `sessionid=...` pair from a response's `Set-Cookie` header.
pub fn session_cookie(response: &Response) -> Option<String> {
    let value = response.headers().get(header::SET_COOKIE)?.to_str().ok()?;
    value
        .split(';')
        .next()
        .map(str::trim)
        .filter(|pair| pair.starts_with("sessionid="))
        .map(str::to_string)
}

pub fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .map(|v| v.to_str().unwrap().to_string())
        .unwrap_or_default()
}

pub fn location(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .map(|v| v.to_str().unwrap().to_string())
}

pub fn assert_redirect(response: &Response, target: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response).as_deref(), Some(target));
}

pub async fn json(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Reads a decimal that was serialized as a JSON string.
pub fn money(value: &serde_json::Value) -> Decimal {
    Decimal::from_str(value.as_str().unwrap()).unwrap()
}
