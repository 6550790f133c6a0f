//! services/storefront/src/bin/openapi.rs
//!
//! Writes the storefront's OpenAPI document to a file, `openapi.json` unless
//! another path is given as the first argument.

use storefront_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn write_document(path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(path, json)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    write_document(&path)
}
