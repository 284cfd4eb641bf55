//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the REST API to disk so clients can be
//! generated without running the server. The output path defaults to
//! `openapi.json` and can be overridden by the first argument.

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "openapi.json".to_string());
    std::fs::write(&path, ApiDoc::openapi().to_pretty_json()?)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}
