//! services/api/src/bin/openapi.rs
//!
//! Writes the classroom API's OpenAPI document for frontend client generation.
//! Usage: `openapi [OUTPUT]`, where OUTPUT defaults to `openapi.json`.

use std::path::PathBuf;

use api_lib::web::rest::ApiDoc;
use utoipa::OpenApi;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("openapi.json"));

    let doc = ApiDoc::openapi();
    let route_count = doc.paths.paths.len();
    std::fs::write(&output, doc.to_pretty_json()?)?;

    println!("Wrote {route_count} routes to {}", output.display());
    Ok(())
}
