//! Embedded static assets (`/assets/*`)

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::RustEmbed;

use super::middleware::WebError;

#[derive(RustEmbed)]
#[folder = "assets/"]
#[include = "*"]
struct Assets;

/// GET /assets/{*path}
pub async fn serve_asset(Path(path): Path<String>) -> Response {
    let decoded = urlencoding::decode(&path).map(|p| p.into_owned()).unwrap_or(path);
    match Assets::get(decoded.trim_start_matches('/')) {
        Some(content) => build_response(&decoded, content.data.into_owned()),
        None => WebError::NotFound.into_response(),
    }
}

fn build_response(path: &str, data: Vec<u8>) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, get_content_type(path)),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        Body::from(data),
    )
        .into_response()
}

/// Get content type from file extension
fn get_content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or("") {
        "css" => "text/css",
        "js" => "application/javascript",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "ico" => "image/x-icon",
        "woff2" => "font/woff2",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_types() {
        assert_eq!(get_content_type("app.css"), "text/css");
        assert_eq!(get_content_type("logo.svg"), "image/svg+xml");
        assert_eq!(get_content_type("README"), "application/octet-stream");
    }

    #[test]
    fn test_stylesheet_is_embedded() {
        assert!(Assets::get("app.css").is_some());
    }
}
