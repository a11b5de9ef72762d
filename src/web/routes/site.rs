use std::path::Path as FsPath;

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Extension, Path},
    http::{header, Response, StatusCode},
    response::{Html, IntoResponse},
    Json,
};
use serde_json::json;

use crate::web::{
    error::{json_error, WebResult},
    state::WebState,
};

const INDEX_HTML: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>botdesk</title></head>
<body>
<h1>Welcome</h1>
<p>See <a href="/production">production</a> and <a href="/products">products</a>.</p>
</body>
</html>
"#;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn production(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    let images = list_static_images(&state.static_dir, |name| name.contains("production")).await?;
    Ok(Json(json!({ "images": images })))
}

pub async fn products(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    let images = list_static_images(&state.static_dir, |name| {
        name.contains("product") && !name.contains("production")
    })
    .await?;
    Ok(Json(json!({ "images": images })))
}

pub async fn favicon(Extension(state): Extension<WebState>) -> WebResult<axum::response::Response> {
    serve_static(&state.static_dir, "favicon.ico").await
}

pub async fn static_file(
    Extension(state): Extension<WebState>,
    Path(name): Path<String>,
) -> WebResult<axum::response::Response> {
    serve_static(&state.static_dir, &name).await
}

async fn list_static_images(
    dir: &FsPath,
    keep: impl Fn(&str) -> bool,
) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        if let Ok(name) = entry.file_name().into_string() {
            if keep(&name) {
                names.push(name);
            }
        }
    }
    names.sort();
    Ok(names)
}

async fn serve_static(dir: &FsPath, name: &str) -> WebResult<axum::response::Response> {
    // Flat directory; anything that looks like a path is refused.
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "not found"));
    }
    let bytes = match tokio::fs::read(dir.join(name)).await {
        Ok(bytes) => bytes,
        Err(_) => return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "not found")),
    };
    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(name))
        .body(Body::from(bytes))?;
    Ok(response.into_response())
}

fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next().unwrap_or_default() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "css" => "text/css",
        "js" => "text/javascript",
        "html" => "text/html",
        _ => "application/octet-stream",
    }
}
