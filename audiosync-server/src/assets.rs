use crate::app::AppState;
use axum::extract::State;
use axum::http::{StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::error;

/// Serves the client bundle from the configured static directory.
pub async fn serve_asset(State(state): State<Arc<AppState>>, uri: Uri) -> Response {
    let path = match uri.path() {
        "/" => "/index.html",
        path => path,
    };

    if path.contains("..") {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }

    let file = state.config.static_dir.join(path.trim_start_matches('/'));
    match tokio::fs::read(&file).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type(path))], bytes).into_response(),
        Err(e) => {
            if !matches!(e.kind(), ErrorKind::NotFound | ErrorKind::IsADirectory) {
                error!("File error for {}: {}", file.display(), e);
            }
            (StatusCode::NOT_FOUND, "Not Found").into_response()
        }
    }
}

pub fn content_type(path: &str) -> &'static str {
    match path.rsplit('.').next().unwrap_or_default() {
        "html" => "text/html",
        "js" => "text/javascript",
        "css" => "text/css",
        "png" => "image/png",
        "jpg" => "image/jpeg",
        "ico" => "image/x-icon",
        _ => "text/plain",
    }
}
