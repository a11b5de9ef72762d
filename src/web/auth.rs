use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::AdminConfig;

use super::state::WebState;

/// HTTP basic-auth gate in front of the admin surface. A missing or wrong
/// credential gets the 401 challenge that makes browsers prompt for login.
pub async fn require_basic_auth(
    State(state): State<WebState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    if authorized(req.headers(), &state.admin) {
        next.run(req).await
    } else {
        challenge()
    }
}

fn authorized(headers: &HeaderMap, admin: &AdminConfig) -> bool {
    parse_basic(headers)
        .map_or(false, |(user, pass)| user == admin.login && pass == admin.password)
}

fn parse_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, "Basic realm=\"botdesk admin\"")],
        "authentication required",
    )
        .into_response()
}
