use axum::{
    body::Body,
    extract::Extension,
    http::{header, Response},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use crate::web::{error::WebResult, state::WebState};

pub async fn overview(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    let unread = state.users.unread_count().await?;
    Ok(Json(json!({ "unread": unread })))
}

/// Exports the user base as CSV for download.
pub async fn users_base(
    Extension(state): Extension<WebState>,
) -> WebResult<axum::response::Response> {
    let users = state.users.all().await?;

    let mut csv = String::from("chat_id,username,first_name,last_name,unread,info,created_at\n");
    for user in users {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            user.chat_id,
            csv_field(user.username.as_deref().unwrap_or_default()),
            csv_field(user.first_name.as_deref().unwrap_or_default()),
            csv_field(user.last_name.as_deref().unwrap_or_default()),
            user.unread,
            csv_field(&user.info),
            user.created_at.to_rfc3339(),
        ));
    }

    let response = Response::builder()
        .header(header::CONTENT_TYPE, "text/csv; charset=utf-8")
        .header(
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"users.csv\"",
        )
        .body(Body::from(csv))?;
    Ok(response.into_response())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
