use std::sync::Arc;

use anyhow::anyhow;
use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect},
    Json,
};

use crate::{
    domain::{MailPayload, PayloadError},
    mailing::MailingJob,
    web::{
        error::{json_error, WebResult},
        forms::read_payload_parts,
        state::WebState,
    },
};

const MAILING_FORM: &str = r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>New mailing</title></head>
<body>
<h1>New mailing</h1>
<form action="/mailing" method="post" enctype="multipart/form-data">
  <p><textarea name="text" rows="6" cols="60" placeholder="Message text"></textarea></p>
  <p><input type="file" name="file"></p>
  <p><button type="submit">Send to everyone</button></p>
</form>
<p><a href="/mailing_status">Mailing status</a></p>
</body>
</html>
"#;

pub async fn form() -> Html<&'static str> {
    Html(MAILING_FORM)
}

/// Starts a broadcast: snapshots the whole user base, registers the job
/// and hands it to the worker. The response returns immediately; progress
/// lives on the status page.
pub async fn start(
    Extension(state): Extension<WebState>,
    multipart: Multipart,
) -> WebResult<axum::response::Response> {
    let (text, attachment) = read_payload_parts(multipart).await?;
    let payload = match MailPayload::new(text, attachment) {
        Ok(payload) => payload,
        Err(PayloadError::Empty) => {
            return Ok(json_error(
                StatusCode::BAD_REQUEST,
                "invalid_payload",
                "mailing needs text or a file",
            ));
        }
    };

    let recipients = state
        .users
        .all()
        .await?
        .iter()
        .map(|user| user.recipient())
        .collect();

    let job = Arc::new(MailingJob::new(recipients, payload));
    tracing::info!(
        target: "mailing",
        id = %job.id(),
        total = job.total(),
        media = job.payload().attachment.as_ref().map(|a| a.kind.as_str()),
        "mailing accepted"
    );
    state
        .mailing_tx
        .send(job.clone())
        .map_err(|_| anyhow!("mailing worker is not running"))?;
    state.registry.insert(job);

    Ok(Redirect::to("/mailing_status").into_response())
}

pub async fn status(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    Ok(Json(state.registry.statuses()))
}
