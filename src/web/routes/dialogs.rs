use axum::{
    body::Body,
    extract::{Extension, Multipart, Path},
    http::{header, Response, StatusCode},
    response::{IntoResponse, Redirect},
    Json,
};
use serde_json::json;

use crate::{
    db::messages::NewMessage,
    domain::{media::sniff_content_type, MailPayload, PayloadError},
    mailing::worker,
    web::{
        error::{json_error, WebResult},
        forms::read_payload_parts,
        state::WebState,
    },
};

/// Dialog index: every user that has written to the bot, newest first.
pub async fn list(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    let users = state.users.with_dialogs().await?;
    let unread = state.users.unread_count().await?;
    let dialogs: Vec<_> = users
        .iter()
        .map(|user| {
            json!({
                "chat_id": user.chat_id,
                "display": user.display(),
                "unread": user.unread,
            })
        })
        .collect();
    Ok(Json(json!({ "dialogs": dialogs, "unread": unread })))
}

/// One dialog's history. Opening it marks the dialog as read.
pub async fn dialog(
    Extension(state): Extension<WebState>,
    Path(chat_id): Path<i64>,
) -> WebResult<axum::response::Response> {
    let Some(user) = state.users.get(chat_id).await? else {
        return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown user"));
    };
    state.users.set_unread(chat_id, false).await?;

    let messages: Vec<_> = state
        .messages
        .all_for_user(chat_id)
        .await?
        .into_iter()
        .map(|message| {
            json!({
                "id": message.id,
                "from_admin": message.from_admin,
                "sent_at": message.sent_at,
                "text": message.text,
                "filename": message.filename,
                "has_attachment": message.has_attachment(),
            })
        })
        .collect();

    Ok(Json(json!({
        "user": { "chat_id": user.chat_id, "display": user.display() },
        "messages": messages,
    }))
    .into_response())
}

/// Admin reply into a dialog: stored in the history, then delivered to the
/// user best effort. A transport failure is logged, not surfaced; the
/// message stays in the history either way.
pub async fn answer(
    Extension(state): Extension<WebState>,
    Path(chat_id): Path<i64>,
    multipart: Multipart,
) -> WebResult<axum::response::Response> {
    let (text, attachment) = read_payload_parts(multipart).await?;
    let payload = match MailPayload::new(text, attachment) {
        Ok(payload) => payload,
        Err(PayloadError::Empty) => {
            return Ok(json_error(
                StatusCode::BAD_REQUEST,
                "invalid_payload",
                "answer needs text or a file",
            ));
        }
    };

    if state.users.get(chat_id).await?.is_none() {
        return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown user"));
    }

    state
        .messages
        .add(NewMessage {
            chat_id,
            from_admin: true,
            text: payload.caption(),
            attachment: payload.attachment.as_ref().map(|a| a.bytes.as_slice()),
            filename: payload.attachment.as_ref().map(|a| a.filename.as_str()),
        })
        .await?;

    if let Err(err) = worker::deliver(state.transport.as_ref(), chat_id, &payload).await {
        tracing::warn!(
            target: "web",
            chat_id,
            error = %err,
            "dialog answer stored but not delivered"
        );
    }

    Ok(Redirect::to(&format!("/dialog/{chat_id}")).into_response())
}

/// Serves a stored dialog attachment; the content type comes from the
/// blob's own signature.
pub async fn message_file(
    Extension(state): Extension<WebState>,
    Path(message_id): Path<i64>,
) -> WebResult<axum::response::Response> {
    let Some(message) = state.messages.get(message_id).await? else {
        return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown message"));
    };
    let Some(bytes) = message.attachment else {
        return Ok(json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "message has no attachment",
        ));
    };

    let filename = message.filename.unwrap_or_else(|| "file".to_string());
    let response = Response::builder()
        .header(header::CONTENT_TYPE, sniff_content_type(&bytes))
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename.replace('"', "")),
        )
        .body(Body::from(bytes))?;
    Ok(response.into_response())
}
