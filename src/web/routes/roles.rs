use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::web::{
    error::{json_error, WebResult},
    state::WebState,
};

#[derive(Debug, Deserialize)]
pub struct RoleForm {
    pub name: String,
    #[serde(default)]
    pub duties: Vec<i64>,
}

pub async fn list(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    Ok(Json(state.roles.all().await?))
}

pub async fn add(
    Extension(state): Extension<WebState>,
    Json(form): Json<RoleForm>,
) -> WebResult<axum::response::Response> {
    if state.roles.get_by_name(&form.name).await?.is_some() {
        return Ok(json_error(
            StatusCode::CONFLICT,
            "name_taken",
            "a role with this name already exists",
        ));
    }
    let id = state.roles.add(&form.name, &form.duties).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

pub async fn get_one(
    Extension(state): Extension<WebState>,
    Path(role_id): Path<i64>,
) -> WebResult<axum::response::Response> {
    match state.roles.get(role_id).await? {
        Some(role) => Ok(Json(role).into_response()),
        None => Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown role")),
    }
}

pub async fn edit(
    Extension(state): Extension<WebState>,
    Path(role_id): Path<i64>,
    Json(form): Json<RoleForm>,
) -> WebResult<axum::response::Response> {
    let Some(role) = state.roles.get(role_id).await? else {
        return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown role"));
    };

    if form.name != role.name {
        if state.roles.get_by_name(&form.name).await?.is_some() {
            return Ok(json_error(
                StatusCode::CONFLICT,
                "name_taken",
                "a role with this name already exists",
            ));
        }
        state.roles.update_name(role_id, &form.name).await?;
    }
    if form.duties != role.duties {
        state.roles.update_duties(role_id, &form.duties).await?;
    }

    match state.roles.get(role_id).await? {
        Some(updated) => Ok(Json(updated).into_response()),
        None => Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown role")),
    }
}

/// Deleting a role also drops its access codes (referential sweep).
pub async fn delete(
    Extension(state): Extension<WebState>,
    Path(role_id): Path<i64>,
) -> WebResult<axum::response::Response> {
    state.roles.delete(role_id).await?;
    let dropped = state.access_codes.delete_by_role(role_id).await?;
    if dropped > 0 {
        tracing::info!(target: "web", role_id, dropped, "removed access codes of deleted role");
    }
    Ok(Redirect::to("/roles_setup").into_response())
}

pub async fn access_codes(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    Ok(Json(state.access_codes.all().await?))
}

pub async fn role_access_codes(
    Extension(state): Extension<WebState>,
    Path(role_id): Path<i64>,
) -> WebResult<impl IntoResponse> {
    Ok(Json(state.access_codes.by_role(role_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct AccessCodeForm {
    pub code: String,
    pub role_id: i64,
}

pub async fn add_access_code(
    Extension(state): Extension<WebState>,
    Json(form): Json<AccessCodeForm>,
) -> WebResult<axum::response::Response> {
    if state.roles.get(form.role_id).await?.is_none() {
        return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown role"));
    }
    let id = state.access_codes.add(&form.code, form.role_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

pub async fn delete_access_code(
    Extension(state): Extension<WebState>,
    Path(code_id): Path<i64>,
) -> WebResult<axum::response::Response> {
    state.access_codes.delete(code_id).await?;
    Ok(Redirect::to("/access_codes").into_response())
}
