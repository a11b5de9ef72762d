use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    db::duties::DutyAnswers,
    web::{
        error::{json_error, WebResult},
        state::WebState,
    },
};

#[derive(Debug, Deserialize)]
pub struct DutyForm {
    pub name: String,
    pub about: String,
    pub question: String,
    pub correct_answer: String,
    #[serde(default)]
    pub incorrect_answers: Vec<String>,
}

impl DutyForm {
    fn answers(&self) -> DutyAnswers {
        DutyAnswers {
            correct: self.correct_answer.clone(),
            incorrect: self.incorrect_answers.clone(),
        }
    }
}

pub async fn list(Extension(state): Extension<WebState>) -> WebResult<impl IntoResponse> {
    Ok(Json(state.duties.all().await?))
}

pub async fn add(
    Extension(state): Extension<WebState>,
    Json(form): Json<DutyForm>,
) -> WebResult<axum::response::Response> {
    if state.duties.get_by_name(&form.name).await?.is_some() {
        return Ok(json_error(
            StatusCode::CONFLICT,
            "name_taken",
            "a duty with this name already exists",
        ));
    }
    let id = state
        .duties
        .add(&form.name, &form.about, &form.question, &form.answers())
        .await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))).into_response())
}

pub async fn get_one(
    Extension(state): Extension<WebState>,
    Path(duty_id): Path<i64>,
) -> WebResult<axum::response::Response> {
    match state.duties.get(duty_id).await? {
        Some(duty) => Ok(Json(duty).into_response()),
        None => Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown duty")),
    }
}

pub async fn edit(
    Extension(state): Extension<WebState>,
    Path(duty_id): Path<i64>,
    Json(form): Json<DutyForm>,
) -> WebResult<axum::response::Response> {
    let Some(duty) = state.duties.get(duty_id).await? else {
        return Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown duty"));
    };

    if form.name != duty.name {
        if state.duties.get_by_name(&form.name).await?.is_some() {
            return Ok(json_error(
                StatusCode::CONFLICT,
                "name_taken",
                "a duty with this name already exists",
            ));
        }
        state.duties.update_name(duty_id, &form.name).await?;
    }
    if form.about != duty.about {
        state.duties.update_about(duty_id, &form.about).await?;
    }
    if form.question != duty.question {
        state.duties.update_question(duty_id, &form.question).await?;
    }
    let answers = form.answers();
    if answers != duty.answers {
        state.duties.update_answers(duty_id, &answers).await?;
    }

    match state.duties.get(duty_id).await? {
        Some(updated) => Ok(Json(updated).into_response()),
        None => Ok(json_error(StatusCode::NOT_FOUND, "not_found", "unknown duty")),
    }
}

/// Deleting a duty sweeps it out of every role's duty list.
pub async fn delete(
    Extension(state): Extension<WebState>,
    Path(duty_id): Path<i64>,
) -> WebResult<axum::response::Response> {
    state.duties.delete(duty_id).await?;
    let touched = state.roles.remove_duty_from_all(duty_id).await?;
    if touched > 0 {
        tracing::info!(target: "web", duty_id, touched, "removed duty from roles");
    }
    Ok(Redirect::to("/duties_setup").into_response())
}
