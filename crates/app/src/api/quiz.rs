//! Quiz lifecycle handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::WithRejection;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::debug;

use quiz_core::model::{QuestionView, SessionId};
use services::{AnswerOutcome, QuizError, SessionSnapshot};

use crate::error::ApiError;
use crate::session;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnonymousStart {
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub user_object: SessionSnapshot,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_number: i64,
    pub chosen_answer: i64,
}

#[derive(Debug, Serialize)]
pub struct StoreResponse {
    pub message: String,
    pub score: u32,
    pub total: u32,
}

fn require_session(jar: &CookieJar) -> Result<SessionId, ApiError> {
    session::current(jar).ok_or_else(|| ApiError::from(QuizError::SessionNotFound))
}

/// Starting again under the same cookie replaces the old quiz.
fn clear_previous(state: &AppState, id: &SessionId) -> Result<(), ApiError> {
    if state.registry.remove(id)? {
        debug!(session = %id, "replaced previous session");
    }
    Ok(())
}

pub async fn login_without_account(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<AnonymousStart>, ApiError>,
) -> Result<(CookieJar, Json<StartResponse>), ApiError> {
    let (jar, id) = session::ensure(jar, state.cookie_max_age);
    clear_previous(&state, &id)?;
    let user_object = state.engine.start_anonymous(id, &body.username).await?;
    Ok((jar, Json(StartResponse { user_object })))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<LoginRequest>, ApiError>,
) -> Result<(CookieJar, Json<StartResponse>), ApiError> {
    let account = state
        .engine
        .authenticate(&body.username, &body.password)
        .await?;
    let (jar, id) = session::ensure(jar, state.cookie_max_age);
    clear_previous(&state, &id)?;
    let user_object = state.engine.start_authenticated(id, account).await?;
    Ok((jar, Json(StartResponse { user_object })))
}

pub async fn get_questions(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Vec<QuestionView>>, ApiError> {
    let id = require_session(&jar)?;
    Ok(Json(state.engine.assign_questions(&id).await?))
}

pub async fn validate_answer(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(body), _): WithRejection<Json<AnswerRequest>, ApiError>,
) -> Result<Json<AnswerOutcome>, ApiError> {
    let id = require_session(&jar)?;
    let number = usize::try_from(body.question_number).map_err(|_| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            format!("question {} is out of range", body.question_number),
        )
    })?;
    // A negative choice names no option, so it grades as wrong.
    let chosen = usize::try_from(body.chosen_answer).unwrap_or(usize::MAX);
    let outcome = state.engine.validate_answer(&id, number, chosen).await?;
    Ok(Json(outcome))
}

pub async fn store_user(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<StoreResponse>, ApiError> {
    let id = require_session(&jar)?;
    let result = state.committer.finalize(&id).await?;
    Ok(Json(StoreResponse {
        message: format!("score saved for {}", result.player.name()),
        score: result.score,
        total: result.total_questions,
    }))
}
