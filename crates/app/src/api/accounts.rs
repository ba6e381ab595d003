//! Sign-up form handlers. Each answers with a bare JSON boolean.

use axum::Json;
use axum::extract::State;
use axum_extra::extract::WithRejection;
use serde::Deserialize;

use services::RegistrationError;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub cpassword: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct UsernameCheck {
    pub username: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct PasswordCheck {
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<RegisterRequest>, ApiError>,
) -> Result<Json<bool>, ApiError> {
    match state
        .registration
        .register(&body.username, &body.password, &body.cpassword)
        .await
    {
        Ok(_) => Ok(Json(true)),
        Err(RegistrationError::Storage(e)) => Err(e.into()),
        Err(_) => Ok(Json(false)),
    }
}

pub async fn validate_username(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<UsernameCheck>, ApiError>,
) -> Result<Json<bool>, ApiError> {
    Ok(Json(state.registration.check_username(&body.username).await?))
}

pub async fn validate_password(
    State(state): State<AppState>,
    WithRejection(Json(body), _): WithRejection<Json<PasswordCheck>, ApiError>,
) -> Json<bool> {
    Json(state.registration.check_password(&body.password))
}
