#![forbid(unsafe_code)]

pub mod api;
pub mod error;
pub mod session;
pub mod state;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use services::QuizServices;

pub use error::ApiError;
pub use state::AppState;

/// All quiz routes over `services`.
pub fn router(services: &QuizServices) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/loginWithoutAccount", post(api::quiz::login_without_account))
        .route("/login", post(api::quiz::login))
        .route("/register", post(api::accounts::register))
        .route("/validateusername", post(api::accounts::validate_username))
        .route("/validatepassword", post(api::accounts::validate_password))
        .route("/getquestions", post(api::quiz::get_questions))
        .route("/validateanswer", post(api::quiz::validate_answer))
        .route("/storeuser", post(api::quiz::store_user))
        .route("/leaderboard", get(api::leaderboard::get_leaderboard))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState::new(services))
}

async fn health() -> &'static str {
    "ok"
}
