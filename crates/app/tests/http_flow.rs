use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Duration;
use serde_json::{Value, json};
use tower::ServiceExt;

use quiz_core::model::{Question, QuizSettings};
use quiz_core::time::fixed_clock;
use quiz_core::{DrawOrder, QuestionBank};
use services::QuizServices;

/// Every question's correct option is index 0.
fn test_router() -> Router {
    let bank = QuestionBank::new(
        (0..6)
            .map(|i| Question::new(format!("Q{i}"), vec!["yes".into(), "no".into()], 0).unwrap())
            .collect(),
    );
    let settings = QuizSettings::new(3, 10, Duration::hours(1)).unwrap();
    let services =
        QuizServices::in_memory(bank, settings, fixed_clock(), DrawOrder::Sequential).unwrap();
    app::router(&services)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_owned);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, set_cookie, json)
}

#[tokio::test]
async fn health_is_ok() {
    let app = test_router();
    let res = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn anonymous_quiz_over_http() {
    let app = test_router();

    let (status, cookie, body) = send(
        &app,
        "POST",
        "/loginWithoutAccount",
        None,
        Some(json!({"username": "alice"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.expect("session cookie set");
    assert!(cookie.starts_with("session="));
    assert_eq!(body["userObject"]["player"]["displayName"], "alice");
    assert_eq!(body["userObject"]["score"], 0);

    let (status, _, questions) = send(&app, "POST", "/getquestions", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    let questions = questions.as_array().unwrap();
    assert_eq!(questions.len(), 3);
    assert!(questions[0].get("correct_index").is_none());

    let (status, _, outcome) = send(
        &app,
        "POST",
        "/validateanswer",
        Some(&cookie),
        Some(json!({"questionNumber": 0, "chosenAnswer": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["correct"], true);
    assert_eq!(outcome["currentScore"], 1);

    let (status, _, err) = send(
        &app,
        "POST",
        "/validateanswer",
        Some(&cookie),
        Some(json!({"questionNumber": 0, "chosenAnswer": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(err["error"].as_str().unwrap().contains("already answered"));

    let (status, _, stored) = send(&app, "POST", "/storeuser", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["score"], 1);
    assert_eq!(stored["total"], 3);

    let (status, _, _) = send(&app, "POST", "/getquestions", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, board) = send(&app, "GET", "/leaderboard?limit=5", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(board[0]["player"], "alice");
    assert_eq!(board[0]["anonymous"], true);
}

#[tokio::test]
async fn answering_without_a_session_is_bad_request() {
    let app = test_router();
    let (status, _, body) = send(
        &app,
        "POST",
        "/validateanswer",
        None,
        Some(json!({"questionNumber": 0, "chosenAnswer": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn restarting_replaces_the_previous_quiz() {
    let app = test_router();
    let (_, cookie, _) = send(
        &app,
        "POST",
        "/loginWithoutAccount",
        None,
        Some(json!({"username": "first"})),
    )
    .await;
    let cookie = cookie.unwrap();
    send(&app, "POST", "/getquestions", Some(&cookie), None).await;

    let (status, reissued, body) = send(
        &app,
        "POST",
        "/loginWithoutAccount",
        Some(&cookie),
        Some(json!({"username": "second"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(reissued.is_none());
    assert_eq!(body["userObject"]["player"]["displayName"], "second");
    assert_eq!(body["userObject"]["phase"], "started");

    let (status, _, _) = send(&app, "POST", "/getquestions", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn register_validate_and_login() {
    let app = test_router();

    let (_, _, ok) = send(
        &app,
        "POST",
        "/validateusername",
        None,
        Some(json!({"USERNAME": "erin"})),
    )
    .await;
    assert_eq!(ok, true);
    let (_, _, weak) = send(
        &app,
        "POST",
        "/validatepassword",
        None,
        Some(json!({"PASSWORD": "short"})),
    )
    .await;
    assert_eq!(weak, false);

    let (status, _, registered) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"USERNAME": "erin", "PASSWORD": "hunter22", "CPASSWORD": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(registered, true);

    let (_, _, again) = send(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({"USERNAME": "erin", "PASSWORD": "hunter22", "CPASSWORD": "hunter22"})),
    )
    .await;
    assert_eq!(again, false);

    let (status, cookie, _) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "erin", "password": "wrong123"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(cookie.is_none());

    let (status, cookie, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({"username": "erin", "password": "hunter22"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_some());
    assert_eq!(body["userObject"]["player"]["kind"], "authenticated");
    assert_eq!(body["userObject"]["player"]["username"], "erin");
}

async fn started_quiz(app: &Router) -> String {
    let (_, cookie, _) = send(
        app,
        "POST",
        "/loginWithoutAccount",
        None,
        Some(json!({"username": "alice"})),
    )
    .await;
    let cookie = cookie.unwrap();
    send(app, "POST", "/getquestions", Some(&cookie), None).await;
    cookie
}

#[tokio::test]
async fn negative_question_number_is_a_json_bad_request() {
    let app = test_router();
    let cookie = started_quiz(&app).await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/validateanswer",
        Some(&cookie),
        Some(json!({"questionNumber": -1, "chosenAnswer": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("out of range"));
}

#[tokio::test]
async fn negative_choice_is_graded_wrong() {
    let app = test_router();
    let cookie = started_quiz(&app).await;

    let (status, _, outcome) = send(
        &app,
        "POST",
        "/validateanswer",
        Some(&cookie),
        Some(json!({"questionNumber": 0, "chosenAnswer": -3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["correct"], false);
    assert_eq!(outcome["answered"], 1);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
    let app = test_router();
    let cookie = started_quiz(&app).await;

    let (status, _, body) = send(
        &app,
        "POST",
        "/validateanswer",
        Some(&cookie),
        Some(json!({"questionNumber": "first", "chosenAnswer": 0})),
    )
    .await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());

    let (status, _, body) = send(&app, "POST", "/register", None, Some(json!({}))).await;
    assert!(status.is_client_error());
    assert!(body["error"].is_string());

    let (status, _, body) = send(&app, "GET", "/leaderboard?limit=lots", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn session_cookie_lives_as_long_as_the_idle_timeout() {
    let app = test_router();
    let req = Request::post("/loginWithoutAccount")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"username": "alice"}).to_string()))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();
    let set_cookie = res
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap();
    assert!(set_cookie.contains("Max-Age=3600"));
    assert!(set_cookie.contains("HttpOnly"));
}
