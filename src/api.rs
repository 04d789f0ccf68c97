use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::auth::Sessions;
use crate::db::Db;
use crate::error::ReviewError;
use crate::models::ReviewAction;
use crate::session::Reviewer;

#[derive(Clone)]
pub struct ApiState {
    pub db: Db,
    pub sessions: Arc<Sessions>,
    pub reviewer: Arc<Reviewer>,
}

impl ApiState {
    pub fn new(db: Db) -> Self {
        Self {
            db,
            sessions: Arc::new(Sessions::new()),
            reviewer: Arc::new(Reviewer::new()),
        }
    }
}

pub fn app_router(state: ApiState) -> Router {
    Router::new()
        .route("/api/signup", post(signup))
        .route("/api/login", post(login))
        .route("/api/logout", post(logout))
        .route("/api/decks", get(list_decks).post(create_deck))
        .route("/api/decks/:deck_id", get(deck_detail))
        .route("/api/decks/:deck_id/cards", post(add_card))
        .route("/api/decks/:deck_id/cards/:index", put(edit_card))
        .route("/api/decks/:deck_id/review", get(start_review).post(submit_review))
        .route("/api/stats", get(stats_view))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn error_body(status: StatusCode, code: &str, message: &str) -> Response {
    (status, Json(json!({ "error": code, "message": message }))).into_response()
}

fn db_error(err: anyhow::Error) -> Response {
    log::error!("store error: {err:#}");
    error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal", "store error")
}

fn review_error(err: ReviewError) -> Response {
    match err {
        // The client should fall back to deck management.
        ReviewError::EmptyDeck => error_body(StatusCode::CONFLICT, "empty_deck", &err.to_string()),
        ReviewError::InvalidAction(_) => error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_action",
            &err.to_string(),
        ),
        ReviewError::InvalidDeckSize => {
            log::error!("review transition on an empty deck slipped past the handler guard");
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "internal", &err.to_string())
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Resolve the bearer token to a user id, or produce the 401 response the
/// handler should return as-is.
fn authed_user(state: &ApiState, headers: &HeaderMap) -> Result<String, Response> {
    let token = bearer_token(headers).ok_or_else(|| {
        error_body(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "missing bearer token",
        )
    })?;
    state.sessions.resolve(token).ok_or_else(|| {
        error_body(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            "unknown or revoked token",
        )
    })
}

#[derive(Deserialize)]
struct CredentialsRequest {
    email: String,
    password: String,
}

#[derive(Serialize)]
struct SessionResponse {
    token: String,
    user_id: String,
}

async fn signup(
    State(state): State<ApiState>,
    Json(payload): Json<CredentialsRequest>,
) -> Response {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_request",
            "email and password are required",
        );
    }
    match state.db.create_user(&payload.email, &payload.password).await {
        Ok(Some(user)) => {
            let token = state.sessions.issue(&user.id);
            log::info!("account created for {}", user.email);
            (
                StatusCode::CREATED,
                Json(SessionResponse {
                    token,
                    user_id: user.id,
                }),
            )
                .into_response()
        }
        Ok(None) => error_body(
            StatusCode::CONFLICT,
            "email_taken",
            "account already exists",
        ),
        Err(e) => db_error(e),
    }
}

async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<CredentialsRequest>,
) -> Response {
    match state.db.verify_login(&payload.email, &payload.password).await {
        Ok(Some(user)) => {
            let token = state.sessions.issue(&user.id);
            Json(SessionResponse {
                token,
                user_id: user.id,
            })
            .into_response()
        }
        Ok(None) => error_body(
            StatusCode::UNAUTHORIZED,
            "invalid_credentials",
            "invalid email or password",
        ),
        Err(e) => db_error(e),
    }
}

async fn logout(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.revoke(token);
    }
    StatusCode::NO_CONTENT.into_response()
}

#[derive(Deserialize)]
struct DeckQuery {
    q: Option<String>,
}

async fn list_decks(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Query(query): Query<DeckQuery>,
) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match state.db.list_decks(&user_id, query.q.as_deref()).await {
        Ok(decks) => Json(json!({ "decks": decks })).into_response(),
        Err(e) => db_error(e),
    }
}

#[derive(Deserialize)]
struct CreateDeckRequest {
    title: String,
    #[serde(default)]
    description: String,
}

async fn create_deck(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Json(payload): Json<CreateDeckRequest>,
) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if payload.title.trim().is_empty() {
        return error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_request",
            "deck title is required",
        );
    }
    match state
        .db
        .create_deck(&user_id, &payload.title, &payload.description)
        .await
    {
        Ok(deck) => {
            log::info!("deck {} created by {}", deck.id, user_id);
            (StatusCode::CREATED, Json(deck)).into_response()
        }
        Err(e) => db_error(e),
    }
}

async fn deck_detail(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(deck_id): Path<String>,
) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    match state.db.get_deck(&user_id, &deck_id).await {
        Ok(Some(deck)) => Json(deck).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "deck_not_found", "no such deck"),
        Err(e) => db_error(e),
    }
}

#[derive(Deserialize)]
struct CardRequest {
    front: String,
    back: String,
    hint: Option<String>,
}

async fn add_card(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(deck_id): Path<String>,
    Json(payload): Json<CardRequest>,
) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if payload.front.trim().is_empty() || payload.back.trim().is_empty() {
        return error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_request",
            "front and back are required",
        );
    }
    match state.db.get_deck(&user_id, &deck_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_body(StatusCode::NOT_FOUND, "deck_not_found", "no such deck"),
        Err(e) => return db_error(e),
    }
    match state
        .db
        .add_card(&deck_id, &payload.front, &payload.back, payload.hint.as_deref())
        .await
    {
        Ok(card) => (StatusCode::CREATED, Json(card)).into_response(),
        Err(e) => db_error(e),
    }
}

async fn edit_card(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path((deck_id, index)): Path<(String, usize)>,
    Json(payload): Json<CardRequest>,
) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if payload.front.trim().is_empty() || payload.back.trim().is_empty() {
        return error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "invalid_request",
            "front and back are required",
        );
    }
    match state.db.get_deck(&user_id, &deck_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return error_body(StatusCode::NOT_FOUND, "deck_not_found", "no such deck"),
        Err(e) => return db_error(e),
    }
    match state
        .db
        .update_card(
            &deck_id,
            index,
            &payload.front,
            &payload.back,
            payload.hint.as_deref(),
        )
        .await
    {
        Ok(Some(card)) => Json(card).into_response(),
        Ok(None) => error_body(StatusCode::NOT_FOUND, "card_not_found", "no card at that position"),
        Err(e) => db_error(e),
    }
}

async fn start_review(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(deck_id): Path<String>,
) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let deck = match state.db.get_deck(&user_id, &deck_id).await {
        Ok(Some(deck)) => deck,
        Ok(None) => return error_body(StatusCode::NOT_FOUND, "deck_not_found", "no such deck"),
        Err(e) => return db_error(e),
    };
    match state.reviewer.start_or_continue(&user_id, &deck) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => review_error(e),
    }
}

#[derive(Deserialize)]
struct ReviewRequest {
    action: ReviewAction,
}

async fn submit_review(
    State(state): State<ApiState>,
    headers: HeaderMap,
    Path(deck_id): Path<String>,
    Json(payload): Json<ReviewRequest>,
) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let deck = match state.db.get_deck(&user_id, &deck_id).await {
        Ok(Some(deck)) => deck,
        Ok(None) => return error_body(StatusCode::NOT_FOUND, "deck_not_found", "no such deck"),
        Err(e) => return db_error(e),
    };
    // Grading day comes from the server clock, never from the request.
    let today = Local::now().date_naive();
    match state.reviewer.submit(&user_id, &deck, payload.action, today) {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => review_error(e),
    }
}

async fn stats_view(State(state): State<ApiState>, headers: HeaderMap) -> Response {
    let user_id = match authed_user(&state, &headers) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    Json(state.reviewer.stats_view(&user_id)).into_response()
}
