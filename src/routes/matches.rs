use axum::{
    body::Bytes,
    extract::{FromRequestParts, Path, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, patch},
    Router,
};
use serde::de::DeserializeOwned;
use sqlx::sqlite::SqlitePool;

use crate::db;
use crate::error::ApiError;
use crate::models::{ExtraTimeUpdate, GoalsIncrement, Match, MatchPayload, MatchRow};

/// Match routes, mounted at the root and again under `/api`.
pub fn router() -> Router<SqlitePool> {
    Router::new()
        .route("/matches", get(list_matches).post(create_match))
        .route(
            "/matches/{id}",
            get(get_match).put(replace_match).delete(delete_match),
        )
        .route("/matches/{id}/goals", patch(increment_goals))
        .route("/matches/{id}/yellowcards", patch(increment_yellow_cards))
        .route("/matches/{id}/redcards", patch(increment_red_cards))
        .route("/matches/{id}/extratime", patch(set_extra_time))
}

/// `{id}` path segment. A non-numeric id is a 400 with a JSON body.
pub struct MatchId(pub i64);

impl<S> FromRequestParts<S> for MatchId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        Ok(MatchId(id))
    }
}

/// Decode a JSON body, treating an empty (or whitespace-only) body as absent.
fn decode_body<T: DeserializeOwned>(body: &Bytes) -> Result<Option<T>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|err| ApiError::BadRequest(format!("Invalid JSON body: {}", err)))
}

fn require_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, ApiError> {
    decode_body(body)?.ok_or_else(|| ApiError::BadRequest("Request body is required".to_string()))
}

// GET /matches - List all matches
pub async fn list_matches(
    State(pool): State<SqlitePool>,
) -> Result<Json<Vec<Match>>, ApiError> {
    let rows = db::list_matches(&pool).await?;

    Ok(Json(rows.iter().map(MatchRow::to_match).collect()))
}

// GET /matches/:id - Get match by ID
pub async fn get_match(
    State(pool): State<SqlitePool>,
    MatchId(match_id): MatchId,
) -> Result<Json<Match>, ApiError> {
    let row = db::get_match(&pool, match_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(row.to_match()))
}

// POST /matches - Create a match
pub async fn create_match(
    State(pool): State<SqlitePool>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let new = require_body::<MatchPayload>(&body)?.validate()?;
    let row = db::insert_match(&pool, &new).await?;

    tracing::info!(match_id = row.id, "Created match {} vs {}", row.home_team, row.away_team);

    Ok((StatusCode::CREATED, Json(row.to_match())))
}

// PUT /matches/:id - Replace a match
pub async fn replace_match(
    State(pool): State<SqlitePool>,
    MatchId(match_id): MatchId,
    body: Bytes,
) -> Result<Json<Match>, ApiError> {
    let new = require_body::<MatchPayload>(&body)?.validate()?;
    let row = db::replace_match(&pool, match_id, &new)
        .await?
        .ok_or(ApiError::NotFound)?;

    tracing::info!(match_id, "Replaced match");

    Ok(Json(row.to_match()))
}

// DELETE /matches/:id - Delete a match
pub async fn delete_match(
    State(pool): State<SqlitePool>,
    MatchId(match_id): MatchId,
) -> Result<StatusCode, ApiError> {
    if !db::delete_match(&pool, match_id).await? {
        return Err(ApiError::NotFound);
    }

    tracing::info!(match_id, "Deleted match");

    Ok(StatusCode::NO_CONTENT)
}

// PATCH /matches/:id/goals - Add goals; no body means one home goal
pub async fn increment_goals(
    State(pool): State<SqlitePool>,
    MatchId(match_id): MatchId,
    body: Bytes,
) -> Result<Json<Match>, ApiError> {
    let goals = decode_body::<GoalsIncrement>(&body)?
        .unwrap_or(GoalsIncrement::WITHOUT_BODY)
        .validate()?;

    let row = db::increment_goals(&pool, match_id, goals)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(row.to_match()))
}

// PATCH /matches/:id/yellowcards - One more yellow card
pub async fn increment_yellow_cards(
    State(pool): State<SqlitePool>,
    MatchId(match_id): MatchId,
) -> Result<Json<Match>, ApiError> {
    let row = db::increment_yellow_cards(&pool, match_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(row.to_match()))
}

// PATCH /matches/:id/redcards - One more red card
pub async fn increment_red_cards(
    State(pool): State<SqlitePool>,
    MatchId(match_id): MatchId,
) -> Result<Json<Match>, ApiError> {
    let row = db::increment_red_cards(&pool, match_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(row.to_match()))
}

// PATCH /matches/:id/extratime - Set extra time minutes (overwrites)
pub async fn set_extra_time(
    State(pool): State<SqlitePool>,
    MatchId(match_id): MatchId,
    body: Bytes,
) -> Result<Json<Match>, ApiError> {
    let update = decode_body::<ExtraTimeUpdate>(&body)?
        .unwrap_or(ExtraTimeUpdate::WITHOUT_BODY)
        .validate()?;

    let row = db::set_extra_time(&pool, match_id, update.minutes)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(row.to_match()))
}
