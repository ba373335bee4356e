use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Extra time applied by `PATCH /matches/{id}/extratime` when no body is sent.
pub const DEFAULT_EXTRA_TIME_MINUTES: i64 = 5;

/// Upper bound for every stored counter and for any single increment.
/// The `matches` table enforces the same bound with CHECK constraints.
pub const MAX_COUNTER: i64 = 10_000;

/// Row from the `matches` table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MatchRow {
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    pub match_date: String,
    pub home_goals: i64,
    pub away_goals: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    pub extra_time: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl MatchRow {
    /// Convert database row to API response format
    pub fn to_match(&self) -> Match {
        Match {
            id: self.id,
            home_team: self.home_team.clone(),
            away_team: self.away_team.clone(),
            match_date: self.match_date.clone(),
            home_goals: self.home_goals,
            away_goals: self.away_goals,
            yellow_cards: self.yellow_cards,
            red_cards: self.red_cards,
            extra_time: self.extra_time,
            created_at: self.created_at.clone(),
            updated_at: self.updated_at.clone(),
        }
    }
}

/// Match as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: i64,
    pub home_team: String,
    pub away_team: String,
    pub match_date: String,
    pub home_goals: i64,
    pub away_goals: i64,
    pub yellow_cards: i64,
    pub red_cards: i64,
    /// Extra time in minutes
    pub extra_time: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `POST /matches` and `PUT /matches/{id}`.
///
/// Everything is optional at decode time so that a missing team or date
/// becomes a 400 with a readable message instead of a serde error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchPayload {
    pub home_team: Option<String>,
    pub away_team: Option<String>,
    pub match_date: Option<String>,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
    pub yellow_cards: Option<i64>,
    pub red_cards: Option<i64>,
    pub extra_time: Option<i64>,
}

/// A payload that passed validation. Counters left as `None` were not sent.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMatch {
    pub home_team: String,
    pub away_team: String,
    pub match_date: String,
    pub home_goals: Option<i64>,
    pub away_goals: Option<i64>,
    pub yellow_cards: Option<i64>,
    pub red_cards: Option<i64>,
    pub extra_time: Option<i64>,
}

impl MatchPayload {
    pub fn validate(self) -> Result<NewMatch, ApiError> {
        let home_team = required("homeTeam", self.home_team)?;
        let away_team = required("awayTeam", self.away_team)?;
        let match_date = required("matchDate", self.match_date)?;

        Ok(NewMatch {
            home_team,
            away_team,
            match_date,
            home_goals: counter("homeGoals", self.home_goals)?,
            away_goals: counter("awayGoals", self.away_goals)?,
            yellow_cards: counter("yellowCards", self.yellow_cards)?,
            red_cards: counter("redCards", self.red_cards)?,
            extra_time: counter("extraTime", self.extra_time)?,
        })
    }
}

/// Body of `PATCH /matches/{id}/goals`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalsIncrement {
    #[serde(default)]
    pub home_goals: i64,
    #[serde(default)]
    pub away_goals: i64,
}

impl GoalsIncrement {
    /// Applied when the request carries no body: one home goal.
    pub const WITHOUT_BODY: GoalsIncrement = GoalsIncrement {
        home_goals: 1,
        away_goals: 0,
    };

    pub fn validate(self) -> Result<Self, ApiError> {
        counter("homeGoals", Some(self.home_goals))?;
        counter("awayGoals", Some(self.away_goals))?;
        Ok(self)
    }
}

/// Body of `PATCH /matches/{id}/extratime`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ExtraTimeUpdate {
    pub minutes: i64,
}

impl ExtraTimeUpdate {
    pub const WITHOUT_BODY: ExtraTimeUpdate = ExtraTimeUpdate {
        minutes: DEFAULT_EXTRA_TIME_MINUTES,
    };

    pub fn validate(self) -> Result<Self, ApiError> {
        counter("minutes", Some(self.minutes))?;
        Ok(self)
    }
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{field} is required"))),
    }
}

fn counter(field: &str, value: Option<i64>) -> Result<Option<i64>, ApiError> {
    match value {
        Some(v) if v < 0 => Err(ApiError::BadRequest(format!(
            "{field} must not be negative"
        ))),
        Some(v) if v > MAX_COUNTER => Err(ApiError::BadRequest(format!(
            "{field} must not exceed {MAX_COUNTER}"
        ))),
        other => Ok(other),
    }
}
