use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::models::{GoalsIncrement, MatchRow, NewMatch, MAX_COUNTER};

/// Builds the `CREATE TABLE` statement. Counter columns are bounded so an
/// increment can never push a value outside the `i64` range.
fn create_matches_table() -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            home_team    TEXT    NOT NULL,
            away_team    TEXT    NOT NULL,
            match_date   TEXT    NOT NULL,
            home_goals   INTEGER NOT NULL DEFAULT 0 CHECK (home_goals   BETWEEN 0 AND {max}),
            away_goals   INTEGER NOT NULL DEFAULT 0 CHECK (away_goals   BETWEEN 0 AND {max}),
            yellow_cards INTEGER NOT NULL DEFAULT 0 CHECK (yellow_cards BETWEEN 0 AND {max}),
            red_cards    INTEGER NOT NULL DEFAULT 0 CHECK (red_cards    BETWEEN 0 AND {max}),
            extra_time   INTEGER NOT NULL DEFAULT 0 CHECK (extra_time   BETWEEN 0 AND {max}),
            created_at   TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now')),
            updated_at   TEXT    NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
        )"#,
        max = MAX_COUNTER
    )
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

/// Open the pool, check the database answers, and make sure the table exists.
pub async fn open(config: &DatabaseConfig) -> Result<SqlitePool, StoreError> {
    let options = SqliteConnectOptions::from_str(&config.url)
        .map_err(StoreError::Connection)?
        .create_if_missing(true);

    // An in-memory database is private to its connection, so the pool gets
    // exactly one and never recycles it.
    let max_connections = if is_in_memory(&config.url) {
        1
    } else {
        config.max_connections
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(StoreError::Connection)?;

    ping(&pool).await.map_err(StoreError::Connection)?;
    ensure_schema(&pool).await.map_err(StoreError::Schema)?;

    Ok(pool)
}

pub async fn ping(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await.map(|_| ())
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let sql = create_matches_table();
    sqlx::query(&sql).execute(pool).await.map(|_| ())
}

// Match queries
pub async fn list_matches(pool: &SqlitePool) -> Result<Vec<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"SELECT * FROM matches ORDER BY id"#
    )
    .fetch_all(pool)
    .await
}

pub async fn get_match(pool: &SqlitePool, match_id: i64) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"SELECT * FROM matches WHERE id = ?"#
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

pub async fn insert_match(pool: &SqlitePool, new: &NewMatch) -> Result<MatchRow, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"INSERT INTO matches
               (home_team, away_team, match_date, home_goals, away_goals,
                yellow_cards, red_cards, extra_time)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?)
           RETURNING *"#
    )
    .bind(&new.home_team)
    .bind(&new.away_team)
    .bind(&new.match_date)
    .bind(new.home_goals.unwrap_or(0))
    .bind(new.away_goals.unwrap_or(0))
    .bind(new.yellow_cards.unwrap_or(0))
    .bind(new.red_cards.unwrap_or(0))
    .bind(new.extra_time.unwrap_or(0))
    .fetch_one(pool)
    .await
}

// Mutations below touch the row in a single statement and report a missing
// id through `RETURNING` (or `rows_affected`), never through a prior SELECT.
// `updated_at` moves forward at least one millisecond on every update, even
// when two writes land within the same clock tick.

/// Overwrite teams and date. Counters that were not sent keep their value.
pub async fn replace_match(
    pool: &SqlitePool,
    match_id: i64,
    new: &NewMatch,
) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"UPDATE matches SET
               home_team    = ?,
               away_team    = ?,
               match_date   = ?,
               home_goals   = COALESCE(?, home_goals),
               away_goals   = COALESCE(?, away_goals),
               yellow_cards = COALESCE(?, yellow_cards),
               red_cards    = COALESCE(?, red_cards),
               extra_time   = COALESCE(?, extra_time),
               updated_at   = MAX(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                                 strftime('%Y-%m-%dT%H:%M:%fZ', updated_at, '+0.001 seconds'))
           WHERE id = ?
           RETURNING *"#
    )
    .bind(&new.home_team)
    .bind(&new.away_team)
    .bind(&new.match_date)
    .bind(new.home_goals)
    .bind(new.away_goals)
    .bind(new.yellow_cards)
    .bind(new.red_cards)
    .bind(new.extra_time)
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

pub async fn increment_goals(
    pool: &SqlitePool,
    match_id: i64,
    goals: GoalsIncrement,
) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"UPDATE matches SET
               home_goals = home_goals + ?,
               away_goals = away_goals + ?,
               updated_at = MAX(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                                 strftime('%Y-%m-%dT%H:%M:%fZ', updated_at, '+0.001 seconds'))
           WHERE id = ?
           RETURNING *"#
    )
    .bind(goals.home_goals)
    .bind(goals.away_goals)
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

pub async fn increment_yellow_cards(pool: &SqlitePool, match_id: i64) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"UPDATE matches SET
               yellow_cards = yellow_cards + 1,
               updated_at   = MAX(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                                 strftime('%Y-%m-%dT%H:%M:%fZ', updated_at, '+0.001 seconds'))
           WHERE id = ?
           RETURNING *"#
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

pub async fn increment_red_cards(pool: &SqlitePool, match_id: i64) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"UPDATE matches SET
               red_cards  = red_cards + 1,
               updated_at = MAX(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                                 strftime('%Y-%m-%dT%H:%M:%fZ', updated_at, '+0.001 seconds'))
           WHERE id = ?
           RETURNING *"#
    )
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

pub async fn set_extra_time(
    pool: &SqlitePool,
    match_id: i64,
    minutes: i64,
) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"UPDATE matches SET
               extra_time = ?,
               updated_at = MAX(strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                                 strftime('%Y-%m-%dT%H:%M:%fZ', updated_at, '+0.001 seconds'))
           WHERE id = ?
           RETURNING *"#
    )
    .bind(minutes)
    .bind(match_id)
    .fetch_optional(pool)
    .await
}

/// Returns `false` when no row had that id.
pub async fn delete_match(pool: &SqlitePool, match_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(r#"DELETE FROM matches WHERE id = ?"#)
        .bind(match_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
