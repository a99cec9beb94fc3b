//! PostgreSQL rating store for production use.
//!
//! ## Configuration
//!
//! All settings can be configured via environment variables:
//! - `DATABASE_URL`: PostgreSQL connection string (required)
//! - `DB_MAX_CONNECTIONS`: Maximum pool size (default: 10)
//! - `DB_MIN_CONNECTIONS`: Minimum idle connections (default: 2)
//! - `DB_CONNECT_TIMEOUT_SECS`: Connection timeout (default: 10)
//! - `DB_IDLE_TIMEOUT_SECS`: Idle connection timeout (default: 300)
//! - `DB_MAX_LIFETIME_SECS`: Max connection lifetime (default: 1800)
//!
//! ## Tables
//!
//! `books` and `readings` belong to the catalog. This store only reads them.
//! It owns `yearly_ratings` and `all_time_ratings`; see
//! [`YEARLY_RATINGS_SCHEMA`] and [`ALL_TIME_RATINGS_SCHEMA`]. Both cascade
//! on reading deletion, so removed readings take their rows with them.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use std::time::Duration;

use crate::types::{Book, BookId, RatingRow, RatingScope, Reading, Tier};
use super::RatingStore;

/// DDL for per-year rating rows.
pub const YEARLY_RATINGS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS yearly_ratings (
    year INTEGER NOT NULL,
    reading_id UUID NOT NULL REFERENCES readings(id) ON DELETE CASCADE,
    tier TEXT NOT NULL CHECK (tier IN ('S', 'A', 'B', 'C', 'D', 'F')),
    position INTEGER NOT NULL CHECK (position >= 0),
    PRIMARY KEY (year, reading_id)
)
"#;

/// DDL for all-time rating rows.
pub const ALL_TIME_RATINGS_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS all_time_ratings (
    reading_id UUID PRIMARY KEY REFERENCES readings(id) ON DELETE CASCADE,
    tier TEXT NOT NULL CHECK (tier IN ('S', 'A', 'B', 'C', 'D', 'F')),
    position INTEGER NOT NULL CHECK (position >= 0)
)
"#;

/// Configuration for PostgreSQL connection pool.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL.
    pub database_url: String,
    /// Maximum connections in pool (default: 10).
    pub max_connections: u32,
    /// Minimum idle connections to keep warm (default: 2).
    pub min_connections: u32,
    /// Connection acquire timeout in seconds (default: 10).
    pub connect_timeout_secs: u64,
    /// Idle connection timeout in seconds (default: 300 = 5 min).
    pub idle_timeout_secs: u64,
    /// Maximum connection lifetime in seconds (default: 1800 = 30 min).
    pub max_lifetime_secs: u64,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

impl PostgresConfig {
    /// Load configuration from environment variables with production defaults.
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgresql://localhost/bookclub".to_string()),
            max_connections: env_or("DB_MAX_CONNECTIONS", 10),
            min_connections: env_or("DB_MIN_CONNECTIONS", 2),
            connect_timeout_secs: env_or("DB_CONNECT_TIMEOUT_SECS", 10),
            idle_timeout_secs: env_or("DB_IDLE_TIMEOUT_SECS", 300),
            max_lifetime_secs: env_or("DB_MAX_LIFETIME_SECS", 1800),
        }
    }
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// PostgreSQL rating store.
pub struct PostgresRatingStore {
    pool: PgPool,
}

impl PostgresRatingStore {
    /// Create a new store with the given configuration.
    pub async fn new(config: PostgresConfig) -> Result<Self, sqlx::Error> {
        tracing::info!(
            max_connections = config.max_connections,
            min_connections = config.min_connections,
            connect_timeout_secs = config.connect_timeout_secs,
            idle_timeout_secs = config.idle_timeout_secs,
            max_lifetime_secs = config.max_lifetime_secs,
            "Initializing PostgreSQL connection pool"
        );

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
            .test_before_acquire(true)
            .connect(&config.database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create a store from environment variables.
    pub async fn from_env() -> Result<Self, sqlx::Error> {
        Self::new(PostgresConfig::from_env()).await
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the rating tables if they do not exist.
    pub async fn ensure_schema(&self) -> Result<(), sqlx::Error> {
        sqlx::query(YEARLY_RATINGS_SCHEMA).execute(&self.pool).await?;
        sqlx::query(ALL_TIME_RATINGS_SCHEMA).execute(&self.pool).await?;
        Ok(())
    }

    /// Get pool statistics for monitoring.
    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle(),
            max: self.pool.options().get_max_connections(),
        }
    }

    fn parse_reading_row(row: &PgRow) -> Result<Reading, PostgresError> {
        let id: String = row.try_get("id")?;
        let start_month: i32 = row.try_get("start_month")?;
        let end_month: i32 = row.try_get("end_month")?;

        Ok(Reading {
            book_id: BookId::new(row.try_get::<String, _>("book_id")?),
            year: row.try_get("year")?,
            start_month: month(&id, start_month)?,
            end_month: month(&id, end_month)?,
            notes: row.try_get("notes")?,
            id: id.into(),
        })
    }

    /// Decode a rating row, or `None` if it cannot be represented.
    ///
    /// The table has CHECK constraints, but rows written before they existed
    /// may carry legacy tiers or negative positions.
    fn parse_rating_row(row: &PgRow) -> Result<Option<RatingRow>, PostgresError> {
        let reading_id: String = row.try_get("reading_id")?;
        let tier_label: String = row.try_get("tier")?;
        let position: i32 = row.try_get("position")?;

        let Some(tier) = Tier::from_str(&tier_label) else {
            tracing::warn!(reading_id = %reading_id, tier = %tier_label, "Skipping rating row with unknown tier");
            return Ok(None);
        };
        let Ok(position) = u32::try_from(position) else {
            tracing::warn!(reading_id = %reading_id, position, "Skipping rating row with negative position");
            return Ok(None);
        };

        Ok(Some(RatingRow::new(reading_id, tier, position)))
    }
}

fn month(reading_id: &str, value: i32) -> Result<u32, PostgresError> {
    u32::try_from(value)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| PostgresError::InvalidMonth {
            reading_id: reading_id.to_string(),
            value,
        })
}

/// Pool statistics for monitoring.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PoolStats {
    /// Current pool size.
    pub size: u32,
    /// Number of idle connections.
    pub idle: usize,
    /// Maximum pool size.
    pub max: u32,
}

/// Error type for PostgreSQL store.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    /// A reading row carries a month outside 1..=12.
    #[error("Reading {reading_id} has invalid month {value}")]
    InvalidMonth {
        /// Offending reading.
        reading_id: String,
        /// Stored value.
        value: i32,
    },
    /// A rating position does not fit the `INTEGER` column.
    #[error("Reading {reading_id} has position {position} beyond the column range")]
    PositionOutOfRange {
        /// Offending reading.
        reading_id: String,
        /// Position on the board.
        position: u32,
    },
}

fn column_positions(rows: &[RatingRow]) -> Result<Vec<i32>, PostgresError> {
    rows.iter()
        .map(|r| {
            i32::try_from(r.position).map_err(|_| PostgresError::PositionOutOfRange {
                reading_id: r.reading_id.as_str().to_string(),
                position: r.position,
            })
        })
        .collect()
}

#[async_trait]
impl RatingStore for PostgresRatingStore {
    type Error = PostgresError;

    async fn list_years(&self) -> Result<Vec<i32>, Self::Error> {
        let rows = sqlx::query("SELECT DISTINCT year FROM readings ORDER BY year DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| row.try_get::<i32, _>("year").map_err(PostgresError::from))
            .collect()
    }

    async fn load_readings(&self, scope: RatingScope) -> Result<Vec<Reading>, Self::Error> {
        let rows = match scope {
            RatingScope::Year(year) => {
                sqlx::query(
                    r#"
                    SELECT id::text AS id, book_id::text AS book_id, year,
                           start_month, end_month, notes
                    FROM readings
                    WHERE year = $1
                    ORDER BY year, start_month, end_month, id::text
                    "#
                )
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
            RatingScope::AllTime => {
                sqlx::query(
                    r#"
                    SELECT id::text AS id, book_id::text AS book_id, year,
                           start_month, end_month, notes
                    FROM readings
                    ORDER BY year, start_month, end_month, id::text
                    "#
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(Self::parse_reading_row).collect()
    }

    async fn load_books(&self, ids: &[BookId]) -> Result<Vec<Book>, Self::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let rows = sqlx::query(
            r#"
            SELECT id::text AS id, title, author, image_url, description
            FROM books
            WHERE id::text = ANY($1)
            ORDER BY id
            "#
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<Book, PostgresError> {
                Ok(Book {
                    id: BookId::new(row.try_get::<String, _>("id")?),
                    title: row.try_get("title")?,
                    author: row.try_get("author")?,
                    image_url: row.try_get::<Option<String>, _>("image_url")?.unwrap_or_default(),
                    description: row.try_get("description")?,
                })
            })
            .collect()
    }

    async fn load_ratings(&self, scope: RatingScope) -> Result<Vec<RatingRow>, Self::Error> {
        let rows = match scope {
            RatingScope::Year(year) => {
                sqlx::query(
                    r#"
                    SELECT reading_id::text AS reading_id, tier, position
                    FROM yearly_ratings
                    WHERE year = $1
                    ORDER BY tier, position
                    "#
                )
                .bind(year)
                .fetch_all(&self.pool)
                .await?
            }
            RatingScope::AllTime => {
                sqlx::query(
                    r#"
                    SELECT reading_id::text AS reading_id, tier, position
                    FROM all_time_ratings
                    ORDER BY tier, position
                    "#
                )
                .fetch_all(&self.pool)
                .await?
            }
        };

        let mut ratings = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(rating) = Self::parse_rating_row(row)? {
                ratings.push(rating);
            }
        }
        Ok(ratings)
    }

    async fn replace_ratings(&self, scope: RatingScope, rows: &[RatingRow]) -> Result<(), Self::Error> {
        let reading_ids: Vec<String> = rows.iter().map(|r| r.reading_id.as_str().to_string()).collect();
        let tiers: Vec<String> = rows.iter().map(|r| r.tier.as_str().to_string()).collect();
        let positions = column_positions(rows)?;

        let mut tx = self.pool.begin().await?;

        let deleted = match scope {
            RatingScope::Year(year) => {
                sqlx::query("DELETE FROM yearly_ratings WHERE year = $1")
                    .bind(year)
                    .execute(&mut *tx)
                    .await?
            }
            RatingScope::AllTime => {
                sqlx::query("DELETE FROM all_time_ratings")
                    .execute(&mut *tx)
                    .await?
            }
        }
        .rows_affected();

        if !rows.is_empty() {
            match scope {
                RatingScope::Year(year) => {
                    sqlx::query(
                        r#"
                        INSERT INTO yearly_ratings (year, reading_id, tier, position)
                        SELECT $1, r.reading_id::uuid, r.tier, r.position
                        FROM UNNEST($2::text[], $3::text[], $4::int4[])
                            AS r(reading_id, tier, position)
                        "#
                    )
                    .bind(year)
                    .bind(&reading_ids)
                    .bind(&tiers)
                    .bind(&positions)
                    .execute(&mut *tx)
                    .await?;
                }
                RatingScope::AllTime => {
                    sqlx::query(
                        r#"
                        INSERT INTO all_time_ratings (reading_id, tier, position)
                        SELECT r.reading_id::uuid, r.tier, r.position
                        FROM UNNEST($1::text[], $2::text[], $3::int4[])
                            AS r(reading_id, tier, position)
                        "#
                    )
                    .bind(&reading_ids)
                    .bind(&tiers)
                    .bind(&positions)
                    .execute(&mut *tx)
                    .await?;
                }
            }
        }

        tx.commit().await?;

        tracing::info!(
            scope = %scope,
            deleted,
            inserted = rows.len(),
            "Replaced rating rows"
        );
        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .is_ok()
    }
}
