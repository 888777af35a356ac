//! Database repository for content, accounts and match history.
//!
//! Uses prepared statements and transactions for data integrity.

use chrono::{SecondsFormat, Utc};
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    Caption, CorrectCaption, Meme, MatchDetail, MatchSummary, MemeCaption, User, UserCredentials,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== MEME OPERATIONS ====================

    /// List all memes.
    pub async fn list_memes(&self) -> Result<Vec<Meme>, AppError> {
        let rows = sqlx::query("SELECT id, image_url, title FROM memes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(meme_from_row).collect())
    }

    /// List the ids of every meme.
    pub async fn list_meme_ids(&self) -> Result<Vec<i64>, AppError> {
        let rows = sqlx::query("SELECT id FROM memes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(|row| row.get("id")).collect())
    }

    /// Get a meme by ID.
    pub async fn get_meme(&self, id: i64) -> Result<Option<Meme>, AppError> {
        let row = sqlx::query("SELECT id, image_url, title FROM memes WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(meme_from_row))
    }

    /// Create a new meme.
    pub async fn create_meme(&self, image_url: &str, title: &str) -> Result<Meme, AppError> {
        let result = sqlx::query("INSERT INTO memes (image_url, title) VALUES (?, ?)")
            .bind(image_url)
            .bind(title)
            .execute(&self.pool)
            .await?;

        Ok(Meme {
            id: result.last_insert_rowid(),
            image_url: image_url.to_string(),
            title: title.to_string(),
        })
    }

    // ==================== CAPTION OPERATIONS ====================

    /// List all captions.
    pub async fn list_captions(&self) -> Result<Vec<Caption>, AppError> {
        let rows = sqlx::query("SELECT id, text FROM captions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.iter().map(caption_from_row).collect())
    }

    /// Get a caption by ID.
    pub async fn get_caption(&self, id: i64) -> Result<Option<Caption>, AppError> {
        let row = sqlx::query("SELECT id, text FROM captions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(caption_from_row))
    }

    /// Create a new caption.
    pub async fn create_caption(&self, text: &str) -> Result<Caption, AppError> {
        let result = sqlx::query("INSERT INTO captions (text) VALUES (?)")
            .bind(text)
            .execute(&self.pool)
            .await?;

        Ok(Caption {
            id: result.last_insert_rowid(),
            text: text.to_string(),
        })
    }

    // ==================== ASSOCIATION OPERATIONS ====================

    /// Correct captions for a meme, highest point value first.
    pub async fn correct_captions(&self, meme_id: i64) -> Result<Vec<CorrectCaption>, AppError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.text, mc.points
               FROM meme_captions mc
               JOIN captions c ON c.id = mc.caption_id
               WHERE mc.meme_id = ?
               ORDER BY mc.points DESC"#,
        )
        .bind(meme_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| CorrectCaption {
                id: row.get("id"),
                text: row.get("text"),
                points: row.get("points"),
            })
            .collect())
    }

    /// Up to `limit` random captions that are not correct for the meme.
    pub async fn random_distractors(
        &self,
        meme_id: i64,
        limit: usize,
    ) -> Result<Vec<Caption>, AppError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"SELECT id, text FROM captions
               WHERE id NOT IN (SELECT caption_id FROM meme_captions WHERE meme_id = ?)
               ORDER BY RANDOM()
               LIMIT ?"#,
        )
        .bind(meme_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(caption_from_row).collect())
    }

    /// Insert a meme-caption association.
    ///
    /// The `(meme_id, points)` and `(meme_id, caption_id)` uniqueness constraints are
    /// enforced by the table; violations surface as validation errors.
    pub async fn create_association(
        &self,
        meme_id: i64,
        caption_id: i64,
        points: i64,
    ) -> Result<MemeCaption, AppError> {
        sqlx::query("INSERT INTO meme_captions (meme_id, caption_id, points) VALUES (?, ?, ?)")
            .bind(meme_id)
            .bind(caption_id)
            .bind(points)
            .execute(&self.pool)
            .await?;

        Ok(MemeCaption {
            meme_id,
            caption_id,
            points,
        })
    }

    /// Remove a meme-caption association.
    pub async fn delete_association(&self, meme_id: i64, caption_id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM meme_captions WHERE meme_id = ? AND caption_id = ?")
            .bind(meme_id)
            .bind(caption_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Caption {} is not associated with meme {}",
                caption_id, meme_id
            )));
        }

        Ok(())
    }

    // ==================== USER OPERATIONS ====================

    /// Create a new user with zero points.
    pub async fn create_user(
        &self,
        name: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO users (id, name, username, password_hash, points, created_at) VALUES (?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(name)
        .bind(username)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Validation(_) => {
                AppError::Validation(format!("Username {} is already taken", username))
            }
            other => other,
        })?;

        Ok(User {
            id,
            name: name.to_string(),
            username: username.to_string(),
            points: 0,
            created_at: now,
        })
    }

    /// Get a user by ID.
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let row =
            sqlx::query("SELECT id, name, username, points, created_at FROM users WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Look up a user and stored password hash by login identifier.
    pub async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, username, points, created_at, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| UserCredentials {
            user: user_from_row(row),
            password_hash: row.get("password_hash"),
        }))
    }

    // ==================== MATCH OPERATIONS ====================

    /// Store a finished match and add its total to the owner's points atomically.
    ///
    /// A match id can be stored once; a second insert leaves the user's points alone.
    pub async fn insert_match(
        &self,
        id: &str,
        user_id: &str,
        rounds_json: &str,
        total_points: i64,
    ) -> Result<(), AppError> {
        // Fixed-width timestamps keep `ORDER BY created_at` chronological.
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query("UPDATE users SET points = points + ? WHERE id = ?")
            .bind(total_points)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        if updated.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User {} not found", user_id)));
        }

        sqlx::query(
            "INSERT INTO matches (id, user_id, rounds, total_points, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(user_id)
        .bind(rounds_json)
        .bind(total_points)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Validation(_) => {
                AppError::InvalidState(format!("Match {} is already archived", id))
            }
            other => other,
        })?;

        tx.commit().await?;

        Ok(())
    }

    /// List a user's matches, most recent first.
    pub async fn list_matches(&self, user_id: &str) -> Result<Vec<MatchSummary>, AppError> {
        let rows = sqlx::query(
            r#"SELECT id, rounds, total_points, created_at FROM matches
               WHERE user_id = ?
               ORDER BY created_at DESC, rowid DESC"#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|row| {
                let rounds: String = row.get("rounds");
                MatchSummary {
                    id: row.get("id"),
                    total_points: row.get("total_points"),
                    round_count: parse_rounds(&rounds).len(),
                    created_at: row.get("created_at"),
                }
            })
            .collect())
    }

    /// Get an archived match by ID.
    pub async fn get_match(&self, id: &str) -> Result<Option<MatchDetail>, AppError> {
        let row = sqlx::query(
            "SELECT id, user_id, rounds, total_points, created_at FROM matches WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(|row| {
            let rounds: String = row.get("rounds");
            MatchDetail {
                id: row.get("id"),
                user_id: row.get("user_id"),
                total_points: row.get("total_points"),
                created_at: row.get("created_at"),
                rounds: parse_rounds(&rounds),
            }
        }))
    }
}

// Helper functions for row conversion

fn meme_from_row(row: &sqlx::sqlite::SqliteRow) -> Meme {
    Meme {
        id: row.get("id"),
        image_url: row.get("image_url"),
        title: row.get("title"),
    }
}

fn caption_from_row(row: &sqlx::sqlite::SqliteRow) -> Caption {
    Caption {
        id: row.get("id"),
        text: row.get("text"),
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        username: row.get("username"),
        points: row.get("points"),
        created_at: row.get("created_at"),
    }
}

fn parse_rounds(s: &str) -> Vec<serde_json::Value> {
    serde_json::from_str(s).unwrap_or_default()
}
