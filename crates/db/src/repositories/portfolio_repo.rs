//! Repository for the `portfolios` table.
//!
//! A portfolio is owned 1:1 by a user via username. Saves are full-document
//! replacements: every editable column is overwritten in a single UPDATE,
//! so the last writer wins and subscribers never observe a half-applied
//! document.

use sqlx::PgPool;

use crate::models::portfolio::{Portfolio, PortfolioContent};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, username, display_name, title, bio, contacts, skills, \
                        projects, testimonials, theme, is_published, \
                        profile_picture_url, resume_url, created_at, updated_at";

/// Provides read/replace operations for portfolios.
pub struct PortfolioRepo;

impl PortfolioRepo {
    /// Insert the default (empty, unpublished) portfolio for a fresh
    /// registration.
    pub async fn create_default(
        pool: &PgPool,
        username: &str,
        display_name: &str,
    ) -> Result<Portfolio, sqlx::Error> {
        let query = format!(
            "INSERT INTO portfolios (username, display_name)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(username)
            .bind(display_name)
            .fetch_one(pool)
            .await
    }

    /// Find a portfolio by username. Callers normalize to lowercase first.
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Portfolio>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM portfolios WHERE username = $1");
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite every editable column with `content`.
    ///
    /// Asset URL columns are left untouched; see
    /// [`set_asset_urls`](Self::set_asset_urls). Returns `None` if the
    /// username has no portfolio row.
    pub async fn replace(
        pool: &PgPool,
        username: &str,
        content: &PortfolioContent,
    ) -> Result<Option<Portfolio>, sqlx::Error> {
        let query = format!(
            "UPDATE portfolios SET
                display_name = $2,
                title = $3,
                bio = $4,
                contacts = $5,
                skills = $6,
                projects = $7,
                testimonials = $8,
                theme = $9,
                is_published = $10
             WHERE username = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(username)
            .bind(&content.display_name)
            .bind(&content.title)
            .bind(&content.bio)
            .bind(serde_json::json!(content.contacts))
            .bind(serde_json::json!(content.skills))
            .bind(serde_json::json!(content.projects))
            .bind(serde_json::json!(content.testimonials))
            .bind(&content.theme)
            .bind(content.is_published)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite asset URL columns for the given username.
    ///
    /// Only non-`None` arguments are applied, so a save without a new
    /// upload keeps the previously hosted asset. Returns the updated row.
    pub async fn set_asset_urls(
        pool: &PgPool,
        username: &str,
        profile_picture_url: Option<&str>,
        resume_url: Option<&str>,
    ) -> Result<Option<Portfolio>, sqlx::Error> {
        let query = format!(
            "UPDATE portfolios SET
                profile_picture_url = COALESCE($2, profile_picture_url),
                resume_url = COALESCE($3, resume_url)
             WHERE username = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Portfolio>(&query)
            .bind(username)
            .bind(profile_picture_url)
            .bind(resume_url)
            .fetch_optional(pool)
            .await
    }
}
