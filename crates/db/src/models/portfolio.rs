//! Portfolio entity model and DTOs.
//!
//! Structured sub-documents (contacts, skills, projects, testimonials) live
//! in JSONB columns whose defaults (`'{}'` / `'[]'`) guarantee a published
//! document always serializes with empty collections rather than nulls.

use std::collections::HashMap;

use folio_core::account::DEFAULT_THEME;
use folio_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full portfolio row from the `portfolios` table.
#[derive(Debug, Clone, FromRow)]
pub struct Portfolio {
    pub id: DbId,
    pub username: String,
    pub display_name: String,
    pub title: String,
    pub bio: String,
    pub contacts: serde_json::Value,
    pub skills: serde_json::Value,
    pub projects: serde_json::Value,
    pub testimonials: serde_json::Value,
    pub theme: String,
    pub is_published: bool,
    pub profile_picture_url: Option<String>,
    pub resume_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A project entry inside a portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub github: String,
    #[serde(default)]
    pub live_demo: String,
}

/// A testimonial entry inside a portfolio.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Testimonial {
    #[serde(default)]
    pub client_name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub profile_picture: String,
}

/// Replacement payload for a save: the whole editable document.
///
/// Saves are whole-document overwrites (last-writer-wins); parts the editor
/// omits fall back to these defaults rather than preserving prior values.
/// Asset URL columns are the exception -- they are only rewritten when a
/// new file is uploaded.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioContent {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub contacts: HashMap<String, String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub testimonials: Vec<Testimonial>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub is_published: bool,
}

fn default_theme() -> String {
    DEFAULT_THEME.to_string()
}

impl Default for PortfolioContent {
    fn default() -> Self {
        Self {
            display_name: String::new(),
            title: String::new(),
            bio: String::new(),
            contacts: HashMap::new(),
            skills: Vec::new(),
            projects: Vec::new(),
            testimonials: Vec::new(),
            theme: default_theme(),
            is_published: false,
        }
    }
}

/// Outward-facing portfolio document, as served on the public and private
/// read paths and pushed over the real-time channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResponse {
    pub username: String,
    pub display_name: String,
    pub title: String,
    pub bio: String,
    pub contacts: serde_json::Value,
    pub skills: serde_json::Value,
    pub projects: serde_json::Value,
    pub testimonials: serde_json::Value,
    pub theme: String,
    pub is_published: bool,
    pub profile_picture: Option<String>,
    pub resume_url: Option<String>,
    pub updated_at: Timestamp,
}

impl From<&Portfolio> for PortfolioResponse {
    fn from(row: &Portfolio) -> Self {
        Self {
            username: row.username.clone(),
            display_name: row.display_name.clone(),
            title: row.title.clone(),
            bio: row.bio.clone(),
            contacts: row.contacts.clone(),
            skills: row.skills.clone(),
            projects: row.projects.clone(),
            testimonials: row.testimonials.clone(),
            theme: row.theme.clone(),
            is_published: row.is_published,
            profile_picture: row.profile_picture_url.clone(),
            resume_url: row.resume_url.clone(),
            updated_at: row.updated_at,
        }
    }
}
