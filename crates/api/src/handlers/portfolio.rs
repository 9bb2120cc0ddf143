//! Handlers for the `/portfolio` resource.
//!
//! Saves arrive as multipart forms: scalar fields as text parts, structured
//! sub-documents as JSON-encoded text parts, and the optional profile
//! picture / resume as binary parts. A save is a whole-document replace;
//! the persisted result is broadcast to the owner's room after the write
//! commits.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use folio_core::{account, error::CoreError, handle};
use folio_db::models::portfolio::{
    Portfolio, PortfolioContent, PortfolioResponse, Project, Testimonial,
};
use folio_db::repositories::PortfolioRepo;
use folio_events::{PortfolioEvent, PORTFOLIO_UPDATED};
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// One uploaded file lifted out of the multipart stream.
struct FilePart {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// GET /portfolio/{username}
///
/// Public read path. Unpublished portfolios are indistinguishable from
/// nonexistent ones: both answer 404.
pub async fn get_public(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> AppResult<Json<PortfolioResponse>> {
    let username = handle::normalize(&username);
    let row = PortfolioRepo::find_by_username(&state.pool, &username).await?;

    match row {
        Some(portfolio) if portfolio.is_published => Ok(Json((&portfolio).into())),
        _ => Err(CoreError::NotFound {
            entity: "Portfolio",
            key: username,
        }
        .into()),
    }
}

/// GET /portfolio (and GET /portfolio/me/portfolio)
///
/// Owner read path: the caller's own document, published or not.
pub async fn get_own(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<PortfolioResponse>> {
    let portfolio = PortfolioRepo::find_by_username(&state.pool, &auth.user.username)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Portfolio",
            key: auth.user.username.clone(),
        })?;

    Ok(Json((&portfolio).into()))
}

/// PUT /portfolio/update
///
/// Whole-document save. Text fields are committed first; file uploads run
/// after the commit, so an upload failure answers 500 with the text fields
/// already saved and no update broadcast.
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> AppResult<Json<PortfolioResponse>> {
    let (content, profile_picture, resume_file) = parse_save_form(multipart).await?;

    if !account::is_valid_theme(&content.theme) {
        return Err(CoreError::Validation(format!(
            "Unknown theme '{}', expected one of: {}",
            content.theme,
            account::THEMES.join(", ")
        ))
        .into());
    }

    let username = &auth.user.username;
    let mut saved = PortfolioRepo::replace(&state.pool, username, &content)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Portfolio",
            key: username.clone(),
        })?;

    // Uploads happen after the text commit. A failed upload surfaces as a
    // 500 and skips the broadcast, but the committed fields stay committed.
    if profile_picture.is_some() || resume_file.is_some() {
        let profile_url = match &profile_picture {
            Some(file) => Some(upload_file(&state, file).await?),
            None => None,
        };
        let resume_url = match &resume_file {
            Some(file) => Some(upload_file(&state, file).await?),
            None => None,
        };

        saved = PortfolioRepo::set_asset_urls(
            &state.pool,
            username,
            profile_url.as_deref(),
            resume_url.as_deref(),
        )
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Portfolio",
            key: username.clone(),
        })?;
    }

    broadcast_update(&state, &saved)?;

    tracing::info!(username = %username, published = saved.is_published, "Portfolio saved");

    Ok(Json((&saved).into()))
}

/// Publish the persisted document on the event bus. Runs strictly after
/// the store write, so subscribers can re-read the store and observe at
/// least this version.
fn broadcast_update(state: &AppState, saved: &Portfolio) -> AppResult<()> {
    let response = PortfolioResponse::from(saved);
    let payload = serde_json::to_value(&response)
        .map_err(|e| AppError::InternalError(format!("Event payload encoding error: {e}")))?;

    state.event_bus.publish(
        PortfolioEvent::new(PORTFOLIO_UPDATED, &saved.username).with_payload(payload),
    );
    Ok(())
}

async fn upload_file(state: &AppState, file: &FilePart) -> AppResult<String> {
    state
        .assets
        .upload(&file.filename, &file.content_type, file.bytes.clone())
        .await
        .map_err(|e| AppError::Upstream(e.to_string()))
}

/// Walk the multipart stream and assemble the replacement document plus
/// any file parts. Unknown field names are skipped so client additions
/// stay non-breaking.
async fn parse_save_form(
    mut multipart: Multipart,
) -> AppResult<(PortfolioContent, Option<FilePart>, Option<FilePart>)> {
    let mut content = PortfolioContent::default();
    let mut profile_picture = None;
    let mut resume_file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "displayName" => content.display_name = text_field(field, &name).await?,
            "title" => content.title = text_field(field, &name).await?,
            "bio" => content.bio = text_field(field, &name).await?,
            "theme" => content.theme = text_field(field, &name).await?,
            "isPublished" => {
                let raw = text_field(field, &name).await?;
                content.is_published = raw.parse().map_err(|_| {
                    AppError::BadRequest(format!(
                        "Field 'isPublished' must be 'true' or 'false', got '{raw}'"
                    ))
                })?;
            }
            "contacts" => {
                content.contacts =
                    json_field::<HashMap<String, String>>(field, &name).await?;
            }
            "skills" => content.skills = json_field::<Vec<String>>(field, &name).await?,
            "projects" => content.projects = json_field::<Vec<Project>>(field, &name).await?,
            "testimonials" => {
                content.testimonials = json_field::<Vec<Testimonial>>(field, &name).await?;
            }
            "profilePicture" => profile_picture = Some(file_field(field, &name).await?),
            "resumeFile" => resume_file = Some(file_field(field, &name).await?),
            other => {
                tracing::debug!(field = other, "Ignoring unknown form field");
            }
        }
    }

    Ok((content, profile_picture, resume_file))
}

async fn text_field(field: axum::extract::multipart::Field<'_>, name: &str) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Field '{name}' is not valid text: {e}")))
}

async fn json_field<T: serde::de::DeserializeOwned>(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> AppResult<T> {
    let raw = text_field(field, name).await?;
    serde_json::from_str(&raw)
        .map_err(|e| AppError::BadRequest(format!("Field '{name}' is not valid JSON: {e}")))
}

async fn file_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> AppResult<FilePart> {
    let filename = field
        .file_name()
        .unwrap_or("upload.bin")
        .to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Field '{name}' could not be read: {e}")))?
        .to_vec();

    Ok(FilePart {
        filename,
        content_type,
        bytes,
    })
}
