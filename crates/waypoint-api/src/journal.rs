use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};

use waypoint_db::models::JournalRow;
use waypoint_types::api::{
    Claims, CreateJournalRequest, CreatedJournalResponse, JournalResponse, MessageResponse,
    UpdateJournalRequest,
};
use waypoint_types::validate::ValidationError;

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::{AppState, with_db};

fn to_response(row: JournalRow) -> JournalResponse {
    JournalResponse {
        id: row.id,
        title: row.title,
        content: row.content,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn require_content(content: &str) -> Result<(), ValidationError> {
    if content.trim().is_empty() {
        return Err(ValidationError::Required("content"));
    }
    Ok(())
}

pub async fn list_journals(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<JournalResponse>>, ApiError> {
    let rows = with_db(&state, move |db| db.list_journals(claims.sub)).await?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

pub async fn create_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateJournalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let content = req.content.unwrap_or_default();
    require_content(&content)?;
    let title = req.title.unwrap_or_default();

    let row = with_db(&state, move |db| db.insert_journal(claims.sub, &title, &content)).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedJournalResponse {
            id: row.id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
        }),
    ))
}

pub async fn get_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<JournalResponse>, ApiError> {
    let row = with_db(&state, move |db| db.get_journal(id, claims.sub))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(to_response(row)))
}

pub async fn update_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateJournalRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if let Some(content) = &req.content {
        require_content(content)?;
    }

    let found = with_db(&state, move |db| {
        db.update_journal(id, claims.sub, req.title.as_deref(), req.content.as_deref())
    })
    .await?;
    if !found {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::new("Journal updated")))
}

pub async fn delete_journal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let found = with_db(&state, move |db| db.delete_journal(id, claims.sub)).await?;
    if !found {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::new("Journal deleted")))
}
