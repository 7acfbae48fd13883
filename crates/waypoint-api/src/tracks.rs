use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::value::RawValue;

use waypoint_db::models::{NewTrack, TrackRow, TrackUpdate};
use waypoint_types::api::{
    Claims, CreateTrackRequest, MessageResponse, TrackResponse, UpdateTrackRequest,
};
use waypoint_types::validate::{ValidationError, check_points, optional_timestamp, parse_timestamp};

use crate::error::ApiError;
use crate::extract::{ApiJson, ApiPath};
use crate::state::{AppState, with_db};

fn to_response(row: TrackRow) -> Result<TrackResponse, ApiError> {
    let points = RawValue::from_string(row.points)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("track {} has corrupt points: {}", row.id, e)))?;

    Ok(TrackResponse {
        id: row.id,
        name: row.name,
        points,
        start_time: row.start_time,
        end_time: row.end_time,
        distance: row.distance,
    })
}

fn default_name() -> String {
    format!("Track {}", chrono::Local::now().format("%Y-%m-%d %H:%M"))
}

pub async fn list_tracks(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<TrackResponse>>, ApiError> {
    let rows = with_db(&state, move |db| db.list_tracks(claims.sub)).await?;
    let tracks = rows.into_iter().map(to_response).collect::<Result<Vec<_>, _>>()?;
    Ok(Json(tracks))
}

/// POST /track: the client-computed distance is stored as given.
pub async fn create_track(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiJson(req): ApiJson<CreateTrackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let points = req.points.ok_or(ValidationError::Required("points"))?;
    check_points(&points)?;

    let start_time = req
        .start_time
        .filter(|s| !s.trim().is_empty())
        .ok_or(ValidationError::Required("start_time"))?;
    parse_timestamp("start_time", &start_time)?;
    let start_time = start_time.trim().to_string();

    let end_time = optional_timestamp("end_time", req.end_time.as_deref())?;
    let name = req.name.unwrap_or_else(default_name);
    let distance = req.distance.unwrap_or(0.0);

    let row = with_db(&state, move |db| {
        db.insert_track(
            claims.sub,
            &NewTrack {
                name: &name,
                points: points.get(),
                start_time: &start_time,
                end_time: end_time.as_deref(),
                distance,
            },
        )
    })
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(row)?)))
}

/// PUT /track/{id}: partial update of name, points, end_time and distance.
pub async fn update_track(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(req): ApiJson<UpdateTrackRequest>,
) -> Result<Json<TrackResponse>, ApiError> {
    if let Some(points) = &req.points {
        check_points(points)?;
    }
    let end_time = optional_timestamp("end_time", req.end_time.as_deref())?;

    let row = with_db(&state, move |db| {
        db.update_track(
            id,
            claims.sub,
            &TrackUpdate {
                name: req.name.as_deref(),
                points: req.points.as_deref().map(RawValue::get),
                end_time: end_time.as_deref(),
                distance: req.distance,
            },
        )
    })
    .await?
    .ok_or(ApiError::NotFound)?;

    Ok(Json(to_response(row)?))
}

pub async fn delete_track(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let found = with_db(&state, move |db| db.delete_track(id, claims.sub)).await?;
    if !found {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::new("Track deleted")))
}
