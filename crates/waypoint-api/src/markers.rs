use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::Value;

use waypoint_db::models::MarkerRow;
use waypoint_types::api::{Claims, MarkerResponse, MessageResponse};
use waypoint_types::validate::parse_position;

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::{AppState, with_db};

fn to_response(row: MarkerRow) -> MarkerResponse {
    MarkerResponse {
        id: row.id,
        position: [row.latitude, row.longitude],
        description: row.description,
    }
}

pub async fn list_markers(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<MarkerResponse>>, ApiError> {
    let rows = with_db(&state, move |db| db.list_markers(claims.sub)).await?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// POST /map/markers: `{"position": [lat, lng], "description": "..."}`.
///
/// Takes the raw body so an empty one reports "No data provided" rather
/// than a content-type complaint.
pub async fn create_marker(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let body: Value = if body.iter().all(u8::is_ascii_whitespace) {
        Value::Null
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| ApiError::Validation(format!("Invalid JSON body: {}", e)))?
    };

    let (latitude, longitude) = parse_position(&body)?;
    let description = match body.get("description") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(_) => return Err(ApiError::Validation("description must be a string".into())),
    };

    let row = with_db(&state, move |db| {
        db.insert_marker(claims.sub, latitude, longitude, &description)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(to_response(row))))
}

pub async fn delete_marker(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let found = with_db(&state, move |db| db.delete_marker(id, claims.sub)).await?;
    if !found {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::new("Marker deleted")))
}
