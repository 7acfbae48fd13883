use std::path::Path;

use axum::{
    Extension, Json,
    extract::{Multipart, State, multipart::MultipartRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use tracing::{info, warn};

use waypoint_db::models::{NewPhoto, PhotoRow};
use waypoint_types::api::{Claims, MessageResponse, PhotoResponse, UploadResponse};
use waypoint_types::validate::parse_optional_float;

use crate::error::ApiError;
use crate::extract::ApiPath;
use crate::state::{AppState, with_db};
use crate::storage::{is_safe_name, stored_name};

fn to_response(row: PhotoRow) -> PhotoResponse {
    PhotoResponse {
        id: row.id,
        filename: row.filename,
        original_filename: row.original_filename,
        created_at: row.created_at,
        exif_data: row.exif_data,
        latitude: row.latitude,
        longitude: row.longitude,
    }
}

pub async fn list_photos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<Vec<PhotoResponse>>, ApiError> {
    let rows = with_db(&state, move |db| db.list_photos(claims.sub)).await?;
    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// POST /photo/upload: multipart with a `file` part and optional
/// `exif_data`, `latitude`, `longitude` text parts.
///
/// The file is written before the row is inserted. If the insert fails the
/// file is removed again, best-effort; a crash in between leaves an orphan.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // Not a multipart body at all: there is no file part to find
    let mut multipart = multipart.map_err(|_| ApiError::Validation("No file part".into()))?;

    let mut file = None;
    let mut exif_data = None;
    let mut latitude = None;
    let mut longitude = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let original = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                file = Some((original, data));
            }
            Some("exif_data") => exif_data = Some(field.text().await?),
            Some("latitude") => latitude = Some(field.text().await?),
            Some("longitude") => longitude = Some(field.text().await?),
            _ => {}
        }
    }

    let (original, data) = file.ok_or_else(|| ApiError::Validation("No file part".into()))?;
    if original.is_empty() {
        return Err(ApiError::Validation("No file selected".into()));
    }
    let latitude = parse_optional_float("latitude", latitude.as_deref())?;
    let longitude = parse_optional_float("longitude", longitude.as_deref())?;

    let filename = stored_name(&original);
    let path = state.storage.save(&filename, &data).await?;
    let file_path = path.to_string_lossy().into_owned();

    let user_id = claims.sub;
    let fname = filename.clone();
    let inserted = with_db(&state, move |db| {
        db.insert_photo(&NewPhoto {
            user_id,
            filename: &fname,
            original_filename: &original,
            file_path: &file_path,
            exif_data: exif_data.as_deref(),
            latitude,
            longitude,
        })
    })
    .await;

    let row = match inserted {
        Ok(row) => row,
        Err(e) => {
            state.storage.discard(&path).await;
            return Err(e);
        }
    };

    info!("Photo {} stored as {} ({} bytes)", row.id, filename, data.len());

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            id: row.id,
            filename,
            created_at: row.created_at,
        }),
    ))
}

/// GET /photo/image/{filename}: public. Always served as JPEG.
pub async fn serve_image(
    State(state): State<AppState>,
    ApiPath(filename): ApiPath<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_safe_name(&filename) {
        return Err(ApiError::NotFound);
    }

    let bytes = state.storage.read(&filename).await.map_err(|e| {
        warn!("Failed to read image {}: {}", filename, e);
        ApiError::NotFound
    })?;

    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes))
}

/// DELETE /photo/{id}: a file that cannot be removed is logged, and the
/// row is deleted regardless.
pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = claims.sub;
    let photo = with_db(&state, move |db| db.get_photo(id, user_id))
        .await?
        .ok_or(ApiError::NotFound)?;

    state.storage.discard(Path::new(&photo.file_path)).await;

    let found = with_db(&state, move |db| db.delete_photo(id, user_id)).await?;
    if !found {
        return Err(ApiError::NotFound);
    }

    Ok(Json(MessageResponse::new("Photo deleted")))
}
