use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::require_auth;
use crate::state::AppState;
use crate::{auth, journal, markers, photos, tracks};

/// The whole HTTP surface, mounted under `/api`.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/health", get(auth::health))
        .route("/photo/image/{filename}", get(photos::serve_image));

    let protected_routes = Router::new()
        .route(
            "/auth/profile",
            get(auth::get_profile)
                .put(auth::update_profile)
                .delete(auth::delete_profile),
        )
        .route("/journal", get(journal::list_journals).post(journal::create_journal))
        .route("/journal/", get(journal::list_journals).post(journal::create_journal))
        .route(
            "/journal/{id}",
            get(journal::get_journal)
                .put(journal::update_journal)
                .delete(journal::delete_journal),
        )
        .route("/map/markers", get(markers::list_markers).post(markers::create_marker))
        .route("/map/markers/{id}", delete(markers::delete_marker))
        .route("/track", get(tracks::list_tracks).post(tracks::create_track))
        .route("/track/", get(tracks::list_tracks).post(tracks::create_track))
        .route("/track/{id}", put(tracks::update_track).delete(tracks::delete_track))
        .route("/photo/photos", get(photos::list_photos))
        .route("/photo/upload", post(photos::upload_photo))
        .route("/photo/{id}", delete(photos::delete_photo))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
