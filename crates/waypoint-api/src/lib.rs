pub mod auth;
pub mod error;
pub mod extract;
pub mod journal;
pub mod markers;
pub mod middleware;
pub mod photos;
pub mod routes;
pub mod state;
pub mod storage;
pub mod tracks;
