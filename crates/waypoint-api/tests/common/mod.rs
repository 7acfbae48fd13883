// Each test binary uses a different subset of these helpers
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use waypoint_api::routes;
use waypoint_api::state::AppStateInner;
use waypoint_api::storage::Storage;
use waypoint_db::Database;

pub const BOUNDARY: &str = "waypoint-test-boundary";

pub struct TestApp {
    router: Router,
    pub upload_dir: PathBuf,
    _tmp: TempDir,
}

pub struct Reply {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Reply {
    pub fn json(&self) -> Value {
        if self.bytes.is_empty() {
            return Value::Null;
        }
        serde_json::from_slice(&self.bytes).expect("response body is JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

pub enum Part<'a> {
    File {
        name: &'a str,
        filename: &'a str,
        data: &'a [u8],
    },
    Text {
        name: &'a str,
        value: &'a str,
    },
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_body_limit(1024 * 1024).await
    }

    pub async fn with_body_limit(max_body_bytes: usize) -> Self {
        let tmp = tempfile::tempdir().unwrap();
        let upload_dir = tmp.path().join("uploads");
        let storage = Storage::new(upload_dir.clone()).await.unwrap();

        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            storage,
            jwt_secret: "integration-test-secret".into(),
            token_ttl: chrono::Duration::hours(1),
        });

        Self {
            router: routes::router(state, max_body_bytes),
            upload_dir,
            _tmp: tmp,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Reply {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        Reply {
            status,
            content_type,
            bytes,
        }
    }

    pub async fn call(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Reply {
        match body {
            Some(body) => self.call_raw(method, uri, token, body.to_string()).await,
            None => self.send(request(method, uri, token).body(Body::empty()).unwrap()).await,
        }
    }

    /// Send a JSON body verbatim, for tests that care about exact bytes.
    pub async fn call_raw(&self, method: &str, uri: &str, token: Option<&str>, body: String) -> Reply {
        let req = request(method, uri, token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    pub async fn upload(&self, token: &str, parts: &[Part<'_>]) -> Reply {
        let req = request("POST", "/api/photo/upload", Some(token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(req).await
    }

    pub async fn register(&self, username: &str, password: &str) -> Reply {
        self.call(
            "POST",
            "/api/auth/register",
            None,
            Some(json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": password,
            })),
        )
        .await
    }

    /// Register a fresh user and return a bearer token for them.
    pub async fn user(&self, username: &str) -> String {
        let reply = self.register(username, "password123").await;
        assert_eq!(reply.status, StatusCode::CREATED, "{}", reply.text());

        let reply = self
            .call(
                "POST",
                "/api/auth/login",
                None,
                Some(json!({"username": username, "password": "password123"})),
            )
            .await;
        assert_eq!(reply.status, StatusCode::OK, "{}", reply.text());
        reply.json()["token"].as_str().unwrap().to_string()
    }

    pub fn stored_files(&self) -> Vec<String> {
        match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

fn request(method: &str, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header(header::AUTHORIZATION, format!("Bearer {}", token)),
        None => builder,
    }
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::File {
                name,
                filename,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
