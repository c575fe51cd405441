//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;

use axum::http::{HeaderValue, Uri};
use axum::middleware;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::{attach_request_path, ApiError};
use super::routes;
use crate::state::AppState;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:2019)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    ///
    /// WARNING: Setting this to true allows any origin.
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 2019)),
            cors_permissive: false,
        }
    }
}

/// Unknown paths get the same JSON error body as everything else.
async fn route_not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: "route",
        id: uri.path().to_owned(),
    }
}

/// Build the application router over the given state.
pub fn build_router(state: AppState, cors_permissive: bool) -> Router {
    let cors = if cors_permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin([
                HeaderValue::from_static("http://localhost:2019"),
                HeaderValue::from_static("http://localhost:3000"),
                HeaderValue::from_static("http://127.0.0.1:2019"),
                HeaderValue::from_static("http://127.0.0.1:3000"),
            ])
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .merge(routes::health::router())
        .merge(routes::students::router())
        .merge(routes::courses::router())
        .fallback(route_not_found)
        .layer(middleware::from_fn(attach_request_path))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&database_url).await?;
/// run_server(AppState::postgres(pool), ServerConfig::default()).await?;
/// ```
pub async fn run_server(state: AppState, config: ServerConfig) -> Result<(), ServerError> {
    let app = build_router(state, config.cors_permissive);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> (Router, AppState) {
        let state = AppState::in_memory();
        (build_router(state.clone(), false), state)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        app.clone().oneshot(request).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 2019);
        assert!(!config.cors_permissive);
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (app, _) = app();
        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn student_lifecycle() {
        let (app, _) = app();

        let response = send(
            &app,
            "POST",
            "/students",
            Some(json!({"name": "Ada", "email": "ada@x.com"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/students/1");

        let response = send(&app, "GET", "/students/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["name"], "Ada");

        let response = send(&app, "PUT", "/students/1", Some(json!({"email": "ada2@x.com"}))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let student = json_body(send(&app, "GET", "/students/1", None).await).await;
        assert_eq!(student["name"], "Ada");
        assert_eq!(student["email"], "ada2@x.com");

        let response = send(&app, "DELETE", "/students/1", None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", "/students/1", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let error = json_body(response).await;
        assert_eq!(error["status"], 404);
        assert_eq!(error["path"], "/students/1");
        assert!(error["timestamp"].is_string());
    }

    #[tokio::test]
    async fn paged_listing_returns_first_by_id() {
        let (app, _) = app();
        for name in ["Ada", "Grace", "Edsger"] {
            send(&app, "POST", "/students", Some(json!({ "name": name }))).await;
        }

        let page = json_body(send(&app, "GET", "/students?page=0&size=1", None).await).await;
        let items = page["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["name"], "Ada");
        assert_eq!(page["total"], 3);

        let page = json_body(send(&app, "GET", "/students", None).await).await;
        assert_eq!(page["size"], 3);

        let page = json_body(send(&app, "GET", "/students?sort=name,desc&size=1", None).await).await;
        assert_eq!(page["items"][0]["name"], "Grace");
    }

    #[tokio::test]
    async fn page_size_is_capped() {
        let state = AppState::in_memory().with_max_page_size(2);
        let app = build_router(state, false);

        let page = json_body(send(&app, "GET", "/students?size=5000", None).await).await;
        assert_eq!(page["size"], 2);
    }

    #[tokio::test]
    async fn bad_input_is_400_with_body() {
        let (app, _) = app();

        let response = send(&app, "POST", "/students", Some(json!({"email": "x@x.com"}))).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "validation_error");

        let response = send(&app, "GET", "/students?sort=age", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = send(&app, "GET", "/students?page=minus", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "bad_request");

        let response = send(&app, "GET", "/students/abc", None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_and_delete_missing_student_are_404() {
        let (app, _) = app();
        let response = send(&app, "PUT", "/students/9", Some(json!({"name": "X"}))).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "DELETE", "/students/9", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn search_returns_possibly_empty_list() {
        let (app, _) = app();
        send(&app, "POST", "/students", Some(json!({"name": "Ada"}))).await;

        let hits = json_body(send(&app, "GET", "/students/search/Ad", None).await).await;
        assert_eq!(hits.as_array().unwrap().len(), 1);

        let response = send(&app, "GET", "/students/search/zzz", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn course_endpoints() {
        let (app, state) = app();
        let java = state.courses.create("Java").await.unwrap();
        state.courses.create("SQL").await.unwrap();
        let ada = state
            .students
            .save(crate::models::NewStudent::named("Ada"))
            .await
            .unwrap();
        state.students.enroll(ada.id, java.id).await.unwrap();

        let courses = json_body(send(&app, "GET", "/courses?page=0&size=1", None).await).await;
        assert_eq!(courses.as_array().unwrap().len(), 2);
        assert_eq!(courses[0]["students"][0]["name"], "Ada");

        let counts = json_body(send(&app, "GET", "/courses/studcount", None).await).await;
        assert_eq!(counts[0]["student_count"], 1);
        assert_eq!(counts[1]["student_count"], 0);

        let response = send(&app, "DELETE", &format!("/courses/{}", java.id), None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "DELETE", &format!("/courses/{}", java.id), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let student = json_body(send(&app, "GET", "/students/1", None).await).await;
        assert!(student["courses"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (app, _) = app();
        let response = send(&app, "GET", "/classrooms", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["path"], "/classrooms");
    }
}
