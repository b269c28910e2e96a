//! HTTP server for mathfonts
//!
//! Serves the rebased stylesheet, the parsed rule list, and an HTML
//! injection endpoint. Every handler is a pure function of the embedded
//! template and the request, so nothing here holds state between calls.

use std::env;

use anyhow::{Context, Result};
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::info;
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

use mathfonts_core::face::FontFaceRule;
use mathfonts_core::inject::StyleInjector;

use crate::{base_path_from, faces_for, inject_html, BASE_PATH_ENV};

/// Query string for `GET /fonts.css`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct StylesheetQuery {
    /// Prefix replacing `fonts/` in every URL
    pub base_path: Option<String>,
}

/// Query string for `GET /faces`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct FacesQuery {
    pub base_path: Option<String>,
    /// Regex the family name must match
    pub family: Option<String>,
    pub weight: Option<String>,
    pub style: Option<String>,
}

/// Body for `POST /inject`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct InjectRequest {
    /// Full HTML document; must contain a `</head>`
    pub html: String,
    pub base_path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct InjectResponse {
    pub html: String,
    /// Number of `<style>` elements appended by this request
    pub styles: usize,
}

/// Bind `bind` and serve until the process stops.
pub async fn serve(bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding HTTP server to {bind}"))?;
    info!("serving on http://{bind}");

    axum::serve(listener, router())
        .await
        .context("serving HTTP")?;
    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/fonts.css", get(stylesheet_handler))
        .route("/faces", get(faces_handler))
        .route("/inject", post(inject_handler))
}

async fn stylesheet_handler(Query(query): Query<StylesheetQuery>) -> impl IntoResponse {
    let base_path = resolve(query.base_path);
    let css = StyleInjector::new().render(&base_path);
    ([(header::CONTENT_TYPE, "text/css; charset=utf-8")], css)
}

async fn faces_handler(
    Query(query): Query<FacesQuery>,
) -> Result<Json<Vec<FontFaceRule>>, (StatusCode, String)> {
    let base_path = resolve(query.base_path);
    let patterns: Vec<String> = query.family.into_iter().collect();

    let rules = faces_for(&base_path, &patterns, query.weight, query.style)
        .map_err(to_bad_request)?;
    Ok(Json(rules))
}

async fn inject_handler(
    Json(req): Json<InjectRequest>,
) -> Result<Json<InjectResponse>, (StatusCode, String)> {
    let base_path = resolve(req.base_path);
    let html = inject_html(req.html, &base_path).map_err(to_bad_request)?;
    Ok(Json(InjectResponse { html, styles: 1 }))
}

fn resolve(base_path: Option<String>) -> String {
    base_path_from(base_path, env::var(BASE_PATH_ENV).ok())
}

fn to_bad_request(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mathfonts_core::template::render_font_css;
    use serde_json::json;
    use tower::util::ServiceExt;

    async fn body_text(response: axum::response::Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(body.to_vec()).expect("utf8 body")
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = router();
        let request = Request::get("/health").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "ok");
    }

    #[tokio::test]
    async fn stylesheet_endpoint_rebases_urls() {
        let app = router();
        let request = Request::get("/fonts.css?base_path=%2Fstatic%2Fkatex%2F")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/css; charset=utf-8"
        );
        assert_eq!(body_text(response).await, render_font_css("/static/katex/"));
    }

    #[tokio::test]
    async fn faces_endpoint_filters_by_family() {
        let app = router();
        let request = Request::get("/faces?family=%5EKaTeX_Size&base_path=f%2F")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_text(response).await;
        let rules: Vec<FontFaceRule> = serde_json::from_str(&text).expect("parse rules");
        assert_eq!(rules.len(), 4);
        assert!(rules.iter().all(|r| r.family.starts_with("KaTeX_Size")));
        assert_eq!(rules[0].src[0][0].url, "f/KaTeX_Size1-Regular.eot");
    }

    #[tokio::test]
    async fn faces_endpoint_rejects_bad_regex() {
        let app = router();
        let request = Request::get("/faces?family=%28").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("invalid regex"));
    }

    #[tokio::test]
    async fn inject_endpoint_appends_style() {
        let app = router();
        let payload = json!({
            "html": "<html><head></head><body></body></html>",
            "base_path": "/k/"
        });

        let request = Request::post("/inject")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_text(response).await;
        let parsed: InjectResponse = serde_json::from_str(&text).expect("parse response");
        let expected = format!(
            "<html><head><style>{}</style></head><body></body></html>",
            render_font_css("/k/")
        );
        assert_eq!(parsed.html, expected);
        assert_eq!(parsed.styles, 1);
    }

    #[tokio::test]
    async fn inject_endpoint_rejects_base_path_closing_style() {
        let app = router();
        let payload = json!({
            "html": "<html><head></head><body></body></html>",
            "base_path": "</style><script>alert(1)</script><style>"
        });

        let request = Request::post("/inject")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let text = body_text(response).await;
        assert!(text.contains("</style"), "body: {text}");
        assert!(!text.contains("<script>"), "body: {text}");
    }

    #[tokio::test]
    async fn inject_endpoint_requires_head() {
        let app = router();
        let payload = json!({"html": "<p>fragment</p>", "base_path": "/"});

        let request = Request::post("/inject")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("</head>"));
    }
}
