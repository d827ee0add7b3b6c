use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

mod config;
mod extract;
mod fetch;
mod markdown;
mod models;
mod pipeline;
mod scoring;

use config::Config;
use fetch::{FetchConfig, FetchError, PageFetcher};
use models::{ErrorResponse, ScoreRequest, ScoreResponse};
use pipeline::{Pipeline, PipelineError};
use scoring::{CollectedErrors, ScoringClient, ScoringConfig};

const FORM_PAGE: &str = include_str!("form.html");

struct AppState {
    pipeline: Pipeline,
    api_key: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if config.api_key.is_none() {
        tracing::warn!("DEEPSEEK_API_KEY is not set; /score will refuse requests");
    }

    let fetcher = PageFetcher::new(FetchConfig {
        site_domain: config.site_domain.clone(),
        ..FetchConfig::default()
    })
    .context("failed to build page fetcher")?;
    tracing::info!(site = fetcher.site_domain(), "accepting page URLs");
    let scorer = ScoringClient::new(ScoringConfig {
        api_url: config.api_url.clone(),
        model: config.model.clone(),
        ..ScoringConfig::default()
    })
    .context("failed to build scoring client")?;

    let state = Arc::new(AppState {
        pipeline: Pipeline::new(fetcher, scorer),
        api_key: config.api_key,
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(form_page))
        .route("/health", get(health))
        .route("/score", post(score_endpoint))
        .with_state(state)
}

async fn form_page() -> Html<&'static str> {
    Html(FORM_PAGE)
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn score_endpoint(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> Response {
    let reporter = CollectedErrors::default();
    let outcome = state
        .pipeline
        .run(&req.job_url, &req.resume_url, state.api_key.as_deref(), &reporter)
        .await;

    match outcome {
        Ok(analysis) => (StatusCode::OK, Json(ScoreResponse::from(analysis))).into_response(),
        Err(e) => {
            let (status, detail) = match &e {
                PipelineError::MissingInput => (StatusCode::BAD_REQUEST, e.to_string()),
                PipelineError::Fetch(FetchError::Validation(_)) => {
                    (StatusCode::BAD_REQUEST, format!("Критическая ошибка: {}", e))
                }
                PipelineError::Fetch(FetchError::Network(_)) => {
                    (StatusCode::BAD_GATEWAY, format!("Критическая ошибка: {}", e))
                }
                PipelineError::MissingCredential => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
                PipelineError::NoAnalysis => (StatusCode::BAD_GATEWAY, e.to_string()),
            };
            tracing::warn!(status = %status, "{}", detail);
            error_response(status, detail, reporter.into_messages())
        }
    }
}

fn error_response(status: StatusCode, detail: String, errors: Vec<String>) -> Response {
    (status, Json(ErrorResponse { detail, errors })).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::{self, Body};
    use axum::http::Request;
    use tower::ServiceExt as _;

    use super::*;

    const BODY_LIMIT: usize = 1024 * 1024;

    fn test_router(api_key: Option<&str>) -> Router {
        let fetcher = PageFetcher::new(FetchConfig::default()).unwrap();
        let scorer = ScoringClient::new(ScoringConfig::default()).unwrap();
        router(Arc::new(AppState {
            pipeline: Pipeline::new(fetcher, scorer),
            api_key: api_key.map(str::to_string),
        }))
    }

    fn score_request(payload: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/score")
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("build POST /score")
    }

    async fn json_body(resp: Response) -> serde_json::Value {
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
            .await
            .expect("read body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_returns_ok() {
        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let resp = test_router(None).oneshot(req).await.expect("oneshot /health");

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn form_page_is_served() {
        let req = Request::builder().uri("/").body(Body::empty()).unwrap();
        let resp = test_router(None).oneshot(req).await.expect("oneshot /");

        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT).await.unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("name=\"job_url\""));
        assert!(html.contains("name=\"resume_url\""));
    }

    #[tokio::test]
    async fn score_without_credential_is_a_server_error() {
        let resp = test_router(None)
            .oneshot(score_request(json!({
                "job_url": "https://hh.ru/vacancy/1",
                "resume_url": "https://hh.ru/resume/abc"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(resp).await["detail"], "Не задан DEEPSEEK_API_KEY");
    }

    #[tokio::test]
    async fn missing_url_is_reported_before_missing_credential() {
        let resp = test_router(None)
            .oneshot(score_request(json!({"job_url": "https://hh.ru/vacancy/1"})))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["detail"], "Пожалуйста, введите обе ссылки!");
    }

    #[tokio::test]
    async fn foreign_domain_is_reported_before_missing_credential() {
        let resp = test_router(None)
            .oneshot(score_request(json!({
                "job_url": "https://hh.ru/vacancy/1",
                "resume_url": "https://example.com/cv"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(resp).await["detail"],
            "Критическая ошибка: Поддерживаются только ссылки с hh.ru"
        );
    }

    #[tokio::test]
    async fn score_with_missing_url_is_a_bad_request() {
        let resp = test_router(Some("key"))
            .oneshot(score_request(json!({"job_url": "https://hh.ru/vacancy/1"})))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["detail"], "Пожалуйста, введите обе ссылки!");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn score_with_foreign_domain_is_rejected() {
        let resp = test_router(Some("key"))
            .oneshot(score_request(json!({
                "job_url": "https://example.com/jobs/1",
                "resume_url": "https://hh.ru/resume/abc"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(resp).await["detail"],
            "Критическая ошибка: Поддерживаются только ссылки с hh.ru"
        );
    }
}
