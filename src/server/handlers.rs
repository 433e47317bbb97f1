use anyhow::{Context, Result};
use axum::body::Body;
use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response, StatusCode};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

use super::extract::{ServerError, UploadedImage, extract_request};
use super::models::{ErrorResponse, ExtractResponse};
use super::state::ServerState;
use crate::ProviderConfig;
use crate::parser::ResponseParser;
use crate::providers::Gemini;
use crate::settings::Settings;

pub async fn run_server(
    settings: Settings,
    provider_config: ProviderConfig,
    addr: String,
) -> Result<()> {
    let parser = ResponseParser::with_markers(settings.markers.clone());
    let state = Arc::new(ServerState {
        settings,
        parser,
        provider_config,
    });
    let app = Router::new()
        .route("/health", get(health))
        .route("/extract-text", post(extract_text))
        .with_state(state)
        .layer(axum::middleware::from_fn(cors_middleware));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| "failed to bind server address")?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Result<Response<Body>, StatusCode> {
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        apply_cors_headers(response.headers_mut());
        return Ok(response);
    }
    let mut response = next.run(req).await;
    apply_cors_headers(response.headers_mut());
    Ok(response)
}

fn apply_cors_headers(headers: &mut HeaderMap) {
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type,authorization"),
    );
}

async fn extract_text(
    State(state): State<Arc<ServerState>>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, (StatusCode, Json<ErrorResponse>)> {
    let (upload, prompt) = read_multipart(multipart)
        .await
        .map_err(|err| (err.status, Json(ErrorResponse { error: err.message })))?;

    let provider = Gemini::new(state.provider_config.key.clone())
        .with_model(state.provider_config.model.clone());
    match extract_request(state.as_ref(), provider, upload, prompt).await {
        Ok(response) => Ok(Json(response)),
        Err(err) => Err((err.status, Json(ErrorResponse { error: err.message }))),
    }
}

async fn read_multipart(
    mut multipart: Multipart,
) -> Result<(UploadedImage, Option<String>), ServerError> {
    let mut upload: Option<UploadedImage> = None;
    let mut prompt: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ServerError::bad_request(format!("invalid multipart body: {}", err)))?
    {
        match field.name() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(|err| {
                    ServerError::bad_request(format!("failed to read file part: {}", err))
                })?;
                upload = Some(UploadedImage {
                    filename,
                    bytes: bytes.to_vec(),
                });
            }
            Some("prompt") => {
                let text = field.text().await.map_err(|err| {
                    ServerError::bad_request(format!("failed to read prompt part: {}", err))
                })?;
                prompt = Some(text);
            }
            _ => {}
        }
    }

    let Some(upload) = upload else {
        return Err(ServerError::bad_request("no file part"));
    };
    Ok((upload, prompt))
}
