use crate::api::hf::{self, TextGenerator};
use crate::api::youtube::{YoutubeClient, YoutubeVideoDetails};
use crate::error::ApiError;
use crate::media::{self, Transcriber};
use crate::prompt;
use crate::schema::{
    AnalysisRequest, AnalysisResponse, ChannelSize, ChatReply, ChatRequest, CompareReport,
    CompareRequest, Platform, RawAnalysisRequest, VideoType,
};
use crate::storage::{AnalysisRecord, HistoryEntry, Storage};
use anyhow::Context;
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::HeaderMap,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;
const MIN_TRANSCRIPT_CHARS: usize = 5;

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub youtube: Arc<YoutubeClient>,
    pub storage: Arc<dyn Storage>,
    pub transcriber: Arc<dyn Transcriber>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/analyze", post(analyze))
        .route("/api/chat", post(chat))
        .route("/api/compare", post(compare))
        .route("/api/fetchYoutubeVideo", post(fetch_youtube_video))
        .route(
            "/api/uploadVideo",
            post(upload_video).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/viewers", get(viewers))
        .route("/api/history", get(history))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Shared analyze pipeline: prompt, outbound call, JSON extraction,
/// contract validation.
async fn run_analysis(
    state: &AppState,
    req: &AnalysisRequest,
) -> Result<AnalysisResponse, ApiError> {
    let prompt = prompt::analyze_prompt(req);
    let raw = state.generator.generate(&prompt).await?;
    let analysis = AnalysisResponse::from_model_json(hf::extract_json_span(&raw))?;
    Ok(analysis)
}

/// History write. Fire and forget: the client response never waits on it and
/// never sees it fail.
fn persist_analysis(state: &AppState, req: &AnalysisRequest, analysis: AnalysisResponse) {
    let storage = state.storage.clone();
    let record = AnalysisRecord {
        platform: req.platform,
        niche: req.niche.clone(),
        channel_size: req.channel_size,
        video_type: req.video_type,
        idea: req.idea.clone(),
        transcript: req.transcript.clone(),
        youtube_url: req.youtube_url.clone(),
        analysis,
    };
    tokio::spawn(async move {
        if let Err(err) = storage.save_analysis(record).await {
            warn!("failed to persist analysis: {err:#}");
        }
    });
}

async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let raw: RawAnalysisRequest = serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))?;
    let req = raw.validate()?;

    let analysis = run_analysis(&state, &req).await?;
    persist_analysis(&state, &req, analysis.clone());

    Ok(Json(analysis))
}

async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatReply>, ApiError> {
    let prompt = prompt::chat_prompt(&req.message, &req.history, &req.context);
    let raw = state.generator.generate(&prompt).await?;
    let reply = ChatReply::from_model_json(hf::extract_json_span(&raw))?;
    Ok(Json(reply))
}

async fn compare(
    State(state): State<AppState>,
    Json(req): Json<CompareRequest>,
) -> Result<Json<CompareReport>, ApiError> {
    let competitor = match &req.competitor_url {
        Some(url) => state.youtube.fetch_competitor(url).await,
        None => None,
    };

    let prompt = prompt::compare_prompt(&req.user_video, competitor.as_ref());
    let raw = state.generator.generate(&prompt).await?;
    let report = CompareReport::from_model_json(hf::extract_json_span(&raw))?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize)]
struct FetchVideoRequest {
    url: String,
}

async fn fetch_youtube_video(
    State(state): State<AppState>,
    Json(req): Json<FetchVideoRequest>,
) -> Result<Json<YoutubeVideoDetails>, ApiError> {
    Ok(Json(state.youtube.fetch_video(&req.url).await?))
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    transcript: String,
    analysis: AnalysisResponse,
}

async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let mut video: Option<(String, axum::body::Bytes)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Upload error: {e}")))?
    {
        if field.name() == Some("video") {
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Upload error: {e}")))?;
            video = Some((content_type, bytes));
        }
    }

    let (content_type, bytes) =
        video.ok_or_else(|| ApiError::BadRequest("No video file uploaded".to_string()))?;
    if !media::is_supported_video_type(&content_type) {
        return Err(ApiError::BadRequest(
            "Unsupported file type. Please upload .mp4 or .mov".to_string(),
        ));
    }

    // Scratch files live only as long as this request.
    let scratch = tempfile::tempdir().context("create scratch dir")?;
    let video_path = scratch.path().join("upload.mp4");
    let audio_path = scratch.path().join("audio.mp3");
    tokio::fs::write(&video_path, &bytes)
        .await
        .context("write uploaded video")?;

    media::extract_audio(&video_path, &audio_path)
        .await
        .map_err(|err| {
            warn!("audio extraction failed: {err:#}");
            ApiError::Internal("Failed to process video".to_string())
        })?;

    let transcript = state
        .transcriber
        .transcribe(&audio_path)
        .await
        .map_err(|err| {
            warn!("transcription failed: {err:#}");
            ApiError::Internal("Failed to transcribe audio".to_string())
        })?;

    if transcript.trim().len() < MIN_TRANSCRIPT_CHARS {
        return Err(ApiError::Unprocessable(
            "Could not transcribe audio. The video might be silent or too short.".to_string(),
        ));
    }

    let req = AnalysisRequest {
        platform: Platform::YouTube,
        niche: "General".to_string(),
        channel_size: ChannelSize::Small,
        video_type: VideoType::Long,
        idea: None,
        transcript: Some(transcript.clone()),
        youtube_url: None,
    };
    let analysis = run_analysis(&state, &req).await?;
    persist_analysis(&state, &req, analysis.clone());

    Ok(Json(UploadResponse {
        transcript,
        analysis,
    }))
}

#[derive(Debug, Serialize)]
struct ViewerCount {
    count: usize,
}

fn client_ip(headers: &HeaderMap) -> &str {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("unknown")
}

async fn viewers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ViewerCount>, ApiError> {
    // Only a hash of the address is ever stored.
    let ip_hash = hex::encode(Sha256::digest(client_ip(&headers).as_bytes()));
    if let Err(err) = state.storage.record_viewer(&ip_hash).await {
        warn!("failed to record viewer: {err:#}");
    }

    let count = state.storage.viewer_count().await.context("viewer count")?;
    Ok(Json(ViewerCount { count }))
}

async fn history(State(state): State<AppState>) -> Result<Json<Vec<HistoryEntry>>, ApiError> {
    Ok(Json(state.storage.history().await.context("load history")?))
}
