use crate::error::ApiError;
use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

const API_BASE: &str = "https://www.googleapis.com/youtube/v3/videos";
const VIDEO_ID_LEN: usize = 11;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeVideoDetails {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub channel_title: String,
}

/// Competitor metadata embedded into the compare prompt. The Data API
/// reports statistics counts as strings; they are relayed as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorData {
    pub title: String,
    pub view_count: String,
    pub like_count: String,
    pub published_at: String,
}

fn video_id_regex() -> Result<&'static Regex> {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_try_init(|| {
        Regex::new(
            r"(?:https?://)?(?:www\.|m\.)?youtu(?:be\.com/(?:watch\?v=|embed/|v/|shorts/|live/)|\.be/)([a-zA-Z0-9_-]{11})",
        )
        .context("failed to compile youtube id regex")
    })
}

/// Pull the 11-character video ID out of any common YouTube URL form, or
/// accept a bare ID.
pub fn extract_video_id(url: &str) -> Result<Option<String>> {
    let re = video_id_regex()?;
    if let Some(caps) = re.captures(url) {
        return Ok(caps.get(1).map(|m| m.as_str().to_string()));
    }

    let trimmed = url.trim();
    if trimmed.len() == VIDEO_ID_LEN
        && trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Ok(Some(trimmed.to_string()));
    }

    Ok(None)
}

/// Thin client for the YouTube Data API v3. The key is optional: lookups
/// fail cleanly when it is absent, and competitor enrichment degrades to the
/// general niche benchmark.
pub struct YoutubeClient {
    client: Client,
    api_key: Option<String>,
}

impl YoutubeClient {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self { client, api_key }
    }

    pub async fn fetch_video(&self, url: &str) -> Result<YoutubeVideoDetails, ApiError> {
        let video_id = extract_video_id(url)?
            .ok_or_else(|| ApiError::validation("url", "Invalid YouTube URL or Video ID"))?;

        let api_key = self.api_key.as_deref().ok_or_else(|| {
            ApiError::Internal("YouTube API key not configured".to_string())
        })?;

        let api_url = format!("{API_BASE}?part=snippet&id={video_id}&key={api_key}");
        let data: serde_json::Value = self
            .client
            .get(&api_url)
            .send()
            .await
            .context("youtube request failed")?
            .json()
            .await
            .context("youtube response was not JSON")?;

        if let Some(err) = data.get("error") {
            let message = err
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("YouTube API error");
            warn!("youtube api error for {video_id}: {message}");
            return Err(ApiError::Internal(message.to_string()));
        }

        let snippet = data
            .get("items")
            .and_then(|items| items.get(0))
            .and_then(|item| item.get("snippet"))
            .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;

        Ok(YoutubeVideoDetails {
            title: string_field(snippet, "title"),
            description: string_field(snippet, "description"),
            tags: snippet
                .get("tags")
                .and_then(|v| v.as_array())
                .map(|tags| {
                    tags.iter()
                        .filter_map(|t| t.as_str().map(String::from))
                        .collect()
                })
                .unwrap_or_default(),
            channel_title: string_field(snippet, "channelTitle"),
        })
    }

    /// Best-effort competitor lookup for the compare endpoint. Any failure
    /// (bad URL, missing key, API error) is logged and collapses to `None`.
    pub async fn fetch_competitor(&self, url: &str) -> Option<CompetitorData> {
        let video_id = match extract_video_id(url) {
            Ok(Some(id)) => id,
            Ok(None) => return None,
            Err(err) => {
                warn!("competitor id extraction failed: {err:#}");
                return None;
            }
        };
        let api_key = self.api_key.as_deref()?;

        let api_url = format!("{API_BASE}?part=snippet,statistics&id={video_id}&key={api_key}");
        match self.try_fetch_competitor(&api_url).await {
            Ok(data) => data,
            Err(err) => {
                warn!("competitor lookup failed for {video_id}: {err:#}");
                None
            }
        }
    }

    async fn try_fetch_competitor(&self, api_url: &str) -> Result<Option<CompetitorData>> {
        let data: serde_json::Value = self
            .client
            .get(api_url)
            .send()
            .await
            .context("youtube request failed")?
            .json()
            .await
            .context("youtube response was not JSON")?;

        let item = match data.get("items").and_then(|items| items.get(0)) {
            Some(item) => item,
            None => return Ok(None),
        };
        let snippet = &item["snippet"];
        let stats = &item["statistics"];

        Ok(Some(CompetitorData {
            title: string_field(snippet, "title"),
            view_count: string_field(stats, "viewCount"),
            like_count: string_field(stats, "likeCount"),
            published_at: string_field(snippet, "publishedAt"),
        }))
    }
}

fn string_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_common_url_forms() {
        let urls = [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "http://youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "youtube.com/live/dQw4w9WgXcQ",
        ];
        for url in urls {
            assert_eq!(
                extract_video_id(url).unwrap().as_deref(),
                Some("dQw4w9WgXcQ"),
                "failed for {url}"
            );
        }
    }

    #[test]
    fn accepts_bare_video_id() {
        assert_eq!(
            extract_video_id("dQw4w9WgXcQ").unwrap().as_deref(),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn rejects_junk() {
        for url in ["https://vimeo.com/12345", "not a url", "short", ""] {
            assert_eq!(extract_video_id(url).unwrap(), None, "accepted {url}");
        }
    }

    #[tokio::test]
    async fn fetch_without_key_reports_configuration_problem() {
        let client = YoutubeClient::new(Client::new(), None);
        let err = client.fetch_video("dQw4w9WgXcQ").await.expect_err("no key");
        assert!(matches!(err, ApiError::Internal(_)));
    }

    #[tokio::test]
    async fn fetch_with_bad_url_names_the_field() {
        let client = YoutubeClient::new(Client::new(), Some("key".to_string()));
        match client.fetch_video("not a url").await {
            Err(ApiError::Validation { field, .. }) => assert_eq!(field, "url"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn competitor_lookup_degrades_to_none() {
        let client = YoutubeClient::new(Client::new(), None);
        assert!(client.fetch_competitor("dQw4w9WgXcQ").await.is_none());
        assert!(client.fetch_competitor("garbage").await.is_none());
    }
}
