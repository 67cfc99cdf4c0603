use crate::error::{ApiError, MalformedResponseError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Platform {
    #[default]
    YouTube,
    Instagram,
    TikTok,
}

impl Platform {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "YouTube" => Some(Self::YouTube),
            "Instagram" => Some(Self::Instagram),
            "TikTok" => Some(Self::TikTok),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::YouTube => "YouTube",
            Self::Instagram => "Instagram",
            Self::TikTok => "TikTok",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelSize {
    Small,
    Medium,
    Large,
}

impl ChannelSize {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "Small" => Some(Self::Small),
            "Medium" => Some(Self::Medium),
            "Large" => Some(Self::Large),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "Small",
            Self::Medium => "Medium",
            Self::Large => "Large",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VideoType {
    Short,
    Long,
}

impl VideoType {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "Short" => Some(Self::Short),
            "Long" => Some(Self::Long),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "Short",
            Self::Long => "Long",
        }
    }
}

/// Canonical analyze input. Only produced through [`RawAnalysisRequest::validate`],
/// so a value of this type always satisfies the field constraints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub platform: Platform,
    pub niche: String,
    pub channel_size: ChannelSize,
    pub video_type: VideoType,
    pub idea: Option<String>,
    pub transcript: Option<String>,
    pub youtube_url: Option<String>,
}

/// Untyped request body as received on the wire. Enum fields arrive as
/// plain strings so a bad value can be reported against its field name
/// instead of surfacing as a serde rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAnalysisRequest {
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub niche: Option<String>,
    #[serde(default)]
    pub channel_size: Option<String>,
    #[serde(default)]
    pub video_type: Option<String>,
    #[serde(default)]
    pub idea: Option<String>,
    #[serde(default)]
    pub transcript: Option<String>,
    #[serde(default)]
    pub youtube_url: Option<String>,
}

const MIN_IDEA_CHARS: usize = 10;

impl RawAnalysisRequest {
    pub fn validate(self) -> Result<AnalysisRequest, ApiError> {
        let platform = match self.platform.as_deref() {
            None | Some("") => Platform::default(),
            Some(s) => Platform::parse(s).ok_or_else(|| {
                ApiError::validation(
                    "platform",
                    format!("Unknown platform '{s}' (expected YouTube, Instagram, or TikTok)"),
                )
            })?,
        };

        let niche = match self.niche {
            Some(n) if !n.trim().is_empty() => n,
            _ => return Err(ApiError::validation("niche", "Please select a niche")),
        };

        let channel_size = match self.channel_size.as_deref() {
            None | Some("") => {
                return Err(ApiError::validation(
                    "channelSize",
                    "Please select a channel size",
                ));
            }
            Some(s) => ChannelSize::parse(s).ok_or_else(|| {
                ApiError::validation(
                    "channelSize",
                    format!("Unknown channel size '{s}' (expected Small, Medium, or Large)"),
                )
            })?,
        };

        let video_type = match self.video_type.as_deref() {
            None | Some("") => {
                return Err(ApiError::validation(
                    "videoType",
                    "Please select a video type",
                ));
            }
            Some(s) => VideoType::parse(s).ok_or_else(|| {
                ApiError::validation(
                    "videoType",
                    format!("Unknown video type '{s}' (expected Short or Long)"),
                )
            })?,
        };

        if let Some(idea) = &self.idea {
            if idea.chars().count() < MIN_IDEA_CHARS {
                return Err(ApiError::validation(
                    "idea",
                    "Please provide a more detailed idea (at least 10 characters)",
                ));
            }
        }

        if self.idea.is_none() && self.transcript.is_none() && self.youtube_url.is_none() {
            return Err(ApiError::validation(
                "idea",
                "Provide an idea, a transcript, or a YouTube URL",
            ));
        }

        Ok(AnalysisRequest {
            platform,
            niche,
            channel_size,
            video_type,
            idea: self.idea,
            transcript: self.transcript,
            youtube_url: self.youtube_url,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Potential {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformancePrediction {
    pub potential: Potential,
    pub confidence_score: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoIdea {
    pub idea: String,
    pub reason: String,
}

/// Canonical analyze output contract. Every field is required; a model reply
/// missing one fails to parse rather than defaulting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub titles: Vec<String>,
    pub description: String,
    pub hashtags: Vec<String>,
    pub tags: Vec<String>,
    pub performance_prediction: PerformancePrediction,
    pub next_video_ideas: Vec<VideoIdea>,
}

impl AnalysisResponse {
    pub fn from_model_json(text: &str) -> Result<Self, MalformedResponseError> {
        let parsed: Self = serde_json::from_str(text)
            .map_err(|e| MalformedResponseError::new(format!("invalid analysis JSON: {e}"), text))?;

        let score = parsed.performance_prediction.confidence_score;
        if !(0.0..=100.0).contains(&score) {
            return Err(MalformedResponseError::new(
                format!("confidenceScore {score} outside 0-100"),
                text,
            ));
        }

        Ok(parsed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
    #[serde(default)]
    pub context: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_analysis: Option<AnalysisResponse>,
}

impl ChatReply {
    pub fn from_model_json(text: &str) -> Result<Self, MalformedResponseError> {
        serde_json::from_str(text)
            .map_err(|e| MalformedResponseError::new(format!("invalid chat JSON: {e}"), text))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareRequest {
    pub user_video: serde_json::Value,
    #[serde(default)]
    pub competitor_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareReport {
    pub score: f64,
    pub strength: String,
    pub weakness: String,
    pub recommendation: String,
    pub market_gap: String,
}

impl CompareReport {
    pub fn from_model_json(text: &str) -> Result<Self, MalformedResponseError> {
        let parsed: Self = serde_json::from_str(text)
            .map_err(|e| MalformedResponseError::new(format!("invalid compare JSON: {e}"), text))?;

        if !(0.0..=100.0).contains(&parsed.score) {
            return Err(MalformedResponseError::new(
                format!("score {} outside 0-100", parsed.score),
                text,
            ));
        }

        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> RawAnalysisRequest {
        RawAnalysisRequest {
            platform: Some("YouTube".to_string()),
            niche: Some("Tech".to_string()),
            channel_size: Some("Small".to_string()),
            video_type: Some("Long".to_string()),
            idea: Some("A 10-minute tutorial on building a REST API in Go".to_string()),
            transcript: None,
            youtube_url: None,
        }
    }

    const VALID_ANALYSIS: &str = r##"{
        "titles": ["Build a REST API in Go", "Go API Tutorial", "REST in 10 Minutes"],
        "description": "Learn to build a REST API in Go from scratch.",
        "hashtags": ["#golang", "#api"],
        "tags": ["golang", "rest api"],
        "performancePrediction": {
            "potential": "Medium",
            "confidenceScore": 72,
            "reason": "Established demand for Go tutorials."
        },
        "nextVideoIdeas": [
            { "idea": "Add auth to the API", "reason": "Natural follow-up" },
            { "idea": "Deploy the API", "reason": "Completes the series" }
        ]
    }"##;

    #[test]
    fn valid_request_passes() {
        let req = valid_raw().validate().expect("should validate");
        assert_eq!(req.platform, Platform::YouTube);
        assert_eq!(req.channel_size, ChannelSize::Small);
        assert_eq!(req.video_type, VideoType::Long);
    }

    #[test]
    fn platform_defaults_to_youtube() {
        let mut raw = valid_raw();
        raw.platform = None;
        let req = raw.validate().expect("should validate");
        assert_eq!(req.platform, Platform::YouTube);
    }

    #[test]
    fn unknown_platform_names_the_field() {
        let mut raw = valid_raw();
        raw.platform = Some("Facebook".to_string());
        match raw.validate() {
            Err(ApiError::Validation { field, .. }) => assert_eq!(field, "platform"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn empty_niche_is_rejected() {
        let mut raw = valid_raw();
        raw.niche = Some("   ".to_string());
        match raw.validate() {
            Err(ApiError::Validation { field, .. }) => assert_eq!(field, "niche"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn short_idea_is_rejected() {
        let mut raw = valid_raw();
        raw.idea = Some("too short".to_string());
        match raw.validate() {
            Err(ApiError::Validation { field, .. }) => assert_eq!(field, "idea"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn request_without_any_content_field_is_rejected() {
        let mut raw = valid_raw();
        raw.idea = None;
        raw.transcript = None;
        raw.youtube_url = None;
        assert!(raw.validate().is_err());
    }

    #[test]
    fn transcript_alone_is_enough() {
        let mut raw = valid_raw();
        raw.idea = None;
        raw.transcript = Some("full transcript text".to_string());
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn valid_analysis_parses() {
        let resp = AnalysisResponse::from_model_json(VALID_ANALYSIS).expect("should parse");
        assert_eq!(resp.titles.len(), 3);
        assert_eq!(resp.performance_prediction.potential, Potential::Medium);
    }

    #[test]
    fn missing_hashtags_fails_not_defaults() {
        let trimmed = VALID_ANALYSIS.replace(r##""hashtags": ["#golang", "#api"],"##, "");
        assert!(AnalysisResponse::from_model_json(&trimmed).is_err());
    }

    #[test]
    fn confidence_score_out_of_range_is_rejected() {
        for bad in ["150", "-5"] {
            let doctored = VALID_ANALYSIS.replace(r#""confidenceScore": 72"#, &format!(r#""confidenceScore": {bad}"#));
            let err = AnalysisResponse::from_model_json(&doctored).expect_err("should reject");
            assert!(err.reason.contains("confidenceScore"));
        }
    }

    #[test]
    fn unknown_potential_is_rejected() {
        let doctored = VALID_ANALYSIS.replace(r#""potential": "Medium""#, r#""potential": "Viral""#);
        assert!(AnalysisResponse::from_model_json(&doctored).is_err());
    }

    #[test]
    fn chat_reply_allows_null_updated_analysis() {
        let reply = ChatReply::from_model_json(r#"{"message": "Sure.", "updatedAnalysis": null}"#)
            .expect("should parse");
        assert!(reply.updated_analysis.is_none());
    }

    #[test]
    fn compare_report_score_is_range_checked() {
        let json = r#"{"score": 130, "strength": "", "weakness": "", "recommendation": "", "marketGap": ""}"#;
        assert!(CompareReport::from_model_json(json).is_err());
    }
}
