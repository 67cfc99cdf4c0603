//! Prompt templates for the three model-backed operations. Each function is
//! pure string assembly: the literal JSON skeleton at the end of every prompt
//! is the only thing constraining the model's output shape, so the templates
//! must stay in sync with the types in [`crate::schema`].

use crate::api::youtube::CompetitorData;
use crate::schema::{AnalysisRequest, ChatRole, ChatTurn};

const ANALYSIS_SKELETON: &str = r#"{
  "titles": ["", "", ""],
  "description": "",
  "hashtags": ["", ""],
  "tags": ["", ""],
  "performancePrediction": {
    "potential": "Low | Medium | High",
    "confidenceScore": 0,
    "reason": ""
  },
  "nextVideoIdeas": [
    { "idea": "", "reason": "" },
    { "idea": "", "reason": "" }
  ]
}"#;

const CHAT_SKELETON: &str = r#"{
  "message": "",
  "updatedAnalysis": null
}"#;

const COMPARE_SKELETON: &str = r#"{
  "score": 0,
  "strength": "",
  "weakness": "",
  "recommendation": "",
  "marketGap": ""
}"#;

pub fn analyze_prompt(req: &AnalysisRequest) -> String {
    let content = req
        .idea
        .as_deref()
        .or(req.transcript.as_deref())
        .unwrap_or(if req.youtube_url.is_some() {
            "Provided via YouTube URL"
        } else {
            "N/A"
        });

    let url_line = match &req.youtube_url {
        Some(url) => format!("YouTube URL: {url}\n"),
        None => String::new(),
    };

    format!(
        "Act as a professional {platform} growth strategist. Analyze the following video content:\n\
         \n\
         Platform: {platform}\n\
         Niche: {niche}\n\
         Channel Size: {channel_size}\n\
         Video Type: {video_type}\n\
         Content: {content}\n\
         {url_line}\
         \n\
         Do NOT exaggerate views or guarantee virality. Use range-based prediction.\n\
         \n\
         Return ONLY valid JSON in this structure:\n\
         \n\
         {skeleton}\n\
         \n\
         Do not write anything outside JSON.\n",
        platform = req.platform.as_str(),
        niche = req.niche,
        channel_size = req.channel_size.as_str(),
        video_type = req.video_type.as_str(),
        content = content,
        url_line = url_line,
        skeleton = ANALYSIS_SKELETON,
    )
}

pub fn chat_prompt(message: &str, history: &[ChatTurn], context: &serde_json::Value) -> String {
    let mut turns = String::new();
    for turn in history {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        turns.push_str(&format!("{role}: {}\n", turn.content));
    }
    if turns.is_empty() {
        turns.push_str("(none)\n");
    }

    format!(
        "You are an expert YouTube content consultant.\n\
         The user has the following video analysis context:\n\
         {context}\n\
         \n\
         Conversation so far:\n\
         {turns}\
         \n\
         User request: \"{message}\"\n\
         \n\
         Provide a helpful response to refine the strategy. If the user asks for changes to the\n\
         titles, description, or tags, put the full updated analysis object in \"updatedAnalysis\".\n\
         \n\
         Return ONLY valid JSON in this structure:\n\
         \n\
         {skeleton}\n\
         \n\
         Do not write anything outside JSON.\n",
        context = context,
        turns = turns,
        message = message,
        skeleton = CHAT_SKELETON,
    )
}

pub fn compare_prompt(
    user_video: &serde_json::Value,
    competitor: Option<&CompetitorData>,
) -> String {
    let competitor_block = match competitor {
        Some(data) => {
            serde_json::to_string(data).unwrap_or_else(|_| "N/A (General niche benchmark)".into())
        }
        None => "N/A (General niche benchmark)".to_string(),
    };

    format!(
        "Act as a YouTube performance analyst. Compare the following two videos:\n\
         \n\
         YOUR VIDEO:\n\
         {user_video}\n\
         \n\
         COMPETITOR VIDEO:\n\
         {competitor_block}\n\
         \n\
         Return ONLY valid JSON in this structure:\n\
         \n\
         {skeleton}\n\
         \n\
         Do not write anything outside JSON.\n",
        user_video = user_video,
        competitor_block = competitor_block,
        skeleton = COMPARE_SKELETON,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnalysisResponse, ChannelSize, Platform, VideoType};

    fn request(idea: Option<&str>, transcript: Option<&str>, url: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            platform: Platform::YouTube,
            niche: "Tech".to_string(),
            channel_size: ChannelSize::Small,
            video_type: VideoType::Long,
            idea: idea.map(String::from),
            transcript: transcript.map(String::from),
            youtube_url: url.map(String::from),
        }
    }

    #[test]
    fn prompt_is_deterministic() {
        let req = request(Some("A deep dive into async Rust runtimes"), None, None);
        assert_eq!(analyze_prompt(&req), analyze_prompt(&req));
    }

    #[test]
    fn prompt_renders_labeled_fields() {
        let req = request(Some("A deep dive into async Rust runtimes"), None, None);
        let prompt = analyze_prompt(&req);
        assert!(prompt.contains("Platform: YouTube"));
        assert!(prompt.contains("Niche: Tech"));
        assert!(prompt.contains("Channel Size: Small"));
        assert!(prompt.contains("Video Type: Long"));
        assert!(prompt.contains("Content: A deep dive into async Rust runtimes"));
    }

    #[test]
    fn prompt_without_content_fields_uses_placeholder() {
        let req = request(None, None, None);
        let prompt = analyze_prompt(&req);
        assert!(prompt.contains("Content: N/A"));
    }

    #[test]
    fn prompt_mentions_url_when_only_source() {
        let req = request(None, None, Some("https://youtu.be/dQw4w9WgXcQ"));
        let prompt = analyze_prompt(&req);
        assert!(prompt.contains("Content: Provided via YouTube URL"));
        assert!(prompt.contains("YouTube URL: https://youtu.be/dQw4w9WgXcQ"));
    }

    // The skeleton embedded in the prompt must itself satisfy the output
    // contract once filled in; a reply shaped exactly like it should parse.
    #[test]
    fn skeleton_shaped_reply_round_trips() {
        let filled = ANALYSIS_SKELETON
            .replace(r#""potential": "Low | Medium | High""#, r#""potential": "High""#);
        assert!(AnalysisResponse::from_model_json(&filled).is_ok());
    }

    #[test]
    fn chat_prompt_embeds_context_and_message() {
        let context = serde_json::json!({"titles": ["a"]});
        let prompt = chat_prompt("make the titles shorter", &[], &context);
        assert!(prompt.contains(r#"{"titles":["a"]}"#));
        assert!(prompt.contains("make the titles shorter"));
        assert!(prompt.contains("updatedAnalysis"));
    }

    #[test]
    fn compare_prompt_falls_back_to_niche_benchmark() {
        let prompt = compare_prompt(&serde_json::json!({"score": 1}), None);
        assert!(prompt.contains("N/A (General niche benchmark)"));
        assert!(prompt.contains("marketGap"));
    }
}
