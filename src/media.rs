use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

const FFMPEG_TIMEOUT: Duration = Duration::from_secs(120);

pub const ACCEPTED_VIDEO_TYPES: &[&str] = &["video", "mp4", "quicktime"];

pub fn is_supported_video_type(content_type: &str) -> bool {
    ACCEPTED_VIDEO_TYPES.iter().any(|t| content_type.contains(t))
}

/// Strip the audio track out of an uploaded video with ffmpeg. The child
/// process gets a hard deadline; a hung encode must not pin the request.
pub async fn extract_audio(video: &Path, audio: &Path) -> Result<()> {
    let mut cmd = Command::new("ffmpeg");
    cmd.arg("-y")
        .arg("-i")
        .arg(video)
        .args(["-vn", "-acodec", "libmp3lame"])
        .arg(audio);
    cmd.kill_on_drop(true);

    let status = timeout(FFMPEG_TIMEOUT, cmd.status())
        .await
        .context("ffmpeg timed out")?
        .context("ffmpeg execution failed")?;

    if !status.success() {
        anyhow::bail!("ffmpeg exited with {status}");
    }

    Ok(())
}

pub async fn check_ffmpeg() -> bool {
    match Command::new("ffmpeg").arg("-version").output().await {
        Ok(output) => output.status.success(),
        Err(_) => false,
    }
}

/// Speech-to-text collaborator. The deployed service alternated between a
/// real transcription call and a stub; the interface is all this crate
/// relies on.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<String>;
}

/// Stand-in transcriber until a real speech-to-text backend is wired up.
pub struct PlaceholderTranscriber;

#[async_trait]
impl Transcriber for PlaceholderTranscriber {
    async fn transcribe(&self, _audio: &Path) -> Result<String> {
        Ok("Temporary transcript for testing".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn video_mime_types_are_accepted() {
        assert!(is_supported_video_type("video/mp4"));
        assert!(is_supported_video_type("video/quicktime"));
        assert!(is_supported_video_type("video/webm"));
    }

    #[test]
    fn non_video_mime_types_are_rejected() {
        assert!(!is_supported_video_type("image/png"));
        assert!(!is_supported_video_type("application/pdf"));
    }

    #[tokio::test]
    async fn placeholder_transcriber_returns_text() {
        let transcript = PlaceholderTranscriber
            .transcribe(Path::new("unused.mp3"))
            .await
            .unwrap();
        assert!(transcript.len() >= 5);
    }
}
