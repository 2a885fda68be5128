use serde::Deserialize;
use tokio::process::Command;

use crate::errors::{BotError, BotResult};

/// Basic properties of a video file, read with ffprobe.
///
/// Used to reject files that are not actually decodable video before ffmpeg
/// is asked to re-encode them.
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    // ffprobe reports the container duration as a string
    duration: Option<String>,
}

impl VideoInfo {
    pub async fn probe(path: &str) -> BotResult<Self> {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
                path,
            ])
            .output()
            .await
            .map_err(|e| BotError::external_command_error("ffprobe", e.to_string()))?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(BotError::external_command_error("ffprobe", error_msg));
        }

        let probe: ProbeOutput = serde_json::from_slice(&output.stdout)?;
        Self::from_probe(probe)
    }

    fn from_probe(probe: ProbeOutput) -> BotResult<Self> {
        let video_stream = probe
            .streams
            .iter()
            .find(|s| s.codec_type.as_deref() == Some("video"))
            .ok_or_else(|| BotError::ParseError("File has no video stream".to_string()))?;

        let width = video_stream.width.unwrap_or(0);
        let height = video_stream.height.unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(BotError::ParseError(
                "Video stream has no dimensions".to_string(),
            ));
        }

        let duration = probe
            .format
            .and_then(|f| f.duration)
            .and_then(|d| d.parse::<f64>().ok())
            .unwrap_or(0.0);

        Ok(Self {
            width,
            height,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(json: &str) -> BotResult<VideoInfo> {
        let probe: ProbeOutput = serde_json::from_str(json).unwrap();
        VideoInfo::from_probe(probe)
    }

    #[test]
    fn parses_typical_ffprobe_output() {
        let info = parse(
            r#"{
                "streams": [
                    {"codec_type": "audio", "codec_name": "aac"},
                    {"codec_type": "video", "width": 1920, "height": 1080}
                ],
                "format": {"duration": "12.48", "format_name": "mov,mp4"}
            }"#,
        )
        .unwrap();

        assert_eq!(info.width, 1920);
        assert_eq!(info.height, 1080);
        assert!((info.duration - 12.48).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_files_without_a_video_stream() {
        let result = parse(
            r#"{
                "streams": [{"codec_type": "audio"}],
                "format": {"duration": "3.0"}
            }"#,
        );

        assert!(result.is_err());
    }

    #[test]
    fn missing_duration_defaults_to_zero() {
        let info = parse(
            r#"{
                "streams": [{"codec_type": "video", "width": 640, "height": 480}],
                "format": {}
            }"#,
        )
        .unwrap();

        assert_eq!(info.duration, 0.0);
    }
}
