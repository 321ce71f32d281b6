//! FFprobe-backed metadata extraction.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;
use vidiform_common::{ExtractError, FileHandle, MetadataRecord};

use super::Extractor;

const TOOL: &str = "ffprobe";

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    format: FfprobeFormat,
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Default, Deserialize)]
struct FfprobeFormat {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    avg_frame_rate: Option<String>,
}

/// Extracts technical metadata by running `ffprobe` on the file contents.
///
/// The handle's bytes are written to a scratch directory first, since the
/// handle itself may not correspond to a file on disk.
pub struct FfprobeExtractor {
    ffprobe: PathBuf,
}

impl FfprobeExtractor {
    /// Create an extractor that runs the given ffprobe binary.
    pub fn new(ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe: ffprobe.into(),
        }
    }

    async fn run(&self, path: &Path) -> Result<Vec<u8>, ExtractError> {
        let output = tokio::process::Command::new(&self.ffprobe)
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ExtractError::tool_not_found(self.ffprobe.display().to_string())
                } else {
                    ExtractError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ExtractError::tool_failed(
                TOOL,
                format!("{}: {}", output.status, stderr.trim()),
            ));
        }

        Ok(output.stdout)
    }
}

impl Default for FfprobeExtractor {
    fn default() -> Self {
        Self::new(TOOL)
    }
}

#[async_trait]
impl Extractor for FfprobeExtractor {
    fn name(&self) -> &'static str {
        TOOL
    }

    async fn extract(&self, handle: &FileHandle) -> Result<MetadataRecord, ExtractError> {
        let scratch = tempfile::Builder::new().prefix("vidiform-").tempdir()?;
        let path = scratch.path().join(scratch_file_name(handle));
        tokio::fs::write(&path, &handle.content).await?;

        debug!(file = %handle.name, bytes = handle.size, "Running ffprobe");
        let stdout = self.run(&path).await?;

        let json = std::str::from_utf8(&stdout)
            .map_err(|e| ExtractError::parse_error(TOOL, format!("Invalid UTF-8: {e}")))?;
        parse_ffprobe_output(handle.stem(), json)
    }
}

/// Name for the scratch copy of `handle`. The extension helps ffprobe pick a
/// demuxer; anything but a plain alphanumeric extension is dropped.
fn scratch_file_name(handle: &FileHandle) -> String {
    match handle.extension() {
        Some(ext) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => {
            format!("input.{ext}")
        }
        _ => "input".to_string(),
    }
}

/// Map ffprobe's JSON report onto a fresh record titled `title`.
fn parse_ffprobe_output(title: &str, json: &str) -> Result<MetadataRecord, ExtractError> {
    let output: FfprobeOutput = serde_json::from_str(json)?;

    let video = output
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| ExtractError::parse_error(TOOL, "no video stream found"))?;

    let duration = output
        .format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .map(format_duration)
        .ok_or_else(|| ExtractError::parse_error(TOOL, "missing duration"))?;
    let resolution = match (video.width, video.height) {
        (Some(w), Some(h)) if w > 0 && h > 0 => format!("{w}x{h}"),
        _ => return Err(ExtractError::parse_error(TOOL, "missing resolution")),
    };
    let frame_rate = video
        .r_frame_rate
        .as_deref()
        .and_then(parse_frame_rate)
        .or_else(|| video.avg_frame_rate.as_deref().and_then(parse_frame_rate))
        .map(format_frame_rate)
        .ok_or_else(|| ExtractError::parse_error(TOOL, "missing frame rate"))?;

    let mut record = MetadataRecord::new(title);
    record.duration = duration;
    record.resolution = resolution;
    record.frame_rate = frame_rate;
    record.codec = video.codec_name.as_deref().map(codec_display_name);

    Ok(record)
}

/// Render seconds as `HH:MM:SS`, dropping fractions.
fn format_duration(secs: f64) -> String {
    let total = secs.max(0.0) as u64;
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    let rate = match rate_str.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                return None;
            }
            num / den
        }
        None => rate_str.parse().ok()?,
    };
    (rate > 0.0).then_some(rate)
}

/// At most two decimals, trailing zeros trimmed.
fn format_frame_rate(rate: f64) -> String {
    let text = format!("{rate:.2}");
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn codec_display_name(codec: &str) -> String {
    match codec.to_ascii_lowercase().as_str() {
        "h264" | "avc" | "avc1" => "H.264".to_string(),
        "hevc" | "h265" => "H.265".to_string(),
        "mpeg4" => "MPEG-4".to_string(),
        "mpeg2video" => "MPEG-2".to_string(),
        "prores" => "ProRes".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {"index": 0, "codec_type": "audio", "codec_name": "aac"},
            {"index": 1, "codec_type": "video", "codec_name": "h264",
             "width": 1920, "height": 1080, "r_frame_rate": "30000/1001"}
        ],
        "format": {"filename": "input.mp4", "format_name": "mov,mp4", "duration": "204.533"}
    }"#;

    #[test]
    fn test_parse_sample_output() {
        let record = parse_ffprobe_output("clip", SAMPLE).unwrap();
        assert_eq!(record.title, "clip");
        assert_eq!(record.duration, "00:03:24");
        assert_eq!(record.resolution, "1920x1080");
        assert_eq!(record.frame_rate, "29.97");
        assert_eq!(record.codec.as_deref(), Some("H.264"));
    }

    #[test]
    fn test_parse_without_video_stream() {
        let json = r#"{"streams": [{"codec_type": "audio"}], "format": {}}"#;
        let err = parse_ffprobe_output("song", json).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = parse_ffprobe_output("x", "not json").unwrap_err();
        assert!(matches!(err, ExtractError::Json(_)));
    }

    #[test]
    fn test_parse_missing_technical_values_fails() {
        let bare = r#"{"streams": [{"codec_type": "video"}]}"#;
        let err = parse_ffprobe_output("bare", bare).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { .. }));

        let no_duration = r#"{"streams": [{"codec_type": "video", "width": 640,
            "height": 480, "r_frame_rate": "25/1"}], "format": {}}"#;
        assert!(parse_ffprobe_output("x", no_duration).is_err());

        let no_size = r#"{"streams": [{"codec_type": "video", "r_frame_rate": "25/1"}],
            "format": {"duration": "10.0"}}"#;
        assert!(parse_ffprobe_output("x", no_size).is_err());

        let no_rate = r#"{"streams": [{"codec_type": "video", "width": 640, "height": 480,
            "r_frame_rate": "0/0"}], "format": {"duration": "10.0"}}"#;
        assert!(parse_ffprobe_output("x", no_rate).is_err());
    }

    #[test]
    fn test_parse_without_codec() {
        let json = r#"{"streams": [{"codec_type": "video", "width": 640, "height": 480,
            "avg_frame_rate": "25/1"}], "format": {"duration": "10.0"}}"#;
        let record = parse_ffprobe_output("plain", json).unwrap();
        assert_eq!(record.frame_rate, "25");
        assert_eq!(record.codec, None);
    }

    #[test]
    fn test_scratch_file_name() {
        let name = |n: &str| scratch_file_name(&FileHandle::new(n, Vec::new()));
        assert_eq!(name("clip.mkv"), "input.mkv");
        assert_eq!(name("clip"), "input");
        assert_eq!(name("x./y"), "input");
        assert_eq!(name("a.m p4"), "input");
        assert_eq!(name("a.."), "input");
    }

    #[test]
    fn test_parse_frame_rate() {
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
        assert_eq!(parse_frame_rate("invalid"), None);
    }

    #[test]
    fn test_format_frame_rate() {
        assert_eq!(format_frame_rate(30000.0 / 1001.0), "29.97");
        assert_eq!(format_frame_rate(25.0), "25");
        assert_eq!(format_frame_rate(24000.0 / 1001.0), "23.98");
        assert_eq!(format_frame_rate(12.5), "12.5");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "00:00:00");
        assert_eq!(format_duration(204.9), "00:03:24");
        assert_eq!(format_duration(7325.0), "02:02:05");
    }

    #[test]
    fn test_codec_display_name() {
        assert_eq!(codec_display_name("h264"), "H.264");
        assert_eq!(codec_display_name("hevc"), "H.265");
        assert_eq!(codec_display_name("vp9"), "VP9");
    }

    #[tokio::test]
    async fn test_missing_binary_reports_tool_not_found() {
        let extractor = FfprobeExtractor::new("nonexistent_ffprobe_12345");
        let handle = FileHandle::new("clip.mp4", vec![0u8; 16]);
        let err = extractor.extract(&handle).await.unwrap_err();
        assert!(matches!(err, ExtractError::ToolNotFound { .. }));
    }
}
