use super::TranscodeError;
use serde::Deserialize;
use std::path::Path;
use tokio::process::Command;

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
    size: Option<String>,
    bit_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
}

/// Container-level facts ffprobe reports about a media file.
#[derive(Debug, Clone)]
pub struct MediaInfo {
    pub duration_secs: f64,
    pub file_size: i64,
    pub bitrate: i64,
    pub video_codec: String,
}

pub async fn probe(ffprobe_bin: &str, path: &Path) -> Result<MediaInfo, TranscodeError> {
    let output = Command::new(ffprobe_bin)
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(TranscodeError::Probe(format!(
            "ffprobe failed on {}: {}",
            path.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    parse_probe_output(&String::from_utf8_lossy(&output.stdout))
}

/// ffprobe reports numbers as JSON strings, so everything gets parsed
/// by hand after deserializing.
fn parse_probe_output(json: &str) -> Result<MediaInfo, TranscodeError> {
    let parsed: ProbeOutput = serde_json::from_str(json)
        .map_err(|e| TranscodeError::Probe(format!("unreadable ffprobe output: {e}")))?;

    let format = parsed
        .format
        .ok_or_else(|| TranscodeError::Probe("no format section in ffprobe output".to_string()))?;

    let duration_secs = format
        .duration
        .as_deref()
        .and_then(|d| d.parse::<f64>().ok())
        .ok_or_else(|| TranscodeError::Probe("media has no readable duration".to_string()))?;

    let file_size = format
        .size
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let bitrate = format
        .bit_rate
        .as_deref()
        .and_then(|b| b.parse().ok())
        .unwrap_or(0);

    let video_codec = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .and_then(|s| s.codec_name.clone())
        .ok_or_else(|| TranscodeError::Probe("no video stream found".to_string()))?;

    Ok(MediaInfo {
        duration_secs,
        file_size,
        bitrate,
        video_codec,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "streams": [
            {"codec_type": "audio", "codec_name": "aac"},
            {"codec_type": "video", "codec_name": "h264", "width": 1920, "height": 1080}
        ],
        "format": {
            "filename": "movie.mp4",
            "duration": "123.456000",
            "size": "10485760",
            "bit_rate": "679895"
        }
    }"#;

    #[test]
    fn reads_the_fields_the_pipeline_needs() {
        let info = parse_probe_output(FIXTURE).unwrap();
        assert_eq!(info.duration_secs, 123.456);
        assert_eq!(info.file_size, 10_485_760);
        assert_eq!(info.bitrate, 679_895);
        assert_eq!(info.video_codec, "h264");
    }

    #[test]
    fn missing_duration_is_an_error() {
        let json = r#"{"streams": [{"codec_type": "video", "codec_name": "h264"}], "format": {"size": "1"}}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(err.to_string().contains("duration"));
    }

    #[test]
    fn audio_only_media_is_an_error() {
        let json = r#"{"streams": [{"codec_type": "audio", "codec_name": "mp3"}], "format": {"duration": "10.0"}}"#;
        let err = parse_probe_output(json).unwrap_err();
        assert!(err.to_string().contains("no video stream"));
    }

    #[test]
    fn garbage_output_is_an_error() {
        assert!(parse_probe_output("not json").is_err());
    }
}
