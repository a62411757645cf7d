use super::probe;
use super::{ProgressFn, RenditionOutput, TranscodeError, TranscodeRequest, Transcoder};
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Drives one ffmpeg child process per rendition. Progress comes from
/// the `-progress` key=value stream on stdout; a fired token kills the
/// child and removes the partial output file.
pub struct FfmpegTranscoder {
    ffmpeg_bin: String,
    ffprobe_bin: String,
}

impl FfmpegTranscoder {
    pub fn new(ffmpeg_bin: String, ffprobe_bin: String) -> Self {
        Self {
            ffmpeg_bin,
            ffprobe_bin,
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    async fn transcode(
        &self,
        request: TranscodeRequest,
        progress: ProgressFn,
        cancel: CancellationToken,
    ) -> Result<RenditionOutput, TranscodeError> {
        if !tokio::fs::try_exists(&request.source).await.unwrap_or(false) {
            return Err(TranscodeError::SourceMissing(request.source.clone()));
        }

        let source_info = probe::probe(&self.ffprobe_bin, &request.source).await?;

        if let Some(parent) = request.output.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        info!(
            "🎞️ Encoding {} -> {} ({})",
            request.source.display(),
            request.output.display(),
            request.quality
        );

        let scale = format!("scale=-2:{}", request.quality.height());
        let mut child = Command::new(&self.ffmpeg_bin)
            .args(["-y", "-nostats", "-loglevel", "error"])
            .arg("-i")
            .arg(&request.source)
            .args(["-c:v", "libx264", "-preset", "fast"])
            .args(["-vf", &scale])
            .args(["-b:v", request.quality.video_bitrate()])
            .args(["-c:a", "aac", "-b:a", "128k"])
            .args(["-movflags", "+faststart"])
            .args(["-progress", "pipe:1"])
            .arg(&request.output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stdout not captured"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| std::io::Error::other("ffmpeg stderr not captured"))?;

        // -loglevel error keeps this small, collect it off to the side.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        match drain_progress(stdout, source_info.duration_secs, &progress, &cancel).await {
            Ok(StreamEnd::Finished) => {}
            Ok(StreamEnd::Cancelled) => {
                debug!(
                    "Killing encoder for job {} ({}) after cancel",
                    request.job_id, request.quality
                );
                kill_and_discard(&mut child, &stderr_task, &request.output).await;
                return Err(TranscodeError::Cancelled);
            }
            // A broken progress pipe leaves the child running; it gets
            // the same kill-and-clean treatment as a cancel so no
            // orphaned encoder or partial file survives the error.
            Err(e) => {
                kill_and_discard(&mut child, &stderr_task, &request.output).await;
                return Err(TranscodeError::Io(e));
            }
        }

        let status = child.wait().await?;
        let stderr_text = stderr_task.await.unwrap_or_default();

        if !status.success() {
            let _ = tokio::fs::remove_file(&request.output).await;
            return Err(TranscodeError::Encoder {
                status: status.to_string(),
                stderr: stderr_text.trim().to_string(),
            });
        }

        progress(100);

        let output_info = probe::probe(&self.ffprobe_bin, &request.output).await?;
        Ok(RenditionOutput {
            path: request.output.clone(),
            file_size: output_info.file_size,
            duration_secs: output_info.duration_secs,
            bitrate: output_info.bitrate,
            codec: output_info.video_codec,
        })
    }
}

#[derive(Debug, PartialEq, Eq)]
enum StreamEnd {
    /// stdout closed, the encoder is shutting down.
    Finished,
    Cancelled,
}

/// Pumps the -progress stream into the callback until the pipe closes,
/// the token fires, or the pipe itself errors. Read errors surface to
/// the caller, which still owns a live child to put down.
async fn drain_progress<R>(
    stdout: R,
    total_secs: f64,
    progress: &ProgressFn,
    cancel: &CancellationToken,
) -> Result<StreamEnd, std::io::Error>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(stdout).lines();
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
            line = lines.next_line() => match line? {
                Some(line) => {
                    if let Some(percent) = parse_progress_line(&line, total_secs) {
                        progress(percent);
                    }
                }
                None => return Ok(StreamEnd::Finished),
            },
        }
    }
}

/// Puts a still-running encode out of its misery: kill the child, reap
/// it, drop the stderr collector and remove whatever partial output it
/// left behind.
async fn kill_and_discard(child: &mut Child, stderr_task: &JoinHandle<String>, output: &Path) {
    let _ = child.start_kill();
    let _ = child.wait().await;
    stderr_task.abort();
    let _ = tokio::fs::remove_file(output).await;
}

/// Parses one line of ffmpeg's -progress stream. out_time_ms carries
/// microseconds despite its name. Mid-stream values are capped at 99,
/// only the end marker reports 100.
fn parse_progress_line(line: &str, total_secs: f64) -> Option<u8> {
    let (key, value) = line.trim().split_once('=')?;
    match key {
        "out_time_ms" => {
            if total_secs <= 0.0 {
                return None;
            }
            let micros: f64 = value.parse().ok()?;
            let ratio = (micros / 1_000_000.0) / total_secs;
            Some((ratio * 100.0).clamp(0.0, 99.0) as u8)
        }
        "progress" if value == "end" => Some(100),
        _ => None,
    }
}
