//! Speech audio extraction.

use std::path::Path;
use std::time::Duration;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use yv_models::encoding::{SPEECH_BITRATE, SPEECH_CHANNELS, SPEECH_SAMPLE_RATE};

/// Extract a small mono MP3 suitable for speech-to-text.
///
/// Fails when the input has no audio stream.
pub async fn extract_audio(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    timeout: Duration,
) -> MediaResult<()> {
    let output_path = output_path.as_ref();
    let cmd = audio_command(video_path.as_ref(), output_path);
    FfmpegRunner::new().with_timeout(timeout).run(&cmd).await?;

    // FFmpeg can exit cleanly with an empty file when there is nothing to map
    let written = tokio::fs::metadata(output_path)
        .await
        .map(|m| m.len() > 0)
        .unwrap_or(false);
    if !written {
        return Err(MediaError::NoAudioStream(video_path.as_ref().to_path_buf()));
    }
    Ok(())
}

fn audio_command(video_path: &Path, output_path: &Path) -> FfmpegCommand {
    FfmpegCommand::new(video_path, output_path)
        .no_video()
        .output_args([
            "-ac".to_string(),
            SPEECH_CHANNELS.to_string(),
            "-ar".to_string(),
            SPEECH_SAMPLE_RATE.to_string(),
        ])
        .audio_codec("libmp3lame")
        .audio_bitrate(SPEECH_BITRATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_args() {
        let args = audio_command(Path::new("a.mp4"), Path::new("a.mp3")).build_args();
        assert!(args.contains(&"-vn".to_string()));
        assert!(args.windows(2).any(|w| w == ["-ac", "1"]));
        assert!(args.windows(2).any(|w| w == ["-ar", "16000"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "32k"]));
    }
}
