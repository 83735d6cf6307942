//! Web playback transcode.

use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use yv_models::encoding::{
    AUDIO_CODEC, TRANSCODE_AUDIO_BITRATE, TRANSCODE_CRF, TRANSCODE_PRESET, VIDEO_CODEC,
};

/// Re-encode any input to H.264/AAC MP4 with the moov atom up front, so
/// browsers can start playback before the download completes.
pub async fn transcode_for_web(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    timeout: Duration,
) -> MediaResult<()> {
    let cmd = transcode_command(input.as_ref(), output.as_ref());

    FfmpegRunner::new()
        .with_timeout(timeout)
        .run_with_progress(&cmd, |p| {
            if p.finished {
                debug!(frames = p.frame, "Transcode finished");
            } else {
                debug!(position = ?p.position, speed = ?p.speed, "Transcode progress");
            }
        })
        .await
}

fn transcode_command(input: &Path, output: &Path) -> FfmpegCommand {
    FfmpegCommand::new(input, output)
        .video_codec(VIDEO_CODEC)
        .preset(TRANSCODE_PRESET)
        .crf(TRANSCODE_CRF)
        // Odd dimensions are rejected by libx264 with yuv420p
        .video_filter("scale=trunc(iw/2)*2:trunc(ih/2)*2,format=yuv420p")
        .audio_codec(AUDIO_CODEC)
        .audio_bitrate(TRANSCODE_AUDIO_BITRATE)
        .output_args(["-movflags", "+faststart"])
}
