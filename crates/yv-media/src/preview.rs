//! Hover preview generation.

use std::path::Path;
use std::time::Duration;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use yv_models::encoding::{
    PREVIEW_DURATION_SECS, PREVIEW_FPS, PREVIEW_OFFSET_SECS, PREVIEW_WIDTH,
};

/// Render a short silent looping GIF from a few seconds into the video.
pub async fn generate_preview(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    timeout: Duration,
) -> MediaResult<()> {
    let cmd = preview_command(video_path.as_ref(), output_path.as_ref());
    FfmpegRunner::new().with_timeout(timeout).run(&cmd).await
}

fn preview_command(video_path: &Path, output_path: &Path) -> FfmpegCommand {
    let filter = format!(
        "fps={},scale={}:-1:flags=lanczos",
        PREVIEW_FPS, PREVIEW_WIDTH
    );

    FfmpegCommand::new(video_path, output_path)
        .seek(PREVIEW_OFFSET_SECS)
        .duration(PREVIEW_DURATION_SECS)
        .video_filter(filter)
        .no_audio()
        .output_args(["-loop", "0"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_args() {
        let args = preview_command(Path::new("a.mp4"), Path::new("a_preview.gif")).build_args();
        assert!(args.windows(2).any(|w| w == ["-ss", "2.000"]));
        assert!(args.windows(2).any(|w| w == ["-t", "3.000"]));
        assert!(args.contains(&"fps=10,scale=320:-1:flags=lanczos".to_string()));
        assert!(args.contains(&"-an".to_string()));
    }
}
