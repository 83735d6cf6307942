//! Thumbnail generation.

use std::path::Path;
use std::time::Duration;

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::MediaResult;
use yv_models::encoding::{THUMBNAIL_SCALE_WIDTH, THUMBNAIL_TIMESTAMP};

/// Grab one JPEG frame at the one-second mark, scaled to the thumbnail width.
pub async fn generate_thumbnail(
    video_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    timeout: Duration,
) -> MediaResult<()> {
    let cmd = thumbnail_command(video_path.as_ref(), output_path.as_ref());
    FfmpegRunner::new().with_timeout(timeout).run(&cmd).await
}

fn thumbnail_command(video_path: &Path, output_path: &Path) -> FfmpegCommand {
    let filter = format!("scale={}:-2", THUMBNAIL_SCALE_WIDTH);

    FfmpegCommand::new(video_path, output_path)
        .input_arg("-ss")
        .input_arg(THUMBNAIL_TIMESTAMP)
        .single_frame()
        .video_filter(filter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thumbnail_args() {
        let args = thumbnail_command(Path::new("a.mp4"), Path::new("a_thumb.jpg")).build_args();
        assert!(args.contains(&"scale=480:-2".to_string()));
        assert!(args.contains(&"00:00:01".to_string()));
        assert!(args.windows(2).any(|w| w == ["-vframes", "1"]));
    }
}
