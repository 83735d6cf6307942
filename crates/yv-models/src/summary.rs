//! Fixed AI summary texts stored when the summary chain cannot complete.

/// Audio extraction failed or the file has no audio stream.
pub const NO_AUDIO: &str = "No audio track found.";
/// Transcription failed or produced no text.
pub const TRANSCRIPTION_FAILED: &str = "Could not transcribe audio.";
/// The summarizer call failed.
pub const SUMMARY_FAILED: &str = "Summary generation failed.";
/// No summarizer is configured.
pub const SUMMARY_UNAVAILABLE: &str = "No summary available.";

/// Whether a stored summary is one of the placeholders above.
pub fn is_placeholder(summary: &str) -> bool {
    matches!(
        summary,
        NO_AUDIO | TRANSCRIPTION_FAILED | SUMMARY_FAILED | SUMMARY_UNAVAILABLE
    )
}
