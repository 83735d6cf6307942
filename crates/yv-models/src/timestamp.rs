//! Duration formatting.

/// Format seconds as `HH:MM:SS`, truncating fractions.
///
/// Negative and non-finite inputs format as zero. Hours are not wrapped at 24.
///
/// # Examples
/// ```
/// use yv_models::timestamp::format_duration;
/// assert_eq!(format_duration(0.0), "00:00:00");
/// assert_eq!(format_duration(3725.9), "01:02:05");
/// ```
pub fn format_duration(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(59.999), "00:00:59");
        assert_eq!(format_duration(60.0), "00:01:00");
        assert_eq!(format_duration(90_061.0), "25:01:01");
    }

    #[test]
    fn test_format_duration_invalid_input() {
        assert_eq!(format_duration(-4.0), "00:00:00");
        assert_eq!(format_duration(f64::NAN), "00:00:00");
    }
}
