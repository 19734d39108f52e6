/// Format an elapsed-seconds counter as `MM:SS`, zero-padded.
///
/// Minutes do not roll over into hours; an hour-long recording reads
/// `60:00`.
pub fn format_elapsed(seconds: u64) -> String {
    let minutes = seconds / 60;
    let secs = seconds % 60;
    format!("{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_zero() {
        assert_eq!(format_elapsed(0), "00:00");
    }

    #[test]
    fn formats_minutes_and_seconds() {
        assert_eq!(format_elapsed(65), "01:05");
        assert_eq!(format_elapsed(59), "00:59");
    }

    #[test]
    fn no_hour_rollover() {
        assert_eq!(format_elapsed(3600), "60:00");
        assert_eq!(format_elapsed(3725), "62:05");
    }
}
