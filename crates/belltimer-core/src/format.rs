//! Display helpers for elapsed times and bell labels.

pub const BELL_ICON: &str = "🔔";

/// Format seconds as "MM:SS". Minutes keep growing past 99.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Compact duration: "45s", "5m", "5m 30s".
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        return format!("{secs}s");
    }
    let (m, s) = (secs / 60, secs % 60);
    if s == 0 {
        format!("{m}m")
    } else {
        format!("{m}m {s}s")
    }
}

/// One bell glyph per ring.
pub fn bell_icons(count: u32) -> String {
    BELL_ICON.repeat(count as usize)
}

/// "🔔×3"
pub fn bell_label(count: u32) -> String {
    format!("{BELL_ICON}×{count}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(75), "01:15");
        assert_eq!(format_clock(6_000), "100:00");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(300), "5m");
        assert_eq!(format_duration(330), "5m 30s");
    }

    #[test]
    fn test_bell_labels() {
        assert_eq!(bell_icons(3), "🔔🔔🔔");
        assert_eq!(bell_label(2), "🔔×2");
    }
}
