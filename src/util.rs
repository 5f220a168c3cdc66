pub fn percentage(part: u32, whole: u32) -> Option<f64> {
    match whole {
        0 => None,
        positive => Some((part as f64 / positive as f64 * 100.0).round()),
    }
}

/// Seconds with one decimal, as shown on the HUD
pub fn format_seconds(secs: f64) -> String {
    format!("{:.1}", secs.max(0.0))
}

/// Cut a display name down to `max` chars, marking the cut with an ellipsis
pub fn truncate_name(name: &str, max: usize) -> String {
    if name.chars().count() <= max {
        return name.to_string();
    }
    let kept: String = name.chars().take(max.saturating_sub(1)).collect();
    format!("{kept}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage() {
        assert_eq!(percentage(3, 4), Some(75.0));
        assert_eq!(percentage(2, 3), Some(67.0));
        assert_eq!(percentage(5, 5), Some(100.0));
    }

    #[test]
    fn test_percentage_empty_whole() {
        assert_eq!(percentage(0, 0), None);
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(30.0), "30.0");
        assert_eq!(format_seconds(2.24), "2.2");
        assert_eq!(format_seconds(-0.0001), "0.0");
    }

    #[test]
    fn test_truncate_name() {
        assert_eq!(truncate_name("Ann", 10), "Ann");
        assert_eq!(truncate_name("Bartholomew", 6), "Barth…");
        assert_eq!(truncate_name("Zoë", 3), "Zoë");
    }
}
