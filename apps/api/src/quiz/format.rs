//! Display helpers shared by the session and result views.

use serde::Serialize;

/// "frontend_developer" -> "Frontend Developer", "data-analyst" -> "Data Analyst".
pub fn format_role(role: &str) -> String {
    capitalize_words(&role.replace(['_', '-'], " "))
}

/// "mid-level" -> "Mid Level".
pub fn format_level(level: &str) -> String {
    capitalize_words(&level.replace('-', " "))
}

fn capitalize_words(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Seconds as zero-padded `MM:SS`.
pub fn format_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerUrgency {
    Normal,
    Warning,
    Critical,
}

pub fn timer_urgency(remaining_secs: u64) -> TimerUrgency {
    if remaining_secs <= 60 {
        TimerUrgency::Critical
    } else if remaining_secs <= 180 {
        TimerUrgency::Warning
    } else {
        TimerUrgency::Normal
    }
}

/// The countdown blinks during its last 30 seconds.
pub fn timer_blinking(remaining_secs: u64) -> bool {
    remaining_secs > 0 && remaining_secs <= 30
}

/// Percentage of `current` over `total`, clamped to [0, 100]; 0 when `total` is 0.
pub fn progress_percent(current: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((current as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_role() {
        assert_eq!(format_role("frontend_developer"), "Frontend Developer");
        assert_eq!(format_role("ml-engineer"), "Ml Engineer");
        assert_eq!(format_role("qa"), "Qa");
    }

    #[test]
    fn test_format_level() {
        assert_eq!(format_level("mid-level"), "Mid Level");
        assert_eq!(format_level("senior"), "Senior");
    }

    #[test]
    fn test_format_time_pads() {
        assert_eq!(format_time(900), "15:00");
        assert_eq!(format_time(61), "01:01");
        assert_eq!(format_time(0), "00:00");
    }

    #[test]
    fn test_urgency_thresholds() {
        assert_eq!(timer_urgency(181), TimerUrgency::Normal);
        assert_eq!(timer_urgency(180), TimerUrgency::Warning);
        assert_eq!(timer_urgency(60), TimerUrgency::Critical);
        assert!(timer_blinking(30));
        assert!(!timer_blinking(31));
        assert!(!timer_blinking(0));
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 4), 25);
        assert_eq!(progress_percent(5, 4), 100);
    }
}
