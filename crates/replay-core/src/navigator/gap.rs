use std::time::Duration;

use crate::notice::Locale;

/// Human-readable gap length: whole minutes (at least one) below an hour,
/// whole hours above.
pub fn format_gap(gap: Duration, locale: Locale) -> String {
    let secs = gap.as_secs_f64();
    if secs < 3600.0 {
        let minutes = (secs / 60.0).round().max(1.0) as u64;
        match locale {
            Locale::En if minutes == 1 => "1 minute".to_string(),
            Locale::En => format!("{minutes} minutes"),
            Locale::Id => format!("{minutes} menit"),
        }
    } else {
        let hours = (secs / 3600.0).round().max(1.0) as u64;
        match locale {
            Locale::En if hours == 1 => "1 hour".to_string(),
            Locale::En => format!("{hours} hours"),
            Locale::Id => format!("{hours} jam"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_gaps_round_up_to_a_minute() {
        assert_eq!(format_gap(Duration::from_secs(45), Locale::En), "1 minute");
        assert_eq!(format_gap(Duration::from_secs(45), Locale::Id), "1 menit");
        assert_eq!(format_gap(Duration::from_secs(5), Locale::En), "1 minute");
    }

    #[test]
    fn minutes_and_hours() {
        assert_eq!(format_gap(Duration::from_secs(600), Locale::En), "10 minutes");
        assert_eq!(format_gap(Duration::from_secs(3599), Locale::En), "60 minutes");
        assert_eq!(format_gap(Duration::from_secs(3600), Locale::En), "1 hour");
        assert_eq!(format_gap(Duration::from_secs(3 * 3600 + 100), Locale::En), "3 hours");
        assert_eq!(format_gap(Duration::from_secs(2 * 3600), Locale::Id), "2 jam");
    }
}
