use chrono::{DateTime, Utc};

/// Rounds half away from zero to one decimal place, e.g. 81.25 -> 81.3.
pub fn round_to_tenth(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Formats a score without a trailing `.0` for whole numbers.
pub fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{:.0}", score)
    } else {
        format!("{}", score)
    }
}

pub fn generated_on(time: DateTime<Utc>) -> String {
    format!("Generated {}", time.format("%-d %b %Y"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn rounds_to_one_decimal() {
        assert_eq!(round_to_tenth(81.25), 81.3);
        assert_eq!(round_to_tenth(66.666), 66.7);
        assert_eq!(round_to_tenth(100.0), 100.0);
        assert_eq!(round_to_tenth(0.04), 0.0);
    }

    #[test]
    fn formats_scores() {
        assert_eq!(format_score(8.0), "8");
        assert_eq!(format_score(4.5), "4.5");
        assert_eq!(format_score(0.0), "0");
    }

    #[test]
    fn generated_label() {
        let time = Utc.ymd(2024, 3, 7).and_hms(9, 30, 0);
        assert_eq!(generated_on(time), "Generated 7 Mar 2024");
    }
}
