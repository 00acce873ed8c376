//! Date formatting helpers.

use chrono::{DateTime, Datelike, TimeZone};

// Stand-in for the "Do" token while the rest of the format string goes
// through strftime, which has no ordinal-day specifier.
const ORDINAL_SLOT: char = '\u{E000}';

/// Formats a date using a Moment.js-style format string, the notation
/// site configs carry over from the JavaScript blog world. The default
/// card format is `MMM Do YYYY`, e.g. "Jan 1st 2019".
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let format = format.replace("Do", &ORDINAL_SLOT.to_string());
    let chrono_format = moment_to_chrono_format(&format);
    date.format(&chrono_format)
        .to_string()
        .replace(ORDINAL_SLOT, &ordinal_day(date.day()))
}

/// RFC 3339 form used in Atom feeds and `<time datetime>` attributes.
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// "1st", "2nd", "3rd", "4th" ... with the 11th-13th exception.
fn ordinal_day(day: u32) -> String {
    let suffix = match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    };
    format!("{}{}", day, suffix)
}

/// Converts a Moment.js format string to chrono's. Longest tokens
/// first so `MMMM` is not eaten by `MM`.
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("D", "%-d"),
        ("HH", "%H"),
        ("hh", "%I"),
        ("mm", "%M"),
        ("ss", "%S"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();
    for (from, to) in replacements {
        result = result.replace(from, to);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_format_date() {
        let date = Local.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(format_date(&date, "YYYY-MM-DD"), "2024-01-15");
        assert_eq!(format_date(&date, "MMMM D, YYYY"), "January 15, 2024");
    }

    #[test]
    fn test_card_format() {
        let date = Local.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_date(&date, "MMM Do YYYY"), "Jan 1st 2019");
    }

    #[test]
    fn test_ordinal_suffixes() {
        for (day, expected) in [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (30, "30th"),
        ] {
            assert_eq!(ordinal_day(day), expected);
        }
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }
}
