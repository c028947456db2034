//! Text normalisation shared by the parsers: chapter numbers and dates.
//!
//! Chapter numbering is best effort. Labels that carry no number borrow the
//! number of the chapter listed after them plus one half, which places
//! unnumbered extras between two numbered chapters.
//!
//! Dates are parsed leniently. Text that is not a date yields `None`, which the
//! records carry as-is instead of failing the whole page.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

static LEADING_CHAPTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^第(\d+)").expect("valid chapter regex"));

static FRENCH_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d{1,2})\s+([a-zéèûô]+)\.?\s+(\d{4})$").expect("valid french date regex")
});

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%Y年%m月%d日",
    "%d/%m/%Y",
    "%d %b. %Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

/// Chapter number at the start of a `第N…` label.
///
/// ```rust
/// use hondana::text::leading_chapter_number;
///
/// assert_eq!(leading_chapter_number("第12章"), Some(12.0));
/// assert_eq!(leading_chapter_number("番外篇"), None);
/// ```
pub fn leading_chapter_number(label: &str) -> Option<f64> {
    LEADING_CHAPTER
        .captures(label.trim())
        .and_then(|caps| caps[1].parse().ok())
}

/// Number in the last word of a label such as `"One Piece 1012"`.
///
/// ```rust
/// use hondana::text::trailing_number;
///
/// assert_eq!(trailing_number("One Piece 1012.5"), Some(1012.5));
/// assert_eq!(trailing_number("One Piece Oneshot"), None);
/// ```
pub fn trailing_number(label: &str) -> Option<f64> {
    label
        .split_whitespace()
        .last()
        .and_then(|word| word.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

/// Fills in numbers for chapters whose label had none.
///
/// `parsed` holds the number read from each label in list order. A missing or
/// zero number becomes the next entry's parsed number plus 0.5 (a missing next
/// number counts as 0). The last entry has no neighbour and falls back to 0.
///
/// ```rust
/// use hondana::text::interpolate_chapter_numbers;
///
/// let numbers = interpolate_chapter_numbers(&[Some(13.0), None, Some(12.0), None]);
/// assert_eq!(numbers, vec![13.0, 12.5, 12.0, 0.0]);
/// ```
pub fn interpolate_chapter_numbers(parsed: &[Option<f64>]) -> Vec<f64> {
    parsed
        .iter()
        .enumerate()
        .map(|(i, number)| match number {
            Some(n) if *n != 0.0 => *n,
            _ => match parsed.get(i + 1) {
                Some(next) => next.unwrap_or(0.0) + 0.5,
                None => 0.0,
            },
        })
        .collect()
}

fn french_month(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.trim_end_matches('.') {
        "janv" | "janvier" => 1,
        "févr" | "fevr" | "février" | "fevrier" => 2,
        "mars" => 3,
        "avr" | "avril" => 4,
        "mai" => 5,
        "juin" => 6,
        "juil" | "juillet" => 7,
        "août" | "aout" => 8,
        "sept" | "septembre" => 9,
        "oct" | "octobre" => 10,
        "nov" | "novembre" => 11,
        "déc" | "dec" | "décembre" | "decembre" => 12,
        _ => return None,
    };
    Some(month)
}

fn parse_french_date(text: &str) -> Option<NaiveDate> {
    let caps = FRENCH_DATE.captures(text)?;
    let day = caps[1].parse().ok()?;
    let month = french_month(&caps[2])?;
    let year = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parses the date formats the supported sites print.
///
/// Times without a zone are taken as UTC. Returns `None` for anything else.
///
/// ```rust
/// use hondana::text::parse_date;
///
/// assert!(parse_date("2021-01-23").is_some());
/// assert!(parse_date("08 juin 2021").is_some());
/// assert!(parse_date("08 Jun. 2021").is_some());
/// assert!(parse_date("soon").is_none());
/// ```
pub fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(Utc.from_utc_datetime(&dt));
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .or_else(|| parse_french_date(text))
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

/// Converts a listing timestamp that may be relative ("Hier") into a time.
///
/// `Hier` / `Yesterday` is one day before `now`, a parseable date is that
/// date, and anything else ("Aujourd'hui", "il y a 3 heures") is treated as
/// `now`.
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use hondana::text::relative_date;
///
/// let now = Utc::now();
/// assert_eq!(relative_date("Hier", now), now - Duration::days(1));
/// assert_eq!(relative_date("Aujourd'hui", now), now);
/// ```
pub fn relative_date(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    let lowered = text.trim().to_lowercase();
    if lowered.contains("hier") || lowered.contains("yesterday") {
        now - Duration::days(1)
    } else {
        parse_date(text).unwrap_or(now)
    }
}

/// Keeps a listing time from lying in the future.
///
/// Some listings print the upload time in the site's zone, which can be
/// ahead of ours. Such times become one minute before `now`.
pub fn clamp_to_past(time: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    if time > now {
        now - Duration::minutes(1)
    } else {
        time
    }
}

/// Short display form used in tile annotations, e.g. `Sat Jan 23 2021`.
pub fn date_string(time: &DateTime<Utc>) -> String {
    time.format("%a %b %d %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_leading_number_needs_prefix() {
        assert_eq!(leading_chapter_number(" 第7话 重逢"), Some(7.0));
        assert_eq!(leading_chapter_number("最终话 第8话"), None);
    }

    #[test]
    fn test_interpolation_uses_next_entry() {
        assert_eq!(
            interpolate_chapter_numbers(&[Some(2.0), None, None, Some(1.0)]),
            vec![2.0, 0.5, 1.5, 1.0]
        );
        assert_eq!(interpolate_chapter_numbers(&[None]), vec![0.0]);
        assert!(interpolate_chapter_numbers(&[]).is_empty());
    }

    #[test]
    fn test_zero_counts_as_missing() {
        assert_eq!(
            interpolate_chapter_numbers(&[Some(0.0), Some(4.0)]),
            vec![4.5, 4.0]
        );
    }

    #[test]
    fn test_parse_date_formats() {
        let date = parse_date("2021年01月23日").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2021, 1, 23));

        let date = parse_date("2021-01-23 10:30:00").unwrap();
        assert_eq!(date.format("%H:%M").to_string(), "10:30");

        let date = parse_date("1 déc. 2020").unwrap();
        assert_eq!((date.year(), date.month(), date.day()), (2020, 12, 1));

        assert!(parse_date("").is_none());
        assert!(parse_date("31/02/2021").is_none());
    }

    #[test]
    fn test_relative_date_parses_absolute_dates() {
        let now = Utc::now();
        let date = relative_date("15/03/2021", now);
        assert_eq!((date.year(), date.month(), date.day()), (2021, 3, 15));
    }

    #[test]
    fn test_clamp_to_past() {
        let now = Utc::now();
        let future = now + Duration::hours(3);
        assert_eq!(clamp_to_past(future, now), now - Duration::minutes(1));
        let past = now - Duration::hours(3);
        assert_eq!(clamp_to_past(past, now), past);
    }

    #[test]
    fn test_date_string() {
        let date = parse_date("2021-01-23").unwrap();
        assert_eq!(date_string(&date), "Sat Jan 23 2021");
    }
}
