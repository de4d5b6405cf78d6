//! Date resolution for the history table's rendered date text.
//!
//! The site renders `"Sat 06 Sep 21:03"`: weekday, day, month abbreviation
//! and a 24-hour time, with no year. Older rows and odd locales produce a
//! handful of other shapes. Resolution is an ordered list of pure parse
//! attempts; the first one yielding a plausible timestamp wins. The fallback
//! instant is the caller-supplied `now`, which keeps the function
//! deterministic under test.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};

/// Resolve raw date text to a timestamp, falling back to `now`.
pub fn resolve(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    try_resolve(text, now).unwrap_or(now)
}

/// Resolve raw date text, or `None` when no interpretation succeeds.
pub fn try_resolve(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Some(dt) = parse_site_format(text, now) {
        return Some(dt);
    }

    // Fallback chain: textual rewrites tried in order. A candidate only
    // counts when it parses to a year after 2000.
    let candidates = [
        Some(text.to_string()),
        canonicalize_ymd(text),
        strip_relative_words(text),
        rewrite_separated(text, b'/'),
        rewrite_separated(text, b'-'),
    ];

    for candidate in candidates.into_iter().flatten() {
        if let Some(dt) = parse_general(&candidate) {
            if dt.year() > 2000 {
                return Some(dt);
            }
        }
    }

    None
}

/// Parse an RFC 3339 capture timestamp, degrading to `now` if malformed.
pub fn parse_recorded_at(text: &str, now: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(text)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or(now)
}

/// `"Sat 06 Sep 21:03"` — the page omits the year. Assume the current one
/// and roll back a year when the composed instant lands in the future.
fn parse_site_format(text: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let &[weekday, day, month, time] = tokens.as_slice() else {
        return None;
    };

    if weekday.len() != 3 || !weekday.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    if day.len() > 2 {
        return None;
    }
    let day: u32 = day.parse().ok()?;
    let month = month_number(month)?;

    let (hh, mm) = time.split_once(':')?;
    if hh.len() > 2 || mm.len() != 2 {
        return None;
    }
    let hour: u32 = hh.parse().ok()?;
    let minute: u32 = mm.parse().ok()?;

    let compose = |year: i32| {
        NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(hour, minute, 0))
    };

    let dt = compose(now.year())?.and_utc();
    if dt > now {
        Some(compose(now.year() - 1)?.and_utc())
    } else {
        Some(dt)
    }
}

/// The site's English month abbreviations, exactly as rendered.
fn month_number(abbr: &str) -> Option<u32> {
    let n = match abbr {
        "Jan" => 1,
        "Feb" => 2,
        "Mar" => 3,
        "Apr" => 4,
        "May" => 5,
        "Jun" => 6,
        "Jul" => 7,
        "Aug" => 8,
        "Sep" => 9,
        "Oct" => 10,
        "Nov" => 11,
        "Dec" => 12,
        _ => return None,
    };
    Some(n)
}

/// Formats accepted as "general" date-time text, tried in order.
fn parse_general(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d %b %Y %H:%M",
        "%b %d, %Y %H:%M",
    ];
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
            return Some(dt.and_utc());
        }
    }

    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b %Y", "%b %d, %Y", "%B %d, %Y"];
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
            return d.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
        }
    }

    None
}

fn digits(bytes: &[u8], at: usize, count: usize) -> bool {
    at + count <= bytes.len() && bytes[at..at + count].iter().all(u8::is_ascii_digit)
}

/// Rewrite the first embedded `YYYY?MM?DD` digit group (`/`, `.` or space
/// separators) to `YYYY-MM-DD`, leaving the surrounding text alone.
fn canonicalize_ymd(text: &str) -> Option<String> {
    let b = text.as_bytes();
    if b.len() < 10 {
        return None;
    }

    for i in 0..=b.len() - 10 {
        let sep = b[i + 4];
        if !matches!(sep, b'/' | b'.' | b' ') || b[i + 7] != sep {
            continue;
        }
        if !(digits(b, i, 4) && digits(b, i + 5, 2) && digits(b, i + 8, 2)) {
            continue;
        }
        // Digit boundaries on both sides, so "12024-09-06" is left alone.
        if i > 0 && b[i - 1].is_ascii_digit() {
            continue;
        }
        if i + 10 < b.len() && b[i + 10].is_ascii_digit() {
            continue;
        }
        return Some(format!(
            "{}{}-{}-{}{}",
            &text[..i],
            &text[i..i + 4],
            &text[i + 5..i + 7],
            &text[i + 8..i + 10],
            &text[i + 10..],
        ));
    }
    None
}

/// Strip the words of relative-date phrasing ("2 days ago"). Purely textual
/// salvage, no offset arithmetic.
fn strip_relative_words(text: &str) -> Option<String> {
    let mut out = text.to_string();
    for word in ["ago", "day", "week", "month", "year"] {
        out = remove_ascii_ci(&out, word);
    }
    (out != text).then_some(out)
}

/// Remove every ASCII case-insensitive occurrence of `needle`.
fn remove_ascii_ci(haystack: &str, needle: &str) -> String {
    let lower = haystack.to_ascii_lowercase();
    let mut out = String::with_capacity(haystack.len());
    let mut i = 0;
    while i < haystack.len() {
        if lower[i..].starts_with(needle) {
            i += needle.len();
        } else {
            let ch = haystack[i..].chars().next().expect("index on char boundary");
            out.push(ch);
            i += ch.len_utf8();
        }
    }
    out
}

/// Rewrite `D<sep>M<sep>YYYY` to `YYYY-MM-DD` (day and month may be one or
/// two digits). Handles the slash and hyphen day-first shapes.
fn rewrite_separated(text: &str, sep: u8) -> Option<String> {
    let b = text.as_bytes();

    for i in 0..b.len() {
        for dlen in [2usize, 1] {
            for mlen in [2usize, 1] {
                let m_at = i + dlen + 1;
                let y_at = m_at + mlen + 1;
                let end = y_at + 4;
                if end > b.len() {
                    continue;
                }
                if !(digits(b, i, dlen)
                    && b[i + dlen] == sep
                    && digits(b, m_at, mlen)
                    && b[m_at + mlen] == sep
                    && digits(b, y_at, 4))
                {
                    continue;
                }
                if end < b.len() && b[end].is_ascii_digit() {
                    continue;
                }
                let day: u32 = text[i..i + dlen].parse().ok()?;
                let month: u32 = text[m_at..m_at + mlen].parse().ok()?;
                let year = &text[y_at..end];
                return Some(format!(
                    "{}{}-{:02}-{:02}{}",
                    &text[..i],
                    year,
                    month,
                    day,
                    &text[end..],
                ));
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_site_format_current_year() {
        let now = at(2025, 10, 1, 12, 0);
        let dt = try_resolve("Sat 06 Sep 21:03", now).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2025, 9, 6));
        assert_eq!((dt.hour(), dt.minute()), (21, 3));
    }

    #[test]
    fn test_site_format_rolls_back_across_year_boundary() {
        // Captured in January; a September date must mean last year.
        let now = at(2026, 1, 10, 8, 0);
        let dt = try_resolve("Sat 06 Sep 21:03", now).unwrap();
        assert_eq!(dt.year(), 2025);
        assert_eq!(dt.month(), 9);
    }

    #[test]
    fn test_iso_fallback() {
        let now = at(2025, 10, 1, 12, 0);
        let dt = try_resolve("2024-03-15 18:30", now).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 15));
    }

    #[test]
    fn test_slash_day_first() {
        let now = at(2025, 10, 1, 12, 0);
        let dt = try_resolve("6/9/2024", now).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 9, 6));
    }

    #[test]
    fn test_hyphen_day_first() {
        let now = at(2025, 10, 1, 12, 0);
        let dt = try_resolve("15-03-2024", now).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 3, 15));
    }

    #[test]
    fn test_slash_ymd_canonicalized() {
        let now = at(2025, 10, 1, 12, 0);
        let dt = try_resolve("2024/09/06 21:03", now).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 9, 6));
    }

    #[test]
    fn test_year_2000_cutoff() {
        let now = at(2025, 10, 1, 12, 0);
        assert!(try_resolve("1999-05-05", now).is_none());
    }

    #[test]
    fn test_garbage_and_empty_fail() {
        let now = at(2025, 10, 1, 12, 0);
        assert!(try_resolve("", now).is_none());
        assert!(try_resolve("soon", now).is_none());
        assert_eq!(resolve("soon", now), now);
    }

    #[test]
    fn test_relative_phrase_does_not_compute_offsets() {
        // "2 days ago" strips to digits and whitespace, which is not a date.
        let now = at(2025, 10, 1, 12, 0);
        assert!(try_resolve("2 days ago", now).is_none());
    }

    #[test]
    fn test_recorded_at_roundtrip() {
        let now = at(2025, 10, 1, 12, 0);
        let ts = at(2025, 9, 6, 21, 3);
        assert_eq!(parse_recorded_at(&ts.to_rfc3339(), now), ts);
        assert_eq!(parse_recorded_at("not a timestamp", now), now);
    }
}
