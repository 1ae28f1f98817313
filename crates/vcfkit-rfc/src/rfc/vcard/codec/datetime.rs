//! vCard DATE, TIME, DATE-TIME and TIMESTAMP values.
//!
//! Values without a year are stored with the sentinel year 4, the first
//! leap year of the proleptic calendar, so that `--0229` is a valid date.
//! Time-only values are stored on 0001-01-01.

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Timelike, Utc};

use crate::rfc::vcard::core::VCardVersion;

/// Year substituted for values that omit the year.
pub const SENTINEL_LEAP_YEAR: i32 = 4;

/// Year used for time-only values.
const TIME_ONLY_YEAR: i32 = 1;

/// Accepted forms, tried in order; the first exact match wins.
///
/// `zz` is `±HH`, `zzz` is `±HH:mm` or `±HHmm`. A trailing `Z` is handled
/// before matching.
const GRAMMAR: &[&str] = &[
    "yyyyMMdd",
    "yyyy",
    "yyyy-MM",
    "yyyy-MM-dd",
    "yyyy-MM-ddTHH:mm:ss",
    "yyyy-MM-ddTHH:mm:sszzz",
    "yyyy-MM-ddTHH:mm:sszz",
    "yyyyMMddTHH",
    "yyyyMMddTHHmm",
    "yyyyMMddTHHmmss",
    "yyyyMMddTHHzz",
    "yyyyMMddTHHzzz",
    "yyyyMMddTHHmmzz",
    "yyyyMMddTHHmmzzz",
    "yyyyMMddTHHmmsszz",
    "yyyyMMddTHHmmsszzz",
    "THH",
    "THHmm",
    "THHmmss",
    "THHzz",
    "THHzzz",
    "THHmmzz",
    "THHmmzzz",
    "THHmmsszz",
    "THHmmsszzz",
    "T-mmss",
    "T-mmsszz",
    "T-mmsszzz",
    "T--ss",
    "T--sszz",
    "T--sszzz",
];

/// What a formatted value represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    /// Date only; the time of day is ignored.
    Date,
    /// Date and, if the time of day is not midnight, time and offset.
    DateTime,
    /// Always converted to UTC and written with `Z` (REV).
    Timestamp,
}

#[derive(Debug, Default)]
struct Fields {
    year: Option<i32>,
    month: Option<u32>,
    day: Option<u32>,
    hour: u32,
    minute: u32,
    second: u32,
    offset_seconds: Option<i32>,
}

/// Parses a vCard date and/or time.
///
/// Returns `None` when no form of the grammar matches exactly. Without an
/// offset the value is local time; a trailing `Z` means UTC.
#[must_use]
pub fn try_parse(text: &str) -> Option<DateTime<FixedOffset>> {
    let mut s = text.trim();

    let utc = match s.strip_suffix(['Z', 'z']) {
        Some(rest) => {
            s = rest;
            true
        }
        None => false,
    };

    let normalized = if let Some(day) = s.strip_prefix("---") {
        format!("{SENTINEL_LEAP_YEAR:04}01{day}")
    } else if let Some(rest) = s.strip_prefix("--") {
        if rest.len() == 2 || rest.as_bytes().get(2) == Some(&b'-') {
            // `--MM` and `--MM-dd` take the extended layout.
            format!("{SENTINEL_LEAP_YEAR:04}-{rest}")
        } else {
            format!("{SENTINEL_LEAP_YEAR:04}{rest}")
        }
    } else {
        s.to_string()
    };

    let fields = GRAMMAR
        .iter()
        .find_map(|pattern| match_pattern(pattern, &normalized))?;

    let date = NaiveDate::from_ymd_opt(
        fields.year.unwrap_or(TIME_ONLY_YEAR),
        fields.month.unwrap_or(1),
        fields.day.unwrap_or(1),
    )?;
    let time = NaiveTime::from_hms_opt(fields.hour, fields.minute, fields.second)?;
    let naive = NaiveDateTime::new(date, time);

    let offset = match fields.offset_seconds {
        Some(seconds) => FixedOffset::east_opt(seconds)?,
        None if utc => Utc.fix(),
        None => local_offset(&naive),
    };

    offset.from_local_datetime(&naive).single()
}

/// Offset of local time at `naive`. Sentinel dates use today's offset.
fn local_offset(naive: &NaiveDateTime) -> FixedOffset {
    if naive.year() <= SENTINEL_LEAP_YEAR {
        return Local::now().offset().fix();
    }
    Local
        .from_local_datetime(naive)
        .earliest()
        .map_or_else(|| Local::now().offset().fix(), |dt| dt.offset().fix())
}

/// Matches `input` against one grammar form.
fn match_pattern(pattern: &str, input: &str) -> Option<Fields> {
    let mut fields = Fields::default();
    let mut p = pattern;
    let mut s = input;

    while !p.is_empty() {
        if let Some(rest) = p.strip_prefix("yyyy") {
            fields.year = Some(i32::try_from(take_digits(&mut s, 4)?).ok()?);
            p = rest;
        } else if let Some(rest) = p.strip_prefix("MM") {
            fields.month = Some(take_digits(&mut s, 2)?);
            p = rest;
        } else if let Some(rest) = p.strip_prefix("dd") {
            fields.day = Some(take_digits(&mut s, 2)?);
            p = rest;
        } else if let Some(rest) = p.strip_prefix("HH") {
            fields.hour = take_digits(&mut s, 2)?;
            p = rest;
        } else if let Some(rest) = p.strip_prefix("mm") {
            fields.minute = take_digits(&mut s, 2)?;
            p = rest;
        } else if let Some(rest) = p.strip_prefix("ss") {
            fields.second = take_digits(&mut s, 2)?;
            p = rest;
        } else if let Some(rest) = p.strip_prefix("zzz") {
            fields.offset_seconds = Some(take_offset(&mut s, true)?);
            p = rest;
        } else if let Some(rest) = p.strip_prefix("zz") {
            fields.offset_seconds = Some(take_offset(&mut s, false)?);
            p = rest;
        } else {
            let expected = p.chars().next()?;
            let found = s.chars().next()?;
            if !expected.eq_ignore_ascii_case(&found) {
                return None;
            }
            p = &p[expected.len_utf8()..];
            s = &s[found.len_utf8()..];
        }
    }

    s.is_empty().then_some(fields)
}

fn take_digits(s: &mut &str, count: usize) -> Option<u32> {
    let digits = s.get(..count)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    *s = &s[count..];
    digits.parse().ok()
}

fn take_offset(s: &mut &str, with_minutes: bool) -> Option<i32> {
    let sign = match s.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    *s = &s[1..];

    let hours = take_digits(s, 2)?;
    let minutes = if with_minutes {
        if let Some(rest) = s.strip_prefix(':') {
            *s = rest;
        }
        take_digits(s, 2)?
    } else {
        0
    };

    if hours > 23 || minutes > 59 {
        return None;
    }
    let seconds = i32::try_from(hours * 3600 + minutes * 60).ok()?;
    Some(sign * seconds)
}

/// Returns whether the time of day is not midnight.
#[must_use]
pub fn has_time_component(dt: &DateTime<FixedOffset>) -> bool {
    dt.time() != NaiveTime::MIN
}

/// Formats a value for `version`.
///
/// 2.1 and 3.0 use extended forms (`yyyy-MM-dd`, `HH:mm:ss`), 4.0 basic
/// forms. A year up to the sentinel is written as `--MM-dd` (`--MMdd`).
/// Offsets are written as a sign and the absolute hours and minutes, so
/// `-00:30` keeps its `-`.
#[must_use]
pub fn format(dt: &DateTime<FixedOffset>, version: VCardVersion, kind: DateKind) -> String {
    let extended = version < VCardVersion::V4_0;

    if kind == DateKind::Timestamp {
        let utc = dt.with_timezone(&Utc);
        return if extended {
            format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
                utc.year(),
                utc.month(),
                utc.day(),
                utc.hour(),
                utc.minute(),
                utc.second()
            )
        } else {
            format!(
                "{:04}{:02}{:02}T{:02}{:02}{:02}Z",
                utc.year(),
                utc.month(),
                utc.day(),
                utc.hour(),
                utc.minute(),
                utc.second()
            )
        };
    }

    let time_only = kind == DateKind::DateTime && dt.year() == TIME_ONLY_YEAR;
    let mut out = String::with_capacity(25);

    if !time_only {
        match (dt.year() > SENTINEL_LEAP_YEAR, extended) {
            (true, true) => out.push_str(&format!("{:04}-{:02}-{:02}", dt.year(), dt.month(), dt.day())),
            (true, false) => out.push_str(&format!("{:04}{:02}{:02}", dt.year(), dt.month(), dt.day())),
            (false, true) => out.push_str(&format!("--{:02}-{:02}", dt.month(), dt.day())),
            (false, false) => out.push_str(&format!("--{:02}{:02}", dt.month(), dt.day())),
        }
    }

    if kind == DateKind::Date || !(time_only || has_time_component(dt)) {
        return out;
    }

    if extended {
        out.push_str(&format!("T{:02}:{:02}:{:02}", dt.hour(), dt.minute(), dt.second()));
    } else {
        out.push_str(&format!("T{:02}{:02}{:02}", dt.hour(), dt.minute(), dt.second()));
    }

    let offset = dt.offset().local_minus_utc();
    if offset == 0 {
        out.push('Z');
    } else {
        let sign = if offset < 0 { "-" } else { "+" };
        let hours = offset.abs() / 3600;
        let minutes = offset.abs() % 3600 / 60;
        if extended {
            out.push_str(&format!("{sign}{hours:02}:{minutes:02}"));
        } else {
            out.push_str(&format!("{sign}{hours:02}{minutes:02}"));
        }
    }

    out
}
