// Date and time conversions backed by chrono.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};

use super::{ConvertError, FromCapture};
use crate::value::CaptureValue;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d %B %Y", "%B %d, %Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
];

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

fn expect_str(value: CaptureValue, target: &'static str) -> Result<String, ConvertError> {
    match value {
        CaptureValue::Str(s) => Ok(s),
        other => Err(ConvertError::unsupported(other.type_name(), target)),
    }
}

fn parse_naive_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_naive_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

fn parse_fixed_offset(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s)
        .or_else(|_| DateTime::parse_from_rfc2822(s))
        .or_else(|_| DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f %z"))
        .ok()
}

impl FromCapture for NaiveDate {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        if value.is_nil() {
            return Ok(NaiveDate::default());
        }
        let s = expect_str(value, "NaiveDate")?;
        let t = s.trim();
        parse_naive_date(t)
            .or_else(|| parse_naive_datetime(t).map(|dt| dt.date()))
            .ok_or_else(|| ConvertError::invalid(&s, "NaiveDate"))
    }
}

impl FromCapture for NaiveDateTime {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        if value.is_nil() {
            return Ok(NaiveDateTime::default());
        }
        let s = expect_str(value, "NaiveDateTime")?;
        parse_naive_datetime(s.trim()).ok_or_else(|| ConvertError::invalid(&s, "NaiveDateTime"))
    }
}

impl FromCapture for NaiveTime {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        if value.is_nil() {
            return Ok(NaiveTime::MIN);
        }
        let s = expect_str(value, "NaiveTime")?;
        let t = s.trim();
        TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(t, fmt).ok())
            .ok_or_else(|| ConvertError::invalid(&s, "NaiveTime"))
    }
}

impl FromCapture for DateTime<FixedOffset> {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        if value.is_nil() {
            return Ok(DateTime::<FixedOffset>::default());
        }
        let s = expect_str(value, "DateTime<FixedOffset>")?;
        parse_fixed_offset(s.trim())
            .ok_or_else(|| ConvertError::invalid(&s, "DateTime<FixedOffset>"))
    }
}

impl FromCapture for DateTime<Utc> {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        const TARGET: &str = "DateTime<Utc>";
        match value {
            CaptureValue::Nil => Ok(DateTime::<Utc>::default()),
            // Unix seconds
            CaptureValue::Integer(secs) => DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| ConvertError::out_of_range(secs, TARGET)),
            CaptureValue::Str(s) => {
                let t = s.trim();
                parse_fixed_offset(t)
                    .map(|dt| dt.with_timezone(&Utc))
                    .or_else(|| parse_naive_datetime(t).map(|dt| dt.and_utc()))
                    .ok_or_else(|| ConvertError::invalid(&s, TARGET))
            }
            other => Err(ConvertError::unsupported(other.type_name(), TARGET)),
        }
    }
}

impl FromCapture for TimeDelta {
    fn from_capture(value: CaptureValue) -> Result<Self, ConvertError> {
        const TARGET: &str = "TimeDelta";
        match value {
            CaptureValue::Nil => Ok(TimeDelta::zero()),
            CaptureValue::Integer(secs) => TimeDelta::try_seconds(secs)
                .ok_or_else(|| ConvertError::out_of_range(secs, TARGET)),
            CaptureValue::Str(s) => {
                parse_time_delta(s.trim()).ok_or_else(|| ConvertError::invalid(&s, TARGET))
            }
            other => Err(ConvertError::unsupported(other.type_name(), TARGET)),
        }
    }
}

/// Parse `[-][d.]hh:mm[:ss[.fffffffff]]`, or a bare day count.
fn parse_time_delta(s: &str) -> Option<TimeDelta> {
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s),
    };
    if body.is_empty() {
        return None;
    }

    if !body.contains(':') {
        let days: i64 = body.parse().ok().filter(|d| *d >= 0)?;
        let delta = TimeDelta::try_days(days)?;
        return Some(if negative { -delta } else { delta });
    }

    let (days, clock) = match body.split_once('.') {
        Some((d, rest)) if rest.contains(':') && !d.contains(':') => {
            (d.parse::<i64>().ok().filter(|d| *d >= 0)?, rest)
        }
        _ => (0, body),
    };

    let mut parts = clock.split(':');
    let hours: i64 = parts.next()?.parse().ok()?;
    let minutes: i64 = parts.next()?.parse().ok()?;
    let (seconds, nanos) = match parts.next() {
        Some(sec) => parse_seconds(sec)?,
        None => (0, 0),
    };
    if parts.next().is_some() {
        return None;
    }
    // The sign only goes in front of the whole value
    if !(0..=23).contains(&hours)
        || !(0..=59).contains(&minutes)
        || !(0..=59).contains(&seconds)
    {
        return None;
    }

    let total = days
        .checked_mul(86_400)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)?;
    let delta = TimeDelta::try_seconds(total)?.checked_add(&TimeDelta::nanoseconds(nanos))?;
    Some(if negative { -delta } else { delta })
}

fn parse_seconds(sec: &str) -> Option<(i64, i64)> {
    match sec.split_once('.') {
        Some((whole, frac)) => {
            if frac.is_empty() || frac.len() > 9 || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let scale = 10i64.pow(9 - frac.len() as u32);
            Some((whole.parse().ok()?, frac.parse::<i64>().ok()? * scale))
        }
        None => Some((sec.parse().ok()?, 0)),
    }
}
