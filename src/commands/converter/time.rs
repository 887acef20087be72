//! Time span converter.

use super::{ConvertContext, Converted, Converter};
use crate::error::ConvertError;
use chrono::TimeDelta;

/// `TimeDelta` from `[-][d.]hh:mm[:ss[.fffffff]]`, or a bare number of days.
pub struct TimeSpanConverter;

impl Converter for TimeSpanConverter {
    fn convert<'t>(
        &self,
        text: &'t str,
        cx: &ConvertContext<'_>,
    ) -> Result<Converted<'t>, ConvertError> {
        let (token, remaining) = cx.tokenizer.next_token(text).ok_or(ConvertError::Empty)?;
        let span =
            parse_time_span(token).map_err(|reason| ConvertError::parse("time span", token, reason))?;
        Ok(Converted::new(span, token, remaining))
    }
}

/// Parse a time span literal.
///
/// ```
/// use chrono::TimeDelta;
/// use relaybot::commands::converter::parse_time_span;
///
/// assert_eq!(parse_time_span("1:30").unwrap(), TimeDelta::minutes(90));
/// assert_eq!(parse_time_span("2.00:00:05").unwrap(), TimeDelta::days(2) + TimeDelta::seconds(5));
/// assert_eq!(parse_time_span("3").unwrap(), TimeDelta::days(3));
/// assert!(parse_time_span("24:00").is_err());
/// ```
pub fn parse_time_span(text: &str) -> Result<TimeDelta, String> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, text),
    };
    if body.is_empty() {
        return Err("empty time span".into());
    }

    let span = if body.contains(':') {
        parse_clock(body)?
    } else {
        let days = parse_component(body, "days", None)?;
        TimeDelta::try_days(days).ok_or("day count out of range")?
    };

    Ok(if negative { -span } else { span })
}

fn parse_clock(body: &str) -> Result<TimeDelta, String> {
    let parts: Vec<&str> = body.split(':').collect();
    if parts.len() > 3 {
        return Err("too many `:` separated fields".into());
    }

    let (days, hours) = match parts[0].split_once('.') {
        Some((d, h)) => (parse_component(d, "days", None)?, h),
        None => (0, parts[0]),
    };
    let hours = parse_component(hours, "hours", Some(23))?;
    let minutes = parse_component(parts[1], "minutes", Some(59))?;

    let (seconds, nanos) = match parts.get(2) {
        Some(field) => match field.split_once('.') {
            Some((s, fraction)) => (
                parse_component(s, "seconds", Some(59))?,
                parse_fraction(fraction)?,
            ),
            None => (parse_component(field, "seconds", Some(59))?, 0),
        },
        None => (0, 0),
    };

    let clock = TimeDelta::hours(hours)
        + TimeDelta::minutes(minutes)
        + TimeDelta::seconds(seconds)
        + TimeDelta::nanoseconds(nanos);
    TimeDelta::try_days(days)
        .and_then(|d| d.checked_add(&clock))
        .ok_or_else(|| "time span out of range".to_string())
}

fn parse_component(field: &str, what: &str, max: Option<i64>) -> Result<i64, String> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid {what} `{field}`"));
    }
    let value: i64 = field
        .parse()
        .map_err(|_| format!("{what} `{field}` out of range"))?;
    match max {
        Some(max) if value > max => Err(format!("{what} must be at most {max}")),
        _ => Ok(value),
    }
}

/// Up to seven fractional digits (100ns ticks), scaled to nanoseconds.
fn parse_fraction(fraction: &str) -> Result<i64, String> {
    if fraction.is_empty() || fraction.len() > 7 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("invalid fraction `{fraction}`"));
    }
    let digits: i64 = fraction
        .parse()
        .map_err(|_| format!("invalid fraction `{fraction}`"))?;
    Ok(digits * 10_i64.pow(9 - fraction.len() as u32))
}
