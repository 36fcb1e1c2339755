//! Date Package
//!
//! Functions: now, parse, today, addDays, diffDays. `now` and `parse`
//! are additionally registered under the qualified `Date.*` names.
//!
//! Dates travel as epoch milliseconds (numbers) or ISO-8601 strings;
//! `addDays` keeps the `YYYY-MM-DD` shape when given one.

use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, Utc};

use crate::functions::{ArgKind, Category, FunctionRegistry, SafeFunction};
use crate::values::Value;

fn date_now(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::Number(Utc::now().timestamp_millis() as f64))
}

fn date_today(_args: &[Value]) -> Result<Value, String> {
    Ok(Value::str(Utc::now().format("%Y-%m-%d").to_string()))
}

/// Accept epoch milliseconds, `YYYY-MM-DD`, or an RFC 3339 timestamp.
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(ms) if ms.is_finite() => DateTime::from_timestamp_millis(*ms as i64),
        Value::Str(s) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
            }
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        }
        _ => None,
    }
}

/// Epoch milliseconds of the parsed input, NaN when unparseable.
fn date_parse(args: &[Value]) -> Result<Value, String> {
    Ok(match parse_timestamp(&args[0]) {
        Some(dt) => Value::Number(dt.timestamp_millis() as f64),
        None => Value::Number(f64::NAN),
    })
}

/// `addDays(date, days)`: date-only strings stay date-only strings,
/// timestamps stay timestamps, numbers stay epoch milliseconds.
fn date_add_days(args: &[Value]) -> Result<Value, String> {
    let days = args[1].to_number();
    if days.is_nan() {
        return Err("day count is not a number".to_string());
    }
    let shifted = parse_timestamp(&args[0])
        .ok_or_else(|| format!("cannot parse date from {}", args[0].kind_name()))?
        + Duration::milliseconds((days * 86_400_000.0) as i64);

    Ok(match &args[0] {
        Value::Number(_) => Value::Number(shifted.timestamp_millis() as f64),
        Value::Str(s) if NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").is_ok() => {
            Value::str(shifted.format("%Y-%m-%d").to_string())
        }
        _ => Value::str(shifted.to_rfc3339_opts(SecondsFormat::Millis, true)),
    })
}

/// Whole days between two dates, truncated toward zero.
fn date_diff_days(args: &[Value]) -> Result<Value, String> {
    let a = parse_timestamp(&args[0])
        .ok_or_else(|| format!("cannot parse date from {}", args[0].kind_name()))?;
    let b = parse_timestamp(&args[1])
        .ok_or_else(|| format!("cannot parse date from {}", args[1].kind_name()))?;
    Ok(Value::Number((a - b).num_days() as f64))
}

pub fn install(registry: &mut FunctionRegistry) {
    for name in ["now", "Date.now"] {
        registry.register(
            SafeFunction::new(name, Category::Date, 0, date_now)
                .with_max(0)
                .with_description("Current time as epoch milliseconds"),
        );
    }
    for name in ["parse", "Date.parse"] {
        registry.register(
            SafeFunction::new(name, Category::Date, 1, date_parse)
                .with_max(1)
                .with_description("Epoch milliseconds of a date string, NaN when unparseable"),
        );
    }
    registry.register(
        SafeFunction::new("today", Category::Date, 0, date_today)
            .with_max(0)
            .with_description("Today's date as YYYY-MM-DD"),
    );
    registry.register(
        SafeFunction::new("addDays", Category::Date, 2, date_add_days)
            .with_max(2)
            .with_checks(&[ArgKind::Any, ArgKind::Number])
            .with_description("Shift a date by a number of days"),
    );
    registry.register(
        SafeFunction::new("diffDays", Category::Date, 2, date_diff_days)
            .with_max(2)
            .with_description("Whole days between two dates"),
    );
}
