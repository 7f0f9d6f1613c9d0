use chrono::{Days, NaiveDate};
use std::collections::HashMap;
use tera::{try_get_value, Value};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Shifts a `YYYY-MM-DD` date by a signed number of days.
///
/// Returns `None` when `date` is not a valid date or the result falls outside
/// the supported calendar range.
pub fn add_days(date: &str, days: i64) -> Option<String> {
    let date = NaiveDate::parse_from_str(date, DATE_FORMAT).ok()?;
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    }?;
    Some(shifted.format(DATE_FORMAT).to_string())
}

/// Tera filter: `{{ invoice.date | add_days(days=14) }}`.
pub fn add_days_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let date = try_get_value!("add_days", "value", String, value);
    let days = match args.get("days") {
        Some(days) => try_get_value!("add_days", "days", i64, days),
        None => return Err(tera::Error::msg("Filter `add_days` expected an argument `days`")),
    };

    add_days(&date, days)
        .map(Value::String)
        .ok_or_else(|| tera::Error::msg(format!("Filter `add_days` cannot shift '{}' by {} days", date, days)))
}
