pub mod case;
pub mod department;
pub mod employee;
pub mod employment_record;
pub mod role;
pub mod user;

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sqlx::any::{Any, AnyRow};
use sqlx::{Decode, Row, Type, ValueRef};

// Timestamps are persisted as epoch milliseconds and enums as their
// SCREAMING_SNAKE_CASE names, so every model decodes through these helpers.

fn decode_error(column: &str, message: String) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: message.into(),
    }
}

pub(crate) fn millis_to_utc(column: &str, millis: i64) -> Result<DateTime<Utc>, sqlx::Error> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| decode_error(column, format!("timestamp out of range: {millis}")))
}

pub(crate) fn get_timestamp(row: &AnyRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let millis: i64 = row.try_get(column)?;
    millis_to_utc(column, millis)
}

/// Nullable column. The `Any` driver will not decode NULL into `Option<T>`,
/// so NULL is detected on the raw value first.
pub(crate) fn get_opt<'r, T>(row: &'r AnyRow, column: &str) -> Result<Option<T>, sqlx::Error>
where
    T: Decode<'r, Any> + Type<Any>,
{
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    row.try_get::<T, _>(column).map(Some)
}

pub(crate) fn get_opt_timestamp(
    row: &AnyRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let millis: Option<i64> = get_opt(row, column)?;
    millis.map(|m| millis_to_utc(column, m)).transpose()
}

pub(crate) fn get_opt_date(row: &AnyRow, column: &str) -> Result<Option<NaiveDate>, sqlx::Error> {
    let raw: Option<String> = get_opt(row, column)?;
    raw.map(|s| {
        NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| decode_error(column, format!("invalid date {s:?}: {e}")))
    })
    .transpose()
}

pub(crate) fn get_enum<T>(row: &AnyRow, column: &str) -> Result<T, sqlx::Error>
where
    T: FromStr<Err = strum::ParseError>,
{
    let raw: String = row.try_get(column)?;
    raw.parse::<T>()
        .map_err(|e| decode_error(column, format!("{raw:?}: {e}")))
}
