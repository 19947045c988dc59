//! Dynamic decoding of Postgres result columns into JSON scalars.
//!
//! Generated queries project arbitrary columns, so decoding dispatches on the
//! column's reported type name. A value that fails to decode becomes JSON
//! null rather than failing the whole row.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{Column, Row, TypeInfo};

/// Decode one column of a row into a JSON value.
#[must_use]
pub fn decode_column(row: &PgRow, idx: usize) -> Value {
    let type_name = row.columns().get(idx).map(|c| c.type_info().name().to_owned());
    match type_name.as_deref() {
        Some("BOOL") => get_as(row, idx, Value::Bool),
        Some("INT2") => get_as(row, idx, |v: i16| Value::from(v)),
        Some("INT4") => get_as(row, idx, |v: i32| Value::from(v)),
        Some("INT8") => get_as(row, idx, |v: i64| Value::from(v)),
        Some("FLOAT4") => get_as(row, idx, |v: f32| Value::from(f64::from(v))),
        Some("FLOAT8") => get_as(row, idx, |v: f64| Value::from(v)),
        Some("NUMERIC") => get_as(row, idx, |v: Decimal| {
            v.to_f64().map_or_else(|| Value::String(v.to_string()), Value::from)
        }),
        Some("TEXT" | "VARCHAR" | "BPCHAR" | "NAME" | "CHAR") => {
            get_as(row, idx, |v: String| Value::String(v))
        },
        Some("TIMESTAMPTZ") => {
            get_as(row, idx, |v: DateTime<Utc>| Value::String(v.to_rfc3339()))
        },
        Some("TIMESTAMP") => {
            get_as(row, idx, |v: NaiveDateTime| Value::String(v.to_string()))
        },
        Some("DATE") => get_as(row, idx, |v: NaiveDate| Value::String(v.to_string())),
        Some("TIME") => get_as(row, idx, |v: NaiveTime| Value::String(v.to_string())),
        Some("UUID") => get_as(row, idx, |v: uuid::Uuid| Value::String(v.to_string())),
        Some("JSON" | "JSONB") => get_as(row, idx, |v: Value| v),
        _ => get_as(row, idx, Value::String),
    }
}

/// Fetch a nullable column and map it to JSON; decode failures become null
/// with a debug log, never a row-level error.
fn get_as<'r, T>(row: &'r PgRow, idx: usize, to_json: impl FnOnce(T) -> Value) -> Value
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    match row.try_get::<Option<T>, _>(idx) {
        Ok(Some(v)) => to_json(v),
        Ok(None) => Value::Null,
        Err(e) => {
            tracing::debug!(column = idx, error = %e, "undecodable column value, returning null");
            Value::Null
        },
    }
}
