//! Conversions between [`Value`] and PostgreSQL wire types.

use crate::error::{DbError, DbResult};
use crate::value::{DATE_FORMAT, DATETIME_FORMAT, Value};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::Row;
use tokio_postgres::types::{IsNull, ToSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

fn is_text(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN
    )
}

/// Parameters are coerced to the type the server inferred for the placeholder, so text
/// produced by reflection (`"2024-01-02 03:04:05"`) binds to a `timestamp` column, an
/// `i64` binds to an `int4` column and text, integers and floats bind to `numeric`.
impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) if is_text(ty) => b.to_string().to_sql(ty, out),
            Value::Bool(b) => b.to_sql_checked(ty, out),
            Value::Int(i) => int_to_sql(*i, ty, out),
            Value::Float(f) => match *ty {
                Type::FLOAT4 => (*f as f32).to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*f)?.to_sql(ty, out),
                _ if is_text(ty) => f.to_string().to_sql(ty, out),
                _ => f.to_sql_checked(ty, out),
            },
            Value::Text(s) => text_to_sql(s, ty, out),
            Value::Bytes(b) => b.to_sql_checked(ty, out),
            Value::Date(d) => match *ty {
                Type::TIMESTAMP => d.and_time(NaiveTime::MIN).to_sql(ty, out),
                Type::TIMESTAMPTZ => d.and_time(NaiveTime::MIN).and_utc().to_sql(ty, out),
                _ if is_text(ty) => d.format(DATE_FORMAT).to_string().to_sql(ty, out),
                _ => d.to_sql_checked(ty, out),
            },
            Value::DateTime(dt) => match *ty {
                Type::TIMESTAMPTZ => dt.and_utc().to_sql(ty, out),
                Type::DATE => dt.date().to_sql(ty, out),
                _ if is_text(ty) => dt.format(DATETIME_FORMAT).to_string().to_sql(ty, out),
                _ => dt.to_sql_checked(ty, out),
            },
            Value::Json(v) if is_text(ty) => v.to_string().to_sql(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn int_to_sql(i: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(i)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(i)?.to_sql(ty, out),
        Type::INT8 => i.to_sql(ty, out),
        Type::OID => u32::try_from(i)?.to_sql(ty, out),
        Type::FLOAT4 => (i as f32).to_sql(ty, out),
        Type::FLOAT8 => (i as f64).to_sql(ty, out),
        Type::NUMERIC => Decimal::from(i).to_sql(ty, out),
        Type::BOOL => (i != 0).to_sql(ty, out),
        _ if is_text(ty) => i.to_string().to_sql(ty, out),
        _ => i.to_sql_checked(ty, out),
    }
}

fn text_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => s.trim().parse::<i16>()?.to_sql(ty, out),
        Type::INT4 => s.trim().parse::<i32>()?.to_sql(ty, out),
        Type::INT8 => s.trim().parse::<i64>()?.to_sql(ty, out),
        Type::FLOAT4 => s.trim().parse::<f32>()?.to_sql(ty, out),
        Type::FLOAT8 => s.trim().parse::<f64>()?.to_sql(ty, out),
        Type::NUMERIC => s.trim().parse::<Decimal>()?.to_sql(ty, out),
        Type::BOOL => parse_bool(s)?.to_sql(ty, out),
        Type::DATE => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).map(|dt| dt.date()))?
            .to_sql(ty, out),
        Type::TIMESTAMP => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)?.to_sql(ty, out),
        Type::TIMESTAMPTZ => NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)?
            .and_utc()
            .to_sql(ty, out),
        Type::UUID => uuid::Uuid::parse_str(s)?.to_sql(ty, out),
        Type::JSON | Type::JSONB => serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out),
        _ => s.to_sql_checked(ty, out),
    }
}

fn parse_bool(s: &str) -> Result<bool, BoxError> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "on" => Ok(true),
        "false" | "f" | "0" | "no" | "off" => Ok(false),
        other => Err(format!("invalid boolean literal '{other}'").into()),
    }
}

/// Decode every column of a row into [`Value`]s.
///
/// `numeric` columns decode to [`Value::Text`] so no digits are lost. Unsupported column
/// types fail with [`DbError::Decode`]; cast them to `text` in SQL.
pub fn decode_row(row: &Row) -> DbResult<Vec<Value>> {
    (0..row.len()).map(|idx| decode_column(row, idx)).collect()
}

fn decode_column(row: &Row, idx: usize) -> DbResult<Value> {
    let column = &row.columns()[idx];
    let ty = column.type_();
    let err = |e: tokio_postgres::Error| DbError::decode(column.name(), e.to_string());

    let value: Value = match *ty {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx).map_err(err)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx).map_err(err)?.into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx).map_err(err)?.into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx).map_err(err)?.into(),
        Type::OID => row.try_get::<_, Option<u32>>(idx).map_err(err)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx).map_err(err)?.into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx).map_err(err)?.into(),
        Type::NUMERIC => row
            .try_get::<_, Option<Decimal>>(idx)
            .map_err(err)?
            .map(|d| d.to_string())
            .into(),
        Type::BYTEA => row.try_get::<_, Option<Vec<u8>>>(idx).map_err(err)?.into(),
        Type::DATE => row.try_get::<_, Option<NaiveDate>>(idx).map_err(err)?.into(),
        Type::TIMESTAMP => row
            .try_get::<_, Option<NaiveDateTime>>(idx)
            .map_err(err)?
            .into(),
        Type::TIMESTAMPTZ => row
            .try_get::<_, Option<DateTime<Utc>>>(idx)
            .map_err(err)?
            .map(|dt| dt.naive_utc())
            .into(),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)
            .map_err(err)?
            .into(),
        Type::UUID => row
            .try_get::<_, Option<uuid::Uuid>>(idx)
            .map_err(err)?
            .map(|u| u.to_string())
            .into(),
        _ if is_text(ty) => row.try_get::<_, Option<String>>(idx).map_err(err)?.into(),
        _ => {
            return Err(DbError::decode(
                column.name(),
                format!("unsupported column type '{}'", ty.name()),
            ));
        }
    };
    Ok(value)
}
