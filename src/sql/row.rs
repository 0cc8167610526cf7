//! Entity rows: ordered column name to value maps, read from or written to a table.

use super::params::SqlValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use sqlx::postgres::PgRow;

/// One record of a table. Column names are unique; insertion order is kept.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityRow {
    fields: Vec<(String, SqlValue)>,
}

impl EntityRow {
    pub fn new() -> Self {
        EntityRow { fields: Vec::new() }
    }

    /// Insert or replace a field. A replaced field keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, value: SqlValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&SqlValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, SqlValue)> for EntityRow {
    fn from_iter<I: IntoIterator<Item = (K, SqlValue)>>(iter: I) -> Self {
        let mut row = EntityRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for EntityRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Decode a result row column by column, keyed on the reported column type.
pub fn decode_row(row: &PgRow) -> EntityRow {
    use sqlx::{Column, Row, TypeInfo};
    let mut out = EntityRow::new();
    for (idx, col) in row.columns().iter().enumerate() {
        let value = decode_cell(row, idx, col.type_info().name());
        out.insert(col.name(), value);
    }
    out
}

fn decode_cell(row: &PgRow, idx: usize, type_name: &str) -> SqlValue {
    use sqlx::Row;
    let value = match type_name {
        "INT2" => row.try_get::<Option<i16>, _>(idx).map(|v| v.map(|n| SqlValue::Int(n.into()))),
        "INT4" => row.try_get::<Option<i32>, _>(idx).map(|v| v.map(|n| SqlValue::Int(n.into()))),
        "INT8" => row.try_get::<Option<i64>, _>(idx).map(|v| v.map(SqlValue::Int)),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx).map(|v| v.map(|n| SqlValue::Float(n.into()))),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx).map(|v| v.map(SqlValue::Float)),
        "NUMERIC" => row.try_get::<Option<Decimal>, _>(idx).map(|v| v.map(SqlValue::Decimal)),
        "BOOL" => row.try_get::<Option<bool>, _>(idx).map(|v| v.map(SqlValue::Bool)),
        "DATE" => row.try_get::<Option<NaiveDate>, _>(idx).map(|v| v.map(SqlValue::Date)),
        "TIME" => row
            .try_get::<Option<NaiveTime>, _>(idx)
            .map(|v| v.map(|t| SqlValue::Text(t.format("%H:%M:%S%.f").to_string()))),
        "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(idx).map(|v| v.map(SqlValue::Timestamp)),
        "TIMESTAMPTZ" => row
            .try_get::<Option<DateTime<Utc>>, _>(idx)
            .map(|v| v.map(SqlValue::TimestampTz)),
        "UUID" => row
            .try_get::<Option<uuid::Uuid>, _>(idx)
            .map(|v| v.map(|u| SqlValue::Text(u.to_string()))),
        "JSON" | "JSONB" => row
            .try_get::<Option<serde_json::Value>, _>(idx)
            .map(|v| v.map(|j| SqlValue::Json(j.to_string()))),
        "BYTEA" => row
            .try_get::<Option<Vec<u8>>, _>(idx)
            .map(|v| v.map(|b| SqlValue::Text(hex_literal(&b)))),
        "INT2[]" => array_cell::<i16>(row, idx),
        "INT4[]" => array_cell::<i32>(row, idx),
        "INT8[]" => array_cell::<i64>(row, idx),
        "FLOAT4[]" => array_cell::<f32>(row, idx),
        "FLOAT8[]" => array_cell::<f64>(row, idx),
        "NUMERIC[]" => array_cell::<Decimal>(row, idx),
        "BOOL[]" => array_cell::<bool>(row, idx),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => array_cell::<String>(row, idx),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx).map(|v| v.map(SqlValue::Text))
        }
        _ => return raw_cell(row, idx),
    };
    match value {
        Ok(Some(v)) => v,
        Ok(None) => SqlValue::Null,
        Err(e) => {
            tracing::debug!(column = idx, type_name, error = %e, "typed decode failed, using raw value");
            raw_cell(row, idx)
        }
    }
}

fn array_cell<T>(row: &PgRow, idx: usize) -> Result<Option<SqlValue>, sqlx::Error>
where
    T: for<'r> sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Serialize,
    Vec<Option<T>>: for<'r> sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    use sqlx::Row;
    let items = row.try_get::<Option<Vec<Option<T>>>, _>(idx)?;
    Ok(items.and_then(|items| serde_json::to_string(&items).ok().map(SqlValue::Json)))
}

/// Any other type comes back as its wire encoding: text as is, binary as a `\x` hex literal.
fn raw_cell(row: &PgRow, idx: usize) -> SqlValue {
    use sqlx::postgres::PgValueFormat;
    use sqlx::{Row, ValueRef};
    let raw = match row.try_get_raw(idx) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "column value unavailable");
            return SqlValue::Null;
        }
    };
    if raw.is_null() {
        return SqlValue::Null;
    }
    let format = raw.format();
    let bytes = match <&[u8] as sqlx::Decode<sqlx::Postgres>>::decode(raw) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(column = idx, error = %e, "column value unreadable");
            return SqlValue::Null;
        }
    };
    match (format, std::str::from_utf8(bytes)) {
        (PgValueFormat::Text, Ok(text)) => SqlValue::Text(text.to_string()),
        _ => SqlValue::Text(hex_literal(bytes)),
    }
}

fn hex_literal(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("\\x");
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
