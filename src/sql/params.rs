//! Typed scalar values and the sqlx bindings for them.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use sqlx::encode::{Encode, IsNull};
use sqlx::error::BoxDynError;
use sqlx::postgres::types::Oid;
use sqlx::postgres::{PgTypeInfo, Postgres};
use sqlx::{Database, Type};

/// A nullable scalar that can cross into or out of a statement.
#[derive(Clone, Debug, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    TimestampTz(DateTime<Utc>),
    /// Serialized JSON object or array, kept as text.
    Json(String),
}

impl SqlValue {
    /// Database type label inferred from the runtime variant.
    pub fn db_type(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "boolean",
            SqlValue::Int(_) => "bigint",
            SqlValue::Float(_) => "double precision",
            SqlValue::Decimal(_) => "numeric",
            SqlValue::Text(_) => "text",
            SqlValue::Date(_) => "date",
            SqlValue::Timestamp(_) => "timestamp",
            SqlValue::TimestampTz(_) => "timestamptz",
            SqlValue::Json(_) => "text",
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Null => serializer.serialize_none(),
            SqlValue::Bool(b) => serializer.serialize_bool(*b),
            SqlValue::Int(n) => serializer.serialize_i64(*n),
            SqlValue::Float(n) => serializer.serialize_f64(*n),
            SqlValue::Decimal(d) => Serialize::serialize(d, serializer),
            SqlValue::Text(s) => serializer.serialize_str(s),
            SqlValue::Date(d) => serializer.collect_str(&d.format("%Y-%m-%d")),
            SqlValue::Timestamp(d) => serializer.collect_str(&d.format("%Y-%m-%dT%H:%M:%S%.f")),
            SqlValue::TimestampTz(d) => serializer.serialize_str(&d.to_rfc3339()),
            SqlValue::Json(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(v) => v.serialize(serializer),
                Err(_) => serializer.serialize_str(raw),
            },
        }
    }
}

/// A value bound to a named placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedParameter {
    pub name: String,
    pub value: SqlValue,
}

impl TypedParameter {
    pub fn new(name: impl Into<String>, value: SqlValue) -> Self {
        TypedParameter {
            name: name.into(),
            value,
        }
    }

    pub fn db_type(&self) -> &'static str {
        self.value.db_type()
    }
}

impl<'q> Encode<'q, Postgres> for SqlValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Postgres as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => <bool as Encode<Postgres>>::encode_by_ref(b, buf),
            SqlValue::Int(n) => <i64 as Encode<Postgres>>::encode_by_ref(n, buf),
            SqlValue::Float(n) => <f64 as Encode<Postgres>>::encode_by_ref(n, buf),
            SqlValue::Decimal(d) => <Decimal as Encode<Postgres>>::encode_by_ref(d, buf),
            SqlValue::Text(s) | SqlValue::Json(s) => {
                <&str as Encode<Postgres>>::encode_by_ref(&s.as_str(), buf)
            }
            SqlValue::Date(d) => <NaiveDate as Encode<Postgres>>::encode_by_ref(d, buf),
            SqlValue::Timestamp(d) => <NaiveDateTime as Encode<Postgres>>::encode_by_ref(d, buf),
            SqlValue::TimestampTz(d) => <DateTime<Utc> as Encode<Postgres>>::encode_by_ref(d, buf),
        }
    }

    /// Each variant declares its own type. Null is sent with oid 0 so the server
    /// infers the type from the target column.
    fn produces(&self) -> Option<PgTypeInfo> {
        Some(match self {
            SqlValue::Null => PgTypeInfo::with_oid(Oid(0)),
            SqlValue::Bool(_) => <bool as Type<Postgres>>::type_info(),
            SqlValue::Int(_) => <i64 as Type<Postgres>>::type_info(),
            SqlValue::Float(_) => <f64 as Type<Postgres>>::type_info(),
            SqlValue::Decimal(_) => <Decimal as Type<Postgres>>::type_info(),
            SqlValue::Text(_) | SqlValue::Json(_) => <&str as Type<Postgres>>::type_info(),
            SqlValue::Date(_) => <NaiveDate as Type<Postgres>>::type_info(),
            SqlValue::Timestamp(_) => <NaiveDateTime as Type<Postgres>>::type_info(),
            SqlValue::TimestampTz(_) => <DateTime<Utc> as Type<Postgres>>::type_info(),
        })
    }
}

impl Type<Postgres> for SqlValue {
    fn type_info() -> PgTypeInfo {
        PgTypeInfo::with_name("TEXT")
    }

    fn compatible(_ty: &PgTypeInfo) -> bool {
        true
    }
}
