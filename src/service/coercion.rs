//! Untyped input to typed values: path literals by column type, JSON payload values by shape.

use super::credentials::is_credential_name;
use crate::error::AppError;
use crate::schema::TypeTag;
use crate::sql::{EntityRow, SqlValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use std::str::FromStr;

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Parse a calendar date or date/time. Offsets are converted to UTC wall time.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Coerce a raw path value into the type the column declares.
pub fn coerce(raw: &str, tag: &TypeTag) -> Result<SqlValue, AppError> {
    let trimmed = raw.trim();
    match tag {
        TypeTag::Integer => trimmed
            .parse::<i64>()
            .map(SqlValue::Int)
            .map_err(|_| AppError::Validation("invalid integer".into())),
        TypeTag::Decimal => Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map(SqlValue::Decimal)
            .map_err(|_| AppError::Validation("invalid decimal".into())),
        TypeTag::Boolean => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(SqlValue::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(SqlValue::Bool(false))
            } else {
                Err(AppError::Validation("invalid boolean".into()))
            }
        }
        TypeTag::Floating => trimmed
            .parse::<f64>()
            .map(SqlValue::Float)
            .map_err(|_| AppError::Validation("invalid float".into())),
        TypeTag::Text => Ok(SqlValue::Text(raw.to_string())),
        TypeTag::Date => parse_datetime(trimmed)
            .map(|dt| SqlValue::Date(dt.date()))
            .ok_or_else(|| AppError::Validation("invalid date".into())),
        TypeTag::Unsupported(name) => Err(AppError::UnsupportedType(name.clone())),
    }
}

/// Normalize one JSON payload value.
pub fn decode_json(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => SqlValue::Int(i),
            None => n.as_f64().map(SqlValue::Float).unwrap_or(SqlValue::Null),
        },
        Value::String(s) => match parse_datetime(s) {
            Some(dt) => SqlValue::Timestamp(dt),
            None => SqlValue::Text(s.clone()),
        },
        Value::Array(_) | Value::Object(_) => SqlValue::Json(value.to_string()),
    }
}

/// Decode a JSON object payload into an entity row, keeping field order.
/// A string in the credential field stays text so it is hashed exactly as sent.
pub fn decode_entity(body: &Map<String, Value>) -> EntityRow {
    let credential = body.keys().find(|k| is_credential_name(k));
    body.iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) if credential == Some(k) => SqlValue::Text(s.clone()),
                _ => decode_json(v),
            };
            (k.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn validation_message(r: Result<SqlValue, AppError>) -> String {
        match r {
            Err(AppError::Validation(m)) => m,
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn rejects_bad_literals_per_type() {
        assert_eq!(validation_message(coerce("abc", &TypeTag::Integer)), "invalid integer");
        assert_eq!(validation_message(coerce("1.2.3", &TypeTag::Decimal)), "invalid decimal");
        assert_eq!(validation_message(coerce("yes", &TypeTag::Boolean)), "invalid boolean");
        assert_eq!(validation_message(coerce("fast", &TypeTag::Floating)), "invalid float");
        assert_eq!(validation_message(coerce("2024-13-40", &TypeTag::Date)), "invalid date");
    }

    #[test]
    fn unsupported_type_is_named() {
        match coerce("x", &TypeTag::Unsupported("xml".into())) {
            Err(AppError::UnsupportedType(name)) => assert_eq!(name, "xml"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn accepts_well_formed_literals() {
        assert_eq!(coerce(" 42 ", &TypeTag::Integer).unwrap(), SqlValue::Int(42));
        assert_eq!(coerce("TRUE", &TypeTag::Boolean).unwrap(), SqlValue::Bool(true));
        assert_eq!(coerce("False", &TypeTag::Boolean).unwrap(), SqlValue::Bool(false));
        assert_eq!(
            coerce("19.99", &TypeTag::Decimal).unwrap(),
            SqlValue::Decimal(Decimal::from_str("19.99").unwrap())
        );
        assert_eq!(coerce(" keep spaces ", &TypeTag::Text).unwrap(), SqlValue::Text(" keep spaces ".into()));
    }

    #[test]
    fn dates_drop_time_of_day() {
        let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(coerce("2024-02-29", &TypeTag::Date).unwrap(), SqlValue::Date(day));
        assert_eq!(coerce("2024-02-29T17:45:00", &TypeTag::Date).unwrap(), SqlValue::Date(day));
        assert_eq!(coerce("2024-02-29 08:00:00.250", &TypeTag::Date).unwrap(), SqlValue::Date(day));
        assert_eq!(coerce("2024/02/29", &TypeTag::Date).unwrap(), SqlValue::Date(day));
    }

    #[test]
    fn json_values_decode_by_shape() {
        assert_eq!(decode_json(&json!(null)), SqlValue::Null);
        assert_eq!(decode_json(&json!(true)), SqlValue::Bool(true));
        assert_eq!(decode_json(&json!(7)), SqlValue::Int(7));
        assert_eq!(decode_json(&json!(7.5)), SqlValue::Float(7.5));
        assert_eq!(decode_json(&json!(u64::MAX)), SqlValue::Float(u64::MAX as f64));
        assert_eq!(decode_json(&json!("hola")), SqlValue::Text("hola".into()));
        assert_eq!(decode_json(&json!({"a": 1})), SqlValue::Json("{\"a\":1}".into()));
        assert_eq!(decode_json(&json!([1, "x"])), SqlValue::Json("[1,\"x\"]".into()));
    }

    #[test]
    fn json_date_strings_become_timestamps() {
        let expected = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(decode_json(&json!("2023-07-01")), SqlValue::Timestamp(expected));
        let with_offset = decode_json(&json!("2023-07-01T02:00:00+02:00"));
        assert_eq!(with_offset, SqlValue::Timestamp(expected));
    }

    #[test]
    fn decode_entity_preserves_order() {
        let body = json!({"zeta": 1, "alpha": "a"});
        let row = decode_entity(body.as_object().unwrap());
        assert_eq!(row.names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn date_shaped_password_stays_text() {
        let body = json!({"alta": "2024-01-01", "Password": "2024-01-01", "clave_previa": "2024-01-02"});
        let row = decode_entity(body.as_object().unwrap());
        assert_eq!(row.get("Password"), Some(&SqlValue::Text("2024-01-01".into())));
        assert!(matches!(row.get("alta"), Some(SqlValue::Timestamp(_))));
        assert!(matches!(row.get("clave_previa"), Some(SqlValue::Timestamp(_))));
    }

    proptest! {
        #[test]
        fn integers_round_trip(n in any::<i64>()) {
            prop_assert_eq!(coerce(&n.to_string(), &TypeTag::Integer).unwrap(), SqlValue::Int(n));
        }

        #[test]
        fn floats_round_trip(f in any::<f64>().prop_filter("finite", |f| f.is_finite())) {
            prop_assert_eq!(coerce(&f.to_string(), &TypeTag::Floating).unwrap(), SqlValue::Float(f));
        }

        #[test]
        fn decimals_round_trip(mantissa in any::<i64>(), scale in 0u32..10) {
            let d = Decimal::new(mantissa, scale);
            prop_assert_eq!(coerce(&d.to_string(), &TypeTag::Decimal).unwrap(), SqlValue::Decimal(d));
        }

        #[test]
        fn dates_round_trip(days in 0i32..100_000) {
            let d = NaiveDate::from_num_days_from_ce_opt(700_000 + days).unwrap();
            prop_assert_eq!(coerce(&d.format("%Y-%m-%d").to_string(), &TypeTag::Date).unwrap(), SqlValue::Date(d));
        }

        #[test]
        fn booleans_and_text_round_trip(b in any::<bool>(), s in ".*") {
            prop_assert_eq!(coerce(&b.to_string(), &TypeTag::Boolean).unwrap(), SqlValue::Bool(b));
            prop_assert_eq!(coerce(&s, &TypeTag::Text).unwrap(), SqlValue::Text(s.clone()));
        }
    }
}
