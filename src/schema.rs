//! Column type discovery through `information_schema.columns`.

use crate::db::Session;
use crate::error::AppError;
use crate::sql::{SqlValue, StatementBuilder};

/// Declared column type, normalized to the categories values can be coerced into.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeTag {
    Integer,
    Decimal,
    Boolean,
    Floating,
    Text,
    Date,
    /// Declared type with no coercion rule; carries the catalog name.
    Unsupported(String),
}

impl TypeTag {
    /// Map a catalog type name (SQL Server or PostgreSQL spelling) to a tag.
    pub fn from_declared(type_name: &str) -> Self {
        match type_name.trim().to_lowercase().as_str() {
            "int" | "integer" | "bigint" | "smallint" | "tinyint" | "int2" | "int4" | "int8"
            | "serial" | "bigserial" | "smallserial" => TypeTag::Integer,
            "decimal" | "numeric" | "money" | "smallmoney" => TypeTag::Decimal,
            "bit" | "boolean" | "bool" => TypeTag::Boolean,
            "float" | "real" | "double precision" | "float4" | "float8" => TypeTag::Floating,
            "nvarchar" | "varchar" | "nchar" | "char" | "text" | "character varying" | "character"
            | "bpchar" | "citext" | "name" => TypeTag::Text,
            "date" | "datetime" | "datetime2" | "smalldatetime" | "timestamp" | "timestamptz"
            | "timestamp without time zone" | "timestamp with time zone" => TypeTag::Date,
            _ => TypeTag::Unsupported(type_name.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnDescriptor {
    pub table_name: String,
    pub column_name: String,
    pub declared_type: TypeTag,
}

/// Resolve the declared type of `table.column`. Re-queried on every call.
/// Returns `None` when the catalog has no row or a null type for the column.
pub async fn resolve_column_type(
    session: &mut dyn Session,
    builder: &StatementBuilder,
    table: &str,
    column: &str,
) -> Result<Option<ColumnDescriptor>, AppError> {
    let stmt = builder.column_type_lookup(table, column);
    let rows = session.query(&stmt).await?;
    let type_name = rows
        .first()
        .and_then(|row| row.get("data_type"))
        .and_then(SqlValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let Some(type_name) = type_name else {
        return Ok(None);
    };
    tracing::debug!(table, column, data_type = type_name, "resolved column type");
    Ok(Some(ColumnDescriptor {
        table_name: table.to_string(),
        column_name: column.to_string(),
        declared_type: TypeTag::from_declared(type_name),
    }))
}
