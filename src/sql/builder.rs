//! Builds parameterized SELECT and INSERT statements for caller-named tables.
//! Identifiers are written through [`StatementBuilder::identifier`]; values are always bound.

use super::params::{SqlValue, TypedParameter};
use super::row::EntityRow;
use crate::config::{DatabaseProvider, IdentifierStyle};

/// Quote identifier for PostgreSQL.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

/// Statement text plus its bound parameters, in placeholder order.
#[derive(Clone, Debug, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<TypedParameter>,
}

impl Statement {
    pub fn new(sql: impl Into<String>) -> Self {
        Statement {
            sql: sql.into(),
            params: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct StatementBuilder {
    provider: DatabaseProvider,
    identifiers: IdentifierStyle,
}

impl StatementBuilder {
    pub fn new(provider: DatabaseProvider, identifiers: IdentifierStyle) -> Self {
        StatementBuilder { provider, identifiers }
    }

    /// The only place a caller-supplied name enters statement text.
    pub fn identifier(&self, name: &str) -> String {
        match self.identifiers {
            IdentifierStyle::Verbatim => name.to_string(),
            IdentifierStyle::Quoted => quoted(name),
        }
    }

    fn bind(&self, stmt: &mut Statement, value: SqlValue) -> String {
        let placeholder = self.provider.placeholder(stmt.params.len() + 1);
        stmt.params.push(TypedParameter::new(placeholder.clone(), value));
        placeholder
    }

    /// Catalog lookup of a column's declared type.
    pub fn column_type_lookup(&self, table: &str, column: &str) -> Statement {
        let mut stmt = Statement::new(String::new());
        let t = self.bind(&mut stmt, SqlValue::Text(table.to_string()));
        let c = self.bind(&mut stmt, SqlValue::Text(column.to_string()));
        stmt.sql = format!(
            "SELECT data_type::text AS data_type FROM information_schema.columns WHERE table_name = {} AND column_name = {}",
            t, c
        );
        stmt
    }

    /// Unconditional full-table read.
    pub fn select_all(&self, table: &str) -> Statement {
        Statement::new(format!("SELECT * FROM {}", self.identifier(table)))
    }

    /// Single equality predicate. Date values compare against the column cast to a date.
    pub fn select_by_key(&self, table: &str, key_column: &str, value: SqlValue) -> Statement {
        let mut stmt = Statement::new(String::new());
        let column = self.identifier(key_column);
        let lhs = match value {
            SqlValue::Date(_) => format!("CAST({} AS DATE)", column),
            _ => column,
        };
        let ph = self.bind(&mut stmt, value);
        stmt.sql = format!("SELECT * FROM {} WHERE {} = {}", self.identifier(table), lhs, ph);
        stmt
    }

    /// Whole-row insert: one column and one bound parameter per entity field, same order.
    pub fn insert(&self, table: &str, entity: &EntityRow) -> Statement {
        let mut stmt = Statement::new(String::new());
        let mut cols = Vec::with_capacity(entity.len());
        let mut placeholders = Vec::with_capacity(entity.len());
        for (name, value) in entity.iter() {
            cols.push(self.identifier(name));
            placeholders.push(self.bind(&mut stmt, value.clone()));
        }
        stmt.sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.identifier(table),
            cols.join(", "),
            placeholders.join(", ")
        );
        stmt
    }
}
