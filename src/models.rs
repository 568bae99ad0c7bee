//! Domain types shared by every layer: the table schema, scalar values, and
//! records. The intent is that these stay light-weight data holders so the
//! store can focus on SQL and the UI on presentation. The schema is built
//! once (at table creation or by introspection) and threaded through every
//! operation instead of being re-derived per call.

use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

/// Storage classes supported for user columns. These map one-to-one onto the
/// SQLite type names used in `CREATE TABLE` and reported by `PRAGMA
/// table_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Real,
    Text,
}

impl ColumnType {
    /// The SQL spelling used in column declarations.
    pub fn as_sql(self) -> &'static str {
        match self {
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Text => "TEXT",
        }
    }

    /// Map a declared type from schema introspection back onto our enum.
    /// Unknown declarations fall back to `Text`, mirroring SQLite's own
    /// affinity rules for unrecognized type names.
    pub fn from_declared(decl: &str) -> Self {
        let upper = decl.trim().to_ascii_uppercase();
        if upper.contains("INT") {
            ColumnType::Integer
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            ColumnType::Real
        } else {
            ColumnType::Text
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// One user column: a name plus its storage class. The implicit `id` primary
/// key is never represented as a `Column`.
#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub ty: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Ordered list of user columns defining the table's shape. Fixed for the
/// lifetime of the table; the store validates the names once when the table
/// is opened or created.
#[derive(Debug, Clone)]
pub struct Schema {
    columns: Vec<Column>,
}

impl Schema {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in declaration order, without the primary key.
    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Column types in declaration order, without the primary key.
    pub fn types(&self) -> Vec<ColumnType> {
        self.columns.iter().map(|c| c.ty).collect()
    }
}

/// A scalar cell value. Raw user input is coerced into the column's declared
/// type before it is bound to a statement; numeric parses that fail fall back
/// to text, which is the same lenient behavior SQLite's column affinity gives
/// string-heavy seed data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Coerce a raw string into the given column type.
    pub fn coerce(raw: &str, ty: ColumnType) -> Self {
        let trimmed = raw.trim();
        match ty {
            ColumnType::Integer => {
                if let Ok(int) = trimmed.parse::<i64>() {
                    Value::Integer(int)
                } else if let Ok(real) = trimmed.parse::<f64>() {
                    Value::Real(real)
                } else {
                    Value::Text(raw.to_string())
                }
            }
            ColumnType::Real => match trimmed.parse::<f64>() {
                Ok(real) => Value::Real(real),
                Err(_) => Value::Text(raw.to_string()),
            },
            ColumnType::Text => Value::Text(raw.to_string()),
        }
    }

    /// Convert a value read back from a row. NULLs and blobs have no place in
    /// tables this application writes, so they render as empty text rather
    /// than failing the whole query.
    pub fn from_sql_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Integer(int) => Value::Integer(int),
            ValueRef::Real(real) => Value::Real(real),
            ValueRef::Text(text) => Value::Text(String::from_utf8_lossy(text).into_owned()),
            ValueRef::Blob(_) | ValueRef::Null => Value::Text(String::new()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Integer(int) => int.to_sql(),
            Value::Real(real) => real.to_sql(),
            Value::Text(text) => text.to_sql(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(int) => write!(f, "{int}"),
            Value::Real(real) => write!(f, "{real}"),
            Value::Text(text) => f.write_str(text),
        }
    }
}

/// One row of the managed table. `values` is positionally aligned to the
/// schema's columns; `id` is the auto-generated primary key that update and
/// delete flows bubble back to the store.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: i64,
    pub values: Vec<Value>,
}

impl Record {
    /// One-line summary shown in the record list.
    pub fn summary(&self) -> String {
        let mut line = self.id.to_string();
        for value in &self.values {
            line.push_str(" | ");
            line.push_str(&value.to_string());
        }
        line
    }
}

/// The subset of columns participating in a search, paired with the raw text
/// to match. Empty inputs mean "not specified" and are excluded up front, so
/// an empty criteria set is equivalent to no filter at all.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    entries: Vec<(String, String)>,
}

impl SearchCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build criteria from form inputs aligned to the schema, skipping any
    /// input that is empty after trimming.
    pub fn from_inputs(schema: &Schema, inputs: &[String]) -> Self {
        let mut criteria = Self::new();
        for (column, input) in schema.columns().iter().zip(inputs) {
            if !input.trim().is_empty() {
                criteria.push(column.name.clone(), input.clone());
            }
        }
        criteria
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.entries.push((column.into(), value.into()));
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_types_round_trip() {
        assert_eq!(ColumnType::from_declared("INTEGER"), ColumnType::Integer);
        assert_eq!(ColumnType::from_declared("REAL"), ColumnType::Real);
        assert_eq!(ColumnType::from_declared("TEXT"), ColumnType::Text);
        assert_eq!(ColumnType::from_declared("real"), ColumnType::Real);
        assert_eq!(ColumnType::from_declared("VARCHAR(20)"), ColumnType::Text);
    }

    #[test]
    fn coercion_follows_column_type() {
        assert_eq!(Value::coerce("30", ColumnType::Integer), Value::Integer(30));
        assert_eq!(Value::coerce("2.5", ColumnType::Real), Value::Real(2.5));
        assert_eq!(Value::coerce("7", ColumnType::Real), Value::Real(7.0));
        assert_eq!(
            Value::coerce("Alice", ColumnType::Text),
            Value::Text("Alice".to_string())
        );
        // A non-numeric value aimed at a numeric column survives as text
        // instead of failing the whole operation.
        assert_eq!(
            Value::coerce("n/a", ColumnType::Integer),
            Value::Text("n/a".to_string())
        );
        // Numbers typed into a TEXT column stay text.
        assert_eq!(
            Value::coerce("30", ColumnType::Text),
            Value::Text("30".to_string())
        );
    }

    #[test]
    fn summary_joins_id_and_values() {
        let record = Record {
            id: 3,
            values: vec![
                Value::Text("Alice".to_string()),
                Value::Integer(30),
                Value::Real(1.5),
            ],
        };
        assert_eq!(record.summary(), "3 | Alice | 30 | 1.5");
    }

    #[test]
    fn empty_inputs_are_excluded_from_criteria() {
        let schema = Schema::new(vec![
            Column::new("name", ColumnType::Text),
            Column::new("age", ColumnType::Integer),
        ]);
        let criteria = SearchCriteria::from_inputs(&schema, &["".to_string(), "30".to_string()]);
        assert_eq!(criteria.entries().len(), 1);
        assert_eq!(criteria.entries()[0].0, "age");

        let all_empty = SearchCriteria::from_inputs(&schema, &["  ".to_string(), "".to_string()]);
        assert!(all_empty.is_empty());
    }
}
