//! The single-table data store. Every operation here translates a typed CRUD
//! intent into one parameterized SQL statement; values are always bound, never
//! spliced into the statement text. Identifiers cannot be bound, so table and
//! column names are validated once when the store is opened and double-quoted
//! everywhere they appear.

use std::path::Path;

use rusqlite::{params, params_from_iter, Connection, Error as SqlError, ErrorCode, Row};

use crate::models::{Column, ColumnType, Record, Schema, SearchCriteria, Value};

use super::error::StoreError;

/// Name of the implicit auto-incrementing primary key column.
const ID_COLUMN: &str = "id";

/// Owns the live connection to one table whose name equals the database base
/// name. The schema is introspected once at open and cached; it never changes
/// for the lifetime of the table.
#[derive(Debug)]
pub struct Store {
    conn: Connection,
    table: String,
    schema: Schema,
}

impl Store {
    /// Open or create the database file at `dir/name.db`. When `schema` is
    /// given and the table does not exist yet, it is created with an integer
    /// primary key plus the declared columns in order; the call is idempotent
    /// when the table already exists. Without a schema the table must already
    /// be present.
    pub fn open(dir: &Path, name: &str, schema: Option<&Schema>) -> Result<Self, StoreError> {
        let file = dir.join(format!("{name}.db"));
        let conn =
            Connection::open(&file).map_err(|source| StoreError::Unavailable {
                path: file.clone(),
                source,
            })?;

        match Self::initialize(conn, name, schema) {
            Err(StoreError::Sql(err)) if is_not_a_database(&err) => {
                Err(StoreError::Unavailable { path: file, source: err })
            }
            other => other,
        }
    }

    /// Open a throwaway in-memory store with the given schema. Used by tests
    /// and anywhere a store needs to be substituted without touching disk.
    pub fn open_in_memory(name: &str, schema: &Schema) -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(conn, name, Some(schema))
    }

    fn initialize(
        conn: Connection,
        name: &str,
        schema: Option<&Schema>,
    ) -> Result<Self, StoreError> {
        validate_identifier(name)?;

        if let Some(schema) = schema {
            for column in schema.columns() {
                validate_identifier(&column.name)?;
            }
            let mut sql = format!(
                "CREATE TABLE IF NOT EXISTS {} ({} INTEGER PRIMARY KEY",
                quote_identifier(name),
                quote_identifier(ID_COLUMN),
            );
            for column in schema.columns() {
                sql.push_str(", ");
                sql.push_str(&quote_identifier(&column.name));
                sql.push(' ');
                sql.push_str(column.ty.as_sql());
            }
            sql.push(')');
            conn.execute(&sql, [])?;
        }

        let schema = introspect(&conn, name)?;
        if schema.is_empty() {
            return Err(StoreError::MissingTable(name.to_string()));
        }

        Ok(Self {
            conn,
            table: name.to_string(),
            schema,
        })
    }

    /// The cached schema, in declaration order, without the primary key.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Path-independent name of the managed table.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Column names in declaration order. The primary key is excluded unless
    /// `include_key` is set.
    pub fn column_names(&self, include_key: bool) -> Vec<String> {
        let mut names = Vec::with_capacity(self.schema.len() + 1);
        if include_key {
            names.push(ID_COLUMN.to_string());
        }
        names.extend(self.schema.names());
        names
    }

    /// Column types in declaration order. The primary key is excluded unless
    /// `include_key` is set.
    pub fn column_types(&self, include_key: bool) -> Vec<ColumnType> {
        let mut types = Vec::with_capacity(self.schema.len() + 1);
        if include_key {
            types.push(ColumnType::Integer);
        }
        types.extend(self.schema.types());
        types
    }

    /// Every record in storage order. No `ORDER BY`: the order is whatever the
    /// engine returns and is not guaranteed stable across mutations.
    pub fn get_all(&self) -> Result<Vec<Record>, StoreError> {
        let sql = format!("SELECT {} FROM {}", self.select_list(), self.quoted_table());
        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map([], |row| self.record_from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Records matching every present criterion by exact equality. An empty
    /// criteria set behaves exactly like `get_all`.
    pub fn find(&self, criteria: &SearchCriteria) -> Result<Vec<Record>, StoreError> {
        if criteria.is_empty() {
            return self.get_all();
        }

        let mut sql = format!(
            "SELECT {} FROM {} WHERE ",
            self.select_list(),
            self.quoted_table()
        );
        let mut bound = Vec::with_capacity(criteria.entries().len());
        for (idx, (column, raw)) in criteria.entries().iter().enumerate() {
            let ty = self
                .schema
                .columns()
                .iter()
                .find(|c| c.name == *column)
                .map(|c| c.ty)
                .ok_or_else(|| StoreError::UnknownColumn(column.clone()))?;
            if idx > 0 {
                sql.push_str(" AND ");
            }
            sql.push_str(&quote_identifier(column));
            sql.push_str(&format!(" = ?{}", idx + 1));
            bound.push(Value::coerce(raw, ty));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_from_iter(bound.iter()), |row| {
                self.record_from_row(row)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Append one record with a fresh auto-generated id and return that id.
    /// The values are positionally aligned to `column_names(false)`.
    pub fn insert(&self, values: &[String]) -> Result<i64, StoreError> {
        self.check_field_count(values.len())?;

        let placeholders = (1..=values.len())
            .map(|idx| format!("?{idx}"))
            .collect::<Vec<_>>()
            .join(", ");
        let columns = self
            .schema
            .columns()
            .iter()
            .map(|c| quote_identifier(&c.name))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({columns}) VALUES ({placeholders})",
            self.quoted_table()
        );

        let bound = self.coerce_values(values);
        self.conn.execute(&sql, params_from_iter(bound.iter()))?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Replace every non-key column of the record identified by `id`.
    pub fn update(&self, id: i64, values: &[String]) -> Result<(), StoreError> {
        self.check_field_count(values.len())?;

        let assignments = self
            .schema
            .columns()
            .iter()
            .enumerate()
            .map(|(idx, column)| format!("{} = ?{}", quote_identifier(&column.name), idx + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {} = ?{}",
            self.quoted_table(),
            quote_identifier(ID_COLUMN),
            values.len() + 1,
        );

        let mut bound = self.coerce_values(values);
        bound.push(Value::Integer(id));
        let updated = self.conn.execute(&sql, params_from_iter(bound.iter()))?;
        if updated == 0 {
            Err(StoreError::NotFound(id))
        } else {
            Ok(())
        }
    }

    /// Remove the record identified by `id`. Deleting an absent id is a no-op.
    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?1",
            self.quoted_table(),
            quote_identifier(ID_COLUMN),
        );
        self.conn.execute(&sql, params![id])?;
        Ok(())
    }

    /// Release the connection. Dropping the store without calling this also
    /// closes it; consuming `self` makes a double close unrepresentable.
    pub fn close(self) -> Result<(), StoreError> {
        self.conn.close().map_err(|(_, err)| StoreError::Sql(err))
    }

    fn quoted_table(&self) -> String {
        quote_identifier(&self.table)
    }

    /// Explicit select list in schema order, id first.
    fn select_list(&self) -> String {
        let mut list = quote_identifier(ID_COLUMN);
        for column in self.schema.columns() {
            list.push_str(", ");
            list.push_str(&quote_identifier(&column.name));
        }
        list
    }

    fn record_from_row(&self, row: &Row<'_>) -> rusqlite::Result<Record> {
        let id: i64 = row.get(0)?;
        let mut values = Vec::with_capacity(self.schema.len());
        for idx in 0..self.schema.len() {
            values.push(Value::from_sql_ref(row.get_ref(idx + 1)?));
        }
        Ok(Record { id, values })
    }

    fn check_field_count(&self, actual: usize) -> Result<(), StoreError> {
        let expected = self.schema.len();
        if actual != expected {
            Err(StoreError::FieldCount { expected, actual })
        } else {
            Ok(())
        }
    }

    fn coerce_values(&self, values: &[String]) -> Vec<Value> {
        self.schema
            .columns()
            .iter()
            .zip(values)
            .map(|(column, raw)| Value::coerce(raw, column.ty))
            .collect()
    }
}

/// Read the table's shape via `PRAGMA table_info`, skipping the primary key
/// column. Returns an empty schema when the table does not exist.
fn introspect(conn: &Connection, table: &str) -> Result<Schema, StoreError> {
    let sql = format!("PRAGMA table_info({})", quote_identifier(table));
    let mut stmt = conn.prepare(&sql)?;
    let columns = stmt
        .query_map([], |row| {
            let cid: i64 = row.get(0)?;
            let name: String = row.get(1)?;
            let declared: String = row.get(2)?;
            Ok((cid, name, declared))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let columns = columns
        .into_iter()
        .filter(|(cid, _, _)| *cid != 0)
        .map(|(_, name, declared)| Column::new(name, ColumnType::from_declared(&declared)))
        .collect();
    Ok(Schema::new(columns))
}

/// Identifiers are restricted to letters, digits, and underscores with a
/// non-digit first character. Anything else is rejected at open time so the
/// quoted splices below can never break out of the statement.
fn validate_identifier(name: &str) -> Result<(), StoreError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidIdentifier(name.to_string()))
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{name}\"")
}

fn is_not_a_database(err: &SqlError) -> bool {
    matches!(err.sqlite_error_code(), Some(ErrorCode::NotADatabase))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::models::{Column, ColumnType, Schema, SearchCriteria, Value};

    fn people_schema() -> Schema {
        Schema::new(vec![
            Column::new("name", ColumnType::Text),
            Column::new("age", ColumnType::Integer),
        ])
    }

    fn memory_store() -> Store {
        Store::open_in_memory("people", &people_schema()).expect("in-memory store")
    }

    #[test]
    fn insert_appends_exactly_one_record() {
        let store = memory_store();
        store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");
        let before = store.get_all().expect("get_all").len();

        let id = store
            .insert(&["Bob".to_string(), "25".to_string()])
            .expect("insert");
        let records = store.get_all().expect("get_all");
        assert_eq!(records.len(), before + 1);

        let added = records.iter().find(|r| r.id == id).expect("new record");
        assert_eq!(
            added.values,
            vec![Value::Text("Bob".to_string()), Value::Integer(25)]
        );
    }

    #[test]
    fn insert_rejects_field_count_mismatch() {
        let store = memory_store();
        let err = store.insert(&["Alice".to_string()]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::FieldCount {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn update_replaces_all_non_key_columns() {
        let store = memory_store();
        let id = store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");

        store
            .update(id, &["Alicia".to_string(), "31".to_string()])
            .expect("update");

        let records = store.get_all().expect("get_all");
        let updated = records.iter().find(|r| r.id == id).expect("record");
        assert_eq!(
            updated.values,
            vec![Value::Text("Alicia".to_string()), Value::Integer(31)]
        );
    }

    #[test]
    fn update_unknown_id_reports_not_found() {
        let store = memory_store();
        let err = store
            .update(99, &["Alice".to_string(), "30".to_string()])
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(99)));
    }

    #[test]
    fn delete_removes_exactly_one_record() {
        let store = memory_store();
        let keep = store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");
        let remove = store
            .insert(&["Bob".to_string(), "25".to_string()])
            .expect("insert");

        store.delete(remove).expect("delete");

        let records = store.get_all().expect("get_all");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, keep);
    }

    #[test]
    fn delete_missing_id_is_a_no_op() {
        let store = memory_store();
        store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");

        store.delete(99).expect("delete of absent id");
        assert_eq!(store.get_all().expect("get_all").len(), 1);
    }

    #[test]
    fn find_with_empty_criteria_matches_get_all() {
        let store = memory_store();
        store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");
        store
            .insert(&["Bob".to_string(), "25".to_string()])
            .expect("insert");

        let all: Vec<i64> = store.get_all().expect("get_all").iter().map(|r| r.id).collect();
        let mut found: Vec<i64> = store
            .find(&SearchCriteria::new())
            .expect("find")
            .iter()
            .map(|r| r.id)
            .collect();
        found.sort_unstable();
        let mut all_sorted = all.clone();
        all_sorted.sort_unstable();
        assert_eq!(found, all_sorted);
    }

    #[test]
    fn find_applies_every_present_criterion() {
        let store = memory_store();
        store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");
        store
            .insert(&["Alice".to_string(), "31".to_string()])
            .expect("insert");
        store
            .insert(&["Bob".to_string(), "30".to_string()])
            .expect("insert");

        let mut criteria = SearchCriteria::new();
        criteria.push("name", "Alice");
        criteria.push("age", "30");
        let matches = store.find(&criteria).expect("find");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].values[0], Value::Text("Alice".to_string()));
        assert_eq!(matches[0].values[1], Value::Integer(30));
    }

    #[test]
    fn find_treats_quotes_and_sql_fragments_literally() {
        let store = memory_store();
        store
            .insert(&["O'Brien\" OR 1=1 --".to_string(), "40".to_string()])
            .expect("insert");
        store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");

        let mut criteria = SearchCriteria::new();
        criteria.push("name", "O'Brien\" OR 1=1 --");
        let matches = store.find(&criteria).expect("find");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].values[1], Value::Integer(40));

        let mut miss = SearchCriteria::new();
        miss.push("name", "' OR '1'='1");
        assert!(store.find(&miss).expect("find").is_empty());
    }

    #[test]
    fn reopening_introspects_the_original_schema() {
        let dir = tempdir().expect("tempdir");
        let schema = people_schema();

        let store = Store::open(dir.path(), "people", Some(&schema)).expect("create");
        store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");
        store.close().expect("close");

        let reopened = Store::open(dir.path(), "people", None).expect("reopen");
        assert_eq!(reopened.column_names(false), vec!["name", "age"]);
        assert_eq!(
            reopened.column_names(true),
            vec!["id", "name", "age"]
        );
        assert_eq!(
            reopened.column_types(false),
            vec![ColumnType::Text, ColumnType::Integer]
        );
        assert_eq!(reopened.get_all().expect("get_all").len(), 1);
    }

    #[test]
    fn open_with_schema_is_idempotent() {
        let dir = tempdir().expect("tempdir");
        let schema = people_schema();

        let store = Store::open(dir.path(), "people", Some(&schema)).expect("create");
        store
            .insert(&["Alice".to_string(), "30".to_string()])
            .expect("insert");
        store.close().expect("close");

        // A second open with the same schema must not wipe existing rows.
        let again = Store::open(dir.path(), "people", Some(&schema)).expect("reopen");
        assert_eq!(again.get_all().expect("get_all").len(), 1);
    }

    #[test]
    fn missing_table_without_schema_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let err = Store::open(dir.path(), "people", None).unwrap_err();
        assert!(matches!(err, StoreError::MissingTable(name) if name == "people"));
    }

    #[test]
    fn corrupt_file_reports_storage_unavailable() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("people.db"), b"this is not a database").expect("write");

        let err = Store::open(dir.path(), "people", Some(&people_schema())).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable { .. }));
    }

    #[test]
    fn hostile_identifiers_are_rejected_at_open() {
        let schema = Schema::new(vec![Column::new("name\" TEXT); DROP TABLE x; --", ColumnType::Text)]);
        let err = Store::open_in_memory("people", &schema).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));

        let err = Store::open_in_memory("people; DROP", &people_schema()).unwrap_err();
        assert!(matches!(err, StoreError::InvalidIdentifier(_)));
    }
}
