//! Seed import: build a fresh table from a comma-separated text file. The
//! first record lists column names, every later record one row. Each column's
//! storage type is inferred from the values observed in it, and an existing
//! database file for the same name is destructively replaced.

use std::fs;
use std::io;
use std::path::Path;

use csv::ReaderBuilder;
use thiserror::Error;

use crate::db::{Store, StoreError};
use crate::models::{Column, ColumnType, Schema};

/// Failures while bootstrapping a table from a seed file. `Empty` and
/// `Format` are raised before the old database file is touched, so a bad seed
/// source never destroys existing data.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("seed file is empty or has no header line")]
    Empty,

    #[error("malformed seed data: {0}")]
    Format(#[from] csv::Error),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Read `dir/name.csv`, infer a schema, and (re)create `dir/name.db` with one
/// table holding every seed row in source order.
pub fn seed_database(dir: &Path, name: &str) -> Result<(), SeedError> {
    let seed_file = dir.join(format!("{name}.csv"));
    let (columns, rows) = read_seed_file(&seed_file)?;

    let types = infer_column_types(columns.len(), &rows);
    let schema = Schema::new(
        columns
            .into_iter()
            .zip(types)
            .map(|(name, ty)| Column::new(name, ty))
            .collect(),
    );

    // The source parsed cleanly; only now is the old database file at risk.
    let db_file = dir.join(format!("{name}.db"));
    if db_file.is_file() {
        fs::remove_file(&db_file)?;
    }

    let store = Store::open(dir, name, Some(&schema))?;
    for row in &rows {
        store.insert(row)?;
    }
    store.close()?;
    Ok(())
}

/// Split the file into a header (column names, lowercased so they are usable
/// as SQL identifiers regardless of how the file capitalizes them) and the
/// data rows. The reader is strict about field counts, so ragged rows surface
/// as a format error here.
fn read_seed_file(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), SeedError> {
    let mut reader = ReaderBuilder::new().has_headers(false).from_path(path)?;

    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    if rows.is_empty() {
        return Err(SeedError::Empty);
    }

    let header: Vec<String> = rows
        .remove(0)
        .iter()
        .map(|name| name.trim().to_lowercase())
        .collect();
    if header.iter().all(String::is_empty) {
        return Err(SeedError::Empty);
    }
    Ok((header, rows))
}

/// Per-column type inference, least-restrictive-wins: a single non-numeric
/// value forces the whole column to TEXT, a single fractional value forces an
/// otherwise-integer column to REAL. Columns with no data default to TEXT.
fn infer_column_types(column_count: usize, rows: &[Vec<String>]) -> Vec<ColumnType> {
    if rows.is_empty() {
        return vec![ColumnType::Text; column_count];
    }

    let mut types = vec![ColumnType::Integer; column_count];
    for row in rows {
        for (ty, value) in types.iter_mut().zip(row) {
            *ty = widen(*ty, classify(value));
        }
    }
    types
}

/// Classify one field: integer parse first, then real, then text.
fn classify(value: &str) -> ColumnType {
    let trimmed = value.trim();
    if trimmed.parse::<i64>().is_ok() {
        ColumnType::Integer
    } else if trimmed.parse::<f64>().is_ok() {
        ColumnType::Real
    } else {
        ColumnType::Text
    }
}

fn widen(current: ColumnType, observed: ColumnType) -> ColumnType {
    match (current, observed) {
        (ColumnType::Text, _) | (_, ColumnType::Text) => ColumnType::Text,
        (ColumnType::Real, _) | (_, ColumnType::Real) => ColumnType::Real,
        _ => ColumnType::Integer,
    }
}
