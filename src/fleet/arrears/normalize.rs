//! Per-row value cleaning and validation.

use crate::fleet::arrears::fields::FieldDictionary;
use crate::fleet::arrears::header::ColumnMap;
use crate::fleet::arrears::model::{FieldKey, OutputRow, Record};

/// Reads the mapped cells of `row` into a [`Record`], applying the cleaning
/// rule of each field. Cells past the end of a short row read as empty, and
/// empty cells leave their field absent.
pub fn build_record(row: &[String], columns: &ColumnMap) -> Record {
    let mut record = Record::new();
    for (key, column) in columns.iter() {
        let raw = row.get(column).map(String::as_str).unwrap_or_default();
        if raw.is_empty() {
            continue;
        }
        record.set(key, normalize_value(key, raw));
    }
    record
}

/// Cleans a single non-empty cell for the given field.
pub fn normalize_value(key: FieldKey, raw: &str) -> String {
    let trimmed = raw.trim();
    match key {
        FieldKey::Plate => normalize_plate(trimmed),
        FieldKey::Balance => normalize_balance(trimmed),
        _ => trimmed.to_string(),
    }
}

/// Drops all whitespace from a plate number, after the same comma to dot
/// substitution applied to amounts.
pub fn normalize_plate(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect()
}

/// Rewrites decimal commas as dots and, when the result is a finite number,
/// rounds it half away from zero to a whole number. Text that does not parse
/// is returned with only the comma substitution applied.
pub fn normalize_balance(text: &str) -> String {
    let dotted = text.trim().replace(',', ".");
    match dotted.parse::<f64>() {
        Ok(amount) if amount.is_finite() => format!("{:.0}", amount.round()),
        _ => dotted,
    }
}

/// Normalizes one data row and returns it only when the dictionary's required
/// field ended up non-empty.
pub fn normalize_row(
    row: &[String],
    columns: &ColumnMap,
    dictionary: &FieldDictionary<'_>,
) -> Option<OutputRow> {
    let record = build_record(row, columns);
    let required = dictionary.required_key()?;
    record
        .has_value(required)
        .then(|| record.into_output_row())
}
