use std::path::Path;

use rust_xlsxwriter::{Table, Workbook};

use crate::fleet::arrears::error::Result;
use crate::fleet::arrears::model::{FIELD_COUNT, FieldKey, OutputRow};

/// Name of the single sheet written by [`write_records`].
pub const RECORDS_SHEET: &str = "Records";

/// Writes extracted records to `path`: a header row with the canonical field
/// names followed by one row per record, wrapped in an autofilter table.
pub fn write_records(path: &Path, rows: &[OutputRow]) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(RECORDS_SHEET)?;

    for (col_idx, key) in FieldKey::ALL.iter().enumerate() {
        worksheet.write_string(0, col_idx as u16, key.as_str())?;
    }

    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.values().iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            worksheet.write_string((row_idx + 1) as u32, col_idx as u16, value)?;
        }
    }

    let mut table = Table::new();
    table.set_autofilter(true);
    let col_end = (FIELD_COUNT as u16).saturating_sub(1);
    // A table needs at least one data row, even when it stays blank.
    let row_end = rows.len().max(1) as u32;
    worksheet.add_table(0, 0, row_end, col_end, &table)?;

    workbook.save(path)?;
    Ok(())
}
