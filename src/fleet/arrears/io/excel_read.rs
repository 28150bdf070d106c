use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use calamine::{DataType, Range, Reader, Sheets, open_workbook_auto};
use chrono::{NaiveDateTime, NaiveTime};
use tracing::debug;

use crate::fleet::arrears::error::{ExtractError, Result};
use crate::fleet::arrears::io::{RowIter, WorkbookSource};

/// File extensions the spreadsheet reader understands.
pub const SUPPORTED_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xla", "xls", "ods"];

/// Whether `extension` (without the dot, any case) names a readable format.
pub fn is_supported_extension(extension: &str) -> bool {
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(extension))
}

/// Spreadsheet file opened through calamine. The container format is chosen
/// from the file extension.
pub struct CalamineWorkbook {
    workbook: Sheets<BufReader<File>>,
}

impl CalamineWorkbook {
    /// Opens a workbook; any failure here is fatal for the whole file.
    pub fn open(path: &Path) -> Result<Self> {
        let workbook = open_workbook_auto(path).map_err(|source| ExtractError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { workbook })
    }
}

impl WorkbookSource for CalamineWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.workbook.sheet_names().to_vec()
    }

    fn rows(&mut self, sheet: &str) -> Result<RowIter<'_>> {
        let range = self
            .workbook
            .worksheet_range(sheet)
            .ok_or_else(|| ExtractError::SheetRead {
                sheet: sheet.to_string(),
                reason: "sheet not found".into(),
            })?
            .map_err(|error| ExtractError::SheetRead {
                sheet: sheet.to_string(),
                reason: error.to_string(),
            })?;
        debug!(sheet, size = ?range.get_size(), start = ?range.start(), "sheet range loaded");
        Ok(Box::new(RangeRows::new(range)))
    }
}

/// Lazily yields the rows of a range in absolute sheet coordinates.
///
/// calamine trims a range to its first used cell, so the blank rows and
/// columns before it are re-inserted as empty cells.
struct RangeRows {
    range: Range<DataType>,
    blank_rows: usize,
    blank_columns: usize,
    next_row: usize,
}

impl RangeRows {
    fn new(range: Range<DataType>) -> Self {
        let (blank_rows, blank_columns) = range
            .start()
            .map(|(row, column)| (row as usize, column as usize))
            .unwrap_or_default();
        Self {
            range,
            blank_rows,
            blank_columns,
            next_row: 0,
        }
    }
}

impl Iterator for RangeRows {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.blank_rows > 0 {
            self.blank_rows -= 1;
            return Some(Vec::new());
        }
        let (height, width) = self.range.get_size();
        if self.next_row >= height {
            return None;
        }
        let row_index = self.next_row;
        self.next_row += 1;

        let mut cells = vec![String::new(); self.blank_columns];
        cells.extend((0..width).map(|column| cell_to_string(self.range.get((row_index, column)))));
        Some(cells)
    }
}

pub(crate) fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(cell @ DataType::DateTime(serial)) => match cell.as_datetime() {
            Some(datetime) => format_datetime(*serial, datetime),
            None => serial.to_string(),
        },
        Some(DataType::DateTimeIso(value) | DataType::DurationIso(value)) => value.clone(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Renders a date-formatted cell the way a spreadsheet shows it: serials
/// below one are a time of day, whole days drop the midnight time.
fn format_datetime(serial: f64, datetime: NaiveDateTime) -> String {
    if serial < 1.0 {
        datetime.format("%H:%M:%S").to_string()
    } else if datetime.time() == NaiveTime::MIN {
        datetime.format("%Y-%m-%d").to_string()
    } else {
        datetime.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
