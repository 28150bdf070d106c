//! Adapters between the extraction engine and the outside world: workbook
//! sources, result writers, and staging of submitted files.

pub mod excel_read;
pub mod excel_write;
pub mod memory;
pub mod staging;

use crate::fleet::arrears::error::Result;

/// Forward-only stream of rows, each an ordered list of cell texts.
pub type RowIter<'a> = Box<dyn Iterator<Item = Vec<String>> + 'a>;

/// A workbook whose sheets can be read one at a time as text rows.
///
/// Cells are already decoded: numbers and dates arrive stringified, empty
/// cells as empty strings.
pub trait WorkbookSource {
    /// Sheet names in the order their rows should be concatenated.
    fn sheet_names(&self) -> Vec<String>;

    /// Opens the rows of one sheet. Failing here skips only that sheet.
    fn rows(&mut self, sheet: &str) -> Result<RowIter<'_>>;
}
