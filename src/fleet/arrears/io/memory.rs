use crate::fleet::arrears::error::{ExtractError, Result};
use crate::fleet::arrears::io::{RowIter, WorkbookSource};

/// Workbook whose sheets are already decoded into rows of text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryWorkbook {
    sheets: Vec<MemorySheet>,
}

/// A named, fully materialized sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySheet {
    pub name: String,
    pub rows: Vec<Vec<String>>,
}

impl MemoryWorkbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a sheet after the existing ones.
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Vec<String>>) -> Self {
        self.sheets.push(MemorySheet {
            name: name.into(),
            rows,
        });
        self
    }

    pub fn sheets(&self) -> &[MemorySheet] {
        &self.sheets
    }

    fn sheet(&self, name: &str) -> Option<&MemorySheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

impl WorkbookSource for MemoryWorkbook {
    fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|sheet| sheet.name.clone()).collect()
    }

    fn rows(&mut self, name: &str) -> Result<RowIter<'_>> {
        let sheet = self.sheet(name).ok_or_else(|| ExtractError::SheetRead {
            sheet: name.to_string(),
            reason: "sheet not found".into(),
        })?;
        Ok(Box::new(sheet.rows.iter().cloned()))
    }
}
