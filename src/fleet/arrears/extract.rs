//! Sheet and workbook extraction drivers.
//!
//! A [`SheetExtractor`] consumes the rows of one sheet in a single forward
//! pass: it looks for the header inside the leading window, then normalizes
//! every later row. [`extract_workbook`] runs a fresh extractor per sheet and
//! concatenates the results in sheet order.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::fleet::arrears::fields::FieldDictionary;
use crate::fleet::arrears::header::{ColumnMap, DEFAULT_HEADER_WINDOW, HeaderResolver, HeaderStep};
use crate::fleet::arrears::io::WorkbookSource;
use crate::fleet::arrears::model::OutputRow;
use crate::fleet::arrears::normalize::normalize_row;

/// Sheets with fewer rows than this never produce records.
pub const DEFAULT_MIN_SHEET_ROWS: usize = 5;

/// Tunables of the extraction engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Leading rows searched for a header before the sheet is given up.
    pub header_window: usize,
    /// Minimum number of rows, header included, a sheet needs to count.
    pub min_sheet_rows: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            header_window: DEFAULT_HEADER_WINDOW,
            min_sheet_rows: DEFAULT_MIN_SHEET_ROWS,
        }
    }
}

/// Where a [`SheetExtractor`] is in its single pass over a sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetState {
    ScanningHeader,
    HeaderResolved,
    Done,
}

/// Single-pass extraction over the rows of one sheet.
#[derive(Debug)]
pub struct SheetExtractor<'d> {
    dictionary: &'d FieldDictionary<'d>,
    options: ExtractOptions,
    resolver: HeaderResolver<'d>,
    state: SheetState,
    columns: ColumnMap,
    header_row: Option<usize>,
    rows_seen: usize,
    rows: Vec<OutputRow>,
}

impl<'d> SheetExtractor<'d> {
    pub fn new(dictionary: &'d FieldDictionary<'d>, options: ExtractOptions) -> Self {
        let state = if options.header_window == 0 {
            SheetState::Done
        } else {
            SheetState::ScanningHeader
        };
        Self {
            dictionary,
            options,
            resolver: HeaderResolver::new(dictionary, options.header_window),
            state,
            columns: ColumnMap::new(),
            header_row: None,
            rows_seen: 0,
            rows: Vec::new(),
        }
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    /// Whether further rows would be ignored.
    pub fn is_done(&self) -> bool {
        self.state == SheetState::Done
    }

    /// Columns of the accepted header; empty until one is found.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Consumes the next row of the sheet.
    pub fn feed(&mut self, row: &[String]) {
        match self.state {
            SheetState::Done => return,
            SheetState::ScanningHeader => match self.resolver.step(row) {
                HeaderStep::Accepted(header) => {
                    debug!(
                        row_index = header.row_index,
                        fields = header.columns.len(),
                        "header row resolved"
                    );
                    self.columns = header.columns;
                    self.header_row = Some(header.row_index);
                    self.state = SheetState::HeaderResolved;
                }
                HeaderStep::Rejected => {}
                HeaderStep::Exhausted => self.state = SheetState::Done,
            },
            SheetState::HeaderResolved => {
                if let Some(output) = normalize_row(row, &self.columns, self.dictionary) {
                    self.rows.push(output);
                }
            }
        }
        self.rows_seen += 1;
    }

    /// Ends the pass. A sheet shorter than the minimum row count yields
    /// nothing, whatever it contained. An exhausted header window is reported
    /// as such even when it is shorter than that minimum.
    pub fn finish(self) -> SheetOutcome {
        let status = match self.header_row {
            None if self.state == SheetState::Done => SheetStatus::NoHeader,
            _ if self.rows_seen < self.options.min_sheet_rows => SheetStatus::TooSmall {
                rows: self.rows_seen,
            },
            None => SheetStatus::NoHeader,
            Some(header_row) => SheetStatus::Extracted {
                header_row,
                records: self.rows.len(),
            },
        };
        let rows = match status {
            SheetStatus::Extracted { .. } => self.rows,
            _ => Vec::new(),
        };
        SheetOutcome { rows, status }
    }
}

/// Result of running one sheet through a [`SheetExtractor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetOutcome {
    pub rows: Vec<OutputRow>,
    pub status: SheetStatus,
}

/// How a sheet contributed to the workbook result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum SheetStatus {
    /// A header was found; `records` rows passed validation.
    #[serde(rename_all = "camelCase")]
    Extracted { header_row: usize, records: usize },
    /// No header inside the search window.
    NoHeader,
    /// Fewer rows than the configured minimum.
    TooSmall { rows: usize },
    /// The sheet could not be read.
    Unreadable { reason: String },
}

/// Per-sheet line of a [`WorkbookExtraction`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetSummary {
    pub sheet: String,
    #[serde(flatten)]
    pub status: SheetStatus,
}

/// Records of a whole workbook plus what happened to each sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookExtraction {
    pub rows: Vec<OutputRow>,
    pub sheets: Vec<SheetSummary>,
}

/// Runs the rows of one sheet through a fresh [`SheetExtractor`]. Iteration
/// stops as soon as the extractor is done, so rows past an unfruitful header
/// window are never pulled from the source.
pub fn extract_sheet<I, R>(
    rows: I,
    dictionary: &FieldDictionary<'_>,
    options: ExtractOptions,
) -> SheetOutcome
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut extractor = SheetExtractor::new(dictionary, options);
    let mut rows = rows.into_iter();
    while !extractor.is_done() {
        let Some(row) = rows.next() else {
            break;
        };
        extractor.feed(row.as_ref());
    }
    extractor.finish()
}

/// Extracts every sheet of `source` and concatenates the records in sheet
/// order.
pub fn extract_workbook<S>(
    source: &mut S,
    dictionary: &FieldDictionary<'_>,
    options: ExtractOptions,
) -> Vec<OutputRow>
where
    S: WorkbookSource + ?Sized,
{
    extract_workbook_detailed(source, dictionary, options).rows
}

/// Like [`extract_workbook`], also reporting the outcome of every sheet.
/// Sheets that fail to read are logged and skipped.
pub fn extract_workbook_detailed<S>(
    source: &mut S,
    dictionary: &FieldDictionary<'_>,
    options: ExtractOptions,
) -> WorkbookExtraction
where
    S: WorkbookSource + ?Sized,
{
    let mut extraction = WorkbookExtraction::default();

    for sheet in source.sheet_names() {
        let status = match source.rows(&sheet) {
            Ok(rows) => {
                let outcome = extract_sheet(rows, dictionary, options);
                extraction.rows.extend(outcome.rows);
                outcome.status
            }
            Err(error) => {
                warn!(sheet = %sheet, %error, "skipping unreadable sheet");
                SheetStatus::Unreadable {
                    reason: error.to_string(),
                }
            }
        };
        debug!(sheet = %sheet, ?status, "sheet processed");
        extraction.sheets.push(SheetSummary { sheet, status });
    }

    info!(
        sheets = extraction.sheets.len(),
        records = extraction.rows.len(),
        "workbook extracted"
    );
    extraction
}
