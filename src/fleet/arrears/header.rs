//! Header row detection.
//!
//! Sheets often start with titles, report dates, or blank lines before the
//! real header. The resolver walks a bounded window of leading rows and
//! accepts the first one that looks like a header for the field dictionary.

use tracing::trace;

use crate::fleet::arrears::fields::{FieldDictionary, clean_header_cell};
use crate::fleet::arrears::model::{FIELD_COUNT, FieldKey};

/// Default number of leading rows searched for a header.
pub const DEFAULT_HEADER_WINDOW: usize = 10;

/// Number of distinct matched fields that makes a row a header even when the
/// required field is missing from it.
pub const MIN_MATCHED_FIELDS: usize = 3;

/// Canonical field -> zero-based column index within one sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    columns: [Option<usize>; FIELD_COUNT],
}

impl ColumnMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: FieldKey) -> Option<usize> {
        self.columns[key.index()]
    }

    pub fn contains(&self, key: FieldKey) -> bool {
        self.get(key).is_some()
    }

    /// Records the column for `key` unless one is already known. Returns
    /// whether the entry was added.
    pub fn insert_first(&mut self, key: FieldKey, column: usize) -> bool {
        let slot = &mut self.columns[key.index()];
        if slot.is_some() {
            return false;
        }
        *slot = Some(column);
        true
    }

    /// Number of mapped fields.
    pub fn len(&self) -> usize {
        self.columns.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Mapped `(key, column)` pairs in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, usize)> + '_ {
        FieldKey::ALL
            .iter()
            .filter_map(|key| self.get(*key).map(|column| (*key, column)))
    }
}

/// A header row accepted by the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHeader {
    /// Zero-based index of the header row within the sheet.
    pub row_index: usize,
    pub columns: ColumnMap,
}

/// Outcome of feeding one row to [`HeaderResolver::step`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderStep {
    /// The row is the header.
    Accepted(ResolvedHeader),
    /// The row is not a header; more rows fit in the window.
    Rejected,
    /// The row was not a header and the window is used up, or the window
    /// was already used up before this row.
    Exhausted,
}

/// Matches every non-empty cell of `row` against the dictionary. For each key
/// the first matching cell wins; later cells naming the same key are ignored.
pub fn match_header_row(row: &[String], dictionary: &FieldDictionary<'_>) -> ColumnMap {
    let mut columns = ColumnMap::new();
    for (column, cell) in row.iter().enumerate() {
        if cell.is_empty() {
            continue;
        }
        let cleaned = clean_header_cell(cell);
        for key in dictionary.matching_fields(&cleaned) {
            columns.insert_first(key, column);
        }
    }
    columns
}

/// A candidate row is a header when it names the required field or at least
/// [`MIN_MATCHED_FIELDS`] distinct fields.
pub fn accepts(columns: &ColumnMap, dictionary: &FieldDictionary<'_>) -> bool {
    let has_required = dictionary
        .required_key()
        .is_some_and(|key| columns.contains(key));
    has_required || columns.len() >= MIN_MATCHED_FIELDS
}

/// Incremental header search over the leading rows of one sheet.
#[derive(Debug)]
pub struct HeaderResolver<'d> {
    dictionary: &'d FieldDictionary<'d>,
    window: usize,
    scanned: usize,
}

impl<'d> HeaderResolver<'d> {
    pub fn new(dictionary: &'d FieldDictionary<'d>, window: usize) -> Self {
        Self {
            dictionary,
            window,
            scanned: 0,
        }
    }

    /// Rows examined so far.
    pub fn scanned(&self) -> usize {
        self.scanned
    }

    pub fn is_exhausted(&self) -> bool {
        self.scanned >= self.window
    }

    /// Examines the next row of the sheet.
    pub fn step(&mut self, row: &[String]) -> HeaderStep {
        if self.is_exhausted() {
            return HeaderStep::Exhausted;
        }
        let row_index = self.scanned;
        self.scanned += 1;

        let columns = match_header_row(row, self.dictionary);
        if accepts(&columns, self.dictionary) {
            return HeaderStep::Accepted(ResolvedHeader { row_index, columns });
        }
        trace!(row_index, matched = columns.len(), "row rejected as header");
        if self.is_exhausted() {
            HeaderStep::Exhausted
        } else {
            HeaderStep::Rejected
        }
    }
}

/// Searches the first `window` rows for a header.
pub fn resolve_header<I, R>(
    rows: I,
    dictionary: &FieldDictionary<'_>,
    window: usize,
) -> Option<ResolvedHeader>
where
    I: IntoIterator<Item = R>,
    R: AsRef<[String]>,
{
    let mut resolver = HeaderResolver::new(dictionary, window);
    for row in rows {
        match resolver.step(row.as_ref()) {
            HeaderStep::Accepted(header) => return Some(header),
            HeaderStep::Rejected => continue,
            HeaderStep::Exhausted => return None,
        }
    }
    None
}
