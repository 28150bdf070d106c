use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::fleet::arrears::error::{ExtractError, Result};
use crate::fleet::arrears::extract::{
    ExtractOptions, WorkbookExtraction, extract_workbook_detailed,
};
use crate::fleet::arrears::fields::FieldDictionary;
use crate::fleet::arrears::io::excel_read::CalamineWorkbook;
use crate::fleet::arrears::io::excel_write;
use crate::fleet::arrears::io::staging::StagedFile;
use crate::fleet::arrears::model::OutputRow;

/// Encoding of the extracted record table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON array of nine-string arrays.
    Json { pretty: bool },
    /// Single-sheet xlsx workbook.
    Xlsx,
}

/// Extracts records from a workbook on disk with the standard dictionary.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn extract_file(input: &Path, options: ExtractOptions) -> Result<WorkbookExtraction> {
    let mut workbook = CalamineWorkbook::open(input)?;
    let extraction = extract_workbook_detailed(&mut workbook, FieldDictionary::standard(), options);
    info!(records = extraction.rows.len(), "records extracted");
    Ok(extraction)
}

/// Stages submitted bytes under a unique name in `staging_dir`, extracts
/// them, and removes the staged copy again on every path out.
#[instrument(
    level = "info",
    skip_all,
    fields(extension = %extension, staging_dir = %staging_dir.display())
)]
pub fn extract_upload<R: Read>(
    reader: &mut R,
    extension: &str,
    staging_dir: &Path,
    options: ExtractOptions,
) -> Result<WorkbookExtraction> {
    let staged = StagedFile::from_reader(reader, staging_dir, extension)?;
    extract_file(staged.path(), options)
}

/// Same as [`extract_upload`] for a file that already exists on disk.
#[instrument(level = "info", skip_all, fields(input = %input.display()))]
pub fn extract_copy(
    input: &Path,
    extension: Option<&str>,
    staging_dir: &Path,
    options: ExtractOptions,
) -> Result<WorkbookExtraction> {
    let staged = StagedFile::copy_of(input, staging_dir, extension)?;
    extract_file(staged.path(), options)
}

/// Turns an empty extraction into [`ExtractError::NoData`].
pub fn require_records(extraction: WorkbookExtraction) -> Result<Vec<OutputRow>> {
    if extraction.rows.is_empty() {
        debug!(sheets = ?extraction.sheets, "no sheet produced records");
        return Err(ExtractError::NoData);
    }
    Ok(extraction.rows)
}

/// Serializes records as JSON into `writer`.
pub fn write_json<W: Write>(writer: W, rows: &[OutputRow], pretty: bool) -> Result<()> {
    let mut writer = BufWriter::new(writer);
    if pretty {
        serde_json::to_writer_pretty(&mut writer, rows)?;
    } else {
        serde_json::to_writer(&mut writer, rows)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Writes records to `output` in the requested format.
#[instrument(
    level = "info",
    skip_all,
    fields(output = %output.display(), records = rows.len(), ?format)
)]
pub fn write_records(output: &Path, rows: &[OutputRow], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json { pretty } => write_json(File::create(output)?, rows, pretty),
        OutputFormat::Xlsx => excel_write::write_records(output, rows),
    }
}
