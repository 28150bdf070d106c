use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::fleet::arrears::error::{ExtractError, Result};
use crate::fleet::arrears::io::excel_read::is_supported_extension;

/// A submitted file copied under a unique name for the duration of one
/// extraction. The copy is removed when the value is dropped, whatever the
/// outcome of the extraction.
#[derive(Debug)]
pub struct StagedFile {
    path: PathBuf,
}

impl StagedFile {
    /// Streams `reader` into `<dir>/upload-<uuid>.<extension>`.
    pub fn from_reader<R: Read>(reader: &mut R, dir: &Path, extension: &str) -> Result<Self> {
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        if !is_supported_extension(&extension) {
            return Err(ExtractError::UnsupportedExtension(extension));
        }
        fs::create_dir_all(dir)?;

        let path = dir.join(format!("upload-{}.{extension}", Uuid::new_v4()));
        let mut file = OpenOptions::new().write(true).create_new(true).open(&path)?;
        // Owns the path from here so a failed copy still cleans up. The handle
        // is closed before the guard drops: open files cannot be removed on
        // every platform.
        let staged = Self { path };
        let bytes = write_all_from(reader, file)?;
        debug!(path = %staged.path.display(), bytes, "input staged");
        Ok(staged)
    }

    /// Stages a copy of an existing file, taking the declared extension from
    /// `extension` or, failing that, from the file name.
    pub fn copy_of(source: &Path, dir: &Path, extension: Option<&str>) -> Result<Self> {
        if !source.exists() {
            return Err(ExtractError::MissingInput(source.to_path_buf()));
        }
        let extension = match extension {
            Some(extension) => extension.to_string(),
            None => source
                .extension()
                .and_then(|extension| extension.to_str())
                .unwrap_or_default()
                .to_string(),
        };
        let mut input = File::open(source)?;
        Self::from_reader(&mut input, dir, &extension)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Copies `reader` into `file` and syncs it; `file` is closed on return,
/// whether or not the copy succeeded.
fn write_all_from<R: Read>(reader: &mut R, mut file: File) -> io::Result<u64> {
    let bytes = io::copy(reader, &mut file)?;
    file.sync_all()?;
    Ok(bytes)
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if let Err(error) = fs::remove_file(&self.path) {
            if error.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), %error, "failed to remove staged file");
            }
        }
    }
}
