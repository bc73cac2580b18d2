use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::results::{ResultRow, REQUIRED_COLUMNS};

/// Loads the rows of a parameter estimation results table from a CSV file.
///
/// The file has to provide at least the columns listed in [`REQUIRED_COLUMNS`]; any
/// additional columns are ignored. Empty `interpolator_method` cells are read as
/// absent.
///
/// # Arguments
///
/// * `path` - Path to the CSV file
///
/// # Returns
///
/// Returns a `Result` containing either:
/// * `Ok(Vec<ResultRow>)` - All rows in file order
/// * `Err(IOError)` - An error that occurred while reading or parsing the file
///
/// # Errors
///
/// This function will return an error if:
/// * The file does not exist (`IOError::FileNotFound`)
/// * A required column is missing from the header (`IOError::MissingColumn`)
/// * A row cannot be parsed into a [`ResultRow`] (`IOError::Csv`)
pub fn load_results(path: impl Into<PathBuf>) -> Result<Vec<ResultRow>, IOError> {
    let path = path.into();
    if !path.is_file() {
        return Err(IOError::FileNotFound { path });
    }

    let mut reader = csv::Reader::from_path(&path)?;
    let headers = reader.headers()?.clone();

    if let Some(column) = REQUIRED_COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|header| header.trim() == **column))
    {
        return Err(IOError::MissingColumn {
            column: column.to_string(),
            path,
        });
    }

    let rows = reader
        .deserialize::<ResultRow>()
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("Loaded {} result rows from {}", rows.len(), path.display());

    Ok(rows)
}

/// Writes a rendered document to a file, replacing any existing content.
///
/// # Arguments
///
/// * `path` - Destination file
/// * `content` - Text to write
pub fn write_document(path: impl AsRef<Path>, content: &str) -> Result<(), IOError> {
    let path = path.as_ref();
    std::fs::write(path, content).map_err(|source| IOError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a whole text file, reporting a missing file as [`IOError::FileNotFound`].
pub fn read_text(path: impl AsRef<Path>) -> Result<String, IOError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(IOError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    Ok(std::fs::read_to_string(path)?)
}

/// Represents errors that can occur while reading inputs or writing outputs.
#[derive(Error, Debug)]
pub enum IOError {
    /// The input file does not exist. Processing stops before anything is written.
    #[error("The file '{}' was not found.", .path.display())]
    FileNotFound { path: PathBuf },

    /// The results table lacks one of the required columns.
    #[error("Missing required column '{column}' in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// The CSV content could not be parsed.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// An output file could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
