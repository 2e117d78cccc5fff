//! Loading of attribute matrices from delimited tabular data.
//!
//! The input has no header row, one row per individual and one column per category. Every cell
//! must be `0` or `1`. Blank lines are skipped and cells are trimmed. Malformed input is rejected
//! as a whole, before anything could be donated.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use thiserror::Error;

use crate::matrix::{AttributeMatrix, InvalidInputError};

#[derive(Debug, Error)]
/// Errors related to loading attribute matrices.
pub enum LoadError {
    #[error("failed to read attributes: {0}")]
    Io(#[from] io::Error),

    #[error("line {line}, column {col}: {value:?} is not a number")]
    Parse {
        line: usize,
        col: usize,
        value: String,
    },

    #[error("invalid attributes: {0}")]
    Invalid(#[from] InvalidInputError),
}

/// Reads an attribute matrix from `reader`, with cells separated by `delimiter`.
///
/// # Errors
/// Fails if reading fails, if a cell is not a number or if the rows are ragged or non-binary.
pub fn read_attributes<R: BufRead>(
    reader: R,
    delimiter: char,
) -> Result<AttributeMatrix, LoadError> {
    let mut rows = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split(delimiter)
            .enumerate()
            .map(|(col, cell)| {
                let cell = cell.trim();
                cell.parse::<f64>().map_err(|_| LoadError::Parse {
                    line: index + 1,
                    col: col + 1,
                    value: cell.to_string(),
                })
            })
            .collect::<Result<Vec<f64>, _>>()?;
        rows.push(row);
    }

    let attribute = AttributeMatrix::new(&rows)?;
    debug!(
        population = attribute.population(),
        categories = attribute.categories(),
        "read attributes"
    );
    Ok(attribute)
}

/// Loads an attribute matrix from the file at `path`, with cells separated by `delimiter`.
///
/// # Errors
/// Fails if the file can't be opened or its contents are invalid, see [`read_attributes()`].
pub fn load_attributes(
    path: impl AsRef<Path>,
    delimiter: char,
) -> Result<AttributeMatrix, LoadError> {
    let file = File::open(path.as_ref())?;
    read_attributes(BufReader::new(file), delimiter)
}
