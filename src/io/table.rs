//! Two-column `age value` textual tables (§6): the age-to-depth user file
//! and the sea-level file share this exact shape, differing only in what
//! the caller does with the resulting points. The age-to-depth file's
//! column indices are caller-configurable (§6); other callers use the
//! default `(0, 1)` pair via [`parse_two_column`]/[`parse_two_column_file`].

use std::path::Path;

use crate::error::PaleoError;

/// Parse a two-column whitespace-separated table, one `(age, value)` pair
/// per line, reading fields `age_col`/`value_col` (0-indexed) out of each
/// row. Blank lines and lines starting with `#` are skipped.
pub fn parse_two_column_with_columns(
    source: &str,
    age_col: usize,
    value_col: usize,
) -> Result<Vec<(f64, f64)>, PaleoError> {
    let min_fields = age_col.max(value_col) + 1;
    let mut points = Vec::new();
    for (lineno, raw_line) in source.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < min_fields {
            return Err(PaleoError::BadInputFormat {
                path: Default::default(),
                line: lineno + 1,
                message: format!(
                    "expected at least {min_fields} whitespace-separated fields, got {}",
                    fields.len()
                ),
            });
        }
        let age = parse_field(fields[age_col], lineno + 1)?;
        let value = parse_field(fields[value_col], lineno + 1)?;
        points.push((age, value));
    }
    Ok(points)
}

/// [`parse_two_column_with_columns`] reading the conventional `(0, 1)`
/// column pair.
pub fn parse_two_column(source: &str) -> Result<Vec<(f64, f64)>, PaleoError> {
    parse_two_column_with_columns(source, 0, 1)
}

/// Parse a two-column table from a file, reading fields `age_col`/
/// `value_col` out of each row and attaching the path to any parse error
/// for a caller-facing diagnostic.
pub fn parse_two_column_file_with_columns(
    path: &Path,
    age_col: usize,
    value_col: usize,
) -> Result<Vec<(f64, f64)>, PaleoError> {
    let contents = std::fs::read_to_string(path).map_err(|e| PaleoError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_two_column_with_columns(&contents, age_col, value_col).map_err(|e| with_path(e, path))
}

/// [`parse_two_column_file_with_columns`] reading the conventional `(0, 1)`
/// column pair.
pub fn parse_two_column_file(path: &Path) -> Result<Vec<(f64, f64)>, PaleoError> {
    parse_two_column_file_with_columns(path, 0, 1)
}

fn with_path(e: PaleoError, path: &Path) -> PaleoError {
    match e {
        PaleoError::BadInputFormat { line, message, .. } => PaleoError::BadInputFormat {
            path: path.to_path_buf(),
            line,
            message,
        },
        other => other,
    }
}

fn parse_field(field: &str, lineno: usize) -> Result<f64, PaleoError> {
    field.parse::<f64>().map_err(|_| PaleoError::BadInputFormat {
        path: Default::default(),
        line: lineno,
        message: format!("could not parse '{field}' as a number"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_basic_table() {
        let text = "0 2600\n20 3800\n# comment\n\n100 5300\n";
        let points = parse_two_column(text).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[1], (20.0, 3800.0));
    }

    #[test]
    fn rejects_malformed_row() {
        let text = "0 2600\nbad_row\n";
        assert!(parse_two_column(text).is_err());
    }

    #[test]
    fn reads_configurable_column_indices() {
        let text = "site-a 0 2600 stub\nsite-a 20 3800 stub\n";
        let points = parse_two_column_with_columns(text, 1, 2).unwrap();
        assert_eq!(points, vec![(0.0, 2600.0), (20.0, 3800.0)]);
    }
}
