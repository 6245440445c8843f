//! In-memory CSV table and the read-only queries dataset agents run on it.

use std::cmp::Ordering;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 50;
const HEAD_ROWS: usize = 5;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} has no header row")]
    Empty(String),
    #[error("{source_name} line {line}: expected at most {expected} fields, found {found}")]
    Ragged {
        source_name: String,
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("{0}: unterminated quoted field")]
    UnterminatedQuote(String),
    #[error("unknown column '{column}'; available columns: {available}")]
    UnknownColumn { column: String, available: String },
}

#[derive(Debug, Clone)]
pub struct Table {
    source_name: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TableError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(name, &content)
    }

    pub fn parse(source_name: impl Into<String>, content: &str) -> Result<Self, TableError> {
        let source_name = source_name.into();
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut records = split_records(content)
            .map_err(|_| TableError::UnterminatedQuote(source_name.clone()))?
            .into_iter();
        let headers: Vec<String> = match records.next() {
            Some((_, fields)) => fields.into_iter().map(|h| h.trim().to_string()).collect(),
            None => return Err(TableError::Empty(source_name)),
        };

        let mut rows = Vec::new();
        for (line, mut fields) in records {
            if fields.len() > headers.len() {
                return Err(TableError::Ragged {
                    source_name,
                    line,
                    expected: headers.len(),
                    found: fields.len(),
                });
            }
            fields.resize(headers.len(), String::new());
            rows.push(fields);
        }

        Ok(Self {
            source_name,
            headers,
            rows,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Case-insensitive lookup on trimmed column names.
    pub fn column_index(&self, column: &str) -> Result<usize, TableError> {
        let wanted = column.trim();
        self.headers
            .iter()
            .position(|h| h.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| TableError::UnknownColumn {
                column: wanted.to_string(),
                available: self.headers.join(", "),
            })
    }

    pub fn head(&self, n: usize) -> String {
        let rows: Vec<&Vec<String>> = self.rows.iter().take(n).collect();
        self.render(&rows)
    }

    pub fn describe(&self) -> String {
        format!(
            "File: {}\nRows: {}\nColumns: {}\nFirst rows:\n{}",
            self.source_name,
            self.rows.len(),
            self.headers.join(", "),
            self.head(HEAD_ROWS)
        )
    }

    /// Rows ordered by `column`. Cells that read as numbers sort numerically
    /// and come before the rest, which sort as text.
    pub fn sort_rows(
        &self,
        column: &str,
        descending: bool,
        limit: Option<usize>,
    ) -> Result<String, TableError> {
        let idx = self.column_index(column)?;
        let mut rows: Vec<&Vec<String>> = self.rows.iter().collect();
        rows.sort_by(|a, b| {
            let ordering = compare_cells(&a[idx], &b[idx]);
            match (parse_number(&a[idx]).is_some(), parse_number(&b[idx]).is_some()) {
                (true, true) | (false, false) if descending => ordering.reverse(),
                _ => ordering,
            }
        });
        rows.truncate(clamp_limit(limit));
        Ok(self.render(&rows))
    }

    pub fn filter_rows(
        &self,
        column: &str,
        contains: &str,
        limit: Option<usize>,
    ) -> Result<String, TableError> {
        let idx = self.column_index(column)?;
        let needle = contains.to_lowercase();
        let matching: Vec<&Vec<String>> = self
            .rows
            .iter()
            .filter(|row| row[idx].to_lowercase().contains(&needle))
            .collect();
        let total = matching.len();
        let shown: Vec<&Vec<String>> = matching.into_iter().take(clamp_limit(limit)).collect();
        Ok(format!(
            "{} matching rows (showing {})\n{}",
            total,
            shown.len(),
            self.render(&shown)
        ))
    }

    pub fn column_stats(&self, column: &str) -> Result<String, TableError> {
        let idx = self.column_index(column)?;
        let values: Vec<f64> = self
            .rows
            .iter()
            .filter_map(|row| parse_number(&row[idx]))
            .collect();

        let mut out = format!(
            "Column: {}\nCount: {}\nNumeric: {}",
            self.headers[idx],
            self.rows.len(),
            values.len()
        );
        if !values.is_empty() {
            let sum: f64 = values.iter().sum();
            let min = values.iter().copied().fold(f64::INFINITY, f64::min);
            let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let _ = write!(
                out,
                "\nSum: {}\nMin: {}\nMax: {}\nMean: {}",
                sum,
                min,
                max,
                sum / values.len() as f64
            );
        }
        Ok(out)
    }

    fn render(&self, rows: &[&Vec<String>]) -> String {
        let mut out = self.headers.join(" | ");
        for row in rows {
            out.push('\n');
            out.push_str(&row.join(" | "));
        }
        out
    }
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn compare_cells(a: &str, b: &str) -> Ordering {
    match (parse_number(a), parse_number(b)) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.trim().to_lowercase().cmp(&b.trim().to_lowercase()),
    }
}

/// Reads the leading number of a cell, ignoring thousands separators,
/// currency symbols and trailing units ("37.08 million" -> 37.08).
pub fn parse_number(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | '$' | '€' | '£'))
        .collect();
    let end = cleaned
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && c == '-')))
        .map(|(i, _)| i)
        .unwrap_or(cleaned.len());
    cleaned[..end].parse().ok()
}

/// Splits CSV content into records, each tagged with the line it starts on.
/// Handles quoted fields with embedded commas, newlines and `""` escapes.
fn split_records(content: &str) -> Result<Vec<(usize, Vec<String>)>, ()> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    current.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            '\n' if in_quotes => {
                current.push('\n');
                line += 1;
            }
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes && chars.peek() == Some(&'\n') => {}
            '\n' => {
                fields.push(std::mem::take(&mut current));
                push_record(&mut records, record_line, std::mem::take(&mut fields));
                line += 1;
                record_line = line;
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        return Err(());
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        push_record(&mut records, record_line, fields);
    }
    Ok(records)
}

fn push_record(records: &mut Vec<(usize, Vec<String>)>, line: usize, fields: Vec<String>) {
    let blank = fields.iter().all(|f| f.trim().is_empty());
    if !blank {
        records.push((line, fields));
    }
}
