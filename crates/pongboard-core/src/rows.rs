// Header-keyed CSV rows and the body parser that produces them.

use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ParseError;
use crate::scalar::Scalar;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// One data line of a CSV file, keyed by the header row.
///
/// The header list is shared by every row of a parse. Cells are matched to
/// headers by position: a short line simply lacks its trailing keys, and cells
/// beyond the last header are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    headers: Arc<[String]>,
    cells: Vec<Scalar>,
}

impl CsvRow {
    pub fn new(headers: Arc<[String]>, mut cells: Vec<Scalar>) -> Self {
        cells.truncate(headers.len());
        Self { headers, cells }
    }

    /// Build a standalone row from `(column, raw cell)` pairs. Cells go
    /// through the same decoding as parsed ones.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let (headers, cells): (Vec<String>, Vec<Scalar>) = pairs
            .into_iter()
            .map(|(column, raw)| (column.to_string(), Scalar::parse_cell(raw)))
            .unzip();
        Self::new(headers.into(), cells)
    }

    /// Cell for `column`. With duplicate header names the last one wins.
    pub fn get(&self, column: &str) -> Option<&Scalar> {
        self.iter()
            .filter(|(name, _)| *name == column)
            .last()
            .map(|(_, value)| value)
    }

    /// Cell rendered as text; absent columns read as the empty string.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(Scalar::to_text).unwrap_or_default()
    }

    /// Present columns in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Scalar)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.cells.iter())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl Serialize for CsvRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (column, value) in self.iter() {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// Parse a CSV body whose first line is the header row.
///
/// Blank lines are skipped, a leading UTF-8 BOM is ignored, and every cell is
/// decoded with [`Scalar::parse_cell`]. Fails when there is no header row or
/// the body is not valid UTF-8 CSV.
pub fn parse_csv(body: &[u8]) -> Result<Vec<CsvRow>, ParseError> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);

    let headers: Arc<[String]> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.iter().all(|name| name.trim().is_empty()) {
        return Err(ParseError::MissingHeader);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let cells = record.iter().map(Scalar::parse_cell).collect();
        rows.push(CsvRow::new(Arc::clone(&headers), cells));
    }
    Ok(rows)
}
