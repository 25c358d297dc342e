// Row-level coercions shared by the normalizers. Never fail: malformed or
// missing cells fall back to zero.

use pongboard_core::CsvRow;

pub(crate) fn float_or_zero(row: &CsvRow, column: &str) -> f64 {
    row.get(column).and_then(|v| v.as_float()).unwrap_or(0.0)
}

pub(crate) fn int_or_zero(row: &CsvRow, column: &str) -> i64 {
    row.get(column).and_then(|v| v.as_int()).unwrap_or(0)
}

/// Integer clamped into `u32` (negative values become 0).
pub(crate) fn count_or_zero(row: &CsvRow, column: &str) -> u32 {
    u32::try_from(int_or_zero(row, column).max(0)).unwrap_or(u32::MAX)
}
