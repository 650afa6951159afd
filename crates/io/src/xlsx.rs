// Spreadsheet import for preview (xlsx, xlsm, xlsb, xls, ods)
//
// Import is one-way: the workbook becomes a SheetGrid of raw cell values.
// Formulas, styles and merges are not carried; cached values are.

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use filedock_core::{CellValue, Sheet, SheetGrid};

use crate::error::FormatError;

/// Default row cap for a previewed sheet
pub const DEFAULT_MAX_ROWS: usize = 10_000;
/// Default column cap for a previewed sheet (A..ZZ)
pub const DEFAULT_MAX_COLS: usize = 702;

/// Size caps applied per sheet while parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_rows: usize,
    pub max_cols: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            max_cols: DEFAULT_MAX_COLS,
        }
    }
}

/// Parse a spreadsheet buffer with default limits.
pub fn parse_workbook(bytes: &[u8]) -> Result<SheetGrid, FormatError> {
    parse_workbook_with_limits(bytes, ParseLimits::default())
}

/// Parse a spreadsheet buffer into sheets in source order.
///
/// Rows are projected from A1 so a sheet whose data starts at C3 keeps its
/// two leading empty rows and columns. A sheet whose range cannot be read
/// comes back empty rather than failing the whole workbook.
pub fn parse_workbook_with_limits(bytes: &[u8], limits: ParseLimits) -> Result<SheetGrid, FormatError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| FormatError::UnsupportedFormat(format!("Failed to open workbook: {}", e)))?;

    let sheet_names: Vec<String> = workbook.sheet_names().to_vec();
    let mut sheets = Vec::with_capacity(sheet_names.len());

    for name in sheet_names {
        match workbook.worksheet_range(&name) {
            Ok(range) => sheets.push(project_sheet(&name, &range, limits)),
            Err(e) => {
                log::warn!("Failed to read sheet '{}': {}", name, e);
                sheets.push(Sheet::new(name, Vec::new()));
            }
        }
    }

    Ok(SheetGrid::new(sheets))
}

fn project_sheet(name: &str, range: &Range<Data>, limits: ParseLimits) -> Sheet {
    let mut sheet = Sheet::new(name, Vec::new());

    let Some((end_row, end_col)) = range.end() else {
        return sheet;
    };
    if range.is_empty() {
        return sheet;
    }

    let height = end_row as usize + 1;
    let width = end_col as usize + 1;
    let rows = height.min(limits.max_rows);
    let cols = width.min(limits.max_cols);
    sheet.truncated = rows < height || cols < width;

    sheet.rows = (0..rows)
        .map(|r| {
            (0..cols)
                .map(|c| {
                    range
                        .get_value((r as u32, c as u32))
                        .map(to_cell_value)
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    trim_header_row(&mut sheet.rows);
    sheet
}

/// The first row's length is the sheet's column count, so the first row
/// ends at its last non-empty cell. A blank first row keeps the used-range
/// width; the renderer cuts later rows to whatever width remains.
fn trim_header_row(rows: &mut [Vec<CellValue>]) {
    let Some(header) = rows.first_mut() else {
        return;
    };
    if let Some(last) = header.iter().rposition(|cell| *cell != CellValue::Empty) {
        header.truncate(last + 1);
    }
}

fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(n) => CellValue::Number(*n),
        Data::Int(n) => CellValue::Number(*n as f64),
        Data::Bool(b) => CellValue::Bool(*b),
        // Dates stay serial numbers, as a worksheet stores them
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) => CellValue::Text(s.clone()),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet_html::SheetView;
    use rust_xlsxwriter::Workbook;

    fn two_sheet_workbook() -> Vec<u8> {
        let mut workbook = Workbook::new();

        let q1 = workbook.add_worksheet();
        q1.set_name("Q1").unwrap();
        q1.write_string(0, 0, "Region").unwrap();
        q1.write_string(0, 1, "Sales").unwrap();
        q1.write_string(1, 0, "North").unwrap();
        q1.write_number(1, 1, 1200.0).unwrap();

        let q2 = workbook.add_worksheet();
        q2.set_name("Q2").unwrap();
        q2.write_string(0, 0, "Region").unwrap();
        q2.write_string(0, 1, "Sales").unwrap();
        q2.write_string(1, 0, "South").unwrap();
        q2.write_boolean(1, 1, true).unwrap();

        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_parse_preserves_sheet_order() {
        let grid = parse_workbook(&two_sheet_workbook()).unwrap();
        let names: Vec<_> = grid.sheet_names().collect();
        assert_eq!(names, vec!["Q1", "Q2"]);
    }

    #[test]
    fn test_parse_cell_values() {
        let grid = parse_workbook(&two_sheet_workbook()).unwrap();

        let q1 = grid.sheet("Q1").unwrap();
        assert_eq!(q1.rows.len(), 2);
        assert_eq!(q1.width(), 2);
        assert_eq!(q1.rows[0][0], CellValue::Text("Region".into()));
        assert_eq!(q1.rows[1][1], CellValue::Number(1200.0));

        let q2 = grid.sheet("Q2").unwrap();
        assert_eq!(q2.rows[1][1], CellValue::Bool(true));
    }

    #[test]
    fn test_parse_projects_from_a1() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 2, "late start").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let grid = parse_workbook(&bytes).unwrap();
        let sheet = grid.first().unwrap();
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.width(), 3);
        assert_eq!(sheet.rows[0][0], CellValue::Empty);
        assert_eq!(sheet.rows[2][2], CellValue::Text("late start".into()));
    }

    #[test]
    fn test_header_row_sets_column_count() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "h1").unwrap();
        sheet.write_string(0, 1, "h2").unwrap();
        sheet.write_string(1, 0, "a").unwrap();
        sheet.write_string(1, 1, "b").unwrap();
        sheet.write_string(1, 2, "extra").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let grid = parse_workbook(&bytes).unwrap();
        let sheet = grid.first().unwrap();
        assert_eq!(sheet.width(), 2);
        assert_eq!(sheet.row_cells(1).count(), 2);

        let html = SheetView::default().render(&grid, &sheet.name);
        assert!(html.contains(">B</th>"));
        assert!(!html.contains(">C</th>"));
        assert!(!html.contains("extra"));
    }

    #[test]
    fn test_parse_applies_limits() {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for r in 0..5u32 {
            for c in 0..4u16 {
                sheet.write_number(r, c, (r * 10 + c as u32) as f64).unwrap();
            }
        }
        let bytes = workbook.save_to_buffer().unwrap();

        let grid = parse_workbook_with_limits(&bytes, ParseLimits { max_rows: 3, max_cols: 2 }).unwrap();
        let sheet = grid.first().unwrap();
        assert!(sheet.truncated);
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.width(), 2);
        assert_eq!(sheet.rows[2][1], CellValue::Number(21.0));
    }

    #[test]
    fn test_empty_sheet_has_no_rows() {
        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("Blank").unwrap();
        let bytes = workbook.save_to_buffer().unwrap();

        let grid = parse_workbook(&bytes).unwrap();
        let sheet = grid.sheet("Blank").unwrap();
        assert!(sheet.rows.is_empty());
        assert!(!sheet.truncated);
    }

    #[test]
    fn test_garbage_is_unsupported() {
        let err = parse_workbook(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_empty_buffer_is_unsupported() {
        assert!(matches!(parse_workbook(&[]), Err(FormatError::UnsupportedFormat(_))));
    }
}
