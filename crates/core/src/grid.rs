//! Sheet grids produced by the tabular parser.
//!
//! A `SheetGrid` is transient: it is built for one preview and dropped when
//! the preview closes. Rows may be ragged; the first row's width is the
//! canonical column count for rendering.

/// A raw cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl CellValue {
    /// True for values a preview shows as a blank cell:
    /// empty, zero-length text, zero, NaN and `false`.
    pub fn is_falsy(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(n) => *n == 0.0 || n.is_nan(),
            CellValue::Bool(b) => !*b,
        }
    }

    /// Display text for a preview cell. Falsy values display as "".
    pub fn display(&self) -> String {
        if self.is_falsy() {
            return String::new();
        }
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(_) => "true".to_string(),
        }
    }
}

/// Format a number like JavaScript's `String(n)`: shortest round-trip
/// digits, integers without a decimal point, exponent form from 1e21 up
/// and below 1e-6.
fn format_number(n: f64) -> String {
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let abs = n.abs();
    if abs >= 1e21 || (abs != 0.0 && abs < 1e-6) {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }
    format!("{}", n)
}

/// One named sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<CellValue>>,
    /// Set when parse limits cut rows or columns off this sheet
    pub truncated: bool,
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
            truncated: false,
        }
    }

    /// Canonical column count: the width of the first row.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, |row| row.len())
    }

    /// Cells of `row` padded with empties or truncated to [`Sheet::width`].
    pub fn row_cells(&self, row: usize) -> impl Iterator<Item = &CellValue> + '_ {
        const EMPTY: &CellValue = &CellValue::Empty;
        let cells = self.rows.get(row).map(Vec::as_slice).unwrap_or(&[]);
        (0..self.width()).map(move |col| cells.get(col).unwrap_or(EMPTY))
    }
}

/// Ordered sheets of a workbook, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SheetGrid {
    sheets: Vec<Sheet>,
}

impl SheetGrid {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|s| s.name.as_str())
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn first(&self) -> Option<&Sheet> {
        self.sheets.first()
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Spreadsheet column label for a 0-based index: A..Z, then AA, AB, ...
pub fn column_label(index: usize) -> String {
    let mut result = String::new();
    let mut n = index;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}
