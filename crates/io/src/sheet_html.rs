//! Tabbed sheet view.
//!
//! Renders one sheet of a [`SheetGrid`] as a spreadsheet-style table with
//! lettered column headers and numbered rows, under a strip of sheet tabs.
//! Output is a pure function of the grid, the active sheet name and the
//! theme, so switching away from a sheet and back reproduces it exactly.

use std::fmt::Write as _;

use filedock_core::{column_label, Sheet, SheetGrid};

use crate::html::{escape_attr, escape_text};

/// Element id of the tab strip
pub const TABS_ID: &str = "sheet-tabs";
/// Element id of the container holding the rendered table
pub const CONTENT_ID: &str = "sheet-content";
/// Element id of the rendered table
pub const TABLE_ID: &str = "excel-preview-table";

/// Presentation styling applied inline on every render.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTheme {
    pub font_family: String,
    pub header_background: String,
    pub grid_border: String,
    pub tab_border: String,
    pub active_tab_background: String,
    pub inactive_tab_background: String,
}

impl Default for SheetTheme {
    fn default() -> Self {
        Self {
            font_family: "Calibri, Arial, sans-serif".to_string(),
            header_background: "#f0f0f0".to_string(),
            grid_border: "#d0d0d0".to_string(),
            tab_border: "#ccc".to_string(),
            active_tab_background: "#e0e0e0".to_string(),
            inactive_tab_background: "#f9f9f9".to_string(),
        }
    }
}

/// Renders sheet grids with a fixed theme.
#[derive(Debug, Clone, Default)]
pub struct SheetView {
    theme: SheetTheme,
}

impl SheetView {
    pub fn new(theme: SheetTheme) -> Self {
        Self { theme }
    }

    pub fn theme(&self) -> &SheetTheme {
        &self.theme
    }

    /// Render the tab strip and the `active` sheet. An unknown `active`
    /// name falls back to the first sheet.
    pub fn render(&self, grid: &SheetGrid, active: &str) -> String {
        let Some(sheet) = grid.sheet(active).or_else(|| grid.first()) else {
            return "<p>Workbook contains no sheets</p>".to_string();
        };

        let mut out = String::new();
        self.write_tabs(&mut out, grid, &sheet.name);
        let _ = write!(out, "<div id=\"{}\">", CONTENT_ID);
        self.write_table(&mut out, sheet);
        if sheet.truncated {
            out.push_str("<p class=\"sheet-truncated\">Sheet truncated for preview</p>");
        }
        out.push_str("</div>");
        out
    }

    fn write_tabs(&self, out: &mut String, grid: &SheetGrid, active: &str) {
        let _ = write!(out, "<div id=\"{}\" style=\"margin-bottom: 10px;\">", TABS_ID);
        for name in grid.sheet_names() {
            let is_active = name == active;
            let background = if is_active {
                &self.theme.active_tab_background
            } else {
                &self.theme.inactive_tab_background
            };
            let _ = write!(
                out,
                "<button type=\"button\" class=\"sheet-tab{}\" data-sheet=\"{}\" \
                 style=\"margin-right: 5px; padding: 5px 10px; cursor: pointer; border: 1px solid {}; background-color: {};\">{}</button>",
                if is_active { " active" } else { "" },
                escape_attr(name),
                escape_attr(&self.theme.tab_border),
                escape_attr(background),
                escape_text(name),
            );
        }
        out.push_str("</div>");
    }

    fn write_table(&self, out: &mut String, sheet: &Sheet) {
        let header_style = format!(
            "background-color: {}; border: 1px solid {}; padding: 5px; text-align: center; font-weight: bold;",
            self.theme.header_background, self.theme.grid_border
        );
        let header_style = escape_attr(&header_style);
        let cell_style = escape_attr(&format!("border: 1px solid {}; padding: 5px;", self.theme.grid_border));

        let _ = write!(
            out,
            "<table id=\"{}\" style=\"border-collapse: collapse; width: 100%; table-layout: auto; font-family: {};\">",
            TABLE_ID,
            escape_attr(&self.theme.font_family),
        );

        // Column headers: corner cell, then A, B, C, ...
        let _ = write!(out, "<tr><th style=\"{}\"></th>", header_style);
        for col in 0..sheet.width() {
            let _ = write!(out, "<th style=\"{}\">{}</th>", header_style, column_label(col));
        }
        out.push_str("</tr>");

        for row in 0..sheet.rows.len() {
            let _ = write!(out, "<tr><th style=\"{}\">{}</th>", header_style, row + 1);
            for cell in sheet.row_cells(row) {
                let _ = write!(out, "<td style=\"{}\">{}</td>", cell_style, escape_text(&cell.display()));
            }
            out.push_str("</tr>");
        }

        out.push_str("</table>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedock_core::CellValue;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn quarter_grid() -> SheetGrid {
        SheetGrid::new(vec![
            Sheet::new("Q1", vec![vec![text("a"), text("b")], vec![text("c"), text("d")]]),
            Sheet::new("Q2", vec![vec![text("w"), text("x")], vec![text("y"), text("z")]]),
        ])
    }

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.matches(needle).count()
    }

    #[test]
    fn test_render_tabs_and_active_sheet() {
        let view = SheetView::default();
        let html = view.render(&quarter_grid(), "Q2");

        assert_eq!(count(&html, "class=\"sheet-tab"), 2);
        assert!(html.contains("class=\"sheet-tab active\" data-sheet=\"Q2\""));
        assert!(html.contains("class=\"sheet-tab\" data-sheet=\"Q1\""));
        assert!(html.contains(">w</td>"));
        assert!(!html.contains(">a</td>"));
    }

    #[test]
    fn test_render_headers() {
        let view = SheetView::default();
        let html = view.render(&quarter_grid(), "Q1");

        assert!(html.contains(">A</th>"));
        assert!(html.contains(">B</th>"));
        assert!(!html.contains(">C</th>"));
        assert!(html.contains(">1</th>"));
        assert!(html.contains(">2</th>"));
        assert!(!html.contains(">3</th>"));
    }

    #[test]
    fn test_rows_padded_and_truncated_to_header_width() {
        let grid = SheetGrid::new(vec![Sheet::new(
            "S",
            vec![
                vec![text("h1"), text("h2"), text("h3")],
                vec![text("short")],
                vec![text("1"), text("2"), text("3"), text("overflow")],
            ],
        )]);
        let html = SheetView::default().render(&grid, "S");

        // 3 rows x 3 cells
        assert_eq!(count(&html, "<td "), 9);
        assert!(!html.contains("overflow"));
    }

    #[test]
    fn test_falsy_cells_render_empty() {
        let grid = SheetGrid::new(vec![Sheet::new(
            "S",
            vec![vec![CellValue::Number(0.0), CellValue::Bool(false), CellValue::Number(7.0)]],
        )]);
        let html = SheetView::default().render(&grid, "S");
        assert!(!html.contains(">0</td>"));
        assert!(!html.contains(">false</td>"));
        assert!(html.contains(">7</td>"));
    }

    #[test]
    fn test_cell_text_is_escaped() {
        let grid = SheetGrid::new(vec![Sheet::new("<S>", vec![vec![text("<b>bold</b>")]])]);
        let html = SheetView::default().render(&grid, "<S>");
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
        assert!(html.contains("data-sheet=\"&lt;S&gt;\""));
    }

    #[test]
    fn test_wide_sheet_gets_two_letter_headers() {
        let row: Vec<CellValue> = (0..28).map(|i| CellValue::Number(i as f64 + 1.0)).collect();
        let grid = SheetGrid::new(vec![Sheet::new("Wide", vec![row])]);
        let html = SheetView::default().render(&grid, "Wide");
        assert!(html.contains(">Z</th>"));
        assert!(html.contains(">AA</th>"));
        assert!(html.contains(">AB</th>"));
    }

    #[test]
    fn test_switching_back_is_identical() {
        let view = SheetView::default();
        let grid = quarter_grid();
        let first = view.render(&grid, "Q1");
        let _ = view.render(&grid, "Q2");
        assert_eq!(view.render(&grid, "Q1"), first);
    }

    #[test]
    fn test_unknown_sheet_falls_back_to_first() {
        let view = SheetView::default();
        let grid = quarter_grid();
        assert_eq!(view.render(&grid, "Nope"), view.render(&grid, "Q1"));
    }

    #[test]
    fn test_empty_workbook_message() {
        let html = SheetView::default().render(&SheetGrid::default(), "");
        assert_eq!(html, "<p>Workbook contains no sheets</p>");
    }

    #[test]
    fn test_theme_applied() {
        let theme = SheetTheme {
            font_family: "Consolas".to_string(),
            ..SheetTheme::default()
        };
        let html = SheetView::new(theme).render(&quarter_grid(), "Q1");
        assert!(html.contains("font-family: Consolas;"));
    }
}
