// Preview formats: parse office documents into renderable forms

pub mod docx;
mod docx_html;
mod docx_styles;
pub mod error;
pub mod html;
pub mod sheet_html;
pub mod xlsx;

pub use docx::{convert_to_html, Conversion};
pub use error::FormatError;
pub use sheet_html::{SheetTheme, SheetView};
pub use xlsx::{parse_workbook, parse_workbook_with_limits, ParseLimits};
