// Core types shared by the parsers, the record store client and the control

pub mod codec;
pub mod grid;
pub mod handle;
pub mod mime;

pub use codec::DecodeError;
pub use grid::{column_label, CellValue, Sheet, SheetGrid};
pub use handle::FileHandle;
pub use mime::PreviewKind;
