pub mod columns;
pub mod defaults;
pub mod workbook;

pub use columns::{export_row, COLUMNS, COLUMN_COUNT};
pub use defaults::{number_or_zero, text_or_dash, Cell};
pub use workbook::{bulk_file_name, export_all, export_single, single_file_name, SHEET_NAME};

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("cannot create {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
