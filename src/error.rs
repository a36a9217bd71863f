use std::path::PathBuf;
use thiserror::Error;

/// Reasons a workbook cannot be turned into a dataset.
///
/// Any of these blocks rendering: the dashboard shows the message instead of
/// partial tables.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read workbook {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to open workbook: {0}")]
    Workbook(#[from] calamine::XlsxError),

    #[error("sheet '{sheet}' not found in workbook")]
    MissingSheet { sheet: String },

    #[error("failed to read sheet '{sheet}': {message}")]
    Sheet { sheet: String, message: String },

    #[error("sheet '{sheet}' has no header row")]
    EmptySheet { sheet: String },

    #[error("sheet '{sheet}' is missing column '{column}'")]
    MissingColumn { sheet: String, column: String },
}
