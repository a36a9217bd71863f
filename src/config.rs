use std::path::PathBuf;

/// Sample workbook shown when nothing has been uploaded.
pub const DEFAULT_WORKBOOK: &str = "data/MPEA_KRs_KPIs_StreamlitBase.xlsx";
/// Hand-edited column layout.
pub const DEFAULT_LAYOUT: &str = "column_layout.json";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub workbook_path: PathBuf,
    pub layout_path: PathBuf,
    pub bind_addr: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            workbook_path: PathBuf::from(DEFAULT_WORKBOOK),
            layout_path: PathBuf::from(DEFAULT_LAYOUT),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl Settings {
    /// Positional arguments, all optional: `[workbook] [bind address]`.
    /// `args[0]` is the program name.
    pub fn from_args(args: &[String]) -> Self {
        let mut settings = Settings::default();
        if let Some(path) = args.get(1) {
            settings.workbook_path = PathBuf::from(path);
        }
        if let Some(addr) = args.get(2) {
            settings.bind_addr = addr.clone();
        }
        settings
    }
}
