#![cfg(not(tarpaulin_include))]

use okr_monitor::Settings;
use okr_monitor::app;
use std::env;

/// Main entry point for the web dashboard
///
/// Optional positional arguments: the default workbook path and the bind
/// address. Log verbosity follows `RUST_LOG` (default `info`).
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let settings = Settings::from_args(&args);

    println!(
        "Starting dashboard for {} on http://{}",
        settings.workbook_path.display(),
        settings.bind_addr
    );
    app::run(settings).await
}
