use std::sync::Arc;

use chrono::Local;
use tracing::info;

use crate::args::Cli;
use crate::config::Config;
use storage::gcs::GcsStorage;
use storage::local::LocalStorage;
use storage::Storage;
use uploader::{DailyUploadReport, UploadContext};

mod args;
mod config;
mod credentials;
mod error;
mod storage;
mod uploader;
mod utils;

#[tokio::main(flavor = "current_thread")]
async fn main() -> eyre::Result<()> {
    dotenv::dotenv().ok();
    utils::init_tracing();

    let cli = Cli::parse_arguments();
    let config = Config::from_env(&cli)?;

    let storage: Arc<dyn Storage> = match &config.local_target {
        Some(dir) => {
            info!("Writing reports to local directory {}", dir.display());
            Arc::new(LocalStorage::new(dir))
        }
        None => Arc::new(GcsStorage::from_config(&config)?),
    };

    let context = UploadContext::new(storage, config.reports_dir.clone(), config.pattern.clone());
    let today = Local::now().date_naive();

    let report = context.run_daily_upload(today).await;
    for line in render_report(&report, &context.storage_location()) {
        println!("{}", line);
    }

    Ok(())
}

/// Console lines for a finished run. Per-file failures don't change the exit code.
fn render_report(report: &DailyUploadReport, location: &str) -> Vec<String> {
    match report {
        DailyUploadReport::NoFiles {
            reports_dir,
            pattern,
        } => vec![format!(
            "⚠️ No files matching {} found in {}",
            pattern,
            reports_dir.display()
        )],
        DailyUploadReport::Completed { date, files } => {
            let mut lines = Vec::with_capacity(files.len() + 1);
            for file in files {
                let name = file
                    .local_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.local_path.display().to_string());

                match &file.result {
                    Ok(bytes) => lines.push(format!(
                        "✅ Uploaded {} to {} ({} bytes)",
                        name, file.destination, bytes
                    )),
                    Err(e) => lines.push(format!("❌ Failed to upload {}: {}", name, e)),
                }
            }

            let uploaded = files.iter().filter(|file| file.is_success()).count();
            lines.push(format!(
                "Uploaded {} of {} file(s) for {} to {}",
                uploaded,
                files.len(),
                date,
                location
            ));
            lines
        }
    }
}
