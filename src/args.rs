use std::path::PathBuf;

use clap::Parser;

/// Uploads today's CSV reports to the Firebase storage bucket.
///
/// Every option falls back to its environment variable when omitted.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Credential set to use: production or development [env: FIREBASE_ENVIRONMENT]
    #[arg(short, long)]
    pub environment: Option<String>,

    /// Target bucket, defaults to the project's Firebase bucket [env: FIREBASE_STORAGE_BUCKET]
    #[arg(short, long)]
    pub bucket: Option<String>,

    /// Directory holding the generated reports [env: REPORTS_DIR]
    #[arg(short, long)]
    pub reports_dir: Option<PathBuf>,

    /// Glob matched against file names in the reports directory [env: REPORTS_PATTERN]
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Copy into this local directory instead of the bucket
    #[arg(long)]
    pub local_target: Option<PathBuf>,
}

impl Cli {
    pub fn parse_arguments() -> Self {
        Cli::parse()
    }
}
