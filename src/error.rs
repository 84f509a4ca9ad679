use std::path::PathBuf;

use thiserror::Error;

/// Startup failures. Any of these aborts the process before a file is read.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Environment variable {name} is not set")]
    MissingVar { name: String },

    #[error("Environment variable {name} is not valid base64: {source}")]
    InvalidBase64 {
        name: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("Environment variable {name} does not decode to UTF-8 text")]
    InvalidUtf8 { name: String },

    #[error("Environment variable {name} does not hold a service account JSON: {source}")]
    InvalidJson {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Credential in {name} is not usable: {message}")]
    InvalidCredential { name: String, message: String },

    #[error("No environment selected, set FIREBASE_ENVIRONMENT or pass --environment")]
    MissingEnvironment,

    #[error("Unknown environment '{value}', expected production or development")]
    UnknownEnvironment { value: String },

    #[error("Invalid report pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Failed to create storage client for bucket '{bucket}': {message}")]
    StorageClient { bucket: String, message: String },
}

/// Per-file upload failures. These are collected into the batch report.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path {} has no usable file name", path.display())]
    InvalidPath { path: PathBuf },

    #[error("Upload to {destination} failed: {message}")]
    Storage {
        destination: String,
        message: String,
    },
}
