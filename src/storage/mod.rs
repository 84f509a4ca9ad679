use async_trait::async_trait;
use bytes::Bytes;

pub mod gcs;
pub mod local;

#[async_trait]
pub trait Storage: Send + Sync {
    /// Writes `data` to `destination`, replacing any existing object.
    async fn upload(&self, destination: &str, data: Bytes) -> eyre::Result<()>;

    /// Human readable location used in logs and summaries.
    fn location(&self) -> String;
}
