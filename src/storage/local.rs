use super::Storage;
use async_trait::async_trait;
use bytes::Bytes;
use eyre::eyre;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Mirrors the bucket layout into a directory on disk.
#[derive(Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: &Path) -> Self {
        LocalStorage {
            root: root.to_owned(),
        }
    }

    fn target_for(&self, destination: &str) -> eyre::Result<PathBuf> {
        let relative = Path::new(destination);
        let is_plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if destination.is_empty() || !is_plain {
            return Err(eyre!("Refusing to write outside {}: {}", self.root.display(), destination));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, destination: &str, data: Bytes) -> eyre::Result<()> {
        let target = self.target_for(destination)?;

        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent).await {
                return Err(eyre!(
                    "Could not create directory {} with error: {}",
                    parent.display(),
                    e
                ));
            }
        }

        match fs::write(&target, &data).await {
            Ok(_) => Ok(()),
            Err(e) => Err(eyre!(
                "Could not upload file {} to {} with error: {}",
                destination,
                self.root.display(),
                e
            )),
        }
    }

    fn location(&self) -> String {
        format!("file://{}", self.root.display())
    }
}
