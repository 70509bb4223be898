// src/trigger.rs

use crate::{client::ApiClient, error::*, utils};
use async_trait::async_trait;
use futures::StreamExt;
use log::{debug, info};
use std::{fs, io::Write, path::{Path, PathBuf}, sync::Arc};

/// Turns a completed server-side file name into a local file.
#[async_trait]
pub trait DownloadTrigger: Send + Sync {
    async fn trigger(&self, file_name: &str) -> AppResult<()>;
}

/// Fetches `/downloads/<name>` and saves it into the output directory.
pub struct FileSaver {
    client: Arc<ApiClient>,
    output_dir: PathBuf,
}

impl FileSaver {
    pub fn new(client: Arc<ApiClient>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Streams into a temp file next to the target so a failed transfer never leaves a partial file.
    pub async fn save(&self, file_name: &str) -> AppResult<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let target = utils::secure_join_path(
            &self.output_dir,
            Path::new(&utils::sanitize_filename(file_name)),
        )?;

        let res = self.client.fetch_file(file_name).await?;
        let mut temp = tempfile::NamedTempFile::new_in(&self.output_dir)?;
        let mut written: u64 = 0;
        let mut stream = res.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            temp.write_all(&chunk)?;
            written += chunk.len() as u64;
        }
        temp.flush()?;
        temp.persist(&target)?;

        debug!("wrote {} bytes to {}", written, target.display());
        Ok(target)
    }
}

#[async_trait]
impl DownloadTrigger for FileSaver {
    async fn trigger(&self, file_name: &str) -> AppResult<()> {
        let path = self.save(file_name).await?;
        info!("saved '{}' to {}", file_name, path.display());
        Ok(())
    }
}
