use std::path::PathBuf;

use anyhow::Context;
use tokio::sync::Mutex;

/// Writes generated files into one directory. Writes are serialized so
/// concurrent producers never interleave on the file system.
#[derive(Debug)]
pub struct OutputSink {
  dir: PathBuf,
  lock: Mutex<()>,
}

impl OutputSink {
  pub async fn create(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
    let dir = dir.into();
    tokio::fs::create_dir_all(&dir)
      .await
      .with_context(|| format!("create output directory {}", dir.display()))?;
    Ok(Self {
      dir,
      lock: Mutex::new(()),
    })
  }

  pub fn path_for(&self, file_name: &str) -> PathBuf {
    self.dir.join(file_name)
  }

  /// Writes `contents` to `file_name` inside the sink directory and returns the full path.
  pub async fn write(&self, file_name: &str, contents: String) -> anyhow::Result<PathBuf> {
    let _guard = self.lock.lock().await;
    let path = self.path_for(file_name);
    tokio::fs::write(&path, contents)
      .await
      .with_context(|| format!("write {}", path.display()))?;
    Ok(path)
  }
}
