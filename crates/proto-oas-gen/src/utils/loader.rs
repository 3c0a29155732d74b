use std::path::Path;

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};
use tokio::io::AsyncReadExt;

use crate::descriptor::DescriptorPool;

/// Input path that selects standard input.
pub const STDIN_PATH: &str = "-";

enum Source {
  Mapped(AsyncMmapFile),
  Buffered(Vec<u8>),
}

/// Raw bytes of a protojson descriptor set, memory-mapped when read from a file.
pub struct DescriptorLoader {
  source: Source,
}

impl DescriptorLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    if path == Path::new(STDIN_PATH) {
      let mut buffer = vec![];
      tokio::io::stdin()
        .read_to_end(&mut buffer)
        .await
        .context("read descriptor set from stdin")?;
      return Ok(Self::from_bytes(buffer));
    }

    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("open descriptor set {}", path.display()))?;
    Ok(Self {
      source: Source::Mapped(file),
    })
  }

  pub fn from_bytes(bytes: Vec<u8>) -> Self {
    Self {
      source: Source::Buffered(bytes),
    }
  }

  pub fn as_slice(&self) -> &[u8] {
    match &self.source {
      Source::Mapped(file) => file.as_slice(),
      Source::Buffered(bytes) => bytes,
    }
  }

  pub fn parse(&self) -> anyhow::Result<DescriptorPool> {
    DescriptorPool::from_json(self.as_slice())
  }
}
