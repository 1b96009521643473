//! On-disk fallback for receipts that could not reach a printer.
//!
//! Each receipt lands as a timestamped `.txt` in the spool directory so
//! the collector can re-issue or hand-copy it later.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use crate::error::PrintError;

use super::FallbackSurface;

/// Writes rendered receipt text into a spool directory.
#[derive(Debug, Clone)]
pub struct SpoolFallback {
    dir: PathBuf,
}

impl SpoolFallback {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_path(&self) -> PathBuf {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S%.3f");
        self.dir.join(format!("ticket-{}.txt", stamp))
    }
}

impl FallbackSurface for SpoolFallback {
    fn present(&mut self, text: &str) -> Result<(), PrintError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| PrintError::fallback(format!("create spool dir: {}", e)))?;
        let path = self.next_path();
        fs::write(&path, text)
            .map_err(|e| PrintError::fallback(format!("write {}: {}", path.display(), e)))?;
        info!(path = %path.display(), "receipt spooled to disk");
        Ok(())
    }
}
