// src/pipeline/localize.rs

use std::path::{Path, PathBuf};

use tracing::info;

use crate::changes::FileSet;
use crate::errors::Result;
use crate::fs::{join_rel, stream_copy};
use crate::pipeline::pool::run_bounded;

/// Streams localisation files into the source staging root unchanged.
#[derive(Debug, Clone, Copy)]
pub struct LocalizationCopier {
    concurrency: usize,
}

impl LocalizationCopier {
    pub fn new(concurrency: usize) -> Self {
        Self { concurrency }
    }

    /// Copy every file of `files` from `from` to the same relative path
    /// under `to`. All copies settle before the first error (if any) is
    /// returned; every error is fatal.
    pub async fn run(&self, files: &FileSet, from: &Path, to: &Path) -> Result<usize> {
        let jobs: Vec<(PathBuf, PathBuf)> = files
            .files
            .iter()
            .map(|rel| (join_rel(from, rel), join_rel(to, rel)))
            .collect();
        let total = jobs.len();

        let results = run_bounded(jobs, self.concurrency, |(src, dst)| async move {
            stream_copy(&src, &dst).await
        })
        .await?;

        for res in results {
            res?;
        }

        info!(files = total, "localisation files copied");
        Ok(total)
    }
}
