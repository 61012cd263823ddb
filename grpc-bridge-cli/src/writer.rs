//! Writing the generated schema to disk.
//!
//! The schema lands in `<output>/proto/<class_name>.proto`. An existing file at
//! that path is left alone unless the writer is told to overwrite.

use crate::error::{CliResult, WriteError};
use std::path::{Path, PathBuf};

/// Directory under the output root holding schema files.
pub const PROTO_DIR: &str = "proto";

/// Schema file path for a target class name.
pub fn output_path(output_dir: &Path, class_name: &str) -> PathBuf {
    output_dir.join(PROTO_DIR).join(format!("{class_name}.proto"))
}

/// Result of a write operation.
#[derive(Debug)]
pub enum WriteResult {
    /// File was written.
    Written { path: PathBuf, bytes: usize },

    /// Dry run; nothing touched the disk.
    DryRun { content: String, path: PathBuf },

    /// A file already existed at the path and was kept.
    Unchanged { path: PathBuf },
}

/// File writer with dry-run support.
#[derive(Debug)]
pub struct FileWriter {
    dry_run: bool,
    overwrite: bool,
}

impl FileWriter {
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            overwrite: false,
        }
    }

    /// Replace files that already exist instead of keeping them.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    pub fn write(&self, path: &Path, content: &str) -> CliResult<WriteResult> {
        if self.dry_run {
            return Ok(WriteResult::DryRun {
                content: content.to_string(),
                path: path.to_path_buf(),
            });
        }

        if path.exists() && !self.overwrite {
            tracing::info!(path = %path.display(), "schema already exists, leaving it in place");
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| WriteError::CreateDir {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        std::fs::write(path, content).map_err(|e| WriteError::WriteFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        Ok(WriteResult::Written {
            path: path.to_path_buf(),
            bytes: content.len(),
        })
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path, .. }
            | WriteResult::DryRun { path, .. }
            | WriteResult::Unchanged { path } => path,
        }
    }

    pub fn was_written(&self) -> bool {
        matches!(self, WriteResult::Written { .. })
    }

    /// Bytes written; 0 unless the file was written.
    pub fn bytes(&self) -> usize {
        match self {
            WriteResult::Written { bytes, .. } => *bytes,
            WriteResult::DryRun { .. } | WriteResult::Unchanged { .. } => 0,
        }
    }
}
