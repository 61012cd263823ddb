//! Discovery of declaration unit files.
//!
//! Walks the input directory for `*.json` declaration units, respecting
//! `.gitignore` and an optional glob filter. Results are sorted by relative
//! path so a run sees its units in the same order every time.

use crate::error::{CliResult, ScanError};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

/// Extension of declaration unit files.
pub const DECLARATION_EXTENSION: &str = "json";

/// A discovered declaration file with its content.
#[derive(Debug, Clone)]
pub struct DeclarationFile {
    /// Absolute path to the file.
    pub path: PathBuf,

    /// Path relative to the scan root.
    pub relative_path: PathBuf,

    /// File content.
    pub content: String,
}

/// Scanner for declaration unit files.
#[derive(Debug)]
pub struct DeclarationScanner {
    root: PathBuf,
    respect_gitignore: bool,
    filter: Option<glob::Pattern>,
}

impl DeclarationScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            respect_gitignore: true,
            filter: None,
        }
    }

    pub fn with_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Only keep files whose relative path matches `pattern`.
    pub fn with_filter(mut self, pattern: &str) -> Result<Self, ScanError> {
        let glob_pattern = glob::Pattern::new(pattern)
            .map_err(|e| ScanError::invalid_pattern(pattern, e.to_string()))?;
        self.filter = Some(glob_pattern);
        Ok(self)
    }

    /// Scan the root and return every declaration file, sorted by relative path.
    pub fn scan(&self) -> CliResult<Vec<DeclarationFile>> {
        if !self.root.is_dir() {
            return Err(ScanError::not_found(self.root.clone()).into());
        }

        let walker = WalkBuilder::new(&self.root)
            .git_ignore(self.respect_gitignore)
            .git_global(self.respect_gitignore)
            .git_exclude(self.respect_gitignore)
            .hidden(false)
            .build();

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(ScanError::Walk)?;
            let path = entry.path();

            if !path.is_file() || path.extension().map_or(true, |ext| ext != DECLARATION_EXTENSION) {
                continue;
            }

            let relative_path = self.relative_path(path);
            if let Some(ref pattern) = self.filter {
                if !pattern.matches_path(&relative_path) {
                    continue;
                }
            }

            let content = std::fs::read_to_string(path).map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

            files.push(DeclarationFile {
                path: path.to_path_buf(),
                relative_path,
                content,
            });
        }

        if files.is_empty() {
            return Err(ScanError::no_declaration_files(self.root.clone()).into());
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        tracing::debug!(root = %self.root.display(), files = files.len(), "scanned declarations");
        Ok(files)
    }

    /// Like [`scan`](Self::scan), but an empty directory is not an error.
    pub fn scan_allow_empty(&self) -> CliResult<Vec<DeclarationFile>> {
        match self.scan() {
            Ok(files) => Ok(files),
            Err(crate::error::CliError::Scan(ScanError::NoDeclarationFiles { .. })) => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_dir() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("resource.json"), r#"{"classes":[]}"#).unwrap();
        fs::create_dir_all(dir.path().join("model/nested")).unwrap();
        fs::write(dir.path().join("model/b.json"), r#"{"classes":[]}"#).unwrap();
        fs::write(dir.path().join("model/nested/a.json"), r#"{"classes":[]}"#).unwrap();
        fs::write(dir.path().join("README.md"), "# Declarations").unwrap();
        dir
    }

    fn relative(files: &[DeclarationFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.relative_path.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_scan_finds_json_files_in_order() {
        let dir = create_test_dir();
        let files = DeclarationScanner::new(dir.path()).scan().unwrap();

        assert_eq!(
            relative(&files),
            vec!["model/b.json", "model/nested/a.json", "resource.json"]
        );
        assert_eq!(files[2].content, r#"{"classes":[]}"#);
    }

    #[test]
    fn test_scan_with_filter() {
        let dir = create_test_dir();
        let files = DeclarationScanner::new(dir.path())
            .with_filter("model/**/*.json")
            .unwrap()
            .scan()
            .unwrap();

        assert_eq!(relative(&files), vec!["model/b.json", "model/nested/a.json"]);
    }

    #[test]
    fn test_invalid_filter() {
        let result = DeclarationScanner::new(".").with_filter("[");
        assert!(matches!(result, Err(ScanError::InvalidPattern { .. })));
    }

    #[test]
    fn test_scan_nonexistent_directory() {
        let result = DeclarationScanner::new("/nonexistent/declarations").scan();
        assert!(matches!(
            result,
            Err(CliError::Scan(ScanError::DirectoryNotFound { .. }))
        ));
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = TempDir::new().unwrap();
        let scanner = DeclarationScanner::new(dir.path());

        assert!(matches!(
            scanner.scan(),
            Err(CliError::Scan(ScanError::NoDeclarationFiles { .. }))
        ));
        assert!(scanner.scan_allow_empty().unwrap().is_empty());
    }
}
