//! Reading declaration units from scanned files.
//!
//! Each file holds one JSON-encoded [`DeclarationUnit`]. Files are decoded in
//! parallel; results keep the scan order.

use crate::error::{CliResult, ParseError};
use crate::scanner::DeclarationFile;
use grpc_bridge::model::DeclarationUnit;
use rayon::prelude::*;
use std::path::Path;

/// A decoded unit together with the file it came from.
#[derive(Debug, Clone)]
pub struct ParsedUnit {
    pub file: std::path::PathBuf,
    pub unit: DeclarationUnit,
}

/// Parser for declaration unit files.
#[derive(Debug, Default)]
pub struct DeclarationParser;

impl DeclarationParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode one file.
    pub fn parse_file(&self, file: &DeclarationFile) -> Result<ParsedUnit, ParseError> {
        let unit = self.parse_source(&file.content, &file.path)?;
        Ok(ParsedUnit {
            file: file.path.clone(),
            unit,
        })
    }

    /// Decode declaration JSON attributed to `path`.
    pub fn parse_source(&self, content: &str, path: &Path) -> Result<DeclarationUnit, ParseError> {
        serde_json::from_str(content).map_err(|e| ParseError::syntax(path.to_path_buf(), &e))
    }

    /// Decode every file, collecting failures instead of stopping at the first.
    pub fn parse_files(&self, files: &[DeclarationFile]) -> (Vec<ParsedUnit>, Vec<ParseError>) {
        let results: Vec<_> = files.par_iter().map(|file| self.parse_file(file)).collect();

        let mut units = Vec::with_capacity(results.len());
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(unit) => units.push(unit),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping declaration file");
                    errors.push(e);
                }
            }
        }
        (units, errors)
    }

    /// Decode every file, failing if any of them is invalid.
    pub fn parse_all(&self, files: &[DeclarationFile]) -> CliResult<Vec<DeclarationUnit>> {
        let (units, mut errors) = self.parse_files(files);
        match errors.len() {
            0 => Ok(units.into_iter().map(|parsed| parsed.unit).collect()),
            1 => Err(errors.remove(0).into()),
            _ => Err(ParseError::Multiple(errors).into()),
        }
    }
}
