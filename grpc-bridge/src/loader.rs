//! On-demand loading of classes that lie outside the resolved model.
//!
//! Such classes are identified by a search root plus a qualified name and
//! travel through the worklist as a string key `<root>:<qualified name>`.
//! The actual load goes through the [`ClassLoader`] seam; [`JsonClassLoader`]
//! reads `<root>/<a/b/C>.json` files holding a serialized [`ClassModel`].

use crate::error::{GenerateError, GenerateResult, LoadError};
use crate::model::ClassModel;
use std::fmt;
use std::path::{Path, PathBuf};

/// Separator between root and qualified name in a key.
pub const KEY_SEPARATOR: char = ':';

/// Loads a class definition from a search root.
pub trait ClassLoader: Send + Sync {
    /// Load the class, failing with [`LoadError::NotFound`] if absent.
    fn load_class(&self, root: &Path, qualified_name: &str) -> Result<ClassModel, LoadError>;

    /// Check whether the root holds a definition for the class.
    fn has_class(&self, root: &Path, qualified_name: &str) -> bool;
}

/// Loader reading one JSON file per class.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonClassLoader;

impl JsonClassLoader {
    /// Path of the class file for a qualified name under a root.
    pub fn class_path(root: &Path, qualified_name: &str) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in qualified_name.split('.') {
            path.push(segment);
        }
        path.set_extension("json");
        path
    }
}

impl ClassLoader for JsonClassLoader {
    fn load_class(&self, root: &Path, qualified_name: &str) -> Result<ClassModel, LoadError> {
        let path = Self::class_path(root, qualified_name);
        if !path.is_file() {
            return Err(LoadError::not_found(qualified_name, path));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| LoadError::Invalid { path, source: e })
    }

    fn has_class(&self, root: &Path, qualified_name: &str) -> bool {
        Self::class_path(root, qualified_name).is_file()
    }
}

/// A parsed additional-class key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AdditionalKey {
    pub root: PathBuf,
    pub qualified_name: String,
}

impl AdditionalKey {
    pub fn new(root: impl Into<PathBuf>, qualified_name: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            qualified_name: qualified_name.into(),
        }
    }

    /// Parse a `<root>:<qualified name>` key.
    ///
    /// The split happens at the last separator so roots may contain one
    /// (for example a drive letter).
    pub fn parse(key: &str) -> GenerateResult<Self> {
        let (root, name) = key
            .rsplit_once(KEY_SEPARATOR)
            .ok_or_else(|| GenerateError::malformed_key(key))?;
        let (root, name) = (root.trim(), name.trim());
        if root.is_empty() || name.is_empty() {
            return Err(GenerateError::malformed_key(key));
        }
        Ok(Self::new(root, name))
    }
}

impl fmt::Display for AdditionalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.root.display(),
            KEY_SEPARATOR,
            self.qualified_name
        )
    }
}

/// Secondary class source backed by a list of search roots.
pub struct AdditionalClassLoader {
    roots: Vec<PathBuf>,
    loader: Box<dyn ClassLoader>,
}

impl fmt::Debug for AdditionalClassLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdditionalClassLoader")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

impl Default for AdditionalClassLoader {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl AdditionalClassLoader {
    /// Create a loader over the given roots reading JSON class files.
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self {
            roots,
            loader: Box::new(JsonClassLoader),
        }
    }

    /// Replace the backing class loader.
    pub fn with_loader(mut self, loader: impl ClassLoader + 'static) -> Self {
        self.loader = Box::new(loader);
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// First search root that holds the class.
    pub fn locate(&self, qualified_name: &str) -> Option<&Path> {
        self.roots
            .iter()
            .map(PathBuf::as_path)
            .find(|root| self.loader.has_class(root, qualified_name))
    }

    /// Load the class named by a key.
    pub fn load(&self, key: &AdditionalKey) -> GenerateResult<ClassModel> {
        tracing::debug!(key = %key, "loading class on demand");
        let class = self.loader.load_class(&key.root, &key.qualified_name)?;
        Ok(class)
    }
}
