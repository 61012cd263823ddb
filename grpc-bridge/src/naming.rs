//! Flattening of qualified names into schema identifiers.
//!
//! Protobuf has no notion of packages per message, so every class is emitted
//! as a top-level message whose name encodes its package:
//!
//! | Qualified name | Inner | Identifier |
//! |----------------|-------|------------|
//! | `io.grpc.examples.CC2` | no | `io_grpc_examples___CC2` |
//! | `io.grpc.examples.CC1.Nested` | yes | `io_grpc_examples_CC1_INNER_Nested` |

use crate::error::{GenerateError, GenerateResult};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// Marker between package and simple name for top-level classes.
pub const TOP_LEVEL_MARKER: &str = "___";

/// Marker between package and simple name for inner classes.
pub const INNER_MARKER: &str = "_INNER_";

/// Suffix of the synthetic field that stands in for a superclass.
pub const SUPER_SUFFIX: &str = "___super";

/// Flatten a qualified name into an identifier.
///
/// Classes in the default package keep their simple name.
pub fn flatten(qualified_name: &str, is_inner: bool) -> String {
    match qualified_name.rsplit_once('.') {
        Some((package, simple)) => {
            let marker = if is_inner { INNER_MARKER } else { TOP_LEVEL_MARKER };
            format!("{}{}{}", package.replace('.', "_"), marker, simple)
        }
        None => qualified_name.to_string(),
    }
}

/// Lower the first character of a name (`CC3` becomes `cC3`).
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Name of the synthetic super field for an ancestor's simple name.
pub fn super_field_name(ancestor_simple_name: &str) -> String {
    format!("{}{}", lower_first(ancestor_simple_name), SUPER_SUFFIX)
}

/// Name of a union branch field carrying the given message type.
pub fn branch_field_name(type_name: &str) -> String {
    format!("{}_field", type_name.replace('.', "_"))
}

/// Per-run registry that keeps flattened identifiers unique.
///
/// The plain flattening is not injective (`a_b.C` and `a.b.C` both become
/// `a_b___C`). The first qualified name to claim an identifier keeps it; any
/// later, distinct name gets a hash suffix derived from its qualified name.
/// Reserved identifiers belong to fixed messages and are never handed out.
#[derive(Debug, Default)]
pub struct NameRegistry {
    by_name: HashMap<String, String>,
    claimed: HashMap<String, String>,
}

impl NameRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with identifiers already claimed by fixed messages.
    pub fn with_reserved<'n>(names: impl IntoIterator<Item = &'n str>) -> Self {
        let mut registry = Self::default();
        for name in names {
            registry
                .claimed
                .insert(name.to_string(), format!("<{name}>"));
        }
        registry
    }

    /// Identifier for a qualified name, allocating it on first use.
    pub fn identifier(&mut self, qualified_name: &str, is_inner: bool) -> GenerateResult<String> {
        if let Some(existing) = self.by_name.get(qualified_name) {
            return Ok(existing.clone());
        }

        let mut candidate = flatten(qualified_name, is_inner);
        if let Some(owner) = self.claimed.get(&candidate) {
            let hashed = format!("{}_h{}", candidate, short_hash(qualified_name));
            if let Some(second) = self.claimed.get(&hashed) {
                return Err(GenerateError::NameCollision {
                    identifier: hashed,
                    qualified_name: qualified_name.to_string(),
                    existing: second.clone(),
                });
            }
            tracing::warn!(
                qualified_name,
                collides_with = %owner,
                identifier = %hashed,
                "flattened name collision, using hashed identifier"
            );
            candidate = hashed;
        }

        self.claimed
            .insert(candidate.clone(), qualified_name.to_string());
        self.by_name
            .insert(qualified_name.to_string(), candidate.clone());
        Ok(candidate)
    }

    /// Number of allocated identifiers.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// First 8 hex digits of the SHA-256 of a name.
fn short_hash(name: &str) -> String {
    let digest = Sha256::digest(name.as_bytes());
    digest[..4].iter().map(|b| format!("{b:02x}")).collect()
}
