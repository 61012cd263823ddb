//! Per-run mutable state threaded through scanning, synthesis and assembly.

use crate::assembler::fixed_message_names;
use crate::error::{GenerateError, GenerateResult};
use crate::loader::{AdditionalClassLoader, AdditionalKey};
use crate::model::{is_platform_name, ClassModel, ResolvedClasses};
use crate::naming::NameRegistry;
use crate::schema::{MessageDefinition, ServiceDefinition, ANY_TYPE};
use crate::synthesizer::{MessageSynthesizer, RESPONSE_CLASS};
use crate::worklist::TypeGraphWorklist;
use indexmap::IndexSet;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

/// State of one generation run.
///
/// Nothing here outlives the run; a fresh context is built for every call to
/// [`crate::ProtoGenerator::generate`].
#[derive(Debug)]
pub struct GenerationContext<'a> {
    resolved: &'a ResolvedClasses,
    loader: &'a AdditionalClassLoader,
    /// Classes already read through the loader, by key.
    loaded: HashMap<AdditionalKey, ClassModel>,
    pub names: NameRegistry,
    pub worklist: TypeGraphWorklist,
    /// Message names carried by the entity envelope, in discovery order.
    pub entity_types: IndexSet<String>,
    /// Message names carried by the return envelope, in discovery order.
    pub return_types: IndexSet<String>,
    /// Set when some endpoint has no entity or no return value.
    pub needs_empty: bool,
    /// Set when some endpoint streams server-sent events.
    pub has_streaming: bool,
    /// Messages synthesized from discovered classes, in emission order.
    pub messages: Vec<MessageDefinition>,
    pub service: ServiceDefinition,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        resolved: &'a ResolvedClasses,
        loader: &'a AdditionalClassLoader,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            resolved,
            loader,
            loaded: HashMap::new(),
            names: NameRegistry::with_reserved(fixed_message_names()),
            worklist: TypeGraphWorklist::new(),
            entity_types: IndexSet::new(),
            return_types: IndexSet::new(),
            needs_empty: false,
            has_streaming: false,
            messages: Vec::new(),
            service: ServiceDefinition::new(service_name),
        }
    }

    /// Class from the resolved model, if present.
    pub fn resolved_class(&self, qualified_name: &str) -> Option<&ClassModel> {
        self.resolved.get(qualified_name)
    }

    /// Load the class behind a key, reading each key at most once per run.
    pub fn load_on_demand(&mut self, key: &AdditionalKey) -> GenerateResult<ClassModel> {
        match self.loaded.entry(key.clone()) {
            Entry::Occupied(entry) => Ok(entry.get().clone()),
            Entry::Vacant(entry) => {
                let class = self.loader.load(key)?;
                Ok(entry.insert(class).clone())
            }
        }
    }

    /// Resolve a class reference to the message name that stands for it,
    /// queueing the class for synthesis if it has not been seen yet.
    ///
    /// Platform classes and classes that are never synthesized render as the
    /// opaque any type. Otherwise the resolved model is consulted first, then
    /// `origin` (the root of the on-demand class holding the reference), then
    /// every additional search root. A class found under a root is loaded
    /// before it is named so the skip rules see its real shape.
    pub fn resolve_reference(
        &mut self,
        qualified_name: &str,
        is_inner: bool,
        origin: Option<&Path>,
        referenced_from: &str,
    ) -> GenerateResult<String> {
        if is_platform_name(qualified_name) || qualified_name == RESPONSE_CLASS {
            return Ok(ANY_TYPE.to_string());
        }

        if let Some(class) = self.resolved.get(qualified_name) {
            if MessageSynthesizer::is_skipped(class) {
                return Ok(ANY_TYPE.to_string());
            }
            let is_inner = class.is_inner || is_inner;
            self.worklist.push_resolved(class.clone());
            return self.names.identifier(qualified_name, is_inner);
        }

        let loader = self.loader;
        let root = match origin {
            Some(root) => root,
            None => loader
                .locate(qualified_name)
                .ok_or_else(|| GenerateError::unresolved(qualified_name, referenced_from))?,
        };

        let key = AdditionalKey::new(root, qualified_name);
        let class = self.load_on_demand(&key)?;
        if MessageSynthesizer::is_skipped(&class) {
            return Ok(ANY_TYPE.to_string());
        }
        if !self.worklist.is_visited(qualified_name) {
            self.worklist.push_on_demand(key.to_string());
        }
        self.names.identifier(qualified_name, class.is_inner || is_inner)
    }

    /// Record a message name for the entity envelope.
    pub fn add_entity_type(&mut self, name: &str) {
        self.entity_types.insert(name.to_string());
    }

    /// Record a message name for the return envelope.
    pub fn add_return_type(&mut self, name: &str) {
        self.return_types.insert(name.to_string());
    }
}
