//! Deduplicating work queue driving the transitive closure over classes.
//!
//! Two kinds of entries share one visited set:
//!
//! - resolved classes, whose snapshot is already in hand, and
//! - on-demand keys (`<root>:<qualified name>`) that are loaded from a
//!   search root when dequeued.
//!
//! A class is marked visited when it is taken off the queue, before any of
//! its fields are expanded, so a class that refers back to itself (directly
//! or through a cycle) is never queued again.

use crate::model::ClassModel;
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet, VecDeque};

/// An entry taken off the worklist.
#[derive(Debug, Clone, PartialEq)]
pub enum Pending {
    /// A class from the resolved model.
    Resolved(ClassModel),
    /// A raw additional-class key still to be parsed and loaded.
    OnDemand(String),
}

/// Work queue of classes still to be synthesized.
#[derive(Debug, Default)]
pub struct TypeGraphWorklist {
    /// Pending resolved classes by qualified name.
    arena: HashMap<String, ClassModel>,
    /// FIFO order of the arena's keys.
    order: VecDeque<String>,
    /// Pending on-demand keys in first-seen order.
    on_demand: IndexSet<String>,
    /// Every qualified name already taken off the queue.
    visited: HashSet<String>,
}

impl TypeGraphWorklist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a resolved class unless it is visited or already pending.
    pub fn push_resolved(&mut self, class: ClassModel) -> bool {
        let name = &class.qualified_name;
        if self.visited.contains(name) || self.arena.contains_key(name) {
            return false;
        }
        tracing::trace!(class = %name, "queued");
        self.order.push_back(name.clone());
        self.arena.insert(name.clone(), class);
        true
    }

    /// Queue an on-demand key unless the same key is already pending.
    ///
    /// Keys are validated when dequeued, not here.
    pub fn push_on_demand(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        tracing::trace!(key = %key, "queued on demand");
        self.on_demand.insert(key)
    }

    /// Take the next entry, resolved classes first.
    pub fn pop(&mut self) -> Option<Pending> {
        while let Some(name) = self.order.pop_front() {
            if let Some(class) = self.arena.remove(&name) {
                return Some(Pending::Resolved(class));
            }
        }
        self.on_demand.shift_remove_index(0).map(Pending::OnDemand)
    }

    /// Record a qualified name as visited. Returns false if it already was.
    pub fn mark_visited(&mut self, qualified_name: &str) -> bool {
        self.visited.insert(qualified_name.to_string())
    }

    pub fn is_visited(&self, qualified_name: &str) -> bool {
        self.visited.contains(qualified_name)
    }

    /// Check if a resolved class is waiting in the queue.
    pub fn is_pending(&self, qualified_name: &str) -> bool {
        self.arena.contains_key(qualified_name)
    }

    /// Number of pending entries of both kinds.
    pub fn len(&self) -> usize {
        self.arena.len() + self.on_demand.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty() && self.on_demand.is_empty()
    }

    /// Number of visited qualified names.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
