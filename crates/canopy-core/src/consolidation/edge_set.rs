//! Insertion-ordered edge collection keyed by a mode-dependent identity

use crate::edge::Edge;
use std::collections::HashMap;

/// What makes two edges "the same" edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeIdentity {
    /// (parent, child)
    Pair,
    /// child alone
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum EdgeKey {
    Pair(String, String),
    Child(String),
}

/// Edges in the order they were last inserted
///
/// Inserting an edge whose identity is already present removes the old one
/// and appends the new one, so the most recent write wins and sorts last.
#[derive(Debug, Clone)]
pub struct EdgeSet {
    identity: EdgeIdentity,
    slots: Vec<Option<Edge>>,
    index: HashMap<EdgeKey, usize>,
}

impl EdgeSet {
    pub fn new(identity: EdgeIdentity) -> Self {
        Self {
            identity,
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    fn key(&self, parent: &str, child: &str) -> EdgeKey {
        match self.identity {
            EdgeIdentity::Pair => EdgeKey::Pair(parent.to_string(), child.to_string()),
            EdgeIdentity::Child => EdgeKey::Child(child.to_string()),
        }
    }

    /// Insert, returning the edge it replaced
    pub fn insert(&mut self, edge: Edge) -> Option<Edge> {
        let key = self.key(&edge.parent, &edge.child);
        let replaced = self.index.remove(&key).and_then(|slot| self.slots[slot].take());
        self.index.insert(key, self.slots.len());
        self.slots.push(Some(edge));
        replaced
    }

    /// Insert only if no identity-equal edge is present
    pub fn insert_new(&mut self, edge: Edge) -> bool {
        if self.contains(&edge) {
            return false;
        }
        self.insert(edge);
        true
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.index.contains_key(&self.key(&edge.parent, &edge.child))
    }

    /// Remove the edge connecting exactly this parent and child
    pub fn remove_pair(&mut self, parent: &str, child: &str) -> Option<Edge> {
        let key = self.key(parent, child);
        let slot = *self.index.get(&key)?;
        if self.slots[slot].as_ref().is_some_and(|e| e.parent == parent) {
            self.index.remove(&key);
            self.slots[slot].take()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Edge> {
        self.slots.iter().flatten()
    }

    pub fn into_vec(self) -> Vec<Edge> {
        self.slots.into_iter().flatten().collect()
    }
}
