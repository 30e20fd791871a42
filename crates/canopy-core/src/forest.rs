//! Dimension snapshot: elements indexed by name with parent/child adjacency

use crate::edge::Edge;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::limits::{validate_element_name, validate_weight};
use std::collections::{HashMap, HashSet};

/// Read-mostly view of one dimension's hierarchy
///
/// Elements keep the order in which they were added; children and parents
/// keep the order in which their edges were added. Both algorithms iterate
/// in these orders, so identical input always gives identical output.
#[derive(Debug, Clone, Default)]
pub struct Forest {
    name: String,
    elements: Vec<Element>,
    index: HashMap<String, usize>,
    children: Vec<Vec<(usize, f64)>>,
    parents: Vec<Vec<usize>>,
}

impl Forest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build a forest from elements and edges, failing on the first bad item
    pub fn from_parts(
        name: impl Into<String>,
        elements: impl IntoIterator<Item = Element>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Result<Self> {
        let mut forest = Self::new(name);
        for element in elements {
            forest.add_element(element)?;
        }
        for edge in edges {
            forest.add_edge(&edge.parent, &edge.child, edge.weight)?;
        }
        Ok(forest)
    }

    /// Copy of this forest holding the same elements and no edges
    pub fn without_edges(&self) -> Self {
        Self {
            name: self.name.clone(),
            elements: self.elements.clone(),
            index: self.index.clone(),
            children: vec![Vec::new(); self.elements.len()],
            parents: vec![Vec::new(); self.elements.len()],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutation
    // ─────────────────────────────────────────────────────────────────────────

    /// Add an element; names must be unique
    pub fn add_element(&mut self, element: Element) -> Result<usize> {
        validate_element_name(&element.name)?;
        if self.index.contains_key(&element.name) {
            return Err(Error::DuplicateElement(element.name));
        }
        let idx = self.elements.len();
        self.index.insert(element.name.clone(), idx);
        self.elements.push(element);
        self.children.push(Vec::new());
        self.parents.push(Vec::new());
        Ok(idx)
    }

    /// Add a consolidation, replacing the weight if the pair already exists
    pub fn add_edge(&mut self, parent: &str, child: &str, weight: f64) -> Result<()> {
        validate_weight(parent, child, weight)?;
        let p = self.require(parent)?;
        let c = self.require(child)?;
        self.link(p, c, weight)
    }

    pub(crate) fn link(&mut self, p: usize, c: usize, weight: f64) -> Result<()> {
        if let Some(slot) = self.children[p].iter_mut().find(|(child, _)| *child == c) {
            slot.1 = weight;
            return Ok(());
        }
        if self.reaches_upward(p, c) {
            return Err(Error::CycleDetected {
                parent: self.elements[p].name.clone(),
                child: self.elements[c].name.clone(),
            });
        }
        self.children[p].push((c, weight));
        self.parents[c].push(p);
        Ok(())
    }

    /// Remove the consolidation between parent and child, if present
    pub fn remove_edge(&mut self, parent: &str, child: &str) -> bool {
        let (Some(p), Some(c)) = (self.position(parent), self.position(child)) else {
            return false;
        };
        let before = self.children[p].len();
        self.children[p].retain(|(child, _)| *child != c);
        self.parents[c].retain(|parent| *parent != p);
        before != self.children[p].len()
    }

    /// True if walking up from `from` reaches `target` (or they are equal)
    fn reaches_upward(&self, from: usize, target: usize) -> bool {
        let mut seen = HashSet::new();
        let mut stack = vec![from];
        while let Some(node) = stack.pop() {
            if node == target {
                return true;
            }
            if seen.insert(node) {
                stack.extend(self.parents[node].iter().copied());
            }
        }
        false
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.position(name)
            .ok_or_else(|| Error::ElementNotFound(name.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup by name
    // ─────────────────────────────────────────────────────────────────────────

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Element> {
        self.position(name).map(|idx| &self.elements[idx])
    }

    /// Elements in insertion order
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(|e| e.name.as_str())
    }

    pub fn children(&self, name: &str) -> Vec<&str> {
        self.position(name)
            .map(|idx| self.children[idx].iter().map(|(c, _)| self.name_at(*c)).collect())
            .unwrap_or_default()
    }

    pub fn parents(&self, name: &str) -> Vec<&str> {
        self.position(name)
            .map(|idx| self.parents[idx].iter().map(|p| self.name_at(*p)).collect())
            .unwrap_or_default()
    }

    pub fn weight(&self, parent: &str, child: &str) -> Option<f64> {
        let p = self.position(parent)?;
        let c = self.position(child)?;
        self.children[p]
            .iter()
            .find(|(child, _)| *child == c)
            .map(|(_, w)| *w)
    }

    /// No parents
    pub fn is_root(&self, name: &str) -> bool {
        self.position(name).is_some_and(|idx| self.parents[idx].is_empty())
    }

    /// No children
    pub fn is_base(&self, name: &str) -> bool {
        self.position(name).is_some_and(|idx| self.children[idx].is_empty())
    }

    /// At least one child
    pub fn is_consolidated(&self, name: &str) -> bool {
        self.position(name).is_some_and(|idx| !self.children[idx].is_empty())
    }

    pub fn roots(&self) -> Vec<&str> {
        (0..self.len())
            .filter(|&idx| self.parents[idx].is_empty())
            .map(|idx| self.name_at(idx))
            .collect()
    }

    pub fn bases(&self) -> Vec<&str> {
        (0..self.len())
            .filter(|&idx| self.children[idx].is_empty())
            .map(|idx| self.name_at(idx))
            .collect()
    }

    /// All edges, grouped by parent in element order
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.edge_count());
        for (p, children) in self.children.iter().enumerate() {
            for (c, weight) in children {
                edges.push(Edge {
                    parent: self.elements[p].name.clone(),
                    child: self.elements[*c].name.clone(),
                    weight: *weight,
                });
            }
        }
        edges
    }

    pub fn edge_count(&self) -> usize {
        self.children.iter().map(Vec::len).sum()
    }

    /// Every element reachable below `name`, depth-first, without `name` itself
    pub fn descendants(&self, name: &str) -> Vec<&str> {
        let Some(start) = self.position(name) else {
            return Vec::new();
        };
        self.descendant_ids(start)
            .into_iter()
            .map(|idx| self.name_at(idx))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Index-based access for the algorithms
    // ─────────────────────────────────────────────────────────────────────────

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn name_at(&self, idx: usize) -> &str {
        &self.elements[idx].name
    }

    pub(crate) fn element_at(&self, idx: usize) -> &Element {
        &self.elements[idx]
    }

    pub(crate) fn child_ids(&self, idx: usize) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.children[idx].iter().map(|(c, _)| *c)
    }

    pub(crate) fn parent_ids(&self, idx: usize) -> &[usize] {
        &self.parents[idx]
    }

    pub(crate) fn weight_at(&self, p: usize, c: usize) -> Option<f64> {
        self.children[p]
            .iter()
            .find(|(child, _)| *child == c)
            .map(|(_, w)| *w)
    }

    pub(crate) fn has_children(&self, idx: usize) -> bool {
        !self.children[idx].is_empty()
    }

    pub(crate) fn has_parents(&self, idx: usize) -> bool {
        !self.parents[idx].is_empty()
    }

    pub(crate) fn root_ids(&self) -> Vec<usize> {
        (0..self.len()).filter(|&idx| self.parents[idx].is_empty()).collect()
    }

    pub(crate) fn descendant_ids(&self, start: usize) -> Vec<usize> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack: Vec<usize> = self.child_ids(start).rev().collect();
        while let Some(node) = stack.pop() {
            if node == start || !seen.insert(node) {
                continue;
            }
            order.push(node);
            stack.extend(self.child_ids(node).rev());
        }
        order
    }
}
