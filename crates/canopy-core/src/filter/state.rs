//! Accepted/denied partition over a dimension's elements

use super::condition::FilterAction;
use crate::forest::Forest;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Accepted,
    Denied,
}

/// Closed-world partition of element names
///
/// Every element carries exactly one mark, so the accepted and denied sets
/// are disjoint and together cover the dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    names: Vec<String>,
    index: HashMap<String, usize>,
    marks: Vec<Mark>,
}

impl FilterState {
    fn with(forest: &Forest, mark: impl Fn(usize) -> Mark) -> Self {
        let names: Vec<String> = forest.names().map(str::to_string).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), i))
            .collect();
        let marks = (0..names.len()).map(mark).collect();
        Self { names, index, marks }
    }

    pub fn accept_all(forest: &Forest) -> Self {
        Self::with(forest, |_| Mark::Accepted)
    }

    pub fn deny_all(forest: &Forest) -> Self {
        Self::with(forest, |_| Mark::Denied)
    }

    /// Accept only elements without children
    pub fn only_bases(forest: &Forest) -> Self {
        Self::with(forest, |i| {
            if forest.has_children(i) {
                Mark::Denied
            } else {
                Mark::Accepted
            }
        })
    }

    /// Accept only elements with at least one child
    pub fn only_consolidated(forest: &Forest) -> Self {
        Self::with(forest, |i| {
            if forest.has_children(i) {
                Mark::Accepted
            } else {
                Mark::Denied
            }
        })
    }

    /// Additionally accept every root
    pub fn accept_roots(&mut self, forest: &Forest) {
        for idx in forest.root_ids() {
            self.accept(idx);
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn is_accepted(&self, name: &str) -> bool {
        self.index
            .get(name)
            .is_some_and(|&i| self.marks[i] == Mark::Accepted)
    }

    /// Accepted names in element order
    pub fn accepted(&self) -> Vec<&str> {
        self.with_mark(Mark::Accepted)
    }

    /// Denied names in element order
    pub fn denied(&self) -> Vec<&str> {
        self.with_mark(Mark::Denied)
    }

    pub fn accepted_count(&self) -> usize {
        self.marks.iter().filter(|m| **m == Mark::Accepted).count()
    }

    pub fn into_accepted(self) -> Vec<String> {
        self.names
            .into_iter()
            .zip(self.marks)
            .filter(|(_, m)| *m == Mark::Accepted)
            .map(|(n, _)| n)
            .collect()
    }

    fn with_mark(&self, mark: Mark) -> Vec<&str> {
        self.names
            .iter()
            .zip(&self.marks)
            .filter(|(_, m)| **m == mark)
            .map(|(n, _)| n.as_str())
            .collect()
    }

    // Index-based updates used by the engine. Indices are forest positions.

    pub(crate) fn accept(&mut self, idx: usize) {
        self.marks[idx] = Mark::Accepted;
    }

    pub(crate) fn deny(&mut self, idx: usize) {
        self.marks[idx] = Mark::Denied;
    }

    pub(crate) fn apply(&mut self, idx: usize, action: FilterAction) {
        match action {
            FilterAction::Accept => self.accept(idx),
            FilterAction::Deny => self.deny(idx),
        }
    }

    pub(crate) fn is_accepted_at(&self, idx: usize) -> bool {
        self.marks[idx] == Mark::Accepted
    }

    pub(crate) fn accepted_ids(&self) -> Vec<usize> {
        (0..self.marks.len())
            .filter(|&i| self.marks[i] == Mark::Accepted)
            .collect()
    }

    pub(crate) fn set_accepted_exactly(&mut self, ids: &[usize]) {
        self.marks.iter_mut().for_each(|m| *m = Mark::Denied);
        for &idx in ids {
            self.accept(idx);
        }
    }

    pub(crate) fn reset_accept_all(&mut self) {
        self.marks.iter_mut().for_each(|m| *m = Mark::Accepted);
    }
}

#[derive(Serialize)]
struct PartitionView<'a> {
    accepted: Vec<&'a str>,
    denied: Vec<&'a str>,
}

impl Serialize for FilterState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        PartitionView {
            accepted: self.accepted(),
            denied: self.denied(),
        }
        .serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::element::Element;

    fn create_test_forest() -> Forest {
        Forest::from_parts(
            "Products",
            ["All", "Hardware", "Laptop", "Phone", "Service"]
                .into_iter()
                .map(Element::new),
            vec![
                Edge::new("All", "Hardware"),
                Edge::new("Hardware", "Laptop"),
                Edge::new("Hardware", "Phone"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_presets() {
        let forest = create_test_forest();
        assert_eq!(FilterState::accept_all(&forest).accepted_count(), 5);
        assert!(FilterState::deny_all(&forest).accepted().is_empty());
        assert_eq!(
            FilterState::only_bases(&forest).accepted(),
            vec!["Laptop", "Phone", "Service"]
        );
        assert_eq!(
            FilterState::only_consolidated(&forest).accepted(),
            vec!["All", "Hardware"]
        );
    }

    #[test]
    fn test_accept_roots_keeps_existing_marks() {
        let forest = create_test_forest();
        let mut state = FilterState::only_consolidated(&forest);
        state.accept_roots(&forest);
        assert_eq!(state.accepted(), vec!["All", "Hardware", "Service"]);
        assert_eq!(state.denied(), vec!["Laptop", "Phone"]);
    }

    #[test]
    fn test_partition_serializes_both_sides() {
        let forest = create_test_forest();
        let state = FilterState::only_bases(&forest);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["accepted"].as_array().unwrap().len(), 3);
        assert_eq!(json["denied"].as_array().unwrap().len(), 2);
        assert!(state.denied().contains(&"All") && !state.is_accepted("All"));
    }
}
