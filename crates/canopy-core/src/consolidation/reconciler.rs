//! Merge source edges into an existing hierarchy under a uniqueness invariant

use super::edge_set::EdgeSet;
use super::mode::{ConsolidationMode, LoadSemantic};
use crate::edge::Edge;
use crate::error::{Error, Result};
use crate::forest::Forest;
use crate::limits::validate_weight;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Source edges between progress log lines
pub const PROGRESS_INTERVAL: usize = 10_000;

/// Source edge or merged edge that was left out of the batch
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReconcileWarning {
    #[error("Skipping consolidation {parent} -> {child}: element {missing} does not exist")]
    UnknownElement {
        parent: String,
        child: String,
        missing: String,
    },

    #[error("Skipping consolidation {parent} -> {child}: weight is not a finite number")]
    InvalidWeight { parent: String, child: String },

    #[error("Dropping consolidation {parent} -> {child}: it would create a cycle")]
    Cycle { parent: String, child: String },

    #[error("Dropping consolidation {parent} -> {child}: {child} already has another parent under root {root}")]
    UniqueRootConflict {
        parent: String,
        child: String,
        root: String,
    },
}

/// Edge counts around one reconciliation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileStats {
    /// Edges in the target before the load
    pub existing: usize,
    /// Edges supplied by the source
    pub from_source: usize,
    /// Edges in the batch
    pub after: usize,
    pub added: usize,
    pub removed: usize,
    pub reweighted: usize,
    pub skipped: usize,
}

/// Edge batch ready to hand to the store
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileOutcome {
    /// Complete edge set after the load
    pub edges: Vec<Edge>,
    /// Parents whose last child was deleted
    pub emptied: Vec<String>,
    pub stats: ReconcileStats,
    pub warnings: Vec<ReconcileWarning>,
}

/// Configured merge of one edge stream into one forest
#[derive(Debug, Clone, Copy)]
pub struct Reconciler {
    mode: ConsolidationMode,
    semantic: LoadSemantic,
}

impl Reconciler {
    pub fn new(mode: ConsolidationMode, semantic: LoadSemantic) -> Self {
        Self { mode, semantic }
    }

    pub fn mode(&self) -> ConsolidationMode {
        self.mode
    }

    pub fn semantic(&self) -> LoadSemantic {
        self.semantic
    }

    /// Merge `source` into the edges of `target`
    ///
    /// `target` supplies the element universe and, for semantics that read
    /// them, the existing edges. Per-edge problems become warnings; only
    /// configuration problems fail the call.
    pub fn reconcile(&self, target: &Forest, source: &[Edge]) -> Result<ReconcileOutcome> {
        if self.mode == ConsolidationMode::UniqueRoot && target.is_empty() {
            return Err(Error::NoDistinguishableRoots(target.name().to_string()));
        }

        let existing = target.edges();
        let mut warnings = Vec::new();
        let mut skipped = 0;

        if self.semantic == LoadSemantic::Update && !existing.is_empty() {
            info!(
                dimension = target.name(),
                edges = existing.len(),
                "Removing all consolidations for dimension update"
            );
        }

        let mut set = EdgeSet::new(self.mode.identity());
        if self.semantic.reads_existing() {
            for edge in &existing {
                set.insert(edge.clone());
            }
        }

        // Parents that lost an edge, in first-touch order
        let mut touched: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for (n, edge) in source.iter().enumerate() {
            if n > 0 && n % PROGRESS_INTERVAL == 0 {
                debug!(processed = n, total = source.len(), "Reconciling consolidations");
            }
            if let Some(warning) = check_source_edge(target, edge) {
                warn!("{}", warning);
                warnings.push(warning);
                skipped += 1;
                continue;
            }
            match self.semantic {
                LoadSemantic::Create | LoadSemantic::Add | LoadSemantic::Update => {
                    set.insert(edge.clone());
                }
                LoadSemantic::Insert => {
                    if !set.insert_new(edge.clone()) {
                        debug!(parent = %edge.parent, child = %edge.child, "Keeping existing consolidation");
                    }
                }
                LoadSemantic::Delete => {
                    if set.remove_pair(&edge.parent, &edge.child).is_some()
                        && seen.insert(edge.parent.clone())
                    {
                        touched.push(edge.parent.clone());
                    }
                }
            }
        }
        debug!("Internally consolidated: {}", set.len());

        let edges = self.shape(target, set, &mut warnings)?;

        let parents_left: HashSet<&str> = edges.iter().map(|e| e.parent.as_str()).collect();
        let emptied: Vec<String> = touched
            .into_iter()
            .filter(|parent| !parents_left.contains(parent.as_str()))
            .collect();

        let mut stats = diff(&existing, &edges);
        stats.from_source = source.len();
        stats.skipped = skipped;

        info!(
            dimension = target.name(),
            mode = %self.mode,
            semantic = %self.semantic,
            before = stats.existing,
            source = stats.from_source,
            after = stats.after,
            "Reconciled consolidations"
        );
        if stats.removed > 0 {
            info!("Consolidations deleted: {}", stats.removed);
        }
        if stats.added == 0 {
            info!("No new consolidations are loaded");
        } else {
            info!("New consolidations loaded: {}", stats.added);
        }
        if stats.reweighted > 0 {
            info!("Weights changed: {}", stats.reweighted);
        }

        Ok(ReconcileOutcome {
            edges,
            emptied,
            stats,
            warnings,
        })
    }

    /// Drop cycle-closing edges, then apply root scoping if requested
    fn shape(&self, target: &Forest, set: EdgeSet, warnings: &mut Vec<ReconcileWarning>) -> Result<Vec<Edge>> {
        let mut working = target.without_edges();
        let mut kept = Vec::with_capacity(set.len());
        for edge in set.into_vec() {
            match working.add_edge(&edge.parent, &edge.child, edge.weight) {
                Ok(()) => kept.push(edge),
                Err(Error::CycleDetected { parent, child }) => {
                    let warning = ReconcileWarning::Cycle { parent, child };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                Err(e) => return Err(e),
            }
        }

        match self.mode {
            ConsolidationMode::UniqueRoot => unique_per_root(&working, warnings),
            ConsolidationMode::Multiple | ConsolidationMode::Unique => Ok(kept),
        }
    }
}

/// Merge `source` into `target` in one call
pub fn reconcile(
    target: &Forest,
    source: &[Edge],
    mode: ConsolidationMode,
    semantic: LoadSemantic,
) -> Result<ReconcileOutcome> {
    Reconciler::new(mode, semantic).reconcile(target, source)
}

fn check_source_edge(target: &Forest, edge: &Edge) -> Option<ReconcileWarning> {
    for name in [&edge.parent, &edge.child] {
        if !target.contains(name) {
            return Some(ReconcileWarning::UnknownElement {
                parent: edge.parent.clone(),
                child: edge.child.clone(),
                missing: name.clone(),
            });
        }
    }
    if validate_weight(&edge.parent, &edge.child, edge.weight).is_err() {
        return Some(ReconcileWarning::InvalidWeight {
            parent: edge.parent.clone(),
            child: edge.child.clone(),
        });
    }
    None
}

fn diff(existing: &[Edge], after: &[Edge]) -> ReconcileStats {
    let before: HashMap<(&str, &str), f64> = existing
        .iter()
        .map(|e| ((e.parent.as_str(), e.child.as_str()), e.weight))
        .collect();
    let now: HashSet<(&str, &str)> = after
        .iter()
        .map(|e| (e.parent.as_str(), e.child.as_str()))
        .collect();

    let mut stats = ReconcileStats {
        existing: existing.len(),
        after: after.len(),
        ..Default::default()
    };
    for edge in after {
        match before.get(&(edge.parent.as_str(), edge.child.as_str())) {
            None => stats.added += 1,
            Some(w) if *w != edge.weight => stats.reweighted += 1,
            Some(_) => {}
        }
    }
    stats.removed = before.keys().filter(|pair| !now.contains(*pair)).count();
    stats
}

// ─────────────────────────────────────────────────────────────────────────────
// UniqueRoot
// ─────────────────────────────────────────────────────────────────────────────

type IndexedEdge = (usize, usize, f64);

/// Keep at most one parent per child inside each root's subtree
///
/// 1. Per root, walk the subtree depth-first and give each element the most
///    recently added parent that lies inside the same subtree.
/// 2. Rebuild the forest from the union of those per-root choices.
/// 3. Walk the roots in order. An edge for a child that already has a
///    different parent survives only if no processed root reaches the child
///    through more than one of its parents; otherwise it is dropped.
fn unique_per_root(working: &Forest, warnings: &mut Vec<ReconcileWarning>) -> Result<Vec<Edge>> {
    let roots = working.root_ids();
    let per_root: Vec<Vec<IndexedEdge>> = roots
        .iter()
        .map(|&root| root_scoped_edges(working, root))
        .collect();

    let mut rebuilt = working.without_edges();
    for chosen in &per_root {
        for &(p, c, w) in chosen {
            rebuilt.link(p, c, w)?;
        }
    }
    let superseded = working.edge_count() - rebuilt.edge_count();
    if superseded > 0 {
        debug!(superseded, "Replaced consolidations by the latest parent within each root");
    }

    let members: Vec<HashSet<usize>> = per_root
        .iter()
        .map(|chosen| chosen.iter().map(|&(_, c, _)| c).collect())
        .collect();

    let mut parent_of: HashMap<usize, usize> = HashMap::new();
    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    let mut output = Vec::new();

    for (i, chosen) in per_root.iter().enumerate() {
        for &(p, c, w) in chosen {
            let legal = match parent_of.get(&c) {
                None => true,
                Some(&first) if first == p => true,
                Some(_) => reached_once_per_root(&rebuilt, c, &roots[..=i], &members[..=i]),
            };
            if !legal {
                let warning = ReconcileWarning::UniqueRootConflict {
                    parent: working.name_at(p).to_string(),
                    child: working.name_at(c).to_string(),
                    root: working.name_at(roots[i]).to_string(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                continue;
            }
            parent_of.entry(c).or_insert(p);
            if seen.insert((p, c)) {
                output.push(Edge {
                    parent: working.name_at(p).to_string(),
                    child: working.name_at(c).to_string(),
                    weight: w,
                });
            }
        }
    }
    Ok(output)
}

fn root_scoped_edges(forest: &Forest, root: usize) -> Vec<IndexedEdge> {
    let mut subtree: HashSet<usize> = forest.descendant_ids(root).into_iter().collect();
    subtree.insert(root);

    let mut chosen = Vec::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        let latest_inside = forest
            .parent_ids(node)
            .iter()
            .rev()
            .find(|p| subtree.contains(*p));
        if let Some(&p) = latest_inside {
            let weight = forest.weight_at(p, node).unwrap_or(1.0);
            chosen.push((p, node, weight));
        }
        stack.extend(forest.child_ids(node).rev());
    }
    chosen
}

/// False if some root reaches `child` through two or more of its parents
fn reached_once_per_root(
    forest: &Forest,
    child: usize,
    roots: &[usize],
    members: &[HashSet<usize>],
) -> bool {
    let parents = forest.parent_ids(child);
    if parents.len() <= 1 {
        return true;
    }
    roots.iter().zip(members).all(|(root, inside)| {
        parents
            .iter()
            .filter(|p| *p == root || inside.contains(*p))
            .count()
            <= 1
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;

    fn forest(names: &[&str], edges: Vec<Edge>) -> Forest {
        Forest::from_parts("Test", names.iter().map(|n| Element::new(*n)), edges).unwrap()
    }

    fn pairs(edges: &[Edge]) -> Vec<(&str, &str)> {
        edges
            .iter()
            .map(|e| (e.parent.as_str(), e.child.as_str()))
            .collect()
    }

    #[test]
    fn test_multiple_keeps_every_parent() {
        let target = forest(&["P", "Q", "X"], vec![]);
        let source = vec![Edge::new("P", "X"), Edge::new("Q", "X").with_weight(2.0)];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Create).unwrap();
        assert_eq!(outcome.edges, source);
        assert_eq!(outcome.stats.after, 2);
    }

    #[test]
    fn test_unique_add_replaces_existing_parent() {
        let target = forest(&["P", "Q", "X"], vec![Edge::new("P", "X")]);
        let source = vec![Edge::new("Q", "X").with_weight(2.0)];
        let outcome = reconcile(&target, &source, ConsolidationMode::Unique, LoadSemantic::Add).unwrap();
        assert_eq!(outcome.edges, vec![Edge::new("Q", "X").with_weight(2.0)]);
        assert_eq!(outcome.stats.existing, 1);
        assert_eq!(outcome.stats.from_source, 1);
        assert_eq!(outcome.stats.after, 1);
        assert_eq!(outcome.stats.removed, 1);
        assert_eq!(outcome.stats.added, 1);
    }

    #[test]
    fn test_delete_keeps_siblings() {
        let target = forest(&["P", "X", "Y"], vec![Edge::new("P", "X"), Edge::new("P", "Y")]);
        let source = vec![Edge::new("P", "X")];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Delete).unwrap();
        assert_eq!(outcome.edges, vec![Edge::new("P", "Y")]);
        assert!(outcome.emptied.is_empty());
        assert_eq!(outcome.stats.removed, 1);
    }

    #[test]
    fn test_delete_last_child_marks_parent_empty() {
        let target = forest(&["P", "X", "Y"], vec![Edge::new("P", "X"), Edge::new("P", "Y")]);
        let source = vec![Edge::new("P", "X"), Edge::new("P", "Y")];
        let outcome = reconcile(&target, &source, ConsolidationMode::Unique, LoadSemantic::Delete).unwrap();
        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.emptied, vec!["P".to_string()]);
    }

    #[test]
    fn test_delete_ignores_missing_pairs() {
        let target = forest(&["P", "Q", "X"], vec![Edge::new("P", "X")]);
        let source = vec![Edge::new("Q", "X")];
        let outcome = reconcile(&target, &source, ConsolidationMode::Unique, LoadSemantic::Delete).unwrap();
        assert_eq!(outcome.edges, vec![Edge::new("P", "X")]);
        assert!(outcome.emptied.is_empty());
    }

    #[test]
    fn test_insert_never_overrides() {
        let target = forest(&["P", "Q", "X", "Y"], vec![Edge::new("P", "X")]);
        let source = vec![
            Edge::new("P", "X").with_weight(5.0),
            Edge::new("P", "Y").with_weight(2.0),
            Edge::new("Q", "Y"),
        ];
        let outcome = reconcile(&target, &source, ConsolidationMode::Unique, LoadSemantic::Insert).unwrap();
        assert_eq!(
            outcome.edges,
            vec![Edge::new("P", "X"), Edge::new("P", "Y").with_weight(2.0)]
        );
        assert_eq!(outcome.stats.reweighted, 0);
    }

    #[test]
    fn test_update_discards_existing() {
        let target = forest(&["P", "Q", "X", "Y"], vec![Edge::new("P", "X")]);
        let source = vec![Edge::new("Q", "Y")];
        for semantic in [LoadSemantic::Update, LoadSemantic::Create] {
            let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, semantic).unwrap();
            assert_eq!(outcome.edges, vec![Edge::new("Q", "Y")]);
            assert_eq!(outcome.stats.existing, 1);
            assert_eq!(outcome.stats.removed, 1);
        }
    }

    #[test]
    fn test_multiple_readd_last_weight_wins() {
        let target = forest(&["P", "X", "Y"], vec![Edge::new("P", "X"), Edge::new("P", "Y")]);
        let source = vec![Edge::new("P", "X").with_weight(3.0), Edge::new("P", "X").with_weight(4.0)];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Add).unwrap();
        assert_eq!(
            outcome.edges,
            vec![Edge::new("P", "Y"), Edge::new("P", "X").with_weight(4.0)]
        );
        assert_eq!(outcome.stats.reweighted, 1);
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        let target = forest(&["P", "X"], vec![]);
        let source = vec![Edge::new("P", "Ghost"), Edge::new("P", "X")];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Create).unwrap();
        assert_eq!(outcome.edges, vec![Edge::new("P", "X")]);
        assert_eq!(outcome.stats.skipped, 1);
        assert!(matches!(
            &outcome.warnings[0],
            ReconcileWarning::UnknownElement { missing, .. } if missing == "Ghost"
        ));
    }

    #[test]
    fn test_non_finite_weight_is_skipped() {
        let target = forest(&["P", "X"], vec![]);
        let source = vec![Edge::new("P", "X").with_weight(f64::NAN)];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Create).unwrap();
        assert!(outcome.edges.is_empty());
        assert!(matches!(outcome.warnings[0], ReconcileWarning::InvalidWeight { .. }));
    }

    #[test]
    fn test_cycles_are_dropped() {
        let target = forest(&["A", "B"], vec![Edge::new("A", "B")]);
        let source = vec![Edge::new("B", "A")];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Add).unwrap();
        assert_eq!(outcome.edges, vec![Edge::new("A", "B")]);
        assert!(matches!(outcome.warnings[0], ReconcileWarning::Cycle { .. }));
    }

    #[test]
    fn test_unique_never_repeats_a_child() {
        let target = forest(&["P", "Q", "R", "X", "Y", "Z"], vec![Edge::new("R", "Z")]);
        let source = vec![
            Edge::new("P", "X"),
            Edge::new("Q", "X"),
            Edge::new("P", "Y"),
            Edge::new("R", "Y"),
            Edge::new("Q", "Z"),
            Edge::new("P", "X"),
        ];
        let outcome = reconcile(&target, &source, ConsolidationMode::Unique, LoadSemantic::Add).unwrap();
        let mut children = HashSet::new();
        for edge in &outcome.edges {
            assert!(children.insert(edge.child.as_str()), "{} repeated", edge.child);
        }
        assert_eq!(pairs(&outcome.edges), vec![("R", "Y"), ("Q", "Z"), ("P", "X")]);
    }

    #[test]
    fn test_unique_root_keeps_one_parent_per_subtree() {
        let target = forest(&["R1", "R2", "A", "B", "X"], vec![]);
        let source = vec![
            Edge::new("R1", "A"),
            Edge::new("R2", "B"),
            Edge::new("A", "X"),
            Edge::new("B", "X"),
        ];
        let outcome = reconcile(&target, &source, ConsolidationMode::UniqueRoot, LoadSemantic::Create).unwrap();
        assert_eq!(
            pairs(&outcome.edges),
            vec![("R1", "A"), ("A", "X"), ("R2", "B"), ("B", "X")]
        );
        assert!(outcome.warnings.is_empty());

        // Plain Unique collapses the same input to a single parent for X
        let outcome = reconcile(&target, &source, ConsolidationMode::Unique, LoadSemantic::Create).unwrap();
        assert_eq!(outcome.edges.iter().filter(|e| e.child == "X").count(), 1);
    }

    #[test]
    fn test_unique_root_latest_parent_wins_within_subtree() {
        let target = forest(&["R", "A", "B", "X"], vec![]);
        let source = vec![
            Edge::new("R", "A"),
            Edge::new("R", "B"),
            Edge::new("A", "X"),
            Edge::new("B", "X"),
        ];
        let outcome = reconcile(&target, &source, ConsolidationMode::UniqueRoot, LoadSemantic::Create).unwrap();
        assert_eq!(pairs(&outcome.edges), vec![("R", "A"), ("B", "X"), ("R", "B")]);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_unique_root_unresolvable_conflict_is_dropped() {
        let target = forest(&["R1", "R2", "A", "X"], vec![]);
        let source = vec![
            Edge::new("R1", "A"),
            Edge::new("R2", "A"),
            Edge::new("A", "X"),
            Edge::new("R2", "X"),
        ];
        let outcome = reconcile(&target, &source, ConsolidationMode::UniqueRoot, LoadSemantic::Create).unwrap();
        assert_eq!(pairs(&outcome.edges), vec![("R1", "A"), ("A", "X"), ("R2", "A")]);
        assert_eq!(
            outcome.warnings,
            vec![ReconcileWarning::UniqueRootConflict {
                parent: "R2".into(),
                child: "X".into(),
                root: "R2".into(),
            }]
        );
    }

    #[test]
    fn test_unique_root_add_replaces_stored_parent() {
        let target = forest(
            &["R", "A", "B", "X"],
            vec![Edge::new("R", "A"), Edge::new("R", "B"), Edge::new("A", "X")],
        );
        let source = vec![Edge::new("B", "X")];
        let outcome = reconcile(&target, &source, ConsolidationMode::UniqueRoot, LoadSemantic::Add).unwrap();
        assert_eq!(pairs(&outcome.edges), vec![("R", "A"), ("B", "X"), ("R", "B")]);
        assert_eq!(outcome.stats.existing, 3);
        assert_eq!(outcome.stats.added, 1);
        assert_eq!(outcome.stats.removed, 1);
    }

    #[test]
    fn test_unique_root_add_resent_parent_wins_again() {
        let target = forest(
            &["R", "A", "B", "X"],
            vec![Edge::new("R", "A"), Edge::new("R", "B"), Edge::new("A", "X")],
        );
        let source = vec![Edge::new("B", "X"), Edge::new("A", "X").with_weight(5.0)];
        let outcome = reconcile(&target, &source, ConsolidationMode::UniqueRoot, LoadSemantic::Add).unwrap();
        assert_eq!(
            outcome.edges,
            vec![
                Edge::new("R", "A"),
                Edge::new("A", "X").with_weight(5.0),
                Edge::new("R", "B"),
            ]
        );
        assert_eq!(outcome.stats.reweighted, 1);
    }

    #[test]
    fn test_unique_root_insert_keeps_stored_weight_and_order() {
        let target = forest(
            &["R", "A", "B", "X"],
            vec![Edge::new("R", "A"), Edge::new("R", "B"), Edge::new("A", "X")],
        );
        let source = vec![Edge::new("B", "X"), Edge::new("A", "X").with_weight(5.0)];
        let outcome = reconcile(&target, &source, ConsolidationMode::UniqueRoot, LoadSemantic::Insert).unwrap();
        assert_eq!(pairs(&outcome.edges), vec![("R", "A"), ("B", "X"), ("R", "B")]);
        assert_eq!(outcome.stats.reweighted, 0);
        assert!(outcome.warnings.is_empty());
    }

    #[test]
    fn test_multiple_insert_adds_pair_without_reweighting() {
        let target = forest(&["P", "Q", "X"], vec![Edge::new("P", "X")]);
        let source = vec![Edge::new("P", "X").with_weight(5.0), Edge::new("Q", "X").with_weight(2.0)];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Insert).unwrap();
        assert_eq!(
            outcome.edges,
            vec![Edge::new("P", "X"), Edge::new("Q", "X").with_weight(2.0)]
        );
        assert_eq!(outcome.stats.added, 1);
        assert_eq!(outcome.stats.reweighted, 0);
    }

    #[test]
    fn test_delete_reports_each_emptied_parent_once() {
        let target = forest(
            &["P", "Q", "X", "Y", "Z"],
            vec![Edge::new("Q", "Z"), Edge::new("P", "X"), Edge::new("P", "Y")],
        );
        let source = vec![
            Edge::new("Q", "Z"),
            Edge::new("P", "X"),
            Edge::new("P", "X"),
            Edge::new("P", "Y"),
        ];
        let outcome = reconcile(&target, &source, ConsolidationMode::Multiple, LoadSemantic::Delete).unwrap();
        assert!(outcome.edges.is_empty());
        assert_eq!(outcome.emptied, vec!["Q".to_string(), "P".to_string()]);
    }

    #[test]
    fn test_unique_root_needs_elements() {
        let target = Forest::new("Empty");
        let err = reconcile(&target, &[], ConsolidationMode::UniqueRoot, LoadSemantic::Add).unwrap_err();
        assert!(matches!(err, Error::NoDistinguishableRoots(name) if name == "Empty"));
    }
}
