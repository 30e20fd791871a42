//! Condition evaluation and hierarchical propagation

use super::condition::{
    Combinator, FilterAction, FilterCondition, FilterDefinition, LogicalOperator, Propagation,
};
use super::predicate::Matcher;
use super::state::FilterState;
use crate::error::Result;
use crate::forest::Forest;
use crate::limits::validate_condition_count;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Problem with one condition that did not stop the evaluation
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FilterWarning {
    #[error("Condition {condition}: cannot evaluate {predicate}: {message}")]
    InvalidPredicate {
        condition: usize,
        predicate: String,
        message: String,
    },

    #[error("Condition {condition}: no element carries attribute {attribute}")]
    UnknownAttribute { condition: usize, attribute: String },
}

/// Outcome of a filter evaluation
#[derive(Debug, Clone, Serialize)]
pub struct FilterResult {
    pub state: FilterState,
    pub warnings: Vec<FilterWarning>,
}

impl FilterResult {
    /// Accepted names in element order
    pub fn accepted(&self) -> Vec<&str> {
        self.state.accepted()
    }
}

/// Evaluates filter conditions against one forest snapshot
pub struct FilterEngine<'a> {
    forest: &'a Forest,
}

impl<'a> FilterEngine<'a> {
    pub fn new(forest: &'a Forest) -> Self {
        Self { forest }
    }

    /// Run one ordered condition list
    ///
    /// A list that starts by accepting builds up from nothing; any other list
    /// starts from everything and carves away.
    pub fn evaluate(&self, conditions: &[FilterCondition]) -> Result<FilterResult> {
        validate_condition_count(conditions.len())?;

        let mut state = match conditions.first() {
            Some(c) if c.action == FilterAction::Accept => FilterState::deny_all(self.forest),
            _ => FilterState::accept_all(self.forest),
        };
        let mut warnings = Vec::new();

        for (position, condition) in conditions.iter().enumerate() {
            let range = self.search_range(position, condition, &state);
            let mut matches = self.matches(position, condition, &range, &mut warnings);

            match (condition.action, condition.combinator) {
                (FilterAction::Accept, Some(Combinator::And)) => {
                    state.set_accepted_exactly(&matches);
                }
                (FilterAction::Deny, Some(Combinator::Or)) => {
                    matches.retain(|&idx| !state.is_accepted_at(idx));
                    state.reset_accept_all();
                }
                _ => {}
            }

            self.propagate(condition.propagation, condition.action, &matches, &mut state);

            debug!(
                condition = position,
                propagation = %condition.propagation,
                searched = range.len(),
                matched = matches.len(),
                accepted = state.accepted_count(),
                "Applied filter condition"
            );
        }

        Ok(FilterResult { state, warnings })
    }

    /// Run every list of a definition and combine their accepted sets
    pub fn evaluate_definition(&self, definition: &FilterDefinition) -> Result<FilterResult> {
        let lists = definition.condition_lists();
        if lists.is_empty() {
            return Ok(FilterResult {
                state: FilterState::accept_all(self.forest),
                warnings: Vec::new(),
            });
        }

        let mut combined: Option<HashSet<usize>> = None;
        let mut warnings = Vec::new();
        for list in lists {
            let result = self.evaluate(list)?;
            warnings.extend(result.warnings);
            let accepted: HashSet<usize> = result.state.accepted_ids().into_iter().collect();
            combined = Some(match combined {
                None => accepted,
                Some(acc) => match definition.operator {
                    LogicalOperator::And => acc.intersection(&accepted).copied().collect(),
                    LogicalOperator::Or => acc.union(&accepted).copied().collect(),
                },
            });
        }

        let mut ids: Vec<usize> = combined.unwrap_or_default().into_iter().collect();
        ids.sort_unstable();
        let mut state = FilterState::deny_all(self.forest);
        state.set_accepted_exactly(&ids);
        Ok(FilterResult { state, warnings })
    }

    fn search_range(&self, position: usize, condition: &FilterCondition, state: &FilterState) -> Vec<usize> {
        let everything = match (condition.action, condition.combinator) {
            (FilterAction::Accept, None | Some(Combinator::Or)) => true,
            (FilterAction::Deny, Some(Combinator::Or)) => true,
            (FilterAction::Deny, _) => position == 0,
            (FilterAction::Accept, Some(Combinator::And)) => false,
        };
        if everything {
            (0..self.forest.len()).collect()
        } else {
            state.accepted_ids()
        }
    }

    fn matches(
        &self,
        position: usize,
        condition: &FilterCondition,
        range: &[usize],
        warnings: &mut Vec<FilterWarning>,
    ) -> Vec<usize> {
        let matcher = match condition.predicate.compile() {
            Ok(m) => m,
            Err(e) => {
                let warning = FilterWarning::InvalidPredicate {
                    condition: position,
                    predicate: condition.predicate.to_string(),
                    message: e.to_string(),
                };
                warn!("{}", warning);
                warnings.push(warning);
                return Vec::new();
            }
        };

        match &condition.attribute {
            None => range
                .iter()
                .copied()
                .filter(|&idx| matcher.is_match(self.forest.name_at(idx)))
                .collect(),
            Some(attribute) => {
                if !self.forest.elements().any(|e| e.attribute(attribute).is_some()) {
                    let warning = FilterWarning::UnknownAttribute {
                        condition: position,
                        attribute: attribute.clone(),
                    };
                    warn!("{}", warning);
                    warnings.push(warning);
                }
                self.match_grouped(attribute, &matcher, range)
            }
        }
    }

    /// Group the range by attribute value, test each value once, expand back
    fn match_grouped(&self, attribute: &str, matcher: &Matcher, range: &[usize]) -> Vec<usize> {
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
        let mut by_value: HashMap<String, usize> = HashMap::new();
        for &idx in range {
            let value = self.forest.element_at(idx).attribute_text(attribute);
            let slot = *by_value.entry(value.clone()).or_insert_with(|| {
                groups.push((value, Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(idx);
        }

        let mut matched: Vec<usize> = groups
            .into_iter()
            .filter(|(value, _)| matcher.is_match(value))
            .flat_map(|(_, members)| members)
            .collect();
        matched.sort_unstable();
        matched
    }

    fn propagate(&self, rule: Propagation, action: FilterAction, matches: &[usize], state: &mut FilterState) {
        let forest = self.forest;
        let up = |seeds: &[usize]| reach(seeds, |i| forest.parent_ids(i).to_vec());
        let down = |seeds: &[usize]| reach(seeds, |i| forest.child_ids(i).collect());

        let moved: Vec<usize> = match rule {
            Propagation::OnlyNodes => matches.to_vec(),
            Propagation::OnlyRoots => up(matches)
                .into_iter()
                .filter(|&i| !forest.has_parents(i))
                .collect(),
            Propagation::OnlyBases => down(matches)
                .into_iter()
                .filter(|&i| !forest.has_children(i))
                .collect(),
            Propagation::NodesToBases => {
                let mut moved = matches.to_vec();
                moved.extend(down(matches).into_iter().filter(|&i| !forest.has_children(i)));
                moved
            }
            Propagation::RootToNodes => up(matches),
            Propagation::RootToBases => {
                let mut moved = up(matches);
                moved.extend(down(matches).into_iter().filter(|&i| !forest.has_children(i)));
                moved
            }
            Propagation::RootToConsolidates => {
                // Leaves give way to their parents; a leaf that is also a root drops out
                let working: Vec<usize> = matches
                    .iter()
                    .flat_map(|&i| {
                        if forest.has_children(i) {
                            vec![i]
                        } else {
                            forest.parent_ids(i).to_vec()
                        }
                    })
                    .collect();
                let mut moved = up(&working);
                moved.extend(down(&working).into_iter().filter(|&i| forest.has_children(i)));
                moved
            }
        };

        for idx in moved {
            state.apply(idx, action);
        }
    }
}

/// Every element reachable from `seeds` (seeds included) via `next`
///
/// The visited set lives for this one walk only.
fn reach(seeds: &[usize], next: impl Fn(usize) -> Vec<usize>) -> Vec<usize> {
    let mut visited = HashSet::new();
    let mut order = Vec::new();
    let mut stack: Vec<usize> = seeds.iter().rev().copied().collect();
    while let Some(node) = stack.pop() {
        if !visited.insert(node) {
            continue;
        }
        order.push(node);
        stack.extend(next(node).into_iter().rev());
    }
    order
}

/// Evaluate one condition list against a forest
pub fn evaluate(forest: &Forest, conditions: &[FilterCondition]) -> Result<FilterResult> {
    FilterEngine::new(forest).evaluate(conditions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edge::Edge;
    use crate::element::Element;
    use crate::filter::condition::ConditionList;
    use crate::filter::predicate::Predicate;

    /// ```text
    /// World
    /// ├── Europe
    /// │   ├── Germany   Currency=EUR
    /// │   └── France    Currency=EUR
    /// └── Asia
    ///     ├── Japan     Currency=JPY
    ///     └── China     Currency=" "
    /// Other
    /// ```
    fn create_test_forest() -> Forest {
        Forest::from_parts(
            "Regions",
            vec![
                Element::new("World"),
                Element::new("Europe"),
                Element::new("Germany").with_attribute("Currency", "EUR"),
                Element::new("France").with_attribute("Currency", "EUR"),
                Element::new("Asia"),
                Element::new("Japan").with_attribute("Currency", "JPY"),
                Element::new("China").with_attribute("Currency", " "),
                Element::new("Other"),
            ],
            vec![
                Edge::new("World", "Europe"),
                Edge::new("World", "Asia"),
                Edge::new("Europe", "Germany"),
                Edge::new("Europe", "France"),
                Edge::new("Asia", "Japan"),
                Edge::new("Asia", "China"),
            ],
        )
        .unwrap()
    }

    fn chain_forest() -> Forest {
        Forest::from_parts(
            "Chain",
            ["C1", "C2", "C3"].into_iter().map(Element::new),
            vec![Edge::new("C1", "C2"), Edge::new("C2", "C3")],
        )
        .unwrap()
    }

    fn accepted(forest: &Forest, conditions: Vec<FilterCondition>) -> Vec<String> {
        let result = evaluate(forest, &conditions).unwrap();
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
        result.state.into_accepted()
    }

    fn assert_partition(forest: &Forest, state: &FilterState) {
        let accepted: HashSet<&str> = state.accepted().into_iter().collect();
        let denied: HashSet<&str> = state.denied().into_iter().collect();
        assert!(accepted.is_disjoint(&denied));
        assert_eq!(accepted.len() + denied.len(), forest.len());
    }

    #[test]
    fn test_accept_pattern_only_nodes() {
        let forest = Forest::from_parts(
            "Flat",
            ["A1", "A2", "B1"].into_iter().map(Element::new),
            Vec::new(),
        )
        .unwrap();
        let result = evaluate(&forest, &[FilterCondition::accept(Predicate::like("A*"))]).unwrap();
        assert_eq!(result.accepted(), vec!["A1", "A2"]);
        assert_eq!(result.state.denied(), vec!["B1"]);
    }

    #[test]
    fn test_only_roots_moves_just_the_root() {
        let forest = chain_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("C3")).propagate(Propagation::OnlyRoots),
        ];
        assert_eq!(accepted(&forest, conditions), vec!["C1"]);
    }

    #[test]
    fn test_root_to_nodes_moves_the_whole_path() {
        let forest = chain_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("C3")).propagate(Propagation::RootToNodes),
        ];
        assert_eq!(accepted(&forest, conditions), vec!["C1", "C2", "C3"]);
    }

    #[test]
    fn test_only_bases() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("World")).propagate(Propagation::OnlyBases),
        ];
        assert_eq!(
            accepted(&forest, conditions),
            vec!["Germany", "France", "Japan", "China"]
        );
    }

    #[test]
    fn test_nodes_to_bases() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("Asia")).propagate(Propagation::NodesToBases),
        ];
        assert_eq!(accepted(&forest, conditions), vec!["Asia", "Japan", "China"]);
    }

    #[test]
    fn test_nodes_to_bases_skips_intermediate_descendants() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("World")).propagate(Propagation::NodesToBases),
        ];
        assert_eq!(
            accepted(&forest, conditions),
            vec!["World", "Germany", "France", "Japan", "China"]
        );
    }

    #[test]
    fn test_deny_nodes_to_bases_keeps_intermediate_descendants() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::deny(Predicate::equal("Europe")).propagate(Propagation::NodesToBases),
        ];
        let result = evaluate(&forest, &conditions).unwrap();
        assert_eq!(result.state.denied(), vec!["Europe", "Germany", "France"]);
        assert_partition(&forest, &result.state);
    }

    #[test]
    fn test_root_to_bases_skips_intermediate_descendants() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("Europe")).propagate(Propagation::RootToBases),
        ];
        assert_eq!(
            accepted(&forest, conditions),
            vec!["World", "Europe", "Germany", "France"]
        );

        // Intermediate nodes below the match are not leaves and stay put
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("World")).propagate(Propagation::RootToBases),
        ];
        assert_eq!(
            accepted(&forest, conditions),
            vec!["World", "Germany", "France", "Japan", "China"]
        );
    }

    #[test]
    fn test_root_to_consolidates() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("Germany"))
                .propagate(Propagation::RootToConsolidates),
        ];
        assert_eq!(accepted(&forest, conditions), vec!["World", "Europe"]);

        let conditions = vec![
            FilterCondition::accept(Predicate::equal("World"))
                .propagate(Propagation::RootToConsolidates),
        ];
        assert_eq!(accepted(&forest, conditions), vec!["World", "Europe", "Asia"]);

        // A leaf root has no parent to stand in for it
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("Other"))
                .propagate(Propagation::RootToConsolidates),
        ];
        assert!(accepted(&forest, conditions).is_empty());
    }

    #[test]
    fn test_initial_deny_starts_from_everything() {
        let forest = create_test_forest();
        let conditions = vec![FilterCondition::deny(Predicate::like("A*"))];
        let result = accepted(&forest, conditions);
        assert_eq!(result.len(), 7);
        assert!(!result.contains(&"Asia".to_string()));
    }

    #[test]
    fn test_later_deny_only_carves_from_accepted() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("Europe")).propagate(Propagation::NodesToBases),
            FilterCondition::deny(Predicate::equal("France")),
        ];
        assert_eq!(accepted(&forest, conditions), vec!["Europe", "Germany"]);
    }

    #[test]
    fn test_accept_and_narrows() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::like("*a*")),
            FilterCondition::accept(Predicate::like("*n*")).and(),
        ];
        assert_eq!(
            accepted(&forest, conditions),
            vec!["Germany", "France", "Japan", "China"]
        );
    }

    #[test]
    fn test_deny_or_protects_accepted() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::like("*e*")),
            FilterCondition::deny(Predicate::like("*")).or(),
        ];
        let result = evaluate(&forest, &conditions).unwrap();
        assert_eq!(result.accepted(), vec!["Europe", "Germany", "France", "Other"]);
        assert_partition(&forest, &result.state);
    }

    #[test]
    fn test_attribute_grouping() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::equal("EUR")).on_attribute("Currency"),
        ];
        assert_eq!(accepted(&forest, conditions), vec!["Germany", "France"]);
    }

    #[test]
    fn test_blank_and_missing_attributes_read_as_empty() {
        let forest = create_test_forest();
        let conditions = vec![FilterCondition::accept(Predicate::IsEmpty).on_attribute("Currency")];
        assert_eq!(
            accepted(&forest, conditions),
            vec!["World", "Europe", "Asia", "China", "Other"]
        );
    }

    #[test]
    fn test_unknown_attribute_warns() {
        let forest = create_test_forest();
        let conditions = vec![FilterCondition::accept(Predicate::IsEmpty).on_attribute("Color")];
        let result = evaluate(&forest, &conditions).unwrap();
        assert_eq!(result.accepted().len(), forest.len());
        assert!(matches!(
            result.warnings.as_slice(),
            [FilterWarning::UnknownAttribute { condition: 0, .. }]
        ));
    }

    #[test]
    fn test_malformed_regex_is_a_warning() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::regex("(")),
            FilterCondition::accept(Predicate::equal("Japan")),
        ];
        let result = evaluate(&forest, &conditions).unwrap();
        assert_eq!(result.accepted(), vec!["Japan"]);
        assert_eq!(result.warnings.len(), 1);
        assert!(matches!(
            result.warnings[0],
            FilterWarning::InvalidPredicate { condition: 0, .. }
        ));
    }

    #[test]
    fn test_partition_holds_for_every_rule() {
        let forest = create_test_forest();
        for rule in Propagation::ALL {
            for first in [FilterAction::Accept, FilterAction::Deny] {
                let conditions = vec![
                    FilterCondition::new(first, Predicate::like("*a*")).propagate(rule),
                    FilterCondition::deny(Predicate::equal("Japan")).or().propagate(rule),
                    FilterCondition::accept(Predicate::like("?u*")).and().propagate(rule),
                ];
                let result = evaluate(&forest, &conditions).unwrap();
                assert_partition(&forest, &result.state);
            }
        }
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let forest = create_test_forest();
        let conditions = vec![
            FilterCondition::accept(Predicate::like("*a*")).propagate(Propagation::RootToBases),
            FilterCondition::deny(Predicate::equal("EUR"))
                .on_attribute("Currency")
                .propagate(Propagation::OnlyRoots),
        ];
        let first = evaluate(&forest, &conditions).unwrap();
        let second = evaluate(&forest, &conditions).unwrap();
        assert_eq!(first.state, second.state);
    }

    #[test]
    fn test_definition_combines_lists() {
        let forest = create_test_forest();
        let mut definition = FilterDefinition::new(vec![FilterCondition::accept(Predicate::like("*e*"))]);
        definition.lists.push(ConditionList {
            conditions: vec![
                FilterCondition::accept(Predicate::equal("World")).propagate(Propagation::OnlyBases),
            ],
        });

        let engine = FilterEngine::new(&forest);
        let result = engine.evaluate_definition(&definition).unwrap();
        assert_eq!(result.accepted(), vec!["Germany", "France"]);

        definition.operator = LogicalOperator::Or;
        let result = engine.evaluate_definition(&definition).unwrap();
        assert_eq!(
            result.accepted(),
            vec!["Europe", "Germany", "France", "Japan", "China", "Other"]
        );
    }

    #[test]
    fn test_empty_definition_accepts_everything() {
        let forest = create_test_forest();
        let result = FilterEngine::new(&forest)
            .evaluate_definition(&FilterDefinition::default())
            .unwrap();
        assert_eq!(result.accepted().len(), forest.len());
    }
}
