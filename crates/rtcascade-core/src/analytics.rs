//! Structural analytics over an assembled cascade.
//!
//! # Overview
//!
//! - **Disconnected closure**: unresolved re-sharers plus everyone whose
//!   parent chain runs into one of them.
//! - **Level counts**: breadth-first population per depth below the root;
//!   level 1 holds the root's direct children.
//! - **Influencer ranking**: in-degree per non-root target, counted across
//!   every edge, including edges whose target is itself disconnected.
//!
//! The parent relation is inverted once into a children index so each pass
//! is linear in the number of edges.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::model::Cascade;

/// A user named as parent by other re-sharers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Influencer {
    pub user_id: String,
    /// How many re-sharers named this user as their entry point.
    pub count: usize,
}

/// Summary of a cascade's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CascadeInfo {
    /// Size of the disconnected closure.
    pub disconnected: usize,
    /// Population per level; `levels[0]` are the root's direct children.
    pub levels: Vec<usize>,
    /// Sorted by count descending, then user id ascending.
    pub influencers: Vec<Influencer>,
}

impl CascadeInfo {
    /// Number of levels below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    /// Re-sharers reachable from the root.
    #[must_use]
    pub fn reached(&self) -> usize {
        self.levels.iter().sum()
    }

    /// The `n` strongest influencers.
    #[must_use]
    pub fn top(&self, n: usize) -> &[Influencer] {
        &self.influencers[..n.min(self.influencers.len())]
    }
}

/// Compute disconnected count, level counts and influencer ranking.
#[must_use]
#[instrument(skip(cascade), fields(edges = cascade.len()))]
pub fn analyze(cascade: &Cascade, root_id: &str) -> CascadeInfo {
    let children = children_index(cascade, root_id);

    CascadeInfo {
        disconnected: disconnected_closure_with(cascade, &children).len(),
        levels: level_counts_with(&children, root_id),
        influencers: influencers(cascade, root_id),
    }
}

/// Unresolved sources plus everyone who inherits disconnection from them.
#[must_use]
pub fn disconnected_closure<'a>(cascade: &'a Cascade, root_id: &str) -> HashSet<&'a str> {
    disconnected_closure_with(cascade, &children_index(cascade, root_id))
}

/// Population of each level below `root_id`, stopping at the first empty
/// level.
#[must_use]
pub fn level_counts(cascade: &Cascade, root_id: &str) -> Vec<usize> {
    level_counts_with(&children_index(cascade, root_id), root_id)
}

/// In-degree of every target other than `root_id`.
#[must_use]
pub fn influencers(cascade: &Cascade, root_id: &str) -> Vec<Influencer> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for target in cascade.edges.iter().filter_map(|edge| edge.target.as_deref()) {
        if target != root_id {
            *counts.entry(target).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<Influencer> = counts
        .into_iter()
        .map(|(user_id, count)| Influencer {
            user_id: user_id.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the BTreeMap's ascending id order within equal counts.
    ranked.sort_by(|a, b| b.count.cmp(&a.count));
    ranked
}

/// target → sources naming it. Edges leaving the root are ignored.
fn children_index<'a>(cascade: &'a Cascade, root_id: &str) -> HashMap<&'a str, Vec<&'a str>> {
    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &cascade.edges {
        if edge.source == root_id {
            continue;
        }
        if let Some(target) = edge.target.as_deref() {
            children.entry(target).or_default().push(edge.source.as_str());
        }
    }
    children
}

fn disconnected_closure_with<'a>(
    cascade: &'a Cascade,
    children: &HashMap<&'a str, Vec<&'a str>>,
) -> HashSet<&'a str> {
    let mut disconnected: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for source in cascade.unresolved() {
        if disconnected.insert(source) {
            queue.push_back(source);
        }
    }

    while let Some(current) = queue.pop_front() {
        for child in children.get(current).into_iter().flatten() {
            if disconnected.insert(*child) {
                queue.push_back(*child);
            }
        }
    }

    disconnected
}

fn level_counts_with(children: &HashMap<&str, Vec<&str>>, root_id: &str) -> Vec<usize> {
    let mut levels = Vec::new();
    let mut visited: HashSet<&str> = HashSet::from([root_id]);
    let mut frontier: Vec<&str> = vec![root_id];

    loop {
        let next: Vec<&str> = frontier
            .iter()
            .filter_map(|node| children.get(*node))
            .flatten()
            .copied()
            .filter(|child| visited.insert(*child))
            .collect();
        if next.is_empty() {
            break;
        }
        levels.push(next.len());
        frontier = next;
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Attribution, Edge};

    fn cascade(edges: &[(&str, Option<&str>)]) -> Cascade {
        Cascade {
            root: "R".to_string(),
            edges: edges
                .iter()
                .map(|(source, target)| Edge {
                    source: (*source).to_string(),
                    target: target.map(str::to_string),
                    via: match target {
                        Some("R") => Attribution::Direct,
                        Some(_) => Attribution::Interaction,
                        None => Attribution::Unresolved,
                    },
                })
                .collect(),
        }
    }

    fn influencer(user_id: &str, count: usize) -> Influencer {
        Influencer {
            user_id: user_id.to_string(),
            count,
        }
    }

    #[test]
    fn empty_cascade_has_no_levels() {
        let info = analyze(&cascade(&[]), "R");
        assert_eq!(info.disconnected, 0);
        assert!(info.levels.is_empty());
        assert!(info.influencers.is_empty());
        assert_eq!(info.depth(), 0);
    }

    #[test]
    fn closure_follows_chains_of_dangling_parents() {
        // B unresolved ← C ← E, D ← F unaffected
        let c = cascade(&[
            ("A", Some("R")),
            ("B", None),
            ("C", Some("B")),
            ("D", Some("A")),
            ("E", Some("C")),
            ("F", Some("D")),
        ]);
        let closure = disconnected_closure(&c, "R");
        let mut members: Vec<&str> = closure.into_iter().collect();
        members.sort_unstable();
        assert_eq!(members, vec!["B", "C", "E"]);
    }

    #[test]
    fn levels_count_breadth_first() {
        let c = cascade(&[
            ("A", Some("R")),
            ("B", Some("R")),
            ("C", Some("A")),
            ("D", Some("A")),
            ("E", Some("B")),
            ("F", Some("E")),
        ]);
        assert_eq!(level_counts(&c, "R"), vec![2, 3, 1]);
    }

    #[test]
    fn disconnected_nodes_are_excluded_from_levels() {
        let c = cascade(&[("A", Some("R")), ("B", None), ("C", Some("B"))]);
        let info = analyze(&c, "R");
        assert_eq!(info.levels, vec![1]);
        assert_eq!(info.disconnected, 2);
        assert_eq!(info.disconnected + info.reached(), c.len());
    }

    #[test]
    fn influencers_exclude_root_and_sort_by_count_then_id() {
        let c = cascade(&[
            ("A", Some("R")),
            ("B", Some("R")),
            ("C", Some("B")),
            ("D", Some("A")),
            ("E", Some("B")),
            ("F", None),
            ("G", Some("F")),
        ]);
        assert_eq!(
            influencers(&c, "R"),
            vec![influencer("B", 2), influencer("A", 1), influencer("F", 1)]
        );
    }

    #[test]
    fn top_clamps_to_available() {
        let c = cascade(&[("A", Some("R")), ("B", Some("A"))]);
        let info = analyze(&c, "R");
        assert_eq!(info.top(3), &[influencer("A", 1)]);
        assert!(info.top(0).is_empty());
    }

    #[test]
    fn cycles_terminate_and_stay_unreached() {
        let c = cascade(&[("A", Some("R")), ("X", Some("Y")), ("Y", Some("X"))]);
        let info = analyze(&c, "R");
        assert_eq!(info.levels, vec![1]);
        assert_eq!(info.disconnected, 0);
    }

    #[test]
    fn analyze_is_idempotent() {
        let c = cascade(&[("A", Some("R")), ("B", None), ("C", Some("A")), ("D", Some("B"))]);
        assert_eq!(analyze(&c, "R"), analyze(&c, "R"));
    }
}
