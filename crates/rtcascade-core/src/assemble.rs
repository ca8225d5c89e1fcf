//! Direct-link classification and forest assembly.
//!
//! # Override rules
//!
//! 1. A re-sharer in the follower set links to the root. This is treated as
//!    ground truth and discards whatever the strategy inferred for them.
//! 2. Every other re-sharer takes the strategy's parent, if it produced one.
//! 3. Everyone left gets an unresolved edge.
//!
//! # Forest check
//!
//! After assembly the edge set is loaded into a petgraph [`DiGraph`] and
//! checked for self-loops, root-sourced edges, causality violations and
//! cycles. Resolved edges always point strictly back in time, so a failure
//! here means a resolver bug rather than bad input.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet, HashMap};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::error::CascadeError;
use crate::model::{Attribution, Cascade, Edge, FollowerSet};
use crate::timeline::Timeline;

/// Counts describing how an assembly resolved its re-sharers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    /// Re-sharers linked to the root as followers.
    pub direct: usize,
    /// Re-sharers linked by the strategy.
    pub inferred: usize,
    /// Strategy links discarded because the source is a follower.
    pub overridden: usize,
    /// Re-sharers with no parent.
    pub unresolved: usize,
}

/// Re-sharers that follow the root, sorted by id.
#[must_use]
pub fn classify_direct<'a>(timeline: &'a Timeline, followers: &FollowerSet) -> BTreeSet<&'a str> {
    timeline
        .resharers()
        .into_iter()
        .filter(|user| followers.contains(*user))
        .collect()
}

/// Merge direct links, strategy links and unresolved users into a cascade.
///
/// `inferred` maps source → parent as produced by one strategy, and
/// `strategy` is the attribution recorded on those edges.
///
/// # Errors
///
/// Returns [`CascadeError::InvariantViolation`] if the result is not a
/// forest rooted at the timeline's root.
pub fn assemble(
    timeline: &Timeline,
    direct: &BTreeSet<&str>,
    inferred: &BTreeMap<String, String>,
    strategy: Attribution,
) -> Result<(Cascade, AssemblyStats), CascadeError> {
    let root = timeline.root();
    let mut stats = AssemblyStats::default();
    let mut edges = Vec::with_capacity(timeline.resharer_count());

    for user in timeline.resharers() {
        let edge = if direct.contains(user) {
            stats.direct += 1;
            if inferred.contains_key(user) {
                stats.overridden += 1;
            }
            Edge {
                source: user.to_string(),
                target: Some(root.to_string()),
                via: Attribution::Direct,
            }
        } else if let Some(parent) = inferred.get(user) {
            stats.inferred += 1;
            Edge {
                source: user.to_string(),
                target: Some(parent.clone()),
                via: strategy,
            }
        } else {
            stats.unresolved += 1;
            Edge {
                source: user.to_string(),
                target: None,
                via: Attribution::Unresolved,
            }
        };
        edges.push(edge);
    }

    let cascade = Cascade {
        root: root.to_string(),
        edges,
    };
    verify_forest(&cascade, timeline)?;
    Ok((cascade, stats))
}

/// Check the forest invariants of an assembled cascade.
///
/// # Errors
///
/// Returns [`CascadeError::InvariantViolation`] describing the first
/// violation found.
pub fn verify_forest(cascade: &Cascade, timeline: &Timeline) -> Result<(), CascadeError> {
    check_acyclic(cascade)?;
    for edge in &cascade.edges {
        let Some(target) = edge.target.as_deref() else {
            continue;
        };
        if target != cascade.root && !timeline.precedes(target, &edge.source) {
            return Err(CascadeError::InvariantViolation(format!(
                "`{}` is attributed to `{target}`, which did not act earlier",
                edge.source
            )));
        }
    }
    Ok(())
}

/// Structural forest check that needs no timeline: no root-sourced edges,
/// no self-loops, no cycles.
///
/// # Errors
///
/// Returns [`CascadeError::InvariantViolation`] describing the first
/// violation found.
pub fn check_acyclic(cascade: &Cascade) -> Result<(), CascadeError> {
    let mut graph = DiGraph::<&str, ()>::with_capacity(cascade.len() + 1, cascade.len());
    let mut node_map: HashMap<&str, NodeIndex> = HashMap::with_capacity(cascade.len() + 1);

    for edge in &cascade.edges {
        if edge.source == cascade.root {
            return Err(CascadeError::InvariantViolation(format!(
                "root `{}` appears as an edge source",
                cascade.root
            )));
        }
        let Some(target) = edge.target.as_deref() else {
            continue;
        };
        if target == edge.source {
            return Err(CascadeError::InvariantViolation(format!(
                "self-loop on `{}`",
                edge.source
            )));
        }
        let from = node_for(&mut graph, &mut node_map, edge.source.as_str());
        let to = node_for(&mut graph, &mut node_map, target);
        graph.add_edge(from, to, ());
    }

    if let Some(cycle) = tarjan_scc(&graph)
        .into_iter()
        .find(|component| component.len() > 1)
    {
        let mut members: Vec<&str> = cycle.into_iter().map(|idx| graph[idx]).collect();
        members.sort_unstable();
        return Err(CascadeError::InvariantViolation(format!(
            "cycle through {}",
            members.join(", ")
        )));
    }

    Ok(())
}

fn node_for<'a>(
    graph: &mut DiGraph<&'a str, ()>,
    node_map: &mut HashMap<&'a str, NodeIndex>,
    id: &'a str,
) -> NodeIndex {
    *node_map.entry(id).or_insert_with(|| graph.add_node(id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PostRef, ReshareRecord};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_600_000_000 + secs, 0).unwrap()
    }

    fn timeline(users: &[(&str, i64)]) -> Timeline {
        let records: Vec<ReshareRecord> = users
            .iter()
            .map(|(user, secs)| ReshareRecord::new(*user, at(*secs), PostRef::new("R", at(0))))
            .collect();
        Timeline::from_reshares(&records).expect("timeline")
    }

    fn followers(ids: &[&str]) -> FollowerSet {
        ids.iter().map(|id| (*id).to_string()).collect()
    }

    fn inferred(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(s, t)| ((*s).to_string(), (*t).to_string()))
            .collect()
    }

    #[test]
    fn classify_direct_only_counts_resharers() {
        let tl = timeline(&[("A", 10), ("B", 20)]);
        let direct = classify_direct(&tl, &followers(&["A", "stranger", "R"]));
        assert_eq!(direct.into_iter().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn direct_link_overrides_strategy() {
        let tl = timeline(&[("A", 10), ("B", 20)]);
        let fs = followers(&["B"]);
        let direct = classify_direct(&tl, &fs);
        let (cascade, stats) = assemble(
            &tl,
            &direct,
            &inferred(&[("B", "A")]),
            Attribution::Interaction,
        )
        .expect("assemble");

        let b = cascade.edge("B").expect("B edge");
        assert_eq!(b.target.as_deref(), Some("R"));
        assert_eq!(b.via, Attribution::Direct);
        assert_eq!(stats.overridden, 1);
        assert_eq!(stats.direct, 1);
        assert_eq!(stats.unresolved, 1);
    }

    #[test]
    fn every_resharer_gets_exactly_one_edge() {
        let tl = timeline(&[("A", 10), ("B", 20), ("C", 30)]);
        let fs = followers(&["A"]);
        let direct = classify_direct(&tl, &fs);
        let (cascade, stats) =
            assemble(&tl, &direct, &inferred(&[("C", "A")]), Attribution::Friendship)
                .expect("assemble");

        let sources: Vec<&str> = cascade.edges.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["A", "B", "C"]);
        assert_eq!(cascade.target_of("B"), Some(None));
        assert_eq!(cascade.edge("C").expect("C").via, Attribution::Friendship);
        assert_eq!(
            stats,
            AssemblyStats {
                direct: 1,
                inferred: 1,
                overridden: 0,
                unresolved: 1,
            }
        );
    }

    #[test]
    fn verify_rejects_time_travel() {
        let tl = timeline(&[("A", 10), ("B", 20)]);
        let err = assemble(
            &tl,
            &BTreeSet::new(),
            &inferred(&[("A", "B")]),
            Attribution::Interaction,
        )
        .unwrap_err();
        assert!(matches!(err, CascadeError::InvariantViolation(msg) if msg.contains("did not act earlier")));
    }

    #[test]
    fn verify_rejects_self_loops() {
        let tl = timeline(&[("A", 10)]);
        let err = assemble(
            &tl,
            &BTreeSet::new(),
            &inferred(&[("A", "A")]),
            Attribution::Interaction,
        )
        .unwrap_err();
        assert!(matches!(err, CascadeError::InvariantViolation(msg) if msg.contains("self-loop")));
    }

    #[test]
    fn verify_rejects_root_sources() {
        let tl = timeline(&[("A", 10)]);
        let cascade = Cascade {
            root: "R".to_string(),
            edges: vec![Edge {
                source: "R".to_string(),
                target: None,
                via: Attribution::Unresolved,
            }],
        };
        assert!(verify_forest(&cascade, &tl).is_err());
    }

    #[test]
    fn acyclic_check_reports_cycles() {
        let cascade = Cascade {
            root: "R".to_string(),
            edges: vec![
                Edge {
                    source: "A".to_string(),
                    target: Some("B".to_string()),
                    via: Attribution::Interaction,
                },
                Edge {
                    source: "B".to_string(),
                    target: Some("A".to_string()),
                    via: Attribution::Interaction,
                },
                Edge {
                    source: "C".to_string(),
                    target: Some("R".to_string()),
                    via: Attribution::Direct,
                },
            ],
        };
        let err = check_acyclic(&cascade).unwrap_err();
        assert_eq!(
            err,
            CascadeError::InvariantViolation("cycle through A, B".to_string())
        );
    }
}
