//! Coach/athlete hierarchy algorithms.
//!
//! The hierarchy is a forest of supervision edges between users of one
//! NGO. Clients submit it as nested trees under a synthetic ghost root;
//! the flattened edge set is validated in memory before any row is
//! touched, and the whole rebuild happens in a single transaction.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use thiserror::Error;

use crate::models::user::UserRole;

/// Key of the synthetic root node clients submit and receive.
pub const GHOST_NODE_KEY: &str = "ghost_node";

/// One node of a submitted hierarchy tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HierarchyNodeInput {
    pub key: Option<String>,
    #[serde(default)]
    pub children: Vec<HierarchyNodeInput>,
}

/// A supervision edge. `parent` is `None` for top-level users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyEdge {
    pub parent: Option<String>,
    pub child: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum HierarchyError {
    #[error("Every node in the hierarchy must carry a key")]
    MissingKey,
    #[error("User {0} appears under more than one parent")]
    DuplicateChild(String),
    #[error("The hierarchy contains a cycle through {0}")]
    Cycle(String),
}

/// Flattens submitted trees into an edge list.
///
/// A top-level ghost node is unwrapped; its children (and any other
/// top-level nodes) become parentless edges. Fails if any node lacks a
/// key.
pub fn flatten_edges(roots: &[HierarchyNodeInput]) -> Result<Vec<HierarchyEdge>, HierarchyError> {
    let mut edges = Vec::new();
    for root in roots {
        let key = root.key.as_deref().ok_or(HierarchyError::MissingKey)?;
        if key == GHOST_NODE_KEY {
            for child in &root.children {
                walk(child, None, &mut edges)?;
            }
        } else {
            walk(root, None, &mut edges)?;
        }
    }
    Ok(edges)
}

fn walk(
    node: &HierarchyNodeInput,
    parent: Option<&str>,
    edges: &mut Vec<HierarchyEdge>,
) -> Result<(), HierarchyError> {
    let key = node.key.as_deref().ok_or(HierarchyError::MissingKey)?;
    edges.push(HierarchyEdge {
        parent: parent.map(str::to_string),
        child: key.to_string(),
    });
    for child in &node.children {
        walk(child, Some(key), edges)?;
    }
    Ok(())
}

/// Validates an edge set: no user under two parents, no cycles.
pub fn validate_edges(edges: &[HierarchyEdge]) -> Result<(), HierarchyError> {
    let mut seen = HashSet::new();
    for edge in edges {
        if !seen.insert(edge.child.as_str()) {
            return Err(HierarchyError::DuplicateChild(edge.child.clone()));
        }
    }

    // DFS coloring over parent -> children adjacency.
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        if let Some(parent) = edge.parent.as_deref() {
            adjacency.entry(parent).or_default().push(edge.child.as_str());
        }
    }

    #[derive(Clone, Copy, PartialEq)]
    enum Color {
        Gray,
        Black,
    }

    let mut colors: HashMap<&str, Color> = HashMap::new();
    let nodes: Vec<&str> = adjacency.keys().copied().collect();
    for start in nodes {
        if colors.contains_key(start) {
            continue;
        }
        // iterative DFS; the stack holds (node, entered) markers
        let mut stack = vec![(start, false)];
        while let Some((node, entered)) = stack.pop() {
            if entered {
                colors.insert(node, Color::Black);
                continue;
            }
            match colors.get(node) {
                Some(Color::Gray) => return Err(HierarchyError::Cycle(node.to_string())),
                Some(Color::Black) => continue,
                None => {}
            }
            colors.insert(node, Color::Gray);
            stack.push((node, true));
            if let Some(children) = adjacency.get(node) {
                for child in children {
                    match colors.get(child) {
                        Some(Color::Gray) => {
                            return Err(HierarchyError::Cycle(child.to_string()))
                        }
                        Some(Color::Black) => {}
                        None => stack.push((child, false)),
                    }
                }
            }
        }
    }
    Ok(())
}

/// A user as it appears in the hierarchy overview.
#[derive(Debug, Clone)]
pub struct HierarchyMember {
    pub key: String,
    pub role: UserRole,
    pub label: String,
}

/// One node of the hierarchy overview response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HierarchyNodeView {
    pub key: String,
    pub role: Option<UserRole>,
    pub label: String,
    pub parent_node: Option<String>,
    pub children: Vec<String>,
}

/// Builds the flat overview: one node per member plus a trailing ghost
/// node whose children are the parentless users that supervise someone.
pub fn build_overview(
    members: &[HierarchyMember],
    edges: &[HierarchyEdge],
) -> Vec<HierarchyNodeView> {
    let mut parents: HashMap<&str, &str> = HashMap::new();
    let mut children: HashMap<&str, Vec<String>> = HashMap::new();
    for edge in edges {
        if let Some(parent) = edge.parent.as_deref() {
            parents.insert(edge.child.as_str(), parent);
            children
                .entry(parent)
                .or_default()
                .push(edge.child.clone());
        }
    }

    let mut nodes: Vec<HierarchyNodeView> = members
        .iter()
        .map(|member| HierarchyNodeView {
            key: member.key.clone(),
            role: Some(member.role),
            label: member.label.clone(),
            parent_node: parents.get(member.key.as_str()).map(|p| p.to_string()),
            children: children.get(member.key.as_str()).cloned().unwrap_or_default(),
        })
        .collect();

    let ghost_children: Vec<String> = nodes
        .iter()
        .filter(|n| n.parent_node.is_none() && !n.children.is_empty())
        .map(|n| n.key.clone())
        .collect();

    nodes.push(HierarchyNodeView {
        key: GHOST_NODE_KEY.to_string(),
        role: None,
        label: GHOST_NODE_KEY.to_string(),
        parent_node: None,
        children: ghost_children,
    });

    nodes
}

/// Collects every descendant of `start`, breadth first. The visited set
/// makes the walk terminate even over a corrupt cyclic edge set.
pub fn collect_descendants(start: &str, edges: &[HierarchyEdge]) -> Vec<String> {
    let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        if let Some(parent) = edge.parent.as_deref() {
            adjacency.entry(parent).or_default().push(edge.child.as_str());
        }
    }

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(start);
    let mut queue: VecDeque<&str> = VecDeque::new();
    queue.push_back(start);
    let mut result = Vec::new();

    while let Some(node) = queue.pop_front() {
        if let Some(children) = adjacency.get(node) {
            for child in children {
                if visited.insert(child) {
                    result.push(child.to_string());
                    queue.push_back(child);
                }
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(key: &str, children: Vec<HierarchyNodeInput>) -> HierarchyNodeInput {
        HierarchyNodeInput {
            key: Some(key.to_string()),
            children,
        }
    }

    fn edge(parent: Option<&str>, child: &str) -> HierarchyEdge {
        HierarchyEdge {
            parent: parent.map(str::to_string),
            child: child.to_string(),
        }
    }

    #[test]
    fn test_flatten_unwraps_ghost_root() {
        let trees = vec![node(
            GHOST_NODE_KEY,
            vec![node("coach1", vec![node("ath1", vec![]), node("ath2", vec![])])],
        )];
        let edges = flatten_edges(&trees).unwrap();
        assert_eq!(
            edges,
            vec![
                edge(None, "coach1"),
                edge(Some("coach1"), "ath1"),
                edge(Some("coach1"), "ath2"),
            ]
        );
    }

    #[test]
    fn test_flatten_rejects_missing_key() {
        let trees = vec![node(
            GHOST_NODE_KEY,
            vec![HierarchyNodeInput {
                key: None,
                children: vec![],
            }],
        )];
        assert_eq!(flatten_edges(&trees), Err(HierarchyError::MissingKey));
    }

    #[test]
    fn test_validate_accepts_forest() {
        let edges = vec![
            edge(None, "c1"),
            edge(Some("c1"), "a1"),
            edge(None, "c2"),
            edge(Some("c2"), "a2"),
        ];
        assert!(validate_edges(&edges).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_child() {
        let edges = vec![
            edge(Some("c1"), "a1"),
            edge(Some("c2"), "a1"),
        ];
        assert_eq!(
            validate_edges(&edges),
            Err(HierarchyError::DuplicateChild("a1".to_string()))
        );
    }

    #[test]
    fn test_validate_rejects_cycle() {
        // a -> b -> c -> a, hand-built; tree input cannot express this
        let edges = vec![
            edge(Some("a"), "b"),
            edge(Some("b"), "c"),
            edge(Some("c"), "a"),
        ];
        assert!(matches!(
            validate_edges(&edges),
            Err(HierarchyError::Cycle(_))
        ));
    }

    #[test]
    fn test_validate_rejects_self_edge() {
        let edges = vec![edge(Some("a"), "a")];
        assert!(matches!(
            validate_edges(&edges),
            Err(HierarchyError::Cycle(_))
        ));
    }

    #[test]
    fn test_overview_appends_ghost_node() {
        let members = vec![
            HierarchyMember {
                key: "c1".into(),
                role: UserRole::Coach,
                label: "Coach One".into(),
            },
            HierarchyMember {
                key: "a1".into(),
                role: UserRole::Athlete,
                label: "Athlete One".into(),
            },
            HierarchyMember {
                key: "solo".into(),
                role: UserRole::Athlete,
                label: "Unattached".into(),
            },
        ];
        let edges = vec![edge(None, "c1"), edge(Some("c1"), "a1")];

        let overview = build_overview(&members, &edges);
        assert_eq!(overview.len(), 4);

        let coach = overview.iter().find(|n| n.key == "c1").unwrap();
        assert_eq!(coach.children, vec!["a1".to_string()]);
        assert_eq!(coach.parent_node, None);

        let ghost = overview.last().unwrap();
        assert_eq!(ghost.key, GHOST_NODE_KEY);
        assert_eq!(ghost.role, None);
        // only parentless users that supervise someone hang off the ghost
        assert_eq!(ghost.children, vec!["c1".to_string()]);
    }

    #[test]
    fn test_descendants_breadth_first() {
        let edges = vec![
            edge(Some("c1"), "a1"),
            edge(Some("c1"), "c2"),
            edge(Some("c2"), "a2"),
        ];
        let descendants = collect_descendants("c1", &edges);
        assert_eq!(descendants, vec!["a1", "c2", "a2"]);
    }

    #[test]
    fn test_descendants_terminate_on_corrupt_cycle() {
        let edges = vec![edge(Some("a"), "b"), edge(Some("b"), "a")];
        let descendants = collect_descendants("a", &edges);
        assert_eq!(descendants, vec!["b"]);
    }
}
