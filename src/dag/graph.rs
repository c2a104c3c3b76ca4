// src/dag/graph.rs

use std::collections::HashMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::engine::TaskName;
use crate::errors::{Result, SitepipeError};
use crate::task::{Combinator, LeafKind, Task};

/// Internal node structure: the leaf it runs plus immediate deps and dependents.
#[derive(Debug, Clone)]
struct DagNode {
    leaf: LeafKind,
    /// Direct dependencies: nodes that must succeed before this one can run.
    deps: Vec<TaskName>,
    /// Direct dependents: nodes that depend on this one.
    dependents: Vec<TaskName>,
}

/// Dependency graph of leaf instances, lowered from a task tree.
///
/// Lowering rules:
/// - a leaf becomes one node depending on every predecessor handed to it;
/// - `sequential` threads the exits of each child into the next child;
/// - `parallel` hands the same predecessors to every child and exposes the
///   union of their exits.
///
/// A leaf used more than once in a tree (e.g. `clean` in `deploy`) gets one
/// node per use: `clean`, `clean#2`, ...
#[derive(Debug, Clone)]
pub struct DagGraph {
    /// Node names in declaration order.
    order: Vec<TaskName>,
    nodes: HashMap<TaskName, DagNode>,
}

impl DagGraph {
    /// Lower a task tree and check the result is acyclic.
    pub fn from_task(task: &Task) -> Result<Self> {
        let mut graph = Self {
            order: Vec::new(),
            nodes: HashMap::new(),
        };
        graph.lower(task, &[]);
        graph.link_dependents();
        graph.topological_order()?;
        Ok(graph)
    }

    /// Returns the exit nodes of `task`.
    fn lower(&mut self, task: &Task, preds: &[TaskName]) -> Vec<TaskName> {
        match task {
            Task::Leaf(kind) => {
                let name = self.unique_name(*kind);
                self.nodes.insert(
                    name.clone(),
                    DagNode {
                        leaf: *kind,
                        deps: dedup(preds),
                        dependents: Vec::new(),
                    },
                );
                self.order.push(name.clone());
                vec![name]
            }
            Task::Composite(c) => match c.combinator {
                Combinator::Sequential => {
                    let mut current = preds.to_vec();
                    for child in &c.children {
                        current = self.lower(child, &current);
                    }
                    current
                }
                Combinator::Parallel => {
                    if c.children.is_empty() {
                        return preds.to_vec();
                    }
                    let mut exits = Vec::new();
                    for child in &c.children {
                        exits.extend(self.lower(child, preds));
                    }
                    dedup(&exits)
                }
            },
        }
    }

    fn unique_name(&self, kind: LeafKind) -> TaskName {
        let base = kind.as_str();
        if !self.nodes.contains_key(base) {
            return base.to_string();
        }
        (2..)
            .map(|n| format!("{base}#{n}"))
            .find(|candidate| !self.nodes.contains_key(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn link_dependents(&mut self) {
        let names = self.order.clone();
        for name in names {
            let deps = self
                .nodes
                .get(&name)
                .map(|n| n.deps.clone())
                .unwrap_or_default();
            for dep in deps {
                if let Some(dep_node) = self.nodes.get_mut(&dep) {
                    dep_node.dependents.push(name.clone());
                }
            }
        }
    }

    /// Node names in a valid execution order.
    ///
    /// Edge direction: dep -> task.
    pub fn topological_order(&self) -> Result<Vec<TaskName>> {
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for name in &self.order {
            graph.add_node(name.as_str());
        }
        for (name, node) in &self.nodes {
            for dep in &node.deps {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
            Err(cycle) => Err(SitepipeError::DagCycle(format!(
                "cycle detected in task graph involving '{}'",
                cycle.node_id()
            ))),
        }
    }

    /// Return all node names in declaration order.
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn leaf_of(&self, name: &str) -> Option<LeafKind> {
        self.nodes.get(name).map(|n| n.leaf)
    }

    /// Immediate dependencies of a node.
    pub fn dependencies_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.deps.as_slice())
            .unwrap_or(&[])
    }

    /// Immediate dependents of a node.
    pub fn dependents_of(&self, name: &str) -> &[TaskName] {
        self.nodes
            .get(name)
            .map(|n| n.dependents.as_slice())
            .unwrap_or(&[])
    }
}

fn dedup(names: &[TaskName]) -> Vec<TaskName> {
    let mut out: Vec<TaskName> = Vec::with_capacity(names.len());
    for name in names {
        if !out.contains(name) {
            out.push(name.clone());
        }
    }
    out
}
