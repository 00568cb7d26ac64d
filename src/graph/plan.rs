//! Per-invocation execution plans.

use std::collections::{BTreeSet, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::core::error::AssetError;
use crate::graph::task::TaskGraph;

/// Tasks grouped into levels; every task of a level only depends on
/// tasks of earlier levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    levels: Vec<Vec<String>>,
    edges: Vec<(String, String)>,
}

impl Plan {
    /// Levels in execution order; names within a level are sorted.
    pub fn levels(&self) -> &[Vec<String>] {
        &self.levels
    }

    /// Every planned task, level by level.
    pub fn order(&self) -> Vec<&str> {
        self.levels
            .iter()
            .flat_map(|level| level.iter().map(String::as_str))
            .collect()
    }

    pub fn task_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.levels.iter().any(|level| level.iter().any(|n| n == name))
    }

    /// Tasks that must complete before `name` in this plan.
    pub fn prerequisites_of(&self, name: &str) -> Vec<&str> {
        self.edges
            .iter()
            .filter(|(_, to)| to == name)
            .map(|(from, _)| from.as_str())
            .collect()
    }
}

struct Builder<'g, C> {
    graph: &'g TaskGraph<C>,
    dag: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl<'g, C> Builder<'g, C> {
    fn node(&mut self, name: &str) -> NodeIndex {
        if let Some(&idx) = self.nodes.get(name) {
            return idx;
        }
        let idx = self.dag.add_node(name.to_string());
        self.nodes.insert(name.to_string(), idx);
        idx
    }

    fn edge(&mut self, from: &str, to: &str) {
        let a = self.node(from);
        let b = self.node(to);
        if !self.dag.contains_edge(a, b) {
            self.dag.add_edge(a, b, ());
        }
    }

    /// `name` and every task it transitively requires.
    fn closure(&self, name: &str) -> Result<BTreeSet<String>, AssetError> {
        let mut seen = BTreeSet::new();
        let mut stack = vec![self.graph.resolve(name)?.name().to_string()];
        while let Some(current) = stack.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            let task = self.graph.resolve(&current)?;
            for prereq in task.prerequisites() {
                stack.push(self.graph.resolve(prereq)?.name().to_string());
            }
        }
        Ok(seen)
    }

    fn expand(&mut self, requested: &[&str]) -> Result<(), AssetError> {
        let graph = self.graph;
        let mut stack = Vec::new();
        for name in requested {
            let task = graph.resolve(name)?;
            self.node(task.name());
            stack.push(task.name().to_string());
        }

        let mut done = BTreeSet::new();
        while let Some(name) = stack.pop() {
            if !done.insert(name.clone()) {
                continue;
            }
            let task = graph.resolve(&name)?;

            for prereq in task.prerequisites() {
                let prereq = graph.resolve(prereq)?.name().to_string();
                self.edge(&prereq, &name);
                stack.push(prereq);
            }

            // Each step waits for everything the previous step required.
            let steps = task.series_steps();
            for pair in steps.windows(2) {
                let mut before = BTreeSet::new();
                for prev in pair[0].tasks() {
                    before.extend(self.closure(prev)?);
                }
                for next in pair[1].tasks() {
                    for member in self.closure(next)? {
                        if before.contains(&member) {
                            continue;
                        }
                        for prev in pair[0].tasks() {
                            let prev = graph.resolve(prev)?.name().to_string();
                            self.edge(&prev, &member);
                        }
                        stack.push(member);
                    }
                }
            }
        }
        Ok(())
    }
}

/// Plan the tasks needed to run every task in `requested`.
///
/// Unknown names and dependency cycles are configuration errors.
pub fn plan<C>(graph: &TaskGraph<C>, requested: &[&str]) -> Result<Plan, AssetError> {
    let mut builder = Builder {
        graph,
        dag: DiGraph::new(),
        nodes: HashMap::new(),
    };
    builder.expand(requested)?;

    let dag = builder.dag;
    let order = toposort(&dag, None).map_err(|cycle| {
        AssetError::config(format!(
            "task dependency cycle involving `{}`",
            dag[cycle.node_id()]
        ))
    })?;

    let mut depth: HashMap<NodeIndex, usize> = HashMap::new();
    let mut levels: Vec<Vec<String>> = Vec::new();
    for node in order {
        let level = dag
            .neighbors_directed(node, Direction::Incoming)
            .filter_map(|pred| depth.get(&pred).map(|d| d + 1))
            .max()
            .unwrap_or(0);
        depth.insert(node, level);
        if levels.len() <= level {
            levels.resize(level + 1, Vec::new());
        }
        levels[level].push(dag[node].clone());
    }
    for level in &mut levels {
        level.sort();
    }

    let edges = dag
        .edge_indices()
        .filter_map(|e| dag.edge_endpoints(e))
        .map(|(a, b)| (dag[a].clone(), dag[b].clone()))
        .collect();

    Ok(Plan { levels, edges })
}
