//! Workflow Graph Builder
//!
//! Accumulates nodes and edges and produces an immutable
//! [`WorkflowGraph`]. Validation happens as edges are added so an invalid
//! graph can never be built.

use std::collections::{BTreeMap, HashSet};

use tracing::{instrument, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{NodeId, TaskSpec, WorkflowGraph, WorkflowNode, WorkflowStep};

/// Builder for detour workflow graphs.
///
/// Node ids are placeholders allocated downward from `-1`; the runtime
/// replaces them when the graph is spliced in.
///
/// # Examples
///
/// ```
/// use vaspflow::domain::models::TaskSpec;
/// use vaspflow::services::WorkflowGraphBuilder;
///
/// let mut builder = WorkflowGraphBuilder::new();
/// let retry = builder.add_node("retry", vec![], TaskSpec::default());
/// let ingest = builder.add_node("ingest", vec![], TaskSpec::default());
/// builder.add_edge(retry, ingest).unwrap();
/// let graph = builder.build().unwrap();
/// assert_eq!(graph.edge_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct WorkflowGraphBuilder {
    next_id: i64,
    nodes: Vec<WorkflowNode>,
    /// parent -> children
    edges: BTreeMap<NodeId, Vec<NodeId>>,
}

impl WorkflowGraphBuilder {
    pub const fn new() -> Self {
        Self {
            next_id: -1,
            nodes: Vec::new(),
            edges: BTreeMap::new(),
        }
    }

    /// Add a node and return its placeholder id.
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        steps: Vec<WorkflowStep>,
        spec: TaskSpec,
    ) -> NodeId {
        let id = NodeId::new(self.next_id);
        self.next_id -= 1;
        self.nodes.push(WorkflowNode {
            id,
            name: name.into(),
            steps,
            spec,
        });
        id
    }

    /// Add an edge: `parent` must finish before `child` starts.
    ///
    /// Fails if either node is unknown, the edge already exists, or the
    /// edge would close a cycle.
    #[instrument(skip(self), fields(parent = %parent, child = %child))]
    pub fn add_edge(&mut self, parent: NodeId, child: NodeId) -> DomainResult<()> {
        if !self.contains(parent) {
            return Err(DomainError::InvalidGraph(format!(
                "Parent node {parent} does not exist. Add the node before creating edges."
            )));
        }
        if !self.contains(child) {
            return Err(DomainError::InvalidGraph(format!(
                "Child node {child} does not exist. Add the node before creating edges."
            )));
        }

        if self.children_of(parent).contains(&child) {
            warn!("edge already exists, rejecting duplicate");
            return Err(DomainError::InvalidGraph(format!(
                "Edge from {parent} to {child} already exists"
            )));
        }

        if self.reaches(child, parent) {
            return Err(DomainError::InvalidGraph(format!(
                "Adding edge from {parent} to {child} would create a cycle"
            )));
        }

        self.edges.entry(parent).or_default().push(child);
        Ok(())
    }

    /// Finish the graph. An empty graph is rejected.
    pub fn build(self) -> DomainResult<WorkflowGraph> {
        if self.nodes.is_empty() {
            return Err(DomainError::InvalidGraph(
                "workflow graph has no nodes".to_string(),
            ));
        }
        Ok(WorkflowGraph::from_parts(self.nodes, self.edges))
    }

    fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.edges.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Depth-first search along existing edges from `from` to `to`.
    fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let mut visited = HashSet::new();
        let mut stack = vec![from];

        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !visited.insert(current) {
                continue;
            }
            stack.extend(
                self.children_of(current)
                    .iter()
                    .filter(|c| !visited.contains(*c)),
            );
        }

        false
    }
}

impl Default for WorkflowGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
