//! Workflow graph handed to the embedding runtime as a detour.
//!
//! A [`WorkflowGraph`] is immutable once built. It is assembled by
//! [`WorkflowGraphBuilder`](crate::services::WorkflowGraphBuilder), which
//! guarantees every edge references a known node and that the graph is
//! acyclic.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::spec::TaskSpec;
use super::task_config::{CopyConfig, IngestConfig};

/// Placeholder node identifier.
///
/// Synthesized graphs use negative ids; the runtime replaces them with real
/// ids when it splices the graph in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn value(self) -> i64 {
        self.0
    }

    pub const fn is_placeholder(self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One executable step of a workflow node.
///
/// `Stage`, `Copy` and `IngestAndClassify` run in-process. The two
/// corrective steps delegate to external collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowStep {
    /// Write the spec's input set into the working directory.
    Stage,
    /// Copy artifacts of the previous run into the working directory.
    Copy { config: CopyConfig },
    /// Ingest the previous run and decide how the workflow continues.
    IngestAndClassify { config: IngestConfig },
    /// Adjust working inputs so the retried run can converge.
    SetupConvergenceHandler,
    /// Execute the corrective simulation run.
    CorrectiveRun,
}

impl WorkflowStep {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stage => "stage",
            Self::Copy { .. } => "copy",
            Self::IngestAndClassify { .. } => "ingest_and_classify",
            Self::SetupConvergenceHandler => "setup_convergence_handler",
            Self::CorrectiveRun => "corrective_run",
        }
    }
}

/// A node of a workflow graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowNode {
    pub id: NodeId,
    pub name: String,
    pub steps: Vec<WorkflowStep>,
    pub spec: TaskSpec,
}

/// Immutable DAG of workflow nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowGraph {
    id: Uuid,
    created_at: DateTime<Utc>,
    nodes: Vec<WorkflowNode>,
    /// Parent to children, in insertion order per parent.
    edges: BTreeMap<NodeId, Vec<NodeId>>,
}

impl WorkflowGraph {
    /// Assemble a graph from parts already validated by the builder.
    pub(crate) fn from_parts(nodes: Vec<WorkflowNode>, edges: BTreeMap<NodeId, Vec<NodeId>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            nodes,
            edges,
        }
    }

    pub const fn id(&self) -> Uuid {
        self.id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn nodes(&self) -> &[WorkflowNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// All edges as `(parent, child)` pairs.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.edges
            .iter()
            .flat_map(|(from, tos)| tos.iter().map(move |to| (*from, *to)))
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.edges.get(&id).cloned().unwrap_or_default()
    }

    pub fn parents(&self, id: NodeId) -> Vec<NodeId> {
        self.edges
            .iter()
            .filter(|(_, children)| children.contains(&id))
            .map(|(parent, _)| *parent)
            .collect()
    }

    /// Nodes without parents, in node order.
    pub fn roots(&self) -> Vec<NodeId> {
        let with_parents: HashSet<NodeId> = self.edges.values().flatten().copied().collect();
        self.nodes
            .iter()
            .map(|n| n.id)
            .filter(|id| !with_parents.contains(id))
            .collect()
    }
}
