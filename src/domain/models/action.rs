//! Outcome returned by every task invocation.

use serde::Serialize;
use serde_json::{Map, Value};

use super::spec::SpecUpdate;
use super::workflow::WorkflowGraph;

/// How the runtime continues after a task.
///
/// Exactly one of these applies per invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// Continue normally, optionally forwarding values to descendants.
    Complete {
        #[serde(skip_serializing_if = "Option::is_none")]
        update_spec: Option<SpecUpdate>,
    },
    /// Splice a new sub-workflow in after this node.
    Detour { workflow: WorkflowGraph },
    /// Permanently suppress all descendants of this node.
    Defuse,
}

/// Action returned by a task: stored diagnostics plus the outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Action {
    stored_data: Map<String, Value>,
    outcome: ActionOutcome,
}

impl Action {
    pub fn complete() -> Self {
        Self::with_outcome(ActionOutcome::Complete { update_spec: None })
    }

    pub fn complete_with_update(update: SpecUpdate) -> Self {
        Self::with_outcome(ActionOutcome::Complete {
            update_spec: Some(update),
        })
    }

    pub fn detour(workflow: WorkflowGraph) -> Self {
        Self::with_outcome(ActionOutcome::Detour { workflow })
    }

    pub fn defuse() -> Self {
        Self::with_outcome(ActionOutcome::Defuse)
    }

    fn with_outcome(outcome: ActionOutcome) -> Self {
        Self {
            stored_data: Map::new(),
            outcome,
        }
    }

    /// Record a diagnostic value kept in the node's history.
    #[must_use]
    pub fn stored(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.stored_data.insert(key.into(), value.into());
        self
    }

    pub const fn stored_data(&self) -> &Map<String, Value> {
        &self.stored_data
    }

    pub const fn outcome(&self) -> &ActionOutcome {
        &self.outcome
    }

    pub const fn update_spec(&self) -> Option<&SpecUpdate> {
        match &self.outcome {
            ActionOutcome::Complete { update_spec } => update_spec.as_ref(),
            _ => None,
        }
    }

    pub const fn detour_workflow(&self) -> Option<&WorkflowGraph> {
        match &self.outcome {
            ActionOutcome::Detour { workflow } => Some(workflow),
            _ => None,
        }
    }

    pub const fn defuse_children(&self) -> bool {
        matches!(self.outcome, ActionOutcome::Defuse)
    }

    /// True when the runtime should stop running the node's remaining steps.
    pub const fn ends_node(&self) -> bool {
        !matches!(self.outcome, ActionOutcome::Complete { .. })
    }

    /// Fold a later step's action into this one: stored data is merged and
    /// the later outcome wins. Two completions merge their spec updates
    /// field by field, the later step's fields taking precedence.
    #[must_use]
    pub fn then(mut self, later: Self) -> Self {
        self.stored_data.extend(later.stored_data);
        let outcome = match (self.outcome, later.outcome) {
            (
                ActionOutcome::Complete { update_spec: earlier },
                ActionOutcome::Complete { update_spec: later_update },
            ) => ActionOutcome::Complete {
                update_spec: match (earlier, later_update) {
                    (Some(mut merged), Some(later_update)) => {
                        merged.merge(later_update);
                        Some(merged)
                    }
                    (earlier, later_update) => later_update.or(earlier),
                },
            },
            (_, later_outcome) => later_outcome,
        };
        Self {
            stored_data: self.stored_data,
            outcome,
        }
    }
}
