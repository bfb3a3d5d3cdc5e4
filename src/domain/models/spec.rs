//! Node specifications passed between workflow nodes.
//!
//! A [`TaskSpec`] is handed to every task invocation. Values a task wants to
//! pass downstream travel in a [`SpecUpdate`] which the runtime merges into
//! the specs of descendant nodes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Run tag marking a lineage that already received a convergence retry.
pub const CONVERGENCE_GUARD_TAG: &str = "unconverged_handler";

/// Logical handle to a previous run directory.
///
/// Usually an absolute path recorded when the run finished. The directory
/// may since have moved; see the location resolver.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunHandle(String);

impl RunHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `block_...` tail of the handle, if it has one.
    pub fn block_part(&self) -> Option<&str> {
        self.0.find("block_").map(|idx| &self.0[idx..])
    }
}

impl fmt::Display for RunHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&std::path::Path> for RunHandle {
    fn from(path: &std::path::Path) -> Self {
        Self(path.to_string_lossy().into_owned())
    }
}

/// Ordered set of run labels accumulated across a run's ancestry.
///
/// Insertion order is kept and duplicates are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct RunTags(Vec<String>);

impl RunTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    /// Append a tag unless it is already present.
    pub fn insert(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.contains(&tag) {
            self.0.push(tag);
        }
    }

    /// Copy of these tags with `tag` appended once.
    #[must_use]
    pub fn with_tag(&self, tag: impl Into<String>) -> Self {
        let mut tags = self.clone();
        tags.insert(tag);
        tags
    }

    /// Tags of `self` followed by any of `other` not already present.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut tags = self.clone();
        for tag in &other.0 {
            tags.insert(tag.clone());
        }
        tags
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for RunTags {
    fn from(tags: Vec<String>) -> Self {
        let mut set = Self::new();
        for tag in tags {
            set.insert(tag);
        }
        set
    }
}

impl From<RunTags> for Vec<String> {
    fn from(tags: RunTags) -> Self {
        tags.0
    }
}

impl<S: Into<String>> FromIterator<S> for RunTags {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

/// Convergence-retry state carried along a run's lineage.
///
/// Only a lineage that has never been retried may receive a corrective
/// detour. Retries are bounded to depth one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvergenceRetry {
    #[default]
    NeverAttempted,
    RetryInFlight,
    RetryExhausted,
}

impl ConvergenceRetry {
    /// Effective state for a lineage, honouring the legacy guard tag.
    ///
    /// Lineages written before the explicit state existed only carry
    /// [`CONVERGENCE_GUARD_TAG`]; a tagged lineage counts as already retried.
    pub fn for_lineage(self, tags: &RunTags) -> Self {
        if self == Self::NeverAttempted && tags.contains(CONVERGENCE_GUARD_TAG) {
            Self::RetryInFlight
        } else {
            self
        }
    }

    pub const fn can_retry(self) -> bool {
        matches!(self, Self::NeverAttempted)
    }

    /// State once a run of this lineage has failed for good: an in-flight
    /// retry is spent.
    #[must_use]
    pub const fn after_failure(self) -> Self {
        match self {
            Self::RetryInFlight | Self::RetryExhausted => Self::RetryExhausted,
            Self::NeverAttempted => Self::NeverAttempted,
        }
    }
}

impl fmt::Display for ConvergenceRetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NeverAttempted => write!(f, "never_attempted"),
            Self::RetryInFlight => write!(f, "retry_in_flight"),
            Self::RetryExhausted => write!(f, "retry_exhausted"),
        }
    }
}

/// Opaque duplicate-detection strategy tag, interpreted by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DuplicateStrategy(String);

impl DuplicateStrategy {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Scheduler resource hints for a node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueHints {
    /// Number of compute nodes to request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nnodes: Option<u32>,
}

/// Rendered simulation input files: file name to contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputSet(BTreeMap<String, String>);

impl InputSet {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, contents: impl Into<String>) -> Self {
        self.0.insert(name.into(), contents.into());
        self
    }

    pub fn files(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parameters describing one workflow node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskSpec {
    /// Handle of the run this node consumes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_run_dir: Option<RunHandle>,

    /// Task type of this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    /// Task type of the node that produced `prev_run_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_task_type: Option<String>,

    /// Structure descriptor of the simulated structure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_group_id: Option<Value>,

    #[serde(default)]
    pub run_tags: RunTags,

    #[serde(default)]
    pub convergence_retry: ConvergenceRetry,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_strategy: Option<DuplicateStrategy>,

    /// Run this node even if a parent fizzles.
    #[serde(default)]
    pub allow_fizzled_parents: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue: Option<QueueHints>,

    /// Inputs written by the stage step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<InputSet>,

    /// Analysis payload of the last successful ingestion upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
}

impl TaskSpec {
    /// Merge a forwarded update into this spec. Fields present in the
    /// update overwrite the current values.
    pub fn apply_update(&mut self, update: &SpecUpdate) {
        if let Some(ref dir) = update.prev_run_dir {
            self.prev_run_dir = Some(dir.clone());
        }
        if let Some(ref task_type) = update.prev_task_type {
            self.prev_task_type = Some(task_type.clone());
        }
        if let Some(ref tags) = update.run_tags {
            self.run_tags = tags.clone();
        }
        if let Some(ref structure) = update.structure {
            self.structure = Some(structure.clone());
        }
        if let Some(ref group) = update.structure_group_id {
            self.structure_group_id = Some(group.clone());
        }
        if let Some(ref analysis) = update.analysis {
            self.analysis = Some(analysis.clone());
        }
    }
}

/// Values a completed task forwards to descendant node specs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_run_dir: Option<RunHandle>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev_task_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_tags: Option<RunTags>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure_group_id: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
}

impl SpecUpdate {
    /// Overlay `later` on this update; fields set in `later` win.
    pub fn merge(&mut self, later: Self) {
        if later.prev_run_dir.is_some() {
            self.prev_run_dir = later.prev_run_dir;
        }
        if later.prev_task_type.is_some() {
            self.prev_task_type = later.prev_task_type;
        }
        if later.run_tags.is_some() {
            self.run_tags = later.run_tags;
        }
        if later.structure.is_some() {
            self.structure = later.structure;
        }
        if later.structure_group_id.is_some() {
            self.structure_group_id = later.structure_group_id;
        }
        if later.analysis.is_some() {
            self.analysis = later.analysis;
        }
    }
}
