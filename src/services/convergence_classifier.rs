//! Convergence classifier.
//!
//! Decides whether a failed run can be retried. A retry is possible only
//! when the lineage has never been retried and the diagnostic confirms an
//! electronic non-convergence in the run's primary output.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::domain::errors::DomainResult;
use crate::domain::models::{ConvergenceRetry, RunRecord, TaskSpec, PRIMARY_OUTPUT_FILE};
use crate::domain::ports::ConvergenceDiagnostic;
use crate::services::relaxation::most_recent_version;

/// Verdict for a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Non-convergence on a lineage that may still be retried.
    Recoverable,
    Unrecoverable(UnrecoverableReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnrecoverableReason {
    /// The lineage already used its one convergence retry.
    RetryExhausted,
    /// The diagnostic did not confirm non-convergence.
    NotConvergenceFailure,
}

impl fmt::Display for UnrecoverableReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryExhausted => write!(f, "retry_exhausted"),
            Self::NotConvergenceFailure => write!(f, "not_convergence_failure"),
        }
    }
}

pub struct ConvergenceClassifier {
    diagnostic: Arc<dyn ConvergenceDiagnostic>,
}

impl ConvergenceClassifier {
    pub fn new(diagnostic: Arc<dyn ConvergenceDiagnostic>) -> Self {
        Self { diagnostic }
    }

    /// Effective retry state of a run's lineage.
    ///
    /// Tags from the node spec and from the ingested record both count.
    pub fn lineage_state(record: &RunRecord, spec: &TaskSpec) -> ConvergenceRetry {
        let lineage = spec.run_tags.union(record.run_tags());
        spec.convergence_retry.for_lineage(&lineage)
    }

    /// Classify a failed run located in `run_dir`.
    ///
    /// The diagnostic is skipped entirely for lineages that cannot retry.
    #[instrument(skip(self, record, spec))]
    pub async fn classify(
        &self,
        run_dir: &Path,
        record: &RunRecord,
        spec: &TaskSpec,
    ) -> DomainResult<Classification> {
        let state = Self::lineage_state(record, spec);
        if !state.can_retry() {
            debug!(%state, "lineage already retried");
            return Ok(Classification::Unrecoverable(
                UnrecoverableReason::RetryExhausted,
            ));
        }

        let output = most_recent_version(&run_dir.join(PRIMARY_OUTPUT_FILE)).await;
        let unconverged = self.diagnostic.is_unconverged(&output).await?;
        debug!(output = %output.display(), unconverged, "convergence diagnostic");

        Ok(if unconverged {
            Classification::Recoverable
        } else {
            Classification::Unrecoverable(UnrecoverableReason::NotConvergenceFailure)
        })
    }
}
