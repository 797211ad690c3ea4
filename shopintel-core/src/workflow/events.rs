use crate::models::DatasetId;

use super::WorkflowPhase;

/// Notifications published by the controller for the presentation layer.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkflowEvent {
    PhaseChanged {
        cycle: u64,
        phase: WorkflowPhase,
    },
    DatasetAccepted {
        cycle: u64,
        dataset_id: DatasetId,
    },
    KpisFailed {
        dataset_id: DatasetId,
        reason: String,
    },
    ForecastFailed {
        dataset_id: DatasetId,
        reason: String,
    },
    /// A completion arrived for a superseded cycle and was dropped.
    StaleResultDiscarded {
        cycle: u64,
        dataset_id: DatasetId,
    },
    ReportExported {
        filename: String,
    },
    ReportExportFailed {
        reason: String,
    },
    ShareRegistered {
        share_url: String,
    },
    ShareFailed {
        reason: String,
    },
}
