use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::models::{Dataset, DatasetId, Forecast, Insight, KpiSet, ShareLink};

/// Pipeline phase of the dashboard workflow.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowPhase {
    #[default]
    Idle,
    Uploading,
    Analyzing,
    Ready,
    Error,
}

impl WorkflowPhase {
    /// A request cycle is in flight; new uploads are rejected.
    pub fn is_busy(&self) -> bool {
        matches!(self, WorkflowPhase::Uploading | WorkflowPhase::Analyzing)
    }
}

impl fmt::Display for WorkflowPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WorkflowPhase::Idle => "idle",
            WorkflowPhase::Uploading => "uploading",
            WorkflowPhase::Analyzing => "analyzing",
            WorkflowPhase::Ready => "ready",
            WorkflowPhase::Error => "error",
        })
    }
}

/// Presentation tab of the dashboard.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardView {
    #[default]
    Overview,
    Analytics,
    Forecast,
    Insights,
}

impl DashboardView {
    pub const ALL: [DashboardView; 4] = [
        DashboardView::Overview,
        DashboardView::Analytics,
        DashboardView::Forecast,
        DashboardView::Insights,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DashboardView::Overview => "Overview",
            DashboardView::Analytics => "Analytics",
            DashboardView::Forecast => "Forecast",
            DashboardView::Insights => "Insights",
        }
    }
}

impl fmt::Display for DashboardView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DashboardView::Overview => "overview",
            DashboardView::Analytics => "analytics",
            DashboardView::Forecast => "forecast",
            DashboardView::Insights => "insights",
        })
    }
}

impl FromStr for DashboardView {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overview" => Ok(DashboardView::Overview),
            "analytics" => Ok(DashboardView::Analytics),
            "forecast" => Ok(DashboardView::Forecast),
            "insights" => Ok(DashboardView::Insights),
            _ => Err(format!("unknown view '{s}'")),
        }
    }
}

/// Consistent copy of the controller state.
///
/// `kpis` and `forecast` hold whatever the current cycle has written so
/// far; use [`WorkflowSnapshot::kpis`] and [`WorkflowSnapshot::forecast`]
/// to read them only when they are valid for presentation. Serialization
/// goes through the same accessors.
#[derive(Clone, Debug, Default)]
pub struct WorkflowSnapshot {
    pub phase: WorkflowPhase,
    pub view: DashboardView,
    pub dataset: Option<Dataset>,
    pub(crate) kpis: Option<KpiSet>,
    pub(crate) forecast: Option<Forecast>,
    pub last_error: Option<String>,
    pub share_link: Option<ShareLink>,
    pub cycle: u64,
}

impl Serialize for WorkflowSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("WorkflowSnapshot", 8)?;
        state.serialize_field("phase", &self.phase)?;
        state.serialize_field("view", &self.view)?;
        state.serialize_field("dataset", &self.dataset)?;
        state.serialize_field("kpis", &self.kpis())?;
        state.serialize_field("forecast", &self.forecast())?;
        state.serialize_field("last_error", &self.last_error)?;
        state.serialize_field("share_link", &self.share_link)?;
        state.serialize_field("cycle", &self.cycle)?;
        state.end()
    }
}

impl WorkflowSnapshot {
    pub fn dataset_id(&self) -> Option<&DatasetId> {
        self.dataset.as_ref().map(|dataset| &dataset.id)
    }

    /// KPIs, only while Ready and attached to the held dataset.
    pub fn kpis(&self) -> Option<&KpiSet> {
        self.kpis
            .as_ref()
            .filter(|kpis| self.is_presentable(&kpis.dataset_id))
    }

    /// Forecast, only while Ready and attached to the held dataset.
    pub fn forecast(&self) -> Option<&Forecast> {
        self.forecast
            .as_ref()
            .filter(|forecast| self.is_presentable(&forecast.dataset_id))
    }

    pub fn insights(&self) -> &[Insight] {
        self.forecast()
            .map(|forecast| forecast.insights.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_share_open(&self) -> bool {
        self.share_link.is_some()
    }

    fn is_presentable(&self, dataset_id: &DatasetId) -> bool {
        self.phase == WorkflowPhase::Ready && self.dataset_id() == Some(dataset_id)
    }

    /// Whether a completion for `dataset_id` issued in `cycle` may still be applied.
    pub(crate) fn is_current(&self, cycle: u64, dataset_id: &DatasetId) -> bool {
        self.cycle == cycle && self.dataset_id() == Some(dataset_id)
    }

    pub(crate) fn start_upload(&mut self) -> u64 {
        self.cycle += 1;
        self.phase = WorkflowPhase::Uploading;
        self.dataset = None;
        self.kpis = None;
        self.forecast = None;
        self.last_error = None;
        self.share_link = None;
        self.cycle
    }

    pub(crate) fn start_analysis(&mut self) -> u64 {
        self.cycle += 1;
        self.phase = WorkflowPhase::Analyzing;
        self.kpis = None;
        self.forecast = None;
        self.last_error = None;
        self.cycle
    }

    pub(crate) fn reset(&mut self) {
        *self = WorkflowSnapshot {
            cycle: self.cycle + 1,
            ..WorkflowSnapshot::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dataset(id: &str) -> Dataset {
        Dataset {
            id: DatasetId::from(id),
            filename: "sales.csv".to_string(),
            row_count: 10,
            uploaded_at: Utc::now(),
        }
    }

    #[test]
    fn results_hidden_until_ready() {
        let mut snapshot = WorkflowSnapshot::default();
        snapshot.start_upload();
        snapshot.dataset = Some(dataset("d1"));
        snapshot.phase = WorkflowPhase::Analyzing;
        snapshot.kpis = Some(KpiSet::new("d1".into()).with_metric("revenue", 1.0));

        assert!(snapshot.kpis().is_none());
        snapshot.phase = WorkflowPhase::Ready;
        assert_eq!(snapshot.kpis().and_then(|k| k.get("revenue")), Some(1.0));
    }

    #[test]
    fn serialized_snapshot_omits_results_until_ready() {
        let mut snapshot = WorkflowSnapshot::default();
        snapshot.start_upload();
        snapshot.dataset = Some(dataset("d1"));
        snapshot.phase = WorkflowPhase::Analyzing;
        snapshot.kpis = Some(KpiSet::new("d1".into()).with_metric("revenue", 1.0));

        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["phase"], "analyzing");
        assert!(value["kpis"].is_null());
        assert!(value["forecast"].is_null());

        snapshot.phase = WorkflowPhase::Ready;
        let value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(value["kpis"]["dataset_id"], "d1");
    }

    #[test]
    fn results_for_other_dataset_are_not_presentable() {
        let mut snapshot = WorkflowSnapshot {
            phase: WorkflowPhase::Ready,
            dataset: Some(dataset("d2")),
            ..WorkflowSnapshot::default()
        };
        snapshot.kpis = Some(KpiSet::new("d1".into()));
        assert!(snapshot.kpis().is_none());
    }

    #[test]
    fn reset_advances_cycle_and_clears_state() {
        let mut snapshot = WorkflowSnapshot::default();
        let cycle = snapshot.start_upload();
        snapshot.view = DashboardView::Insights;
        snapshot.reset();

        assert_eq!(snapshot.phase, WorkflowPhase::Idle);
        assert_eq!(snapshot.view, DashboardView::Overview);
        assert!(snapshot.cycle > cycle);
    }

    #[test]
    fn view_round_trips_through_strings() {
        for view in DashboardView::ALL {
            assert_eq!(view.to_string().parse::<DashboardView>().unwrap(), view);
        }
        assert!("reports".parse::<DashboardView>().is_err());
    }
}
