mod common;

use std::sync::Arc;

use common::*;
use shopintel::errors::{AnalysisError, ForecastError, IngestionError, RenderError, WorkflowError};
use shopintel::models::{DatasetId, KpiSet};
use shopintel::workflow::WorkflowEvent;
use shopintel::{DashboardView, WorkflowPhase};

fn drain(rx: &mut tokio::sync::broadcast::Receiver<WorkflowEvent>) -> Vec<WorkflowEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn test_upload_reaches_ready_with_matching_results() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    let controller = controller(backend.clone(), dir.path());

    let report = controller.submit_upload(csv("sales.csv")).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(report.phase, WorkflowPhase::Ready);
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert_eq!(snapshot.view, DashboardView::Overview);

    let dataset = snapshot.dataset.as_ref().unwrap();
    assert_eq!(dataset.filename, "sales.csv");
    assert_eq!(dataset.row_count, 500);
    let kpis = snapshot.kpis().unwrap();
    assert_eq!(kpis.dataset_id, dataset.id);
    assert_eq!(kpis.get("revenue"), Some(12000.0));
    assert_eq!(kpis.len(), 1);
    let forecast = snapshot.forecast().unwrap();
    assert_eq!(forecast.dataset_id, dataset.id);
    assert_eq!(snapshot.insights()[0].message, "Q4 uptick");

    assert_eq!(backend.uploads(), 1);
    assert_eq!(backend.kpi_requests(), 1);
    assert_eq!(backend.forecast_requests(), 1);
}

#[tokio::test]
async fn test_transport_error_on_upload_is_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.push_upload(Err(IngestionError::Transport(
        "connection refused".to_string(),
    )));
    let controller = controller(backend.clone(), dir.path());

    let err = controller.submit_upload(csv("sales.csv")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Ingestion(IngestionError::Transport(_))));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Error);
    assert!(snapshot.dataset.is_none());
    assert_eq!(
        snapshot.last_error.as_deref(),
        Some("Transport error: connection refused")
    );
    assert_eq!(backend.kpi_requests(), 0);
    assert_eq!(backend.forecast_requests(), 0);
}

#[tokio::test]
async fn test_kpi_failure_is_partial() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    backend.set_kpis(
        "d1",
        Err(AnalysisError::Rejected {
            status: 422,
            message: "missing revenue column".to_string(),
        }),
    );
    let controller = controller(backend.clone(), dir.path());
    let mut events = controller.subscribe();

    let report = controller.submit_upload(csv("sales.csv")).await.unwrap();

    assert!(report.is_degraded());
    assert!(report.kpi_error.is_some());
    assert_eq!(report.phase, WorkflowPhase::Ready);
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert!(snapshot.kpis().is_none());
    assert!(snapshot.forecast().is_some());
    // the forecast is still requested after the KPI failure
    assert_eq!(backend.forecast_requests(), 1);

    let events = drain(&mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, WorkflowEvent::KpisFailed { .. })));
}

#[tokio::test]
async fn test_forecast_failure_is_partial() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    backend.set_forecast(
        "d1",
        Err(ForecastError::Failed("not enough history".to_string())),
    );
    let controller = controller(backend, dir.path());

    let report = controller.submit_upload(csv("sales.csv")).await.unwrap();

    assert!(report.is_degraded());
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert!(snapshot.kpis().is_some());
    assert!(snapshot.forecast().is_none());
    assert!(snapshot.insights().is_empty());
}

#[tokio::test]
async fn test_both_failures_keep_dataset_and_refresh_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.push_upload(Ok(dataset("d1", "sales.csv", 500)));
    let controller = controller(backend.clone(), dir.path());

    let report = controller.submit_upload(csv("sales.csv")).await.unwrap();
    assert_eq!(report.phase, WorkflowPhase::Error);
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Error);
    assert_eq!(snapshot.dataset_id(), Some(&DatasetId::from("d1")));
    assert!(snapshot.last_error.is_some());

    backend.set_kpis(
        "d1",
        Ok(KpiSet::new(DatasetId::from("d1")).with_metric("revenue", 12000.0)),
    );
    backend.set_forecast("d1", Ok(forecast("d1", "Q4 uptick")));

    let report = controller.refresh_analysis().await.unwrap();
    assert!(report.is_complete());
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert!(snapshot.last_error.is_none());
    // refresh never uploads again
    assert_eq!(backend.uploads(), 1);
    assert_eq!(backend.kpi_requests(), 2);
}

#[tokio::test]
async fn test_refresh_while_idle_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    let controller = controller(backend.clone(), dir.path());
    let before = controller.snapshot().await;

    assert!(controller.refresh_analysis().await.is_none());

    let after = controller.snapshot().await;
    assert_eq!(after.phase, WorkflowPhase::Idle);
    assert_eq!(after.cycle, before.cycle);
    assert_eq!(backend.kpi_requests(), 0);
}

#[tokio::test]
async fn test_upload_rejected_while_busy() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    let gate = backend.gate_kpis("d1");
    let controller = Arc::new(controller(backend.clone(), dir.path()));

    let task = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_upload(csv("sales.csv")).await })
    };
    gate.entered.notified().await;

    let err = controller.submit_upload(csv("other.csv")).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Busy(WorkflowPhase::Analyzing)));
    assert!(controller.refresh_analysis().await.is_none());

    gate.release.notify_one();
    let report = task.await.unwrap().unwrap();
    assert!(report.is_complete());
    assert_eq!(backend.uploads(), 1);
}

#[tokio::test]
async fn test_late_result_for_superseded_dataset_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("x", "old.csv", 1.0, "stale");
    backend.script_success("y", "new.csv", 2.0, "fresh");
    let gate = backend.gate_kpis("x");
    let controller = Arc::new(controller(backend.clone(), dir.path()));
    let mut events = controller.subscribe();

    let stale = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.submit_upload(csv("old.csv")).await })
    };
    gate.entered.notified().await;

    controller.reset().await;
    let fresh = controller.submit_upload(csv("new.csv")).await.unwrap();
    assert!(fresh.is_complete());

    gate.release.notify_one();
    let stale = stale.await.unwrap().unwrap();
    assert!(stale.superseded);
    assert_eq!(stale.dataset_id, DatasetId::from("x"));

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert_eq!(snapshot.dataset_id(), Some(&DatasetId::from("y")));
    assert_eq!(snapshot.kpis().and_then(|k| k.get("revenue")), Some(2.0));
    assert_eq!(snapshot.insights()[0].message, "fresh");
    // the superseded cycle stops before requesting a forecast
    assert_eq!(backend.forecast_requests(), 1);

    assert!(drain(&mut events).iter().any(|event| matches!(
        event,
        WorkflowEvent::StaleResultDiscarded { dataset_id, .. } if dataset_id.as_str() == "x"
    )));
}

#[tokio::test]
async fn test_superseded_refresh_discards_late_forecast() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "old.csv", 1.0, "stale");
    let controller = Arc::new(controller(backend.clone(), dir.path()));
    controller.submit_upload(csv("old.csv")).await.unwrap();

    let gate = backend.gate_forecast("d1");
    let refresh = {
        let controller = controller.clone();
        tokio::spawn(async move { controller.refresh_analysis().await })
    };
    gate.entered.notified().await;
    assert_eq!(controller.phase().await, WorkflowPhase::Analyzing);

    controller.reset().await;
    backend.script_success("d2", "new.csv", 2.0, "fresh");
    let fresh = controller.submit_upload(csv("new.csv")).await.unwrap();
    assert!(fresh.is_complete());

    gate.release.notify_one();
    let stale = refresh.await.unwrap().unwrap();
    assert!(stale.superseded);
    assert_eq!(stale.dataset_id, DatasetId::from("d1"));
    assert!(stale.kpi_error.is_none() && stale.forecast_error.is_none());

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert_eq!(snapshot.dataset_id(), Some(&DatasetId::from("d2")));
    let kpis = snapshot.kpis().unwrap();
    assert_eq!(kpis.dataset_id, DatasetId::from("d2"));
    assert_eq!(kpis.get("revenue"), Some(2.0));
    let forecast = snapshot.forecast().unwrap();
    assert_eq!(forecast.dataset_id, DatasetId::from("d2"));
    assert_eq!(snapshot.insights()[0].message, "fresh");
    assert_eq!(backend.forecast_requests(), 3);
}

#[tokio::test]
async fn test_mismatched_result_is_treated_as_failure() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    backend.set_kpis(
        "d1",
        Ok(KpiSet::new(DatasetId::from("d9")).with_metric("revenue", 1.0)),
    );
    let controller = controller(backend, dir.path());

    let report = controller.submit_upload(csv("sales.csv")).await.unwrap();

    assert!(matches!(
        report.kpi_error,
        Some(AnalysisError::DatasetMismatch { .. })
    ));
    assert!(controller.snapshot().await.kpis().is_none());
}

#[tokio::test]
async fn test_set_view_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    let controller = controller(backend, dir.path());
    controller.submit_upload(csv("sales.csv")).await.unwrap();

    controller.set_view(DashboardView::Forecast).await;
    assert_eq!(controller.snapshot().await.view, DashboardView::Forecast);

    controller.reset().await;
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Idle);
    assert!(snapshot.dataset.is_none());
    assert!(snapshot.kpis().is_none());
    assert_eq!(snapshot.view, DashboardView::Overview);
}

#[tokio::test]
async fn test_export_while_idle_renders_partial_report() {
    let dir = tempfile::tempdir().unwrap();
    let controller = controller(FakeBackend::new(), dir.path());

    let saved = controller.export_report().await.unwrap();

    assert!(saved.filename.starts_with("shopintel-report-"));
    assert!(saved.filename.ends_with(".md"));
    let body = std::fs::read_to_string(saved.location.unwrap()).unwrap();
    assert!(body.contains("Jane Doe"));
    assert!(body.contains("_KPIs not available._"));
    assert_eq!(controller.phase().await, WorkflowPhase::Idle);
}

#[tokio::test]
async fn test_export_after_analysis_includes_results() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    let controller = controller(backend, dir.path());
    controller.submit_upload(csv("sales.csv")).await.unwrap();

    let saved = controller.export_report().await.unwrap();

    let body = std::fs::read_to_string(dir.path().join(&saved.filename)).unwrap();
    assert!(body.contains("| Revenue | 12,000 |"));
    assert!(body.contains("Q4 uptick"));
    assert_eq!(saved.size_bytes, body.len());
    assert_eq!(controller.phase().await, WorkflowPhase::Ready);
}

#[tokio::test]
async fn test_export_failure_leaves_phase_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    let controller = controller(backend, &blocker);
    controller.submit_upload(csv("sales.csv")).await.unwrap();

    let err = controller.export_report().await.unwrap_err();

    assert!(matches!(err, WorkflowError::Render(RenderError::Io(_))));
    assert_eq!(controller.phase().await, WorkflowPhase::Ready);
}

#[tokio::test]
async fn test_share_requires_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let controller = controller(FakeBackend::new(), dir.path());

    let err = controller.share_report().await.unwrap_err();
    assert!(matches!(err, WorkflowError::NoDataset));
}

#[tokio::test]
async fn test_share_success_opens_and_dismiss_closes() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    let controller = controller(backend, dir.path());
    controller.submit_upload(csv("sales.csv")).await.unwrap();

    let link = controller.share_report().await.unwrap();
    assert!(link.is_public);
    assert_eq!(link.share_url, "https://shopintel.test/share/d1");
    assert!(controller.snapshot().await.is_share_open());

    controller.dismiss_share().await;
    assert!(!controller.snapshot().await.is_share_open());
}

#[tokio::test]
async fn test_share_failure_keeps_phase() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.script_success("d1", "sales.csv", 12000.0, "Q4 uptick");
    backend.push_share(share_rejected());
    let controller = controller(backend, dir.path());
    controller.submit_upload(csv("sales.csv")).await.unwrap();

    let err = controller.share_report().await.unwrap_err();

    assert!(matches!(err, WorkflowError::Share(_)));
    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.phase, WorkflowPhase::Ready);
    assert!(!snapshot.is_share_open());
}

#[tokio::test]
async fn test_controller_usable_after_failure() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FakeBackend::new();
    backend.push_upload(Err(IngestionError::Rejected {
        status: 400,
        message: "Unsupported file type".to_string(),
    }));
    backend.script_success("d2", "sales.csv", 5.0, "steady");
    let controller = controller(backend, dir.path());

    assert!(controller.submit_upload(csv("bad.txt")).await.is_err());
    let report = controller.submit_upload(csv("sales.csv")).await.unwrap();

    assert!(report.is_complete());
    assert_eq!(controller.display_name(), "Jane Doe");
}
