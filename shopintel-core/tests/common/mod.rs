#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Notify;

use shopintel::errors::{
    AnalysisError, AnalysisResult, ForecastError, ForecastResult, IngestionError, IngestionResult,
    ShareError, ShareResult,
};
use shopintel::models::{
    Dataset, DatasetId, Forecast, ForecastSeries, Insight, KpiSet, Session, ShareLink, UploadFile,
    User,
};
use shopintel::report::{FileSystemSink, ReportFormat, TemplateReportRenderer};
use shopintel::services::{
    AnalysisService, DatasetIngestion, ForecastService, ShareRegistry, WorkflowServices,
};
use shopintel::WorkflowController;

pub fn dataset(id: &str, filename: &str, rows: u64) -> Dataset {
    Dataset {
        id: DatasetId::from(id),
        filename: filename.to_string(),
        row_count: rows,
        uploaded_at: Utc::now(),
    }
}

pub fn forecast(id: &str, insight: &str) -> Forecast {
    let series = ForecastSeries {
        dates: vec![NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()],
        predictions: vec![130.0],
        lower_bound: vec![120.0],
        upper_bound: vec![140.0],
        confidence: 0.95,
    };
    Forecast::new(DatasetId::from(id), series, vec![Insight::note(insight)])
}

pub fn csv(filename: &str) -> UploadFile {
    UploadFile::new(filename, b"date,revenue\n2024-01-01,100\n".to_vec())
}

/// Pauses a backend call for one dataset until released.
#[derive(Clone, Default)]
pub struct Gate {
    pub entered: Arc<Notify>,
    pub release: Arc<Notify>,
}

impl Gate {
    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }
}

/// Scriptable in-memory backend for the workflow controller.
#[derive(Default)]
pub struct FakeBackend {
    uploads: Mutex<VecDeque<IngestionResult<Dataset>>>,
    kpis: Mutex<HashMap<String, AnalysisResult<KpiSet>>>,
    forecasts: Mutex<HashMap<String, ForecastResult<Forecast>>>,
    shares: Mutex<VecDeque<ShareResult<ShareLink>>>,
    kpi_gates: Mutex<HashMap<String, Gate>>,
    forecast_gates: Mutex<HashMap<String, Gate>>,
    pub upload_calls: AtomicUsize,
    pub kpi_calls: AtomicUsize,
    pub forecast_calls: AtomicUsize,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_upload(&self, result: IngestionResult<Dataset>) {
        self.uploads.lock().unwrap().push_back(result);
    }

    pub fn set_kpis(&self, id: &str, result: AnalysisResult<KpiSet>) {
        self.kpis.lock().unwrap().insert(id.to_string(), result);
    }

    pub fn set_forecast(&self, id: &str, result: ForecastResult<Forecast>) {
        self.forecasts.lock().unwrap().insert(id.to_string(), result);
    }

    pub fn push_share(&self, result: ShareResult<ShareLink>) {
        self.shares.lock().unwrap().push_back(result);
    }

    pub fn gate_kpis(&self, id: &str) -> Gate {
        let gate = Gate::default();
        self.kpi_gates.lock().unwrap().insert(id.to_string(), gate.clone());
        gate
    }

    pub fn gate_forecast(&self, id: &str) -> Gate {
        let gate = Gate::default();
        self.forecast_gates
            .lock()
            .unwrap()
            .insert(id.to_string(), gate.clone());
        gate
    }

    /// Script a fully successful cycle for `id`.
    pub fn script_success(&self, id: &str, filename: &str, revenue: f64, insight: &str) {
        self.push_upload(Ok(dataset(id, filename, 500)));
        self.set_kpis(
            id,
            Ok(KpiSet::new(DatasetId::from(id)).with_metric("revenue", revenue)),
        );
        self.set_forecast(id, Ok(forecast(id, insight)));
    }

    pub fn uploads(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    pub fn kpi_requests(&self) -> usize {
        self.kpi_calls.load(Ordering::SeqCst)
    }

    pub fn forecast_requests(&self) -> usize {
        self.forecast_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatasetIngestion for FakeBackend {
    async fn create_dataset(&self, file: UploadFile) -> IngestionResult<Dataset> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        self.uploads
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(IngestionError::InvalidResponse(file.filename)))
    }
}

#[async_trait]
impl AnalysisService for FakeBackend {
    async fn compute_kpis(&self, dataset_id: &DatasetId) -> AnalysisResult<KpiSet> {
        self.kpi_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.kpi_gates.lock().unwrap().get(dataset_id.as_str()).cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.kpis
            .lock()
            .unwrap()
            .get(dataset_id.as_str())
            .cloned()
            .unwrap_or_else(|| Err(AnalysisError::DatasetNotFound(dataset_id.to_string())))
    }
}

#[async_trait]
impl ForecastService for FakeBackend {
    async fn generate_forecast(&self, dataset_id: &DatasetId) -> ForecastResult<Forecast> {
        self.forecast_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self
            .forecast_gates
            .lock()
            .unwrap()
            .get(dataset_id.as_str())
            .cloned();
        if let Some(gate) = gate {
            gate.pass().await;
        }
        self.forecasts
            .lock()
            .unwrap()
            .get(dataset_id.as_str())
            .cloned()
            .unwrap_or_else(|| Err(ForecastError::DatasetNotFound(dataset_id.to_string())))
    }
}

#[async_trait]
impl ShareRegistry for FakeBackend {
    async fn register_share(
        &self,
        dataset_id: &DatasetId,
        is_public: bool,
    ) -> ShareResult<ShareLink> {
        self.shares.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ShareLink {
                dataset_id: dataset_id.clone(),
                share_url: format!("https://shopintel.test/share/{dataset_id}"),
                is_public,
            })
        })
    }
}

pub fn share_rejected() -> ShareResult<ShareLink> {
    Err(ShareError::Rejected {
        status: 500,
        message: "share service unavailable".to_string(),
    })
}

pub fn session() -> Session {
    Session::new(User::new(1, "jdoe").with_full_name("Jane Doe").with_company("Acme"))
}

pub fn services(backend: Arc<FakeBackend>, report_dir: &std::path::Path) -> WorkflowServices {
    let renderer = TemplateReportRenderer::new(ReportFormat::Markdown).unwrap();
    WorkflowServices::from_backend(
        backend,
        Arc::new(renderer),
        Arc::new(FileSystemSink::new(report_dir)),
    )
}

pub fn controller(backend: Arc<FakeBackend>, report_dir: &std::path::Path) -> WorkflowController {
    WorkflowController::new(session(), services(backend, report_dir))
}
