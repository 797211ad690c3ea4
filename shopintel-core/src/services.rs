//! Contracts for the backend collaborators of the dashboard.
//!
//! Implementations live outside this crate (the HTTP gateway) or in tests;
//! the controller and admin console only ever see these traits.

use std::sync::Arc;

use async_trait::async_trait;

use crate::errors::{
    AdminResult, AnalysisResult, ForecastResult, IngestionResult, RenderResult, ShareResult,
};
use crate::models::{
    Dataset, DatasetId, Forecast, KpiSet, PlatformStats, ShareLink, SystemHealth, UploadFile, User,
    UserId,
};
use crate::report::{ReportContext, ReportFormat, SavedReport};

/// Turns an uploaded file into a server-side dataset.
#[async_trait]
pub trait DatasetIngestion: Send + Sync {
    async fn create_dataset(&self, file: UploadFile) -> IngestionResult<Dataset>;
}

/// Computes the KPI set of a dataset.
#[async_trait]
pub trait AnalysisService: Send + Sync {
    async fn compute_kpis(&self, dataset_id: &DatasetId) -> AnalysisResult<KpiSet>;
}

/// Produces a forecast and narrative insights for a dataset.
#[async_trait]
pub trait ForecastService: Send + Sync {
    async fn generate_forecast(&self, dataset_id: &DatasetId) -> ForecastResult<Forecast>;
}

/// Renders a report document from the aggregated dashboard state.
#[async_trait]
pub trait ReportRenderer: Send + Sync {
    fn format(&self) -> ReportFormat;

    async fn render_report(&self, context: &ReportContext) -> RenderResult<Vec<u8>>;
}

/// Client-side destination of an exported report.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> RenderResult<SavedReport>;
}

/// Issues shareable links for dataset reports.
#[async_trait]
pub trait ShareRegistry: Send + Sync {
    async fn register_share(&self, dataset_id: &DatasetId, is_public: bool)
        -> ShareResult<ShareLink>;
}

/// Account administration backend used by the admin console.
#[async_trait]
pub trait UserAdministration: Send + Sync {
    async fn list_users(&self) -> AdminResult<Vec<User>>;

    async fn platform_stats(&self) -> AdminResult<PlatformStats>;

    async fn system_health(&self) -> AdminResult<SystemHealth>;

    async fn activate_user(&self, user_id: UserId) -> AdminResult<()>;

    async fn deactivate_user(&self, user_id: UserId) -> AdminResult<()>;
}

/// Collaborators needed by the workflow controller.
#[derive(Clone)]
pub struct WorkflowServices {
    pub ingestion: Arc<dyn DatasetIngestion>,
    pub analysis: Arc<dyn AnalysisService>,
    pub forecast: Arc<dyn ForecastService>,
    pub share: Arc<dyn ShareRegistry>,
    pub renderer: Arc<dyn ReportRenderer>,
    pub sink: Arc<dyn ReportSink>,
}

impl WorkflowServices {
    /// Wire every remote collaborator to a single backend client.
    pub fn from_backend<B>(
        backend: Arc<B>,
        renderer: Arc<dyn ReportRenderer>,
        sink: Arc<dyn ReportSink>,
    ) -> Self
    where
        B: DatasetIngestion + AnalysisService + ForecastService + ShareRegistry + 'static,
    {
        Self {
            ingestion: backend.clone(),
            analysis: backend.clone(),
            forecast: backend.clone(),
            share: backend,
            renderer,
            sink,
        }
    }
}
