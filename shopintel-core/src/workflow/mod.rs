//! Dataset-upload-to-insight pipeline.
//!
//! [`WorkflowController`] sequences ingestion, KPI analysis and forecasting
//! for one signed-in user and tracks their combined state. Every accepted
//! upload, refresh or reset starts a new *cycle*; a completion is written
//! back only if its cycle is still current and it refers to the dataset the
//! controller holds, so late responses from superseded cycles never
//! overwrite newer state.
//!
//! The state lives behind a single mutex that is never held across an
//! await point.

mod events;
mod state;

pub use events::WorkflowEvent;
pub use state::{DashboardView, WorkflowPhase, WorkflowSnapshot};

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, instrument, warn};

use crate::errors::{AnalysisError, ForecastError, WorkflowError, WorkflowResult};
use crate::models::{DatasetId, Session, ShareLink, UploadFile};
use crate::report::{report_filename, ReportContext, SavedReport};
use crate::services::WorkflowServices;

const EVENT_BUFFER: usize = 64;

/// Result of one analysis cycle.
#[derive(Debug)]
pub struct AnalysisReport {
    pub dataset_id: DatasetId,
    pub cycle: u64,
    /// Phase the controller was left in when this cycle finished.
    pub phase: WorkflowPhase,
    /// The cycle was superseded and its results were discarded.
    pub superseded: bool,
    pub kpi_error: Option<AnalysisError>,
    pub forecast_error: Option<ForecastError>,
}

impl AnalysisReport {
    fn superseded(dataset_id: DatasetId, cycle: u64, phase: WorkflowPhase) -> Self {
        Self {
            dataset_id,
            cycle,
            phase,
            superseded: true,
            kpi_error: None,
            forecast_error: None,
        }
    }

    /// Both KPIs and forecast were produced and applied.
    pub fn is_complete(&self) -> bool {
        !self.superseded && self.kpi_error.is_none() && self.forecast_error.is_none()
    }

    /// Exactly one of KPIs or forecast failed.
    pub fn is_degraded(&self) -> bool {
        self.kpi_error.is_some() != self.forecast_error.is_some()
    }
}

pub struct WorkflowController {
    session: Session,
    services: WorkflowServices,
    state: Mutex<WorkflowSnapshot>,
    events: broadcast::Sender<WorkflowEvent>,
}

impl WorkflowController {
    pub fn new(session: Session, services: WorkflowServices) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            session,
            services,
            state: Mutex::new(WorkflowSnapshot::default()),
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Greeting name for the dashboard header.
    pub fn display_name(&self) -> &str {
        self.session.user.display_name()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WorkflowEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> WorkflowSnapshot {
        self.state.lock().await.clone()
    }

    pub async fn phase(&self) -> WorkflowPhase {
        self.state.lock().await.phase
    }

    pub async fn set_view(&self, view: DashboardView) {
        self.state.lock().await.view = view;
    }

    /// Upload a file and run the full analysis pipeline on the resulting dataset.
    ///
    /// Rejected with [`WorkflowError::Busy`] while another cycle is in flight.
    /// Analysis and forecast failures do not fail the call; they are reported
    /// in the returned [`AnalysisReport`].
    #[instrument(skip(self, file), fields(filename = %file.filename))]
    pub async fn submit_upload(&self, file: UploadFile) -> WorkflowResult<AnalysisReport> {
        let cycle = {
            let mut state = self.state.lock().await;
            if state.phase.is_busy() {
                warn!(phase = %state.phase, "Upload rejected while a cycle is in flight");
                return Err(WorkflowError::Busy(state.phase));
            }
            state.start_upload()
        };
        self.publish(WorkflowEvent::PhaseChanged {
            cycle,
            phase: WorkflowPhase::Uploading,
        });

        let dataset = match self.services.ingestion.create_dataset(file).await {
            Ok(dataset) => dataset,
            Err(err) => {
                let mut state = self.state.lock().await;
                if state.cycle == cycle {
                    warn!("Upload failed: {}", err);
                    state.phase = WorkflowPhase::Error;
                    state.last_error = Some(err.to_string());
                    self.publish(WorkflowEvent::PhaseChanged {
                        cycle,
                        phase: WorkflowPhase::Error,
                    });
                } else {
                    debug!("Discarding upload failure from superseded cycle {}", cycle);
                }
                return Err(err.into());
            }
        };

        {
            let mut state = self.state.lock().await;
            if state.cycle != cycle {
                debug!(dataset = %dataset.id, "Discarding dataset from superseded cycle {}", cycle);
                self.publish(WorkflowEvent::StaleResultDiscarded {
                    cycle,
                    dataset_id: dataset.id.clone(),
                });
                return Ok(AnalysisReport::superseded(dataset.id, cycle, state.phase));
            }
            info!(
                dataset = %dataset.id,
                rows = dataset.row_count,
                "Dataset {} accepted",
                dataset.filename
            );
            state.dataset = Some(dataset.clone());
            state.phase = WorkflowPhase::Analyzing;
        }
        self.publish(WorkflowEvent::DatasetAccepted {
            cycle,
            dataset_id: dataset.id.clone(),
        });
        self.publish(WorkflowEvent::PhaseChanged {
            cycle,
            phase: WorkflowPhase::Analyzing,
        });

        Ok(self.run_analysis(dataset.id, cycle).await)
    }

    /// Re-run KPI analysis and forecasting for the held dataset.
    ///
    /// Returns `None` without touching state unless a dataset is held and the
    /// workflow is Ready or Error.
    #[instrument(skip(self))]
    pub async fn refresh_analysis(&self) -> Option<AnalysisReport> {
        let (dataset_id, cycle) = {
            let mut state = self.state.lock().await;
            let dataset_id = match (state.dataset_id(), state.phase) {
                (Some(id), WorkflowPhase::Ready | WorkflowPhase::Error) => id.clone(),
                (_, phase) => {
                    debug!(%phase, "Refresh ignored");
                    return None;
                }
            };
            (dataset_id, state.start_analysis())
        };
        info!(dataset = %dataset_id, "Refreshing analysis");
        self.publish(WorkflowEvent::PhaseChanged {
            cycle,
            phase: WorkflowPhase::Analyzing,
        });

        Some(self.run_analysis(dataset_id, cycle).await)
    }

    /// Drop the dataset and all results, superseding any in-flight cycle.
    pub async fn reset(&self) {
        let cycle = {
            let mut state = self.state.lock().await;
            state.reset();
            state.cycle
        };
        info!("Workflow reset");
        self.publish(WorkflowEvent::PhaseChanged {
            cycle,
            phase: WorkflowPhase::Idle,
        });
    }

    /// KPIs first, then the forecast regardless of the KPI outcome.
    async fn run_analysis(&self, dataset_id: DatasetId, cycle: u64) -> AnalysisReport {
        let kpi_result = self.services.analysis.compute_kpis(&dataset_id).await;
        let kpi_error = {
            let mut state = self.state.lock().await;
            if !state.is_current(cycle, &dataset_id) {
                return self.discard(dataset_id, cycle, state.phase);
            }
            let outcome = kpi_result.and_then(|kpis| {
                if kpis.dataset_id == dataset_id {
                    Ok(kpis)
                } else {
                    Err(AnalysisError::DatasetMismatch {
                        expected: dataset_id.to_string(),
                        actual: kpis.dataset_id.to_string(),
                    })
                }
            });
            match outcome {
                Ok(kpis) => {
                    debug!(metrics = kpis.len(), "KPIs computed");
                    state.kpis = Some(kpis);
                    None
                }
                Err(err) => {
                    warn!(dataset = %dataset_id, "KPI analysis failed: {}", err);
                    self.publish(WorkflowEvent::KpisFailed {
                        dataset_id: dataset_id.clone(),
                        reason: err.to_string(),
                    });
                    Some(err)
                }
            }
        };

        let forecast_result = self.services.forecast.generate_forecast(&dataset_id).await;
        let mut state = self.state.lock().await;
        if !state.is_current(cycle, &dataset_id) {
            return self.discard(dataset_id, cycle, state.phase);
        }
        let outcome = forecast_result.and_then(|forecast| {
            if forecast.dataset_id == dataset_id {
                Ok(forecast)
            } else {
                Err(ForecastError::DatasetMismatch {
                    expected: dataset_id.to_string(),
                    actual: forecast.dataset_id.to_string(),
                })
            }
        });
        let forecast_error = match outcome {
            Ok(forecast) => {
                debug!(
                    periods = forecast.periods,
                    insights = forecast.insights.len(),
                    "Forecast generated"
                );
                state.forecast = Some(forecast);
                None
            }
            Err(err) => {
                warn!(dataset = %dataset_id, "Forecast generation failed: {}", err);
                self.publish(WorkflowEvent::ForecastFailed {
                    dataset_id: dataset_id.clone(),
                    reason: err.to_string(),
                });
                Some(err)
            }
        };

        match (&kpi_error, &forecast_error) {
            (Some(kpi), Some(forecast)) => {
                state.phase = WorkflowPhase::Error;
                state.last_error = Some(format!(
                    "Analysis failed: {}; forecast failed: {}",
                    kpi, forecast
                ));
            }
            _ => state.phase = WorkflowPhase::Ready,
        }
        let phase = state.phase;
        drop(state);

        info!(dataset = %dataset_id, %phase, "Analysis cycle {} finished", cycle);
        self.publish(WorkflowEvent::PhaseChanged { cycle, phase });

        AnalysisReport {
            dataset_id,
            cycle,
            phase,
            superseded: false,
            kpi_error,
            forecast_error,
        }
    }

    fn discard(&self, dataset_id: DatasetId, cycle: u64, phase: WorkflowPhase) -> AnalysisReport {
        debug!(dataset = %dataset_id, "Discarding results from superseded cycle {}", cycle);
        self.publish(WorkflowEvent::StaleResultDiscarded {
            cycle,
            dataset_id: dataset_id.clone(),
        });
        AnalysisReport::superseded(dataset_id, cycle, phase)
    }

    /// Render whatever is currently presentable and save it through the sink.
    /// Never changes the workflow phase.
    #[instrument(skip(self))]
    pub async fn export_report(&self) -> WorkflowResult<SavedReport> {
        let context = {
            let state = self.state.lock().await;
            ReportContext::from_snapshot(&self.session.user, &state, Utc::now())
        };
        let format = self.services.renderer.format();
        let filename = report_filename(context.generated_at.date_naive(), format);

        let rendered = match self.services.renderer.render_report(&context).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!("Report rendering failed: {}", err);
                self.publish(WorkflowEvent::ReportExportFailed {
                    reason: err.to_string(),
                });
                return Err(err.into());
            }
        };
        match self.services.sink.save(&filename, &rendered).await {
            Ok(saved) => {
                info!(partial = context.is_partial(), "Exported report {}", saved.filename);
                self.publish(WorkflowEvent::ReportExported {
                    filename: saved.filename.clone(),
                });
                Ok(saved)
            }
            Err(err) => {
                warn!("Saving report failed: {}", err);
                self.publish(WorkflowEvent::ReportExportFailed {
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Register a public share link for the held dataset and open the
    /// confirmation surface. Failures leave the phase untouched.
    #[instrument(skip(self))]
    pub async fn share_report(&self) -> WorkflowResult<ShareLink> {
        let dataset_id = {
            let state = self.state.lock().await;
            state.dataset_id().cloned().ok_or(WorkflowError::NoDataset)?
        };

        match self.services.share.register_share(&dataset_id, true).await {
            Ok(link) => {
                let mut state = self.state.lock().await;
                if state.dataset_id() == Some(&dataset_id) {
                    state.share_link = Some(link.clone());
                }
                drop(state);
                info!(dataset = %dataset_id, "Share link registered: {}", link.share_url);
                self.publish(WorkflowEvent::ShareRegistered {
                    share_url: link.share_url.clone(),
                });
                Ok(link)
            }
            Err(err) => {
                warn!(dataset = %dataset_id, "Share registration failed: {}", err);
                self.publish(WorkflowEvent::ShareFailed {
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }

    /// Close the share confirmation surface.
    pub async fn dismiss_share(&self) {
        self.state.lock().await.share_link = None;
    }

    fn publish(&self, event: WorkflowEvent) {
        // No subscribers is not an error.
        let _ = self.events.send(event);
    }
}
