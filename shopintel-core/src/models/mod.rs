//! Data model shared by the workflow controller, admin console and gateway.

mod dataset;
mod forecast;
mod kpi;
pub mod timestamp;
mod user;

pub use dataset::{Dataset, DatasetId, UploadFile};
pub use forecast::{Forecast, ForecastPoint, ForecastSeries, Insight, Severity};
pub use kpi::KpiSet;
pub use user::{PlatformStats, Session, SystemHealth, User, UserId};

use serde::{Deserialize, Serialize};

/// Shareable reference issued for a dataset's report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShareLink {
    pub dataset_id: DatasetId,
    pub share_url: String,
    pub is_public: bool,
}
