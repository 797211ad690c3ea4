//! Response payloads of the ShopIntel REST API.
//!
//! The backend is loose about field names and optional parts, so payloads
//! are decoded here and converted into the core models.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use shopintel::models::{
    timestamp, Dataset, DatasetId, Forecast, ForecastSeries, Insight, KpiSet, ShareLink, User,
};

#[derive(Debug, Deserialize)]
pub(crate) struct DatasetPayload {
    id: DatasetId,
    #[serde(alias = "original_filename", alias = "name")]
    filename: Option<String>,
    #[serde(default, alias = "rows", alias = "total_rows")]
    row_count: Option<u64>,
    #[serde(
        default,
        alias = "created_at",
        deserialize_with = "timestamp::deserialize_option"
    )]
    uploaded_at: Option<DateTime<Utc>>,
}

impl DatasetPayload {
    /// `fallback_name` is the local file name, used when the server omits it.
    pub(crate) fn into_dataset(self, fallback_name: &str) -> Dataset {
        Dataset {
            id: self.id,
            filename: self
                .filename
                .unwrap_or_else(|| fallback_name.to_string()),
            row_count: self.row_count.unwrap_or_default(),
            uploaded_at: self.uploaded_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct KpiPayload {
    #[serde(default)]
    dataset_id: Option<DatasetId>,
    #[serde(default)]
    kpis: IndexMap<String, Value>,
}

impl KpiPayload {
    /// Non-numeric entries are dropped; the KPI set only carries numbers.
    pub(crate) fn into_kpis(self, requested: &DatasetId) -> KpiSet {
        let dataset_id = self.dataset_id.unwrap_or_else(|| requested.clone());
        self.kpis
            .into_iter()
            .filter_map(|(name, value)| value.as_f64().map(|number| (name, number)))
            .fold(KpiSet::new(dataset_id), |kpis, (name, value)| {
                kpis.with_metric(name, value)
            })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ForecastPayload {
    #[serde(default = "default_success")]
    pub(crate) success: bool,
    #[serde(default)]
    pub(crate) error: Option<String>,
    #[serde(default)]
    dataset_id: Option<DatasetId>,
    #[serde(default)]
    forecast: Option<ForecastSeries>,
    #[serde(default)]
    insights: Vec<Insight>,
    #[serde(default)]
    periods: Option<u32>,
}

fn default_success() -> bool {
    true
}

impl ForecastPayload {
    /// `None` when the payload carries no series.
    pub(crate) fn into_forecast(self, requested: &DatasetId) -> Option<Forecast> {
        let series = self.forecast?;
        let dataset_id = self.dataset_id.unwrap_or_else(|| requested.clone());
        let mut forecast = Forecast::new(dataset_id, series, self.insights);
        if let Some(periods) = self.periods {
            forecast.periods = periods;
        }
        Some(forecast)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ShareRequest<'a> {
    pub(crate) dataset_id: &'a DatasetId,
    pub(crate) is_public: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SharePayload {
    #[serde(alias = "url")]
    share_url: Option<String>,
    #[serde(default)]
    is_public: Option<bool>,
}

impl SharePayload {
    pub(crate) fn into_link(self, dataset_id: &DatasetId, requested_public: bool) -> Option<ShareLink> {
        let share_url = self.share_url.filter(|url| !url.trim().is_empty())?;
        Some(ShareLink {
            dataset_id: dataset_id.clone(),
            share_url,
            is_public: self.is_public.unwrap_or(requested_public),
        })
    }
}

/// `/admin/users` returns either a bare list or `{"users": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UserListPayload {
    List(Vec<User>),
    Wrapped { users: Vec<User> },
}

impl UserListPayload {
    pub(crate) fn into_users(self) -> Vec<User> {
        match self {
            UserListPayload::List(users) | UserListPayload::Wrapped { users } => users,
        }
    }
}
