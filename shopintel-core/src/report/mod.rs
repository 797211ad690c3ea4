//! Report export: the context aggregated from dashboard state, the
//! template-based renderers and the sink that saves the document.

mod helpers;
mod sink;

pub use helpers::get_handlebars;
pub use sink::FileSystemSink;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::{RenderError, RenderResult};
use crate::models::{Dataset, Forecast, KpiSet, User};
use crate::services::ReportRenderer;
use crate::workflow::WorkflowSnapshot;

pub const FORECAST_DISCLAIMER: &str = "Forecasts are based on historical data and are probabilistic estimates. Use them as guidance, not guarantees. Always verify with market conditions.";

const TEMPLATE_NAME: &str = "report";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReportFormat {
    #[default]
    Markdown,
    Html,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Markdown => "md",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReportFormat::Markdown => "markdown",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        })
    }
}

impl FromStr for ReportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "markdown" | "md" => Ok(ReportFormat::Markdown),
            "html" | "htm" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// `shopintel-report-2024-05-02.md`
pub fn report_filename(date: NaiveDate, format: ReportFormat) -> String {
    format!(
        "shopintel-report-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

#[derive(Clone, Debug, Serialize)]
pub struct ReportAuthor {
    pub display_name: String,
    pub company_name: Option<String>,
}

impl From<&User> for ReportAuthor {
    fn from(user: &User) -> Self {
        Self {
            display_name: user.display_name().to_string(),
            company_name: user.company_name.clone(),
        }
    }
}

/// Everything a report is rendered from. Any part except the author may be
/// missing; renderers must still produce a document.
#[derive(Clone, Debug, Serialize)]
pub struct ReportContext {
    pub user: ReportAuthor,
    pub dataset: Option<Dataset>,
    pub kpis: Option<KpiSet>,
    pub forecast: Option<Forecast>,
    pub generated_at: DateTime<Utc>,
}

impl ReportContext {
    /// Only results that are valid for the held dataset are included.
    pub fn from_snapshot(
        user: &User,
        snapshot: &WorkflowSnapshot,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user: ReportAuthor::from(user),
            dataset: snapshot.dataset.clone(),
            kpis: snapshot.kpis().cloned(),
            forecast: snapshot.forecast().cloned(),
            generated_at,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.dataset.is_none() || self.kpis.is_none() || self.forecast.is_none()
    }

    /// Flattened view consumed by the templates.
    fn template_data(&self) -> Value {
        let kpis: Vec<Value> = self
            .kpis
            .iter()
            .flat_map(|kpis| kpis.iter())
            .map(|(name, value)| json!({ "name": name, "value": value }))
            .collect();
        let forecast_points: Vec<Value> = self
            .forecast
            .iter()
            .flat_map(|forecast| forecast.series.points())
            .map(|point| {
                json!({
                    "date": point.date.format("%Y-%m-%d").to_string(),
                    "prediction": point.prediction,
                    "lower": point.lower,
                    "upper": point.upper,
                })
            })
            .collect();
        let insights = self
            .forecast
            .as_ref()
            .map(|forecast| forecast.insights.clone())
            .unwrap_or_default();
        let confidence_pct = self
            .forecast
            .as_ref()
            .map(|forecast| (forecast.series.confidence * 100.0).round() as i64);

        json!({
            "user": self.user,
            "dataset": self.dataset,
            "uploaded_at": self
                .dataset
                .as_ref()
                .map(|dataset| dataset.uploaded_at.format("%Y-%m-%d").to_string()),
            "kpis": kpis,
            "forecast_points": forecast_points,
            "confidence_pct": confidence_pct,
            "insights": insights,
            "generated_at": self.generated_at.format("%Y-%m-%d %H:%M UTC").to_string(),
            "disclaimer": FORECAST_DISCLAIMER,
        })
    }
}

/// Outcome of saving an exported report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SavedReport {
    pub filename: String,
    pub location: Option<PathBuf>,
    pub size_bytes: usize,
}

/// Renders reports from the bundled Handlebars templates, or as pretty JSON.
pub struct TemplateReportRenderer {
    format: ReportFormat,
    handlebars: Handlebars<'static>,
}

impl TemplateReportRenderer {
    pub fn new(format: ReportFormat) -> RenderResult<Self> {
        let mut handlebars = get_handlebars();
        match format {
            ReportFormat::Markdown => {
                handlebars.register_escape_fn(handlebars::no_escape);
                handlebars.register_template_string(TEMPLATE_NAME, get_template(format))?;
            }
            ReportFormat::Html => {
                handlebars.register_template_string(TEMPLATE_NAME, get_template(format))?;
            }
            ReportFormat::Json => {}
        }
        Ok(Self { format, handlebars })
    }

    pub fn render_to_string(&self, context: &ReportContext) -> RenderResult<String> {
        debug!(format = %self.format, partial = context.is_partial(), "Rendering report");
        match self.format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(context)?),
            ReportFormat::Markdown | ReportFormat::Html => Ok(self
                .handlebars
                .render(TEMPLATE_NAME, &context.template_data())?),
        }
    }
}

pub fn get_template(format: ReportFormat) -> &'static str {
    match format {
        ReportFormat::Markdown => include_str!("report.md.hbs"),
        ReportFormat::Html => include_str!("report.html.hbs"),
        ReportFormat::Json => "",
    }
}

#[async_trait]
impl ReportRenderer for TemplateReportRenderer {
    fn format(&self) -> ReportFormat {
        self.format
    }

    async fn render_report(&self, context: &ReportContext) -> RenderResult<Vec<u8>> {
        self.render_to_string(context).map(String::into_bytes)
    }
}
