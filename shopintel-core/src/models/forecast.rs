use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::DatasetId;

fn default_confidence() -> f64 {
    0.95
}

/// Predicted values with their confidence interval, one entry per date.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    #[serde(default)]
    pub dates: Vec<NaiveDate>,
    #[serde(default)]
    pub predictions: Vec<f64>,
    #[serde(default)]
    pub lower_bound: Vec<f64>,
    #[serde(default)]
    pub upper_bound: Vec<f64>,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

/// One row of a forecast series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub prediction: f64,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.dates.len().min(self.predictions.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rows zipped from the parallel vectors; bounds are optional because
    /// older backends omit them.
    pub fn points(&self) -> Vec<ForecastPoint> {
        self.dates
            .iter()
            .zip(self.predictions.iter())
            .enumerate()
            .map(|(idx, (date, prediction))| ForecastPoint {
                date: *date,
                prediction: *prediction,
                lower: self.lower_bound.get(idx).copied(),
                upper: self.upper_bound.get(idx).copied(),
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        })
    }
}

/// Narrative business insight attached to a forecast.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub severity: Severity,
    pub action: Option<String>,
}

impl Insight {
    pub fn note(message: impl Into<String>) -> Self {
        Self {
            kind: "note".to_string(),
            message: message.into(),
            severity: Severity::Low,
            action: None,
        }
    }
}

impl<'de> Deserialize<'de> for Insight {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Structured {
            #[serde(rename = "type", default = "note_kind")]
            kind: String,
            message: String,
            #[serde(default)]
            severity: Severity,
            #[serde(default)]
            action: Option<String>,
        }

        fn note_kind() -> String {
            "note".to_string()
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawInsight {
            Message(String),
            Structured(Structured),
        }

        Ok(match RawInsight::deserialize(deserializer)? {
            RawInsight::Message(message) => Insight::note(message),
            RawInsight::Structured(raw) => Insight {
                kind: raw.kind,
                message: raw.message,
                severity: raw.severity,
                action: raw.action,
            },
        })
    }
}

/// Forecast result for one dataset. Replaced wholesale on regeneration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub dataset_id: DatasetId,
    pub series: ForecastSeries,
    #[serde(default)]
    pub insights: Vec<Insight>,
    pub periods: u32,
}

impl Forecast {
    pub fn new(dataset_id: DatasetId, series: ForecastSeries, insights: Vec<Insight>) -> Self {
        let periods = series.len() as u32;
        Self {
            dataset_id,
            series,
            insights,
            periods,
        }
    }
}
