use std::fmt;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::{IngestionError, IngestionResult};

/// Server-issued dataset identifier.
///
/// The backend may send ids as JSON numbers or strings; both normalise to
/// the same textual form so identity comparisons stay exact.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DatasetId(String);

impl DatasetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DatasetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DatasetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for DatasetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<i64> for DatasetId {
    fn from(value: i64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for DatasetId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => DatasetId(text),
            RawId::Number(number) => DatasetId(number.to_string()),
        })
    }
}

/// An ingested sales dataset. Immutable once created by the backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: DatasetId,
    pub filename: String,
    #[serde(default)]
    pub row_count: u64,
    #[serde(deserialize_with = "super::timestamp::deserialize")]
    pub uploaded_at: DateTime<Utc>,
}

/// A file selected for upload.
#[derive(Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = content_type_for(&filename).to_string();
        Self {
            filename,
            content_type,
            bytes,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = content_type.into();
        self
    }

    /// Read a file from disk, rejecting empty files before any request is made.
    pub async fn load(path: impl AsRef<Path>) -> IngestionResult<Self> {
        let path = path.as_ref();
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                IngestionError::UnsupportedFormat(format!("{} has no file name", path.display()))
            })?
            .to_string();
        let bytes = tokio::fs::read(path).await?;
        if bytes.is_empty() {
            return Err(IngestionError::EmptyFile(filename));
        }
        Ok(Self::new(filename, bytes))
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("xlsx") => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        Some("xls") => "application/vnd.ms-excel",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_id_accepts_numbers_and_strings() {
        let numeric: DatasetId = serde_json::from_str("42").unwrap();
        let text: DatasetId = serde_json::from_str("\"42\"").unwrap();
        assert_eq!(numeric, text);
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "\"42\"");
    }

    #[test]
    fn dataset_parses_backend_payload() {
        let dataset: Dataset = serde_json::from_value(serde_json::json!({
            "id": 7,
            "filename": "sales.csv",
            "row_count": 500,
            "uploaded_at": "2024-05-02T09:30:00"
        }))
        .unwrap();
        assert_eq!(dataset.id.as_str(), "7");
        assert_eq!(dataset.row_count, 500);
    }

    #[test]
    fn upload_file_guesses_content_type() {
        assert_eq!(UploadFile::new("Sales.CSV", vec![1]).content_type, "text/csv");
        assert_eq!(
            UploadFile::new("export.bin", vec![1]).content_type,
            "application/octet-stream"
        );
    }

    #[tokio::test]
    async fn load_rejects_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, b"").unwrap();

        let err = UploadFile::load(&path).await.unwrap_err();
        assert!(matches!(err, IngestionError::EmptyFile(name) if name == "empty.csv"));
    }
}
