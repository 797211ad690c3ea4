use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use shopintel::errors::{
    AdminResult, AnalysisResult, ForecastError, ForecastResult, IngestionError, IngestionResult,
    ShareError, ShareResult,
};
use shopintel::models::{
    Dataset, DatasetId, Forecast, KpiSet, PlatformStats, Session, ShareLink, SystemHealth,
    UploadFile, User, UserId,
};
use shopintel::services::{
    AnalysisService, DatasetIngestion, ForecastService, ShareRegistry, UserAdministration,
};
use shopintel::ClientConfig;

use crate::failure::ApiFailure;
use crate::wire::{
    DatasetPayload, ForecastPayload, KpiPayload, SharePayload, ShareRequest, UserListPayload,
};

/// HTTP client for the ShopIntel REST API. Implements every backend
/// service trait, so one instance can back a whole `AppContext`.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig) -> Result<Self, ApiFailure> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("shopintel/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    /// Replace the bearer token, e.g. with the one issued at sign-in.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.config.api_token = Some(token.into());
        self
    }

    /// Client authenticated as `session`. Falls back to the configured token
    /// when the session carries none.
    pub fn for_session(&self, session: &Session) -> Self {
        match &session.token {
            Some(token) => self.clone().with_token(token.clone()),
            None => self.clone(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiFailure> {
        let url = self.config.endpoint(path)?;
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        Ok(match &self.config.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    async fn send(&self, builder: RequestBuilder) -> Result<String, ApiFailure> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status.is_success() {
            Ok(body)
        } else {
            warn!(status = status.as_u16(), "API request failed");
            Err(ApiFailure::from_response(status, &body))
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiFailure> {
        let body = self.send(builder).await?;
        serde_json::from_str(&body).map_err(|err| ApiFailure::Decode(err.to_string()))
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, path: &str) -> Result<T, ApiFailure> {
        self.send_json(self.request(method, path)?).await
    }

    async fn call_with_body<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, ApiFailure>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        self.send_json(self.request(method, path)?.json(body)).await
    }

    /// The account the configured token belongs to.
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> Result<User, ApiFailure> {
        self.call(Method::GET, "users/me").await
    }

    async fn set_user_active(&self, user_id: UserId, active: bool) -> Result<(), ApiFailure> {
        let action = if active { "activate" } else { "deactivate" };
        let path = format!("admin/users/{user_id}/{action}");
        self.send(self.request(Method::PUT, &path)?).await?;
        info!("User {} {}d", user_id, action);
        Ok(())
    }
}

#[async_trait]
impl DatasetIngestion for ApiClient {
    #[instrument(skip(self, file), fields(filename = %file.filename, size = file.len()))]
    async fn create_dataset(&self, file: UploadFile) -> IngestionResult<Dataset> {
        if file.is_empty() {
            return Err(IngestionError::EmptyFile(file.filename));
        }
        let filename = file.filename.clone();
        let part = Part::bytes(file.bytes)
            .file_name(file.filename)
            .mime_str(&file.content_type)
            .map_err(|_| IngestionError::UnsupportedFormat(file.content_type.clone()))?;
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, "datasets/upload")?.multipart(form);
        let payload: DatasetPayload = self.send_json(builder).await?;
        let dataset = payload.into_dataset(&filename);
        info!(dataset = %dataset.id, rows = dataset.row_count, "Uploaded {}", filename);
        Ok(dataset)
    }
}

#[async_trait]
impl AnalysisService for ApiClient {
    #[instrument(skip(self))]
    async fn compute_kpis(&self, dataset_id: &DatasetId) -> AnalysisResult<KpiSet> {
        let path = format!("analytics/analyze/{dataset_id}");
        let payload: KpiPayload = self
            .call(Method::POST, &path)
            .await
            .map_err(|failure| failure.into_analysis_error(dataset_id))?;
        Ok(payload.into_kpis(dataset_id))
    }
}

#[async_trait]
impl ForecastService for ApiClient {
    #[instrument(skip(self))]
    async fn generate_forecast(&self, dataset_id: &DatasetId) -> ForecastResult<Forecast> {
        let path = format!("forecasts/generate/{dataset_id}");
        let payload: ForecastPayload = self
            .call(Method::POST, &path)
            .await
            .map_err(|failure| failure.into_forecast_error(dataset_id))?;

        if !payload.success {
            let reason = payload
                .error
                .clone()
                .unwrap_or_else(|| "forecast generation failed".to_string());
            return Err(ForecastError::Failed(reason));
        }
        payload
            .into_forecast(dataset_id)
            .ok_or_else(|| ForecastError::InvalidResponse("missing forecast series".to_string()))
    }
}

#[async_trait]
impl ShareRegistry for ApiClient {
    #[instrument(skip(self))]
    async fn register_share(
        &self,
        dataset_id: &DatasetId,
        is_public: bool,
    ) -> ShareResult<ShareLink> {
        let request = ShareRequest {
            dataset_id,
            is_public,
        };
        let payload: SharePayload = self
            .call_with_body(Method::POST, "reports/share", &request)
            .await
            .map_err(|failure| failure.into_share_error(dataset_id))?;

        payload
            .into_link(dataset_id, is_public)
            .ok_or_else(|| ShareError::InvalidResponse("missing share_url".to_string()))
    }
}

#[async_trait]
impl UserAdministration for ApiClient {
    async fn list_users(&self) -> AdminResult<Vec<User>> {
        let payload: UserListPayload = self.call(Method::GET, "admin/users").await?;
        Ok(payload.into_users())
    }

    async fn platform_stats(&self) -> AdminResult<PlatformStats> {
        Ok(self.call(Method::GET, "admin/stats").await?)
    }

    async fn system_health(&self) -> AdminResult<SystemHealth> {
        Ok(self.call(Method::GET, "admin/health").await?)
    }

    #[instrument(skip(self))]
    async fn activate_user(&self, user_id: UserId) -> AdminResult<()> {
        Ok(self.set_user_active(user_id, true).await?)
    }

    #[instrument(skip(self))]
    async fn deactivate_user(&self, user_id: UserId) -> AdminResult<()> {
        Ok(self.set_user_active(user_id, false).await?)
    }
}
