use std::path::Path;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, Response};
use rfp_core::{JobRecord, PollTarget, Progress, Requirement, Section, SectionSubmission};
use rfp_logging::rfp_debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use crate::decode::{decode_text_stream, TextStream};
use crate::{ApiError, FailureKind, PollUpdate};

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to JSON calls and uploads. Streamed bodies have no overall
    /// deadline since generation can take minutes.
    pub request_timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            poll_interval: Duration::from_secs(5),
        }
    }
}

/// The RFP service as the client sees it.
#[async_trait::async_trait]
pub trait RfpApi: Send + Sync {
    /// `POST /upload`; returns the server's confirmation message.
    async fn upload(&self, path: &Path) -> Result<String, ApiError>;
    async fn available_rfps(&self) -> Result<Vec<JobRecord>, ApiError>;
    async fn in_progress_rfps(&self) -> Result<Vec<JobRecord>, ApiError>;
    async fn artifacts(&self, rfp: &str, kind: &str) -> Result<Vec<JobRecord>, ApiError>;
    async fn rfp_sections(&self, rfp: &str) -> Result<Vec<Section>, ApiError>;
    async fn update_requirements(&self, submission: &SectionSubmission)
        -> Result<String, ApiError>;
    /// `GET /extraction-progress`: the extraction job's own percentage.
    async fn extraction_progress(&self, rfp: &str) -> Result<f32, ApiError>;
    async fn start_extraction(&self, rfp: &str) -> Result<String, ApiError>;
    async fn progress(&self, rfp: &str) -> Result<Progress, ApiError>;
    async fn requirements(&self, rfp: &str) -> Result<Vec<Requirement>, ApiError>;
    async fn chat(&self, rfp: &str, message: &str) -> Result<TextStream, ApiError>;
    async fn respond_to_requirement(
        &self,
        requirement: &Requirement,
        user_message: &str,
    ) -> Result<TextStream, ApiError>;

    /// One poll tick for `target`.
    async fn poll(&self, target: &PollTarget) -> Result<PollUpdate, ApiError> {
        match target {
            PollTarget::InProgressRfps => self.in_progress_rfps().await.map(PollUpdate::Jobs),
            PollTarget::Artifacts { rfp, kind } => {
                self.artifacts(rfp, kind).await.map(PollUpdate::Jobs)
            }
            PollTarget::ExtractionProgress { rfp } => self
                .extraction_progress(rfp)
                .await
                .map(PollUpdate::ExtractionProgress),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Deserialize)]
struct SectionsBody {
    #[serde(default)]
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct RequirementsBody {
    #[serde(default)]
    requirements: Vec<Requirement>,
}

#[derive(Debug, Deserialize)]
struct ExtractionProgressBody {
    #[serde(default)]
    progress: f32,
}

#[derive(Debug, Deserialize)]
struct ProgressBody {
    #[serde(default)]
    extraction_progress: f32,
    #[serde(default)]
    review_progress: f32,
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    base: Url,
    client: reqwest::Client,
    request_timeout: Duration,
}

impl ReqwestApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, ApiError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))?;
        // Url::join drops the last path segment unless the base ends in '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            base,
            client,
            request_timeout: settings.request_timeout,
        })
    }

    fn url(&self, endpoint: &str) -> Result<Url, ApiError> {
        self.base
            .join(endpoint)
            .map_err(|err| ApiError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    fn url_with_query(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.url(endpoint)?;
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let request = self.client.get(url).timeout(self.request_timeout);
        let response = send(request).await?;
        read_json(response).await
    }

    async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let request = self
            .client
            .post(url)
            .timeout(self.request_timeout)
            .json(body);
        let response = send(request).await?;
        read_json(response).await
    }

    async fn post_stream(&self, url: Url, body: &serde_json::Value) -> Result<TextStream, ApiError> {
        let response = send(self.client.post(url).json(body)).await?;
        let bytes = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(map_stream_error));
        Ok(decode_text_stream(bytes))
    }
}

#[async_trait::async_trait]
impl RfpApi for ReqwestApi {
    async fn upload(&self, path: &Path) -> Result<String, ApiError> {
        let contents = tokio::fs::read(path).await.map_err(|err| {
            ApiError::new(FailureKind::Io, format!("{}: {err}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        rfp_debug!("Uploading {} ({} bytes)", file_name, contents.len());

        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name));
        let request = self
            .client
            .post(self.url("upload")?)
            .timeout(self.request_timeout)
            .multipart(form);
        let response = send(request).await?;
        let body: MessageBody = read_json(response).await?;
        Ok(body.message)
    }

    async fn available_rfps(&self) -> Result<Vec<JobRecord>, ApiError> {
        self.get_json(self.url("available-rfps")?).await
    }

    async fn in_progress_rfps(&self) -> Result<Vec<JobRecord>, ApiError> {
        self.get_json(self.url("in-progress-rfps")?).await
    }

    async fn artifacts(&self, rfp: &str, kind: &str) -> Result<Vec<JobRecord>, ApiError> {
        let url = self.url_with_query("artifacts", &[("rfp", rfp), ("type", kind)])?;
        self.get_json(url).await
    }

    async fn rfp_sections(&self, rfp: &str) -> Result<Vec<Section>, ApiError> {
        let url = self.url_with_query("get-rfp-sections", &[("rfp_name", rfp)])?;
        let body: SectionsBody = self.get_json(url).await?;
        Ok(body.sections)
    }

    async fn update_requirements(
        &self,
        submission: &SectionSubmission,
    ) -> Result<String, ApiError> {
        let body = serde_json::to_value(submission)
            .map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))?;
        let reply: MessageBody = self.post_json(self.url("update-requirements")?, &body).await?;
        Ok(reply.message)
    }

    async fn extraction_progress(&self, rfp: &str) -> Result<f32, ApiError> {
        let url = self.url_with_query("extraction-progress", &[("rfp_name", rfp)])?;
        let body: ExtractionProgressBody = self.get_json(url).await?;
        Ok(body.progress.clamp(0.0, 100.0))
    }

    async fn start_extraction(&self, rfp: &str) -> Result<String, ApiError> {
        let body = json!({ "rfp_name": rfp });
        let reply: MessageBody = self.post_json(self.url("start-extraction")?, &body).await?;
        Ok(reply.message)
    }

    async fn progress(&self, rfp: &str) -> Result<Progress, ApiError> {
        let url = self.url_with_query("progress", &[("rfp_name", rfp)])?;
        let body: ProgressBody = self.get_json(url).await?;
        Ok(Progress::new(body.extraction_progress, body.review_progress))
    }

    async fn requirements(&self, rfp: &str) -> Result<Vec<Requirement>, ApiError> {
        let url = self.url_with_query("get-requirements", &[("rfp_name", rfp)])?;
        let body: RequirementsBody = self.get_json(url).await?;
        Ok(body.requirements)
    }

    async fn chat(&self, rfp: &str, message: &str) -> Result<TextStream, ApiError> {
        let body = json!({ "message": message, "rfp_name": rfp });
        self.post_stream(self.url("chat")?, &body).await
    }

    async fn respond_to_requirement(
        &self,
        requirement: &Requirement,
        user_message: &str,
    ) -> Result<TextStream, ApiError> {
        let body = json!({ "requirement": requirement, "user_message": user_message });
        self.post_stream(self.url("respond-to-requirement")?, &body)
            .await
    }
}

/// Send and turn any non-2xx into an [`ApiError`] carrying the server's
/// `{error}` text when it sent one.
async fn send(request: RequestBuilder) -> Result<Response, ApiError> {
    let response = request.send().await.map_err(map_reqwest_error)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|err| err.error)
        .unwrap_or_else(|_| status.to_string());
    Err(ApiError::new(FailureKind::HttpStatus(status.as_u16()), message))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    serde_json::from_slice(&bytes).map_err(|err| ApiError::new(FailureKind::Decode, err.to_string()))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

fn map_stream_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Stream, err.to_string())
}
