//! # Gemini API client
//!
//! Minimal REST client for the Gemini `v1beta` API: `generateContent` plus the Files API
//! (resumable upload, metadata lookup, waiting for a file to become `ACTIVE`).
//! Provides token masking for safe logging.

mod error;
mod types;

pub use error::GeminiError;
pub use types::{
    Candidate, Content, FileData, FileMetadata, FileState, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, Part, PromptFeedback, ResponseContent,
    ResponsePart, SafetySetting, UsageMetadata,
};

use std::path::Path;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use types::{ApiErrorBody, NewFileInfo, StartUploadRequest, UploadFileResponse};

pub type Result<T> = std::result::Result<T, GeminiError>;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

const API_KEY_HEADER: &str = "x-goog-api-key";
const UPLOAD_URL_HEADER: &str = "x-goog-upload-url";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Finish reasons that mean the model completed normally.
const NORMAL_FINISH_REASONS: &[&str] = &["STOP", "MAX_TOKENS", "FINISH_REASON_UNSPECIFIED"];

/// Masks an API key/token for safe logging: shows first 7 chars + "***" + last 4 chars.
/// If length <= 11, returns "***" to avoid leaking any part of the key.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let len = chars.len();
    if len <= 11 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[len - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

/// Gemini REST client. Cheap to clone; the underlying connection pool is shared.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_key", &mask_token(&self.api_key))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl GeminiClient {
    /// Builds a client against the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Builds a client with a custom base URL (proxies, test servers).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header(API_KEY_HEADER, &self.api_key)
    }

    /// Sends one `generateContent` call.
    ///
    /// A blocked prompt yields [`GeminiError::Blocked`]; a candidate that finished for any
    /// reason other than a normal stop yields [`GeminiError::Stopped`].
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, model
        );

        tracing::info!(
            model = %model,
            content_count = request.contents.len(),
            api_key = %mask_token(&self.api_key),
            "Gemini generateContent request"
        );

        let response = self
            .authorized(self.http.post(&url))
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;
        let body: GenerateContentResponse = response.json().await?;

        if let Some(ref usage) = body.usage_metadata {
            tracing::info!(
                prompt_tokens = ?usage.prompt_token_count,
                candidates_tokens = ?usage.candidates_token_count,
                total_tokens = ?usage.total_token_count,
                "Gemini generateContent usage"
            );
        }

        if let Some(reason) = body.block_reason() {
            tracing::warn!(reason = %reason, "Gemini prompt blocked");
            return Err(GeminiError::Blocked(reason.to_string()));
        }

        if let Some(reason) = body.finish_reason() {
            if !NORMAL_FINISH_REASONS.contains(&reason) {
                tracing::warn!(reason = %reason, "Gemini generation stopped");
                return Err(GeminiError::Stopped(reason.to_string()));
            }
        }

        Ok(body)
    }

    /// Uploads a local file with the resumable protocol (start, then upload+finalize).
    pub async fn upload_file(
        &self,
        path: &Path,
        mime_type: &str,
        display_name: Option<&str>,
    ) -> Result<FileMetadata> {
        let bytes = tokio::fs::read(path).await?;
        let start_url = format!("{}/upload/v1beta/files", self.base_url);

        tracing::info!(
            path = %path.display(),
            mime_type = %mime_type,
            size = bytes.len(),
            "Gemini file upload start"
        );

        let start = self
            .authorized(self.http.post(&start_url))
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", bytes.len().to_string())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&StartUploadRequest {
                file: NewFileInfo { display_name },
            })
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get(UPLOAD_URL_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or(GeminiError::MissingUploadUrl)?;

        let finished = self
            .http
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .header(reqwest::header::CONTENT_LENGTH, bytes.len().to_string())
            .body(bytes)
            .send()
            .await?;
        let finished = check_status(finished).await?;
        let uploaded: UploadFileResponse = finished.json().await?;

        tracing::info!(
            name = %uploaded.file.name,
            state = ?uploaded.file.state,
            "Gemini file uploaded"
        );

        Ok(uploaded.file)
    }

    /// Fetches file metadata by resource name (`files/...`).
    pub async fn get_file(&self, name: &str) -> Result<FileMetadata> {
        let url = format!("{}/v1beta/{}", self.base_url, name);
        let response = self.authorized(self.http.get(&url)).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }

    /// Polls a file until it is `ACTIVE`.
    ///
    /// Files without a state are treated as ready. `FAILED` ends the wait immediately.
    pub async fn wait_for_active(
        &self,
        file: FileMetadata,
        max_attempts: u32,
        interval: Duration,
    ) -> Result<FileMetadata> {
        let mut current = file;
        for attempt in 0..=max_attempts {
            match current.state {
                None | Some(FileState::Active) => return Ok(current),
                Some(FileState::Failed) => {
                    return Err(GeminiError::FileProcessingFailed(current.name))
                }
                Some(_) if attempt == max_attempts => break,
                Some(state) => {
                    tracing::debug!(name = %current.name, state = ?state, "Waiting for file");
                    tokio::time::sleep(interval).await;
                    current = self.get_file(&current.name).await?;
                }
            }
        }
        Err(GeminiError::FileNotReady(current.name))
    }
}

/// Turns non-2xx responses into [`GeminiError::Api`], using the error body's message when present.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&text)
        .map(|body| body.error.message)
        .unwrap_or(text);
    tracing::error!(status = status.as_u16(), message = %message, "Gemini API error");
    Err(GeminiError::Api {
        status: status.as_u16(),
        message,
    })
}
