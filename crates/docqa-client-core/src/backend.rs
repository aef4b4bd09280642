use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{InputError, normalize_base_url};
use crate::identity::{BearerCredential, IdentityAdapter, IdentityError};
use crate::transport::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport, RequestBody, TransportError, UploadFile,
};

pub const UPLOAD_FORM_FIELD: &str = "files";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("question must not be empty")]
    EmptyQuestion,
    #[error(transparent)]
    Identity(#[from] IdentityError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("backend returned {status}: {detail}")]
    Http { status: u16, detail: String },
    #[error("failed to decode response: {message}")]
    Decode { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusReport {
    pub documents_count: u64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub source: String,
    pub chunks: u64,
    pub processed: bool,
}

#[derive(Debug, Deserialize)]
struct DocumentsResponse {
    documents: Vec<DocumentSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusSummary {
    pub documents: u64,
    pub chunks: u64,
}

#[derive(Debug, Serialize)]
struct AskRequest<'a> {
    question: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AnswerResult {
    pub answer: String,
    pub sources: Vec<String>,
    pub llm_used: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub llms_available: Vec<String>,
}

/// How the backend answered an upload. The body is never inspected, only the
/// status code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Skipped,
    Uploaded,
    Rejected { status: u16, detail: String },
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Option<serde_json::Value>,
}

pub struct BackendClient<I, T> {
    base_url: String,
    identity: Rc<I>,
    transport: T,
}

impl<I, T> BackendClient<I, T>
where
    I: IdentityAdapter,
    T: HttpTransport,
{
    pub fn new(base_url: &str, identity: Rc<I>, transport: T) -> Result<Self, InputError> {
        Ok(Self {
            base_url: normalize_base_url(base_url)?,
            identity,
            transport,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        let trimmed = path.trim();
        if trimmed.starts_with('/') {
            format!("{}{}", self.base_url, trimmed)
        } else {
            format!("{}/{}", self.base_url, trimmed)
        }
    }

    #[must_use]
    pub fn status_path() -> &'static str {
        "/status"
    }

    #[must_use]
    pub fn documents_path() -> &'static str {
        "/documents"
    }

    #[must_use]
    pub fn ask_path() -> &'static str {
        "/ask"
    }

    #[must_use]
    pub fn upload_path() -> &'static str {
        "/upload"
    }

    #[must_use]
    pub fn health_path() -> &'static str {
        "/health"
    }

    pub async fn status(&self) -> Result<StatusReport, BackendError> {
        let response = self
            .send(HttpMethod::Get, Self::status_path(), RequestBody::Empty)
            .await?;
        decode_json_response(response)
    }

    pub async fn list_documents(&self) -> Result<Vec<DocumentSummary>, BackendError> {
        let response = self
            .send(HttpMethod::Get, Self::documents_path(), RequestBody::Empty)
            .await?;
        decode_json_response::<DocumentsResponse>(response).map(|payload| payload.documents)
    }

    /// Document and chunk totals. The listing is only fetched when the backend
    /// reports at least one document.
    pub async fn status_summary(&self) -> Result<StatusSummary, BackendError> {
        let report = self.status().await?;
        if report.documents_count == 0 {
            return Ok(StatusSummary::default());
        }
        let documents = self.list_documents().await?;
        Ok(StatusSummary {
            documents: report.documents_count,
            chunks: documents.iter().map(|document| document.chunks).sum(),
        })
    }

    pub async fn ask_question(&self, question: &str) -> Result<AnswerResult, BackendError> {
        if question.trim().is_empty() {
            return Err(BackendError::EmptyQuestion);
        }
        let body = serde_json::to_value(AskRequest { question }).map_err(|error| {
            BackendError::Decode {
                message: error.to_string(),
            }
        })?;
        let response = self
            .send(HttpMethod::Post, Self::ask_path(), RequestBody::Json(body))
            .await?;
        decode_json_response(response)
    }

    pub async fn upload_files(&self, files: &[UploadFile]) -> Result<UploadOutcome, BackendError> {
        if files.is_empty() {
            return Ok(UploadOutcome::Skipped);
        }
        let body = RequestBody::Multipart {
            field: UPLOAD_FORM_FIELD,
            files: files.to_vec(),
        };
        let response = self
            .send(HttpMethod::Post, Self::upload_path(), body)
            .await?;
        if response.is_success() {
            return Ok(UploadOutcome::Uploaded);
        }
        let detail = error_detail(&response.body);
        warn!(status = response.status, %detail, "upload rejected by backend");
        Ok(UploadOutcome::Rejected {
            status: response.status,
            detail,
        })
    }

    pub async fn clear_documents(&self) -> Result<(), BackendError> {
        let response = self
            .send(HttpMethod::Delete, Self::documents_path(), RequestBody::Empty)
            .await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(format_http_error(response.status, &response.body))
        }
    }

    /// Liveness check. The backend serves it without a session, so no
    /// credential is requested.
    pub async fn health(&self) -> Result<HealthReport, BackendError> {
        let response = self
            .dispatch(HttpMethod::Get, Self::health_path(), RequestBody::Empty, None)
            .await?;
        decode_json_response(response)
    }

    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
    ) -> Result<HttpResponse, BackendError> {
        let bearer = self.identity.credential().await?;
        self.dispatch(method, path, body, Some(bearer)).await
    }

    async fn dispatch(
        &self,
        method: HttpMethod,
        path: &str,
        body: RequestBody,
        bearer: Option<BearerCredential>,
    ) -> Result<HttpResponse, BackendError> {
        let url = self.endpoint(path);
        debug!(method = method.as_str(), %url, "sending backend request");
        let response = self
            .transport
            .send(HttpRequest {
                method,
                url,
                bearer,
                body,
            })
            .await?;
        debug!(method = method.as_str(), path, status = response.status, "backend responded");
        Ok(response)
    }
}

pub fn format_http_error(status: u16, body: &[u8]) -> BackendError {
    BackendError::Http {
        status,
        detail: error_detail(body),
    }
}

/// Human-readable reason from an error body: the `detail` field when the body
/// carries one, otherwise the trimmed body text.
pub fn error_detail(body: &[u8]) -> String {
    if let Ok(ErrorBody {
        detail: Some(detail),
    }) = serde_json::from_slice::<ErrorBody>(body)
    {
        let text = match detail {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        if let Some(text) = non_empty_string(&text) {
            return text;
        }
    }
    non_empty_string(&String::from_utf8_lossy(body)).unwrap_or_else(|| "<empty>".to_string())
}

fn decode_json_response<T>(response: HttpResponse) -> Result<T, BackendError>
where
    T: for<'de> Deserialize<'de>,
{
    if !response.is_success() {
        return Err(format_http_error(response.status, &response.body));
    }
    serde_json::from_slice::<T>(&response.body).map_err(|error| BackendError::Decode {
        message: error.to_string(),
    })
}

fn non_empty_string(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
