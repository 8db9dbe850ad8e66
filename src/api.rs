use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::{Map, Value};
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::history::{self, AnalysisSummary, ReferralHistoryEntry};

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("{0}")]
    Backend(String),
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid endpoint: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to read {path}: {source}")]
    File {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Message of a `{error: truthy, message}` body, if the backend reported a failure.
pub fn backend_error(body: &Value) -> Option<String> {
    let map = body.as_object()?;
    if !map.get("error").is_some_and(crate::coerce::is_truthy) {
        return None;
    }
    Some(
        map.get("message")
            .and_then(crate::coerce::text)
            .or_else(|| map.get("error").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_else(|| "خطای ناشناخته از سرور".to_string()),
    )
}

fn status_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            let map = value.as_object()?;
            ["message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(crate::coerce::text))
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string()
        })
}

/// Unwraps a stored analysis record into the payload the normalizers expect.
///
/// `full_analysis` may be a JSON string or an object; the record's own id,
/// file name and timestamp are carried over when the payload lacks them.
pub fn unwrap_full_analysis(record: Value) -> Result<Value, ApiError> {
    let mut envelope = match record {
        Value::Object(map) => map,
        other => return Ok(other),
    };
    let mut payload = match envelope.remove("full_analysis") {
        Some(Value::String(text)) => serde_json::from_str::<Value>(&text)?,
        Some(Value::Object(map)) => Value::Object(map),
        Some(Value::Null) | None => return Ok(Value::Object(envelope)),
        Some(other) => other,
    };
    if let Value::Object(map) = &mut payload {
        carry_meta(&envelope, map);
    }
    Ok(payload)
}

fn carry_meta(envelope: &Map<String, Value>, payload: &mut Map<String, Value>) {
    for key in ["id", "file_name", "analyzed_at", "created_at"] {
        if let Some(value) = envelope.get(key) {
            payload.entry(key).or_insert_with(|| value.clone());
        }
    }
}

pub fn join_endpoint(base: &Url, path: &str) -> Result<Url, ApiError> {
    Ok(base.join(path.trim_start_matches('/'))?)
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(session) = &config.session {
            if let Ok(value) = HeaderValue::from_str(&format!("{SESSION_COOKIE}={session}")) {
                headers.insert(COOKIE, value);
            } else {
                log::warn!("ignoring session value that is not a valid header");
            }
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            client,
            base: config.base_url.clone(),
        })
    }

    async fn send(&self, method: Method, path: &str, form: Option<Form>) -> Result<Response, ApiError> {
        let url = join_endpoint(&self.base, path)?;
        log::info!("{method} {url}");
        let mut request = self.client.request(method, url);
        if let Some(form) = form {
            request = request.multipart(form);
        }
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status {
                status,
                message: status_message(status, &body),
            });
        }
        Ok(response)
    }

    async fn json(&self, method: Method, path: &str, form: Option<Form>) -> Result<Value, ApiError> {
        let text = self.send(method, path, form).await?.text().await?;
        let body: Value = serde_json::from_str(&text)?;
        if let Some(message) = backend_error(&body) {
            return Err(ApiError::Backend(message));
        }
        Ok(body)
    }

    /// For endpoints whose body only matters when it reports an error.
    async fn command(&self, method: Method, path: &str) -> Result<(), ApiError> {
        let text = self.send(method, path, None).await?.text().await?;
        if let Ok(body) = serde_json::from_str::<Value>(&text) {
            if let Some(message) = backend_error(&body) {
                return Err(ApiError::Backend(message));
            }
        }
        Ok(())
    }

    async fn bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let bytes = self.send(Method::GET, path, None).await?.bytes().await?;
        log::info!("received {} bytes from {path}", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn upload(&self, path: &str, file: &Path) -> Result<Value, ApiError> {
        let contents = tokio::fs::read(file).await.map_err(|source| ApiError::File {
            path: file.to_path_buf(),
            source,
        })?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.xlsx".to_string());
        let form = Form::new().part("file", Part::bytes(contents).file_name(file_name));
        self.json(Method::POST, path, Some(form)).await
    }

    pub async fn analyze_call_file(&self, file: &Path) -> Result<Value, ApiError> {
        self.upload("/api/analyze", file).await
    }

    pub async fn analyze_referral_file(&self, file: &Path) -> Result<Value, ApiError> {
        self.upload("/api/analyze-referral", file).await
    }

    pub async fn history(&self) -> Result<Vec<AnalysisSummary>, ApiError> {
        let body = self.json(Method::GET, "/api/history", None).await?;
        Ok(history::parse_rows(&body, AnalysisSummary::from_value))
    }

    pub async fn analysis_history(&self) -> Result<Vec<AnalysisSummary>, ApiError> {
        let body = self.json(Method::GET, "/api/analysis/history", None).await?;
        Ok(history::parse_rows(&body, AnalysisSummary::from_value))
    }

    pub async fn analysis(&self, id: i64) -> Result<Value, ApiError> {
        let record = self.json(Method::GET, &format!("/api/analysis/{id}"), None).await?;
        unwrap_full_analysis(record)
    }

    pub async fn latest_analysis(&self) -> Result<Value, ApiError> {
        let record = self.json(Method::GET, "/api/analysis/latest", None).await?;
        unwrap_full_analysis(record)
    }

    pub async fn delete_analysis(&self, id: i64) -> Result<(), ApiError> {
        self.command(Method::DELETE, &format!("/api/analysis/{id}")).await
    }

    pub async fn referral_history(&self) -> Result<Vec<ReferralHistoryEntry>, ApiError> {
        let body = self.json(Method::GET, "/api/referral-history", None).await?;
        Ok(history::parse_rows(&body, ReferralHistoryEntry::from_value))
    }

    pub async fn referral_analysis(&self, id: i64) -> Result<Value, ApiError> {
        let record = self
            .json(Method::GET, &format!("/api/referral-analysis/{id}"), None)
            .await?;
        unwrap_full_analysis(record)
    }

    pub async fn delete_referral_analysis(&self, id: i64) -> Result<(), ApiError> {
        self.command(Method::DELETE, &format!("/api/referral-analysis/{id}"))
            .await
    }

    pub async fn referral_report(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        self.bytes(&format!("/api/referral-report/{id}")).await
    }

    pub async fn referral_export_all(&self) -> Result<Vec<u8>, ApiError> {
        self.bytes("/api/referral-export-all").await
    }

    pub async fn original_file(&self, id: i64) -> Result<Vec<u8>, ApiError> {
        self.bytes(&format!("/api/file/{id}")).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backend_error_needs_truthy_flag() {
        assert_eq!(
            backend_error(&json!({"error": true, "message": "فایل نامعتبر است"})).as_deref(),
            Some("فایل نامعتبر است")
        );
        assert_eq!(
            backend_error(&json!({"error": "quota exceeded"})).as_deref(),
            Some("quota exceeded")
        );
        assert_eq!(backend_error(&json!({"error": false, "message": "ok"})), None);
        assert_eq!(backend_error(&json!({"امتیازها": {}})), None);
        assert_eq!(backend_error(&json!([1, 2])), None);
    }

    #[test]
    fn status_message_prefers_body_text() {
        assert_eq!(
            status_message(StatusCode::NOT_FOUND, r#"{"message": "رکورد یافت نشد"}"#),
            "رکورد یافت نشد"
        );
        assert_eq!(status_message(StatusCode::NOT_FOUND, "<html>"), "Not Found");
    }

    #[test]
    fn endpoints_join_under_base_path() {
        let base = Url::parse("http://127.0.0.1:5000/").expect("valid url");
        assert_eq!(
            join_endpoint(&base, "/api/analysis/4").expect("joins").as_str(),
            "http://127.0.0.1:5000/api/analysis/4"
        );
        let prefixed = Url::parse("https://crm.example.com/app/").expect("valid url");
        assert_eq!(
            join_endpoint(&prefixed, "/api/history").expect("joins").as_str(),
            "https://crm.example.com/app/api/history"
        );
    }

    #[test]
    fn full_analysis_string_is_parsed_and_meta_carried() {
        let record = json!({
            "id": 9,
            "file_name": "call.mp3",
            "full_analysis": "{\"امتیازها\": {\"امتیاز_کل\": 7}}"
        });
        let payload = unwrap_full_analysis(record).expect("valid payload");
        assert_eq!(payload["امتیازها"]["امتیاز_کل"], 7);
        assert_eq!(payload["id"], 9);
        assert_eq!(payload["file_name"], "call.mp3");
    }

    #[test]
    fn full_analysis_object_and_bare_records() {
        let payload = unwrap_full_analysis(json!({
            "id": 2,
            "full_analysis": {"status_analysis": {}, "id": 5}
        }))
        .expect("valid payload");
        assert_eq!(payload["id"], 5);
        assert!(payload.get("status_analysis").is_some());

        let bare = unwrap_full_analysis(json!({"id": 3, "فیلدهای_عددی": {}})).expect("valid payload");
        assert_eq!(bare["id"], 3);

        assert!(matches!(
            unwrap_full_analysis(json!({"full_analysis": "{not json"})),
            Err(ApiError::Decode(_))
        ));
    }
}
