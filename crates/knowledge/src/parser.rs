//! Document parsing into ordered pages.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use venturegraph_core::config::ServiceConfig;
use venturegraph_core::{AppError, AppResult};

const DEFAULT_BASE_URL: &str = "https://api.cloud.llamaindex.ai/api/parsing";

/// Interval between job-status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Page separator understood by [`PlainTextParser`].
pub const FORM_FEED: char = '\u{000C}';

/// One page of extracted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedPage {
    pub page: u32,
    pub text: String,
}

/// Pages of a parsed document in reading order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedDocument {
    pub pages: Vec<ParsedPage>,
}

/// Turns an uploaded file into text pages.
#[async_trait]
pub trait DocumentParser: Send + Sync {
    async fn parse(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<ParsedDocument>;
}

/// Create a document parser from the `services.parser` section.
pub fn create_parser(config: &ServiceConfig) -> AppResult<Arc<dyn DocumentParser>> {
    match config.provider.as_str() {
        "llamaparse" => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                AppError::Config(format!(
                    "LlamaParse API key not found. Set {}",
                    config.api_key_env.as_deref().unwrap_or("LLAMAPARSE_API_KEY")
                ))
            })?;

            let mut parser = LlamaParseClient::new(api_key);
            if let Some(endpoint) = &config.endpoint {
                parser = parser.with_base_url(endpoint);
            }
            Ok(Arc::new(parser))
        }
        "text" => Ok(Arc::new(PlainTextParser)),
        other => Err(AppError::Config(format!(
            "Unknown document parser: '{}'. Supported parsers: llamaparse, text",
            other
        ))),
    }
}

/// Local parser for UTF-8 text and markdown; form feeds split pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextParser;

#[async_trait]
impl DocumentParser for PlainTextParser {
    async fn parse(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<ParsedDocument> {
        let text = String::from_utf8(bytes).map_err(|_| {
            AppError::Request(format!("{} is not a UTF-8 text document", file_name))
        })?;

        let pages = text
            .split(FORM_FEED)
            .enumerate()
            .filter(|(_, page)| !page.trim().is_empty())
            .map(|(i, page)| ParsedPage {
                page: i as u32 + 1,
                text: page.to_string(),
            })
            .collect();

        Ok(ParsedDocument { pages })
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct JobResponse {
    status: String,
    #[serde(default)]
    pages: Vec<JobPage>,
}

#[derive(Debug, Deserialize)]
struct JobPage {
    #[serde(default)]
    page: Option<u32>,
    #[serde(default)]
    text: Option<String>,
}

/// LlamaParse client: upload, then poll the job until it settles.
///
/// Polling has no deadline unless [`with_max_polls`](Self::with_max_polls)
/// sets one.
pub struct LlamaParseClient {
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_polls: Option<u32>,
    client: reqwest::Client,
}

impl LlamaParseClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: None,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = Some(max_polls);
        self
    }

    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<String> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| AppError::upstream("llamaparse", format!("Invalid upload part: {}", e)))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("language", "en");

        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::upstream("llamaparse", format!("Failed to upload: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::upstream(
                "llamaparse",
                format!("Upload failed ({}): {}", status, error_text),
            ));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream("llamaparse", format!("Failed to parse upload response: {}", e)))?;

        Ok(upload.id)
    }

    async fn job_status(&self, job_id: &str) -> AppResult<JobResponse> {
        let response = self
            .client
            .get(format!("{}/job/{}", self.base_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| AppError::upstream("llamaparse", format!("Failed to poll job: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::upstream(
                "llamaparse",
                format!("Job status request failed ({})", response.status()),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::upstream("llamaparse", format!("Failed to parse job status: {}", e)))
    }
}

#[async_trait]
impl DocumentParser for LlamaParseClient {
    async fn parse(&self, file_name: &str, bytes: Vec<u8>) -> AppResult<ParsedDocument> {
        let job_id = self.upload(file_name, bytes).await?;
        tracing::info!(job_id = %job_id, file_name, "Uploaded document for parsing");

        let mut polls = 0u32;
        loop {
            if self.max_polls.is_some_and(|max| polls >= max) {
                return Err(AppError::upstream(
                    "llamaparse",
                    format!("Job {} still pending after {} polls", job_id, polls),
                ));
            }

            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            let job = self.job_status(&job_id).await?;
            match job.status.as_str() {
                "PENDING" | "PROCESSING" => {
                    tracing::debug!(job_id = %job_id, polls, "Parse job still running");
                }
                "SUCCESS" => {
                    let pages = job
                        .pages
                        .into_iter()
                        .map(|p| ParsedPage {
                            page: p.page.unwrap_or(0),
                            text: p.text.unwrap_or_default(),
                        })
                        .collect();
                    return Ok(ParsedDocument { pages });
                }
                other => {
                    return Err(AppError::upstream(
                        "llamaparse",
                        format!("Failed to parse {}: job ended with status {}", file_name, other),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client(server: &MockServer) -> LlamaParseClient {
        LlamaParseClient::new("llx-test")
            .with_base_url(server.uri())
            .with_poll_interval(Duration::from_millis(5))
    }

    #[tokio::test]
    async fn test_plain_text_pages_split_on_form_feed() {
        let text = "Page one text\u{000C}\u{000C}Page three text";
        let doc = PlainTextParser
            .parse("notes.txt", text.as_bytes().to_vec())
            .await
            .unwrap();

        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].page, 1);
        assert_eq!(doc.pages[1].page, 3);
        assert_eq!(doc.pages[1].text, "Page three text");
    }

    #[tokio::test]
    async fn test_plain_text_rejects_binary() {
        let err = PlainTextParser
            .parse("deck.pdf", vec![0xff, 0xfe, 0x00])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Request(_)));
    }

    #[tokio::test]
    async fn test_llamaparse_polls_until_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .and(header("authorization", "Bearer llx-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "job-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/job/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "PENDING"})))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/job/job-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "SUCCESS",
                "pages": [{"page": 1, "text": "Problem"}, {"page": 2, "text": "Solution"}]
            })))
            .mount(&server)
            .await;

        let doc = fast_client(&server)
            .parse("deck.pdf", b"%PDF-1.4".to_vec())
            .await
            .unwrap();

        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[1].text, "Solution");
    }

    #[tokio::test]
    async fn test_llamaparse_terminal_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "job-2"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/job/job-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ERROR"})))
            .mount(&server)
            .await;

        let err = fast_client(&server)
            .parse("deck.pdf", b"%PDF".to_vec())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ERROR"));
    }

    #[tokio::test]
    async fn test_llamaparse_max_polls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "job-3"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/job/job-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "PROCESSING"})))
            .expect(3)
            .mount(&server)
            .await;

        let err = fast_client(&server)
            .with_max_polls(3)
            .parse("deck.pdf", b"%PDF".to_vec())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("still pending"));
    }

    #[test]
    fn test_create_parser() {
        let config = ServiceConfig {
            provider: "text".to_string(),
            endpoint: None,
            model: None,
            api_key_env: None,
        };
        assert!(create_parser(&config).is_ok());

        let unknown = ServiceConfig {
            provider: "ocr".to_string(),
            ..config
        };
        assert!(create_parser(&unknown).is_err());
    }
}
