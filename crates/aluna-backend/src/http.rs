//! HTTP implementation of the assistant backend contract.
//!
//! Maps the trait onto the backend's REST surface: `POST /ask`,
//! `GET /companies[/{key}]`, `DELETE /companies/{key}`, `POST /scrap`
//! (multipart form) and `GET /scraping_status/{key}`.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use aluna_core::CompanyInfo;

use crate::error::BackendError;
use crate::types::{Answer, AskRequest, JobAccepted, JobStatusReport, ScrapeForm};
use crate::AssistantBackend;

/// Assistant backend reached over HTTP.
pub struct HttpBackend {
    client: reqwest::Client,
    base: String,
}

impl HttpBackend {
    /// Create a backend client for the given base URL.
    pub fn new(host: &str, request_timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let base = host.trim_end_matches('/').to_string();
        tracing::debug!(host = %base, "Backend client ready");
        Ok(Self { client, base })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = extract_message(&body);
        tracing::debug!(status = status.as_u16(), message = %message, "Backend rejected request");
        match status {
            StatusCode::NOT_FOUND => Err(BackendError::NotFound(message)),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(BackendError::Validation(message))
            }
            _ => Err(BackendError::Server {
                status: status.as_u16(),
                message,
            }),
        }
    }

    async fn file_part(path: &Path) -> Result<Part, BackendError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| BackendError::Validation(format!("cannot read {}: {}", path.display(), e)))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attachment".to_string());
        Ok(Part::bytes(bytes).file_name(file_name))
    }
}

/// Pull a human-readable message out of an error body, which is usually
/// `{"message": "..."}` but may be plain text.
fn extract_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.to_string())
}

#[async_trait]
impl AssistantBackend for HttpBackend {
    async fn ask_question(&self, request: AskRequest) -> Result<Answer, BackendError> {
        let response = self
            .client
            .post(self.endpoint("ask"))
            .json(&request)
            .send()
            .await?;
        let answer = Self::check(response).await?.json::<Answer>().await?;
        Ok(answer)
    }

    async fn get_company(&self, key: &str) -> Result<CompanyInfo, BackendError> {
        let response = self
            .client
            .get(self.endpoint(&format!("companies/{key}")))
            .send()
            .await?;
        let info = Self::check(response).await?.json::<CompanyInfo>().await?;
        Ok(info)
    }

    async fn list_companies(&self) -> Result<Vec<CompanyInfo>, BackendError> {
        let response = self.client.get(self.endpoint("companies")).send().await?;
        let companies = Self::check(response)
            .await?
            .json::<Vec<CompanyInfo>>()
            .await?;
        Ok(companies)
    }

    async fn delete_company(&self, key: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.endpoint(&format!("companies/{key}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn submit_scrape_job(&self, form: ScrapeForm) -> Result<JobAccepted, BackendError> {
        let mut multipart = Form::new()
            .text("company_name", form.company_name)
            .text("company_url", form.company_url)
            .text("additional_websites", form.additional_websites.join(", "))
            .text("persona", form.persona)
            .text("timeout_seconds", form.timeout_seconds.to_string());
        if !form.customer_name.is_empty() {
            multipart = multipart.text("customer_name", form.customer_name);
        }
        if let Some(logo) = &form.logo {
            multipart = multipart.part("logo", Self::file_part(logo).await?);
        }
        for attachment in &form.attachments {
            multipart = multipart.part("attachments", Self::file_part(attachment).await?);
        }

        let response = self
            .client
            .post(self.endpoint("scrap"))
            .multipart(multipart)
            .send()
            .await?;
        let accepted = Self::check(response).await?.json::<JobAccepted>().await?;
        Ok(accepted)
    }

    async fn get_job_status(&self, key: &str) -> Result<JobStatusReport, BackendError> {
        let response = self
            .client
            .get(self.endpoint(&format!("scraping_status/{key}")))
            .send()
            .await?;
        let report = Self::check(response)
            .await?
            .json::<JobStatusReport>()
            .await?;
        Ok(report)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn backend_for(server: &MockServer) -> HttpBackend {
        HttpBackend::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_cleanly() {
        let backend = HttpBackend::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.endpoint("/ask"), "http://localhost:8000/ask");
        assert_eq!(
            backend.endpoint("scraping_status/acme"),
            "http://localhost:8000/scraping_status/acme"
        );
    }

    #[test]
    fn test_extract_message_from_json() {
        assert_eq!(extract_message(r#"{"message":"bad url"}"#), "bad url");
        assert_eq!(extract_message("plain text"), "plain text");
        assert_eq!(extract_message(""), "");
    }

    #[tokio::test]
    async fn test_ask_question_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ask"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"answer": "42"})),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let answer = backend
            .ask_question(AskRequest {
                question: "meaning of life".to_string(),
                company: "acme".to_string(),
                persona: String::new(),
            })
            .await
            .unwrap();
        assert_eq!(answer.answer, "42");
    }

    #[tokio::test]
    async fn test_get_company_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies/ghost"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"message": "no such company"})),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let result = backend.get_company("ghost").await;
        match result {
            Err(BackendError::NotFound(message)) => assert_eq!(message, "no such company"),
            other => panic!("expected NotFound, got {:?}", other.map(|c| c.company_name)),
        }
    }

    #[tokio::test]
    async fn test_job_status_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/scraping_status/acme"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"status": "In Progress"})),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let report = backend.get_job_status("acme").await.unwrap();
        assert!(report.in_progress());
    }

    #[tokio::test]
    async fn test_submit_validation_error_carries_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/scrap"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "Invalid URL format"})),
            )
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let form = ScrapeForm {
            company_name: "Acme".to_string(),
            company_url: "not-a-url".to_string(),
            ..ScrapeForm::default()
        };
        let result = backend.submit_scrape_job(form).await;
        match result {
            Err(BackendError::Validation(message)) => assert_eq!(message, "Invalid URL format"),
            other => panic!("expected Validation, got {:?}", other.is_ok()),
        }
    }

    #[tokio::test]
    async fn test_server_error_maps_to_server_variant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/companies"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        let result = backend.list_companies().await;
        assert!(matches!(
            result,
            Err(BackendError::Server { status: 500, .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_company_ok() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/companies/acme"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let backend = backend_for(&server);
        backend.delete_company("acme").await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        // Nothing listens on this port.
        let backend =
            HttpBackend::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let result = backend.list_companies().await;
        assert!(matches!(result, Err(BackendError::Network(_))));
    }
}
