//! HTTP client for the objection-analysis proxy (`/api/analyze`, `/api/analyzeImage`).

use async_trait::async_trait;
use mojaz_ai::{AnalysisBackend, AnalysisError, ImageAnalysisRequest, TextAnalysisRequest};
use serde::Serialize;
use tracing::info;

use crate::error::RemoteError;

const ANALYZE_PATH: &str = "/api/analyze";
const ANALYZE_IMAGE_PATH: &str = "/api/analyzeImage";

/// Posts analysis requests to a proxy that fronts the LLM and returns the
/// reply JSON as its response body.
pub struct ProxyClient {
    client: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    /// Create a client for the given proxy base URL.
    ///
    /// `base_url` should be like `http://localhost:3000` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: String) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<String, RemoteError> {
        let url = format!("{}{}", self.base_url, path);

        info!(url = %url, "posting analysis request");
        let resp = self.client.post(&url).json(body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Server {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.text().await?)
    }
}

#[async_trait]
impl AnalysisBackend for ProxyClient {
    fn name(&self) -> &str {
        "proxy"
    }

    async fn analyze_text(&self, request: &TextAnalysisRequest) -> Result<String, AnalysisError> {
        Ok(self.post(ANALYZE_PATH, request).await?)
    }

    async fn analyze_image(
        &self,
        request: &ImageAnalysisRequest,
    ) -> Result<String, AnalysisError> {
        Ok(self.post(ANALYZE_IMAGE_PATH, request).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_server::{direct_client, serve_once, split_request};
    use mojaz_ai::{AnalyzerConfig, ObjectionAnalyzer, fallback};
    use mojaz_core::{Priority, ViolationType};
    use std::sync::Arc;

    #[test]
    fn proxy_client_trims_trailing_slash() {
        let client = ProxyClient::new("http://localhost:3000/".into());
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn text_request_uses_camel_case() {
        let req = TextAnalysisRequest {
            text: "نص".into(),
            violation_type: "تجاوز خطير".into(),
            attachments_count: 2,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["attachmentsCount"], 2);
        assert_eq!(json["violationType"], "تجاوز خطير");
    }

    #[tokio::test]
    async fn posts_text_request_and_returns_body() {
        let reply = r#"{"priority":"high","hasEvidence":true,"reasoning":"قوي","confidence":0.9}"#;
        let (url, server) = serve_once("200 OK", reply.to_string()).await;
        let client = ProxyClient::with_client(direct_client(), url);

        let req = TextAnalysisRequest {
            text: "الرادار معطل".into(),
            violation_type: ViolationType::Speeding.label().into(),
            attachments_count: 1,
        };
        let body = client.analyze_text(&req).await.unwrap();
        assert_eq!(body, reply);

        let raw = server.await.unwrap();
        let (head, sent) = split_request(&raw);
        assert!(head.starts_with("POST /api/analyze HTTP/1.1"));
        let sent: TextAnalysisRequest = serde_json::from_str(sent).unwrap();
        assert_eq!(sent, req);
    }

    #[tokio::test]
    async fn posts_image_request_to_image_path() {
        let (url, server) = serve_once("200 OK", "{}".to_string()).await;
        let client = ProxyClient::with_client(direct_client(), url);

        let req = ImageAnalysisRequest {
            image: "aGVsbG8=".into(),
            violation_type: ViolationType::NoSeatBelt.label().into(),
            objection_text: "كنت أرتدي الحزام".into(),
        };
        client.analyze_image(&req).await.unwrap();

        let raw = server.await.unwrap();
        assert!(raw.starts_with("POST /api/analyzeImage HTTP/1.1"));
        assert!(raw.contains("\"objectionText\""));
    }

    #[tokio::test]
    async fn non_success_status_is_unavailable() {
        let (url, _server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#.into()).await;
        let client = ProxyClient::with_client(direct_client(), url);
        let req = TextAnalysisRequest {
            text: "x".into(),
            violation_type: "y".into(),
            attachments_count: 0,
        };

        let err = client.analyze_text(&req).await.unwrap_err();
        match err {
            AnalysisError::Unavailable(msg) => assert!(msg.contains("500"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn analyzer_falls_back_on_proxy_error() {
        let (url, _server) = serve_once("502 Bad Gateway", String::new()).await;
        let backend = Arc::new(ProxyClient::with_client(direct_client(), url));
        let analyzer = ObjectionAnalyzer::new(backend, AnalyzerConfig::default());

        let text = "رقم اللوحة خاطئ";
        let r = analyzer.analyze(text, ViolationType::Speeding, 0, &[]).await;
        assert_eq!(r, fallback::classify(text, 0));
        assert_eq!(r.priority, Priority::Medium);
    }
}
