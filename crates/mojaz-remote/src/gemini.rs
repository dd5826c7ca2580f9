//! Direct Gemini `generateContent` backend.
//!
//! Builds the analysis prompts locally, posts them with the API key as a
//! query parameter, and returns the first candidate's text for the analyzer
//! to validate.

use async_trait::async_trait;
use mojaz_ai::{AnalysisBackend, AnalysisError, ImageAnalysisRequest, TextAnalysisRequest};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::RemoteError;
use crate::prompts;

pub const DEFAULT_TEXT_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-pro:generateContent";
pub const DEFAULT_VISION_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

const TEXT_GENERATION: GenerationConfig = GenerationConfig {
    temperature: 0.3,
    max_output_tokens: 200,
};
const IMAGE_GENERATION: GenerationConfig = GenerationConfig {
    temperature: 0.4,
    max_output_tokens: 300,
};

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub text_url: String,
    pub vision_url: String,
}

impl GeminiConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            text_url: DEFAULT_TEXT_URL.to_string(),
            vision_url: DEFAULT_VISION_URL.to_string(),
        }
    }
}

pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

// ── Wire types ──

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    Inline { inline_data: InlineData<'a> },
}

#[derive(Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

// ── Helpers ──

/// First candidate's first text part.
fn completion_text(resp: GenerateResponse) -> Result<String, RemoteError> {
    resp.candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(RemoteError::EmptyCompletion)
}

/// Split an optional `data:<mime>;base64,` prefix off an image payload.
fn split_data_url(image: &str) -> (Option<&str>, &str) {
    match image.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((meta, data)) => {
            let mime = meta.split(';').next().filter(|m| !m.is_empty());
            (mime, data)
        }
        None => (None, image),
    }
}

/// Guess the image type from the leading base64 characters.
fn sniff_mime(data: &str) -> &'static str {
    if data.starts_with("iVBORw0KGgo") {
        "image/png"
    } else if data.starts_with("R0lGOD") {
        "image/gif"
    } else if data.starts_with("UklGR") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: GeminiConfig) -> Self {
        Self { client, config }
    }

    async fn generate(&self, url: &str, request: &GenerateRequest<'_>) -> Result<String, RemoteError> {
        info!(url = %url, "calling gemini generateContent");
        let resp = self
            .client
            .post(url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(request)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RemoteError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = serde_json::from_str(&resp.text().await?)?;
        let text = completion_text(body)?;
        debug!(chars = text.len(), "gemini completion received");
        Ok(text)
    }
}

#[async_trait]
impl AnalysisBackend for GeminiClient {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn analyze_text(&self, request: &TextAnalysisRequest) -> Result<String, AnalysisError> {
        let prompt = prompts::text_prompt(request);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part::Text { text: &prompt }],
            }],
            generation_config: TEXT_GENERATION,
        };
        Ok(self.generate(&self.config.text_url, &body).await?)
    }

    async fn analyze_image(
        &self,
        request: &ImageAnalysisRequest,
    ) -> Result<String, AnalysisError> {
        let prompt = prompts::image_prompt(request);
        let (declared, data) = split_data_url(&request.image);
        let mime_type = declared.unwrap_or_else(|| sniff_mime(data));
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text { text: &prompt },
                    Part::Inline {
                        inline_data: InlineData { mime_type, data },
                    },
                ],
            }],
            generation_config: IMAGE_GENERATION,
        };
        Ok(self.generate(&self.config.vision_url, &body).await?)
    }
}
