//! Gemini-backed chat model and embedding provider.
//!
//! Both clients call the Generative Language REST API directly with
//! `reqwest`, authenticating via the `x-goog-api-key` header.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{Result, SupportError};
use crate::model::{ChatModel, Content, FunctionDeclaration};

/// Base URL of the Generative Language API.
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// The default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gemini-2.5-flash";

/// The default embedding model.
const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-004";

/// Dimensionality of `text-embedding-004` vectors.
const DEFAULT_EMBEDDING_DIMENSIONS: usize = 768;

fn api_key_headers(api_key: &str, provider: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(api_key).map_err(|_| SupportError::Model {
        provider: provider.to_string(),
        message: "API key contains invalid header characters".to_string(),
    })?;
    headers.insert("x-goog-api-key", value);
    Ok(headers)
}

#[derive(Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Map a non-success HTTP response to its error detail, falling back to the
/// raw body when the error payload does not parse.
async fn response_detail(response: reqwest::Response) -> (reqwest::StatusCode, String) {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let detail =
        serde_json::from_str::<ApiErrorResponse>(&body).map(|e| e.error.message).unwrap_or(body);
    (status, detail)
}

// ── Chat model ─────────────────────────────────────────────────────

/// A [`ChatModel`] backed by the Gemini `generateContent` endpoint.
pub struct GeminiChatModel {
    client: reqwest::Client,
    model: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiChatModel {
    /// Create a new chat model with the given API key and model identifier
    /// (e.g. `gemini-2.5-flash`).
    pub fn new(api_key: impl AsRef<str>, model: impl Into<String>) -> Result<Self> {
        let api_key = api_key.as_ref();
        if api_key.is_empty() {
            return Err(SupportError::Model {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }

        let client = reqwest::Client::builder()
            .default_headers(api_key_headers(api_key, "Gemini")?)
            .build()
            .map_err(|e| SupportError::Model {
                provider: "Gemini".into(),
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            model: model.into(),
            temperature: 0.7,
            max_output_tokens: 4000,
        })
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the maximum number of output tokens.
    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

// ── Gemini generateContent request/response types ──────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<InstructionParts<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDeclarations<'a>>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct InstructionParts<'a> {
    parts: Vec<TextOnlyPart<'a>>,
}

#[derive(Serialize)]
struct TextOnlyPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolDeclarations<'a> {
    function_declarations: &'a [FunctionDeclaration],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[async_trait]
impl ChatModel for GeminiChatModel {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system_instruction: &str,
        contents: &[Content],
        tools: &[FunctionDeclaration],
    ) -> Result<Content> {
        let model_err = |message: String| SupportError::Model {
            provider: "Gemini".into(),
            message,
        };

        debug!(
            model = %self.model,
            contents = contents.len(),
            tools = tools.len(),
            "generating content"
        );

        let request = GenerateContentRequest {
            contents,
            system_instruction: (!system_instruction.is_empty())
                .then(|| InstructionParts { parts: vec![TextOnlyPart { text: system_instruction }] }),
            tools: (!tools.is_empty())
                .then(|| vec![ToolDeclarations { function_declarations: tools }]),
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let url = format!("{GEMINI_BASE_URL}/models/{}:generateContent", self.model);
        let response = self.client.post(&url).json(&request).send().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "request failed");
            model_err(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let (status, detail) = response_detail(response).await;
            error!(provider = "Gemini", %status, "API error");
            return Err(model_err(format!("API returned {status}: {detail}")));
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            model_err(format!("failed to parse response: {e}"))
        })?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .ok_or_else(|| model_err("response contained no candidates".into()))
    }
}

// ── Embedding provider ─────────────────────────────────────────────

/// An [`EmbeddingProvider`] backed by the Gemini embedding API.
pub struct GeminiEmbeddingProvider {
    client: reqwest::Client,
    model: String,
    dimensions: usize,
}

impl GeminiEmbeddingProvider {
    /// Create a new provider with the given API key, using the default
    /// `text-embedding-004` model (768 dimensions).
    pub fn new(api_key: impl AsRef<str>) -> Result<Self> {
        let api_key = api_key.as_ref();
        if api_key.is_empty() {
            return Err(SupportError::Embedding {
                provider: "Gemini".into(),
                message: "API key must not be empty".into(),
            });
        }

        let headers = api_key_headers(api_key, "Gemini").map_err(|_| SupportError::Embedding {
            provider: "Gemini".into(),
            message: "API key contains invalid header characters".into(),
        })?;
        let client = reqwest::Client::builder().default_headers(headers).build().map_err(|e| {
            SupportError::Embedding {
                provider: "Gemini".into(),
                message: format!("failed to build HTTP client: {e}"),
            }
        })?;

        Ok(Self {
            client,
            model: DEFAULT_EMBEDDING_MODEL.into(),
            dimensions: DEFAULT_EMBEDDING_DIMENSIONS,
        })
    }

    fn embed_err(message: String) -> SupportError {
        SupportError::Embedding { provider: "Gemini".into(), message }
    }
}

// ── Gemini embedContent request/response types ─────────────────────

#[derive(Serialize)]
struct EmbedContentRequest<'a> {
    model: String,
    content: EmbedContentParts<'a>,
}

#[derive(Serialize)]
struct EmbedContentParts<'a> {
    parts: Vec<TextOnlyPart<'a>>,
}

#[derive(Serialize)]
struct BatchEmbedContentsRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

#[derive(Deserialize)]
struct EmbedContentResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct BatchEmbedContentsResponse {
    embeddings: Vec<EmbeddingValues>,
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = "Gemini", text_len = text.len(), "embedding single text");

        let request = EmbedContentRequest {
            model: format!("models/{}", self.model),
            content: EmbedContentParts { parts: vec![TextOnlyPart { text }] },
        };

        let url = format!("{GEMINI_BASE_URL}/models/{}:embedContent", self.model);
        let response = self.client.post(&url).json(&request).send().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "request failed");
            Self::embed_err(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let (status, detail) = response_detail(response).await;
            error!(provider = "Gemini", %status, "API error");
            return Err(Self::embed_err(format!("API returned {status}: {detail}")));
        }

        let parsed: EmbedContentResponse = response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            Self::embed_err(format!("failed to parse response: {e}"))
        })?;

        Ok(parsed.embedding.values)
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(provider = "Gemini", batch_size = texts.len(), model = %self.model, "embedding batch");

        let request = BatchEmbedContentsRequest {
            requests: texts
                .iter()
                .map(|text| EmbedContentRequest {
                    model: format!("models/{}", self.model),
                    content: EmbedContentParts { parts: vec![TextOnlyPart { text }] },
                })
                .collect(),
        };

        let url = format!("{GEMINI_BASE_URL}/models/{}:batchEmbedContents", self.model);
        let response = self.client.post(&url).json(&request).send().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "request failed");
            Self::embed_err(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let (status, detail) = response_detail(response).await;
            error!(provider = "Gemini", %status, "API error");
            return Err(Self::embed_err(format!("API returned {status}: {detail}")));
        }

        let parsed: BatchEmbedContentsResponse = response.json().await.map_err(|e| {
            error!(provider = "Gemini", error = %e, "failed to parse response");
            Self::embed_err(format!("failed to parse response: {e}"))
        })?;

        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
