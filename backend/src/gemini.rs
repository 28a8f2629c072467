use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use shared::{FileRecord, TextGenerator};
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
    #[error("Gemini returned {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("Gemini returned no text")]
    EmptyResponse,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData<'a> },
}

#[derive(Debug, Serialize)]
struct InlineData<'a> {
    mime_type: &'a str,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_request<'a>(prompt: &'a str, mime_type: &'a str, data: &[u8]) -> GenerateContentRequest<'a> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                Part::Text { text: prompt },
                Part::InlineData {
                    inline_data: InlineData {
                        mime_type,
                        data: STANDARD.encode(data),
                    },
                },
            ],
        }],
    }
}

/// Text of the first candidate, its text parts joined.
fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() { None } else { Some(text) }
}

#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_key: String,
    endpoint: Url,
}

impl GeminiClient {
    pub fn new(api_key: String, model: &str, api_base: &str) -> Result<Self, GenerationError> {
        // A base without a trailing slash would lose its last path segment on join.
        let base = Url::parse(&format!("{}/", api_base.trim_end_matches('/')))?;
        let endpoint = base.join(&format!("v1beta/models/{}:generateContent", model))?;
        Ok(Self {
            http_client: HttpClient::new(),
            api_key,
            endpoint,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub async fn generate_text(
        &self,
        prompt: &str,
        mime_type: &str,
        data: &[u8],
    ) -> Result<String, GenerationError> {
        let body = build_request(prompt, mime_type, data);

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await?;
            log::error!("Gemini request failed with {}: {}", status, body);
            return Err(GenerationError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let parsed = response.json::<GenerateContentResponse>().await?;
        extract_text(parsed).ok_or(GenerationError::EmptyResponse)
    }
}

impl TextGenerator<Bytes> for GeminiClient {
    type Error = GenerationError;

    async fn generate(&self, prompt: &str, file: &FileRecord<Bytes>) -> Result<String, GenerationError> {
        log::info!(
            "Sending {} ({} bytes, {}) to Gemini",
            file.name,
            file.size_bytes,
            file.mime_type
        );
        self.generate_text(prompt, &file.mime_type, &file.payload).await
    }
}
