use gloo_file::File as GlooFile;
use gloo_net::http::Request;
use shared::{ErrorResponse, FILE_FIELD, FileRecord, GENERATE_PATH, GenerateResponse, PROMPT_FIELD, TextGenerator};
use wasm_bindgen::JsValue;
use web_sys::FormData;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Could not build request: {0}")]
    Request(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server error {status}: {message}")]
    Server { status: u16, message: String },
    #[error("Failed to parse response: {0}")]
    Decode(String),
}

fn js_error(value: JsValue) -> ApiError {
    ApiError::Request(format!("{:?}", value))
}

/// Posts the prompt and file to the backend, which forwards them to the model.
#[derive(Clone, PartialEq)]
pub struct ApiClient {
    endpoint: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self {
            endpoint: GENERATE_PATH.to_string(),
        }
    }
}

impl TextGenerator<GlooFile> for ApiClient {
    type Error = ApiError;

    async fn generate(&self, prompt: &str, file: &FileRecord<GlooFile>) -> Result<String, ApiError> {
        let form_data = FormData::new().map_err(js_error)?;
        form_data.append_with_str(PROMPT_FIELD, prompt).map_err(js_error)?;
        let blob: &gloo_file::Blob = &file.payload;
        form_data
            .append_with_blob_and_filename(FILE_FIELD, blob.as_ref(), &file.name)
            .map_err(js_error)?;

        let response = Request::post(&self.endpoint)
            .body(form_data)
            .map_err(|e| ApiError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            log::warn!("Generate request failed with {}: {}", status, message);
            return Err(ApiError::Server { status, message });
        }

        let generated = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(generated.text)
    }
}
