use actix_files::Files;
use actix_multipart::{Field, Multipart};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError, web};
use bytes::Bytes;
use futures::TryStreamExt;
use log::{error, info, warn};
use serde_json::json;
use shared::admission::{self, AdmissionError, RejectionReason};
use shared::{ErrorResponse, FILE_FIELD, FileConstraint, FileRecord, GENERATE_PATH, GenerateResponse, PROMPT_FIELD, TextGenerator};
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Missing form field: {0}")]
    MissingField(&'static str),
    #[error("Invalid upload: {0}")]
    Multipart(String),
    #[error("Prompt is larger than {limit} bytes")]
    PromptTooLarge { limit: usize },
    #[error("{0}")]
    Admission(#[from] AdmissionError),
    #[error("{0}")]
    Generation(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::PromptTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Admission(AdmissionError::Rejected(rejections)) => {
                let too_large = rejections
                    .iter()
                    .any(|r| matches!(r.reason, RejectionReason::TooLarge { .. }));
                if too_large {
                    StatusCode::PAYLOAD_TOO_LARGE
                } else {
                    StatusCode::UNSUPPORTED_MEDIA_TYPE
                }
            }
            ApiError::Admission(AdmissionError::TooManyFiles { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Generation(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}

/// Largest prompt, in bytes, the generate route will buffer.
#[derive(Debug, Clone, Copy)]
pub struct PromptLimit(pub usize);

pub fn configure_routes<G>(
    cfg: &mut web::ServiceConfig,
    frontend_dir: Option<String>,
    prompt_limit: PromptLimit,
) where
    G: TextGenerator<Bytes> + 'static,
{
    cfg.app_data(web::Data::new(prompt_limit));
    cfg.service(web::resource(GENERATE_PATH).route(web::post().to(handle_generate::<G>)))
        .service(web::resource("/api/health").route(web::get().to(health)));

    if let Some(dir) = frontend_dir {
        cfg.service(Files::new("/", dir).index_file("index.html"));
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

struct UploadedFile {
    name: String,
    mime_type: String,
    size: u64,
    data: Vec<u8>,
}

/// Reads a text field, giving up as soon as it grows past `limit` bytes.
async fn read_text(field: &mut Field, limit: usize) -> Result<String, ApiError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|e| ApiError::Multipart(e.to_string()))? {
        if data.len() + chunk.len() > limit {
            return Err(ApiError::PromptTooLarge { limit });
        }
        data.extend_from_slice(&chunk);
    }
    String::from_utf8(data).map_err(|_| ApiError::Multipart("prompt is not valid UTF-8".into()))
}

/// Reads the file field, keeping at most `limit` bytes but counting all of them.
async fn read_file(field: &mut Field, limit: u64) -> Result<UploadedFile, ApiError> {
    let name = field
        .content_disposition()
        .and_then(|cd| cd.get_filename())
        .unwrap_or("upload")
        .to_string();
    let mime_type = field
        .content_type()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default();

    let mut size = 0u64;
    let mut data = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(|e| ApiError::Multipart(e.to_string()))? {
        size += chunk.len() as u64;
        if size <= limit {
            data.extend_from_slice(&chunk);
        }
    }

    Ok(UploadedFile {
        name,
        mime_type,
        size,
        data,
    })
}

async fn handle_generate<G>(
    generator: web::Data<G>,
    constraint: web::Data<FileConstraint>,
    prompt_limit: web::Data<PromptLimit>,
    mut payload: Multipart,
) -> Result<HttpResponse, ApiError>
where
    G: TextGenerator<Bytes> + 'static,
{
    let request_id = Uuid::new_v4();
    let mut prompt = None;
    let mut upload = None;

    while let Some(mut field) = payload.try_next().await.map_err(|e| ApiError::Multipart(e.to_string()))? {
        let field_name = field.name().map(str::to_owned);
        match field_name.as_deref() {
            Some(PROMPT_FIELD) => {
                prompt = Some(read_text(&mut field, prompt_limit.0).await.inspect_err(|e| {
                    warn!("[{}] {}", request_id, e);
                })?)
            }
            Some(FILE_FIELD) if upload.is_none() => {
                upload = Some(read_file(&mut field, constraint.max_size).await?)
            }
            other => {
                warn!("[{}] Ignoring form field {:?}", request_id, other);
                while field.try_next().await.map_err(|e| ApiError::Multipart(e.to_string()))?.is_some() {}
            }
        }
    }

    let prompt = prompt.ok_or(ApiError::MissingField(PROMPT_FIELD))?;
    let upload = upload.ok_or(ApiError::MissingField(FILE_FIELD))?;
    let candidate = FileRecord::new(upload.name, upload.size, upload.mime_type, Bytes::from(upload.data));

    let mut admitted = admission::admit_drop(vec![candidate], 0, &constraint).map_err(|e| {
        warn!("[{}] Upload rejected: {}", request_id, e);
        ApiError::from(e)
    })?;
    let file = admitted.pop().ok_or(ApiError::MissingField(FILE_FIELD))?;

    info!(
        "[{}] Generating for {} ({} bytes) with a {} character prompt",
        request_id,
        file.name,
        file.size_bytes,
        prompt.chars().count()
    );

    match generator.generate(&prompt, &file).await {
        Ok(text) => Ok(HttpResponse::Ok().json(GenerateResponse { text })),
        Err(e) => {
            error!("[{}] Generation failed: {}", request_id, e);
            Err(ApiError::Generation(e.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::{App, test};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const BOUNDARY: &str = "----uploadboundary";
    const PROMPT_LIMIT: usize = 1024;

    #[derive(Default)]
    struct Stub {
        calls: AtomicUsize,
        fail: bool,
    }

    impl TextGenerator<Bytes> for Stub {
        type Error = String;

        async fn generate(&self, prompt: &str, file: &FileRecord<Bytes>) -> Result<String, String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err("upstream unavailable".to_string());
            }
            Ok(format!("{} -> {} ({}, {} bytes)", prompt, file.name, file.mime_type, file.payload.len()))
        }
    }

    fn multipart(prompt: Option<&str>, file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
        let mut body = Vec::new();
        if let Some(prompt) = prompt {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"prompt\"\r\n\r\n{prompt}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((name, mime, data)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post(
        stub: web::Data<Stub>,
        constraint: FileConstraint,
        body: Vec<u8>,
    ) -> actix_web::dev::ServiceResponse {
        post_with_prompt_limit(stub, constraint, PROMPT_LIMIT, body).await
    }

    async fn post_with_prompt_limit(
        stub: web::Data<Stub>,
        constraint: FileConstraint,
        prompt_limit: usize,
        body: Vec<u8>,
    ) -> actix_web::dev::ServiceResponse {
        let app = test::init_service(
            App::new()
                .app_data(stub)
                .app_data(web::Data::new(constraint))
                .configure(|cfg| configure_routes::<Stub>(cfg, None, PromptLimit(prompt_limit))),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(GENERATE_PATH)
            .insert_header((
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            ))
            .set_payload(body)
            .to_request();
        test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn generates_text_for_prompt_and_file() {
        let stub = web::Data::new(Stub::default());
        let body = multipart(Some("Describe this image"), Some(("cat.png", "image/png", &b"pngdata"[..])));

        let resp = post(stub.clone(), FileConstraint::documents(), body).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: GenerateResponse = test::read_body_json(resp).await;
        assert_eq!(body.text, "Describe this image -> cat.png (image/png, 7 bytes)");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn oversize_upload_is_rejected_before_generation() {
        let stub = web::Data::new(Stub::default());
        let constraint = FileConstraint::documents().with_max_size(4);
        let body = multipart(Some("hi"), Some(("cat.png", "image/png", &b"0123456789"[..])));

        let resp = post(stub.clone(), constraint, body).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "cat.png is too large. Max size is 4 Bytes.");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn unsupported_type_is_rejected() {
        let stub = web::Data::new(Stub::default());
        let body = multipart(Some("hi"), Some(("tool.exe", "application/x-msdownload", &b"MZ"[..])));

        let resp = post(stub.clone(), FileConstraint::documents(), body).await;
        assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "tool.exe has an invalid file type.");
    }

    #[actix_web::test]
    async fn oversize_prompt_is_rejected_before_generation() {
        let stub = web::Data::new(Stub::default());
        let prompt = "x".repeat(4 * 1024 * 1024);
        let body = multipart(Some(&prompt), Some(("a.txt", "text/plain", &b"hi"[..])));

        let constraint = FileConstraint::documents().with_max_size(4);
        let resp = post_with_prompt_limit(stub.clone(), constraint, 64, body).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Prompt is larger than 64 bytes");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn prompt_at_the_limit_is_accepted() {
        let stub = web::Data::new(Stub::default());
        let prompt = "y".repeat(64);
        let body = multipart(Some(&prompt), Some(("a.txt", "text/plain", &b"hi"[..])));

        let resp = post_with_prompt_limit(stub.clone(), FileConstraint::documents(), 64, body).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn missing_file_is_a_bad_request() {
        let stub = web::Data::new(Stub::default());
        let resp = post(stub.clone(), FileConstraint::documents(), multipart(Some("hi"), None)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "Missing form field: file");
    }

    #[actix_web::test]
    async fn generator_failure_maps_to_bad_gateway() {
        let stub = web::Data::new(Stub {
            fail: true,
            ..Stub::default()
        });
        let body = multipart(Some("hi"), Some(("notes.txt", "text/plain", &b"hello"[..])));

        let resp = post(stub.clone(), FileConstraint::documents(), body).await;
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error, "upstream unavailable");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[actix_web::test]
    async fn health_reports_ok() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(Stub::default()))
                .configure(|cfg| configure_routes::<Stub>(cfg, None, PromptLimit(PROMPT_LIMIT))),
        )
        .await;
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }
}
