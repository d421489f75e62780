//! HTTP API server implementation

use axum::{
    extract::{DefaultBodyLimit, Json, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::core::client::{HfInferenceClient, InferenceBackend};
use crate::core::config::ServiceConfig;
use crate::core::detection::LanguageDetector;
use crate::core::errors::ServiceError;
use crate::core::model_selector::AUTO_SOURCE;
use crate::core::models::{SupportedLanguagesResponse, TranslationResult};
use crate::core::pipeline::{PipelineSettings, TranslationService};
use crate::core::summarizer::Summarizer;
use crate::processors::document::{extract_text, DocumentKind};

/// Characters of an uploaded document used for language detection
const DETECTION_SAMPLE_CHARS: usize = 1000;

/// Application state
pub struct AppState {
    config: Arc<ServiceConfig>,
    translation: TranslationService,
    detector: LanguageDetector,
    summarizer: Summarizer,
}

impl AppState {
    /// Wire every service to one inference backend
    pub fn new(config: Arc<ServiceConfig>, backend: Arc<dyn InferenceBackend>) -> Self {
        let translation =
            TranslationService::with_defaults(backend.clone(), PipelineSettings::from(config.as_ref()));
        let detector = LanguageDetector::remote(
            backend.clone(),
            config.detection_model.clone(),
            config.detection_max_chars,
        );
        let summarizer = Summarizer::from_config(backend, &config);

        Self {
            config,
            translation,
            detector,
            summarizer,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    success: bool,
    message: String,
    timestamp: String,
    version: String,
}

/// Text translation request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TextTranslationRequest {
    pub text: Option<String>,
    pub target_language: Option<String>,
    pub source_language: Option<String>,
}

/// Text language detection request
#[derive(Debug, Deserialize, ToSchema)]
pub struct DetectRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetectResponse {
    pub language: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SummaryResponse {
    pub summary: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguagesResponse {
    pub success: bool,
    pub message: String,
    pub data: SupportedLanguagesResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TranslationResponse {
    pub success: bool,
    pub message: String,
    pub data: TranslationResult,
}

/// Full file translation details
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileTranslationData {
    pub file_name: String,
    pub file_size: usize,
    pub file_type: String,
    pub original_text_length: usize,
    pub translated_text_length: usize,
    pub source_language: String,
    pub target_language: String,
    pub target_language_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chunks_processed: Option<usize>,
    pub original_text: String,
    pub translated_text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FileTranslationResponse {
    pub success: bool,
    pub message: String,
    pub data: FileTranslationData,
}

/// Light file translation: translated text only
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LightFileTranslationData {
    pub file_name: String,
    pub target_language: String,
    pub target_language_name: String,
    pub translated_text: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LightFileTranslationResponse {
    pub success: bool,
    pub message: String,
    pub data: LightFileTranslationData,
}

/// Error response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partial_result: Option<String>,
}

/// Error with the status code it is served under
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>, error: Option<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                success: false,
                message: message.into(),
                error,
                partial_result: None,
            },
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, None)
    }

    /// Failed translation, keeping any partial output
    fn translation_failed(message: &str, result: TranslationResult) -> Self {
        let mut err = Self::new(StatusCode::BAD_REQUEST, message, result.error);
        err.body.partial_result = result.partial_result;
        err
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            e if e.is_validation() => StatusCode::BAD_REQUEST,
            ServiceError::ApiError { .. }
            | ServiceError::RateLimitError { .. }
            | ServiceError::NetworkError { .. }
            | ServiceError::InvalidResponseError { .. }
            | ServiceError::TimeoutError => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = if status == StatusCode::BAD_REQUEST {
            err.to_string()
        } else {
            "Internal server error".to_string()
        };

        Self::new(status, message, Some(err.to_string()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// One uploaded file
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Parsed multipart form: the `file` part plus text fields
#[derive(Default)]
struct UploadForm {
    file: Option<UploadedFile>,
    fields: HashMap<String, String>,
}

impl UploadForm {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

async fn read_upload(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::new(e.status(), "Invalid upload", Some(e.body_text())))?;

        let Some(field) = field else {
            break;
        };

        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::new(e.status(), "Invalid upload", Some(e.body_text())))?;

            form.file = Some(UploadedFile {
                file_name,
                content_type,
                bytes: bytes.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::new(e.status(), "Invalid upload", Some(e.body_text())))?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Detect the document type and extract its text off the async runtime
async fn extract_upload(file: UploadedFile) -> Result<(DocumentKind, String), ApiError> {
    let kind = DocumentKind::detect(&file.file_name, file.content_type.as_deref())?;
    let bytes = file.bytes;

    let text = tokio::task::spawn_blocking(move || extract_text(&bytes, kind))
        .await
        .map_err(|e| {
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error",
                Some(e.to_string()),
            )
        })??;

    if text.trim().is_empty() {
        return Err(ApiError::bad_request(
            "Could not extract text from the file or the file is empty",
        ));
    }

    Ok((kind, text))
}

/// Target and source language from a form, with the target checked up front
fn form_languages(state: &AppState, form: &UploadForm) -> Result<(String, String), ApiError> {
    let target = form
        .field("targetLanguage")
        .ok_or_else(|| ApiError::bad_request("Target language is required"))?;

    if !state.translation.languages().contains(target) {
        return Err(ServiceError::UnsupportedLanguage {
            code: target.to_string(),
        }
        .into());
    }

    let source = form.field("sourceLanguage").unwrap_or(AUTO_SOURCE);
    Ok((target.to_string(), source.to_string()))
}

/// Health check handler
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is running", body = HealthResponse))
)]
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Server is running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Supported languages handler
#[utoipa::path(
    get,
    path = "/api/v1/translation/languages",
    responses((status = 200, description = "Supported target languages", body = LanguagesResponse))
)]
async fn get_languages(State(state): State<Arc<AppState>>) -> Json<LanguagesResponse> {
    Json(LanguagesResponse {
        success: true,
        message: "Languages retrieved".to_string(),
        data: state.translation.get_supported_languages(),
    })
}

/// Text translation handler
#[utoipa::path(
    post,
    path = "/api/v1/translation/text",
    request_body = TextTranslationRequest,
    responses(
        (status = 200, description = "Text translated", body = TranslationResponse),
        (status = 400, description = "Invalid request or failed translation (with partialResult)", body = ErrorResponse)
    )
)]
async fn translate_text(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TextTranslationRequest>,
) -> Result<Json<TranslationResponse>, ApiError> {
    let text = payload.text.unwrap_or_default();
    let target = payload.target_language.unwrap_or_default();

    if text.trim().is_empty() || target.trim().is_empty() {
        return Err(ApiError::bad_request("Text and target language are required"));
    }

    if !state.translation.languages().contains(&target) {
        return Err(ServiceError::UnsupportedLanguage { code: target }.into());
    }

    let source = payload
        .source_language
        .unwrap_or_else(|| AUTO_SOURCE.to_string());

    let result = state
        .translation
        .translate_long_text(&text, &target, &source)
        .await;

    if !result.success {
        warn!("Text translation failed: {:?}", result.error);
        return Err(ApiError::translation_failed("Translation failed", result));
    }

    Ok(Json(TranslationResponse {
        success: true,
        message: "Text translated".to_string(),
        data: result,
    }))
}

/// File translation handler: chunked translation with full details
async fn translate_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<FileTranslationResponse>, ApiError> {
    let mut form = read_upload(multipart).await?;
    let file = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("No file provided. Supported types: .pdf, .txt"))?;
    let (target, source) = form_languages(&state, &form)?;

    let file_name = file.file_name.clone();
    let file_size = file.bytes.len();
    let (kind, text) = extract_upload(file).await?;

    info!("Translating file {} ({} bytes) to {}", file_name, file_size, target);
    let result = state
        .translation
        .translate_long_text(&text, &target, &source)
        .await;

    if !result.success {
        return Err(ApiError::translation_failed("File translation failed", result));
    }

    let translated_text = result.translated_text.unwrap_or_default();
    Ok(Json(FileTranslationResponse {
        success: true,
        message: "File translated".to_string(),
        data: FileTranslationData {
            file_name,
            file_size,
            file_type: kind.extension().to_string(),
            original_text_length: text.chars().count(),
            translated_text_length: translated_text.chars().count(),
            source_language: source,
            target_language_name: state
                .translation
                .languages()
                .name(&target)
                .unwrap_or_default()
                .to_string(),
            target_language: target,
            chunks_processed: result.chunks_processed,
            original_text: text,
            translated_text,
        },
    }))
}

/// Light file translation handler: one remote call, translated text only
async fn translate_file_light(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<LightFileTranslationResponse>, ApiError> {
    let mut form = read_upload(multipart).await?;
    let file = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let (target, source) = form_languages(&state, &form)?;

    let file_name = file.file_name.clone();
    let (_, text) = extract_upload(file).await?;

    let result = state.translation.translate_text(&text, &target, &source).await;
    if !result.success {
        return Err(ApiError::translation_failed("Translation failed", result));
    }

    Ok(Json(LightFileTranslationResponse {
        success: true,
        message: "File translated".to_string(),
        data: LightFileTranslationData {
            file_name,
            target_language_name: state
                .translation
                .languages()
                .name(&target)
                .unwrap_or_default()
                .to_string(),
            target_language: target,
            translated_text: result.translated_text.unwrap_or_default(),
        },
    }))
}

/// Language detection for an uploaded document
async fn detect_language_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<DetectResponse>, ApiError> {
    let mut form = read_upload(multipart).await?;
    let file = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("No file uploaded"))?;
    let (_, text) = extract_upload(file).await?;

    let sample: String = text.chars().take(DETECTION_SAMPLE_CHARS).collect();
    let language = state.detector.detect_language(&sample).await;

    Ok(Json(DetectResponse { language }))
}

/// Language detection for raw text
#[utoipa::path(
    post,
    path = "/api/v1/language/detect",
    request_body = DetectRequest,
    responses((status = 200, description = "Detected language code", body = DetectResponse))
)]
async fn detect_language_text(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<DetectRequest>,
) -> Json<DetectResponse> {
    let text = payload.text.unwrap_or_default();
    let language = state.detector.detect_language(&text).await;
    Json(DetectResponse { language })
}

/// Summarize an uploaded document
async fn summarize_file(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<SummaryResponse>, ApiError> {
    let mut form = read_upload(multipart).await?;
    let file = form
        .file
        .take()
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;
    let (_, text) = extract_upload(file).await?;

    let summary = state.summarizer.summarize_document(&text).await?;
    Ok(Json(SummaryResponse { summary }))
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "Route not found", None)
}

/// OpenAPI document for the JSON endpoints
#[derive(OpenApi)]
#[openapi(
    paths(health_check, get_languages, translate_text, detect_language_text),
    components(schemas(
        HealthResponse,
        LanguagesResponse,
        TextTranslationRequest,
        TranslationResponse,
        TranslationResult,
        SupportedLanguagesResponse,
        DetectRequest,
        DetectResponse,
        SummaryResponse,
        FileTranslationData,
        FileTranslationResponse,
        LightFileTranslationData,
        LightFileTranslationResponse,
        ErrorResponse
    ))
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .route("/api/v1/translation/languages", get(get_languages))
        .route("/api/v1/translation/text", post(translate_text))
        .route("/api/v1/translation/file", post(translate_file))
        .route("/api/v1/translation/file/light", post(translate_file_light))
        .route("/api/v1/language/detect-language", post(detect_language_file))
        .route("/api/v1/language/detect", post(detect_language_text))
        .route("/api/v1/summarize", post(summarize_file))
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(host: String, port: u16) -> anyhow::Result<()> {
    let config = Arc::new(ServiceConfig::load()?);
    let backend: Arc<dyn InferenceBackend> = Arc::new(HfInferenceClient::new(config.clone())?);

    let state = Arc::new(AppState::new(config, backend));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::mock::{MockBackend, MockBehavior};
    use assert_json_diff::assert_json_include;
    use serde_json::json;

    fn state(backend: MockBackend) -> Arc<AppState> {
        let config = ServiceConfig {
            api_key: "test_key".to_string(),
            max_chunk_length: 20,
            chunk_delay_ms: 0,
            ..Default::default()
        };
        Arc::new(AppState::new(Arc::new(config), Arc::new(backend)))
    }

    fn text_request(text: &str, target: &str) -> TextTranslationRequest {
        TextTranslationRequest {
            text: Some(text.to_string()),
            target_language: Some(target.to_string()),
            source_language: Some("en".to_string()),
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let Json(health) = health_check().await;
        assert_json_include!(
            actual: serde_json::to_value(&health).unwrap(),
            expected: json!({ "success": true, "version": env!("CARGO_PKG_VERSION") })
        );
    }

    #[tokio::test]
    async fn test_languages_listing() {
        let Json(response) = get_languages(State(state(MockBackend::echo()))).await;
        assert_json_include!(
            actual: serde_json::to_value(&response).unwrap(),
            expected: json!({ "success": true, "data": { "totalLanguages": 20 } })
        );
    }

    #[tokio::test]
    async fn test_translate_text_handler() {
        let Json(response) = translate_text(
            State(state(MockBackend::echo())),
            Json(text_request("Hello there. How are you?", "es")),
        )
        .await
        .unwrap();

        assert_eq!(
            response.data.translated_text.as_deref(),
            Some("<Hello there.> <How are you?>")
        );
        assert_eq!(response.data.chunks_processed, Some(2));
    }

    #[tokio::test]
    async fn test_translate_text_missing_fields() {
        let err = translate_text(
            State(state(MockBackend::echo())),
            Json(TextTranslationRequest {
                text: None,
                target_language: Some("es".to_string()),
                source_language: None,
            }),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_translate_text_unsupported_language() {
        let err = translate_text(
            State(state(MockBackend::echo())),
            Json(text_request("hello", "xx")),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.message, "Target language 'xx' not supported");
    }

    #[tokio::test]
    async fn test_translate_text_partial_failure() {
        let err = translate_text(
            State(state(MockBackend::new(MockBehavior::FailOnCall(2)))),
            Json(text_request("Hello there. How are you?", "es")),
        )
        .await
        .unwrap_err();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_json_include!(
            actual: serde_json::to_value(&err.body).unwrap(),
            expected: json!({ "success": false, "partialResult": "<Hello there.>" })
        );
    }

    #[tokio::test]
    async fn test_detect_text_falls_back_on_upstream_error() {
        let Json(response) = detect_language_text(
            State(state(MockBackend::failing())),
            Json(DetectRequest {
                text: Some("Hola, ¿cómo estás?".to_string()),
            }),
        )
        .await;

        assert_eq!(response.language, "es");
    }

    #[test]
    fn test_translation_failed_keeps_partial_output() {
        let result = TranslationResult::partial("Error processing chunk 3: boom", "uno dos".to_string());
        let err = ApiError::translation_failed("File translation failed", result);

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.partial_result.as_deref(), Some("uno dos"));
        assert_eq!(err.body.error.as_deref(), Some("Error processing chunk 3: boom"));
    }

    #[test]
    fn test_service_error_status_mapping() {
        let err: ApiError = ServiceError::TimeoutError.into();
        assert_eq!(err.status, StatusCode::BAD_GATEWAY);

        let err: ApiError = ServiceError::validation("bad").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err: ApiError = ServiceError::InternalError("boom".to_string()).into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_openapi_lists_json_routes() {
        let doc = serde_json::to_value(ApiDoc::openapi()).unwrap();
        assert!(doc["paths"]["/api/v1/translation/text"].is_object());
        assert!(doc["paths"]["/health"].is_object());
    }
}
