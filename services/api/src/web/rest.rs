//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the summary endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, Utc};
use recap_core::{
    EmailFormat, EmailLog, ExportFormat, ShareRequest, Summary, SummaryDraft, SummaryPatch,
    SummaryStatus,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};
use uuid::Uuid;

use crate::error::HttpError;
use crate::web::auth::{
    self, AuthResponse, LoginRequest, MeResponse, RegisterRequest, SuccessResponse, ThemeRequest,
    UserResponse,
};
use crate::web::extract::{JsonBody, PathParams};
use crate::web::state::{AppState, CurrentUser};
use crate::web::upload::{self, UploadResponse};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register_handler,
        auth::login_handler,
        auth::me_handler,
        auth::theme_handler,
        upload::upload_handler,
        create_summary_handler,
        list_summaries_handler,
        get_summary_handler,
        update_summary_handler,
        delete_summary_handler,
        generate_summary_handler,
        approve_summary_handler,
        export_summary_handler,
        email_summary_handler,
        list_email_logs_handler,
    ),
    components(
        schemas(
            RegisterRequest, LoginRequest, ThemeRequest, UserResponse, AuthResponse,
            MeResponse, SuccessResponse, UploadResponse, CreateSummaryRequest,
            UpdateSummaryRequest, EmailRequest, SummaryResponse, EmailLogResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Meeting Recap API", description = "Turn meeting transcripts into shareable summaries.")
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSummaryRequest {
    #[serde(default)]
    pub title: Option<String>,
    pub original_content: String,
    pub prompt: String,
    /// Free-form; unknown tones are stored as given and summarized professionally.
    #[serde(default)]
    pub tone: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummaryRequest {
    pub summary_content: Option<String>,
    /// `draft`, `approved` or `sent`.
    pub status: Option<String>,
    pub auto_saved: Option<bool>,
    /// Accepted for compatibility. The server recounts from `summaryContent`.
    pub word_count: Option<i64>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailRequest {
    pub recipients: Vec<String>,
    #[serde(default)]
    pub subject: String,
    /// `html`, `pdf` or `both`.
    #[serde(default = "default_email_format")]
    pub format: String,
    #[serde(default)]
    pub cc_self: Option<bool>,
}

fn default_email_format() -> String {
    EmailFormat::Html.as_str().to_string()
}

/// A meeting summary as returned to its owner.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub original_content: String,
    pub prompt: String,
    pub tone: String,
    pub summary_content: String,
    pub word_count: usize,
    pub status: String,
    pub auto_saved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Summary> for SummaryResponse {
    fn from(s: Summary) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            title: s.title,
            original_content: s.original_content,
            prompt: s.prompt,
            tone: s.tone,
            summary_content: s.summary_content,
            word_count: s.word_count,
            status: s.status.as_str().to_string(),
            auto_saved: s.auto_saved,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailLogResponse {
    pub id: Uuid,
    pub summary_id: Uuid,
    pub recipients: Vec<String>,
    pub subject: String,
    pub format: String,
    pub status: String,
    pub sent_at: DateTime<Utc>,
}

impl From<EmailLog> for EmailLogResponse {
    fn from(log: EmailLog) -> Self {
        Self {
            id: log.id,
            summary_id: log.summary_id,
            recipients: log.recipients,
            subject: log.subject,
            format: log.format.as_str().to_string(),
            status: log.status.as_str().to_string(),
            sent_at: log.sent_at,
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Create a draft summary from a transcript.
#[utoipa::path(
    post,
    path = "/api/summaries",
    request_body = CreateSummaryRequest,
    responses(
        (status = 201, description = "Draft created", body = SummaryResponse),
        (status = 400, description = "Transcript or prompt missing"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    JsonBody(req): JsonBody<CreateSummaryRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let draft = SummaryDraft {
        title: req.title.unwrap_or_default(),
        original_content: req.original_content,
        prompt: req.prompt,
        tone: req.tone.unwrap_or_else(|| "professional".to_string()),
    };
    let summary = state.summaries.create(user_id, draft).await?;
    Ok((StatusCode::CREATED, Json(SummaryResponse::from(summary))))
}

/// List the caller's summaries, most recently updated first.
#[utoipa::path(
    get,
    path = "/api/summaries",
    responses(
        (status = 200, description = "The caller's summaries", body = [SummaryResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_summaries_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
) -> Result<Json<Vec<SummaryResponse>>, HttpError> {
    let summaries = state.summaries.list_for_user(user_id).await?;
    Ok(Json(summaries.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/summaries/{id}",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 200, description = "The summary", body = SummaryResponse),
        (status = 404, description = "Summary not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<SummaryResponse>, HttpError> {
    let summary = state.summaries.get(id, user_id).await?;
    Ok(Json(summary.into()))
}

/// Edit or autosave a summary.
#[utoipa::path(
    patch,
    path = "/api/summaries/{id}",
    params(("id" = Uuid, Path, description = "Summary id")),
    request_body = UpdateSummaryRequest,
    responses(
        (status = 200, description = "Updated summary", body = SummaryResponse),
        (status = 400, description = "Unknown status"),
        (status = 404, description = "Summary not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(req): JsonBody<UpdateSummaryRequest>,
) -> Result<Json<SummaryResponse>, HttpError> {
    let status = req
        .status
        .as_deref()
        .map(str::parse::<SummaryStatus>)
        .transpose()
        .map_err(|e| HttpError::BadRequest(e.to_string()))?;
    let patch = SummaryPatch {
        summary_content: req.summary_content,
        status,
        auto_saved: req.auto_saved,
    };
    let summary = state.summaries.update(id, user_id, patch).await?;
    Ok(Json(summary.into()))
}

/// Delete a summary together with its email history.
#[utoipa::path(
    delete,
    path = "/api/summaries/{id}",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 204, description = "Summary deleted"),
        (status = 404, description = "Summary not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams(id): PathParams<Uuid>,
) -> Result<StatusCode, HttpError> {
    state.summaries.delete(id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Run the transcript through the model and store the result.
#[utoipa::path(
    post,
    path = "/api/summaries/{id}/generate",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 200, description = "Summary generated", body = SummaryResponse),
        (status = 404, description = "Summary not found"),
        (status = 500, description = "Generation failed; the summary is unchanged")
    ),
    security(("bearer_auth" = []))
)]
pub async fn generate_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<SummaryResponse>, HttpError> {
    let summary = state.summaries.generate(id, user_id).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    post,
    path = "/api/summaries/{id}/approve",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 200, description = "Summary approved", body = SummaryResponse),
        (status = 404, description = "Summary not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn approve_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<SummaryResponse>, HttpError> {
    let summary = state.summaries.approve(id, user_id).await?;
    Ok(Json(summary.into()))
}

/// Download the summary as a PDF or DOCX file.
#[utoipa::path(
    get,
    path = "/api/summaries/{id}/export/{format}",
    params(
        ("id" = Uuid, Path, description = "Summary id"),
        ("format" = String, Path, description = "`pdf` or `docx`")
    ),
    responses(
        (status = 200, description = "The exported document", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 400, description = "Unsupported format"),
        (status = 404, description = "Summary not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams((id, format)): PathParams<(Uuid, String)>,
) -> Result<impl IntoResponse, HttpError> {
    let format = format
        .parse::<ExportFormat>()
        .map_err(|e| HttpError::BadRequest(e.to_string()))?;
    let document = state.summaries.export(id, user_id, format).await?;
    let disposition = format!("attachment; filename=\"{}\"", document.filename);
    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        document.bytes,
    ))
}

/// Email the summary to one or more recipients.
#[utoipa::path(
    post,
    path = "/api/summaries/{id}/email",
    params(("id" = Uuid, Path, description = "Summary id")),
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Email sent", body = SuccessResponse),
        (status = 400, description = "Missing or malformed recipients"),
        (status = 404, description = "Summary not found"),
        (status = 500, description = "Delivery failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn email_summary_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams(id): PathParams<Uuid>,
    JsonBody(req): JsonBody<EmailRequest>,
) -> Result<Json<SuccessResponse>, HttpError> {
    let format = req
        .format
        .parse::<EmailFormat>()
        .map_err(|e| HttpError::BadRequest(e.to_string()))?;
    let request = ShareRequest {
        recipients: req.recipients,
        subject: req.subject,
        format,
        cc_self: req.cc_self.unwrap_or(false),
    };
    state.summaries.share(id, user_id, request).await?;
    Ok(Json(SuccessResponse { success: true }))
}

/// Delivery history for a summary, newest first.
#[utoipa::path(
    get,
    path = "/api/summaries/{id}/emails",
    params(("id" = Uuid, Path, description = "Summary id")),
    responses(
        (status = 200, description = "Email log entries", body = [EmailLogResponse]),
        (status = 404, description = "Summary not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_email_logs_handler(
    State(state): State<Arc<AppState>>,
    Extension(CurrentUser(user_id)): Extension<CurrentUser>,
    PathParams(id): PathParams<Uuid>,
) -> Result<Json<Vec<EmailLogResponse>>, HttpError> {
    let logs = state.summaries.email_history(id, user_id).await?;
    Ok(Json(logs.into_iter().map(Into::into).collect()))
}
