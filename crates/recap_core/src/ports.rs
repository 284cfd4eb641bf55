//! crates/recap_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use std::path::Path;
use uuid::Uuid;

use crate::domain::{
    EmailLog, ExportFormat, NewEmailLog, NewSummary, OutgoingEmail, Summary, SummaryChanges,
    Theme, Tone, UploadKind, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Users ---
    /// Fails with `PortError::Conflict` when the email is already registered.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> PortResult<User>;

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn get_user_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn update_user_theme(&self, user_id: Uuid, theme: Theme) -> PortResult<()>;

    // --- Summaries ---
    async fn create_summary(&self, summary: NewSummary) -> PortResult<Summary>;

    async fn get_summary(&self, summary_id: Uuid) -> PortResult<Summary>;

    /// Most recently updated first.
    async fn list_summaries_for_user(&self, user_id: Uuid) -> PortResult<Vec<Summary>>;

    /// Applies the changes, refreshes `updated_at`, and returns the stored row.
    async fn update_summary(&self, summary_id: Uuid, changes: SummaryChanges)
        -> PortResult<Summary>;

    /// Removes the summary together with all of its email logs.
    async fn delete_summary(&self, summary_id: Uuid) -> PortResult<()>;

    // --- Email logs ---
    async fn create_email_log(&self, log: NewEmailLog) -> PortResult<EmailLog>;

    /// Most recent first.
    async fn list_email_logs_for_summary(&self, summary_id: Uuid) -> PortResult<Vec<EmailLog>>;
}

/// Password hashing and bearer token handling.
pub trait CredentialService: Send + Sync {
    fn hash_password(&self, password: &str) -> PortResult<String>;

    fn verify_password(&self, password: &str, password_hash: &str) -> PortResult<bool>;

    fn issue_token(&self, user_id: Uuid) -> PortResult<String>;

    /// Returns the user id carried by a valid token, `PortError::Unauthorized` otherwise.
    fn verify_token(&self, token: &str) -> PortResult<Uuid>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Reads the file at `path` and returns its plain text.
    async fn extract_text(&self, path: &Path, kind: UploadKind) -> PortResult<String>;
}

#[async_trait]
pub trait SummaryGenerationService: Send + Sync {
    /// Produces a formatted meeting summary following the user's instructions.
    async fn generate_summary(&self, transcript: &str, prompt: &str, tone: Tone)
        -> PortResult<String>;
}

#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    /// Lays the summary out as a downloadable document.
    async fn render(&self, summary: &Summary, format: ExportFormat) -> PortResult<Vec<u8>>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_email(&self, email: OutgoingEmail) -> PortResult<()>;
}
