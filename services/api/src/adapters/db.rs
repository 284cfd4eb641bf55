//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use recap_core::domain::{
    EmailLog, NewEmailLog, NewSummary, Summary, SummaryChanges, Theme, User, UserCredentials,
};
use recap_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, full_name, theme, created_at";
const SUMMARY_COLUMNS: &str = "id, user_id, title, original_content, prompt, tone, \
     summary_content, word_count, status, auto_saved, created_at, updated_at";
const EMAIL_LOG_COLUMNS: &str = "id, summary_id, recipients, subject, format, status, sent_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found_or_unexpected(e: sqlx::Error, what: String) -> PortError {
    match e {
        sqlx::Error::RowNotFound => PortError::NotFound(what),
        _ => PortError::Unexpected(e.to_string()),
    }
}

fn corrupt(column: &str, e: impl std::fmt::Display) -> PortError {
    PortError::Unexpected(format!("Stored {} is invalid: {}", column, e))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    full_name: String,
    theme: String,
    created_at: DateTime<Utc>,
}
impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            email: self.email,
            full_name: self.full_name,
            theme: self.theme.parse::<Theme>().map_err(|e| corrupt("theme", e))?,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    #[sqlx(flatten)]
    user: UserRecord,
    password_hash: String,
}

#[derive(FromRow)]
struct SummaryRecord {
    id: Uuid,
    user_id: Uuid,
    title: String,
    original_content: String,
    prompt: String,
    tone: String,
    summary_content: String,
    word_count: i32,
    status: String,
    auto_saved: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}
impl SummaryRecord {
    fn to_domain(self) -> PortResult<Summary> {
        Ok(Summary {
            id: self.id,
            user_id: self.user_id,
            title: self.title,
            original_content: self.original_content,
            prompt: self.prompt,
            tone: self.tone,
            summary_content: self.summary_content,
            word_count: self.word_count.max(0) as usize,
            status: self.status.parse().map_err(|e| corrupt("status", e))?,
            auto_saved: self.auto_saved,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(FromRow)]
struct EmailLogRecord {
    id: Uuid,
    summary_id: Uuid,
    recipients: Vec<String>,
    subject: String,
    format: String,
    status: String,
    sent_at: DateTime<Utc>,
}
impl EmailLogRecord {
    fn to_domain(self) -> PortResult<EmailLog> {
        Ok(EmailLog {
            id: self.id,
            summary_id: self.summary_id,
            recipients: self.recipients,
            subject: self.subject,
            format: self.format.parse().map_err(|e| corrupt("format", e))?,
            status: self.status.parse().map_err(|e| corrupt("delivery status", e))?,
            sent_at: self.sent_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (email, password_hash, full_name) VALUES ($1, $2, $3) RETURNING {}",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                PortError::Conflict(format!("Email {} is already registered", email))
            }
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", user_id)))?;
        record.to_domain()
    }

    async fn get_user_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(&format!(
            "SELECT {}, password_hash FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("User {} not found", email)))?;
        Ok(UserCredentials {
            user: record.user.to_domain()?,
            password_hash: record.password_hash,
        })
    }

    async fn update_user_theme(&self, user_id: Uuid, theme: Theme) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET theme = $1 WHERE id = $2")
            .bind(theme.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn create_summary(&self, summary: NewSummary) -> PortResult<Summary> {
        let record = sqlx::query_as::<_, SummaryRecord>(&format!(
            "INSERT INTO summaries (user_id, title, original_content, prompt, tone) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            SUMMARY_COLUMNS
        ))
        .bind(summary.user_id)
        .bind(&summary.title)
        .bind(&summary.original_content)
        .bind(&summary.prompt)
        .bind(&summary.tone)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get_summary(&self, summary_id: Uuid) -> PortResult<Summary> {
        let record = sqlx::query_as::<_, SummaryRecord>(&format!(
            "SELECT {} FROM summaries WHERE id = $1",
            SUMMARY_COLUMNS
        ))
        .bind(summary_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Summary {} not found", summary_id)))?;
        record.to_domain()
    }

    async fn list_summaries_for_user(&self, user_id: Uuid) -> PortResult<Vec<Summary>> {
        let records = sqlx::query_as::<_, SummaryRecord>(&format!(
            "SELECT {} FROM summaries WHERE user_id = $1 ORDER BY updated_at DESC",
            SUMMARY_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_summary(
        &self,
        summary_id: Uuid,
        changes: SummaryChanges,
    ) -> PortResult<Summary> {
        // Last write wins: there is no version check on concurrent edits.
        let record = sqlx::query_as::<_, SummaryRecord>(&format!(
            "UPDATE summaries SET \
                summary_content = COALESCE($2, summary_content), \
                word_count = COALESCE($3, word_count), \
                status = COALESCE($4, status), \
                auto_saved = COALESCE($5, auto_saved), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {}",
            SUMMARY_COLUMNS
        ))
        .bind(summary_id)
        .bind(changes.summary_content)
        .bind(changes.word_count.map(|n| i32::try_from(n).unwrap_or(i32::MAX)))
        .bind(changes.status.map(|s| s.as_str()))
        .bind(changes.auto_saved)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| not_found_or_unexpected(e, format!("Summary {} not found", summary_id)))?;
        record.to_domain()
    }

    async fn delete_summary(&self, summary_id: Uuid) -> PortResult<()> {
        // email_logs rows go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM summaries WHERE id = $1")
            .bind(summary_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Summary {} not found", summary_id)));
        }
        Ok(())
    }

    async fn create_email_log(&self, log: NewEmailLog) -> PortResult<EmailLog> {
        let record = sqlx::query_as::<_, EmailLogRecord>(&format!(
            "INSERT INTO email_logs (summary_id, recipients, subject, format, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            EMAIL_LOG_COLUMNS
        ))
        .bind(log.summary_id)
        .bind(&log.recipients)
        .bind(&log.subject)
        .bind(log.format.as_str())
        .bind(log.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        record.to_domain()
    }

    async fn list_email_logs_for_summary(&self, summary_id: Uuid) -> PortResult<Vec<EmailLog>> {
        let records = sqlx::query_as::<_, EmailLogRecord>(&format!(
            "SELECT {} FROM email_logs WHERE summary_id = $1 ORDER BY sent_at DESC",
            EMAIL_LOG_COLUMNS
        ))
        .bind(summary_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        records.into_iter().map(|r| r.to_domain()).collect()
    }
}
