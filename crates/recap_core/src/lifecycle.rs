//! crates/recap_core/src/lifecycle.rs
//!
//! The summary lifecycle: draft creation, AI generation, autosave edits,
//! approval, export and email delivery.
//!
//! Every entry point that takes a summary id resolves it through
//! [`SummaryLifecycle::owned_summary`], which is the only place ownership is
//! checked. A summary that exists but belongs to another user is reported as
//! `NotFound`, exactly like one that does not exist.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    file_stem, word_count, DeliveryStatus, EmailAttachment, EmailFormat, EmailLog, ExportFormat,
    ExportedDocument, NewEmailLog, NewSummary, OutgoingEmail, Summary, SummaryChanges,
    SummaryStatus, Tone,
};
use crate::error::{ServiceError, ServiceResult};
use crate::markup;
use crate::ports::{
    DatabaseService, DocumentRenderer, NotificationService, PortError, SummaryGenerationService,
};
use crate::validate::{is_valid_email, non_blank};

/// Generated text shorter than this (in characters, after trimming) is treated
/// as a failed generation.
pub const MIN_SUMMARY_CHARS: usize = 50;

pub const DEFAULT_TITLE: &str = "Untitled meeting";

/// Input for [`SummaryLifecycle::create`].
#[derive(Debug, Clone)]
pub struct SummaryDraft {
    pub title: String,
    pub original_content: String,
    pub prompt: String,
    pub tone: String,
}

/// Client-editable fields. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default)]
pub struct SummaryPatch {
    pub summary_content: Option<String>,
    pub status: Option<SummaryStatus>,
    pub auto_saved: Option<bool>,
}

/// Input for [`SummaryLifecycle::share`].
#[derive(Debug, Clone)]
pub struct ShareRequest {
    pub recipients: Vec<String>,
    pub subject: String,
    pub format: EmailFormat,
    pub cc_self: bool,
}

pub struct SummaryLifecycle {
    db: Arc<dyn DatabaseService>,
    generator: Arc<dyn SummaryGenerationService>,
    renderer: Arc<dyn DocumentRenderer>,
    notifier: Arc<dyn NotificationService>,
}

impl SummaryLifecycle {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        generator: Arc<dyn SummaryGenerationService>,
        renderer: Arc<dyn DocumentRenderer>,
        notifier: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            db,
            generator,
            renderer,
            notifier,
        }
    }

    /// Loads a summary on behalf of `user_id`.
    async fn owned_summary(&self, summary_id: Uuid, user_id: Uuid) -> ServiceResult<Summary> {
        match self.db.get_summary(summary_id).await {
            Ok(summary) if summary.user_id == user_id => Ok(summary),
            Ok(_) => {
                warn!(%summary_id, %user_id, "summary access by non-owner");
                Err(ServiceError::NotFound)
            }
            Err(PortError::NotFound(_)) => Err(ServiceError::NotFound),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn create(&self, user_id: Uuid, draft: SummaryDraft) -> ServiceResult<Summary> {
        let original_content = non_blank(&draft.original_content)
            .ok_or_else(|| ServiceError::Validation("Transcript content is required".to_string()))?;
        let prompt = non_blank(&draft.prompt)
            .ok_or_else(|| ServiceError::Validation("Prompt is required".to_string()))?;
        let title = non_blank(&draft.title).unwrap_or(DEFAULT_TITLE);

        let summary = self
            .db
            .create_summary(NewSummary {
                user_id,
                title: title.to_string(),
                original_content: original_content.to_string(),
                prompt: prompt.to_string(),
                tone: draft.tone,
            })
            .await?;
        info!(summary_id = %summary.id, %user_id, "summary draft created");
        Ok(summary)
    }

    pub async fn get(&self, summary_id: Uuid, user_id: Uuid) -> ServiceResult<Summary> {
        self.owned_summary(summary_id, user_id).await
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> ServiceResult<Vec<Summary>> {
        Ok(self.db.list_summaries_for_user(user_id).await?)
    }

    /// Runs the transcript through the generator and stores the result.
    /// The status is left as it was, so this doubles as "regenerate".
    pub async fn generate(&self, summary_id: Uuid, user_id: Uuid) -> ServiceResult<Summary> {
        let summary = self.owned_summary(summary_id, user_id).await?;
        let tone = Tone::from_str_lossy(&summary.tone);

        let text = self
            .generator
            .generate_summary(&summary.original_content, &summary.prompt, tone)
            .await
            .map_err(|e| ServiceError::GenerationFailed(e.to_string()))?;

        if text.trim().chars().count() < MIN_SUMMARY_CHARS {
            warn!(%summary_id, "generator returned a degenerate summary");
            return Err(ServiceError::GenerationFailed(
                "the generated summary was too short".to_string(),
            ));
        }

        let changes = SummaryChanges {
            word_count: Some(word_count(&text)),
            summary_content: Some(text),
            ..Default::default()
        };
        let updated = self.db.update_summary(summary_id, changes).await?;
        info!(%summary_id, tone = tone.as_str(), words = updated.word_count, "summary generated");
        Ok(updated)
    }

    /// Applies a client edit. Status values are accepted in any order.
    pub async fn update(
        &self,
        summary_id: Uuid,
        user_id: Uuid,
        patch: SummaryPatch,
    ) -> ServiceResult<Summary> {
        self.owned_summary(summary_id, user_id).await?;
        let changes = SummaryChanges {
            word_count: patch.summary_content.as_deref().map(word_count),
            summary_content: patch.summary_content,
            status: patch.status,
            auto_saved: patch.auto_saved,
        };
        Ok(self.db.update_summary(summary_id, changes).await?)
    }

    pub async fn approve(&self, summary_id: Uuid, user_id: Uuid) -> ServiceResult<Summary> {
        let patch = SummaryPatch {
            status: Some(SummaryStatus::Approved),
            ..Default::default()
        };
        self.update(summary_id, user_id, patch).await
    }

    pub async fn delete(&self, summary_id: Uuid, user_id: Uuid) -> ServiceResult<()> {
        self.owned_summary(summary_id, user_id).await?;
        self.db.delete_summary(summary_id).await?;
        info!(%summary_id, %user_id, "summary deleted");
        Ok(())
    }

    pub async fn export(
        &self,
        summary_id: Uuid,
        user_id: Uuid,
        format: ExportFormat,
    ) -> ServiceResult<ExportedDocument> {
        let summary = self.owned_summary(summary_id, user_id).await?;
        let bytes = self
            .renderer
            .render(&summary, format)
            .await
            .map_err(|e| ServiceError::Upstream(format!("Failed to export summary: {}", e)))?;
        Ok(ExportedDocument {
            filename: format!("{}.{}", file_stem(&summary.title), format.extension()),
            content_type: format.content_type(),
            bytes,
        })
    }

    /// Emails the summary and records the delivery.
    ///
    /// A failed delivery is returned to the caller and leaves no log row.
    pub async fn share(
        &self,
        summary_id: Uuid,
        user_id: Uuid,
        request: ShareRequest,
    ) -> ServiceResult<EmailLog> {
        let summary = self.owned_summary(summary_id, user_id).await?;

        let mut recipients: Vec<String> = Vec::with_capacity(request.recipients.len());
        for recipient in &request.recipients {
            let recipient = recipient.trim();
            if !recipients.iter().any(|r| r.eq_ignore_ascii_case(recipient)) {
                recipients.push(recipient.to_string());
            }
        }
        if recipients.is_empty() {
            return Err(ServiceError::Validation(
                "At least one recipient is required".to_string(),
            ));
        }
        if let Some(bad) = recipients.iter().find(|r| !is_valid_email(r)) {
            return Err(ServiceError::Validation(format!(
                "Invalid email address: {}",
                bad
            )));
        }

        let subject = non_blank(&request.subject)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Meeting Summary: {}", summary.title));

        let cc = if request.cc_self {
            vec![self.db.get_user_by_id(user_id).await?.email]
        } else {
            Vec::new()
        };

        let html_body = request
            .format
            .includes_html()
            .then(|| markup::to_html(&summary.title, &summary.summary_content));

        let attachment = if request.format.includes_pdf() {
            let bytes = self
                .renderer
                .render(&summary, ExportFormat::Pdf)
                .await
                .map_err(|e| ServiceError::Upstream(format!("Failed to render PDF: {}", e)))?;
            Some(EmailAttachment {
                filename: format!("{}.pdf", file_stem(&summary.title)),
                content_type: ExportFormat::Pdf.content_type().to_string(),
                bytes,
            })
        } else {
            None
        };

        let email = OutgoingEmail {
            recipients: recipients.clone(),
            cc,
            subject: subject.clone(),
            text_body: markup::strip_markup(&summary.summary_content),
            html_body,
            attachment,
        };

        if let Err(e) = self.notifier.send_email(email).await {
            warn!(%summary_id, error = %e, "email delivery failed");
            return Err(ServiceError::Upstream(format!("Failed to send email: {}", e)));
        }

        let log = self
            .db
            .create_email_log(NewEmailLog {
                summary_id,
                recipients,
                subject,
                format: request.format,
                status: DeliveryStatus::Sent,
            })
            .await?;
        info!(%summary_id, recipients = log.recipients.len(), format = log.format.as_str(), "summary emailed");
        Ok(log)
    }

    /// Delivery history for a summary, newest first.
    pub async fn email_history(
        &self,
        summary_id: Uuid,
        user_id: Uuid,
    ) -> ServiceResult<Vec<EmailLog>> {
        self.owned_summary(summary_id, user_id).await?;
        Ok(self.db.list_email_logs_for_summary(summary_id).await?)
    }
}
