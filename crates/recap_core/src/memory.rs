//! crates/recap_core/src/memory.rs
//!
//! An in-process implementation of the `DatabaseService` port. It keeps the
//! same contracts as the Postgres adapter (unique emails, cascade on summary
//! delete, newest-first ordering) and backs the test suites.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::{
    EmailLog, NewEmailLog, NewSummary, Summary, SummaryChanges, SummaryStatus, Theme, User,
    UserCredentials,
};
use crate::ports::{DatabaseService, PortError, PortResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserCredentials>,
    summaries: HashMap<Uuid, (u64, Summary)>,
    email_logs: HashMap<Uuid, (u64, EmailLog)>,
    // Write sequence, used to break ties between identical timestamps.
    seq: u64,
}

impl Tables {
    fn next_seq(&mut self) -> u64 {
        self.seq += 1;
        self.seq
    }
}

#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> PortResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| PortError::Unexpected("in-memory store lock poisoned".to_string()))
    }

    /// Number of stored email logs across all summaries.
    pub fn email_log_count(&self) -> usize {
        self.lock().map(|t| t.email_logs.len()).unwrap_or_default()
    }
}

#[async_trait]
impl DatabaseService for InMemoryDatabase {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> PortResult<User> {
        let mut tables = self.lock()?;
        if tables.users.values().any(|c| c.user.email == email) {
            return Err(PortError::Conflict(format!("Email {} is already registered", email)));
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            full_name: full_name.to_string(),
            theme: Theme::default(),
            created_at: Utc::now(),
        };
        tables.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(user)
    }

    async fn get_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.lock()?
            .users
            .get(&user_id)
            .map(|c| c.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn get_user_credentials_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        self.lock()?
            .users
            .values()
            .find(|c| c.user.email == email)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn update_user_theme(&self, user_id: Uuid, theme: Theme) -> PortResult<()> {
        let mut tables = self.lock()?;
        let creds = tables
            .users
            .get_mut(&user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        creds.user.theme = theme;
        Ok(())
    }

    async fn create_summary(&self, summary: NewSummary) -> PortResult<Summary> {
        let mut tables = self.lock()?;
        if !tables.users.contains_key(&summary.user_id) {
            return Err(PortError::Unexpected(format!(
                "User {} does not exist",
                summary.user_id
            )));
        }
        let now = Utc::now();
        let record = Summary {
            id: Uuid::new_v4(),
            user_id: summary.user_id,
            title: summary.title,
            original_content: summary.original_content,
            prompt: summary.prompt,
            tone: summary.tone,
            summary_content: String::new(),
            word_count: 0,
            status: SummaryStatus::Draft,
            auto_saved: false,
            created_at: now,
            updated_at: now,
        };
        let seq = tables.next_seq();
        tables.summaries.insert(record.id, (seq, record.clone()));
        Ok(record)
    }

    async fn get_summary(&self, summary_id: Uuid) -> PortResult<Summary> {
        self.lock()?
            .summaries
            .get(&summary_id)
            .map(|(_, s)| s.clone())
            .ok_or_else(|| PortError::NotFound(format!("Summary {} not found", summary_id)))
    }

    async fn list_summaries_for_user(&self, user_id: Uuid) -> PortResult<Vec<Summary>> {
        let tables = self.lock()?;
        let mut rows: Vec<&(u64, Summary)> = tables
            .summaries
            .values()
            .filter(|(_, s)| s.user_id == user_id)
            .collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| {
            b.updated_at.cmp(&a.updated_at).then(b_seq.cmp(a_seq))
        });
        Ok(rows.into_iter().map(|(_, s)| s.clone()).collect())
    }

    async fn update_summary(
        &self,
        summary_id: Uuid,
        changes: SummaryChanges,
    ) -> PortResult<Summary> {
        let mut tables = self.lock()?;
        let seq = tables.next_seq();
        let (row_seq, summary) = tables
            .summaries
            .get_mut(&summary_id)
            .ok_or_else(|| PortError::NotFound(format!("Summary {} not found", summary_id)))?;

        if let Some(content) = changes.summary_content {
            summary.summary_content = content;
        }
        if let Some(count) = changes.word_count {
            summary.word_count = count;
        }
        if let Some(status) = changes.status {
            summary.status = status;
        }
        if let Some(auto_saved) = changes.auto_saved {
            summary.auto_saved = auto_saved;
        }
        summary.updated_at = Utc::now();
        *row_seq = seq;
        Ok(summary.clone())
    }

    async fn delete_summary(&self, summary_id: Uuid) -> PortResult<()> {
        let mut tables = self.lock()?;
        if tables.summaries.remove(&summary_id).is_none() {
            return Err(PortError::NotFound(format!("Summary {} not found", summary_id)));
        }
        tables
            .email_logs
            .retain(|_, (_, log)| log.summary_id != summary_id);
        Ok(())
    }

    async fn create_email_log(&self, log: NewEmailLog) -> PortResult<EmailLog> {
        let mut tables = self.lock()?;
        if !tables.summaries.contains_key(&log.summary_id) {
            return Err(PortError::Unexpected(format!(
                "Summary {} does not exist",
                log.summary_id
            )));
        }
        let record = EmailLog {
            id: Uuid::new_v4(),
            summary_id: log.summary_id,
            recipients: log.recipients,
            subject: log.subject,
            format: log.format,
            status: log.status,
            sent_at: Utc::now(),
        };
        let seq = tables.next_seq();
        tables.email_logs.insert(record.id, (seq, record.clone()));
        Ok(record)
    }

    async fn list_email_logs_for_summary(&self, summary_id: Uuid) -> PortResult<Vec<EmailLog>> {
        let tables = self.lock()?;
        let mut rows: Vec<&(u64, EmailLog)> = tables
            .email_logs
            .values()
            .filter(|(_, log)| log.summary_id == summary_id)
            .collect();
        rows.sort_by(|(a_seq, a), (b_seq, b)| b.sent_at.cmp(&a.sent_at).then(b_seq.cmp(a_seq)));
        Ok(rows.into_iter().map(|(_, log)| log.clone()).collect())
    }
}
