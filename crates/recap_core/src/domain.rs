//! crates/recap_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Returned when a stored or submitted string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

//=========================================================================================
// Users
//=========================================================================================

/// UI colour scheme remembered per user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl FromStr for Theme {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(UnknownVariant::new("theme", other)),
        }
    }
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

//=========================================================================================
// Summaries
//=========================================================================================

/// Style directive handed to the summary generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Concise,
    Detailed,
}

impl Tone {
    /// Resolves a stored tone, falling back to `Professional` for anything unknown.
    pub fn from_str_lossy(s: &str) -> Self {
        s.trim().to_ascii_lowercase().parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Casual => "casual",
            Tone::Concise => "concise",
            Tone::Detailed => "detailed",
        }
    }

    /// The writing instruction passed to the model for this tone.
    pub fn instruction(self) -> &'static str {
        match self {
            Tone::Professional => {
                "Write in a formal, professional business tone suitable for stakeholders."
            }
            Tone::Casual => "Write in a friendly, conversational tone while keeping it clear.",
            Tone::Concise => {
                "Be brief. Use short bullet points and only the essential decisions and action items."
            }
            Tone::Detailed => {
                "Be thorough. Cover discussion points, decisions, owners, deadlines and open questions."
            }
        }
    }
}

impl FromStr for Tone {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "professional" => Ok(Tone::Professional),
            "casual" => Ok(Tone::Casual),
            "concise" => Ok(Tone::Concise),
            "detailed" => Ok(Tone::Detailed),
            other => Err(UnknownVariant::new("tone", other)),
        }
    }
}

/// Informational review state of a summary. Never gates an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SummaryStatus {
    #[default]
    Draft,
    Approved,
    Sent,
}

impl SummaryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SummaryStatus::Draft => "draft",
            SummaryStatus::Approved => "approved",
            SummaryStatus::Sent => "sent",
        }
    }
}

impl FromStr for SummaryStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(SummaryStatus::Draft),
            "approved" => Ok(SummaryStatus::Approved),
            "sent" => Ok(SummaryStatus::Sent),
            other => Err(UnknownVariant::new("status", other)),
        }
    }
}

impl fmt::Display for SummaryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A meeting summary owned by a single user.
#[derive(Debug, Clone)]
pub struct Summary {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub original_content: String,
    pub prompt: String,
    /// Stored exactly as submitted; see [`Tone::from_str_lossy`].
    pub tone: String,
    pub summary_content: String,
    pub word_count: usize,
    pub status: SummaryStatus,
    pub auto_saved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields needed to insert a new summary row.
#[derive(Debug, Clone)]
pub struct NewSummary {
    pub user_id: Uuid,
    pub title: String,
    pub original_content: String,
    pub prompt: String,
    pub tone: String,
}

/// A partial update applied to a summary row. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct SummaryChanges {
    pub summary_content: Option<String>,
    pub word_count: Option<usize>,
    pub status: Option<SummaryStatus>,
    pub auto_saved: Option<bool>,
}

/// Counts whitespace-delimited, non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

//=========================================================================================
// Email delivery
//=========================================================================================

/// How a summary is delivered by email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailFormat {
    Html,
    Pdf,
    Both,
}

impl EmailFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            EmailFormat::Html => "html",
            EmailFormat::Pdf => "pdf",
            EmailFormat::Both => "both",
        }
    }

    pub fn includes_html(self) -> bool {
        matches!(self, EmailFormat::Html | EmailFormat::Both)
    }

    pub fn includes_pdf(self) -> bool {
        matches!(self, EmailFormat::Pdf | EmailFormat::Both)
    }
}

impl FromStr for EmailFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(EmailFormat::Html),
            "pdf" => Ok(EmailFormat::Pdf),
            "both" => Ok(EmailFormat::Both),
            other => Err(UnknownVariant::new("email format", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    Sent,
    Failed,
    Pending,
}

impl DeliveryStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Pending => "pending",
        }
    }
}

impl FromStr for DeliveryStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(DeliveryStatus::Sent),
            "failed" => Ok(DeliveryStatus::Failed),
            "pending" => Ok(DeliveryStatus::Pending),
            other => Err(UnknownVariant::new("delivery status", other)),
        }
    }
}

/// Audit record of one email delivery of a summary.
#[derive(Debug, Clone)]
pub struct EmailLog {
    pub id: Uuid,
    pub summary_id: Uuid,
    pub recipients: Vec<String>,
    pub subject: String,
    pub format: EmailFormat,
    pub status: DeliveryStatus,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewEmailLog {
    pub summary_id: Uuid,
    pub recipients: Vec<String>,
    pub subject: String,
    pub format: EmailFormat,
    pub status: DeliveryStatus,
}

/// A binary file attached to an outgoing email.
#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A fully assembled message handed to the notification dispatcher.
#[derive(Debug, Clone)]
pub struct OutgoingEmail {
    pub recipients: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
    pub attachment: Option<EmailAttachment>,
}

//=========================================================================================
// Files in and out
//=========================================================================================

/// Upload types that the content extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    Text,
    Pdf,
    Docx,
}

impl UploadKind {
    /// Detects the kind from a file name's extension, case-insensitively.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "txt" => Some(UploadKind::Text),
            "pdf" => Some(UploadKind::Pdf),
            "docx" => Some(UploadKind::Docx),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            UploadKind::Text => "txt",
            UploadKind::Pdf => "pdf",
            UploadKind::Docx => "docx",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

impl FromStr for ExportFormat {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(ExportFormat::Pdf),
            "docx" => Ok(ExportFormat::Docx),
            other => Err(UnknownVariant::new("export format", other)),
        }
    }
}

/// A rendered summary ready to be downloaded.
#[derive(Debug, Clone)]
pub struct ExportedDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Builds a download-safe file stem from a summary title.
pub fn file_stem(title: &str) -> String {
    let mut stem = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            stem.push(c.to_ascii_lowercase());
        } else if !stem.ends_with('-') && !stem.is_empty() {
            stem.push('-');
        }
    }
    let stem = stem.trim_end_matches('-');
    if stem.is_empty() {
        "summary".to_string()
    } else {
        stem.to_string()
    }
}
