pub mod accounts;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod markup;
pub mod memory;
pub mod ports;
pub mod validate;

pub use accounts::{AccountService, AuthSession};
pub use domain::{
    DeliveryStatus, EmailFormat, EmailLog, ExportFormat, ExportedDocument, Summary, SummaryStatus,
    Theme, Tone, UploadKind, User,
};
pub use error::{ServiceError, ServiceResult};
pub use lifecycle::{ShareRequest, SummaryDraft, SummaryLifecycle, SummaryPatch};
pub use ports::{
    CredentialService, DatabaseService, DocumentRenderer, NotificationService, PortError,
    PortResult, SummaryGenerationService, TextExtractionService,
};
