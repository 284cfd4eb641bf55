pub mod credentials;
pub mod db;
pub mod export;
pub mod extract;
pub mod mailer;
pub mod summary_llm;

pub use credentials::Argon2JwtCredentials;
pub use db::DbAdapter;
pub use export::DocumentExporter;
pub use extract::FileTextExtractor;
pub use mailer::SmtpMailer;
pub use summary_llm::OpenAiSummaryAdapter;
