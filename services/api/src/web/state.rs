//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the per-request identity.

use crate::config::Config;
use recap_core::ports::{
    CredentialService, DatabaseService, DocumentRenderer, NotificationService,
    SummaryGenerationService, TextExtractionService,
};
use recap_core::{AccountService, SummaryLifecycle};
use std::sync::Arc;
use uuid::Uuid;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub accounts: Arc<AccountService>,
    pub summaries: Arc<SummaryLifecycle>,
    pub extractor: Arc<dyn TextExtractionService>,
}

/// The external collaborators the services are wired to.
pub struct Adapters {
    pub db: Arc<dyn DatabaseService>,
    pub credentials: Arc<dyn CredentialService>,
    pub generator: Arc<dyn SummaryGenerationService>,
    pub renderer: Arc<dyn DocumentRenderer>,
    pub notifier: Arc<dyn NotificationService>,
    pub extractor: Arc<dyn TextExtractionService>,
}

impl AppState {
    pub fn new(config: Arc<Config>, adapters: Adapters) -> Self {
        let accounts = AccountService::new(adapters.db.clone(), adapters.credentials);
        let summaries = SummaryLifecycle::new(
            adapters.db,
            adapters.generator,
            adapters.renderer,
            adapters.notifier,
        );
        Self {
            config,
            accounts: Arc::new(accounts),
            summaries: Arc::new(summaries),
            extractor: adapters.extractor,
        }
    }
}

//=========================================================================================
// CurrentUser (Specific to One Request)
//=========================================================================================

/// The authenticated caller, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Uuid);
