//! crates/recap_core/src/accounts.rs
//!
//! Registration, login and the per-user theme preference.

use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{Theme, User};
use crate::error::{ServiceError, ServiceResult};
use crate::ports::{CredentialService, DatabaseService, PortError};
use crate::validate::{is_valid_email, non_blank};

pub const MIN_PASSWORD_LEN: usize = 8;

const INVALID_LOGIN: &str = "Invalid email or password";

/// A user together with a freshly issued bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: String,
}

pub struct AccountService {
    db: Arc<dyn DatabaseService>,
    credentials: Arc<dyn CredentialService>,
}

impl AccountService {
    pub fn new(db: Arc<dyn DatabaseService>, credentials: Arc<dyn CredentialService>) -> Self {
        Self { db, credentials }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> ServiceResult<AuthSession> {
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(ServiceError::Validation("A valid email is required".to_string()));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ServiceError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        let full_name = non_blank(full_name)
            .ok_or_else(|| ServiceError::Validation("Full name is required".to_string()))?;

        let password_hash = self.credentials.hash_password(password)?;
        let user = self
            .db
            .create_user(&email, &password_hash, full_name)
            .await
            .map_err(|e| match e {
                PortError::Conflict(_) => {
                    ServiceError::Conflict("An account with this email already exists".to_string())
                }
                other => other.into(),
            })?;
        info!(user_id = %user.id, "user registered");

        let token = self.credentials.issue_token(user.id)?;
        Ok(AuthSession { user, token })
    }

    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<AuthSession> {
        let creds = match self
            .db
            .get_user_credentials_by_email(&normalize_email(email))
            .await
        {
            Ok(creds) => creds,
            Err(PortError::NotFound(_)) => {
                return Err(ServiceError::Unauthenticated(INVALID_LOGIN.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        if !self
            .credentials
            .verify_password(password, &creds.password_hash)?
        {
            return Err(ServiceError::Unauthenticated(INVALID_LOGIN.to_string()));
        }

        let token = self.credentials.issue_token(creds.user.id)?;
        Ok(AuthSession {
            user: creds.user,
            token,
        })
    }

    /// Resolves a bearer token to the user id it was issued for.
    pub fn authenticate(&self, token: &str) -> ServiceResult<Uuid> {
        self.credentials
            .verify_token(token)
            .map_err(|_| ServiceError::Unauthenticated("Invalid or expired token".to_string()))
    }

    pub async fn current_user(&self, user_id: Uuid) -> ServiceResult<User> {
        match self.db.get_user_by_id(user_id).await {
            Ok(user) => Ok(user),
            Err(PortError::NotFound(_)) => {
                Err(ServiceError::Unauthenticated("User no longer exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn set_theme(&self, user_id: Uuid, theme: Theme) -> ServiceResult<()> {
        match self.db.update_user_theme(user_id, theme).await {
            Ok(()) => Ok(()),
            Err(PortError::NotFound(_)) => {
                Err(ServiceError::Unauthenticated("User no longer exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryDatabase;
    use crate::ports::PortResult;

    /// Reversible "hashing" and tokens that are just the user id.
    struct PlainCredentials;

    impl CredentialService for PlainCredentials {
        fn hash_password(&self, password: &str) -> PortResult<String> {
            Ok(format!("plain:{}", password))
        }

        fn verify_password(&self, password: &str, password_hash: &str) -> PortResult<bool> {
            Ok(password_hash == format!("plain:{}", password))
        }

        fn issue_token(&self, user_id: Uuid) -> PortResult<String> {
            Ok(user_id.to_string())
        }

        fn verify_token(&self, token: &str) -> PortResult<Uuid> {
            Uuid::parse_str(token).map_err(|_| PortError::Unauthorized)
        }
    }

    fn service() -> AccountService {
        AccountService::new(Arc::new(InMemoryDatabase::new()), Arc::new(PlainCredentials))
    }

    #[tokio::test]
    async fn register_then_login() {
        let accounts = service();

        let registered = accounts
            .register(" Ada@Example.com ", "correct horse", "Ada Lovelace")
            .await
            .unwrap();
        assert_eq!(registered.user.email, "ada@example.com");
        assert_eq!(registered.user.theme, Theme::Light);
        assert_eq!(accounts.authenticate(&registered.token).unwrap(), registered.user.id);

        let session = accounts.login("ada@example.com", "correct horse").await.unwrap();
        assert_eq!(session.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let accounts = service();
        accounts.register("ada@example.com", "password1", "Ada").await.unwrap();

        let err = accounts
            .register("ADA@example.com", "password2", "Imposter")
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn register_validates_input() {
        let accounts = service();
        for (email, password, name) in [
            ("nope", "password1", "Ada"),
            ("ada@example.com", "short", "Ada"),
            ("ada@example.com", "password1", "  "),
        ] {
            let err = accounts.register(email, password, name).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "{email} {password} {name}");
        }
    }

    #[tokio::test]
    async fn bad_credentials_share_one_message() {
        let accounts = service();
        accounts.register("ada@example.com", "password1", "Ada").await.unwrap();

        let wrong_password = accounts.login("ada@example.com", "password2").await.unwrap_err();
        let unknown_user = accounts.login("bob@example.com", "password1").await.unwrap_err();

        assert_eq!(wrong_password.to_string(), INVALID_LOGIN);
        assert_eq!(unknown_user.to_string(), INVALID_LOGIN);
    }

    #[tokio::test]
    async fn theme_is_persisted() {
        let accounts = service();
        let session = accounts.register("ada@example.com", "password1", "Ada").await.unwrap();

        accounts.set_theme(session.user.id, Theme::Dark).await.unwrap();

        let user = accounts.current_user(session.user.id).await.unwrap();
        assert_eq!(user.theme, Theme::Dark);
    }

    #[tokio::test]
    async fn unknown_token_or_user_is_unauthenticated() {
        let accounts = service();
        assert!(matches!(
            accounts.authenticate("garbage"),
            Err(ServiceError::Unauthenticated(_))
        ));
        assert!(matches!(
            accounts.current_user(Uuid::new_v4()).await,
            Err(ServiceError::Unauthenticated(_))
        ));
        assert!(matches!(
            accounts.set_theme(Uuid::new_v4(), Theme::Dark).await,
            Err(ServiceError::Unauthenticated(_))
        ));
    }
}
