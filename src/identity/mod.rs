//! Identity provider abstraction: password sign-in and bearer resolution.

use crate::domain::AffiliateId;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

pub mod supabase;

pub use supabase::SupabaseIdentityProvider;

/// Result of a successful password sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub access_token: String,
    pub affiliate: AffiliateId,
}

#[async_trait]
pub trait IdentityProvider: Send + Sync + fmt::Debug {
    /// Exchange email and password for a bearer credential.
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError>;

    /// Resolve a bearer credential to the affiliate it was issued for.
    async fn resolve(&self, token: &str) -> Result<AffiliateId, IdentityError>;
}

#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Token rejected")]
    TokenRejected,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },
    #[error("Parse error: {0}")]
    ParseError(String),
}

/// In-memory identity provider for tests and local runs.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    accounts: HashMap<String, (String, AffiliateId)>,
    tokens: HashMap<String, AffiliateId>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account; sign-in issues `token` for it.
    pub fn with_account(
        mut self,
        email: &str,
        password: &str,
        user_id: &str,
        token: &str,
    ) -> Self {
        let affiliate = AffiliateId::new(user_id.to_string());
        self.accounts
            .insert(email.to_string(), (password.to_string(), affiliate.clone()));
        self.tokens.insert(token.to_string(), affiliate);
        self
    }

    /// Accept `token` as a bearer for `user_id` without an account.
    pub fn with_token(mut self, token: &str, user_id: &str) -> Self {
        self.tokens
            .insert(token.to_string(), AffiliateId::new(user_id.to_string()));
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        let (expected, affiliate) = self
            .accounts
            .get(email)
            .ok_or(IdentityError::InvalidCredentials)?;
        if expected != password {
            return Err(IdentityError::InvalidCredentials);
        }

        let access_token = self
            .tokens
            .iter()
            .find(|(_, id)| *id == affiliate)
            .map(|(token, _)| token.clone())
            .ok_or(IdentityError::InvalidCredentials)?;

        Ok(SignedIn {
            access_token,
            affiliate: affiliate.clone(),
        })
    }

    async fn resolve(&self, token: &str) -> Result<AffiliateId, IdentityError> {
        self.tokens
            .get(token)
            .cloned()
            .ok_or(IdentityError::TokenRejected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticIdentityProvider {
        StaticIdentityProvider::new().with_account(
            "aff@example.com",
            "hunter2",
            "user-1",
            "tok-1",
        )
    }

    #[tokio::test]
    async fn test_static_sign_in() {
        let signed_in = provider().sign_in("aff@example.com", "hunter2").await.unwrap();
        assert_eq!(signed_in.access_token, "tok-1");
        assert_eq!(signed_in.affiliate.as_str(), "user-1");
    }

    #[tokio::test]
    async fn test_static_sign_in_wrong_password() {
        let result = provider().sign_in("aff@example.com", "nope").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));

        let result = provider().sign_in("other@example.com", "hunter2").await;
        assert!(matches!(result, Err(IdentityError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_static_resolve() {
        let p = provider().with_token("tok-2", "user-2");
        assert_eq!(p.resolve("tok-1").await.unwrap().as_str(), "user-1");
        assert_eq!(p.resolve("tok-2").await.unwrap().as_str(), "user-2");
        assert!(matches!(
            p.resolve("bogus").await,
            Err(IdentityError::TokenRejected)
        ));
    }
}
