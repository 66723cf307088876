//! Supabase (GoTrue) identity provider.

use super::{IdentityError, IdentityProvider, SignedIn};
use crate::domain::AffiliateId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct SupabaseIdentityProvider {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseIdentityProvider {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, IdentityError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| IdentityError::NetworkError(e.to_string()))?;

        let status = response.status();
        if matches!(status, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) {
            debug!("Sign-in rejected for {}", email);
            return Err(IdentityError::InvalidCredentials);
        }
        let body = read_json(response, status).await?;
        parse_sign_in(&body)
    }

    async fn resolve(&self, token: &str) -> Result<AffiliateId, IdentityError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| IdentityError::NetworkError(e.to_string()))?;

        let status = response.status();
        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(IdentityError::TokenRejected);
        }
        let body = read_json(response, status).await?;
        parse_user_id(&body)
            .ok_or_else(|| IdentityError::ParseError("Missing user id".to_string()))
    }
}

async fn read_json(
    response: reqwest::Response,
    status: StatusCode,
) -> Result<Value, IdentityError> {
    if !status.is_success() {
        return Err(IdentityError::HttpError {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("error").to_string(),
        });
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| IdentityError::ParseError(e.to_string()))
}

fn parse_sign_in(body: &Value) -> Result<SignedIn, IdentityError> {
    let access_token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or(IdentityError::InvalidCredentials)?
        .to_string();
    let affiliate = body
        .get("user")
        .and_then(parse_user_id)
        .ok_or(IdentityError::InvalidCredentials)?;

    Ok(SignedIn {
        access_token,
        affiliate,
    })
}

fn parse_user_id(user: &Value) -> Option<AffiliateId> {
    user.get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .map(|id| AffiliateId::new(id.to_string()))
}
