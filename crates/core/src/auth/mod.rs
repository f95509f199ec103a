//! Admin endpoint authentication.
//!
//! The registry can be edited over HTTP, so the admin API sits behind an
//! [`Authenticator`]. Two methods exist: `none` (every caller is the
//! anonymous admin, for local deployments) and `api_key`.

mod admin_key;

pub use admin_key::AdminKeyAuthenticator;

use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use thiserror::Error;

use crate::config::{AuthConfig, AuthMethod};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication required")]
    NotAuthenticated,

    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Request data the authenticator sees. Header names are lowercase.
#[derive(Debug, Clone, Default)]
pub struct AuthRequest {
    pub headers: HashMap<String, String>,
}

impl AuthRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

/// Who is calling the admin API.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Identity {
    pub principal: String,
    pub method: String,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            principal: "anonymous".to_string(),
            method: "none".to_string(),
        }
    }
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError>;

    fn method_name(&self) -> &'static str;
}

/// Accepts every request as the anonymous admin.
#[derive(Debug, Default)]
pub struct NoneAuthenticator;

impl NoneAuthenticator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Authenticator for NoneAuthenticator {
    async fn authenticate(&self, _request: &AuthRequest) -> Result<Identity, AuthError> {
        Ok(Identity::anonymous())
    }

    fn method_name(&self) -> &'static str {
        "none"
    }
}

/// Build the authenticator selected in config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::ApiKey => {
            let key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    AuthError::ConfigurationError(
                        "api_key must be set when using api_key auth method".to_string(),
                    )
                })?;
            Ok(Box::new(AdminKeyAuthenticator::new(key)))
        }
    }
}
