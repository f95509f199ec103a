use async_trait::async_trait;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Checks a shared admin key sent as `Authorization: Bearer <key>` or
/// `X-API-Key: <key>`.
pub struct AdminKeyAuthenticator {
    expected_key: String,
}

impl AdminKeyAuthenticator {
    pub fn new(key: String) -> Self {
        Self { expected_key: key }
    }

    fn presented_key<'a>(&self, request: &'a AuthRequest) -> Option<&'a str> {
        if let Some(value) = request.header("authorization") {
            let bearer = value
                .strip_prefix("Bearer ")
                .or_else(|| value.strip_prefix("bearer "));
            if bearer.is_some() {
                return bearer;
            }
        }
        request.header("x-api-key")
    }
}

#[async_trait]
impl Authenticator for AdminKeyAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let presented = self
            .presented_key(request)
            .ok_or(AuthError::NotAuthenticated)?;

        if constant_time_eq(presented.as_bytes(), self.expected_key.as_bytes()) {
            Ok(Identity {
                principal: "admin".to_string(),
                method: "api_key".to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials("Invalid API key".to_string()))
        }
    }

    fn method_name(&self) -> &'static str {
        "api_key"
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
