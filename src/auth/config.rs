use serde::Deserialize;

/// Bearer token verification settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret shared with the identity provider (HS256).
    pub jwt_secret: String,
    /// Expected `iss` claim. Not checked when unset.
    #[serde(default)]
    pub issuer: Option<String>,
    /// Expected `aud` claim. Not checked when unset.
    #[serde(default)]
    pub audience: Option<String>,
}

impl AuthConfig {
    /// Build with explicit values (useful for testing).
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            issuer: None,
            audience: None,
        }
    }
}
