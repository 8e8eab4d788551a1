use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::config::AuthConfig;
use crate::auth::models::{AuthenticatedUser, Claims};
use crate::error::AppError;

/// Verifies HS256 bearer tokens issued by the identity provider.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for JwtVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl JwtVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5;
        // a configured check must also reject tokens that omit the claim
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
            validation.required_spec_claims.insert("iss".to_string());
        }
        match &config.audience {
            Some(audience) => {
                validation.set_audience(&[audience]);
                validation.required_spec_claims.insert("aud".to_string());
            }
            None => validation.validate_aud = false,
        }

        Self {
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
        }
    }

    /// Validate a raw token and resolve the caller it identifies.
    pub fn verify(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthenticated("Token has expired".into())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthenticated("Invalid token signature".into())
                }
                _ => AppError::Unauthenticated(format!("Token validation failed: {e}")),
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(AppError::Unauthenticated("Token has an empty subject".into()));
        }

        Ok(data.claims.into())
    }
}

/// Sign a token for `user_id` that expires after `ttl`.
///
/// Production tokens come from the identity provider; this is used by the
/// `issue-token` command for local development and by tests.
pub fn issue_token(
    config: &AuthConfig,
    user_id: &str,
    email: Option<&str>,
    ttl: Duration,
) -> Result<String, AppError> {
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        exp: (Utc::now() + ttl).timestamp(),
        iss: config.issuer.clone(),
        aud: config.audience.clone(),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
}
