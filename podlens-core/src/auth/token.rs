use anyhow::{bail, ensure, Result};
use http::HeaderValue;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::LabelMatch;
use crate::error::AppError;

/// The authorization header bearer prefix — for token creds.
const BEARER_PREFIX: &str = "bearer ";

/// A token credentials set, containing the claims of the requesting role.
///
/// This is constructed by cryptographically verifying a token, and validating its claims.
#[derive(Clone, Debug)]
pub struct TokenCredentials {
    /// The verified claims of the token presented.
    pub claims: RoleClaims,
    /// The raw string form of the token extracted from the given header.
    pub token: String,
}

impl TokenCredentials {
    /// Extract and verify a token from the given header value.
    pub fn from_auth_header(header: HeaderValue, key: &DecodingKey) -> Result<Self> {
        let header_str = header.to_str().map_err(|_| AppError::InvalidCredentials("must be a valid string value".into()))?;

        // Split the header on the bearer prefix & ensure the leading segment is empty.
        let mut splits = header_str.splitn(2, BEARER_PREFIX);
        ensure!(splits.next() == Some(""), AppError::InvalidCredentials("authorization header value must begin with 'bearer '".into()));

        // Check the final segment and ensure we have a populated value.
        let token = match splits.next() {
            Some(token) if !token.is_empty() => token.to_string(),
            _ => bail!(AppError::InvalidCredentials("no token detected in header".into())),
        };
        let claims = RoleClaims::decode(&token, key).map_err(|err| AppError::InvalidCredentials(err.to_string()))?;
        Ok(Self { claims, token })
    }
}

/// The model of a JWT issued for a podlens viewer role.
///
/// Permissions arrive pre-resolved: the policy store which maps roles to
/// permissions lives with the token issuer, never with this service.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoleClaims {
    /// The JWT ID of this token, unique to the token's original creation.
    pub jti: String,
    /// The name of the role which this token corresponds to.
    pub sub: String,
    /// The namespaces this role may read. A single `*` entry grants all.
    #[serde(default)]
    pub namespaces: Vec<String>,
    /// Label matchers granting workload visibility.
    #[serde(default)]
    pub workloads: Vec<LabelMatch>,
    /// Label matchers granting environment variable visibility.
    #[serde(default)]
    pub env_vars: Vec<LabelMatch>,
}

impl RoleClaims {
    /// Encode this claims body as a JWT.
    pub fn encode(&self, key: &EncodingKey) -> jsonwebtoken::errors::Result<String> {
        let header = Header::new(Algorithm::HS512);
        jsonwebtoken::encode(&header, &self, key)
    }

    /// Decode the given string as a JWT with a `RoleClaims` body.
    pub fn decode(token: impl AsRef<str>, key: &DecodingKey) -> jsonwebtoken::errors::Result<Self> {
        let validation = Validation {
            algorithms: vec![Algorithm::HS512],
            validate_exp: false,
            validate_nbf: false,
            ..Default::default()
        };
        jsonwebtoken::decode(token.as_ref(), key, &validation).map(|body| body.claims)
    }
}
