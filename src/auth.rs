//! Admin session validation for incoming requests

use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::dto::ApiGatewayRequest;
use crate::error::ServiceError;

/// Roles allowed to run back-office operations
pub const ADMIN_ROLES: &[&str] = &["admin", "superadmin"];

/// Cookie carrying the session token when no bearer header is sent
pub const SESSION_COOKIE: &str = "admin_session";

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// User email
    #[serde(default)]
    pub email: Option<String>,
    /// User role
    pub role: String,
    /// Issued at timestamp
    pub iat: usize,
    /// Expiration timestamp
    pub exp: usize,
}

/// Caller identity, echoed back as `user` in responses
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthContext {
    pub id: String,
    pub email: Option<String>,
    pub role: String,
}

fn bearer_token(request: &ApiGatewayRequest) -> Option<&str> {
    request
        .header("Authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn cookie_token(request: &ApiGatewayRequest) -> Option<&str> {
    request.header("Cookie").and_then(|cookies| {
        cookies
            .split(';')
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .map(|(_, value)| value.trim())
            .filter(|token| !token.is_empty())
    })
}

/// Finds the session token, preferring the bearer header over the cookie.
pub fn extract_token(request: &ApiGatewayRequest) -> Option<&str> {
    bearer_token(request).or_else(|| cookie_token(request))
}

/// Validate a JWT token and return the authentication context
pub fn validate_token(token: &str, secret: &str) -> Result<AuthContext, ServiceError> {
    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let token_data = decode::<Claims>(token, &decoding_key, &Validation::default())
        .map_err(|err| ServiceError::unauthorized("Invalid or expired session").with_details(err))?;
    Ok(AuthContext {
        id: token_data.claims.sub,
        email: token_data.claims.email,
        role: token_data.claims.role,
    })
}

/// Resolves the caller of a request, failing with 401 when there is no valid session.
pub fn authenticate(request: &ApiGatewayRequest, secret: &str) -> Result<AuthContext, ServiceError> {
    let token = extract_token(request)
        .ok_or_else(|| ServiceError::unauthorized("Authentication required"))?;
    validate_token(token, secret)
}

/// Fails with 403 unless the caller holds one of `allowed_roles`.
pub fn require_role(context: &AuthContext, allowed_roles: &[&str]) -> Result<(), ServiceError> {
    if allowed_roles.contains(&context.role.as_str()) {
        Ok(())
    } else {
        Err(ServiceError::forbidden(format!(
            "Role '{}' is not permitted; requires one of: {}",
            context.role,
            allowed_roles.join(", ")
        )))
    }
}

/// Mint a session token for a user
pub fn issue_token(
    user_id: &str,
    email: Option<&str>,
    role: &str,
    secret: &str,
    expiration_hours: u64,
) -> Result<String, ServiceError> {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        email: email.map(str::to_string),
        role: role.to_string(),
        iat: now,
        exp: now + (expiration_hours * 3600) as usize,
    };
    let encoding_key = EncodingKey::from_secret(secret.as_ref());
    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|err| ServiceError::internal_server_error("Failed to issue session").with_details(err))
}
