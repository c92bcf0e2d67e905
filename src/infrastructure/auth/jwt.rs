//! JWT token generation and validation

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use crate::domain::user::{User, UserRole};
use crate::domain::DomainError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID)
    pub sub: String,
    pub username: String,
    pub role: UserRole,
    /// Issued at (Unix epoch)
    pub iat: i64,
    /// Expiration (Unix epoch)
    pub exp: i64,
}

impl JwtClaims {
    pub fn new(user: &User, expiration_hours: u64) -> Self {
        let now = Utc::now();
        let exp = now + Duration::hours(expiration_hours as i64);

        Self {
            sub: user.id().as_str().to_string(),
            username: user.username().to_string(),
            role: user.role(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.sub
    }
}

/// Configuration for JWT service
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    pub secret: String,
    pub expiration_hours: u64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>, expiration_hours: u64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }
}

/// Trait for JWT operations
pub trait JwtGenerator: Send + Sync + Debug {
    fn generate(&self, user: &User) -> Result<String, DomainError>;

    /// Validate a token and return its claims
    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError>;

    fn expiration_hours(&self) -> u64;
}

/// HS256 JWT service
#[derive(Clone)]
pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("expiration_hours", &self.config.expiration_hours)
            .field("secret", &"[hidden]")
            .finish()
    }
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }
}

impl JwtGenerator for JwtService {
    fn generate(&self, user: &User) -> Result<String, DomainError> {
        let claims = JwtClaims::new(user, self.config.expiration_hours);

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::internal(format!("Failed to generate JWT: {}", e)))
    }

    fn validate(&self, token: &str) -> Result<JwtClaims, DomainError> {
        let validation = Validation::new(Algorithm::HS256);

        decode::<JwtClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| DomainError::unauthorized(format!("Invalid token: {}", e)))
    }

    fn expiration_hours(&self) -> u64 {
        self.config.expiration_hours
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(JwtConfig::new(secret, 24))
    }

    #[test]
    fn test_generate_and_validate() {
        let jwt = service("test-secret");
        let user = User::new("alice", "alice@ctf.local", "hash");

        let token = jwt.generate(&user).unwrap();
        let claims = jwt.validate(&token).unwrap();

        assert_eq!(claims.user_id(), user.id().as_str());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, UserRole::Player);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_admin_role_in_claims() {
        let jwt = service("test-secret");
        let admin = User::new("root", "root@ctf.local", "hash").with_role(UserRole::Admin);

        let claims = jwt.validate(&jwt.generate(&admin).unwrap()).unwrap();
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let user = User::new("alice", "alice@ctf.local", "hash");
        let token = service("secret-a").generate(&user).unwrap();

        let result = service("secret-b").validate(&token);
        assert!(matches!(result, Err(DomainError::Unauthorized { .. })));
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        assert!(service("s").validate("not.a.jwt").is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = service("test-secret");
        let user = User::new("alice", "alice@ctf.local", "hash");
        let mut claims = JwtClaims::new(&user, 1);
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(jwt.validate(&token).is_err());
    }
}
