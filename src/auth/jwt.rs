use crate::core::errors::StudyHubError;
use crate::core::models::user::{Actor, Role};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // User ID
    pub role: String, // Role ("USER" or "ADMIN")
    pub exp: usize,   // Expiration timestamp
}

impl Claims {
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.sub.clone(),
            role: if self.role == "ADMIN" { Role::Admin } else { Role::User },
        }
    }
}

pub struct JwtService {
    secret: String,
}

impl JwtService {
    pub fn new(secret: String) -> Self {
        JwtService { secret }
    }

    pub fn generate_token(&self, user_id: &str, role: &str) -> Result<String, StudyHubError> {
        let expiration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as usize + 3600) // 1 hour expiry
            .map_err(|e| StudyHubError::InternalServerError(format!("Time error: {}", e)))?;

        let claims = Claims {
            sub: user_id.to_string(),
            role: role.to_string(),
            exp: expiration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| StudyHubError::InternalServerError(format!("JWT encoding error: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, StudyHubError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| StudyHubError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }
}
