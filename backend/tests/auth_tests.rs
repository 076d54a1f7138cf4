//! Authentication tests: JWT round-trips and permission strings

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

const SECRET: &str = "test-secret-key";

/// Claims mirror of the server's token payload
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    role_id: String,
    store_id: Option<String>,
    permissions: Vec<String>,
    exp: i64,
    iat: i64,
}

fn make_claims(expires_in: i64) -> Claims {
    let now = Utc::now();
    Claims {
        sub: uuid::Uuid::new_v4().to_string(),
        role_id: uuid::Uuid::new_v4().to_string(),
        store_id: None,
        permissions: vec!["pos:view".to_string(), "pos:create".to_string()],
        iat: now.timestamp(),
        exp: (now + Duration::seconds(expires_in)).timestamp(),
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Tokens round-trip through encode/decode with the same secret
    #[test]
    fn test_token_round_trip() {
        let claims = make_claims(3600);
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::default(),
        )
        .unwrap();

        assert_eq!(decoded.claims.sub, claims.sub);
        assert_eq!(decoded.claims.permissions, claims.permissions);
        assert_eq!(decoded.claims.store_id, None);
    }

    /// A token signed with another secret is rejected
    #[test]
    fn test_wrong_secret_rejected() {
        let token = encode(
            &Header::default(),
            &make_claims(3600),
            &EncodingKey::from_secret(b"other-secret"),
        )
        .unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    /// Expired tokens are rejected by default validation
    #[test]
    fn test_expired_token_rejected() {
        let token = encode(
            &Header::default(),
            &make_claims(-3600),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(SECRET.as_bytes()),
            &Validation::default(),
        );
        assert!(result.is_err());
    }

    /// Permission strings use the resource:action convention
    #[test]
    fn test_permission_string_format() {
        let permissions = [
            "users:view",
            "inventory:update",
            "pos:create",
            "reports:view",
        ];
        for permission in permissions {
            let (resource, action) = permission.split_once(':').unwrap();
            assert!(!resource.is_empty());
            assert!(!action.is_empty());
            assert_eq!(format!("{}:{}", resource, action), permission);
        }
    }

    /// Password hashes verify and reject correctly
    #[test]
    fn test_password_hashing() {
        // Low cost keeps the test fast; the server uses DEFAULT_COST
        let hash = bcrypt::hash("kasir-rahasia", 4).unwrap();
        assert!(bcrypt::verify("kasir-rahasia", &hash).unwrap());
        assert!(!bcrypt::verify("salah", &hash).unwrap());
    }
}
