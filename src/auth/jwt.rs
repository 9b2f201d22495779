use crate::models::{Claims, TokenType};
use jsonwebtoken::{DecodingKey, Validation, decode};

/// Decodes and validates an access token; refresh tokens are rejected.
pub fn verify_access_token(token: &str, secret: &str) -> Result<Claims, String> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())?;

    if claims.token_type != TokenType::Access {
        return Err("refresh tokens cannot be used for API access".to_string());
    }

    Ok(claims)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use std::time::{SystemTime, UNIX_EPOCH};

    pub(crate) fn issue(secret: &str, token_type: TokenType, ttl: i64) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64;
        let claims = Claims {
            user_id: 42,
            sub: "jdoe".into(),
            role: 3,
            exp: (now + ttl) as usize,
            jti: "test-jti".into(),
            token_type,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn accepts_valid_access_token() {
        let token = issue("s3cret", TokenType::Access, 600);
        let claims = verify_access_token(&token, "s3cret").unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.role, 3);
    }

    #[test]
    fn rejects_refresh_token() {
        let token = issue("s3cret", TokenType::Refresh, 600);
        assert!(verify_access_token(&token, "s3cret").is_err());
    }

    #[test]
    fn rejects_wrong_secret_and_expired_token() {
        let token = issue("s3cret", TokenType::Access, 600);
        assert!(verify_access_token(&token, "other").is_err());

        let expired = issue("s3cret", TokenType::Access, -3600);
        assert!(verify_access_token(&expired, "s3cret").is_err());
    }
}
