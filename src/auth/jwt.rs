use jsonwebtoken::{decode, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};

use crate::{
    auth::claims::Claims,
    errors::{AppError, AppResult},
};

/// Verifies bearer tokens minted by the identity provider. Tokens are never
/// issued or refreshed here.
#[derive(Clone)]
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &SecretString) -> Self {
        let secret_bytes = secret.expose_secret().as_bytes();

        Self {
            decoding_key: DecodingKey::from_secret(secret_bytes),
            validation: Validation::default(),
        }
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::AuthenticationRequired("Token has expired".to_string())
                }
                _ => AppError::AuthenticationRequired(format!("Invalid token: {}", e)),
            })
    }
}

#[cfg(test)]
pub fn sign_test_token(secret: &SecretString, claims: &Claims) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};

    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.expose_secret().as_bytes()),
    )
    .expect("test token should encode")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_validate_provider_token() {
        let config = Config::test_config();
        let verifier = JwtVerifier::new(&config.jwt_secret);

        let token = sign_test_token(&config.jwt_secret, &Claims::for_subject("uid-1", 3600));
        let claims = verifier.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "uid-1");
    }

    #[test]
    fn test_invalid_token() {
        let config = Config::test_config();
        let verifier = JwtVerifier::new(&config.jwt_secret);

        let result = verifier.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AppError::AuthenticationRequired(_))));
    }

    #[test]
    fn test_expired_token() {
        let config = Config::test_config();
        let verifier = JwtVerifier::new(&config.jwt_secret);

        let token = sign_test_token(&config.jwt_secret, &Claims::for_subject("uid-1", -3600));
        match verifier.validate_token(&token) {
            Err(AppError::AuthenticationRequired(msg)) => assert!(msg.contains("expired")),
            other => panic!("Expected AuthenticationRequired, got {:?}", other),
        }
    }

    #[test]
    fn test_token_signed_with_other_secret() {
        let config = Config::test_config();
        let verifier = JwtVerifier::new(&config.jwt_secret);

        let other = SecretString::from("some_other_secret".to_string());
        let token = sign_test_token(&other, &Claims::for_subject("uid-1", 3600));
        assert!(verifier.validate_token(&token).is_err());
    }
}
