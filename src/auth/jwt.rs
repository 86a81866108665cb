use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::config::JwtConfig;
use crate::state::AppState;

/// Claims carried by the session token: the user's id plus display name,
/// so the clients can greet without a second round trip.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub iat: usize,
    pub exp: usize,
    pub iss: String,
    pub aud: String,
}

#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: TimeDuration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from_config(&state.config.jwt)
    }
}

impl JwtKeys {
    pub fn from_config(config: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            ttl: TimeDuration::minutes(config.ttl_minutes),
        }
    }

    pub fn sign(&self, user_id: i64, first_name: &str, last_name: &str) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = data.claims.sub, "jwt verified");
        Ok(data.claims)
    }

    pub fn is_expired(err: &jsonwebtoken::errors::Error) -> bool {
        matches!(err.kind(), ErrorKind::ExpiredSignature)
    }

    /// Re-issue a token with a fresh expiry from the claims of an existing
    /// one. Signature, issuer and audience must still check out; only the
    /// expiry is ignored.
    pub fn refresh(&self, token: &str) -> anyhow::Result<String> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.validate_exp = false;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        self.sign(
            data.claims.sub,
            &data.claims.first_name,
            &data.claims.last_name,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str, ttl_minutes: i64) -> JwtConfig {
        JwtConfig {
            secret: secret.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes,
        }
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = JwtKeys::from_config(&config("dev-secret", 5));
        let token = keys.sign(42, "Ada", "Lovelace").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.first_name, "Ada");
        assert_eq!(claims.iss, "test-issuer");
    }

    #[test]
    fn verify_flags_expired_tokens() {
        let keys = JwtKeys::from_config(&config("dev-secret", -5));
        let token = keys.sign(1, "A", "B").expect("sign");
        let err = keys.verify(&token).unwrap_err();
        assert!(JwtKeys::is_expired(&err));
    }

    #[test]
    fn refresh_reissues_from_an_expired_token() {
        let expired_keys = JwtKeys::from_config(&config("dev-secret", -5));
        let token = expired_keys.sign(7, "Ada", "Lovelace").expect("sign");

        let keys = JwtKeys::from_config(&config("dev-secret", 5));
        let refreshed = keys.refresh(&token).expect("refresh");
        let claims = keys.verify(&refreshed).expect("verify refreshed");
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.last_name, "Lovelace");
    }

    #[test]
    fn verify_rejects_a_different_secret() {
        let keys = JwtKeys::from_config(&config("secret-a", 5));
        let other = JwtKeys::from_config(&config("secret-b", 5));
        let token = keys.sign(1, "A", "B").expect("sign");
        assert!(other.verify(&token).is_err());
        assert!(other.refresh(&token).is_err());
    }
}
