//! Session token issuance and verification.
//!
//! A validated challenge becomes a compact three-part JWT signed with
//! HMAC-SHA-512 under a caller-supplied shared secret. The secret is
//! deliberately independent of any ledger key: losing it never exposes
//! account key material.

use base64::prelude::*;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::{
    config::JwtConfig,
    error::{AuthError, Result},
    token::Token,
};

/// Claims carried by a session token
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Token id: lowercase hex content hash of the validated challenge
    pub jti: String,
    /// The authenticated account address
    pub sub: String,
    /// Issued-at: the challenge window's lower bound (Unix seconds)
    pub iat: u64,
    /// Expiry: the challenge window's upper bound (Unix seconds)
    pub exp: u64,
    /// Caller-supplied claims merged in at encode time
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Encode a validated token as a signed session credential.
///
/// Base claims are `jti`, `sub`, `iat` and `exp`; `extra` claims are
/// merged on top and win on key collision.
///
/// # Errors
/// [`AuthError::Signing`] if the shared secret cannot be decoded or the
/// claim set cannot be serialized and signed.
pub fn encode_session(
    token: &Token,
    config: &JwtConfig,
    extra: Option<&Map<String, Value>>,
) -> Result<String> {
    let secret = decode_secret(config.secret.expose_secret())?;
    let bounds = token.time_bounds();

    let mut claims = Map::new();
    claims.insert("jti".to_string(), json!(token.hash_hex()));
    claims.insert("sub".to_string(), json!(token.subject_address()));
    claims.insert("iat".to_string(), json!(bounds.min_time));
    claims.insert("exp".to_string(), json!(bounds.max_time));
    if let Some(extra) = extra {
        for (key, value) in extra {
            claims.insert(key.clone(), value.clone());
        }
    }

    encode(
        &Header::new(Algorithm::HS512),
        &claims,
        &EncodingKey::from_secret(&secret),
    )
    .map_err(|e| AuthError::Signing(format!("failed to encode session token: {e}")))
}

/// Verify a session credential and return its claims.
///
/// Any structural problem or signature mismatch is a uniform
/// [`AuthError::InvalidToken`]. The `exp`/`iat` claims are returned but
/// not checked against the wall clock here; that policy belongs to the
/// caller.
pub fn decode_session(token: &str, config: &JwtConfig) -> Result<SessionClaims> {
    let secret = decode_secret(config.secret.expose_secret())?;
    let mut validation = Validation::new(Algorithm::HS512);
    validation.validate_exp = false;
    decode::<SessionClaims>(token, &DecodingKey::from_secret(&secret), &validation)
        .map(|data| data.claims)
        .map_err(|_| AuthError::InvalidToken)
}

fn decode_secret(secret: &str) -> Result<Vec<u8>> {
    BASE64_STANDARD
        .decode(secret)
        .map_err(|e| AuthError::Signing(format!("failed to decode shared secret: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{ChallengeConfig, Network, STRICT_INTERVAL};
    use crate::crypto::keys::{SigningKeypair, VerifyingKeypair};
    use crate::token::Validator;
    use crate::xdr::envelope::TransactionEnvelope;
    use crate::{challenge, sign};
    use secrecy::Secret;

    const T0: u64 = 1_700_000_000;
    const NETWORK: Option<Network> = Some(Network::Test);

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: Secret::new(BASE64_STANDARD.encode("test-secret-key")),
        }
    }

    fn validated_token() -> (Token, String) {
        let issuer = SigningKeypair::random();
        let subject = SigningKeypair::random();
        let clock = FixedClock::new(T0);
        let challenge = challenge::call(
            &issuer,
            60,
            NETWORK,
            &ChallengeConfig::default(),
            &clock,
        )
        .unwrap();
        let signed = sign::call(&subject, &challenge, &issuer.address(), NETWORK).unwrap();
        let envelope = TransactionEnvelope::decode(&signed).unwrap();
        let validator = Validator {
            network: NETWORK,
            strict_interval: STRICT_INTERVAL,
            clock: &clock,
        };
        let token = validator
            .validate(
                &envelope,
                &VerifyingKeypair::from_address(&issuer.address()).unwrap(),
                &VerifyingKeypair::from_address(&subject.address()).unwrap(),
                true,
            )
            .unwrap();
        (token, subject.address())
    }

    #[test]
    fn test_round_trip_fidelity() {
        let (token, subject_address) = validated_token();
        let config = test_config();

        let mut extra = Map::new();
        extra.insert("role".to_string(), json!("admin"));
        let encoded = encode_session(&token, &config, Some(&extra)).unwrap();
        let claims = decode_session(&encoded, &config).unwrap();

        assert_eq!(claims.sub, subject_address);
        assert_eq!(claims.jti, token.hash_hex());
        assert_eq!(claims.iat, T0);
        assert_eq!(claims.exp, T0 + 60);
        assert_eq!(claims.extra.get("role"), Some(&json!("admin")));
    }

    #[test]
    fn test_extra_claims_win_on_collision() {
        let (token, _) = validated_token();
        let config = test_config();

        let mut extra = Map::new();
        extra.insert("sub".to_string(), json!("someone-else"));
        let encoded = encode_session(&token, &config, Some(&extra)).unwrap();
        let claims = decode_session(&encoded, &config).unwrap();
        assert_eq!(claims.sub, "someone-else");
    }

    #[test]
    fn test_decode_leaves_expiry_to_the_caller() {
        // The challenge window lies in the past relative to the real
        // clock; decoding still succeeds and hands the caller the claims.
        let (token, _) = validated_token();
        let config = test_config();
        let encoded = encode_session(&token, &config, None).unwrap();
        let claims = decode_session(&encoded, &config).unwrap();
        assert_eq!(claims.exp, T0 + 60);
    }

    #[test]
    fn test_tampered_signature_segment_is_rejected() {
        let (token, _) = validated_token();
        let config = test_config();
        let encoded = encode_session(&token, &config, None).unwrap();

        let dot = encoded.rfind('.').unwrap();
        let mut tampered = encoded.clone();
        let replacement = if tampered.as_bytes()[dot + 1] == b'A' { "B" } else { "A" };
        tampered.replace_range(dot + 1..dot + 2, replacement);

        assert!(matches!(
            decode_session(&tampered, &config),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let (token, _) = validated_token();
        let encoded = encode_session(&token, &test_config(), None).unwrap();
        let other = JwtConfig {
            secret: Secret::new(BASE64_STANDARD.encode("a-different-secret")),
        };
        assert!(matches!(
            decode_session(&encoded, &other),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn test_malformed_token_is_rejected() {
        let config = test_config();
        assert!(matches!(
            decode_session("", &config),
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            decode_session("one.two", &config),
            Err(AuthError::InvalidToken)
        ));
    }
}
