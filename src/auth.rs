use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    challenge,
    clock::{Clock, SystemClock},
    config::{ChallengeConfig, JwtConfig, Network},
    crypto::{
        jwt::{decode_session, encode_session, SessionClaims},
        keys::{SigningKeypair, VerifyingKeypair},
    },
    error::{AuthError, Result},
    sign,
    token::{Token, Validator},
    xdr::envelope::TransactionEnvelope,
};

/// Authentication service for challenge-transaction authentication
///
/// This service ties the protocol steps together:
/// - Challenge construction, signed by the issuer
/// - Client-side counter-signing of a received challenge
/// - Two-party validation of the completed round trip
/// - Session token issuance and validation
///
/// The service is stateless: challenges are self-describing (signed and
/// time-boxed), so no challenge store is required. Developers handle
/// session persistence in their own systems.
pub struct AuthService {
    /// Network the signature digest is scoped to. `None` fails every
    /// digest computation closed.
    pub network: Option<Network>,
    pub challenge_config: ChallengeConfig,
    pub jwt_config: JwtConfig,
    clock: Arc<dyn Clock>,
}

/// Request structure for authenticating with a completed challenge
///
/// Carries what the server needs to verify a client's identity: the
/// two-signature envelope and the address the client claims to control.
#[derive(Serialize, Deserialize)]
pub struct AuthRequest {
    /// The counter-signed challenge, base64 encoded
    pub signed_challenge: String,
    /// The account address that claims to have counter-signed it
    pub subject_address: String,
}

/// Response structure containing authentication results
///
/// Returned after successful validation, contains the session token for
/// subsequent API requests plus the facts the caller usually persists.
#[derive(Serialize, Deserialize)]
pub struct AuthResponse {
    pub session_token: String,
    pub subject_address: String,
    /// Lowercase hex content hash of the validated challenge (also the
    /// token's `jti`)
    pub challenge_hash: String,
    /// Upper bound of the challenge window (Unix seconds)
    pub expires_at: u64,
}

impl AuthService {
    /// Create a new authentication service.
    ///
    /// # Arguments
    /// * `network` - Result of [`Network::from_name`]; pass `None` through
    ///   unchanged so misconfiguration fails closed instead of guessing
    /// * `jwt_config` - Session token secret configuration
    ///
    /// # Example
    /// ```rust
    /// use stellar_challenge_jwt::{AuthService, JwtConfig, Network};
    /// use secrecy::Secret;
    /// use base64::prelude::*;
    ///
    /// let jwt_config = JwtConfig {
    ///     secret: Secret::new(BASE64_STANDARD.encode("your-secret")),
    /// };
    /// let service = AuthService::new(Network::from_name("test"), jwt_config);
    /// ```
    pub fn new(network: Option<Network>, jwt_config: JwtConfig) -> Self {
        Self {
            network,
            challenge_config: ChallengeConfig::default(),
            jwt_config,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock. Tests use this to freeze and advance time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Build a fresh challenge signed by the issuer.
    ///
    /// The returned transport string is what the server hands to the
    /// client. An `expires_in` below one second falls back to the
    /// configured default (24 hours).
    ///
    /// # Errors
    /// - `UnconfiguredNetwork` - No network selected
    /// - `Decode` - The configured memo text does not fit the wire format
    pub fn build_challenge(&self, issuer: &SigningKeypair, expires_in: i64) -> Result<String> {
        challenge::call(
            issuer,
            expires_in,
            self.network,
            &self.challenge_config,
            &*self.clock,
        )
    }

    /// Counter-sign a received challenge after checking it really came
    /// from the expected issuer.
    ///
    /// # Errors
    /// - `Decode` - Malformed transport string
    /// - `KeyDerivation` - Malformed issuer address
    /// - `InvalidSignature` - The challenge was not signed by the issuer
    pub fn sign_challenge(
        &self,
        subject: &SigningKeypair,
        challenge: &str,
        issuer_address: &str,
    ) -> Result<String> {
        sign::call(subject, challenge, issuer_address, self.network)
    }

    /// Validate a completed round trip and return the proof token.
    ///
    /// With `strict` set, the round trip must arrive within the
    /// configured freshness interval after issuance, not just within the
    /// full challenge window.
    pub fn validate_challenge(
        &self,
        signed_challenge: &str,
        issuer_address: &str,
        subject_address: &str,
        strict: bool,
    ) -> Result<Token> {
        let envelope = TransactionEnvelope::decode(signed_challenge)?;
        let issuer = VerifyingKeypair::from_address(issuer_address)?;
        let subject = VerifyingKeypair::from_address(subject_address)?;
        let validator = Validator {
            network: self.network,
            strict_interval: self.challenge_config.strict_interval,
            clock: &*self.clock,
        };
        validator.validate(&envelope, &issuer, &subject, strict)
    }

    /// Encode a validated token as a session credential, merging any
    /// extra claims over the base claim set (extra wins on collision).
    pub fn issue_session(
        &self,
        token: &Token,
        extra: Option<&Map<String, Value>>,
    ) -> Result<String> {
        encode_session(token, &self.jwt_config, extra)
    }

    /// The full server-side authentication step: strict validation of the
    /// completed challenge followed by session token issuance.
    ///
    /// # Example
    /// ```rust
    /// use stellar_challenge_jwt::{AuthRequest, AuthService, JwtConfig, Network, SigningKeypair};
    /// use secrecy::Secret;
    /// use base64::prelude::*;
    ///
    /// let service = AuthService::new(
    ///     Network::from_name("test"),
    ///     JwtConfig {
    ///         secret: Secret::new(BASE64_STANDARD.encode("shared-secret")),
    ///     },
    /// );
    /// let issuer = SigningKeypair::random();
    /// let subject = SigningKeypair::random();
    ///
    /// // server -> client -> server
    /// let challenge = service.build_challenge(&issuer, 300).unwrap();
    /// let signed = service
    ///     .sign_challenge(&subject, &challenge, &issuer.address())
    ///     .unwrap();
    ///
    /// let request = AuthRequest {
    ///     signed_challenge: signed,
    ///     subject_address: subject.address(),
    /// };
    /// let response = service.authenticate(&issuer.address(), &request, None).unwrap();
    /// assert_eq!(response.subject_address, subject.address());
    /// ```
    pub fn authenticate(
        &self,
        issuer_address: &str,
        request: &AuthRequest,
        extra: Option<&Map<String, Value>>,
    ) -> Result<AuthResponse> {
        let token = self.validate_challenge(
            &request.signed_challenge,
            issuer_address,
            &request.subject_address,
            true,
        )?;
        let session_token = encode_session(&token, &self.jwt_config, extra)?;
        Ok(AuthResponse {
            session_token,
            subject_address: token.subject_address().to_string(),
            challenge_hash: token.hash_hex(),
            expires_at: token.time_bounds().max_time,
        })
    }

    /// Validate a session token and return its claims.
    ///
    /// Signature and structure are verified here; checking `exp` against
    /// the wall clock stays with the caller.
    pub fn validate_session(&self, token: &str) -> Result<SessionClaims> {
        if token.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        decode_session(token, &self.jwt_config)
    }
}
