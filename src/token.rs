//! Server-side validation of a completed challenge round trip.
//!
//! The completed artifact must carry time bounds and exactly two
//! signatures over the same digest, one per party. Window checks are
//! inclusive on both ends; strict mode additionally bounds how long after
//! issuance a finished round trip is still accepted, which shrinks the
//! replay surface for an intercepted artifact.

use crate::{
    clock::Clock,
    config::Network,
    crypto::keys::VerifyingKeypair,
    error::{AuthError, Result},
    xdr::envelope::{TimeBounds, TransactionEnvelope},
};

/// Validation context: network scope, freshness interval, clock.
pub struct Validator<'a> {
    pub network: Option<Network>,
    pub strict_interval: u64,
    pub clock: &'a dyn Clock,
}

/// Proof that a challenge passed two-party validation.
///
/// Immutable; exposes the subject the session belongs to and a stable
/// content hash over the artifact's canonical bytes.
pub struct Token {
    issuer_address: String,
    subject_address: String,
    time_bounds: TimeBounds,
    hash: [u8; 32],
}

impl Validator<'_> {
    /// Check both signatures and the validity window of a completed
    /// challenge.
    ///
    /// Verification failures of any shape count uniformly as "does not
    /// verify" — a malformed signature is treated exactly like a wrong
    /// one.
    pub fn validate(
        &self,
        envelope: &TransactionEnvelope,
        issuer: &VerifyingKeypair,
        subject: &VerifyingKeypair,
        strict: bool,
    ) -> Result<Token> {
        let bounds = envelope
            .tx
            .time_bounds
            .ok_or(AuthError::MissingTimeBounds)?;
        let digest = envelope.signature_digest(self.network)?;

        if envelope.signatures.len() != 2 {
            return Err(AuthError::InvalidSignature(format!(
                "expected exactly 2 signatures, found {}",
                envelope.signatures.len()
            )));
        }
        let signed_by = |party: &VerifyingKeypair| {
            envelope
                .signatures
                .iter()
                .any(|sig| party.verify(&digest, &sig.signature))
        };
        if !signed_by(issuer) {
            return Err(AuthError::InvalidSignature(
                "challenge is not signed by the issuer".to_string(),
            ));
        }
        if !signed_by(subject) {
            return Err(AuthError::InvalidSignature(
                "challenge is not signed by the subject".to_string(),
            ));
        }

        let now = self.clock.unix_time();
        if now < bounds.min_time || now > bounds.max_time {
            return Err(AuthError::Expired);
        }
        if strict && now > bounds.min_time + self.strict_interval {
            return Err(AuthError::TooOld);
        }

        Ok(Token {
            issuer_address: issuer.address(),
            subject_address: subject.address(),
            time_bounds: bounds,
            hash: envelope.content_hash(),
        })
    }
}

impl Token {
    /// Content hash of the validated artifact as raw bytes.
    pub fn hash_bytes(&self) -> [u8; 32] {
        self.hash
    }

    /// Content hash of the validated artifact as lowercase hex.
    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    /// The account the session is being issued for.
    pub fn subject_address(&self) -> &str {
        &self.subject_address
    }

    /// The party that issued the challenge.
    pub fn issuer_address(&self) -> &str {
        &self.issuer_address
    }

    /// The validated artifact's validity window.
    pub fn time_bounds(&self) -> TimeBounds {
        self.time_bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::{ChallengeConfig, STRICT_INTERVAL};
    use crate::crypto::keys::SigningKeypair;
    use crate::{challenge, sign};

    const T0: u64 = 1_700_000_000;
    const NETWORK: Option<Network> = Some(Network::Test);

    struct Fixture {
        issuer: SigningKeypair,
        subject: SigningKeypair,
        envelope: TransactionEnvelope,
        clock: FixedClock,
    }

    fn completed_challenge(expires_in: i64) -> Fixture {
        let issuer = SigningKeypair::random();
        let subject = SigningKeypair::random();
        let clock = FixedClock::new(T0);
        let challenge = challenge::call(
            &issuer,
            expires_in,
            NETWORK,
            &ChallengeConfig::default(),
            &clock,
        )
        .unwrap();
        let signed = sign::call(&subject, &challenge, &issuer.address(), NETWORK).unwrap();
        Fixture {
            envelope: TransactionEnvelope::decode(&signed).unwrap(),
            issuer,
            subject,
            clock,
        }
    }

    fn validate(fixture: &Fixture, strict: bool) -> Result<Token> {
        let validator = Validator {
            network: NETWORK,
            strict_interval: STRICT_INTERVAL,
            clock: &fixture.clock,
        };
        validator.validate(
            &fixture.envelope,
            &VerifyingKeypair::from(&fixture.issuer),
            &VerifyingKeypair::from_address(&fixture.subject.address()).unwrap(),
            strict,
        )
    }

    #[test]
    fn test_valid_round_trip_passes_strict() {
        let fixture = completed_challenge(60);
        let token = validate(&fixture, true).unwrap();
        assert_eq!(token.subject_address(), fixture.subject.address());
        assert_eq!(token.issuer_address(), fixture.issuer.address());
        assert_eq!(token.time_bounds().min_time, T0);
        assert_eq!(token.time_bounds().max_time, T0 + 60);
    }

    #[test]
    fn test_window_is_inclusive_on_both_ends() {
        let fixture = completed_challenge(60);
        fixture.clock.set(T0);
        assert!(validate(&fixture, false).is_ok());
        fixture.clock.set(T0 + 60);
        assert!(validate(&fixture, false).is_ok());
    }

    #[test]
    fn test_expired_outside_window() {
        let fixture = completed_challenge(60);
        fixture.clock.set(T0 - 1);
        assert!(matches!(validate(&fixture, false), Err(AuthError::Expired)));
        fixture.clock.set(T0 + 61);
        assert!(matches!(validate(&fixture, false), Err(AuthError::Expired)));
    }

    #[test]
    fn test_strict_freshness_window() {
        let fixture = completed_challenge(60);
        fixture.clock.set(T0 + 5);
        assert!(validate(&fixture, true).is_ok());

        // Still inside the full window, but past the freshness interval.
        fixture.clock.set(T0 + 15);
        assert!(matches!(validate(&fixture, true), Err(AuthError::TooOld)));
        assert!(validate(&fixture, false).is_ok());
    }

    #[test]
    fn test_missing_time_bounds() {
        let mut fixture = completed_challenge(60);
        fixture.envelope.tx.time_bounds = None;
        assert!(matches!(
            validate(&fixture, true),
            Err(AuthError::MissingTimeBounds)
        ));
    }

    #[test]
    fn test_rejects_single_signature() {
        let mut fixture = completed_challenge(60);
        fixture.envelope.signatures.pop();
        assert!(matches!(
            validate(&fixture, true),
            Err(AuthError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_rejects_tampered_signature() {
        let mut fixture = completed_challenge(60);
        fixture.envelope.signatures[1].signature[10] ^= 0x01;
        assert!(matches!(
            validate(&fixture, true),
            Err(AuthError::InvalidSignature(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_subject() {
        let fixture = completed_challenge(60);
        let validator = Validator {
            network: NETWORK,
            strict_interval: STRICT_INTERVAL,
            clock: &fixture.clock,
        };
        let other = SigningKeypair::random();
        let result = validator.validate(
            &fixture.envelope,
            &VerifyingKeypair::from_address(&fixture.issuer.address()).unwrap(),
            &VerifyingKeypair::from_address(&other.address()).unwrap(),
            true,
        );
        assert!(matches!(result, Err(AuthError::InvalidSignature(_))));
    }

    #[test]
    fn test_fails_closed_without_network() {
        let fixture = completed_challenge(60);
        let validator = Validator {
            network: None,
            strict_interval: STRICT_INTERVAL,
            clock: &fixture.clock,
        };
        let result = validator.validate(
            &fixture.envelope,
            &VerifyingKeypair::from_address(&fixture.issuer.address()).unwrap(),
            &VerifyingKeypair::from_address(&fixture.subject.address()).unwrap(),
            true,
        );
        assert!(matches!(result, Err(AuthError::UnconfiguredNetwork)));
    }

    #[test]
    fn test_hash_is_stable_and_tamper_sensitive() {
        let fixture = completed_challenge(60);
        let token = validate(&fixture, true).unwrap();
        let again = validate(&fixture, true).unwrap();
        assert_eq!(token.hash_bytes(), again.hash_bytes());
        assert_eq!(token.hash_hex(), hex::encode(token.hash_bytes()));

        // Any byte change, including inside a signature, moves the hash.
        // A flipped signature no longer verifies, so compare at the
        // envelope level.
        let mut tampered = fixture.envelope.clone();
        tampered.signatures[0].signature[0] ^= 0x01;
        assert_ne!(tampered.content_hash(), token.hash_bytes());
    }
}
