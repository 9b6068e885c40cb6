//! Client-side counter-signing of a received challenge.
//!
//! Before adding its own signature the client checks that the envelope
//! really was issued by the party it expects: exactly one signature,
//! verifying against the issuer's public key over the envelope's digest.
//! Anything else is treated as a forged or replayed challenge.

use crate::{
    config::Network,
    crypto::keys::{SigningKeypair, VerifyingKeypair},
    error::{AuthError, Result},
    xdr::envelope::TransactionEnvelope,
};

/// Verify the issuer's signature on a challenge, append the subject's own,
/// and return the re-encoded transport string.
///
/// The issuer's signature stays first and the subject's second; the order
/// only matters for deterministic re-encoding, not for verification.
pub fn call(
    subject: &SigningKeypair,
    challenge: &str,
    issuer_address: &str,
    network: Option<Network>,
) -> Result<String> {
    let mut envelope = TransactionEnvelope::decode(challenge)?;
    let issuer = VerifyingKeypair::from_address(issuer_address)?;
    let digest = envelope.signature_digest(network)?;

    let issued_correctly = envelope.signatures.len() == 1
        && issuer.verify(&digest, &envelope.signatures[0].signature);
    if !issued_correctly {
        return Err(AuthError::InvalidSignature(
            "challenge was not signed by the expected issuer".to_string(),
        ));
    }

    envelope.signatures.push(subject.sign_decorated(&digest));
    Ok(envelope.encode())
}
