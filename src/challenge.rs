//! Server-side challenge construction.
//!
//! A challenge is a syntactically valid transaction that exists only to be
//! signed: one placeholder payment from the issuer back to itself, a memo
//! tagging it as an authentication challenge, and a time-bound window. The
//! issuer signs the digest before the envelope leaves the server, so the
//! client can prove who built it.

use rand::Rng;

use crate::{
    clock::Clock,
    config::{ChallengeConfig, Network},
    crypto::keys::SigningKeypair,
    error::Result,
    xdr::envelope::{
        AccountId, Memo, Operation, OperationBody, PaymentOp, TimeBounds, Transaction,
        TransactionEnvelope,
    },
};

/// Sequence numbers are drawn from a narrow band below this ceiling,
/// deliberately offset from any plausible live account sequence. The
/// challenge is never submitted to the ledger, so the thread RNG is
/// enough here; it is not suitable for keys or replay nonces.
const SEQUENCE_CEILING: i64 = 99_999_999;
const SEQUENCE_BAND: i64 = 65_536;

/// Build a fresh challenge signed by the issuer and return its transport
/// string.
///
/// An `expires_in` below one second falls back to
/// [`ChallengeConfig::default_expires_in`]. The validity window is
/// `[now, now + expires_in]`, inclusive on both ends, in whole seconds.
pub fn call(
    issuer: &SigningKeypair,
    expires_in: i64,
    network: Option<Network>,
    config: &ChallengeConfig,
    clock: &dyn Clock,
) -> Result<String> {
    let expires_in = if expires_in < 1 {
        config.default_expires_in
    } else {
        expires_in
    };
    let now = clock.unix_time();
    let issuer_account = AccountId(issuer.public_key().to_bytes());

    let tx = Transaction {
        source_account: issuer_account,
        fee: config.base_fee,
        seq_num: random_sequence(),
        time_bounds: Some(TimeBounds {
            min_time: now,
            max_time: now + expires_in as u64,
        }),
        memo: Memo::text(&config.memo_text)?,
        operations: vec![Operation {
            source_account: None,
            body: OperationBody::Payment(PaymentOp {
                destination: issuer_account,
                amount: config.payment_amount,
            }),
        }],
    };

    let mut envelope = TransactionEnvelope {
        tx,
        signatures: Vec::new(),
    };
    let digest = envelope.signature_digest(network)?;
    envelope.signatures.push(issuer.sign_decorated(&digest));
    Ok(envelope.encode())
}

fn random_sequence() -> i64 {
    SEQUENCE_CEILING - rand::thread_rng().gen_range(0..SEQUENCE_BAND)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::config::CHALLENGE_EXPIRES_IN;
    use crate::error::AuthError;

    const T0: u64 = 1_700_000_000;

    fn build(expires_in: i64) -> TransactionEnvelope {
        let issuer = SigningKeypair::random();
        build_for(&issuer, expires_in)
    }

    fn build_for(issuer: &SigningKeypair, expires_in: i64) -> TransactionEnvelope {
        let clock = FixedClock::new(T0);
        let encoded = call(
            issuer,
            expires_in,
            Some(Network::Test),
            &ChallengeConfig::default(),
            &clock,
        )
        .unwrap();
        TransactionEnvelope::decode(&encoded).unwrap()
    }

    #[test]
    fn test_window_matches_expires_in() {
        let envelope = build(60);
        let bounds = envelope.tx.time_bounds.unwrap();
        assert_eq!(bounds.min_time, T0);
        assert_eq!(bounds.max_time - bounds.min_time, 60);
    }

    #[test]
    fn test_zero_expiry_falls_back_to_default() {
        let envelope = build(0);
        let bounds = envelope.tx.time_bounds.unwrap();
        assert_eq!(
            bounds.max_time - bounds.min_time,
            CHALLENGE_EXPIRES_IN as u64
        );
    }

    #[test]
    fn test_negative_expiry_falls_back_to_default() {
        let envelope = build(-5);
        let bounds = envelope.tx.time_bounds.unwrap();
        assert_eq!(
            bounds.max_time - bounds.min_time,
            CHALLENGE_EXPIRES_IN as u64
        );
    }

    #[test]
    fn test_carries_memo_and_single_self_payment() {
        let issuer = SigningKeypair::random();
        let envelope = build_for(&issuer, 60);
        assert_eq!(
            envelope.tx.memo,
            Memo::Text("Challenge authentication".to_string())
        );
        assert_eq!(envelope.tx.operations.len(), 1);
        let OperationBody::Payment(payment) = envelope.tx.operations[0].body;
        assert_eq!(payment.amount, 10);
        assert_eq!(payment.destination, envelope.tx.source_account);
        assert_eq!(
            envelope.tx.source_account,
            AccountId(issuer.public_key().to_bytes())
        );
    }

    #[test]
    fn test_signed_by_issuer_only() {
        let issuer = SigningKeypair::random();
        let envelope = build_for(&issuer, 60);
        let digest = envelope.signature_digest(Some(Network::Test)).unwrap();

        assert_eq!(envelope.signatures.len(), 1);
        assert!(issuer.verify(&digest, &envelope.signatures[0].signature));

        let impostor = SigningKeypair::random();
        assert!(!impostor.verify(&digest, &envelope.signatures[0].signature));
    }

    #[test]
    fn test_sequence_stays_in_band() {
        let envelope = build(60);
        let seq = envelope.tx.seq_num;
        assert!(seq > SEQUENCE_CEILING - SEQUENCE_BAND && seq <= SEQUENCE_CEILING);
    }

    #[test]
    fn test_fails_closed_without_network() {
        let issuer = SigningKeypair::random();
        let clock = FixedClock::new(T0);
        let result = call(&issuer, 60, None, &ChallengeConfig::default(), &clock);
        assert!(matches!(result, Err(AuthError::UnconfiguredNetwork)));
    }
}
