use secrecy::Secret;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Default challenge lifetime in seconds (24 hours).
pub const CHALLENGE_EXPIRES_IN: i64 = 60 * 60 * 24;

/// Default strict-mode freshness interval in seconds.
pub const STRICT_INTERVAL: u64 = 10;

/// Default per-operation fee carried by the challenge transaction.
pub const BASE_FEE: u32 = 100;

/// Default payment amount in stroops (`0.000001` native units). The
/// payment only exists to make the challenge a syntactically valid
/// transaction; it is never submitted.
pub const PAYMENT_AMOUNT: i64 = 10;

/// Default memo text tagging the transaction as an authentication
/// challenge. Must fit the 28-byte memo limit.
pub const MEMO_TEXT: &str = "Challenge authentication";

/// The ledger network a signature digest is scoped to
///
/// The digest of a challenge transaction mixes in the hash of the network
/// passphrase, so a signature produced for one network never verifies on
/// the other. The selector is an explicit value passed into every digest
/// computation; operations handed `None` instead fail with
/// [`AuthError::UnconfiguredNetwork`](crate::AuthError::UnconfiguredNetwork)
/// rather than guessing.
///
/// # Example
/// ```rust
/// use stellar_challenge_jwt::Network;
///
/// let network = std::env::var("STELLAR_NETWORK")
///     .ok()
///     .and_then(|name| Network::from_name(&name));
/// assert!(Network::from_name("test").is_some());
/// assert!(Network::from_name("mainnet-ish").is_none());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Network {
    /// The public test network.
    Test,
    /// The public production network.
    Public,
}

impl Network {
    /// Select a network from a configuration value.
    ///
    /// Only the two well-known names are accepted; anything else returns
    /// `None`, leaving the selector unset so digest computation fails
    /// closed.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "test" => Some(Network::Test),
            "public" => Some(Network::Public),
            _ => None,
        }
    }

    /// The well-known passphrase identifying this network.
    pub fn passphrase(&self) -> &'static str {
        match self {
            Network::Test => "Test SDF Network ; September 2015",
            Network::Public => "Public Global Stellar Network ; September 2015",
        }
    }

    /// The network id: SHA-256 of the passphrase, the first component of
    /// every signature base.
    pub fn id(&self) -> [u8; 32] {
        Sha256::digest(self.passphrase().as_bytes()).into()
    }
}

/// Tunables for challenge construction and validation
///
/// Defaults come from the named constants above; override individual
/// fields to reparameterize the protocol without touching its logic.
#[derive(Clone, Debug)]
pub struct ChallengeConfig {
    /// Memo text attached to every challenge (at most 28 bytes).
    pub memo_text: String,
    /// Amount in stroops for the single placeholder payment.
    pub payment_amount: i64,
    /// Lifetime substituted when a caller asks for less than one second.
    pub default_expires_in: i64,
    /// Fee field of the challenge transaction.
    pub base_fee: u32,
    /// Seconds after issuance during which a completed round trip is
    /// accepted in strict mode.
    pub strict_interval: u64,
}

impl Default for ChallengeConfig {
    fn default() -> Self {
        Self {
            memo_text: MEMO_TEXT.to_string(),
            payment_amount: PAYMENT_AMOUNT,
            default_expires_in: CHALLENGE_EXPIRES_IN,
            base_fee: BASE_FEE,
            strict_interval: STRICT_INTERVAL,
        }
    }
}

/// Configuration for session token creation and validation
///
/// # Security Note
/// The secret is a shared HMAC key, deliberately independent of any ledger
/// key material. For production use, generate at least 256 bits of random
/// data and encode it as base64.
///
/// # Example
/// ```rust
/// use stellar_challenge_jwt::JwtConfig;
/// use secrecy::Secret;
/// use base64::prelude::*;
///
/// let config = JwtConfig {
///     secret: Secret::new(BASE64_STANDARD.encode("your-256-bit-secret-key")),
/// };
/// ```
#[derive(Clone, Debug, Deserialize)]
pub struct JwtConfig {
    /// Session token secret key, base64 encoded string
    ///
    /// Used to sign and verify session tokens. It should be:
    /// - At least 256 bits (32 bytes) of random data
    /// - Base64 encoded
    /// - Kept secure and not committed to version control
    pub secret: Secret<String>,
}
