use std::fmt;

/// Authentication and protocol errors
///
/// Every operation in this crate returns a [`Result`] built on this enum;
/// nothing aborts the process, no matter how malformed the input. Callers
/// (typically an HTTP layer) decide how each variant maps to a response.
///
/// # Example
/// ```rust
/// use stellar_challenge_jwt::{AuthError, Result};
///
/// fn handle_auth_result(result: Result<()>) {
///     match result {
///         Ok(()) => println!("Operation successful"),
///         Err(AuthError::InvalidSignature(msg)) => println!("Signature error: {}", msg),
///         Err(AuthError::Expired) => println!("Challenge has expired"),
///         Err(e) => println!("Other error: {}", e),
///     }
/// }
/// ```
#[derive(Debug)]
pub enum AuthError {
    /// Transport string could not be decoded into a transaction envelope
    ///
    /// This error occurs when:
    /// - The input is not valid base64
    /// - The binary envelope is truncated or carries trailing bytes
    /// - A union discriminant or length field is outside the wire format
    Decode(String),

    /// Key material could not be derived from the given seed or address
    ///
    /// This error occurs when:
    /// - The seed is empty or not a canonical encoded secret seed
    /// - The address is empty or not a canonical encoded public key
    /// - The checksum or version byte of the encoding is wrong
    KeyDerivation(String),

    /// A signature digest was requested before a network was selected
    ///
    /// The digest is scoped to a network passphrase. Computing it without
    /// one would silently sign for the wrong network, so the operation
    /// fails closed instead.
    UnconfiguredNetwork,

    /// A required signature is missing or does not verify
    ///
    /// This error occurs when:
    /// - A challenge does not carry exactly the expected signatures
    /// - A signature fails verification against the claimed public key
    /// - The challenge was not issued by the expected party
    InvalidSignature(String),

    /// The challenge transaction carries no time bounds
    MissingTimeBounds,

    /// The current time is outside the challenge's validity window
    Expired,

    /// Strict mode: the challenge was issued too long ago
    ///
    /// The signed round trip arrived after the freshness interval even
    /// though the full validity window is still open.
    TooOld,

    /// Session token creation failed
    ///
    /// This error occurs when:
    /// - The shared secret cannot be decoded
    /// - Claim serialization or JWT signing fails
    Signing(String),

    /// Session token is invalid, malformed, or has a wrong signature
    InvalidToken,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Decode(msg) => {
                write!(f, "Failed to decode transaction envelope: {msg}")
            }
            AuthError::KeyDerivation(msg) => {
                write!(f, "Failed to derive key material: {msg}")
            }
            AuthError::UnconfiguredNetwork => {
                write!(f, "No network selected; set the network to `test` or `public`")
            }
            AuthError::InvalidSignature(msg) => {
                write!(f, "Signature verification failed: {msg}")
            }
            AuthError::MissingTimeBounds => {
                write!(f, "Challenge transaction carries no time bounds")
            }
            AuthError::Expired => {
                write!(f, "Challenge transaction has expired")
            }
            AuthError::TooOld => {
                write!(f, "Challenge transaction is too old")
            }
            AuthError::Signing(msg) => {
                write!(f, "Failed to sign session token: {msg}")
            }
            AuthError::InvalidToken => {
                write!(f, "Invalid or malformed session token")
            }
        }
    }
}

impl std::error::Error for AuthError {}

pub type Result<T> = std::result::Result<T, AuthError>;
