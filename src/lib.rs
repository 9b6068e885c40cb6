//! # stellar-challenge-jwt
//!
//! A Rust library for **challenge-transaction authentication** with **JWT
//! session management**. A client proves control of a ledger account key
//! pair without moving funds: the server issues a single-use, time-boxed,
//! self-signed challenge transaction; the client counter-signs it; the
//! server verifies both signatures and the time window and issues a
//! short-lived session token.
//!
//! ## Features
//!
//! - **Challenge transactions** - Syntactically valid, never-submitted
//!   envelopes in the ledger's wire format, base64 over the transport
//! - **Two-party ed25519 verification** - Issuer and subject signatures
//!   over a network-scoped digest
//! - **Time-window enforcement** - Inclusive validity window plus a
//!   strict freshness interval that shrinks the replay surface
//! - **Flexible JWT sessions** - HS512 tokens under a shared secret that
//!   is independent of any ledger key
//! - **Stateless design** - Challenges are self-describing; no built-in
//!   storage
//! - **Fail-closed error handling** - Typed errors on every path; no
//!   panics on untrusted input
//!
//! ## Quick Start
//!
//! ```rust
//! use stellar_challenge_jwt::{AuthRequest, AuthService, JwtConfig, Network, SigningKeypair};
//! use secrecy::Secret;
//! use base64::prelude::*;
//!
//! // Setup: the network scope comes from configuration; an unrecognized
//! // name leaves it unset and every digest computation fails closed.
//! let service = AuthService::new(
//!     Network::from_name("test"),
//!     JwtConfig {
//!         secret: Secret::new(BASE64_STANDARD.encode("your-secret-key")),
//!     },
//! );
//!
//! let issuer = SigningKeypair::random();
//! let subject = SigningKeypair::random();
//!
//! // 1. Server builds a challenge and sends it to the client.
//! let challenge = service.build_challenge(&issuer, 300).unwrap();
//!
//! // 2. Client checks the issuer's signature and counter-signs.
//! let signed = service
//!     .sign_challenge(&subject, &challenge, &issuer.address())
//!     .unwrap();
//!
//! // 3. Server validates both signatures and the window, then issues a
//! //    session token.
//! let request = AuthRequest {
//!     signed_challenge: signed,
//!     subject_address: subject.address(),
//! };
//! let response = service.authenticate(&issuer.address(), &request, None).unwrap();
//!
//! // 4. Later requests present the session token.
//! let claims = service.validate_session(&response.session_token).unwrap();
//! assert_eq!(claims.sub, subject.address());
//! ```
//!
//! ## Examples
//!
//! See the basic_workflow example for a complete authentication flow:
//!
//! ```bash
//! cargo run --example basic_workflow
//! ```

pub mod auth;
pub mod challenge;
pub mod clock;
pub mod config;
pub mod crypto;
pub mod error;
pub mod sign;
pub mod token;
pub mod xdr;

// Re-export main types for easier access
pub use auth::{AuthRequest, AuthResponse, AuthService};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ChallengeConfig, JwtConfig, Network};
pub use crypto::jwt::{decode_session, encode_session, SessionClaims};
pub use crypto::keys::{SigningKeypair, VerifyingKeypair};
pub use error::{AuthError, Result};
pub use token::{Token, Validator};
pub use xdr::envelope::{TimeBounds, TransactionEnvelope};
