pub mod jwt;
pub mod keys;
pub mod strkey;

// Re-export main types for easier access
pub use keys::{SigningKeypair, VerifyingKeypair};
