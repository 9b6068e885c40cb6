//! Key material for the two protocol parties.
//!
//! [`SigningKeypair`] holds a secret seed and can both sign and verify;
//! [`VerifyingKeypair`] is derived from a public address and can only
//! verify. Operations that must produce a signature take the signing type,
//! so the capability split is enforced at compile time.

use ed25519_dalek::{Signature, Signer, SigningKey, Verifier, VerifyingKey};
use rand::Rng;

use crate::{
    crypto::strkey,
    error::{AuthError, Result},
    xdr::envelope::DecoratedSignature,
};

/// A full ed25519 keypair derived from an encoded secret seed.
pub struct SigningKeypair {
    secret: SigningKey,
    public: VerifyingKey,
}

/// A verify-only identity derived from an encoded public address.
pub struct VerifyingKeypair {
    public: VerifyingKey,
}

impl SigningKeypair {
    /// Derive a keypair from a canonical encoded secret seed (`S...`).
    ///
    /// Derivation is deterministic; anything that is not a well-formed
    /// seed fails with [`AuthError::KeyDerivation`]. Arbitrary passphrases
    /// are deliberately not hashed into seeds.
    ///
    /// # Example
    /// ```rust
    /// use stellar_challenge_jwt::SigningKeypair;
    ///
    /// let keypair = SigningKeypair::random();
    /// let restored = SigningKeypair::from_seed(&keypair.seed()).unwrap();
    /// assert_eq!(keypair.address(), restored.address());
    /// ```
    pub fn from_seed(seed: &str) -> Result<Self> {
        if seed.trim().is_empty() {
            return Err(AuthError::KeyDerivation("seed is empty".to_string()));
        }
        let bytes = strkey::decode(strkey::VERSION_ED25519_SEED, seed)?;
        let secret = SigningKey::from_bytes(&bytes);
        let public = secret.verifying_key();
        Ok(Self { secret, public })
    }

    /// Generate a fresh keypair from the thread RNG.
    pub fn random() -> Self {
        let bytes: [u8; 32] = rand::thread_rng().gen();
        let secret = SigningKey::from_bytes(&bytes);
        let public = secret.verifying_key();
        Self { secret, public }
    }

    /// The canonical encoded secret seed (`S...`).
    pub fn seed(&self) -> String {
        strkey::encode(strkey::VERSION_ED25519_SEED, &self.secret.to_bytes())
    }

    /// The canonical encoded public address (`G...`).
    pub fn address(&self) -> String {
        strkey::encode(strkey::VERSION_ED25519_PUBLIC, &self.public.to_bytes())
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.public
    }

    /// Advisory signature hint: the trailing 4 bytes of the public key.
    pub fn hint(&self) -> [u8; 4] {
        hint_of(&self.public)
    }

    /// Sign a digest, returning the raw 64-byte signature.
    pub fn sign(&self, digest: &[u8]) -> [u8; 64] {
        self.secret.sign(digest).to_bytes()
    }

    /// Sign a digest and pair the signature with this key's hint.
    pub fn sign_decorated(&self, digest: &[u8]) -> DecoratedSignature {
        DecoratedSignature {
            hint: self.hint(),
            signature: self.sign(digest).to_vec(),
        }
    }

    /// Check a signature over a digest. Pure; returns `false` on any
    /// mismatch or malformed signature instead of erroring.
    pub fn verify(&self, digest: &[u8], signature: &[u8]) -> bool {
        verify_digest(&self.public, digest, signature)
    }
}

impl VerifyingKeypair {
    /// Derive a verify-only identity from an encoded public address
    /// (`G...`). Empty or malformed addresses fail with
    /// [`AuthError::KeyDerivation`].
    pub fn from_address(address: &str) -> Result<Self> {
        if address.trim().is_empty() {
            return Err(AuthError::KeyDerivation("address is empty".to_string()));
        }
        let bytes = strkey::decode(strkey::VERSION_ED25519_PUBLIC, address)?;
        let public = VerifyingKey::from_bytes(&bytes).map_err(|e| {
            AuthError::KeyDerivation(format!("not a valid ed25519 public key: {e}"))
        })?;
        Ok(Self { public })
    }

    /// The canonical encoded public address (`G...`).
    pub fn address(&self) -> String {
        strkey::encode(strkey::VERSION_ED25519_PUBLIC, &self.public.to_bytes())
    }

    pub fn public_key(&self) -> &VerifyingKey {
        &self.public
    }

    /// Advisory signature hint: the trailing 4 bytes of the public key.
    pub fn hint(&self) -> [u8; 4] {
        hint_of(&self.public)
    }

    /// Check a signature over a digest. Pure; returns `false` on any
    /// mismatch or malformed signature instead of erroring.
    pub fn verify(&self, digest: &[u8], signature: &[u8]) -> bool {
        verify_digest(&self.public, digest, signature)
    }
}

impl From<&SigningKeypair> for VerifyingKeypair {
    fn from(keypair: &SigningKeypair) -> Self {
        Self {
            public: keypair.public,
        }
    }
}

fn hint_of(public: &VerifyingKey) -> [u8; 4] {
    let bytes = public.to_bytes();
    let mut hint = [0u8; 4];
    hint.copy_from_slice(&bytes[28..]);
    hint
}

fn verify_digest(public: &VerifyingKey, digest: &[u8], signature: &[u8]) -> bool {
    let Ok(signature) = Signature::from_slice(signature) else {
        return false;
    };
    public.verify(digest, &signature).is_ok()
}
