use crate::{Account, PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};
use once_cell::sync::Lazy;

/// Secret key material
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawKey([u8; 32]);

impl RawKey {
    pub const fn zero() -> Self {
        Self([0; 32])
    }

    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn decode_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s.as_ref(), &mut bytes)?;
        Ok(Self(bytes))
    }
}

impl std::fmt::Debug for RawKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print secret key material
        write!(f, "RawKey(..)")
    }
}

pub struct PrivateKey {
    signing_key: SigningKey,
}

impl PrivateKey {
    pub fn new() -> Self {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        Self {
            signing_key: SigningKey::from_bytes(&bytes),
        }
    }

    pub fn from_bytes(bytes: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(bytes),
        }
    }

    pub fn from_hex(s: impl AsRef<str>) -> anyhow::Result<Self> {
        let raw = RawKey::decode_hex(s)?;
        Ok(Self::from_bytes(raw.as_bytes()))
    }

    pub fn raw_key(&self) -> RawKey {
        RawKey::from_bytes(self.signing_key.to_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_bytes(self.signing_key.verifying_key().to_bytes())
    }

    pub fn account(&self) -> Account {
        self.public_key().into()
    }

    pub fn sign(&self, data: &[u8]) -> Signature {
        Signature::from_bytes(self.signing_key.sign(data).to_bytes())
    }
}

impl Default for PrivateKey {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for PrivateKey {
    fn clone(&self) -> Self {
        Self::from_bytes(&self.signing_key.to_bytes())
    }
}

impl From<u64> for PrivateKey {
    fn from(value: u64) -> Self {
        let mut bytes = [0; 32];
        bytes[..8].copy_from_slice(&value.to_be_bytes());
        Self::from_bytes(&bytes)
    }
}

impl From<RawKey> for PrivateKey {
    fn from(value: RawKey) -> Self {
        Self::from_bytes(value.as_bytes())
    }
}

pub fn sign_message(private_key: &RawKey, data: &[u8]) -> Signature {
    let key = SigningKey::from_bytes(private_key.as_bytes());
    Signature::from_bytes(key.sign(data).to_bytes())
}

pub fn validate_message(
    public_key: &PublicKey,
    message: &[u8],
    signature: &Signature,
) -> anyhow::Result<()> {
    let public = VerifyingKey::from_bytes(public_key.as_bytes())
        .map_err(|_| anyhow!("could not extract public key"))?;
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    public
        .verify(message, &sig)
        .map_err(|_| anyhow!("could not verify message"))?;
    Ok(())
}

/// Sentinel account used as the key for the election's own initial vote
pub static NOT_AN_ACCOUNT: Lazy<PublicKey> =
    Lazy::new(|| PrivateKey::from(u64::MAX).public_key());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_validate() {
        let key = PrivateKey::new();
        let data = [0u8; 32];
        let signature = sign_message(&key.raw_key(), &data);
        validate_message(&key.public_key(), &data, &signature).unwrap();
    }

    #[test]
    fn corrupt_signature_fails() {
        let key = PrivateKey::new();
        let data = [1u8, 2, 3];
        let signature = sign_message(&key.raw_key(), &data);
        let mut bad = *signature.as_bytes();
        bad[32] ^= 0x1;
        assert!(validate_message(&key.public_key(), &data, &Signature::from_bytes(bad)).is_err());
    }

    #[test]
    fn deterministic_from_u64() {
        assert_eq!(
            PrivateKey::from(42).public_key(),
            PrivateKey::from(42).public_key()
        );
        assert_ne!(
            PrivateKey::from(42).public_key(),
            PrivateKey::from(43).public_key()
        );
    }
}
