use core::fmt;

use serde::{Deserialize, Serialize};
use signature::{Signer, Verifier};

/// An Ed25519 signature over a 32-byte block identifier.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(#[serde(with = "self::serializers::signature")] ed25519_consensus::Signature);

impl Signature {
    /// Wrap a raw `ed25519-consensus` signature.
    pub fn new(signature: ed25519_consensus::Signature) -> Self {
        Self(signature)
    }

    /// The signature as a 64-byte array.
    pub fn to_bytes(&self) -> [u8; 64] {
        self.0.to_bytes()
    }

    /// Build a signature from a 64-byte array.
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(ed25519_consensus::Signature::from(bytes))
    }

    /// A structurally valid signature that verifies under no key,
    /// for use in tests.
    pub fn test() -> Self {
        Self(ed25519_consensus::Signature::from([0; 64]))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(")?;
        for byte in &self.to_bytes()[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…)")
    }
}

impl From<ed25519_consensus::Signature> for Signature {
    fn from(signature: ed25519_consensus::Signature) -> Self {
        Self(signature)
    }
}

/// An Ed25519 private key held by a replica.
#[derive(Clone)]
pub struct PrivateKey(ed25519_consensus::SigningKey);

impl PrivateKey {
    /// Generate a fresh private key from the given RNG.
    pub fn generate<R>(rng: R) -> Self
    where
        R: rand::RngCore + rand::CryptoRng,
    {
        Self(ed25519_consensus::SigningKey::new(rng))
    }

    /// The public half of this key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.0.verification_key())
    }

    /// Sign the given message.
    pub fn sign(&self, msg: &[u8]) -> Signature {
        Signature(self.0.sign(msg))
    }
}

impl From<[u8; 32]> for PrivateKey {
    fn from(bytes: [u8; 32]) -> Self {
        Self(ed25519_consensus::SigningKey::from(bytes))
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey(***)")
    }
}

impl Signer<Signature> for PrivateKey {
    fn try_sign(&self, msg: &[u8]) -> Result<Signature, signature::Error> {
        Ok(Signature(self.0.sign(msg)))
    }
}

/// An Ed25519 public key identifying a replica's signing identity.
#[derive(Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublicKey(
    #[serde(with = "self::serializers::verification_key")] ed25519_consensus::VerificationKey,
);

impl PublicKey {
    /// Wrap a raw `ed25519-consensus` verification key.
    pub fn new(key: ed25519_consensus::VerificationKey) -> Self {
        Self(key)
    }

    /// The key as a 32-byte array.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }

    /// Verify `signature` over `msg` under this key.
    ///
    /// A structurally valid signature that does not match yields `false`;
    /// malformed key or signature material is rejected at decoding time.
    pub fn verify(&self, signature: &Signature, msg: &[u8]) -> bool {
        self.0.verify(&signature.0, msg).is_ok()
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey(")?;
        for byte in &self.to_bytes()[..8] {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "…)")
    }
}

impl Verifier<Signature> for PublicKey {
    fn verify(&self, msg: &[u8], signature: &Signature) -> Result<(), signature::Error> {
        self.0
            .verify(&signature.0, msg)
            .map_err(signature::Error::from_source)
    }
}

mod serializers {
    pub mod signature {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(
            signature: &ed25519_consensus::Signature,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&hex::encode(signature.to_bytes()))
        }

        pub fn deserialize<'de, D>(
            deserializer: D,
        ) -> Result<ed25519_consensus::Signature, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            let bytes: [u8; 64] = hex::FromHex::from_hex(&s).map_err(serde::de::Error::custom)?;
            Ok(ed25519_consensus::Signature::from(bytes))
        }
    }

    pub mod verification_key {
        use serde::{Deserialize, Deserializer, Serializer};

        pub fn serialize<S>(
            key: &ed25519_consensus::VerificationKey,
            serializer: S,
        ) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            serializer.serialize_str(&hex::encode(key.to_bytes()))
        }

        pub fn deserialize<'de, D>(
            deserializer: D,
        ) -> Result<ed25519_consensus::VerificationKey, D::Error>
        where
            D: Deserializer<'de>,
        {
            let s = String::deserialize(deserializer)?;
            let bytes: [u8; 32] = hex::FromHex::from_hex(&s).map_err(serde::de::Error::custom)?;
            ed25519_consensus::VerificationKey::try_from(bytes).map_err(serde::de::Error::custom)
        }
    }
}
