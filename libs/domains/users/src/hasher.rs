//! Salted password hashing.
//!
//! Hashes are bcrypt strings (`$2b$<cost>$<salt><digest>`), so the cost and
//! salt needed to verify travel inside the hash itself. The salt is also
//! returned separately so it can be persisted next to the hash.

use core_config::{ConfigError, FromEnv, env_parse};
use std::fmt;
use std::ops::RangeInclusive;
use thiserror::Error;

/// Work factor used when `HASH_COST` is not set.
pub const DEFAULT_COST: u32 = 12;

/// Costs bcrypt accepts.
pub const COST_RANGE: RangeInclusive<u32> = 4..=31;

/// bcrypt reads at most this many bytes of input and ignores the rest.
pub const MAX_PASSWORD_BYTES: usize = 72;

const SALT_LEN: usize = 16;

#[derive(Debug, Error)]
pub enum HashingError {
    #[error("bcrypt cost {0} is outside 4..=31")]
    InvalidCost(u32),

    #[error("password is {0} bytes, bcrypt accepts at most 72")]
    PasswordTooLong(usize),

    #[error("malformed salt: {0}")]
    MalformedSalt(String),

    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Per-credential random salt, 16 bytes as lowercase hex.
#[derive(Clone, PartialEq, Eq)]
pub struct Salt(String);

impl Salt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    fn to_bytes(&self) -> Result<[u8; SALT_LEN], HashingError> {
        let bytes = const_hex::decode(&self.0)
            .map_err(|e| HashingError::MalformedSalt(e.to_string()))?;

        <[u8; SALT_LEN]>::try_from(bytes.as_slice()).map_err(|_| {
            HashingError::MalformedSalt(format!(
                "expected {} bytes, got {}",
                SALT_LEN,
                bytes.len()
            ))
        })
    }
}

impl From<String> for Salt {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Salt(..)")
    }
}

/// Output of [`CredentialHasher::hash_password_with_new_salt`].
#[derive(Debug, Clone)]
pub struct HashedCredential {
    pub hash: String,
    pub salt: Salt,
}

/// Produces and verifies irreversible password representations.
pub trait CredentialHasher: Send + Sync {
    /// Fresh random salt for the configured cost.
    fn generate_salt(&self) -> Result<Salt, HashingError>;

    /// Deterministic for a given `(plaintext, salt)` pair.
    fn hash_password(&self, plaintext: &str, salt: &Salt) -> Result<String, HashingError>;

    /// `false` on any mismatch, including a malformed `hash`.
    fn validate_password(&self, plaintext: &str, hash: &str) -> bool;

    fn hash_password_with_new_salt(&self, plaintext: &str) -> Result<HashedCredential, HashingError> {
        let salt = self.generate_salt()?;
        let hash = self.hash_password(plaintext, &salt)?;
        Ok(HashedCredential { hash, salt })
    }
}

/// bcrypt-backed [`CredentialHasher`].
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn from_config(config: &HashingConfig) -> Self {
        Self::new(config.cost)
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    fn checked_cost(&self) -> Result<u32, HashingError> {
        if COST_RANGE.contains(&self.cost) {
            Ok(self.cost)
        } else {
            Err(HashingError::InvalidCost(self.cost))
        }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl CredentialHasher for BcryptHasher {
    fn generate_salt(&self) -> Result<Salt, HashingError> {
        self.checked_cost()?;
        let bytes: Vec<u8> = (0..SALT_LEN).map(|_| rand::random::<u8>()).collect();
        Ok(Salt(const_hex::encode(bytes)))
    }

    fn hash_password(&self, plaintext: &str, salt: &Salt) -> Result<String, HashingError> {
        let cost = self.checked_cost()?;
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(HashingError::PasswordTooLong(plaintext.len()));
        }
        let parts = bcrypt::hash_with_salt(plaintext, cost, salt.to_bytes()?)?;
        Ok(parts.format_for_version(bcrypt::Version::TwoB))
    }

    fn validate_password(&self, plaintext: &str, hash: &str) -> bool {
        // bcrypt would compare only the first 72 bytes
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return false;
        }
        bcrypt::verify(plaintext, hash).unwrap_or(false)
    }
}

/// Hashing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashingConfig {
    pub cost: u32,
}

impl Default for HashingConfig {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl FromEnv for HashingConfig {
    /// - HASH_COST: bcrypt work factor, defaults to 12
    fn from_env() -> Result<Self, ConfigError> {
        let cost = env_parse("HASH_COST", &DEFAULT_COST.to_string())?;
        if !COST_RANGE.contains(&cost) {
            return Err(ConfigError::InvalidValue {
                key: "HASH_COST".to_string(),
                details: format!(
                    "{} is outside {}..={}",
                    cost,
                    COST_RANGE.start(),
                    COST_RANGE.end()
                ),
            });
        }
        Ok(Self { cost })
    }
}
