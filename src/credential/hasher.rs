use crate::error::HearthError;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::str::FromStr;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

pub const DEFAULT_SALT_LENGTH: usize = 16;
pub const DEFAULT_WORK_FACTOR: u32 = 10_000;
/// Upper bound on rounds, for both new and parsed credentials.
pub const MAX_WORK_FACTOR: u32 = 10_000_000;

/// Hash primitive applied on every stretching round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    #[default]
    Sha256,
    Sha512,
}

impl HashAlgorithm {
    fn round(self, running: &[u8], salt: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha256 => digest_round::<Sha256>(running, salt),
            HashAlgorithm::Sha512 => digest_round::<Sha512>(running, salt),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashAlgorithm::Sha256 => f.write_str("sha256"),
            HashAlgorithm::Sha512 => f.write_str("sha512"),
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "sha512" | "sha-512" => Ok(HashAlgorithm::Sha512),
            other => Err(HearthError::InvalidCredentialEncoding(format!(
                "unknown hash algorithm `{other}`"
            ))),
        }
    }
}

fn digest_round<D: Digest>(running: &[u8], salt: &[u8]) -> Vec<u8> {
    let mut hasher = D::new();
    hasher.update(running);
    hasher.update(salt);
    hasher.finalize().to_vec()
}

/// Settings used when creating new credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HasherConfig {
    pub salt_length: usize,
    pub work_factor: u32,
    pub algorithm: HashAlgorithm,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            salt_length: DEFAULT_SALT_LENGTH,
            work_factor: DEFAULT_WORK_FACTOR,
            algorithm: HashAlgorithm::default(),
        }
    }
}

impl HasherConfig {
    /// Cheap settings for tests. Never use for stored credentials.
    #[cfg(test)]
    pub fn fast() -> Self {
        Self {
            work_factor: 3,
            ..Self::default()
        }
    }
}

/// Stored authentication material for one principal.
///
/// A credential is never mutated: a password change produces a new one
/// with a fresh salt and the current work factor.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    salt: Vec<u8>,
    hash: Vec<u8>,
    work_factor: u32,
    algorithm: HashAlgorithm,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("algorithm", &self.algorithm)
            .field("work_factor", &self.work_factor)
            .field("salt_len", &self.salt.len())
            .finish_non_exhaustive()
    }
}

impl Credential {
    /// Rebuild a credential from persisted parts. Rejects anything
    /// [`create_credential`] cannot produce: an empty salt or a work factor
    /// outside `1..=MAX_WORK_FACTOR`.
    pub fn from_parts(
        salt: Vec<u8>,
        hash: Vec<u8>,
        work_factor: u32,
        algorithm: HashAlgorithm,
    ) -> Result<Self, HearthError> {
        if !(1..=MAX_WORK_FACTOR).contains(&work_factor) {
            return Err(HearthError::InvalidCredentialEncoding(format!(
                "work factor {work_factor} outside 1..={MAX_WORK_FACTOR}"
            )));
        }
        if salt.is_empty() {
            return Err(HearthError::InvalidCredentialEncoding(
                "salt is empty".to_string(),
            ));
        }
        Ok(Self {
            salt,
            hash,
            work_factor,
            algorithm,
        })
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn hash(&self) -> &[u8] {
        &self.hash
    }

    pub fn work_factor(&self) -> u32 {
        self.work_factor
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    /// True when the credential was created under settings other than `config`.
    /// Callers replace it with a fresh credential after a successful login.
    pub fn needs_rehash(&self, config: &HasherConfig) -> bool {
        self.work_factor != effective_rounds(config.work_factor)
            || self.algorithm != config.algorithm
            || self.salt.len() != config.salt_length
    }
}

fn effective_rounds(work_factor: u32) -> u32 {
    work_factor.max(1)
}

fn stretch(algorithm: HashAlgorithm, password: &str, salt: &[u8], rounds: u32) -> Vec<u8> {
    let mut running = Zeroizing::new(password.as_bytes().to_vec());
    for _ in 0..rounds {
        running = Zeroizing::new(algorithm.round(&running, salt));
    }
    running.to_vec()
}

/// Create a credential for `password` using the OS random source.
pub fn create_credential(password: &str, config: &HasherConfig) -> Result<Credential, HearthError> {
    create_credential_with(password, config, &mut OsRng)
}

/// Create a credential drawing the salt from `rng`. A random source failure
/// propagates and no credential is produced.
pub fn create_credential_with<R>(
    password: &str,
    config: &HasherConfig,
    rng: &mut R,
) -> Result<Credential, HearthError>
where
    R: RngCore + CryptoRng,
{
    if config.salt_length == 0 {
        return Err(HearthError::InvalidHasherConfig(
            "salt length must be at least 1".to_string(),
        ));
    }
    if config.work_factor > MAX_WORK_FACTOR {
        return Err(HearthError::InvalidHasherConfig(format!(
            "work factor {} exceeds {MAX_WORK_FACTOR}",
            config.work_factor
        )));
    }

    let mut salt = vec![0u8; config.salt_length];
    rng.try_fill_bytes(&mut salt)
        .map_err(|e| HearthError::RandomSource(e.to_string()))?;

    let work_factor = effective_rounds(config.work_factor);
    let hash = stretch(config.algorithm, password, &salt, work_factor);

    Ok(Credential {
        salt,
        hash,
        work_factor,
        algorithm: config.algorithm,
    })
}

/// Check `password` against `credential` using the credential's own salt,
/// work factor and algorithm. Comparison is constant-time.
pub fn verify_credential(credential: &Credential, password: &str) -> bool {
    let candidate = Zeroizing::new(stretch(
        credential.algorithm,
        password,
        &credential.salt,
        effective_rounds(credential.work_factor),
    ));
    bool::from(candidate.as_slice().ct_eq(&credential.hash))
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenRng;

    impl RngCore for BrokenRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, _dest: &mut [u8]) {}

        fn try_fill_bytes(&mut self, _dest: &mut [u8]) -> Result<(), rand::Error> {
            Err(rand::Error::new("entropy source unavailable"))
        }
    }

    impl CryptoRng for BrokenRng {}

    #[test]
    fn verifies_the_original_password() {
        let cred = create_credential("correct horse", &HasherConfig::fast()).unwrap();
        assert!(verify_credential(&cred, "correct horse"));
    }

    #[test]
    fn rejects_a_different_password() {
        let cred = create_credential("correct horse", &HasherConfig::fast()).unwrap();
        assert!(!verify_credential(&cred, "correct horsE"));
        assert!(!verify_credential(&cred, ""));
    }

    #[test]
    fn hash_is_exactly_work_factor_rounds() {
        let cfg = HasherConfig::fast();
        let cred = create_credential("pw", &cfg).unwrap();

        let mut running = b"pw".to_vec();
        for _ in 0..cfg.work_factor {
            let mut h = Sha256::new();
            h.update(&running);
            h.update(cred.salt());
            running = h.finalize().to_vec();
        }
        assert_eq!(cred.hash(), running.as_slice());
        assert_eq!(cred.work_factor(), 3);
    }

    #[test]
    fn non_positive_work_factor_still_runs_one_round() {
        let cfg = HasherConfig {
            work_factor: 0,
            ..HasherConfig::fast()
        };
        let cred = create_credential("pw", &cfg).unwrap();
        assert_eq!(cred.work_factor(), 1);
        assert_eq!(cred.hash().len(), 32);
        assert_ne!(cred.hash(), b"pw");
        assert!(verify_credential(&cred, "pw"));
    }

    #[test]
    fn verification_uses_the_credential_work_factor() {
        let old = create_credential("pw", &HasherConfig::fast()).unwrap();

        let current = HasherConfig {
            work_factor: 50,
            ..HasherConfig::fast()
        };
        assert!(verify_credential(&old, "pw"));
        assert!(old.needs_rehash(&current));

        let fresh = create_credential("pw", &current).unwrap();
        assert!(!fresh.needs_rehash(&current));
        assert!(verify_credential(&fresh, "pw"));
    }

    #[test]
    fn salts_differ_between_calls() {
        let cfg = HasherConfig::fast();
        let a = create_credential("same", &cfg).unwrap();
        let b = create_credential("same", &cfg).unwrap();
        assert_eq!(a.salt().len(), DEFAULT_SALT_LENGTH);
        assert_ne!(a.salt(), b.salt());
        assert_ne!(a.hash(), b.hash());
    }

    #[test]
    fn sha512_produces_longer_hashes() {
        let cfg = HasherConfig {
            algorithm: HashAlgorithm::Sha512,
            ..HasherConfig::fast()
        };
        let cred = create_credential("pw", &cfg).unwrap();
        assert_eq!(cred.hash().len(), 64);
        assert!(verify_credential(&cred, "pw"));
    }

    #[test]
    fn random_source_failure_propagates() {
        let err = create_credential_with("pw", &HasherConfig::fast(), &mut BrokenRng).unwrap_err();
        assert!(matches!(err, HearthError::RandomSource(_)));
    }

    #[test]
    fn from_parts_rejects_out_of_range_work_factor_and_empty_salt() {
        for (salt, wf) in [
            (vec![1], 0),
            (vec![1], MAX_WORK_FACTOR + 1),
            (vec![1], u32::MAX),
            (vec![], 10),
        ] {
            let err = Credential::from_parts(salt, vec![2], wf, HashAlgorithm::Sha256).unwrap_err();
            assert!(matches!(err, HearthError::InvalidCredentialEncoding(_)));
        }
        assert!(Credential::from_parts(vec![1], vec![2], MAX_WORK_FACTOR, HashAlgorithm::Sha256).is_ok());
    }

    #[test]
    fn rejects_unsalted_or_unbounded_settings() {
        let unsalted = HasherConfig {
            salt_length: 0,
            ..HasherConfig::fast()
        };
        let err = create_credential("pw", &unsalted).unwrap_err();
        assert!(matches!(err, HearthError::InvalidHasherConfig(_)));

        let unbounded = HasherConfig {
            work_factor: MAX_WORK_FACTOR + 1,
            ..HasherConfig::fast()
        };
        let err = create_credential("pw", &unbounded).unwrap_err();
        assert!(matches!(err, HearthError::InvalidHasherConfig(_)));
    }
}
