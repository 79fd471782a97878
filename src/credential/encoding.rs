//! Text form of a [`Credential`]: `{algorithm}${work_factor}${salt}${hash}`
//! with salt and hash in standard base64.

use super::hasher::{Credential, HashAlgorithm};
use crate::error::HearthError;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;
use std::str::FromStr;

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}${}${}${}",
            self.algorithm(),
            self.work_factor(),
            STANDARD.encode(self.salt()),
            STANDARD.encode(self.hash())
        )
    }
}

impl FromStr for Credential {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split('$');
        let (Some(algorithm), Some(work_factor), Some(salt), Some(hash), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return Err(HearthError::InvalidCredentialEncoding(
                "expected four `$`-separated fields".to_string(),
            ));
        };

        let algorithm: HashAlgorithm = algorithm.parse()?;
        let work_factor: u32 = work_factor.parse().map_err(|e| {
            HearthError::InvalidCredentialEncoding(format!("work factor: {e}"))
        })?;
        let salt = STANDARD
            .decode(salt)
            .map_err(|e| HearthError::InvalidCredentialEncoding(format!("salt: {e}")))?;
        let hash = STANDARD
            .decode(hash)
            .map_err(|e| HearthError::InvalidCredentialEncoding(format!("hash: {e}")))?;

        Credential::from_parts(salt, hash, work_factor, algorithm)
    }
}

#[cfg(test)]
mod tests {
    use crate::credential::{HasherConfig, create_credential, verify_credential};
    use crate::credential::Credential;

    #[test]
    fn parsed_credential_still_verifies() {
        let cred = create_credential("hunter2", &HasherConfig::fast()).unwrap();
        let text = cred.to_string();
        assert!(text.starts_with("sha256$3$"));

        let parsed: Credential = text.parse().unwrap();
        assert_eq!(parsed, cred);
        assert!(verify_credential(&parsed, "hunter2"));
    }

    #[test]
    fn malformed_text_is_rejected() {
        for bad in [
            "",
            "sha256$10$AAAA",
            "md5$10$AAAA$AAAA",
            "sha256$ten$AAAA$AAAA",
            "sha256$10$!!!$AAAA",
            "sha256$0$AAAA$AAAA",
            "sha256$10$AAAA$AAAA$extra",
            "sha256$4294967295$AAAA$AAAA",
            "sha256$10$$AAAA",
        ] {
            assert!(bad.parse::<Credential>().is_err(), "accepted {bad:?}");
        }
    }
}
