use data_encoding::HEXLOWER;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// A single-use token pair: the plain value goes to the client, only the
/// digest is stored, so a database leak does not expose live tokens.
pub struct IssuedToken {
    pub token: String,
    pub digest: String,
}

pub fn issue() -> IssuedToken {
    let mut bytes = [0u8; 20];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = HEXLOWER.encode(&bytes);
    let digest = digest(&token);
    IssuedToken { token, digest }
}

pub fn digest(token: &str) -> String {
    let hash = Sha256::digest(token.as_bytes());
    HEXLOWER.encode(&hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_matches_issued_token() {
        let issued = issue();
        assert_eq!(digest(&issued.token), issued.digest);
        assert_ne!(issued.token, issued.digest);
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(issue().token, issue().token);
    }
}
