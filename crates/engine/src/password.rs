//! Password hashing (bcrypt, salted per hash).

use crate::ResultEngine;

const DUMMY_PASSWORD: &str = "ballotbox-timing-guard";

#[derive(Debug)]
pub(crate) struct PasswordHasher {
    cost: u32,
    /// Verified against when the account does not exist, so unknown ids take
    /// as long to reject as wrong passwords.
    dummy_hash: String,
}

impl PasswordHasher {
    pub(crate) fn new(cost: u32) -> ResultEngine<Self> {
        let dummy_hash = bcrypt::hash(DUMMY_PASSWORD, cost)?;
        Ok(Self { cost, dummy_hash })
    }

    pub(crate) fn hash(&self, password: &str) -> ResultEngine<String> {
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Check `password` against `stored`; a malformed stored hash never matches.
    pub(crate) fn verify(&self, password: &str, stored: Option<&str>) -> bool {
        match stored {
            Some(hash) => bcrypt::verify(password, hash).unwrap_or(false),
            None => {
                let _ = bcrypt::verify(password, &self.dummy_hash);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashes_are_salted_and_verify() {
        let hasher = PasswordHasher::new(4).unwrap();
        let a = hasher.hash("secret").unwrap();
        let b = hasher.hash("secret").unwrap();
        assert_ne!(a, b);
        assert!(!a.contains("secret"));
        assert!(hasher.verify("secret", Some(&a)));
        assert!(!hasher.verify("wrong", Some(&a)));
    }

    #[test]
    fn missing_or_malformed_hash_never_verifies() {
        let hasher = PasswordHasher::new(4).unwrap();
        assert!(!hasher.verify("ballotbox-timing-guard", None));
        assert!(!hasher.verify("secret", Some("not-a-bcrypt-hash")));
    }
}
