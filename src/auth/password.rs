//! Salted password hashing

use rand::Rng;
use sha2::{Digest, Sha256};

const METHOD: &str = "sha256";
const SALT_LEN: usize = 16;

/// Hash and verify user passwords
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> String;
    fn verify(&self, hash: &str, plaintext: &str) -> bool;
}

/// Salted SHA-256, stored as `sha256$<salt>$<hex digest>`
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl Sha256Hasher {
    fn digest(salt: &str, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn random_salt() -> String {
        let bytes: Vec<u8> = (0..SALT_LEN / 2).map(|_| rand::thread_rng().gen()).collect();
        hex::encode(bytes)
    }
}

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, plaintext: &str) -> String {
        let salt = Self::random_salt();
        let digest = Self::digest(&salt, plaintext);
        format!("{}${}${}", METHOD, salt, digest)
    }

    fn verify(&self, hash: &str, plaintext: &str) -> bool {
        let mut parts = hash.splitn(3, '$');
        let (Some(method), Some(salt), Some(expected)) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };
        if method != METHOD {
            return false;
        }
        constant_time_eq(Self::digest(salt, plaintext).as_bytes(), expected.as_bytes())
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
