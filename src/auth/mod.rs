//! User registration, login and access-token checks

pub mod handlers;
pub mod password;
pub mod storage;
pub mod token;
pub mod types;
pub mod validate;

pub use password::{PasswordHasher, Sha256Hasher};
pub use storage::{FileUserStore, MemoryUserStore, StoreError, UserStore};
pub use token::TokenIssuer;

use thiserror::Error;

/// Authentication and registration failures
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid name")]
    InvalidName,
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Password should be atleast 8 characters")]
    PasswordTooShort,
    #[error("User already exists. Please Log in.")]
    AlreadyExists,
    /// Login rejected; `reason` goes into the `Authentication` header
    #[error("Could not verify")]
    CouldNotVerify { reason: &'static str },
    #[error("Missing Authorization Header")]
    MissingToken,
    #[error("Invalid token: {0}")]
    Token(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Authenticated identity placed in request extensions by the token guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(pub String);
